//! Worker tasks that back the runtime orchestration.
//!
//! The config worker is the only place configuration stores are touched. The
//! registration worker orders registrations: each one waits for its config
//! load to finish before it is inserted into the registry.

mod config;
mod registration;

pub use config::{ConfigCommand, ConfigWorker, LoadReason};
pub use registration::{RegistrationCommand, RegistrationWorker};
