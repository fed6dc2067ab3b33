//! Topic-based event bus for runtime events.
//!
//! Registration and configuration activity is published to specific topics,
//! and observers subscribe only to the topics they need.

mod bus;
mod types;

pub use bus::{Event, EventBus, Topic};
pub use types::{ConfigEvent, RegistryEvent};
