//! Runtime orchestration for lore-driven attributes.
//!
//! This crate wires the [`attribute_core`] types into a running system: a
//! priority-ordered registry, config persistence, and the execution pipeline
//! gameplay code calls into. Consumers embed [`AttributeRuntime`] and work
//! through [`AttributeHandle`].
//!
//! Modules are organized by responsibility:
//! - [`runtime`] hosts the orchestrator and builder
//! - [`api`] exposes the types downstream clients interact with
//! - [`registry`] keeps definitions in dispatch order
//! - [`config`] loads and materialises per-attribute configs
//! - [`pipeline`] runs single executions and the listener bus
//! - [`events`] provides topic-based event bus for flexible event routing
//! - `workers` keeps background tasks internal to the crate
pub mod api;
pub mod config;
pub mod events;
pub mod pipeline;
pub mod registry;
pub mod runtime;

mod workers;

pub use api::{AttributeHandle, ExecuteError, PendingRegistration, Result, RuntimeError};
pub use config::{
    ConfigError, ConfigStore, FileConfigStore, InMemoryConfigStore, LoadOutcome,
    load_or_materialize,
};
pub use events::{ConfigEvent, Event, EventBus, RegistryEvent, Topic};
pub use pipeline::{
    DispatchRecord, ExecuteListener, ExecuteOutcome, ExecutionPipeline, ListenerBus,
    StatusExecuteEvent,
};
pub use registry::{AttributeRegistry, Insertion};
pub use runtime::{AttributeRuntime, AttributeRuntimeBuilder, RuntimeConfig, default_config_dir};
