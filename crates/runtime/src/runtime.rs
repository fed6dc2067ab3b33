//! High-level runtime orchestrator.
//!
//! The runtime owns the registry and both background workers, wires up the
//! command and event channels, and exposes a builder-based API for clients.

use std::env;
use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::info;

use crate::api::{AttributeHandle, Result, RuntimeError};
use crate::config::{ConfigStore, FileConfigStore, InMemoryConfigStore};
use crate::events::EventBus;
use crate::pipeline::{ExecuteListener, ExecutionPipeline, ListenerBus};
use crate::registry::AttributeRegistry;
use crate::workers::{ConfigWorker, RegistrationWorker};

/// Runtime configuration shared across the orchestrator and workers.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// Directory holding one `<Name>.toml` per attribute. `None` keeps
    /// configs in memory.
    pub config_dir: Option<PathBuf>,
    pub command_buffer_size: usize,
    pub event_buffer_size: usize,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            config_dir: None,
            command_buffer_size: 32,
            event_buffer_size: 100,
        }
    }
}

impl RuntimeConfig {
    /// Construct runtime configuration from environment variables.
    ///
    /// Environment variables:
    /// - `ATTRIBUTE_CONFIG_DIR` - Attribute config directory (default: in memory)
    /// - `ATTRIBUTE_COMMAND_BUFFER` - Worker command channel capacity (default: 32)
    /// - `ATTRIBUTE_EVENT_BUFFER` - Event bus capacity per topic (default: 100)
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(dir) = read_env::<PathBuf>("ATTRIBUTE_CONFIG_DIR") {
            config.config_dir = Some(dir);
        }
        if let Some(size) = read_env::<usize>("ATTRIBUTE_COMMAND_BUFFER") {
            config.command_buffer_size = size.max(1);
        }
        if let Some(size) = read_env::<usize>("ATTRIBUTE_EVENT_BUFFER") {
            config.event_buffer_size = size.max(1);
        }

        config
    }

    pub fn with_config_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config_dir = Some(dir.into());
        self
    }
}

/// Get the platform-specific attribute config directory
///
/// - macOS: `~/Library/Application Support/lore-attributes/attributes`
/// - Linux: `~/.config/lore-attributes/attributes` (or `$XDG_CONFIG_HOME/...`)
/// - Windows: `%APPDATA%\lore-attributes\config\attributes`
/// - Fallback: `./config/attributes`
pub fn default_config_dir() -> PathBuf {
    directories::ProjectDirs::from("", "", "lore-attributes")
        .map(|dirs| dirs.config_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("./config"))
        .join("attributes")
}

fn read_env<T>(key: &str) -> Option<T>
where
    T: std::str::FromStr,
{
    env::var(key).ok()?.parse().ok()
}

/// Main runtime that owns the attribute registry
///
/// Design: Runtime owns workers and the registry lifecycle.
/// [`AttributeHandle`] provides a cloneable façade for clients.
pub struct AttributeRuntime {
    // Shared handle (can be cloned for clients)
    handle: AttributeHandle,
    registry: Arc<AttributeRegistry>,

    // Background workers
    registration_worker_handle: JoinHandle<()>,
    config_worker_handle: JoinHandle<()>,
}

impl AttributeRuntime {
    /// Create a new runtime builder
    pub fn builder() -> AttributeRuntimeBuilder {
        AttributeRuntimeBuilder::new()
    }

    /// Start a runtime with `config` and no execution listeners.
    pub fn start(config: RuntimeConfig) -> Result<Self> {
        Self::builder().config(config).build()
    }

    /// Get a cloneable handle to this runtime
    ///
    /// The handle can be shared across clients and async tasks.
    pub fn handle(&self) -> AttributeHandle {
        self.handle.clone()
    }

    /// Shutdown the runtime gracefully
    ///
    /// Registrations queued before this call settle first. Afterwards the
    /// registry is empty and every handle's registration calls fail with
    /// [`RuntimeError::CommandChannelClosed`].
    pub async fn shutdown(self) -> Result<()> {
        // The worker may already be gone if it panicked; joining reports that.
        let _ = self.handle.shutdown_workers().await;
        drop(self.handle);

        self.registration_worker_handle
            .await
            .map_err(RuntimeError::WorkerJoin)?;
        self.config_worker_handle
            .await
            .map_err(RuntimeError::WorkerJoin)?;

        self.registry.clear();
        info!(target: "attribute::registry", "Attribute runtime stopped");

        Ok(())
    }
}

/// Builder for [`AttributeRuntime`] with flexible configuration.
pub struct AttributeRuntimeBuilder {
    config: RuntimeConfig,
    store: Option<Arc<dyn ConfigStore>>,
    listeners: Vec<Arc<dyn ExecuteListener>>,
}

impl AttributeRuntimeBuilder {
    fn new() -> Self {
        Self {
            config: RuntimeConfig::default(),
            store: None,
            listeners: Vec::new(),
        }
    }

    /// Set the runtime configuration
    pub fn config(mut self, config: RuntimeConfig) -> Self {
        self.config = config;
        self
    }

    /// Use a custom config store instead of the one derived from `config_dir`.
    pub fn store(mut self, store: Arc<dyn ConfigStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Add an execution listener.
    pub fn listener(mut self, listener: impl ExecuteListener + 'static) -> Self {
        self.listeners.push(Arc::new(listener));
        self
    }

    /// Add several execution listeners at once.
    pub fn listeners(
        mut self,
        listeners: impl IntoIterator<Item = Arc<dyn ExecuteListener>>,
    ) -> Self {
        self.listeners.extend(listeners);
        self
    }

    /// Build the runtime and spawn its workers.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn build(self) -> Result<AttributeRuntime> {
        let store: Arc<dyn ConfigStore> = match (self.store, &self.config.config_dir) {
            (Some(store), _) => store,
            (None, Some(dir)) => Arc::new(FileConfigStore::new(dir)?),
            (None, None) => Arc::new(InMemoryConfigStore::new()),
        };

        let event_bus = EventBus::with_capacity(self.config.event_buffer_size);
        let registry = Arc::new(AttributeRegistry::new());
        let pipeline = Arc::new(ExecutionPipeline::new(ListenerBus::new(self.listeners)));

        let command_buffer_size = self.config.command_buffer_size.max(1);
        let (config_tx, config_rx) = mpsc::channel(command_buffer_size);
        let (command_tx, command_rx) = mpsc::channel(command_buffer_size);

        let config_worker = ConfigWorker::new(store, config_rx, event_bus.clone());
        let registration_worker = RegistrationWorker::new(
            Arc::clone(&registry),
            command_rx,
            config_tx,
            event_bus.clone(),
        );

        let config_worker_handle = tokio::spawn(config_worker.run());
        let registration_worker_handle = tokio::spawn(registration_worker.run());

        info!(
            target: "attribute::registry",
            config_dir = ?self.config.config_dir,
            listeners = pipeline.listeners().len(),
            "Attribute runtime started"
        );

        let handle = AttributeHandle::new(command_tx, Arc::clone(&registry), pipeline, event_bus);

        Ok(AttributeRuntime {
            handle,
            registry,
            registration_worker_handle,
            config_worker_handle,
        })
    }
}

impl Default for AttributeRuntimeBuilder {
    fn default() -> Self {
        Self::new()
    }
}
