//! Config worker that owns the [`ConfigStore`].
//!
//! Loads run one at a time, in the order the registration worker submits
//! them, so two loads of the same attribute never interleave their writes.

use std::sync::Arc;

use attribute_core::AttributeDefinition;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, warn};

use crate::api::Result;
use crate::config::{ConfigStore, load_or_materialize};
use crate::events::{ConfigEvent, EventBus};

/// Why a configuration is being loaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadReason {
    Register,
    Reload,
}

/// Commands that can be sent to the config worker
pub enum ConfigCommand {
    /// Load (materialising if absent) and apply the config of `definition`.
    Load {
        definition: Arc<AttributeDefinition>,
        reason: LoadReason,
        reply: oneshot::Sender<Result<()>>,
    },
}

/// Background task that reads and writes attribute configs.
pub struct ConfigWorker {
    store: Arc<dyn ConfigStore>,
    command_rx: mpsc::Receiver<ConfigCommand>,
    event_bus: EventBus,
}

impl ConfigWorker {
    pub fn new(
        store: Arc<dyn ConfigStore>,
        command_rx: mpsc::Receiver<ConfigCommand>,
        event_bus: EventBus,
    ) -> Self {
        Self {
            store,
            command_rx,
            event_bus,
        }
    }

    /// Main worker loop. Ends when every command sender is dropped.
    pub async fn run(mut self) {
        loop {
            tokio::select! {
                Some(cmd) = self.command_rx.recv() => {
                    self.handle_command(cmd);
                }
                else => break,
            }
        }

        debug!(target: "attribute::config", "Config worker stopped");
    }

    fn handle_command(&mut self, cmd: ConfigCommand) {
        match cmd {
            ConfigCommand::Load {
                definition,
                reason,
                reply,
            } => {
                let result = self.handle_load(&definition, reason);
                if reply.send(result).is_err() {
                    debug!(
                        target: "attribute::config",
                        attribute = definition.name(),
                        "Load reply channel closed (caller dropped)"
                    );
                }
            }
        }
    }

    fn handle_load(&self, definition: &AttributeDefinition, reason: LoadReason) -> Result<()> {
        let name = definition.name().to_string();

        let outcome = match load_or_materialize(self.store.as_ref(), definition) {
            Ok(outcome) => outcome,
            Err(err) => {
                warn!(
                    target: "attribute::config",
                    attribute = %name,
                    ?reason,
                    error = %err,
                    "Failed to load attribute config"
                );
                self.event_bus.publish(ConfigEvent::LoadFailed {
                    name,
                    error: err.to_string(),
                });
                return Err(err.into());
            }
        };

        if outcome.is_materialized() {
            self.event_bus
                .publish(ConfigEvent::Materialized { name: name.clone() });
        }

        let config = outcome.into_config();
        debug!(
            target: "attribute::config",
            attribute = %name,
            ?reason,
            priority = config.priority,
            enable = config.enable,
            patterns = config.patterns.len(),
            "Applying attribute config"
        );
        definition.apply_config(config);

        self.event_bus.publish(match reason {
            LoadReason::Register => ConfigEvent::Loaded { name },
            LoadReason::Reload => ConfigEvent::Reloaded { name },
        });

        Ok(())
    }
}
