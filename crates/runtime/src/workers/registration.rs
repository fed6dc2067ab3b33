//! Registration worker that inserts definitions into the registry.
//!
//! Receives commands from [`AttributeHandle`](crate::api::AttributeHandle),
//! waits for the config worker to load each definition's configuration, and
//! only then places the definition by priority. Commands are handled in
//! arrival order, which is what makes [`Flush`](RegistrationCommand::Flush)
//! a barrier.

use std::sync::Arc;

use attribute_core::AttributeDefinition;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error};

use super::config::{ConfigCommand, LoadReason};
use crate::api::{Result, RuntimeError};
use crate::events::{EventBus, RegistryEvent};
use crate::registry::{AttributeRegistry, Insertion};

/// Commands that can be sent to the registration worker
pub enum RegistrationCommand {
    /// Load the config of `definition`, then insert it by priority.
    Register {
        definition: Arc<AttributeDefinition>,
        reply: oneshot::Sender<Result<Arc<AttributeDefinition>>>,
    },
    /// Re-read the config of a registered definition without moving it.
    Reload {
        definition: Arc<AttributeDefinition>,
        reply: oneshot::Sender<Result<()>>,
    },
    /// Reply once every earlier command has been handled.
    Flush { reply: oneshot::Sender<()> },
    /// Stop the worker. Commands queued behind this one are dropped.
    Shutdown,
}

/// Background task that serialises registrations.
///
/// Holds the only sender to the config worker, so stopping this worker also
/// stops that one.
pub struct RegistrationWorker {
    registry: Arc<AttributeRegistry>,
    command_rx: mpsc::Receiver<RegistrationCommand>,
    config_tx: mpsc::Sender<ConfigCommand>,
    event_bus: EventBus,
}

impl RegistrationWorker {
    pub fn new(
        registry: Arc<AttributeRegistry>,
        command_rx: mpsc::Receiver<RegistrationCommand>,
        config_tx: mpsc::Sender<ConfigCommand>,
        event_bus: EventBus,
    ) -> Self {
        Self {
            registry,
            command_rx,
            config_tx,
            event_bus,
        }
    }

    /// Main worker loop.
    pub async fn run(mut self) {
        loop {
            tokio::select! {
                Some(cmd) = self.command_rx.recv() => {
                    if !self.handle_command(cmd).await {
                        break;
                    }
                }
                else => break,
            }
        }

        debug!(target: "attribute::registry", "Registration worker stopped");
    }

    /// Returns false when the worker should stop.
    async fn handle_command(&mut self, cmd: RegistrationCommand) -> bool {
        match cmd {
            RegistrationCommand::Register { definition, reply } => {
                let name = definition.name().to_string();
                let result = self.handle_register(definition).await;
                if reply.send(result).is_err() {
                    debug!(
                        target: "attribute::registry",
                        attribute = %name,
                        "Register reply channel closed (caller dropped)"
                    );
                }
            }
            RegistrationCommand::Reload { definition, reply } => {
                let result = self.load_config(&definition, LoadReason::Reload).await;
                if reply.send(result).is_err() {
                    debug!(
                        target: "attribute::registry",
                        attribute = definition.name(),
                        "Reload reply channel closed (caller dropped)"
                    );
                }
            }
            RegistrationCommand::Flush { reply } => {
                if reply.send(()).is_err() {
                    debug!(
                        target: "attribute::registry",
                        "Flush reply channel closed (caller dropped)"
                    );
                }
            }
            RegistrationCommand::Shutdown => return false,
        }

        true
    }

    async fn handle_register(
        &self,
        definition: Arc<AttributeDefinition>,
    ) -> Result<Arc<AttributeDefinition>> {
        if let Err(err) = self.load_config(&definition, LoadReason::Register).await {
            error!(
                target: "attribute::registry",
                attribute = definition.name(),
                error = %err,
                "Registration failed; attribute not inserted"
            );
            self.event_bus.publish(RegistryEvent::RegistrationFailed {
                name: definition.name().to_string(),
                error: err.to_string(),
            });
            return Err(err);
        }

        match self.registry.insert(&definition) {
            Insertion::Inserted { position } => {
                definition.attribute().on_registering();
                self.event_bus.publish(RegistryEvent::Registered {
                    name: definition.name().to_string(),
                    priority: definition.priority(),
                    position,
                });
            }
            Insertion::AlreadyPresent { .. } => {}
        }

        Ok(definition)
    }

    /// Hands the load to the config worker and waits for it to finish.
    async fn load_config(
        &self,
        definition: &Arc<AttributeDefinition>,
        reason: LoadReason,
    ) -> Result<()> {
        let (reply_tx, reply_rx) = oneshot::channel();

        self.config_tx
            .send(ConfigCommand::Load {
                definition: Arc::clone(definition),
                reason,
                reply: reply_tx,
            })
            .await
            .map_err(|_| RuntimeError::CommandChannelClosed)?;

        reply_rx.await.map_err(RuntimeError::ReplyChannelClosed)?
    }
}
