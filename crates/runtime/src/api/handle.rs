//! Cloneable façade for registering and executing attributes.
//!
//! [`AttributeHandle`] hides channel plumbing. Registration goes through the
//! workers and is asynchronous; lookup, unregistration and execution work on
//! the shared registry directly and never wait on a worker.
use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{broadcast, mpsc, oneshot};

use attribute_core::{
    Attribute, AttributeDefinition, BonusSource, EventContext, EventData, ItemStack,
};

use super::errors::{ExecuteError, Result, RuntimeError};
use crate::events::{Event, EventBus, RegistryEvent, Topic};
use crate::pipeline::{DispatchRecord, ExecuteOutcome, ExecutionPipeline};
use crate::registry::AttributeRegistry;
use crate::workers::RegistrationCommand;

/// A registration submitted to the registration worker.
///
/// Dropping it does not cancel the registration; the definition still
/// appears in the registry once its config has loaded.
pub struct PendingRegistration {
    definition: Arc<AttributeDefinition>,
    reply_rx: oneshot::Receiver<Result<Arc<AttributeDefinition>>>,
}

impl PendingRegistration {
    /// The definition being registered. Not ready until the registration settles.
    pub fn definition(&self) -> &Arc<AttributeDefinition> {
        &self.definition
    }

    /// Waits until the definition is in the registry, or its config failed to load.
    pub async fn settled(self) -> Result<Arc<AttributeDefinition>> {
        self.reply_rx
            .await
            .map_err(RuntimeError::ReplyChannelClosed)?
    }
}

/// Client-facing handle to interact with the runtime
#[derive(Clone)]
pub struct AttributeHandle {
    command_tx: mpsc::Sender<RegistrationCommand>,
    registry: Arc<AttributeRegistry>,
    pipeline: Arc<ExecutionPipeline>,
    event_bus: EventBus,
}

impl AttributeHandle {
    pub(crate) fn new(
        command_tx: mpsc::Sender<RegistrationCommand>,
        registry: Arc<AttributeRegistry>,
        pipeline: Arc<ExecutionPipeline>,
        event_bus: EventBus,
    ) -> Self {
        Self {
            command_tx,
            registry,
            pipeline,
            event_bus,
        }
    }

    /// Registers an attribute.
    ///
    /// Returns as soon as the command is queued. Await
    /// [`PendingRegistration::settled`] or [`flush`](Self::flush) to observe
    /// the definition in the registry.
    pub async fn register(&self, attribute: impl Attribute) -> Result<PendingRegistration> {
        self.register_definition(AttributeDefinition::shared(attribute))
            .await
    }

    /// Registers an existing definition, e.g. one that was unregistered earlier.
    pub async fn register_definition(
        &self,
        definition: Arc<AttributeDefinition>,
    ) -> Result<PendingRegistration> {
        let (reply_tx, reply_rx) = oneshot::channel();

        self.command_tx
            .send(RegistrationCommand::Register {
                definition: Arc::clone(&definition),
                reply: reply_tx,
            })
            .await
            .map_err(|_| RuntimeError::CommandChannelClosed)?;

        Ok(PendingRegistration {
            definition,
            reply_rx,
        })
    }

    /// Removes `definition` from the registry immediately.
    ///
    /// Returns false if it was not registered. A registration of the same
    /// definition still in flight will insert it again when it settles.
    pub fn unregister(&self, definition: &Arc<AttributeDefinition>) -> bool {
        let removed = self.registry.unregister(definition);
        if removed {
            self.event_bus.publish(RegistryEvent::Unregistered {
                name: definition.name().to_string(),
            });
        }
        removed
    }

    /// Re-reads the config of the registered attribute `name`.
    ///
    /// The new priority only takes effect for ordering after the attribute is
    /// unregistered and registered again.
    pub async fn reload(&self, name: &str) -> Result<()> {
        let definition = self
            .registry
            .get(name)
            .ok_or_else(|| RuntimeError::UnknownAttribute {
                name: name.to_string(),
            })?;
        let (reply_tx, reply_rx) = oneshot::channel();

        self.command_tx
            .send(RegistrationCommand::Reload {
                definition,
                reply: reply_tx,
            })
            .await
            .map_err(|_| RuntimeError::CommandChannelClosed)?;

        reply_rx.await.map_err(RuntimeError::ReplyChannelClosed)?
    }

    /// Waits until every registration submitted before this call has settled.
    pub async fn flush(&self) -> Result<()> {
        let (reply_tx, reply_rx) = oneshot::channel();

        self.command_tx
            .send(RegistrationCommand::Flush { reply: reply_tx })
            .await
            .map_err(|_| RuntimeError::CommandChannelClosed)?;

        reply_rx.await.map_err(RuntimeError::ReplyChannelClosed)
    }

    pub fn get(&self, name: &str) -> Option<Arc<AttributeDefinition>> {
        self.registry.get(name)
    }

    /// Registered definitions in dispatch order.
    pub fn attributes(&self) -> Vec<Arc<AttributeDefinition>> {
        self.registry.snapshot()
    }

    pub fn registry(&self) -> &AttributeRegistry {
        &self.registry
    }

    /// Runs a single attribute through the execution pipeline.
    pub fn execute(
        &self,
        definition: &AttributeDefinition,
        data: &mut EventData,
    ) -> std::result::Result<ExecuteOutcome, ExecuteError> {
        self.pipeline.execute(definition, data)
    }

    /// Executes every ready attribute of the context's kind, in registry order.
    ///
    /// Each attribute's value is extracted from the lore of `items` with
    /// `bonus` merged in. A failing attribute is recorded and does not stop
    /// the ones after it.
    pub fn dispatch(
        &self,
        context: EventContext,
        items: &[ItemStack],
        bonus: &dyn BonusSource,
    ) -> Vec<DispatchRecord> {
        self.registry
            .snapshot()
            .into_iter()
            .filter(|definition| definition.is_ready() && definition.kind() == context.kind())
            .map(|definition| {
                let status = definition.parse_value(items, bonus);
                let mut data = context.into_event(status);
                let outcome = self.pipeline.execute(&definition, &mut data);
                DispatchRecord {
                    attribute: definition.name().to_string(),
                    status,
                    outcome,
                }
            })
            .collect()
    }

    /// Subscribe to events from a specific topic
    ///
    /// # Topics
    ///
    /// - `Topic::Registry` - Registrations, removals and failed registrations
    /// - `Topic::Config` - Config materialisation, loads and reloads
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// use attribute_runtime::Topic;
    ///
    /// let mut registry_rx = handle.subscribe(Topic::Registry);
    /// while let Ok(event) = registry_rx.recv().await {
    ///     // Handle registry events
    /// }
    /// ```
    pub fn subscribe(&self, topic: Topic) -> broadcast::Receiver<Event> {
        self.event_bus.subscribe(topic)
    }

    /// Subscribe to multiple topics at once
    ///
    /// Returns a map of topic to receiver for each requested topic.
    pub fn subscribe_multiple(
        &self,
        topics: &[Topic],
    ) -> HashMap<Topic, broadcast::Receiver<Event>> {
        self.event_bus.subscribe_multiple(topics)
    }

    /// Get a reference to the event bus for advanced usage
    pub fn event_bus(&self) -> &EventBus {
        &self.event_bus
    }

    pub(crate) async fn shutdown_workers(&self) -> Result<()> {
        self.command_tx
            .send(RegistrationCommand::Shutdown)
            .await
            .map_err(|_| RuntimeError::CommandChannelClosed)
    }
}
