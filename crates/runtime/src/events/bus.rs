//! Topic-based event bus implementation.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::broadcast;

use super::types::{ConfigEvent, RegistryEvent};

/// Topics for event routing
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq)]
pub enum Topic {
    /// Attribute registration and removal
    Registry,
    /// Config materialisation, reloads and failures
    Config,
}

/// Event wrapper that carries the topic and typed event
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Registry(RegistryEvent),
    Config(ConfigEvent),
}

impl Event {
    pub fn topic(&self) -> Topic {
        match self {
            Event::Registry(_) => Topic::Registry,
            Event::Config(_) => Topic::Config,
        }
    }
}

impl From<RegistryEvent> for Event {
    fn from(event: RegistryEvent) -> Self {
        Event::Registry(event)
    }
}

impl From<ConfigEvent> for Event {
    fn from(event: ConfigEvent) -> Self {
        Event::Config(event)
    }
}

/// Topic-based event bus
///
/// Allows observers to subscribe to specific topics and only receive the
/// events they care about. Publishing never blocks: events sent while no one
/// is subscribed are dropped.
///
/// This bus is for asynchronous observers (logging, admin tooling). The
/// cancellable execution event goes through the synchronous
/// [`ListenerBus`](crate::pipeline::ListenerBus) instead.
#[derive(Clone)]
pub struct EventBus {
    channels: Arc<HashMap<Topic, broadcast::Sender<Event>>>,
}

impl EventBus {
    /// Creates a new event bus with default capacity for each topic
    pub fn new() -> Self {
        Self::with_capacity(100)
    }

    /// Creates a new event bus with specified capacity per topic
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let channels = [Topic::Registry, Topic::Config]
            .into_iter()
            .map(|topic| (topic, broadcast::channel(capacity).0))
            .collect();

        Self {
            channels: Arc::new(channels),
        }
    }

    /// Publish an event to its corresponding topic
    pub fn publish(&self, event: impl Into<Event>) {
        let event = event.into();
        let topic = event.topic();

        if let Some(tx) = self.channels.get(&topic)
            && tx.send(event).is_err()
        {
            // No subscribers for this topic - this is normal, not an error
            tracing::trace!("No subscribers for topic {:?}", topic);
        }
    }

    /// Subscribe to a specific topic
    ///
    /// Returns a receiver that will only receive events for that topic.
    pub fn subscribe(&self, topic: Topic) -> broadcast::Receiver<Event> {
        match self.channels.get(&topic) {
            Some(tx) => tx.subscribe(),
            // Every topic is created in `with_capacity`; a detached receiver
            // reports itself closed.
            None => broadcast::channel(1).1,
        }
    }

    /// Subscribe to multiple topics
    ///
    /// Returns receivers for each requested topic.
    pub fn subscribe_multiple(
        &self,
        topics: &[Topic],
    ) -> HashMap<Topic, broadcast::Receiver<Event>> {
        topics
            .iter()
            .map(|&topic| (topic, self.subscribe(topic)))
            .collect()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
