//! Cancellable execution event and its synchronous listener bus.

use std::sync::Arc;

use attribute_core::{AttributeDefinition, EntityId, EventData, StatusData, StatusType};

/// Published right before an attribute's effect runs.
///
/// Listeners may inspect or adjust the value and cancel the execution. The
/// event borrows the execution's [`EventData`], so changes made through
/// [`status_mut`](Self::status_mut) are what the effect sees.
pub struct StatusExecuteEvent<'a> {
    definition: &'a AttributeDefinition,
    data: &'a mut EventData,
    cancelled: bool,
}

impl<'a> StatusExecuteEvent<'a> {
    pub(crate) fn new(definition: &'a AttributeDefinition, data: &'a mut EventData) -> Self {
        Self {
            definition,
            data,
            cancelled: false,
        }
    }

    /// Entity the execution is about (attacker, victim or executor).
    pub fn subject(&self) -> EntityId {
        self.data.subject()
    }

    pub fn definition(&self) -> &AttributeDefinition {
        self.definition
    }

    pub fn kind(&self) -> StatusType {
        self.data.kind()
    }

    pub fn status(&self) -> &StatusData {
        self.data.status()
    }

    pub fn status_mut(&mut self) -> &mut StatusData {
        self.data.status_mut()
    }

    pub fn data(&self) -> &EventData {
        &*self.data
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled
    }

    pub fn set_cancelled(&mut self, cancelled: bool) {
        self.cancelled = cancelled;
    }

    pub fn cancel(&mut self) {
        self.cancelled = true;
    }
}

/// Observer of attribute executions.
pub trait ExecuteListener: Send + Sync {
    /// Returns a human-readable name for this listener (used in logging).
    fn name(&self) -> &'static str;

    /// Lower values run first.
    fn priority(&self) -> i32 {
        0
    }

    /// Whether this listener still runs for an already cancelled event.
    fn ignore_cancelled(&self) -> bool {
        false
    }

    fn on_status_execute(&self, event: &mut StatusExecuteEvent<'_>);
}

/// Listeners sorted by priority, called in order on the caller's thread.
///
/// A listener may un-cancel an event cancelled by an earlier one; the flag
/// after the last listener is what the pipeline acts on.
#[derive(Clone, Default)]
pub struct ListenerBus {
    listeners: Arc<[Arc<dyn ExecuteListener>]>,
}

impl ListenerBus {
    pub fn new(mut listeners: Vec<Arc<dyn ExecuteListener>>) -> Self {
        // Stable sort keeps insertion order among equal priorities.
        listeners.sort_by_key(|listener| listener.priority());
        Self {
            listeners: listeners.into(),
        }
    }

    /// Delivers `event` to every listener in priority order.
    pub fn publish(&self, event: &mut StatusExecuteEvent<'_>) {
        for listener in self.listeners.iter() {
            if event.is_cancelled() && listener.ignore_cancelled() {
                continue;
            }
            listener.on_status_execute(event);
        }
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    /// Returns an iterator over listener names and priorities (for debugging).
    pub fn listeners(&self) -> impl Iterator<Item = (&'static str, i32)> + '_ {
        self.listeners.iter().map(|l| (l.name(), l.priority()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use attribute_core::{ConfiguredAttribute, EventContext};
    use parking_lot::Mutex;

    struct Recorder {
        name: &'static str,
        priority: i32,
        skip_cancelled: bool,
        cancel: bool,
        log: Arc<Mutex<Vec<&'static str>>>,
    }

    impl ExecuteListener for Recorder {
        fn name(&self) -> &'static str {
            self.name
        }

        fn priority(&self) -> i32 {
            self.priority
        }

        fn ignore_cancelled(&self) -> bool {
            self.skip_cancelled
        }

        fn on_status_execute(&self, event: &mut StatusExecuteEvent<'_>) {
            self.log.lock().push(self.name);
            if self.cancel {
                event.cancel();
            }
        }
    }

    fn recorder(
        name: &'static str,
        priority: i32,
        cancel: bool,
        skip_cancelled: bool,
        log: &Arc<Mutex<Vec<&'static str>>>,
    ) -> Arc<dyn ExecuteListener> {
        Arc::new(Recorder {
            name,
            priority,
            skip_cancelled,
            cancel,
            log: Arc::clone(log),
        })
    }

    #[test]
    fn listeners_run_in_priority_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let bus = ListenerBus::new(vec![
            recorder("late", 10, false, false, &log),
            recorder("early", -5, false, false, &log),
            recorder("middle", 0, true, false, &log),
            recorder("skipper", 20, false, true, &log),
        ]);

        let definition =
            AttributeDefinition::new(ConfiguredAttribute::new("Damage", StatusType::Custom));
        let mut data =
            EventContext::Custom { executor: EntityId(7) }.into_event(StatusData::flat(1.0));
        let mut event = StatusExecuteEvent::new(&definition, &mut data);

        bus.publish(&mut event);

        assert!(event.is_cancelled());
        assert_eq!(event.subject(), EntityId(7));
        assert_eq!(*log.lock(), ["early", "middle", "late"]);
    }
}
