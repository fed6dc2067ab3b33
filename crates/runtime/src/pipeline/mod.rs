//! Synchronous execution of a single attribute.
//!
//! Gameplay code calls [`ExecutionPipeline::execute`] on its own thread with
//! the value it computed for one attribute. The pipeline applies the
//! attribute's value policies, offers the execution to listeners, and runs
//! the effect unless a listener cancelled it.

mod listener;

pub use listener::{ExecuteListener, ListenerBus, StatusExecuteEvent};

use attribute_core::{AttributeDefinition, EventData, StatusData};
use tracing::{debug, error, trace};

use crate::api::ExecuteError;

/// How a single execution ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecuteOutcome {
    /// The effect ran.
    Executed,
    /// Zero value on an attribute that does not run for zero; no event was published.
    SkippedZero,
    /// A listener cancelled the execution.
    Cancelled,
    /// The attribute is disabled in its configuration.
    Disabled,
    /// The definition is not (or no longer) registered.
    NotReady,
}

impl ExecuteOutcome {
    pub fn is_executed(&self) -> bool {
        matches!(self, ExecuteOutcome::Executed)
    }
}

/// Per-attribute result of a dispatch over the registry.
#[derive(Debug, Clone, PartialEq)]
pub struct DispatchRecord {
    pub attribute: String,
    /// Value handed to the pipeline, before any policy or listener changed it.
    pub status: StatusData,
    pub outcome: Result<ExecuteOutcome, ExecuteError>,
}

/// Runs attribute effects through the listener bus.
#[derive(Clone, Default)]
pub struct ExecutionPipeline {
    listeners: ListenerBus,
}

impl ExecutionPipeline {
    pub fn new(listeners: ListenerBus) -> Self {
        Self { listeners }
    }

    pub fn listeners(&self) -> &ListenerBus {
        &self.listeners
    }

    /// Executes `definition` with `data`.
    ///
    /// `data` is updated in place: the fix-value policy and listeners may
    /// change its status, and the effect sees the final value.
    pub fn execute(
        &self,
        definition: &AttributeDefinition,
        data: &mut EventData,
    ) -> Result<ExecuteOutcome, ExecuteError> {
        if !definition.is_ready() {
            trace!(
                target: "attribute::execute",
                attribute = definition.name(),
                "Skipping attribute that is not ready"
            );
            return Ok(ExecuteOutcome::NotReady);
        }

        let expected = definition.kind();
        let actual = data.kind();
        if expected != actual {
            error!(
                target: "attribute::execute",
                attribute = definition.name(),
                %expected,
                %actual,
                "Unrecognized dispatch type"
            );
            return Err(ExecuteError::DispatchMismatch {
                attribute: definition.name().to_string(),
                expected,
                actual,
            });
        }

        if data.status().is_zero_data() && !definition.is_zero_execute() {
            return Ok(ExecuteOutcome::SkippedZero);
        }

        if definition.is_fix_value() {
            data.status_mut().fix_zero_value();
        }

        let mut event = StatusExecuteEvent::new(definition, data);
        self.listeners.publish(&mut event);
        if event.is_cancelled() {
            debug!(
                target: "attribute::execute",
                attribute = definition.name(),
                "Execution cancelled by listener"
            );
            return Ok(ExecuteOutcome::Cancelled);
        }

        if !definition.is_enabled() {
            return Ok(ExecuteOutcome::Disabled);
        }

        definition.attribute().on_execute(data);

        let status = data.status();
        debug!(
            target: "attribute::execute",
            attribute = definition.name(),
            min = status.min,
            max = status.max,
            percent = status.percent,
            kind = %actual,
            "Executed attribute"
        );

        Ok(ExecuteOutcome::Executed)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::fmt;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use attribute_core::{Attribute, AttributeConfig, EntityId, EventContext, StatusType};
    use tracing::field::{Field, Visit};
    use tracing_subscriber::layer::{Context, Layer, SubscriberExt};

    #[derive(Default)]
    struct Counting {
        zero_execute: bool,
        fix_value: bool,
        calls: Arc<AtomicUsize>,
        last_min: Arc<parking_lot::Mutex<Option<f64>>>,
    }

    impl Attribute for Counting {
        fn name(&self) -> &str {
            "Counting"
        }

        fn kind(&self) -> StatusType {
            StatusType::Attack
        }

        fn is_zero_execute(&self) -> bool {
            self.zero_execute
        }

        fn is_fix_value(&self) -> bool {
            self.fix_value
        }

        fn on_execute(&self, data: &EventData) {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last_min.lock() = Some(data.status().min);
        }
    }

    struct Canceller;

    impl ExecuteListener for Canceller {
        fn name(&self) -> &'static str {
            "canceller"
        }

        fn on_status_execute(&self, event: &mut StatusExecuteEvent<'_>) {
            event.cancel();
        }
    }

    struct Doubler;

    impl ExecuteListener for Doubler {
        fn name(&self) -> &'static str {
            "doubler"
        }

        fn on_status_execute(&self, event: &mut StatusExecuteEvent<'_>) {
            let status = event.status_mut();
            status.min *= 2.0;
            status.max *= 2.0;
        }
    }

    type Fields = HashMap<String, String>;

    /// Collects the fields of every `attribute::execute` event.
    #[derive(Clone, Default)]
    struct Captured(Arc<parking_lot::Mutex<Vec<Fields>>>);

    impl Captured {
        fn executed(&self) -> Vec<Fields> {
            self.0
                .lock()
                .iter()
                .filter(|fields| {
                    fields.get("message").map(String::as_str) == Some("Executed attribute")
                })
                .cloned()
                .collect()
        }
    }

    struct FieldRecorder<'a>(&'a mut Fields);

    impl Visit for FieldRecorder<'_> {
        fn record_str(&mut self, field: &Field, value: &str) {
            self.0.insert(field.name().to_string(), value.to_string());
        }

        fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
            self.0.insert(field.name().to_string(), format!("{value:?}"));
        }
    }

    impl<S: tracing::Subscriber> Layer<S> for Captured {
        fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
            if event.metadata().target() != "attribute::execute" {
                return;
            }
            let mut fields = Fields::new();
            event.record(&mut FieldRecorder(&mut fields));
            self.0.lock().push(fields);
        }
    }

    fn ready(attribute: Counting, enable: bool) -> AttributeDefinition {
        let definition = AttributeDefinition::new(attribute);
        definition.apply_config(AttributeConfig::defaults_for("Counting").with_enable(enable));
        definition.set_ready(true);
        definition
    }

    fn attack(status: StatusData) -> EventData {
        EventContext::Attack {
            attacker: EntityId(1),
            victim: EntityId(2),
        }
        .into_event(status)
    }

    #[test]
    fn zero_value_is_skipped_unless_zero_execute() {
        let calls = Arc::new(AtomicUsize::new(0));
        let pipeline = ExecutionPipeline::default();

        let skipping = ready(
            Counting {
                zero_execute: false,
                calls: Arc::clone(&calls),
                ..Default::default()
            },
            true,
        );
        // Percent alone does not make the value non-zero.
        let mut data = attack(StatusData::percent(15.0));
        assert_eq!(
            pipeline.execute(&skipping, &mut data),
            Ok(ExecuteOutcome::SkippedZero)
        );
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        let running = ready(
            Counting {
                zero_execute: true,
                calls: Arc::clone(&calls),
                ..Default::default()
            },
            true,
        );
        let mut data = attack(StatusData::new());
        assert_eq!(
            pipeline.execute(&running, &mut data),
            Ok(ExecuteOutcome::Executed)
        );
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn cancelled_execution_never_reaches_effect() {
        let calls = Arc::new(AtomicUsize::new(0));
        let pipeline = ExecutionPipeline::new(ListenerBus::new(vec![Arc::new(Canceller)]));
        let definition = ready(
            Counting {
                calls: Arc::clone(&calls),
                ..Default::default()
            },
            true,
        );

        let mut data = attack(StatusData::flat(4.0));
        assert_eq!(
            pipeline.execute(&definition, &mut data),
            Ok(ExecuteOutcome::Cancelled)
        );
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn disabled_attribute_still_publishes_but_does_not_run() {
        let calls = Arc::new(AtomicUsize::new(0));
        let pipeline = ExecutionPipeline::default();
        let definition = ready(
            Counting {
                calls: Arc::clone(&calls),
                ..Default::default()
            },
            false,
        );

        let mut data = attack(StatusData::flat(4.0));
        assert_eq!(
            pipeline.execute(&definition, &mut data),
            Ok(ExecuteOutcome::Disabled)
        );
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn fix_value_clamps_before_listeners_and_effect() {
        let last_min = Arc::new(parking_lot::Mutex::new(None));
        let pipeline = ExecutionPipeline::new(ListenerBus::new(vec![Arc::new(Doubler)]));
        let definition = ready(
            Counting {
                fix_value: true,
                last_min: Arc::clone(&last_min),
                ..Default::default()
            },
            true,
        );

        let mut data = attack(StatusData::from_parts(-3.0, 5.0, 0.0));
        assert_eq!(
            pipeline.execute(&definition, &mut data),
            Ok(ExecuteOutcome::Executed)
        );
        assert_eq!(*last_min.lock(), Some(0.0));
        assert_eq!(data.status().max, 10.0);
    }

    #[test]
    fn only_executed_runs_are_traced() {
        let captured = Captured::default();
        let subscriber = tracing_subscriber::registry().with(captured.clone());

        tracing::subscriber::with_default(subscriber, || {
            let running = ready(Counting::default(), true);
            let mut data = attack(StatusData::from_parts(4.0, 6.5, 12.0));
            assert_eq!(
                ExecutionPipeline::default().execute(&running, &mut data),
                Ok(ExecuteOutcome::Executed)
            );

            let cancelling = ExecutionPipeline::new(ListenerBus::new(vec![Arc::new(Canceller)]));
            let mut data = attack(StatusData::flat(4.0));
            assert_eq!(
                cancelling.execute(&running, &mut data),
                Ok(ExecuteOutcome::Cancelled)
            );

            let disabled = ready(Counting::default(), false);
            let mut data = attack(StatusData::flat(4.0));
            assert_eq!(
                ExecutionPipeline::default().execute(&disabled, &mut data),
                Ok(ExecuteOutcome::Disabled)
            );
        });

        let executed = captured.executed();
        assert_eq!(executed.len(), 1);
        let fields = &executed[0];
        assert_eq!(fields["attribute"], "Counting");
        assert_eq!(fields["min"], "4.0");
        assert_eq!(fields["max"], "6.5");
        assert_eq!(fields["percent"], "12.0");
        assert_eq!(fields["kind"], StatusType::Attack.to_string());
    }

    #[test]
    fn kind_mismatch_is_an_error() {
        let pipeline = ExecutionPipeline::default();
        let definition = ready(Counting::default(), true);
        let mut data = EventContext::Defense {
            victim: EntityId(2),
        }
        .into_event(StatusData::flat(1.0));

        assert_eq!(
            pipeline.execute(&definition, &mut data),
            Err(ExecuteError::DispatchMismatch {
                attribute: "Counting".into(),
                expected: StatusType::Attack,
                actual: StatusType::Defense,
            })
        );
    }

    #[test]
    fn unready_definition_is_not_executed() {
        let calls = Arc::new(AtomicUsize::new(0));
        let definition = ready(
            Counting {
                calls: Arc::clone(&calls),
                ..Default::default()
            },
            true,
        );
        definition.set_ready(false);

        let mut data = attack(StatusData::flat(1.0));
        assert_eq!(
            ExecutionPipeline::default().execute(&definition, &mut data),
            Ok(ExecuteOutcome::NotReady)
        );
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }
}
