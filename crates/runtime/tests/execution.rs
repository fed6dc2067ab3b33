use std::sync::Arc;

use attribute_core::{
    Attribute, AttributeConfig, ConfiguredAttribute, EntityId, EventContext, EventData, ItemStack,
    NoBonus, PlaceholderType, StatusData, StatusType,
};
use attribute_runtime::{
    AttributeHandle, AttributeRuntime, ExecuteError, ExecuteListener, ExecuteOutcome,
    InMemoryConfigStore, StatusExecuteEvent,
};
use parking_lot::Mutex;

type Log = Arc<Mutex<Vec<(String, StatusData)>>>;

/// Attribute that records every effect it runs.
struct Recorded {
    name: &'static str,
    kind: StatusType,
    log: Log,
}

impl Attribute for Recorded {
    fn name(&self) -> &str {
        self.name
    }

    fn kind(&self) -> StatusType {
        self.kind
    }

    fn on_execute(&self, data: &EventData) {
        self.log.lock().push((self.name.to_string(), *data.status()));
    }
}

/// Cancels every execution of one attribute.
struct Veto(&'static str);

impl ExecuteListener for Veto {
    fn name(&self) -> &'static str {
        "veto"
    }

    fn on_status_execute(&self, event: &mut StatusExecuteEvent<'_>) {
        if event.definition().name() == self.0 {
            event.cancel();
        }
    }
}

fn store() -> Arc<InMemoryConfigStore> {
    Arc::new(
        InMemoryConfigStore::new()
            .with_config(
                "Damage",
                AttributeConfig::defaults_for("Damage")
                    .with_priority(10)
                    .with_patterns(["[VALUE] ATK"]),
            )
            .with_config(
                "Crit",
                AttributeConfig::defaults_for("Crit")
                    .with_priority(5)
                    .with_patterns(["[VALUE] Crit"]),
            )
            .with_config(
                "Armor",
                AttributeConfig::defaults_for("Armor")
                    .with_priority(20)
                    .with_patterns(["[VALUE] DEF"]),
            ),
    )
}

async fn register_all(handle: &AttributeHandle, log: &Log) {
    for (name, kind) in [
        ("Damage", StatusType::Attack),
        ("Crit", StatusType::Attack),
        ("Armor", StatusType::Defense),
    ] {
        handle
            .register(Recorded {
                name,
                kind,
                log: Arc::clone(log),
            })
            .await
            .expect("Register should be queued");
    }
    handle.flush().await.expect("Flush should succeed");
}

fn gear() -> Vec<ItemStack> {
    vec![
        ItemStack::new(["§c+5 ATK", "§75-10 ATK"]),
        ItemStack::new(["7% Crit", "3 DEF"]),
    ]
}

fn attack() -> EventContext {
    EventContext::Attack {
        attacker: EntityId(1),
        victim: EntityId(2),
    }
}

#[tokio::test]
async fn dispatch_runs_matching_attributes_in_priority_order() {
    let log: Log = Arc::default();
    let runtime = AttributeRuntime::builder()
        .store(store())
        .build()
        .expect("Runtime should start");
    let handle = runtime.handle();
    register_all(&handle, &log).await;

    // One flat point of stored damage on every item.
    let bonus = |_: &ItemStack, attribute: &str| {
        (attribute == "Damage").then(|| StatusData::flat(1.0))
    };
    let records = handle.dispatch(attack(), &gear(), &bonus);

    let summary: Vec<_> = records
        .iter()
        .map(|record| (record.attribute.as_str(), record.status, record.outcome.clone()))
        .collect();
    assert_eq!(
        summary,
        [
            (
                "Damage",
                StatusData::from_parts(12.0, 17.0, 0.0),
                Ok(ExecuteOutcome::Executed)
            ),
            ("Crit", StatusData::percent(7.0), Ok(ExecuteOutcome::Executed)),
        ]
    );
    assert_eq!(
        *log.lock(),
        [
            ("Damage".to_string(), StatusData::from_parts(12.0, 17.0, 0.0)),
            ("Crit".to_string(), StatusData::percent(7.0)),
        ]
    );

    let defense = handle.dispatch(
        EventContext::Defense {
            victim: EntityId(2),
        },
        &gear(),
        &NoBonus,
    );
    assert_eq!(defense.len(), 1);
    assert_eq!(defense[0].attribute, "Armor");
    assert_eq!(defense[0].status, StatusData::flat(3.0));

    runtime.shutdown().await.expect("Shutdown should succeed");
}

#[tokio::test]
async fn cancelled_attribute_is_skipped_without_stopping_dispatch() {
    let log: Log = Arc::default();
    let runtime = AttributeRuntime::builder()
        .store(store())
        .listener(Veto("Damage"))
        .build()
        .expect("Runtime should start");
    let handle = runtime.handle();
    register_all(&handle, &log).await;

    let records = handle.dispatch(attack(), &gear(), &NoBonus);

    assert_eq!(records[0].attribute, "Damage");
    assert_eq!(records[0].outcome, Ok(ExecuteOutcome::Cancelled));
    assert_eq!(records[1].attribute, "Crit");
    assert_eq!(records[1].outcome, Ok(ExecuteOutcome::Executed));
    assert_eq!(
        *log.lock(),
        [("Crit".to_string(), StatusData::percent(7.0))]
    );

    runtime.shutdown().await.expect("Shutdown should succeed");
}

#[tokio::test]
async fn direct_execution_checks_dispatch_kind() {
    let log: Log = Arc::default();
    let runtime = AttributeRuntime::builder()
        .store(store())
        .build()
        .expect("Runtime should start");
    let handle = runtime.handle();
    register_all(&handle, &log).await;

    let armor = handle.get("Armor").expect("Armor should be registered");
    let mut data = attack().into_event(StatusData::flat(4.0));

    assert_eq!(
        handle.execute(&armor, &mut data),
        Err(ExecuteError::DispatchMismatch {
            attribute: "Armor".into(),
            expected: StatusType::Defense,
            actual: StatusType::Attack,
        })
    );
    assert!(log.lock().is_empty());

    runtime.shutdown().await.expect("Shutdown should succeed");
}

#[tokio::test]
async fn unregistered_attribute_drops_out_of_dispatch() {
    let log: Log = Arc::default();
    let runtime = AttributeRuntime::builder()
        .store(store())
        .build()
        .expect("Runtime should start");
    let handle = runtime.handle();
    register_all(&handle, &log).await;

    let damage = handle.get("Damage").expect("Damage should be registered");
    assert!(handle.unregister(&damage));

    let records = handle.dispatch(attack(), &gear(), &NoBonus);
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].attribute, "Crit");

    let mut data = attack().into_event(StatusData::flat(4.0));
    assert_eq!(
        handle.execute(&damage, &mut data),
        Ok(ExecuteOutcome::NotReady)
    );

    runtime.shutdown().await.expect("Shutdown should succeed");
}

#[tokio::test]
async fn placeholders_render_extracted_values() {
    let runtime = AttributeRuntime::builder()
        .store(store())
        .build()
        .expect("Runtime should start");
    let handle = runtime.handle();
    for attribute in [
        ConfiguredAttribute::new("Damage", StatusType::Attack),
        ConfiguredAttribute::new("Crit", StatusType::Attack).percent(true),
    ] {
        handle
            .register(attribute)
            .await
            .expect("Register should be queued");
    }
    handle.flush().await.expect("Flush should succeed");

    let damage = handle.get("Damage").expect("Damage should be registered");
    let crit = handle.get("Crit").expect("Crit should be registered");

    assert_eq!(
        damage.placeholder(PlaceholderType::Range, &gear(), &NoBonus),
        "10 - 15"
    );
    assert_eq!(
        crit.placeholder(PlaceholderType::Percent, &gear(), &NoBonus),
        "7%"
    );

    runtime.shutdown().await.expect("Shutdown should succeed");
}
