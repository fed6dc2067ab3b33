//! Priority-ordered attribute registry.

use std::collections::HashMap;
use std::sync::Arc;

use attribute_core::AttributeDefinition;
use parking_lot::RwLock;
use tracing::{debug, info};

/// Result of [`AttributeRegistry::insert`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Insertion {
    /// Inserted at this index of the dispatch order.
    Inserted { position: usize },
    /// The same definition was already registered at this index.
    AlreadyPresent { position: usize },
}

/// A placed definition with the priority it was placed at.
///
/// A reload changes the definition's priority but not its slot, so the scan
/// compares slot priorities.
struct Slot {
    definition: Arc<AttributeDefinition>,
    priority: i32,
}

#[derive(Default)]
struct Entries {
    ordered: Vec<Slot>,
    by_name: HashMap<String, Arc<AttributeDefinition>>,
}

impl Entries {
    fn position_of(&self, definition: &Arc<AttributeDefinition>) -> Option<usize> {
        self.ordered
            .iter()
            .position(|slot| AttributeDefinition::same(&slot.definition, definition))
    }
}

/// Ordered sequence of definitions plus a name index, behind one lock.
///
/// # Ordering
///
/// A new definition goes right before the first entry with a strictly lower
/// priority, or at the end when no such entry exists. Entries are compared by
/// the priority they were inserted with, so the sequence stays sorted by
/// non-increasing priority even after a reload changes a definition's
/// priority in place. Definitions with equal priority keep registration order.
///
/// # Identity
///
/// The sequence holds each definition allocation at most once. Names index
/// the most recent registration: registering a second definition under an
/// existing name keeps both in the sequence but points the name at the new
/// one.
#[derive(Default)]
pub struct AttributeRegistry {
    entries: RwLock<Entries>,
}

impl AttributeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts `definition` at its priority position and marks it ready.
    ///
    /// The definition's configuration must already be loaded, since the scan
    /// compares priorities. Readiness is set under the same lock that
    /// [`unregister`](Self::unregister) clears it under.
    pub(crate) fn insert(&self, definition: &Arc<AttributeDefinition>) -> Insertion {
        let mut entries = self.entries.write();

        if let Some(position) = entries.position_of(definition) {
            debug!(
                target: "attribute::registry",
                attribute = definition.name(),
                position,
                "Attribute already registered"
            );
            return Insertion::AlreadyPresent { position };
        }

        let priority = definition.priority();
        let position = entries
            .ordered
            .iter()
            .position(|slot| slot.priority < priority)
            .unwrap_or(entries.ordered.len());

        entries.ordered.insert(
            position,
            Slot {
                definition: Arc::clone(definition),
                priority,
            },
        );
        entries
            .by_name
            .insert(definition.name().to_string(), Arc::clone(definition));
        definition.set_ready(true);
        drop(entries);

        info!(
            target: "attribute::registry",
            attribute = definition.name(),
            priority,
            position,
            "Registered attribute"
        );

        Insertion::Inserted { position }
    }

    /// Removes `definition` and clears its readiness.
    ///
    /// The name entry is only removed while it still points at this
    /// definition. Returns false if it was not registered.
    pub fn unregister(&self, definition: &Arc<AttributeDefinition>) -> bool {
        let mut entries = self.entries.write();

        let removed = match entries.position_of(definition) {
            Some(position) => {
                entries.ordered.remove(position);
                true
            }
            None => false,
        };

        if entries
            .by_name
            .get(definition.name())
            .is_some_and(|entry| AttributeDefinition::same(entry, definition))
        {
            entries.by_name.remove(definition.name());
        }
        definition.set_ready(false);
        drop(entries);

        if removed {
            info!(
                target: "attribute::registry",
                attribute = definition.name(),
                "Unregistered attribute"
            );
        }

        removed
    }

    /// Finds a definition by name.
    pub fn get(&self, name: &str) -> Option<Arc<AttributeDefinition>> {
        self.entries.read().by_name.get(name).cloned()
    }

    pub fn contains(&self, definition: &Arc<AttributeDefinition>) -> bool {
        self.entries.read().position_of(definition).is_some()
    }

    /// Dispatch-ordered copy of the sequence.
    ///
    /// Taken under the read lock and released immediately, so callers may
    /// execute attributes while registrations continue in the background.
    pub fn snapshot(&self) -> Vec<Arc<AttributeDefinition>> {
        self.entries
            .read()
            .ordered
            .iter()
            .map(|slot| Arc::clone(&slot.definition))
            .collect()
    }

    /// Names and slot priorities in dispatch order (for debugging).
    ///
    /// A slot priority is the priority the definition had when it was
    /// inserted; see [`AttributeDefinition::priority`] for the current one.
    pub fn order(&self) -> Vec<(String, i32)> {
        self.entries
            .read()
            .ordered
            .iter()
            .map(|slot| (slot.definition.name().to_string(), slot.priority))
            .collect()
    }

    /// Returns the number of definitions in the sequence.
    pub fn len(&self) -> usize {
        self.entries.read().ordered.len()
    }

    /// Returns true if no definitions are registered.
    pub fn is_empty(&self) -> bool {
        self.entries.read().ordered.is_empty()
    }

    /// Drops every definition. Used at runtime shutdown.
    pub(crate) fn clear(&self) {
        let mut entries = self.entries.write();
        for slot in entries.ordered.drain(..) {
            slot.definition.set_ready(false);
        }
        entries.by_name.clear();
    }
}
