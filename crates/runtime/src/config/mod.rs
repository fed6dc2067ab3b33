//! Attribute configuration persistence.
//!
//! Each attribute owns one record in a [`ConfigStore`]. The first time an
//! attribute is loaded its record is materialised from
//! [`AttributeConfig::defaults_for`], adjusted by the attribute's
//! `default_config` hook, saved, and read back. Later loads read the stored
//! record unchanged.
//!
//! Stores are only touched from the config worker, so implementations do not
//! need to coordinate concurrent writers for the same attribute.

mod error;
mod file;
mod memory;

pub use error::{ConfigError, Result};
pub use file::FileConfigStore;
pub use memory::InMemoryConfigStore;

use attribute_core::{AttributeConfig, AttributeDefinition};

/// Key-value store holding one [`AttributeConfig`] per attribute name.
pub trait ConfigStore: Send + Sync {
    /// Returns the stored record, or `None` if the attribute has none yet.
    fn load(&self, name: &str) -> Result<Option<AttributeConfig>>;

    /// Creates or replaces the record for `name`.
    fn save(&self, name: &str, config: &AttributeConfig) -> Result<()>;
}

/// How [`load_or_materialize`] obtained the configuration.
#[derive(Clone, Debug, PartialEq)]
pub enum LoadOutcome {
    /// The store already had a record.
    Existing(AttributeConfig),
    /// Defaults were written during this load.
    Materialized(AttributeConfig),
}

impl LoadOutcome {
    pub fn config(&self) -> &AttributeConfig {
        match self {
            LoadOutcome::Existing(config) | LoadOutcome::Materialized(config) => config,
        }
    }

    pub fn into_config(self) -> AttributeConfig {
        match self {
            LoadOutcome::Existing(config) | LoadOutcome::Materialized(config) => config,
        }
    }

    pub fn is_materialized(&self) -> bool {
        matches!(self, LoadOutcome::Materialized(_))
    }
}

/// Reads the record for `definition`, writing defaults first if absent.
pub fn load_or_materialize(
    store: &dyn ConfigStore,
    definition: &AttributeDefinition,
) -> Result<LoadOutcome> {
    let name = definition.name();

    if let Some(config) = store.load(name)? {
        return Ok(LoadOutcome::Existing(config));
    }

    let mut defaults = AttributeConfig::defaults_for(name);
    definition.attribute().default_config(&mut defaults);
    store.save(name, &defaults)?;

    tracing::info!(
        target: "attribute::config",
        attribute = name,
        "Materialized default attribute config"
    );

    // Read back so the returned record is exactly what later loads will see.
    store
        .load(name)?
        .map(LoadOutcome::Materialized)
        .ok_or_else(|| ConfigError::MissingSection {
            name: name.to_string(),
        })
}
