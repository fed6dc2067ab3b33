//! In-memory configuration store.

use std::collections::HashMap;

use attribute_core::AttributeConfig;
use parking_lot::RwLock;

use super::{ConfigStore, Result};

/// Volatile [`ConfigStore`] used when no config directory is set, and in tests.
#[derive(Debug, Default)]
pub struct InMemoryConfigStore {
    configs: RwLock<HashMap<String, AttributeConfig>>,
}

impl InMemoryConfigStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a record, as if it had been written by an earlier run.
    pub fn with_config(self, name: impl Into<String>, config: AttributeConfig) -> Self {
        self.configs.write().insert(name.into(), config);
        self
    }

    pub fn get(&self, name: &str) -> Option<AttributeConfig> {
        self.configs.read().get(name).cloned()
    }

    pub fn len(&self) -> usize {
        self.configs.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.configs.read().is_empty()
    }
}

impl ConfigStore for InMemoryConfigStore {
    fn load(&self, name: &str) -> Result<Option<AttributeConfig>> {
        Ok(self.get(name))
    }

    fn save(&self, name: &str, config: &AttributeConfig) -> Result<()> {
        self.configs.write().insert(name.to_string(), config.clone());
        Ok(())
    }
}
