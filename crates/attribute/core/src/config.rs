//! Per-attribute configuration record.
//!
//! Each attribute owns one namespace in the configuration store. The keys
//! keep the capitalised spelling server owners already use:
//!
//! ```toml
//! [Damage]
//! Enable = true
//! Priority = 10
//! DisplayName = "Damage"
//! Patterns = ["[VALUE] Damage", "Damage: [VALUE]"]
//! ```
//!
//! Keys not listed here are preserved in [`AttributeConfig::extra`] so that an
//! attribute's default-config hook can add its own settings.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::pattern::PLACEHOLDER;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AttributeConfig {
    #[serde(rename = "Enable", default = "default_enable")]
    pub enable: bool,

    #[serde(rename = "Priority", default)]
    pub priority: i32,

    #[serde(
        rename = "DisplayName",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub display_name: Option<String>,

    #[serde(rename = "Patterns", default)]
    pub patterns: Vec<String>,

    /// Attribute-specific keys.
    #[serde(flatten)]
    pub extra: toml::Table,
}

fn default_enable() -> bool {
    true
}

impl AttributeConfig {
    /// Defaults materialised the first time an attribute is loaded.
    pub fn defaults_for(name: &str) -> Self {
        Self {
            enable: true,
            priority: 0,
            display_name: Some(name.to_string()),
            patterns: vec![format!("{PLACEHOLDER} {name}")],
            extra: toml::Table::new(),
        }
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_enable(mut self, enable: bool) -> Self {
        self.enable = enable;
        self
    }

    pub fn with_patterns<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.patterns = patterns.into_iter().map(Into::into).collect();
        self
    }

    /// Typed read of an attribute-specific key.
    pub fn extra_value<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.extra
            .get(key)
            .cloned()
            .and_then(|value| value.try_into().ok())
    }
}
