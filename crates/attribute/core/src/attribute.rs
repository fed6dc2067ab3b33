//! The attribute behaviour trait.
//!
//! One type per attribute kind implements [`Attribute`]. The runtime never
//! sees concrete attribute types: they are boxed into an
//! [`AttributeDefinition`](crate::AttributeDefinition) which pairs the
//! behaviour with its loaded configuration.

use crate::config::AttributeConfig;
use crate::event::{EventData, StatusType};
use crate::pattern::PatternSet;
use crate::status::StatusData;

/// Behaviour of a single attribute kind.
///
/// Only [`kind`](Attribute::kind) and [`on_execute`](Attribute::on_execute)
/// are required; every other method has the default most attributes want.
pub trait Attribute: Send + Sync + 'static {
    /// Stable identifier, also the configuration namespace.
    ///
    /// Defaults to the implementing type's name without its module path.
    fn name(&self) -> &str {
        short_type_name(std::any::type_name::<Self>())
    }

    /// Execution kind this attribute is dispatched for.
    fn kind(&self) -> StatusType;

    /// Percent attributes render their placeholders with a `%` suffix.
    fn is_percent_attribute(&self) -> bool {
        false
    }

    /// Whether the effect still runs when the value is exactly zero.
    ///
    /// Turning this off skips zero-valued executions entirely, including the
    /// execution event, which saves work on attributes most items lack.
    fn is_zero_execute(&self) -> bool {
        true
    }

    /// Whether negative bounds are clamped to zero before execution.
    fn is_fix_value(&self) -> bool {
        false
    }

    /// Fallback description when the configuration has none.
    fn description(&self) -> &str {
        "No description."
    }

    /// Adjusts the defaults written the first time this attribute is loaded.
    fn default_config(&self, _config: &mut AttributeConfig) {}

    /// Called once the attribute has been inserted into the registry.
    fn on_registering(&self) {}

    /// Reduces stripped lore lines to a value. Override for custom grammars.
    fn parse_lore(&self, patterns: &PatternSet, lines: &[String]) -> StatusData {
        patterns.extract(lines)
    }

    /// Attribute effect.
    fn on_execute(&self, data: &EventData);
}

/// `my_plugin::attributes::Damage` → `Damage`
fn short_type_name(full: &'static str) -> &'static str {
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}

/// Attribute defined entirely by configuration.
///
/// Has no effect of its own: it exists so that values can be extracted,
/// shown through placeholders, and observed by execution listeners.
#[derive(Clone, Debug)]
pub struct ConfiguredAttribute {
    name: String,
    kind: StatusType,
    percent: bool,
}

impl ConfiguredAttribute {
    pub fn new(name: impl Into<String>, kind: StatusType) -> Self {
        Self {
            name: name.into(),
            kind,
            percent: false,
        }
    }

    pub fn percent(mut self, percent: bool) -> Self {
        self.percent = percent;
        self
    }
}

impl Attribute for ConfiguredAttribute {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> StatusType {
        self.kind
    }

    fn is_percent_attribute(&self) -> bool {
        self.percent
    }

    fn on_execute(&self, _data: &EventData) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    struct PhysicalDamage;

    impl Attribute for PhysicalDamage {
        fn kind(&self) -> StatusType {
            StatusType::Attack
        }

        fn on_execute(&self, _data: &EventData) {}
    }

    struct Wrapper<T>(T);

    impl<T: Send + Sync + 'static> Attribute for Wrapper<T> {
        fn kind(&self) -> StatusType {
            StatusType::Custom
        }

        fn on_execute(&self, _data: &EventData) {}
    }

    #[test]
    fn default_name_is_short_type_name() {
        assert_eq!(PhysicalDamage.name(), "PhysicalDamage");
        assert_eq!(Wrapper(0u8).name(), "Wrapper");
    }

    #[test]
    fn default_policies() {
        let attribute = PhysicalDamage;

        assert!(attribute.is_zero_execute());
        assert!(!attribute.is_fix_value());
        assert!(!attribute.is_percent_attribute());
    }

    #[test]
    fn configured_attribute_uses_given_name() {
        let attribute = ConfiguredAttribute::new("CritChance", StatusType::Attack).percent(true);

        assert_eq!(attribute.name(), "CritChance");
        assert_eq!(attribute.kind(), StatusType::Attack);
        assert!(attribute.is_percent_attribute());
    }
}
