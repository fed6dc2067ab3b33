//! Attribute behaviour bound to its loaded configuration.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::RwLock;

use crate::attribute::Attribute;
use crate::config::AttributeConfig;
use crate::event::StatusType;
use crate::markup::strip_markup;
use crate::overlay::{BonusSource, ItemStack, merge_bonuses};
use crate::pattern::PatternSet;
use crate::status::{PlaceholderType, StatusData};

/// Configuration plus the templates compiled from it.
#[derive(Debug)]
struct Loaded {
    config: AttributeConfig,
    patterns: PatternSet,
}

/// The unit stored in the registry.
///
/// Wraps an [`Attribute`] with the configuration-derived properties
/// (priority, enablement, templates) and a readiness flag. Definitions are
/// shared as `Arc<AttributeDefinition>`; two definitions are the same
/// registry entry only if they are the same allocation (see [`same`]).
///
/// Until a configuration has been applied the definition reports priority 0,
/// is disabled and extracts nothing.
///
/// [`same`]: AttributeDefinition::same
pub struct AttributeDefinition {
    attribute: Box<dyn Attribute>,
    name: String,
    loaded: RwLock<Option<Loaded>>,
    ready: AtomicBool,
}

impl AttributeDefinition {
    pub fn new(attribute: impl Attribute) -> Self {
        Self::from_boxed(Box::new(attribute))
    }

    pub fn from_boxed(attribute: Box<dyn Attribute>) -> Self {
        let name = attribute.name().to_string();
        Self {
            attribute,
            name,
            loaded: RwLock::new(None),
            ready: AtomicBool::new(false),
        }
    }

    pub fn shared(attribute: impl Attribute) -> Arc<Self> {
        Arc::new(Self::new(attribute))
    }

    /// Identity comparison used by the registry.
    pub fn same(a: &Arc<Self>, b: &Arc<Self>) -> bool {
        Arc::ptr_eq(a, b)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn attribute(&self) -> &dyn Attribute {
        self.attribute.as_ref()
    }

    pub fn kind(&self) -> StatusType {
        self.attribute.kind()
    }

    pub fn is_percent_attribute(&self) -> bool {
        self.attribute.is_percent_attribute()
    }

    pub fn is_zero_execute(&self) -> bool {
        self.attribute.is_zero_execute()
    }

    pub fn is_fix_value(&self) -> bool {
        self.attribute.is_fix_value()
    }

    // ------------------------------------------------------------------
    // Configuration-derived properties
    // ------------------------------------------------------------------

    /// Installs a configuration and recompiles its templates.
    pub fn apply_config(&self, config: AttributeConfig) {
        let patterns = PatternSet::compile(&config.patterns);
        if patterns.len() != config.patterns.len() {
            tracing::warn!(
                target: "attribute::pattern",
                attribute = %self.name,
                compiled = patterns.len(),
                configured = config.patterns.len(),
                "Some lore templates were skipped"
            );
        }
        *self.loaded.write() = Some(Loaded { config, patterns });
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded.read().is_some()
    }

    /// Snapshot of the loaded configuration.
    pub fn config(&self) -> Option<AttributeConfig> {
        self.loaded.read().as_ref().map(|loaded| loaded.config.clone())
    }

    pub fn priority(&self) -> i32 {
        self.loaded
            .read()
            .as_ref()
            .map_or(0, |loaded| loaded.config.priority)
    }

    pub fn is_enabled(&self) -> bool {
        self.loaded
            .read()
            .as_ref()
            .is_some_and(|loaded| loaded.config.enable)
    }

    pub fn display_name(&self) -> String {
        self.loaded
            .read()
            .as_ref()
            .and_then(|loaded| loaded.config.display_name.clone())
            .unwrap_or_else(|| self.name.clone())
    }

    /// `Description` from the configuration, else the attribute's own.
    pub fn description(&self) -> String {
        self.loaded
            .read()
            .as_ref()
            .and_then(|loaded| loaded.config.extra_value::<String>("Description"))
            .unwrap_or_else(|| self.attribute.description().to_string())
    }

    /// Configured templates, including ones that failed to compile.
    pub fn patterns(&self) -> Vec<String> {
        self.loaded
            .read()
            .as_ref()
            .map(|loaded| loaded.config.patterns.clone())
            .unwrap_or_default()
    }

    // ------------------------------------------------------------------
    // Readiness
    // ------------------------------------------------------------------

    /// True once registration has settled and until unregistration.
    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::Acquire)
    }

    /// Set by the registry owner; not meant for attribute code.
    pub fn set_ready(&self, ready: bool) {
        self.ready.store(ready, Ordering::Release);
    }

    // ------------------------------------------------------------------
    // Extraction
    // ------------------------------------------------------------------

    /// Value of already stripped lore lines.
    pub fn parse_lines(&self, lines: &[String]) -> StatusData {
        match self.loaded.read().as_ref() {
            Some(loaded) => self.attribute.parse_lore(&loaded.patterns, lines),
            None => StatusData::new(),
        }
    }

    /// Lore value of `items` with their stored bonuses merged in.
    pub fn parse_value(&self, items: &[ItemStack], bonus: &dyn BonusSource) -> StatusData {
        let lines: Vec<String> = items
            .iter()
            .flat_map(|item| item.lore.iter())
            .map(|line| strip_markup(line))
            .collect();

        merge_bonuses(items, &self.name, self.parse_lines(&lines), bonus)
    }

    /// Text for one component of the value of `items`.
    pub fn placeholder(
        &self,
        kind: PlaceholderType,
        items: &[ItemStack],
        bonus: &dyn BonusSource,
    ) -> String {
        let mut text = self.parse_value(items, bonus).placeholder(kind);
        if self.is_percent_attribute() {
            text.push('%');
        }
        text
    }
}

impl fmt::Debug for AttributeDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AttributeDefinition")
            .field("name", &self.name)
            .field("kind", &self.kind())
            .field("priority", &self.priority())
            .field("enabled", &self.is_enabled())
            .field("ready", &self.is_ready())
            .finish()
    }
}
