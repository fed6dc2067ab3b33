//! Attribute model shared by the runtime and tooling.
//!
//! `attribute-core` turns item lore into numbers and describes what an
//! attribute does with them. It is deliberately free of I/O and async code:
//! loading configuration, ordering attributes and running them belong to the
//! runtime crate.
//!
//! Data flows through the modules in this order:
//! - [`markup`] strips display codes from lore lines
//! - [`pattern`] extracts a [`StatusData`] from the stripped lines
//! - [`overlay`] merges per-item bonus values on top
//! - [`event`] wraps the value into an [`EventData`] for execution
//! - [`attribute`] and [`definition`] hold the behaviour and its configuration
pub mod attribute;
pub mod config;
pub mod definition;
pub mod event;
pub mod markup;
pub mod overlay;
pub mod pattern;
pub mod status;

pub use attribute::{Attribute, ConfiguredAttribute};
pub use config::AttributeConfig;
pub use definition::AttributeDefinition;
pub use event::{EntityId, EventContext, EventData, StatusType};
pub use markup::strip_markup;
pub use overlay::{BonusSource, ItemStack, NoBonus, merge_bonuses};
pub use pattern::{CompiledPattern, PLACEHOLDER, PatternError, PatternSet};
pub use status::{PlaceholderType, StatusData};
