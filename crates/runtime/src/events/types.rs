//! Event types for different topics.

/// Registry membership changes.
#[derive(Debug, Clone, PartialEq)]
pub enum RegistryEvent {
    /// An attribute was inserted into the ordered registry.
    Registered {
        name: String,
        priority: i32,
        /// Index in dispatch order at the time of insertion.
        position: usize,
    },

    /// An attribute was removed from the registry.
    Unregistered { name: String },

    /// Registration was abandoned because the attribute's config could not
    /// be loaded. The attribute stays out of the registry.
    RegistrationFailed { name: String, error: String },
}

/// Configuration store activity.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigEvent {
    /// Defaults were written for an attribute seen for the first time.
    Materialized { name: String },

    /// A stored config was applied during registration.
    Loaded { name: String },

    /// A stored config was re-read on request.
    Reloaded { name: String },

    /// Reading or writing the config failed.
    LoadFailed { name: String, error: String },
}
