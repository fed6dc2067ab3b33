//! Error types raised by configuration stores.

use std::path::PathBuf;

use thiserror::Error;

/// Errors surfaced by [`ConfigStore`](super::ConfigStore) implementations.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse {}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("failed to serialize attribute config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("config for attribute {name:?} has no [{name}] section")]
    MissingSection { name: String },

    #[error("config for attribute {name:?} is malformed")]
    Malformed {
        name: String,
        #[source]
        source: toml::de::Error,
    },
}

pub type Result<T> = std::result::Result<T, ConfigError>;
