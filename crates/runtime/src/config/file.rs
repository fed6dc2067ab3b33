//! File-based configuration store.

use std::fs;
use std::path::{Path, PathBuf};

use attribute_core::AttributeConfig;

use super::{ConfigError, ConfigStore, Result};

const HEADER: &str = "# Attribute configuration\n# Patterns use [VALUE] where the number appears in lore.\n\n";

/// One TOML file per attribute: `<dir>/<Name>.toml` holding a `[Name]` table.
///
/// Writes go to a temporary file first and are renamed into place, so a
/// crash mid-write never leaves a truncated config behind.
#[derive(Debug, Clone)]
pub struct FileConfigStore {
    base_dir: PathBuf,
}

impl FileConfigStore {
    /// Opens a store rooted at `base_dir`, creating the directory if needed.
    pub fn new(base_dir: impl AsRef<Path>) -> Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        fs::create_dir_all(&base_dir)?;
        Ok(Self { base_dir })
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Path to the config file of `name`.
    pub fn config_path(&self, name: &str) -> PathBuf {
        self.base_dir.join(format!("{}.toml", name))
    }

    /// Names of every attribute with a config file, sorted.
    pub fn list_attributes(&self) -> Result<Vec<String>> {
        let mut names = Vec::new();

        for entry in fs::read_dir(&self.base_dir)? {
            let path = entry?.path();
            if path.extension().and_then(|ext| ext.to_str()) == Some("toml")
                && let Some(stem) = path.file_stem().and_then(|s| s.to_str())
            {
                names.push(stem.to_string());
            }
        }

        names.sort();
        Ok(names)
    }
}

impl ConfigStore for FileConfigStore {
    fn load(&self, name: &str) -> Result<Option<AttributeConfig>> {
        let path = self.config_path(name);

        if !path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(&path)?;
        let mut document: toml::Table =
            toml::from_str(&content).map_err(|source| ConfigError::Parse {
                path: path.clone(),
                source,
            })?;

        let section = document
            .remove(name)
            .ok_or_else(|| ConfigError::MissingSection {
                name: name.to_string(),
            })?;
        let config: AttributeConfig = section
            .try_into()
            .map_err(|source| ConfigError::Malformed {
                name: name.to_string(),
                source,
            })?;

        tracing::debug!(
            target: "attribute::config",
            attribute = name,
            path = %path.display(),
            "Loaded attribute config"
        );

        Ok(Some(config))
    }

    fn save(&self, name: &str, config: &AttributeConfig) -> Result<()> {
        let path = self.config_path(name);
        let temp_path = path.with_extension("toml.tmp");

        let mut document = toml::Table::new();
        document.insert(name.to_string(), toml::Value::try_from(config)?);
        let body = toml::to_string_pretty(&document)?;

        fs::write(&temp_path, format!("{HEADER}{body}"))?;
        fs::rename(&temp_path, &path)?;

        tracing::debug!(
            target: "attribute::config",
            attribute = name,
            path = %path.display(),
            "Saved attribute config"
        );

        Ok(())
    }
}
