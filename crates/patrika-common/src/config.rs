use std::path::{Path, PathBuf};

use miette::{Result, miette};
use serde::{Deserialize, Serialize};

use crate::article::Author;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    /// Publication title shown in the masthead.
    pub title: String,
    /// Public base URL of the site.
    pub base_url: String,
    /// Primary authoring language (BCP 47 tag).
    pub primary_language: String,
    /// Secondary language the authoring assist targets.
    pub secondary_language: String,
    /// Placeholder shown in an empty editor.
    pub editor_placeholder: String,
    /// Base URL uploaded assets are served from.
    pub asset_base: String,
    /// Author profile articles inherit unless they override it.
    #[serde(default)]
    pub default_author: Author,
}

impl SiteConfig {
    /// Loads the configuration from the provided loader.
    pub fn load(loader: &impl Loader) -> Result<Self> {
        loader
            .load()
            .map_err(|_| miette!("Failed to load configuration"))
    }

    /// Saves the configuration using the provided saver.
    pub fn save(&self, saver: &impl Saver) -> Result<()> {
        saver
            .save(self)
            .map_err(|_| miette!("Failed to save configuration"))
    }
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: "Patrika".to_owned(),
            base_url: "https://patrika.example".to_owned(),
            primary_language: "en".to_owned(),
            secondary_language: "ne".to_owned(),
            editor_placeholder: "Start writing your article...".to_owned(),
            asset_base: "https://patrika.example/uploads/".to_owned(),
            default_author: Author::default(),
        }
    }
}

type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// The trait for loading configuration data.
pub trait Loader {
    /// Loads the configuration data.
    fn load(&self) -> core::result::Result<SiteConfig, BoxError>;
}

/// The trait for saving configuration data.
pub trait Saver {
    /// Saves the configuration data.
    fn save(&self, config: &SiteConfig) -> core::result::Result<(), BoxError>;
}

/// An implementation of [`Loader`] and [`Saver`] that reads and writes a
/// configuration file, serialized by file extension (`.json` or `.toml`).
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    /// Create a new [`FileStore`] with the given path.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl Loader for FileStore {
    fn load(&self) -> core::result::Result<SiteConfig, BoxError> {
        match self.path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Ok(serde_json::from_str(&std::fs::read_to_string(&self.path)?)?),
            Some("toml") => Ok(toml::from_str(&std::fs::read_to_string(&self.path)?)?),
            _ => Err(miette!("Unsupported file format").into()),
        }
    }
}

impl Saver for FileStore {
    fn save(&self, config: &SiteConfig) -> core::result::Result<(), BoxError> {
        match self.path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Ok(std::fs::write(
                &self.path,
                serde_json::to_string_pretty(config)?,
            )?),
            Some("toml") => Ok(std::fs::write(&self.path, toml::to_string_pretty(config)?)?),
            _ => Err(miette!("Unsupported file format").into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("site.json");
        let store = FileStore::new(&path);

        let config = SiteConfig::default();
        config.save(&store).unwrap();
        let loaded = SiteConfig::load(&store).unwrap();
        assert_eq!(loaded.title, config.title);
        assert_eq!(loaded.secondary_language, "ne");
    }

    #[test]
    fn test_toml_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("site.toml");
        let store = FileStore::new(&path);

        SiteConfig::default().save(&store).unwrap();
        let loaded = SiteConfig::load(&store).unwrap();
        assert_eq!(loaded.primary_language, "en");
    }

    #[test]
    fn test_unknown_extension_rejected() {
        let store = FileStore::new("site.yaml");
        assert!(SiteConfig::load(&store).is_err());
    }
}
