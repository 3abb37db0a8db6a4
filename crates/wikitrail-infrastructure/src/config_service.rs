//! Configuration loading.
//!
//! Reads `AppConfig` from config.toml. A missing or empty file yields the
//! defaults; a malformed one is an error so typos are not silently ignored.

use crate::paths::TrailPaths;
use crate::storage::AtomicTomlFile;
use std::path::{Path, PathBuf};
use wikitrail_core::config::AppConfig;
use wikitrail_core::error::{Result, TrailError};

#[derive(Debug, Clone)]
pub struct ConfigService {
    path: PathBuf,
}

impl ConfigService {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Uses the default config file location.
    pub fn from_paths(paths: &TrailPaths) -> Result<Self> {
        Ok(Self::new(paths.config_file()?))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> Result<AppConfig> {
        let file = AtomicTomlFile::<AppConfig>::new(self.path.clone());
        let loaded = file.load().map_err(|e| {
            TrailError::config(format!(
                "Failed to load config '{}': {}",
                self.path.display(),
                e
            ))
        })?;

        match loaded {
            Some(config) => Ok(config),
            None => {
                tracing::debug!(path = %self.path.display(), "No config file, using defaults");
                Ok(AppConfig::default())
            }
        }
    }

    pub fn save(&self, config: &AppConfig) -> Result<()> {
        AtomicTomlFile::<AppConfig>::new(self.path.clone()).save(config)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_yields_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let service = ConfigService::new(temp_dir.path().join("config.toml"));

        let config = service.load().unwrap();
        assert_eq!(config.tracker.site_domain, "wikipedia.org");
        assert!(config.storage.data_dir.is_none());
    }

    #[test]
    fn test_save_then_load() {
        let temp_dir = TempDir::new().unwrap();
        let service = ConfigService::new(temp_dir.path().join("config.toml"));

        let mut config = AppConfig::default();
        config.tracker.capture_location = false;
        config.storage.data_dir = Some(temp_dir.path().join("data"));
        service.save(&config).unwrap();

        let loaded = service.load().unwrap();
        assert!(!loaded.tracker.capture_location);
        assert_eq!(loaded.storage.data_dir, Some(temp_dir.path().join("data")));
    }

    #[test]
    fn test_malformed_file_is_config_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(&path, "[tracker\nsite_domain = ").unwrap();

        let err = ConfigService::new(path).load().unwrap_err();
        assert!(matches!(err, TrailError::Config(_)));
    }
}
