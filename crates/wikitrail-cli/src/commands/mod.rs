pub mod chains;
pub mod export;
pub mod reconcile;
pub mod replay;

use anyhow::{Context as _, Result};
use std::path::PathBuf;
use std::sync::Arc;
use wikitrail_application::SessionTracker;
use wikitrail_core::clock::Clock;
use wikitrail_core::config::{AppConfig, TrackerConfig};
use wikitrail_core::tab::TabId;
use wikitrail_infrastructure::{ConfigService, FileActiveTabRepository, FileSessionStore, TrailPaths};

/// Resolved configuration and file locations shared by every command.
pub struct Context {
    pub config: AppConfig,
    pub config_file: PathBuf,
    pub paths: TrailPaths,
}

impl Context {
    /// `data_dir` wins over the config file's `storage.data_dir`.
    ///
    /// Runs before logging is installed, so it does not emit events.
    pub fn load(config_path: Option<PathBuf>, data_dir: Option<PathBuf>) -> Result<Self> {
        let mut paths = TrailPaths::default();

        let config_service = match config_path {
            Some(path) => ConfigService::new(path),
            None => ConfigService::from_paths(&paths)?,
        };
        let config = config_service.load()?;
        let config_file = config_service.path().to_path_buf();

        if let Some(dir) = data_dir.or_else(|| config.storage.data_dir.clone()) {
            paths = paths.with_data_dir(dir);
        }

        Ok(Self {
            config,
            config_file,
            paths,
        })
    }

    pub fn session_store(&self) -> Result<Arc<FileSessionStore>> {
        let path = self
            .paths
            .sessions_file()
            .context("Failed to resolve sessions file")?;
        Ok(Arc::new(FileSessionStore::new(path)))
    }

    /// Builds a tracker over the on-disk stores. Location capture is off:
    /// the command line has no location source.
    pub async fn tracker(&self, clock: Arc<dyn Clock>) -> Result<SessionTracker> {
        let tabs_path = self
            .paths
            .active_tabs_file()
            .context("Failed to resolve active tabs file")?;
        let tab_repository = FileActiveTabRepository::new(tabs_path).await?;

        let config = TrackerConfig {
            capture_location: false,
            ..self.config.tracker.clone()
        };

        let tracker = SessionTracker::builder(config, self.session_store()?, Arc::new(tab_repository))
            .clock(clock)
            .build()?;
        Ok(tracker)
    }
}

pub fn tab_ids(raw: Vec<i64>) -> Vec<TabId> {
    raw.into_iter().map(TabId::new).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_data_dir_flag_moves_data_files_and_logs() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.toml");
        let data_dir = temp_dir.path().join("data");

        let context = Context::load(Some(config_path.clone()), Some(data_dir.clone())).unwrap();

        assert_eq!(context.config_file, config_path);
        assert_eq!(context.paths.logs_dir().unwrap(), data_dir.join("logs"));
        assert_eq!(
            context.paths.sessions_file().unwrap(),
            data_dir.join("sessions.toml")
        );
    }

    #[test]
    fn test_config_data_dir_moves_logs() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.toml");
        let data_dir = temp_dir.path().join("from-config");
        std::fs::write(
            &config_path,
            format!("[storage]\ndata_dir = {:?}\n", data_dir.display().to_string()),
        )
        .unwrap();

        let context = Context::load(Some(config_path), None).unwrap();

        assert_eq!(context.paths.logs_dir().unwrap(), data_dir.join("logs"));
    }
}
