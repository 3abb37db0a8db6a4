//! Path management for wikitrail configuration and data files.
//!
//! Platform directories come from AppPaths in the version-migrate crate.
//! Both roots can be overridden, which is how the CLI and tests point the
//! tracker at a scratch directory.

use std::path::PathBuf;
use version_migrate::AppPaths;

const APP_NAME: &str = "wikitrail";

/// Errors that can occur during path resolution.
#[derive(Debug)]
pub enum PathError {
    /// Home directory could not be determined.
    HomeDirNotFound,
}

impl std::fmt::Display for PathError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PathError::HomeDirNotFound => write!(f, "Cannot find home directory"),
        }
    }
}

impl std::error::Error for PathError {}

impl From<PathError> for wikitrail_core::TrailError {
    fn from(err: PathError) -> Self {
        wikitrail_core::TrailError::config(err.to_string())
    }
}

/// Resolves every file the tracker reads or writes.
///
/// # Directory Structure
///
/// ```text
/// ~/.config/wikitrail/         # Config directory
/// └── config.toml              # AppConfig
///
/// ~/.local/share/wikitrail/    # Data directory
/// ├── sessions.toml            # Session ledger
/// ├── active_tabs.json         # Active-session index
/// └── logs/                    # Rolling CLI logs
/// ```
#[derive(Debug, Clone, Default)]
pub struct TrailPaths {
    config_override: Option<PathBuf>,
    data_override: Option<PathBuf>,
}

impl TrailPaths {
    /// `base_dir` replaces both roots when set.
    pub fn new(base_dir: Option<PathBuf>) -> Self {
        Self {
            config_override: base_dir.clone(),
            data_override: base_dir,
        }
    }

    /// Keeps the config root and moves only the data files.
    pub fn with_data_dir(mut self, data_dir: PathBuf) -> Self {
        self.data_override = Some(data_dir);
        self
    }

    fn app_paths() -> AppPaths {
        AppPaths::new(APP_NAME)
    }

    pub fn config_dir(&self) -> Result<PathBuf, PathError> {
        match &self.config_override {
            Some(dir) => Ok(dir.clone()),
            None => Self::app_paths()
                .config_dir()
                .map_err(|_| PathError::HomeDirNotFound),
        }
    }

    pub fn data_dir(&self) -> Result<PathBuf, PathError> {
        match &self.data_override {
            Some(dir) => Ok(dir.clone()),
            None => Self::app_paths()
                .data_dir()
                .map_err(|_| PathError::HomeDirNotFound),
        }
    }

    pub fn config_file(&self) -> Result<PathBuf, PathError> {
        Ok(self.config_dir()?.join("config.toml"))
    }

    pub fn sessions_file(&self) -> Result<PathBuf, PathError> {
        Ok(self.data_dir()?.join("sessions.toml"))
    }

    pub fn active_tabs_file(&self) -> Result<PathBuf, PathError> {
        Ok(self.data_dir()?.join("active_tabs.json"))
    }

    pub fn logs_dir(&self) -> Result<PathBuf, PathError> {
        Ok(self.data_dir()?.join("logs"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_dirs_end_with_app_name() {
        let paths = TrailPaths::default();
        assert!(paths.config_dir().unwrap().ends_with(APP_NAME));
        assert!(paths.data_dir().unwrap().ends_with(APP_NAME));
    }

    #[test]
    fn test_base_dir_override() {
        let paths = TrailPaths::new(Some(PathBuf::from("/tmp/trail")));

        assert_eq!(
            paths.config_file().unwrap(),
            PathBuf::from("/tmp/trail/config.toml")
        );
        assert_eq!(
            paths.sessions_file().unwrap(),
            PathBuf::from("/tmp/trail/sessions.toml")
        );
        assert_eq!(
            paths.active_tabs_file().unwrap(),
            PathBuf::from("/tmp/trail/active_tabs.json")
        );
        assert_eq!(paths.logs_dir().unwrap(), PathBuf::from("/tmp/trail/logs"));
    }

    #[test]
    fn test_data_dir_override_keeps_config_root() {
        let paths =
            TrailPaths::new(Some(PathBuf::from("/tmp/cfg"))).with_data_dir(PathBuf::from("/tmp/data"));

        assert!(paths.config_file().unwrap().starts_with("/tmp/cfg"));
        assert!(paths.sessions_file().unwrap().starts_with("/tmp/data"));
        assert_eq!(paths.logs_dir().unwrap(), PathBuf::from("/tmp/data/logs"));
    }
}
