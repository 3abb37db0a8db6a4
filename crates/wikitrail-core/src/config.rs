//! Configuration model.
//!
//! Loaded from `config.toml`; every field has a default so a missing or
//! partial file is valid.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Which URLs count as tracked pages.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct TrackerConfig {
    /// Registrable domain of the tracked site; subdomains match too
    pub site_domain: String,
    /// Path prefix of article pages; the rest of the path is the title
    pub article_path_prefix: String,
    /// Path of the site's internal search endpoint
    pub search_path: String,
    /// Query parameter carrying the search term
    pub search_param: String,
    /// Ask the host for a location after opening a session
    pub capture_location: bool,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            site_domain: "wikipedia.org".to_string(),
            article_path_prefix: "/wiki/".to_string(),
            search_path: "/w/index.php".to_string(),
            search_param: "search".to_string(),
            capture_location: true,
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct StorageConfig {
    /// Overrides the platform data directory
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,
}

#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct AppConfig {
    pub tracker: TrackerConfig,
    pub storage: StorageConfig,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: AppConfig = toml::from_str(
            r#"
[tracker]
site_domain = "wikivoyage.org"
capture_location = false
"#,
        )
        .unwrap();

        assert_eq!(config.tracker.site_domain, "wikivoyage.org");
        assert!(!config.tracker.capture_location);
        assert_eq!(config.tracker.article_path_prefix, "/wiki/");
        assert_eq!(config.storage.data_dir, None);
    }

    #[test]
    fn test_empty_toml_is_default() {
        let config: AppConfig = toml::from_str("").unwrap();
        assert_eq!(config, AppConfig::default());
    }
}
