//! Active-session index persistence.
//!
//! The index is a small versioned JSON document managed by FileStorage.

use crate::dto::{ACTIVE_TABS_ENTITY, create_active_tabs_migrator};
use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Mutex;
use version_migrate::{FileStorage, FileStorageStrategy, FormatStrategy, LoadBehavior};
use wikitrail_core::error::{Result, TrailError};
use wikitrail_core::tab::{ActiveTab, ActiveTabRepository, ActiveTabs};

/// [`ActiveTabRepository`] backed by `active_tabs.json`.
///
/// The file is created with an empty index the first time it is opened.
#[derive(Clone)]
pub struct FileActiveTabRepository {
    storage: Arc<Mutex<FileStorage>>,
}

impl FileActiveTabRepository {
    pub async fn new(path: PathBuf) -> Result<Self> {
        tokio::task::spawn_blocking(move || Self::open_storage(path))
            .await
            .map_err(|e| TrailError::internal(format!("Failed to join task: {}", e)))?
    }

    fn open_storage(path: PathBuf) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let default_state = serde_json::to_value(ActiveTabs::default())?;

        let strategy = FileStorageStrategy::new()
            .with_format(FormatStrategy::Json)
            .with_load_behavior(LoadBehavior::SaveIfMissing)
            .with_default_value(default_state);

        let storage = FileStorage::new(path, create_active_tabs_migrator(), strategy)?;

        Ok(Self {
            storage: Arc::new(Mutex::new(storage)),
        })
    }
}

#[async_trait]
impl ActiveTabRepository for FileActiveTabRepository {
    async fn load(&self) -> Result<Vec<ActiveTab>> {
        let storage = self.storage.lock().await;
        let states: Vec<ActiveTabs> = storage.query(ACTIVE_TABS_ENTITY)?;
        Ok(states
            .into_iter()
            .next()
            .map(|state| state.tabs)
            .unwrap_or_default())
    }

    async fn save(&self, tabs: &[ActiveTab]) -> Result<()> {
        let storage = self.storage.clone();
        let state = ActiveTabs::new(tabs.to_vec());

        tokio::task::spawn_blocking(move || {
            let mut storage = storage.blocking_lock();
            storage
                .update_and_save(ACTIVE_TABS_ENTITY, vec![state])
                .map_err(|e| TrailError::data_access(format!("Failed to save active_tabs: {}", e)))
        })
        .await
        .map_err(|e| TrailError::internal(format!("Failed to join task: {}", e)))??;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use wikitrail_core::session::SessionId;
    use wikitrail_core::tab::TabId;

    #[tokio::test]
    async fn test_new_file_starts_empty() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("data/active_tabs.json");

        let repo = FileActiveTabRepository::new(path.clone()).await.unwrap();

        assert!(repo.load().await.unwrap().is_empty());
        assert!(path.exists());
    }

    #[tokio::test]
    async fn test_save_survives_reopen() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("active_tabs.json");

        {
            let repo = FileActiveTabRepository::new(path.clone()).await.unwrap();
            repo.save(&[
                ActiveTab::new(TabId::new(8), SessionId::new(2), "Dog"),
                ActiveTab::new(TabId::new(3), SessionId::new(1), "Cat"),
            ])
            .await
            .unwrap();
        }

        let reopened = FileActiveTabRepository::new(path).await.unwrap();
        let tabs = reopened.load().await.unwrap();

        assert_eq!(tabs.len(), 2);
        assert_eq!(tabs[0], ActiveTab::new(TabId::new(3), SessionId::new(1), "Cat"));
        assert_eq!(tabs[1].tab_id, TabId::new(8));
    }

    #[tokio::test]
    async fn test_save_replaces_previous_index() {
        let temp_dir = TempDir::new().unwrap();
        let repo = FileActiveTabRepository::new(temp_dir.path().join("active_tabs.json"))
            .await
            .unwrap();

        repo.save(&[ActiveTab::new(TabId::new(1), SessionId::new(1), "Cat")])
            .await
            .unwrap();
        repo.save(&[]).await.unwrap();

        assert!(repo.load().await.unwrap().is_empty());
    }
}
