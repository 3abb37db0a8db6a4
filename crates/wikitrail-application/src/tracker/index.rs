use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::RwLock;
use wikitrail_core::error::Result;
use wikitrail_core::tab::{ActiveTab, ActiveTabRepository, TabId};

/// In-memory map from tab to its open session, written through to a
/// repository on every change.
///
/// The in-memory state is authoritative for the running process. A failed
/// write is logged and not rolled back; the persisted copy is only a cache
/// that startup reconciliation can repair.
pub struct ActiveSessionIndex {
    entries: RwLock<HashMap<TabId, ActiveTab>>,
    repository: Arc<dyn ActiveTabRepository>,
}

impl ActiveSessionIndex {
    pub fn new(repository: Arc<dyn ActiveTabRepository>) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            repository,
        }
    }

    /// Replaces the in-memory state with the persisted snapshot.
    ///
    /// Returns the number of entries loaded.
    pub async fn load(&self) -> Result<usize> {
        let stored = self.repository.load().await?;

        let mut entries = self.entries.write().await;
        entries.clear();
        for entry in stored {
            entries.insert(entry.tab_id, entry);
        }

        tracing::debug!(count = entries.len(), "Loaded active-session index");
        Ok(entries.len())
    }

    pub async fn get(&self, tab_id: TabId) -> Option<ActiveTab> {
        self.entries.read().await.get(&tab_id).cloned()
    }

    /// Returns the entry previously held for the tab, if any.
    pub async fn insert(&self, entry: ActiveTab) -> Option<ActiveTab> {
        let mut entries = self.entries.write().await;
        let previous = entries.insert(entry.tab_id, entry);
        self.persist(&entries).await;
        previous
    }

    pub async fn remove(&self, tab_id: TabId) -> Option<ActiveTab> {
        let mut entries = self.entries.write().await;
        let removed = entries.remove(&tab_id);
        if removed.is_some() {
            self.persist(&entries).await;
        }
        removed
    }

    pub async fn tab_ids(&self) -> Vec<TabId> {
        let mut ids: Vec<TabId> = self.entries.read().await.keys().copied().collect();
        ids.sort();
        ids
    }

    /// Drops every entry whose tab is not in `live`. Returns the dropped
    /// tab ids in ascending order.
    pub async fn retain_live(&self, live: &HashSet<TabId>) -> Vec<TabId> {
        let mut entries = self.entries.write().await;

        let mut stale: Vec<TabId> = entries
            .keys()
            .filter(|tab_id| !live.contains(*tab_id))
            .copied()
            .collect();
        stale.sort();

        if !stale.is_empty() {
            for tab_id in &stale {
                entries.remove(tab_id);
            }
            self.persist(&entries).await;
        }

        stale
    }

    /// Entries ordered by tab id.
    pub async fn snapshot(&self) -> Vec<ActiveTab> {
        let entries = self.entries.read().await;
        sorted(&entries)
    }

    async fn persist(&self, entries: &HashMap<TabId, ActiveTab>) {
        if let Err(e) = self.repository.save(&sorted(entries)).await {
            tracing::error!(error = %e, "Failed to persist active-session index");
        }
    }
}

fn sorted(entries: &HashMap<TabId, ActiveTab>) -> Vec<ActiveTab> {
    let mut tabs: Vec<ActiveTab> = entries.values().cloned().collect();
    tabs.sort_by_key(|t| t.tab_id);
    tabs
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use wikitrail_core::TrailError;
    use wikitrail_core::session::SessionId;

    #[derive(Default)]
    struct RecordingRepository {
        stored: Mutex<Vec<ActiveTab>>,
        saves: Mutex<usize>,
        fail_saves: bool,
    }

    #[async_trait]
    impl ActiveTabRepository for RecordingRepository {
        async fn load(&self) -> Result<Vec<ActiveTab>> {
            Ok(self.stored.lock().unwrap().clone())
        }

        async fn save(&self, tabs: &[ActiveTab]) -> Result<()> {
            *self.saves.lock().unwrap() += 1;
            if self.fail_saves {
                return Err(TrailError::io("disk full"));
            }
            *self.stored.lock().unwrap() = tabs.to_vec();
            Ok(())
        }
    }

    fn entry(tab: i64, session: u64, title: &str) -> ActiveTab {
        ActiveTab::new(TabId::new(tab), SessionId::new(session), title)
    }

    #[tokio::test]
    async fn test_insert_and_remove_write_through() {
        let repo = Arc::new(RecordingRepository::default());
        let index = ActiveSessionIndex::new(repo.clone());

        assert!(index.insert(entry(2, 1, "Cat")).await.is_none());
        assert!(index.insert(entry(1, 2, "Dog")).await.is_none());
        assert_eq!(repo.stored.lock().unwrap().len(), 2);
        assert_eq!(repo.stored.lock().unwrap()[0].tab_id, TabId::new(1));

        let removed = index.remove(TabId::new(2)).await.unwrap();
        assert_eq!(removed.title, "Cat");
        assert_eq!(*repo.stored.lock().unwrap(), vec![entry(1, 2, "Dog")]);
    }

    #[tokio::test]
    async fn test_remove_absent_tab_does_not_write() {
        let repo = Arc::new(RecordingRepository::default());
        let index = ActiveSessionIndex::new(repo.clone());

        assert!(index.remove(TabId::new(9)).await.is_none());
        assert_eq!(*repo.saves.lock().unwrap(), 0);
    }

    #[tokio::test]
    async fn test_load_and_retain_live() {
        let repo = Arc::new(RecordingRepository::default());
        *repo.stored.lock().unwrap() = vec![entry(3, 1, "Cat"), entry(7, 2, "Dog"), entry(5, 3, "Fox")];

        let index = ActiveSessionIndex::new(repo.clone());
        assert_eq!(index.load().await.unwrap(), 3);

        let live: HashSet<TabId> = [TabId::new(3)].into_iter().collect();
        let dropped = index.retain_live(&live).await;

        assert_eq!(dropped, vec![TabId::new(5), TabId::new(7)]);
        assert_eq!(index.tab_ids().await, vec![TabId::new(3)]);
        assert_eq!(*repo.stored.lock().unwrap(), vec![entry(3, 1, "Cat")]);
    }

    #[tokio::test]
    async fn test_failed_persist_keeps_memory_state() {
        let repo = Arc::new(RecordingRepository {
            fail_saves: true,
            ..Default::default()
        });
        let index = ActiveSessionIndex::new(repo.clone());

        index.insert(entry(1, 1, "Cat")).await;

        assert_eq!(index.get(TabId::new(1)).await, Some(entry(1, 1, "Cat")));
        assert!(repo.stored.lock().unwrap().is_empty());
        assert_eq!(index.snapshot().await.len(), 1);
    }
}
