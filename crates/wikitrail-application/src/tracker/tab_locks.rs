use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};
use wikitrail_core::tab::TabId;

/// Held while a tab's state transition runs.
pub type TabGuard = OwnedMutexGuard<()>;

/// One async mutex per tab.
///
/// Events for different tabs proceed concurrently; events for the same tab
/// are applied one at a time in lock acquisition order.
#[derive(Default)]
pub struct TabLocks {
    locks: Mutex<HashMap<TabId, Arc<AsyncMutex<()>>>>,
}

impl TabLocks {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn lock(&self, tab_id: TabId) -> TabGuard {
        let lock = {
            let mut locks = self.locks.lock().unwrap_or_else(|e| e.into_inner());
            locks.entry(tab_id).or_default().clone()
        };
        lock.lock_owned().await
    }

    /// Drops the tab's mutex when nobody holds or awaits it.
    pub fn release(&self, tab_id: TabId) {
        let mut locks = self.locks.lock().unwrap_or_else(|e| e.into_inner());
        if locks
            .get(&tab_id)
            .is_some_and(|lock| Arc::strong_count(lock) == 1)
        {
            locks.remove(&tab_id);
        }
    }

    pub fn len(&self) -> usize {
        self.locks.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_same_tab_is_serialized() {
        let locks = Arc::new(TabLocks::new());
        let guard = locks.lock(TabId::new(1)).await;

        let waiter = {
            let locks = locks.clone();
            tokio::spawn(async move {
                let _guard = locks.lock(TabId::new(1)).await;
            })
        };

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!waiter.is_finished());

        drop(guard);
        waiter.await.unwrap();
    }

    #[tokio::test]
    async fn test_different_tabs_do_not_block() {
        let locks = TabLocks::new();
        let _first = locks.lock(TabId::new(1)).await;
        let _second = locks.lock(TabId::new(2)).await;
        assert_eq!(locks.len(), 2);
    }

    #[tokio::test]
    async fn test_release_only_drops_idle_locks() {
        let locks = TabLocks::new();

        let guard = locks.lock(TabId::new(1)).await;
        locks.release(TabId::new(1));
        assert_eq!(locks.len(), 1);

        drop(guard);
        locks.release(TabId::new(1));
        assert!(locks.is_empty());
    }
}
