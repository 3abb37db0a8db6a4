use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::task::JoinHandle;
use wikitrail_core::clock::{Clock, SystemClock};
use wikitrail_core::config::TrackerConfig;
use wikitrail_core::error::Result;
use wikitrail_core::host::{LocationProvider, TabEnumerator, TabValueStore};
use wikitrail_core::navigation::{BrowserEventHandler, NavigationEvent, TitleExtractor};
use wikitrail_core::session::{NewSession, Session, SessionId, SessionStore};
use wikitrail_core::tab::{ActiveTab, ActiveTabRepository, TabId};

use super::index::ActiveSessionIndex;
use super::tab_locks::TabLocks;

/// Turns host navigation and tab lifecycle events into session records.
///
/// `SessionTracker` is responsible for:
/// - Opening a session when a tab lands on a tracked page
/// - Closing the tab's previous session and linking it as the new parent
/// - Keeping the active-session index in step with both
/// - Attaching a best-effort location to new sessions
///
/// Store failures are logged and absorbed; no event handler fails because
/// of them.
pub struct SessionTracker {
    store: Arc<dyn SessionStore>,
    index: ActiveSessionIndex,
    locks: TabLocks,
    extractor: TitleExtractor,
    clock: Arc<dyn Clock>,
    location_provider: Option<Arc<dyn LocationProvider>>,
    tab_values: Option<Arc<dyn TabValueStore>>,
    capture_location: bool,
    pending_locations: Mutex<Vec<JoinHandle<()>>>,
}

/// Builder for [`SessionTracker`].
pub struct SessionTrackerBuilder {
    config: TrackerConfig,
    store: Arc<dyn SessionStore>,
    tab_repository: Arc<dyn ActiveTabRepository>,
    clock: Arc<dyn Clock>,
    location_provider: Option<Arc<dyn LocationProvider>>,
    tab_values: Option<Arc<dyn TabValueStore>>,
}

impl SessionTrackerBuilder {
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn location_provider(mut self, provider: Arc<dyn LocationProvider>) -> Self {
        self.location_provider = Some(provider);
        self
    }

    pub fn tab_values(mut self, tab_values: Arc<dyn TabValueStore>) -> Self {
        self.tab_values = Some(tab_values);
        self
    }

    /// Fails only if the tracker config cannot produce a title extractor.
    pub fn build(self) -> Result<SessionTracker> {
        let extractor = TitleExtractor::new(&self.config)?;

        Ok(SessionTracker {
            store: self.store,
            index: ActiveSessionIndex::new(self.tab_repository),
            locks: TabLocks::new(),
            extractor,
            clock: self.clock,
            location_provider: self.location_provider,
            tab_values: self.tab_values,
            capture_location: self.config.capture_location,
            pending_locations: Mutex::new(Vec::new()),
        })
    }
}

impl SessionTracker {
    pub fn builder(
        config: TrackerConfig,
        store: Arc<dyn SessionStore>,
        tab_repository: Arc<dyn ActiveTabRepository>,
    ) -> SessionTrackerBuilder {
        SessionTrackerBuilder {
            config,
            store,
            tab_repository,
            clock: Arc::new(SystemClock),
            location_provider: None,
            tab_values: None,
        }
    }

    pub fn index(&self) -> &ActiveSessionIndex {
        &self.index
    }

    /// Loads the persisted index and drops entries for tabs that no longer
    /// exist.
    ///
    /// Dropped entries are not closed: their real close time was lost, and
    /// an abandoned open session is preferred over an invented end.
    ///
    /// # Returns
    ///
    /// The dropped tab ids. If the host cannot enumerate its tabs, nothing
    /// is dropped.
    ///
    /// # Errors
    ///
    /// Returns an error if the persisted index cannot be read.
    pub async fn startup(&self, tabs: &dyn TabEnumerator) -> Result<Vec<TabId>> {
        self.index.load().await?;

        let live: HashSet<TabId> = match tabs.live_tabs().await {
            Ok(live) => live.into_iter().collect(),
            Err(e) => {
                tracing::warn!(error = %e, "Tab enumeration failed; keeping persisted entries");
                return Ok(Vec::new());
            }
        };

        let dropped = self.index.retain_live(&live).await;
        for tab_id in &dropped {
            tracing::warn!(tab_id = %tab_id, "Dropped stale active-session entry");
        }
        tracing::info!(
            live = live.len(),
            dropped = dropped.len(),
            "Startup reconciliation finished"
        );

        Ok(dropped)
    }

    /// Closes the tab's open session at `close_time`.
    ///
    /// Returns the closed session's id, or `None` when the tab had no open
    /// session or its record no longer exists. Calling it twice is safe: the
    /// second call finds no entry.
    pub async fn close(&self, tab_id: TabId, close_time: DateTime<Utc>) -> Option<SessionId> {
        let _guard = self.locks.lock(tab_id).await;
        self.close_locked(tab_id, close_time).await
    }

    /// Waits for every location lookup started so far.
    pub async fn flush_locations(&self) {
        let pending = {
            let mut pending = self
                .pending_locations
                .lock()
                .unwrap_or_else(|e| e.into_inner());
            std::mem::take(&mut *pending)
        };

        for handle in pending {
            if let Err(e) = handle.await {
                tracing::warn!(error = %e, "Location task did not complete");
            }
        }
    }

    /// Caller must hold the tab's lock.
    async fn close_locked(&self, tab_id: TabId, close_time: DateTime<Utc>) -> Option<SessionId> {
        let entry = self.index.get(tab_id).await?;
        let session_id = entry.session_id;

        let result = self
            .store
            .update(
                session_id,
                Box::new(move |session: &mut Session| {
                    session.close_at(close_time);
                }),
            )
            .await;

        self.index.remove(tab_id).await;

        match result {
            Ok(Some(session)) => {
                tracing::info!(
                    tab_id = %tab_id,
                    session_id = %session_id,
                    title = %session.title,
                    "Closed session"
                );
                Some(session_id)
            }
            Ok(None) => {
                tracing::warn!(
                    tab_id = %tab_id,
                    session_id = %session_id,
                    "Session record missing on close"
                );
                None
            }
            Err(e) => {
                // The session did exist; keep it as the next parent.
                tracing::error!(
                    tab_id = %tab_id,
                    session_id = %session_id,
                    error = %e,
                    "Failed to record session end"
                );
                Some(session_id)
            }
        }
    }

    /// Creates the session, indexes it for the tab and starts the location
    /// lookup. Caller must hold the tab's lock.
    async fn open_locked(&self, tab_id: TabId, new_session: NewSession) -> Option<SessionId> {
        let title = new_session.title.clone();
        let parent = new_session.parent;

        let session_id = match self.store.create(new_session).await {
            Ok(id) => id,
            Err(e) => {
                tracing::error!(
                    tab_id = %tab_id,
                    title = %title,
                    error = %e,
                    "Failed to create session"
                );
                return None;
            }
        };

        tracing::info!(
            tab_id = %tab_id,
            session_id = %session_id,
            parent = ?parent.map(SessionId::get),
            title = %title,
            "Opened session"
        );

        let entry = ActiveTab::new(tab_id, session_id, title);
        self.index.insert(entry.clone()).await;
        self.remember_tab_value(&entry).await;
        self.spawn_location_capture(session_id);

        Some(session_id)
    }

    async fn remember_tab_value(&self, entry: &ActiveTab) {
        if let Some(values) = &self.tab_values {
            if let Err(e) = values.set(entry).await {
                tracing::warn!(tab_id = %entry.tab_id, error = %e, "Failed to store tab value");
            }
        }
    }

    async fn forget_tab_value(&self, tab_id: TabId) {
        if let Some(values) = &self.tab_values {
            if let Err(e) = values.remove(tab_id).await {
                tracing::warn!(tab_id = %tab_id, error = %e, "Failed to remove tab value");
            }
        }
    }

    fn spawn_location_capture(&self, session_id: SessionId) {
        if !self.capture_location {
            return;
        }
        let Some(provider) = self.location_provider.clone() else {
            return;
        };
        let store = self.store.clone();

        let handle = tokio::spawn(async move {
            let location = match provider.current_location().await {
                Ok(location) => location,
                Err(e) => {
                    tracing::warn!(session_id = %session_id, error = %e, "Location unavailable");
                    return;
                }
            };

            let attach = Box::new(move |session: &mut Session| {
                session.location = Some(location);
            });
            match store.update(session_id, attach).await {
                Ok(Some(_)) => {
                    tracing::debug!(session_id = %session_id, "Attached location");
                }
                Ok(None) => {}
                Err(e) => {
                    tracing::warn!(session_id = %session_id, error = %e, "Failed to attach location");
                }
            }
        });

        let mut pending = self
            .pending_locations
            .lock()
            .unwrap_or_else(|e| e.into_inner());
        pending.retain(|h| !h.is_finished());
        pending.push(handle);
    }
}

#[async_trait]
impl BrowserEventHandler for SessionTracker {
    async fn on_navigation_completed(&self, event: NavigationEvent) -> Result<()> {
        if !event.is_top_frame {
            tracing::trace!(tab_id = %event.tab_id, "Ignoring sub-frame navigation");
            return Ok(());
        }

        let tab_id = event.tab_id;
        let candidate = self.extractor.extract(&event.url);

        let _guard = self.locks.lock(tab_id).await;
        let now = self.clock.now();

        if let Some(page) = &candidate {
            if let Some(current) = self.index.get(tab_id).await {
                if current.title == page.title() {
                    tracing::debug!(
                        tab_id = %tab_id,
                        session_id = %current.session_id,
                        "Reload of the open page; nothing to do"
                    );
                    return Ok(());
                }
            }
        }

        let previous = self.close_locked(tab_id, now).await;

        match candidate {
            None => {
                tracing::debug!(tab_id = %tab_id, "Left tracked pages");
                self.forget_tab_value(tab_id).await;
            }
            Some(page) => {
                // Search pages start a new chain.
                let parent = if page.is_search() { None } else { previous };
                self.open_locked(tab_id, NewSession::new(page.title(), now, parent))
                    .await;
            }
        }

        Ok(())
    }

    async fn on_tab_removed(&self, tab_id: TabId) -> Result<()> {
        {
            let _guard = self.locks.lock(tab_id).await;
            let now = self.clock.now();
            self.close_locked(tab_id, now).await;
        }
        self.locks.release(tab_id);
        Ok(())
    }

    /// Re-attaches a tab the host restored with a stored tab value.
    ///
    /// An entry whose session is still open is re-installed as is. A closed
    /// session is continued by a new session with the same title that links
    /// back to it. An entry whose session no longer exists is discarded.
    async fn on_tab_created(&self, tab_id: TabId) -> Result<()> {
        let Some(values) = self.tab_values.clone() else {
            return Ok(());
        };

        let _guard = self.locks.lock(tab_id).await;

        let stored = match values.get(tab_id).await {
            Ok(Some(stored)) => stored,
            Ok(None) => return Ok(()),
            Err(e) => {
                tracing::warn!(tab_id = %tab_id, error = %e, "Failed to read tab value");
                return Ok(());
            }
        };

        if self.index.get(tab_id).await.is_some() {
            tracing::debug!(tab_id = %tab_id, "Restored tab is already tracked");
            return Ok(());
        }

        match self.store.get(stored.session_id).await {
            Ok(Some(session)) if session.is_open() => {
                tracing::info!(
                    tab_id = %tab_id,
                    session_id = %session.id,
                    "Re-attached restored tab"
                );
                let entry = ActiveTab::new(tab_id, session.id, session.title);
                self.index.insert(entry.clone()).await;
                self.remember_tab_value(&entry).await;
            }
            Ok(Some(session)) => {
                let now = self.clock.now();
                self.open_locked(
                    tab_id,
                    NewSession::new(session.title, now, Some(session.id)),
                )
                .await;
            }
            Ok(None) => {
                tracing::warn!(
                    tab_id = %tab_id,
                    session_id = %stored.session_id,
                    "Restored tab points at a missing session"
                );
                self.forget_tab_value(tab_id).await;
            }
            Err(e) => {
                tracing::error!(tab_id = %tab_id, error = %e, "Failed to read restored session");
            }
        }

        Ok(())
    }
}
