//! Capabilities provided by the host environment.
//!
//! The tracker never talks to a browser directly; it consumes these traits.

use async_trait::async_trait;

use crate::error::Result;
use crate::session::Location;
use crate::tab::{ActiveTab, TabId};

/// Enumerates the tabs that currently exist. Used once at startup.
#[async_trait]
pub trait TabEnumerator: Send + Sync {
    async fn live_tabs(&self) -> Result<Vec<TabId>>;
}

/// Best-effort geolocation. May fail or never resolve quickly; callers
/// must not wait on it.
#[async_trait]
pub trait LocationProvider: Send + Sync {
    async fn current_location(&self) -> Result<Location>;
}

/// Per-tab values kept by the host across tab close and restore.
///
/// When the host restores a closed tab it hands back whatever was stored
/// for it, which lets the tracker keep the restored tab's parent link.
#[async_trait]
pub trait TabValueStore: Send + Sync {
    async fn get(&self, tab_id: TabId) -> Result<Option<ActiveTab>>;

    async fn set(&self, entry: &ActiveTab) -> Result<()>;

    async fn remove(&self, tab_id: TabId) -> Result<()>;
}

/// A fixed tab set, for hosts that already know their tabs up front.
#[derive(Debug, Clone, Default)]
pub struct StaticTabs(pub Vec<TabId>);

#[async_trait]
impl TabEnumerator for StaticTabs {
    async fn live_tabs(&self) -> Result<Vec<TabId>> {
        Ok(self.0.clone())
    }
}
