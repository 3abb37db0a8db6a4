//! Host notifications and the handler interface that consumes them.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::tab::TabId;

/// A completed navigation in some frame of a tab.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavigationEvent {
    pub tab_id: TabId,
    pub url: String,
    /// Only top-level frame navigations are tracked
    pub is_top_frame: bool,
}

impl NavigationEvent {
    pub fn top_frame(tab_id: TabId, url: impl Into<String>) -> Self {
        Self {
            tab_id,
            url: url.into(),
            is_top_frame: true,
        }
    }
}

fn default_top_frame() -> bool {
    true
}

/// Recorded form of a host notification, one per line in a replay log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum HostEvent {
    NavigationCompleted {
        tab_id: TabId,
        url: String,
        #[serde(default = "default_top_frame")]
        is_top_frame: bool,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        at: Option<DateTime<Utc>>,
    },
    TabRemoved {
        tab_id: TabId,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        at: Option<DateTime<Utc>>,
    },
    TabCreated {
        tab_id: TabId,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        at: Option<DateTime<Utc>>,
    },
}

impl HostEvent {
    /// When the host observed the event, if recorded.
    pub fn at(&self) -> Option<DateTime<Utc>> {
        match self {
            HostEvent::NavigationCompleted { at, .. }
            | HostEvent::TabRemoved { at, .. }
            | HostEvent::TabCreated { at, .. } => *at,
        }
    }

    pub fn tab_id(&self) -> TabId {
        match self {
            HostEvent::NavigationCompleted { tab_id, .. }
            | HostEvent::TabRemoved { tab_id, .. }
            | HostEvent::TabCreated { tab_id, .. } => *tab_id,
        }
    }
}

/// One method per host event kind. Each returns once the event has been
/// fully applied, so a host can await completion.
#[async_trait]
pub trait BrowserEventHandler: Send + Sync {
    async fn on_navigation_completed(&self, event: NavigationEvent) -> Result<()>;

    async fn on_tab_removed(&self, tab_id: TabId) -> Result<()>;

    async fn on_tab_created(&self, tab_id: TabId) -> Result<()>;

    /// Routes a recorded event to the matching handler.
    async fn dispatch(&self, event: HostEvent) -> Result<()> {
        match event {
            HostEvent::NavigationCompleted {
                tab_id,
                url,
                is_top_frame,
                ..
            } => {
                self.on_navigation_completed(NavigationEvent {
                    tab_id,
                    url,
                    is_top_frame,
                })
                .await
            }
            HostEvent::TabRemoved { tab_id, .. } => self.on_tab_removed(tab_id).await,
            HostEvent::TabCreated { tab_id, .. } => self.on_tab_created(tab_id).await,
        }
    }
}
