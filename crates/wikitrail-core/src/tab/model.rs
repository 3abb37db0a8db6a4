//! Active tab domain models.

use crate::session::SessionId;
use serde::{Deserialize, Serialize};
use std::fmt;
use version_migrate::DeriveQueryable as Queryable;

/// Host-assigned browser tab identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TabId(i64);

impl TabId {
    pub const fn new(raw: i64) -> Self {
        Self(raw)
    }

    pub const fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for TabId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for TabId {
    fn from(raw: i64) -> Self {
        Self(raw)
    }
}

/// The session currently open in a tab.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveTab {
    pub tab_id: TabId,
    pub session_id: SessionId,
    /// Title of the open session, used for the reload check
    pub title: String,
}

impl ActiveTab {
    pub fn new(tab_id: TabId, session_id: SessionId, title: impl Into<String>) -> Self {
        Self {
            tab_id,
            session_id,
            title: title.into(),
        }
    }
}

/// Persisted snapshot of the active-session index.
///
/// This is a cache: it can always be rebuilt from the stored sessions and
/// the live tab set, so losing it only loses parent links.
#[derive(Debug, Clone, Serialize, Deserialize, Queryable, Default, PartialEq)]
#[queryable(entity = "active_tabs")]
pub struct ActiveTabs {
    #[serde(default)]
    pub tabs: Vec<ActiveTab>,
}

impl ActiveTabs {
    pub fn new(mut tabs: Vec<ActiveTab>) -> Self {
        tabs.sort_by_key(|t| t.tab_id);
        Self { tabs }
    }
}
