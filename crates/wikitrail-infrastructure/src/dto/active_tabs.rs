//! Active tab index DTOs

use serde::{Deserialize, Serialize};
use version_migrate::{FromDomain, IntoDomain, Versioned};

use wikitrail_core::session::SessionId;
use wikitrail_core::tab::{ActiveTab, ActiveTabs, TabId};

/// Entity name of the persisted active-session index.
pub const ACTIVE_TABS_ENTITY: &str = "active_tabs";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveTabDTO {
    pub tab_id: i64,
    pub session_id: u64,
    pub title: String,
}

impl From<ActiveTabDTO> for ActiveTab {
    fn from(dto: ActiveTabDTO) -> Self {
        ActiveTab::new(
            TabId::new(dto.tab_id),
            SessionId::new(dto.session_id),
            dto.title,
        )
    }
}

impl From<ActiveTab> for ActiveTabDTO {
    fn from(tab: ActiveTab) -> Self {
        ActiveTabDTO {
            tab_id: tab.tab_id.get(),
            session_id: tab.session_id.get(),
            title: tab.title,
        }
    }
}

/// V1.0.0: tab id → (session id, title) entries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Versioned)]
#[versioned(version = "1.0.0")]
pub struct ActiveTabsV1_0_0 {
    #[serde(default)]
    pub tabs: Vec<ActiveTabDTO>,
}

impl IntoDomain<ActiveTabs> for ActiveTabsV1_0_0 {
    fn into_domain(self) -> ActiveTabs {
        ActiveTabs::new(self.tabs.into_iter().map(Into::into).collect())
    }
}

impl FromDomain<ActiveTabs> for ActiveTabsV1_0_0 {
    fn from_domain(state: ActiveTabs) -> Self {
        ActiveTabsV1_0_0 {
            tabs: state.tabs.into_iter().map(Into::into).collect(),
        }
    }
}

pub fn create_active_tabs_migrator() -> version_migrate::Migrator {
    let mut migrator = version_migrate::Migrator::builder().build();

    let tabs_path = version_migrate::Migrator::define(ACTIVE_TABS_ENTITY)
        .from::<ActiveTabsV1_0_0>()
        .into_with_save::<ActiveTabs>();

    migrator
        .register(tabs_path)
        .expect("Failed to register active_tabs migration path");

    migrator
}
