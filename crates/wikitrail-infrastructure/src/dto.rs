//! Data Transfer Objects (DTOs) for persistence.
//!
//! These DTOs are the versioned on-disk schema. They stay private to the
//! infrastructure layer; the rest of the workspace only sees domain models.
//!
//! ### SessionRecord Version History
//! - **1.0.0**: Flat record with loose `lat`/`lon` fields
//! - **2.0.0**: Nested optional `location`
//!
//! ### ActiveTabs Version History
//! - **1.0.0**: Initial schema

pub mod active_tabs;
pub mod session_record;

pub use active_tabs::{ACTIVE_TABS_ENTITY, ActiveTabDTO, ActiveTabsV1_0_0, create_active_tabs_migrator};
pub use session_record::{
    LocationDTO, SESSION_RECORD_ENTITY, SessionRecordV1_0_0, SessionRecordV2_0_0,
    create_session_record_migrator,
};
