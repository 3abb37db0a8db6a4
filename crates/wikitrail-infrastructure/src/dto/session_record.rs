//! Session record DTOs and migrations

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use version_migrate::{FromDomain, IntoDomain, MigratesTo, Versioned};

use wikitrail_core::session::{Location, Session, SessionId};

/// Entity name of session records in the migrator.
pub const SESSION_RECORD_ENTITY: &str = "session_record";

/// V1.0.0: flat record as produced by merging the separate begin, end and
/// location collections. Coordinates are stored as two loose fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Versioned)]
#[versioned(version = "1.0.0")]
pub struct SessionRecordV1_0_0 {
    pub id: u64,
    pub title: String,
    pub begin: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lat: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lon: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LocationDTO {
    pub latitude: f64,
    pub longitude: f64,
}

/// V2.0.0: single mutable record with a nested location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Versioned)]
#[versioned(version = "2.0.0")]
pub struct SessionRecordV2_0_0 {
    pub id: u64,
    pub title: String,
    pub begin: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<LocationDTO>,
}

/// Coordinates only count when both halves were recorded.
impl MigratesTo<SessionRecordV2_0_0> for SessionRecordV1_0_0 {
    fn migrate(self) -> SessionRecordV2_0_0 {
        let location = match (self.lat, self.lon) {
            (Some(latitude), Some(longitude)) => Some(LocationDTO {
                latitude,
                longitude,
            }),
            _ => None,
        };

        SessionRecordV2_0_0 {
            id: self.id,
            title: self.title,
            begin: self.begin,
            end: self.end,
            parent: self.parent,
            location,
        }
    }
}

impl IntoDomain<Session> for SessionRecordV2_0_0 {
    fn into_domain(self) -> Session {
        Session {
            id: SessionId::new(self.id),
            title: self.title,
            begin: self.begin,
            end: self.end,
            parent: self.parent.map(SessionId::new),
            location: self
                .location
                .map(|loc| Location::new(loc.latitude, loc.longitude)),
        }
    }
}

impl FromDomain<Session> for SessionRecordV2_0_0 {
    fn from_domain(session: Session) -> Self {
        SessionRecordV2_0_0 {
            id: session.id.get(),
            title: session.title,
            begin: session.begin,
            end: session.end,
            parent: session.parent.map(SessionId::get),
            location: session.location.map(|loc| LocationDTO {
                latitude: loc.latitude,
                longitude: loc.longitude,
            }),
        }
    }
}

/// Creates the migrator for session records.
///
/// # Migration Path
///
/// - V1.0.0 → V2.0.0: Folds `lat`/`lon` into `location`
/// - V2.0.0 → Session: Converts DTO to domain model
pub fn create_session_record_migrator() -> version_migrate::Migrator {
    let mut migrator = version_migrate::Migrator::builder().build();

    let record_path = version_migrate::Migrator::define(SESSION_RECORD_ENTITY)
        .from::<SessionRecordV1_0_0>()
        .step::<SessionRecordV2_0_0>()
        .into_with_save::<Session>();

    migrator
        .register(record_path)
        .expect("Failed to register session_record migration path");

    migrator
}
