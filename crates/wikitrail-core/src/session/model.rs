//! Session domain model.
//!
//! A session is one continuous interval a tab spent on a single tracked page.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Store-assigned session identifier.
///
/// Ids are handed out by the record store only, in increasing order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(u64);

impl SessionId {
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for SessionId {
    fn from(raw: u64) -> Self {
        Self(raw)
    }
}

/// Geographic position captured shortly after a session opened.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
}

impl Location {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

/// A tracked page view.
///
/// This is the single mutable record per session: it is created open
/// (`end == None`), closed in place, and may receive a location later.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    /// Store-assigned identifier
    pub id: SessionId,
    /// Article name, or `search:<term>` for search result pages
    pub title: String,
    /// When the page view started
    pub begin: DateTime<Utc>,
    /// When the page view ended; `None` while open
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<DateTime<Utc>>,
    /// Session whose navigation produced this one. Never changes after creation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<SessionId>,
    /// Location at visit time, if it ever arrived
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
}

impl Session {
    /// Builds the stored form of a new session once the store has picked an id.
    pub fn open(id: SessionId, new: NewSession) -> Self {
        Self {
            id,
            title: new.title,
            begin: new.begin,
            end: None,
            parent: new.parent,
            location: None,
        }
    }

    pub fn is_open(&self) -> bool {
        self.end.is_none()
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    /// `end - begin`, absent while the session is open.
    pub fn duration(&self) -> Option<Duration> {
        self.end.map(|end| end - self.begin)
    }

    /// Closes the session at `at` unless it is already closed.
    ///
    /// The end time never precedes `begin`. Returns `false` when the
    /// session had already been closed.
    pub fn close_at(&mut self, at: DateTime<Utc>) -> bool {
        if self.end.is_some() {
            return false;
        }
        self.end = Some(at.max(self.begin));
        true
    }
}

/// A session as submitted to the store, before an id exists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewSession {
    pub title: String,
    pub begin: DateTime<Utc>,
    pub parent: Option<SessionId>,
}

impl NewSession {
    pub fn new(title: impl Into<String>, begin: DateTime<Utc>, parent: Option<SessionId>) -> Self {
        Self {
            title: title.into(),
            begin,
            parent,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
    }

    #[test]
    fn test_open_session_has_no_duration() {
        let session = Session::open(SessionId::new(1), NewSession::new("Rust", at(0), None));
        assert!(session.is_open());
        assert!(session.is_root());
        assert_eq!(session.duration(), None);
    }

    #[test]
    fn test_close_sets_end_once() {
        let mut session = Session::open(SessionId::new(1), NewSession::new("Rust", at(0), None));
        assert!(session.close_at(at(30)));
        assert!(!session.close_at(at(90)));
        assert_eq!(session.end, Some(at(30)));
        assert_eq!(session.duration(), Some(Duration::seconds(30)));
    }

    #[test]
    fn test_close_never_precedes_begin() {
        let mut session = Session::open(SessionId::new(1), NewSession::new("Rust", at(10), None));
        session.close_at(at(5));
        assert_eq!(session.end, Some(at(10)));
        assert_eq!(session.duration(), Some(Duration::zero()));
    }

    #[test]
    fn test_session_id_serializes_as_number() {
        let json = serde_json::to_string(&SessionId::new(7)).unwrap();
        assert_eq!(json, "7");
    }
}
