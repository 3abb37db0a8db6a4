//! Export of the recorded history.
//!
//! The dataset is a flat JSON object keyed by session id:
//!
//! ```json
//! {
//!   "1": { "title": "Cat", "begin": "2024-05-01T10:00:00Z", "end": "2024-05-01T10:04:00Z" },
//!   "2": { "title": "Dog", "begin": "2024-05-01T10:04:00Z", "parent": 1 }
//! }
//! ```

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use wikitrail_core::error::Result;
use wikitrail_core::session::{Chain, Session, SessionStore, reconstruct_chains};

/// File name offered for downloaded exports.
pub const EXPORT_FILE_NAME: &str = "wikipedia_wrapped.json";

/// One session in the exported dataset. Absent fields are omitted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportRecord {
    pub title: String,
    pub begin: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
}

impl From<Session> for ExportRecord {
    fn from(session: Session) -> Self {
        Self {
            title: session.title,
            begin: session.begin,
            end: session.end,
            parent: session.parent.map(|p| p.get()),
            latitude: session.location.map(|l| l.latitude),
            longitude: session.location.map(|l| l.longitude),
        }
    }
}

/// Read-only view over the record store for export and display.
#[derive(Clone)]
pub struct ExportService {
    store: Arc<dyn SessionStore>,
}

impl ExportService {
    pub fn new(store: Arc<dyn SessionStore>) -> Self {
        Self { store }
    }

    /// Produces the full dataset, keyed by decimal session id.
    pub async fn dataset(&self) -> Result<BTreeMap<String, ExportRecord>> {
        let sessions = self.store.scan_all().await?;
        tracing::debug!(count = sessions.len(), "Exporting sessions");

        Ok(sessions
            .into_iter()
            .map(|session| (session.id.to_string(), ExportRecord::from(session)))
            .collect())
    }

    pub async fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.dataset().await?)?)
    }

    /// Sessions grouped into click-through chains, most recently active last.
    pub async fn chains(&self) -> Result<Vec<Chain>> {
        Ok(reconstruct_chains(self.store.scan_all().await?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::TimeZone;
    use wikitrail_core::session::{Location, NewSession, SessionId, SessionMutator};

    struct FixedStore(Vec<Session>);

    #[async_trait]
    impl SessionStore for FixedStore {
        async fn create(&self, _session: NewSession) -> Result<SessionId> {
            unreachable!("export never writes")
        }

        async fn get(&self, id: SessionId) -> Result<Option<Session>> {
            Ok(self.0.iter().find(|s| s.id == id).cloned())
        }

        async fn update(&self, _id: SessionId, _mutator: SessionMutator) -> Result<Option<Session>> {
            unreachable!("export never writes")
        }

        async fn scan_all(&self) -> Result<Vec<Session>> {
            Ok(self.0.clone())
        }
    }

    fn t(minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 10, minute, 0).unwrap()
    }

    fn fixture() -> ExportService {
        let cat = Session {
            id: SessionId::new(1),
            title: "Cat".to_string(),
            begin: t(0),
            end: Some(t(4)),
            parent: None,
            location: Some(Location::new(52.5, 13.4)),
        };
        let dog = Session {
            id: SessionId::new(2),
            title: "Dog".to_string(),
            begin: t(4),
            end: None,
            parent: Some(SessionId::new(1)),
            location: None,
        };
        let search = Session {
            id: SessionId::new(10),
            title: "search:owls".to_string(),
            begin: t(1),
            end: Some(t(2)),
            parent: None,
            location: None,
        };
        ExportService::new(Arc::new(FixedStore(vec![dog, search, cat])))
    }

    #[tokio::test]
    async fn test_dataset_is_keyed_by_id() {
        let dataset = fixture().dataset().await.unwrap();

        assert_eq!(
            dataset.keys().cloned().collect::<Vec<_>>(),
            vec!["1", "10", "2"]
        );
        let cat = &dataset["1"];
        assert_eq!(cat.latitude, Some(52.5));
        assert_eq!(cat.longitude, Some(13.4));
        assert_eq!(dataset["2"].parent, Some(1));
    }

    #[tokio::test]
    async fn test_json_omits_absent_fields() {
        let json = fixture().to_json_pretty().await.unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        let dog = value["2"].as_object().unwrap();
        assert_eq!(dog["title"], "Dog");
        assert_eq!(dog["parent"], 1);
        assert!(!dog.contains_key("end"));
        assert!(!dog.contains_key("latitude"));
        assert!(!json.contains("null"));

        let cat = value["1"].as_object().unwrap();
        assert!(!cat.contains_key("parent"));
        assert_eq!(cat["end"], "2024-05-01T10:04:00Z");
    }

    #[tokio::test]
    async fn test_chains_are_reconstructed() {
        let chains = fixture().chains().await.unwrap();

        assert_eq!(chains.len(), 2);
        assert_eq!(chains[0].root().title, "search:owls");
        assert_eq!(chains[1].len(), 2);
        assert!(chains[1].is_open());
    }
}
