//! File-backed session store.
//!
//! All sessions live in one TOML ledger:
//!
//! ```toml
//! next_id = 4
//!
//! [[sessions]]
//! version = "2.0.0"
//! id = 1
//! title = "Cat"
//! begin = "2024-05-01T10:00:00Z"
//! ```
//!
//! Each record carries its own schema version and is migrated on read, so a
//! ledger may mix record versions until the next write of each record.

use crate::dto::{SESSION_RECORD_ENTITY, create_session_record_migrator};
use crate::storage::AtomicTomlFile;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use version_migrate::Migrator;
use wikitrail_core::error::{Result, TrailError};
use wikitrail_core::session::{NewSession, Session, SessionId, SessionMutator, SessionStore};

#[derive(Debug, Clone, Serialize, Deserialize)]
struct SessionLedger {
    #[serde(default = "first_id")]
    next_id: u64,
    #[serde(default)]
    sessions: Vec<toml::Value>,
}

fn first_id() -> u64 {
    1
}

impl Default for SessionLedger {
    fn default() -> Self {
        Self {
            next_id: first_id(),
            sessions: Vec::new(),
        }
    }
}

impl SessionLedger {
    /// Next free id. Guarded against a hand-edited or stale counter.
    fn allocate_id(&mut self) -> u64 {
        let after_existing = self
            .sessions
            .iter()
            .filter_map(record_id)
            .max()
            .map_or(first_id(), |max| max + 1);

        let id = self.next_id.max(after_existing);
        self.next_id = id + 1;
        id
    }

    fn position_of(&self, id: SessionId) -> Option<usize> {
        self.sessions
            .iter()
            .position(|record| record_id(record) == Some(id.get()))
    }
}

fn record_id(record: &toml::Value) -> Option<u64> {
    record
        .get("id")
        .and_then(toml::Value::as_integer)
        .and_then(|id| u64::try_from(id).ok())
}

fn decode_record(migrator: &Migrator, record: &toml::Value) -> Result<Session> {
    let session: Session = migrator.load_flat_from(SESSION_RECORD_ENTITY, record.clone())?;
    Ok(session)
}

fn encode_record(migrator: &Migrator, session: &Session) -> Result<toml::Value> {
    let json_str = migrator.save_domain_flat(SESSION_RECORD_ENTITY, session)?;
    let json_value: serde_json::Value = serde_json::from_str(&json_str)?;
    toml::Value::try_from(json_value).map_err(|e| {
        TrailError::serialization("toml", format!("Failed to convert session record: {}", e))
    })
}

/// Runs blocking ledger I/O off the async executor.
async fn run<F, R>(f: F) -> Result<R>
where
    F: FnOnce() -> Result<R> + Send + 'static,
    R: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| TrailError::internal(format!("Failed to join task: {}", e)))?
}

/// [`SessionStore`] backed by a single atomically replaced TOML file.
///
/// Every write is a locked read-modify-write of the whole ledger, which
/// keeps id allocation and per-record updates atomic across processes.
#[derive(Clone)]
pub struct FileSessionStore {
    file: Arc<AtomicTomlFile<SessionLedger>>,
}

impl FileSessionStore {
    pub fn new(path: PathBuf) -> Self {
        Self {
            file: Arc::new(AtomicTomlFile::new(path)),
        }
    }
}

#[async_trait]
impl SessionStore for FileSessionStore {
    async fn create(&self, new_session: NewSession) -> Result<SessionId> {
        let file = self.file.clone();

        let id = run(move || {
            file.update(SessionLedger::default(), |ledger| -> Result<SessionId> {
                let migrator = create_session_record_migrator();
                let id = SessionId::new(ledger.allocate_id());
                let session = Session::open(id, new_session);
                ledger.sessions.push(encode_record(&migrator, &session)?);
                Ok(id)
            })
        })
        .await?;

        tracing::debug!(session_id = %id, "Created session record");
        Ok(id)
    }

    async fn get(&self, id: SessionId) -> Result<Option<Session>> {
        let file = self.file.clone();

        run(move || {
            let Some(ledger) = file.load()? else {
                return Ok(None);
            };
            let Some(index) = ledger.position_of(id) else {
                return Ok(None);
            };

            let migrator = create_session_record_migrator();
            decode_record(&migrator, &ledger.sessions[index]).map(Some)
        })
        .await
    }

    async fn update(&self, id: SessionId, mutator: SessionMutator) -> Result<Option<Session>> {
        let file = self.file.clone();

        let updated = run(move || {
            file.update(SessionLedger::default(), |ledger| -> Result<Option<Session>> {
                let Some(index) = ledger.position_of(id) else {
                    return Ok(None);
                };

                let migrator = create_session_record_migrator();
                let mut session = decode_record(&migrator, &ledger.sessions[index])?;
                let parent = session.parent;

                mutator(&mut session);
                // Identity and lineage are fixed at creation.
                session.id = id;
                session.parent = parent;

                ledger.sessions[index] = encode_record(&migrator, &session)?;
                Ok(Some(session))
            })
        })
        .await?;

        if updated.is_none() {
            tracing::warn!(session_id = %id, "Update skipped: no such session record");
        }
        Ok(updated)
    }

    async fn scan_all(&self) -> Result<Vec<Session>> {
        let file = self.file.clone();

        run(move || {
            let Some(ledger) = file.load()? else {
                return Ok(Vec::new());
            };

            let migrator = create_session_record_migrator();
            let mut sessions: Vec<Session> = ledger
                .sessions
                .iter()
                .filter_map(|record| match decode_record(&migrator, record) {
                    Ok(session) => Some(session),
                    Err(e) => {
                        tracing::warn!(
                            record_id = ?record_id(record),
                            error = %e,
                            "Skipping undecodable session record"
                        );
                        None
                    }
                })
                .collect();

            sessions.sort_by_key(|s| s.id);
            Ok(sessions)
        })
        .await
    }
}
