//! Session record store trait.
//!
//! Defines the interface for durable session persistence.

use super::model::{NewSession, Session, SessionId};
use crate::error::Result;
use async_trait::async_trait;

/// In-place change applied to a stored session by [`SessionStore::update`].
pub type SessionMutator = Box<dyn FnOnce(&mut Session) + Send>;

/// Durable storage for session records.
///
/// The store is the only component allowed to assign session ids.
///
/// # Implementation Notes
///
/// Implementations must:
/// - Assign unique ids on `create` and never reuse them
/// - Make `update` an atomic read-modify-write per id
/// - Keep `id` and `parent` unchanged across updates
/// - Treat an unknown id in `update` as "nothing to do", not as an error
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Persists a new open session and returns its assigned id.
    async fn create(&self, session: NewSession) -> Result<SessionId>;

    /// Point read.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(Session))`: Session found
    /// - `Ok(None)`: No such session
    /// - `Err(_)`: Storage failure
    async fn get(&self, id: SessionId) -> Result<Option<Session>>;

    /// Applies `mutator` to the stored session atomically.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(Session))`: The session after the update
    /// - `Ok(None)`: The id does not exist (logged by the implementation)
    /// - `Err(_)`: Storage failure
    async fn update(&self, id: SessionId, mutator: SessionMutator) -> Result<Option<Session>>;

    /// Materializes every stored session, ordered by id.
    async fn scan_all(&self) -> Result<Vec<Session>>;
}
