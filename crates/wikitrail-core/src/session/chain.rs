//! Click-through chain reconstruction.
//!
//! Rebuilds parent -> child visit chains from the flat set of stored sessions.

use super::model::{Session, SessionId};
use chrono::Duration;
use serde::Serialize;
use std::collections::HashMap;

/// Sessions linked by `parent`, ordered root first.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Chain {
    sessions: Vec<Session>,
}

impl Chain {
    fn starting_at(session: Session) -> Self {
        Self {
            sessions: vec![session],
        }
    }

    pub fn sessions(&self) -> &[Session] {
        &self.sessions
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    /// Always false for chains built by [`reconstruct_chains`].
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    pub fn root(&self) -> &Session {
        &self.sessions[0]
    }

    pub fn last(&self) -> &Session {
        &self.sessions[self.sessions.len() - 1]
    }

    /// A chain is open while its last element has no end.
    pub fn is_open(&self) -> bool {
        self.last().is_open()
    }

    /// Sum of the closed sessions' durations.
    pub fn total_duration(&self) -> Duration {
        self.sessions
            .iter()
            .filter_map(Session::duration)
            .fold(Duration::zero(), |acc, d| acc + d)
    }

    fn position_of(&self, id: SessionId) -> Option<usize> {
        self.sessions.iter().position(|s| s.id == id)
    }
}

/// Rebuilds chains from an arbitrary collection of sessions.
///
/// Each session whose parent is already placed is inserted directly after
/// that parent; every other session starts a chain of its own, including
/// sessions whose parent id is missing from the input. Chains come back
/// sorted by the `begin` of their last element, ascending.
///
/// Input order does not matter: sessions are processed by ascending id.
pub fn reconstruct_chains<I>(sessions: I) -> Vec<Chain>
where
    I: IntoIterator<Item = Session>,
{
    let mut sessions: Vec<Session> = sessions.into_iter().collect();
    sessions.sort_by_key(|s| s.id);

    let mut chains: Vec<Chain> = Vec::new();
    let mut chain_of: HashMap<SessionId, usize> = HashMap::new();

    for session in sessions {
        let id = session.id;
        let placed = session
            .parent
            .and_then(|parent| chain_of.get(&parent).map(|&index| (parent, index)));

        match placed {
            Some((parent, index)) => {
                let chain = &mut chains[index];
                // The parent is in the chain by construction of `chain_of`.
                let at = chain.position_of(parent).map_or(chain.len(), |pos| pos + 1);
                chain.sessions.insert(at, session);
                chain_of.insert(id, index);
            }
            None => {
                if let Some(parent) = session.parent {
                    tracing::debug!(
                        session_id = %id,
                        parent_id = %parent,
                        "Parent not found, starting a new chain"
                    );
                }
                chain_of.insert(id, chains.len());
                chains.push(Chain::starting_at(session));
            }
        }
    }

    chains.sort_by(|a, b| {
        a.last()
            .begin
            .cmp(&b.last().begin)
            .then_with(|| a.root().id.cmp(&b.root().id))
    });
    chains
}

#[cfg(test)]
#[path = "chain_test.rs"]
mod tests;
