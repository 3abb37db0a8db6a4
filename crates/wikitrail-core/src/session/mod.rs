//! Session domain module.
//!
//! # Module Structure
//!
//! - `model`: Core session entity (`Session`, `SessionId`, `Location`)
//! - `repository`: Record store trait (`SessionStore`)
//! - `chain`: Parent/child chain reconstruction (`reconstruct_chains`)

mod chain;
mod model;
mod repository;

pub use chain::{Chain, reconstruct_chains};
pub use model::{Location, NewSession, Session, SessionId};
pub use repository::{SessionMutator, SessionStore};
