//! Session tracking.
//!
//! This module turns host events into session records:
//!
//! - `session_tracker`: the event handler and its builder
//! - `index`: tab to open-session map with write-through persistence
//! - `tab_locks`: per-tab serialization of state transitions

mod index;
mod session_tracker;
mod tab_locks;

pub use index::ActiveSessionIndex;
pub use session_tracker::{SessionTracker, SessionTrackerBuilder};
pub use tab_locks::{TabGuard, TabLocks};
