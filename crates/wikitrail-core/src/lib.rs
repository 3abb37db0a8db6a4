//! Domain layer for Wikitrail.
//!
//! Holds the session and tab models, the store and host capability traits,
//! title extraction and chain reconstruction. Nothing here performs I/O.

pub mod clock;
pub mod config;
pub mod error;
pub mod host;
pub mod navigation;
pub mod session;
pub mod tab;

pub use error::TrailError;
