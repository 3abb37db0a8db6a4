pub mod export;
pub mod tracker;

pub use export::{EXPORT_FILE_NAME, ExportRecord, ExportService};
pub use tracker::{ActiveSessionIndex, SessionTracker, SessionTrackerBuilder};
