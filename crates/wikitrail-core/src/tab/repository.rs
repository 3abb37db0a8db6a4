//! Active tab repository trait.

use async_trait::async_trait;

use crate::error::Result;
use crate::tab::model::ActiveTab;

/// Secondary store that lets the active-session index survive restarts.
#[async_trait]
pub trait ActiveTabRepository: Send + Sync {
    /// Loads the last persisted index entries.
    async fn load(&self) -> Result<Vec<ActiveTab>>;

    /// Replaces the persisted entries with `tabs`.
    async fn save(&self, tabs: &[ActiveTab]) -> Result<()>;
}
