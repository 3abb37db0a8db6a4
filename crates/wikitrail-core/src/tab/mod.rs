//! Browser tab domain module.

mod model;
mod repository;

pub use model::{ActiveTab, ActiveTabs, TabId};
pub use repository::ActiveTabRepository;
