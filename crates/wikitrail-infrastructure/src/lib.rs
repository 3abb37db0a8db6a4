pub mod config_service;
pub mod dto;
pub mod file_active_tab_repository;
pub mod file_session_store;
pub mod paths;
pub mod storage;

pub use crate::config_service::ConfigService;
pub use crate::file_active_tab_repository::FileActiveTabRepository;
pub use crate::file_session_store::FileSessionStore;
pub use crate::paths::{PathError, TrailPaths};
