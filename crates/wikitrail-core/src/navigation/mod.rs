//! Navigation handling: host events and page title extraction.

mod event;
mod title;

pub use event::{BrowserEventHandler, HostEvent, NavigationEvent};
pub use title::{PageTitle, SEARCH_TITLE_PREFIX, TitleExtractor};
