//! Page title extraction from navigation URLs.

use crate::config::TrackerConfig;
use crate::error::{Result, TrailError};
use regex::Regex;
use url::Url;

/// Prefix of synthetic titles given to search result pages.
pub const SEARCH_TITLE_PREFIX: &str = "search:";

/// What a tracked URL points at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageTitle {
    /// An article page; holds the raw path segment after the article prefix
    Article(String),
    /// The site's search endpoint with a non-empty query
    Search(String),
}

impl PageTitle {
    /// The title stored on the session.
    pub fn title(&self) -> String {
        match self {
            PageTitle::Article(name) => name.clone(),
            PageTitle::Search(term) => format!("{}{}", SEARCH_TITLE_PREFIX, term),
        }
    }

    pub fn is_search(&self) -> bool {
        matches!(self, PageTitle::Search(_))
    }
}

/// Maps navigation URLs to page titles for one tracked site.
#[derive(Debug, Clone)]
pub struct TitleExtractor {
    site_domain: String,
    article_pattern: Regex,
    search_path: String,
    search_param: String,
}

impl TitleExtractor {
    pub fn new(config: &TrackerConfig) -> Result<Self> {
        if config.site_domain.trim().is_empty() {
            return Err(TrailError::config("site_domain must not be empty"));
        }

        let pattern = format!("^{}(.+)$", regex::escape(&config.article_path_prefix));
        let article_pattern = Regex::new(&pattern).map_err(|e| {
            TrailError::config(format!(
                "Invalid article path prefix '{}': {}",
                config.article_path_prefix, e
            ))
        })?;

        Ok(Self {
            site_domain: config.site_domain.trim().to_ascii_lowercase(),
            article_pattern,
            search_path: config.search_path.clone(),
            search_param: config.search_param.clone(),
        })
    }

    /// Returns the page title for `raw_url`, or `None` when the URL is not
    /// a tracked page. Unparseable URLs are simply untracked.
    pub fn extract(&self, raw_url: &str) -> Option<PageTitle> {
        let url = match Url::parse(raw_url) {
            Ok(url) => url,
            Err(e) => {
                tracing::trace!(url = raw_url, error = %e, "Ignoring unparseable URL");
                return None;
            }
        };

        if !matches!(url.scheme(), "http" | "https") {
            return None;
        }
        if !self.is_tracked_host(url.host_str()?) {
            return None;
        }

        if let Some(captures) = self.article_pattern.captures(url.path()) {
            return Some(PageTitle::Article(captures[1].to_string()));
        }

        if url.path() == self.search_path {
            let term = url
                .query_pairs()
                .find(|(key, _)| key == self.search_param.as_str())
                .map(|(_, value)| value.into_owned())?;
            if term.is_empty() {
                return None;
            }
            return Some(PageTitle::Search(term));
        }

        None
    }

    fn is_tracked_host(&self, host: &str) -> bool {
        let host = host.to_ascii_lowercase();
        host == self.site_domain
            || host
                .strip_suffix(self.site_domain.as_str())
                .is_some_and(|rest| rest.ends_with('.'))
    }
}
