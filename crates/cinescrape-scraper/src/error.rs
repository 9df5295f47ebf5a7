use cinescrape_browser::RenderError;
use cinescrape_core::ConfigError;
use thiserror::Error;

/// Unrecoverable failure of a scrape run.
#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("listing fetch failed for {url}: {source}")]
    ListingFetch {
        url: String,
        #[source]
        source: RenderError,
    },

    #[error("invalid search URL: {0}")]
    InvalidSearchUrl(String),

    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Malformed markup for a single listing item. Always contained per item.
#[derive(Debug, Error)]
pub enum ParseFailure {
    #[error("item {index}: cannot resolve link '{href}': {reason}")]
    InvalidLink {
        index: usize,
        href: String,
        reason: String,
    },
}

pub type Result<T> = std::result::Result<T, ScrapeError>;
