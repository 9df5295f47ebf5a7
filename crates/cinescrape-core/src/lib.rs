//! Cinescrape Core - Foundation crate for the Cinescrape movie scraper.
//!
//! This crate provides the movie record types, config errors and
//! configuration management that every other Cinescrape crate depends on.
//!
//! # Modules
//!
//! - [`error`] - Configuration error type using thiserror
//! - [`config`] - TOML-based configuration with XDG paths
//! - [`types`] - Movie records and the `"N/A"` sentinel helpers
//!
//! # Example
//!
//! ```rust
//! use cinescrape_core::{AppConfig, MovieSummary, NOT_AVAILABLE};
//!
//! let config = AppConfig::default();
//! assert_eq!(config.scraping.items_per_page, 50);
//!
//! let summary = MovieSummary::new("Heat", "https://www.imdb.com/title/tt0113277/");
//! assert_eq!(summary.plot, NOT_AVAILABLE);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod config;
pub mod error;
pub mod types;

// Re-export commonly used types
pub use config::{
    AppConfig, BrowserConfig, CacheConfig, RetryConfig, ScrapingConfig, StorageConfig,
};
pub use error::{ConfigError, ConfigResult};
pub use types::{is_available, or_sentinel, DetailFields, MovieDetail, MovieSummary, NOT_AVAILABLE};
