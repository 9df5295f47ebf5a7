//! Cinescrape Scraper - listing scrape orchestration.
//!
//! This crate turns a keyword/genre query into enriched, persisted movie
//! records. It coordinates rendering, markup extraction, detail caching and
//! deduplication, with every render serialized through a rate-limited
//! dispatcher.
//!
//! # Features
//!
//! - Single-shot listing render sized by a page budget
//! - Named extraction rules per field, tolerant of malformed items
//! - Per-run detail cache (unbounded by default, optionally bounded)
//! - Serial request dispatch with a fixed minimum interval
//! - Opt-in retry with exponential backoff around renders
//! - In-run URL dedup in front of the store's insert-if-absent
//!
//! # Example
//!
//! ```rust,ignore
//! use cinescrape_scraper::ScrapeOrchestrator;
//! use std::sync::Arc;
//!
//! let mut orchestrator = ScrapeOrchestrator::from_config(
//!     Arc::new(ChromiumRenderer::new(RenderOptions::from(&config.browser))),
//!     Arc::new(database),
//!     &config,
//! )?;
//!
//! let report = orchestrator.run("godfather", "crime", 1).await?;
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::must_use_candidate)]

pub mod cache;
pub mod dispatcher;
pub mod error;
pub mod orchestrator;
pub mod parser;
pub mod retry;
pub mod store;
pub mod url_builder;

// Re-export commonly used types
pub use cache::DetailCache;
pub use dispatcher::Dispatcher;
pub use error::{ParseFailure, Result, ScrapeError};
pub use orchestrator::{Enrichment, ScrapeOrchestrator, ScrapeReport};
pub use parser::{extract_detail, MovieParser};
pub use retry::RetryPolicy;
pub use store::MovieStore;
pub use url_builder::build_search_url;
