//! Scrape orchestrator for a full listing run.
//!
//! A run renders one listing page, extracts its movies, enriches each one
//! from its detail page (through the cache), and persists the first
//! occurrence of every URL. All renders go through a single [`Dispatcher`],
//! so listing and detail requests are strictly serial and rate limited.

use crate::cache::DetailCache;
use crate::dispatcher::Dispatcher;
use crate::error::{Result, ScrapeError};
use crate::parser::{extract_detail, MovieParser};
use crate::retry::RetryPolicy;
use crate::store::MovieStore;
use crate::url_builder::build_search_url;
use cinescrape_browser::PageRenderer;
use cinescrape_core::{AppConfig, MovieDetail, MovieSummary, ScrapingConfig};
use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;

/// Outcome of a scrape run.
///
/// `movies` is the returned collection and keeps duplicate URLs in listing
/// order. The counters describe the persisted collection, which holds only
/// the first occurrence of each URL.
#[derive(Debug, Clone, Default)]
pub struct ScrapeReport {
    /// Every enriched record, duplicates included
    pub movies: Vec<MovieDetail>,
    /// Distinct URLs seen during the run
    pub unique_urls: usize,
    /// Rows newly created in the store
    pub stored: usize,
    /// Records skipped because their URL already appeared earlier in the run
    pub duplicates_skipped: usize,
    /// Writes that failed and were logged
    pub store_failures: usize,
    /// Detail renders that failed; those records carry sentinel credits
    pub detail_failures: usize,
}

/// Result of enriching one listing record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Enrichment {
    /// The listing already carried a plot; no detail page was needed
    ListingComplete,
    /// Served from the detail cache
    CacheHit,
    /// Rendered and extracted from the detail page
    Fetched,
    /// The detail render failed; credits are `"N/A"`
    Failed,
}

/// Drives listing fetch, enrichment, dedup and persistence.
///
/// Runs take `&mut self`: one orchestrator drives at most one run at a time,
/// and its cache and dispatcher are never shared with another instance.
pub struct ScrapeOrchestrator {
    renderer: Arc<dyn PageRenderer>,
    store: Arc<dyn MovieStore>,
    config: ScrapingConfig,
    parser: MovieParser,
    dispatcher: Dispatcher,
    cache: DetailCache,
    retry: RetryPolicy,
    debug_dump_path: Option<PathBuf>,
}

impl ScrapeOrchestrator {
    /// Create an orchestrator with an unbounded cache, no retries and the
    /// configured request interval.
    pub fn new(
        renderer: Arc<dyn PageRenderer>,
        store: Arc<dyn MovieStore>,
        config: ScrapingConfig,
    ) -> Result<Self> {
        let base_url = url::Url::parse(&config.base_url)
            .map_err(|e| ScrapeError::InvalidSearchUrl(format!("{}: {e}", config.base_url)))?;

        Ok(Self {
            renderer,
            store,
            parser: MovieParser::new(base_url),
            dispatcher: Dispatcher::new(config.request_interval()),
            config,
            cache: DetailCache::unbounded(),
            retry: RetryPolicy::none(),
            debug_dump_path: None,
        })
    }

    /// Create an orchestrator from the full application config.
    pub fn from_config(
        renderer: Arc<dyn PageRenderer>,
        store: Arc<dyn MovieStore>,
        config: &AppConfig,
    ) -> Result<Self> {
        config.validate()?;

        let cache = match config.cache.max_entries {
            Some(max) => DetailCache::bounded(max),
            None => DetailCache::unbounded(),
        };

        Ok(Self::new(renderer, store, config.scraping.clone())?
            .with_cache(cache)
            .with_retry_policy(RetryPolicy::from(&config.retry))
            .with_debug_dump(config.browser.debug_dump_path.clone()))
    }

    #[must_use]
    pub fn with_dispatcher(mut self, dispatcher: Dispatcher) -> Self {
        self.dispatcher = dispatcher;
        self
    }

    #[must_use]
    pub fn with_cache(mut self, cache: DetailCache) -> Self {
        self.cache = cache;
        self
    }

    #[must_use]
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Write each rendered listing page to `path` for debugging selectors.
    #[must_use]
    pub fn with_debug_dump(mut self, path: Option<PathBuf>) -> Self {
        self.debug_dump_path = path;
        self
    }

    pub fn cache(&self) -> &DetailCache {
        &self.cache
    }

    /// Scrape one listing and persist its movies.
    ///
    /// Only a failed listing fetch aborts the run. Detail failures and store
    /// write failures are logged and counted in the report.
    pub async fn run(
        &mut self,
        keyword: &str,
        genre: &str,
        page_budget: u32,
    ) -> Result<ScrapeReport> {
        let search_url = build_search_url(&self.config, keyword, genre, page_budget)?;
        let subject = if keyword.is_empty() { genre } else { keyword };
        tracing::info!(
            "Scraping {} movies for {} at {}",
            page_budget.max(1).saturating_mul(self.config.items_per_page),
            subject,
            search_url
        );

        let html = self
            .fetch(search_url.as_str())
            .await
            .map_err(|source| ScrapeError::ListingFetch {
                url: search_url.to_string(),
                source,
            })?;
        self.dump_listing(&html).await;

        let listing = self.parser.extract_listing(&html);
        tracing::info!("Total movies parsed: {}", listing.len());

        let total = listing.len();
        let mut report = ScrapeReport::default();
        let mut seen_urls = HashSet::new();

        for (index, summary) in listing.into_iter().enumerate() {
            tracing::info!(
                "Processing movie {}/{}: {} ({})",
                index + 1,
                total,
                summary.title,
                summary.url
            );

            let (movie, enrichment) = self.enrich(summary).await;
            if enrichment == Enrichment::Failed {
                report.detail_failures += 1;
            }

            if seen_urls.insert(movie.url.clone()) {
                match self.store.insert_if_absent(&movie).await {
                    Ok(true) => report.stored += 1,
                    Ok(false) => {
                        tracing::debug!("Already in store from an earlier run: {}", movie.url);
                    }
                    Err(e) => {
                        report.store_failures += 1;
                        tracing::error!("Error storing movie {}: {}", movie.title, e);
                    }
                }
            } else {
                report.duplicates_skipped += 1;
                tracing::info!("Skipped duplicate: {} ({})", movie.title, movie.url);
            }

            report.movies.push(movie);
        }

        report.unique_urls = seen_urls.len();
        tracing::info!(
            "Successfully scraped {} movies ({} unique)",
            report.movies.len(),
            report.unique_urls
        );

        Ok(report)
    }

    /// Fill in detail fields for one listing record.
    ///
    /// Records whose listing already carried a plot are returned without any
    /// detail request. Otherwise the cache is consulted before rendering.
    pub async fn enrich(&mut self, summary: MovieSummary) -> (MovieDetail, Enrichment) {
        if summary.has_plot() {
            return (summary.without_details(), Enrichment::ListingComplete);
        }

        if let Some(fields) = self.cache.get(&summary.url) {
            tracing::info!("Cache hit for {}", summary.url);
            let fields = fields.clone();
            return (summary.into_detail(fields), Enrichment::CacheHit);
        }

        match self.fetch(&summary.url).await {
            Ok(html) => {
                let fields = extract_detail(&html);
                self.cache.put(summary.url.clone(), fields.clone());
                (summary.into_detail(fields), Enrichment::Fetched)
            }
            Err(e) => {
                tracing::error!("Failed to get details for {}: {}", summary.title, e);
                (summary.without_details(), Enrichment::Failed)
            }
        }
    }

    /// Every attempt, retries included, is its own dispatcher unit.
    async fn fetch(&self, url: &str) -> cinescrape_browser::Result<String> {
        let renderer = &self.renderer;
        let dispatcher = &self.dispatcher;
        self.retry
            .run(url, || dispatcher.submit(renderer.render(url)))
            .await
    }

    async fn dump_listing(&self, html: &str) {
        let Some(path) = &self.debug_dump_path else {
            return;
        };
        match tokio::fs::write(path, html).await {
            Ok(()) => tracing::debug!("Wrote rendered listing to {}", path.display()),
            Err(e) => tracing::warn!("Failed to write listing dump {}: {}", path.display(), e),
        }
    }
}
