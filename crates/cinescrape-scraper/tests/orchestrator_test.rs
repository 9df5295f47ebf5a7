use cinescrape_browser::{PageRenderer, RenderError};
use cinescrape_core::{MovieDetail, ScrapingConfig, NOT_AVAILABLE};
use cinescrape_db::{Database, DatabaseError};
use cinescrape_scraper::{
    Dispatcher, Enrichment, MovieParser, MovieStore, ScrapeError, ScrapeOrchestrator,
};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::Instant;

const BASE: &str = "https://www.imdb.com";

/// Serves canned HTML: the listing for any search URL, detail pages by URL.
#[derive(Default)]
struct ScriptedRenderer {
    listing: String,
    details: HashMap<String, String>,
    failing: HashSet<String>,
    calls: Mutex<Vec<(String, Instant)>>,
}

impl ScriptedRenderer {
    fn with_listing(listing: impl Into<String>) -> Self {
        Self {
            listing: listing.into(),
            ..Self::default()
        }
    }

    fn detail(mut self, url: &str, html: &str) -> Self {
        self.details.insert(url.to_string(), html.to_string());
        self
    }

    fn failing(mut self, url: &str) -> Self {
        self.failing.insert(url.to_string());
        self
    }

    fn called_urls(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|(url, _)| url.clone())
            .collect()
    }

    fn calls_to(&self, url: &str) -> usize {
        self.called_urls().iter().filter(|u| *u == url).count()
    }
}

#[async_trait::async_trait]
impl PageRenderer for ScriptedRenderer {
    async fn render(&self, url: &str) -> cinescrape_browser::Result<String> {
        self.calls
            .lock()
            .unwrap()
            .push((url.to_string(), Instant::now()));

        if self.failing.contains(url) {
            return Err(RenderError::Timeout {
                url: url.to_string(),
                secs: 30,
            });
        }
        if url.contains("/search/title/") {
            return Ok(self.listing.clone());
        }
        self.details
            .get(url)
            .cloned()
            .ok_or_else(|| RenderError::Navigation(format!("no page for {url}")))
    }
}

/// Store that records inserts in memory and can be told to fail.
#[derive(Default)]
struct RecordingStore {
    rows: Mutex<Vec<MovieDetail>>,
    fail_writes: bool,
}

#[async_trait::async_trait]
impl MovieStore for RecordingStore {
    async fn insert_if_absent(&self, movie: &MovieDetail) -> Result<bool, DatabaseError> {
        if self.fail_writes {
            return Err(DatabaseError::Open("disk full".to_string()));
        }
        let mut rows = self.rows.lock().unwrap();
        if rows.iter().any(|m| m.url == movie.url) {
            return Ok(false);
        }
        rows.push(movie.clone());
        Ok(true)
    }
}

fn item(ordinal: usize, title: &str, id: &str, plot: Option<&str>) -> String {
    let plot = plot
        .map(|p| format!(r#"<div class="ipc-html-content-inner-div">{p}</div>"#))
        .unwrap_or_default();
    format!(
        r#"<li class="ipc-metadata-list-summary-item">
            <h3 class="ipc-title__text">{ordinal}. {title}</h3>
            <a class="ipc-title-link-wrapper" href="/title/{id}/?ref_=sr_t_{ordinal}"></a>
            <span class="sc-2bbfc9e9-7">1999</span>
            <span class="ipc-rating-star--rating">7.9</span>
            {plot}
        </li>"#
    )
}

fn episode(ordinal: usize, title: &str, id: &str) -> String {
    format!(
        r#"<li class="ipc-metadata-list-summary-item">
            <h3 class="ipc-title__text">{ordinal}. {title}</h3>
            <a class="ipc-title-link-wrapper" href="/title/{id}/"></a>
            <span class="ipc-metadata-list-item__label">Episode</span>
        </li>"#
    )
}

fn listing(items: &[String]) -> String {
    format!("<html><body><ul>{}</ul></body></html>", items.concat())
}

fn detail_page(director: &str, actors: &[&str], plot: &str) -> String {
    let cast: String = actors
        .iter()
        .map(|a| {
            format!(
                r#"<div data-testid="title-cast-item"><a data-testid="title-cast-item__actor">{a}</a></div>"#
            )
        })
        .collect();
    format!(
        r#"<html><body>
            <div data-testid="title-pc-principal-credit"><ul><li><a>{director}</a></li></ul></div>
            {cast}
            <div data-testid="plot"><span>{plot}</span></div>
        </body></html>"#
    )
}

fn title_url(id: &str) -> String {
    format!("{BASE}/title/{id}/")
}

fn orchestrator(
    renderer: Arc<ScriptedRenderer>,
    store: Arc<dyn MovieStore>,
) -> ScrapeOrchestrator {
    ScrapeOrchestrator::new(renderer, store, ScrapingConfig::default())
        .expect("valid config")
        .with_dispatcher(Dispatcher::new(Duration::ZERO))
}

async fn test_database() -> Arc<Database> {
    let db = Database::in_memory().await.expect("open database");
    db.run_migrations().await.expect("run migrations");
    Arc::new(db)
}

#[test]
fn test_listing_with_movie_and_episode_yields_movie_only() {
    let html = listing(&[
        item(1, "Test Movie", "tt0000001", Some("A test plot")),
        episode(2, "Test Episode", "tt0000002"),
    ]);
    let parser = MovieParser::new(url::Url::parse(BASE).unwrap());

    let movies = parser.extract_listing(&html);

    assert_eq!(movies.len(), 1);
    assert_eq!(movies[0].title, "Test Movie");
    assert_eq!(movies[0].url, title_url("tt0000001"));
}

#[tokio::test]
async fn test_run_persists_listing_movie() {
    let renderer = Arc::new(ScriptedRenderer::with_listing(listing(&[item(
        1,
        "Test Movie",
        "tt0000001",
        Some("A test plot"),
    )])));
    let db = test_database().await;
    let mut orchestrator = orchestrator(renderer.clone(), db.clone());

    let report = orchestrator.run("", "action", 1).await.expect("run");

    assert_eq!(report.movies.len(), 1);
    assert_eq!(report.movies[0].title, "Test Movie");
    assert_eq!(report.movies[0].plot, "A test plot");
    assert_eq!(report.stored, 1);
    assert_eq!(renderer.called_urls().len(), 1);

    let stored = db
        .get_by_url(&title_url("tt0000001"))
        .await
        .expect("query")
        .expect("row stored");
    assert_eq!(stored.movie.year, "1999");
    assert_eq!(stored.movie.rating, "7.9");
}

#[tokio::test]
async fn test_listing_plot_skips_detail_fetch() {
    let renderer = Arc::new(ScriptedRenderer::with_listing(listing(&[item(
        1,
        "Plotted",
        "tt0000001",
        Some("Known plot"),
    )])));
    let mut orchestrator = orchestrator(renderer.clone(), Arc::new(RecordingStore::default()));

    let report = orchestrator.run("plotted", "drama", 1).await.expect("run");

    let movie = &report.movies[0];
    assert_eq!(movie.plot, "Known plot");
    assert_eq!(movie.directors, NOT_AVAILABLE);
    assert_eq!(movie.actors, NOT_AVAILABLE);
    assert_eq!(renderer.calls_to(&title_url("tt0000001")), 0);
}

#[tokio::test]
async fn test_detail_enrichment_and_cache() {
    let url = title_url("tt0000001");
    let renderer = Arc::new(
        ScriptedRenderer::with_listing(String::new()).detail(
            &url,
            &detail_page("John Doe", &["Jane Doe", "Bob Smith"], "Detailed plot"),
        ),
    );
    let mut orchestrator = orchestrator(renderer.clone(), Arc::new(RecordingStore::default()));
    let summary = cinescrape_core::MovieSummary {
        year: "2023".to_string(),
        rating: "8.5".to_string(),
        ..cinescrape_core::MovieSummary::new("Test Movie", url.clone())
    };

    let (first, how_first) = orchestrator.enrich(summary.clone()).await;
    let (second, how_second) = orchestrator.enrich(summary).await;

    assert_eq!(how_first, Enrichment::Fetched);
    assert_eq!(how_second, Enrichment::CacheHit);
    assert_eq!(first, second);
    assert_eq!(first.directors, "John Doe");
    assert_eq!(first.actors, "Jane Doe, Bob Smith");
    assert_eq!(first.plot, "Detailed plot");
    assert_eq!(first.year, "2023");
    assert_eq!(renderer.calls_to(&url), 1);
}

#[tokio::test]
async fn test_runs_share_store_but_keep_first_title() {
    let db = test_database().await;

    let first = Arc::new(ScriptedRenderer::with_listing(listing(&[item(
        1,
        "Original Title",
        "tt0000001",
        Some("Plot"),
    )])));
    orchestrator(first, db.clone())
        .run("", "action", 1)
        .await
        .expect("first run");

    let second = Arc::new(ScriptedRenderer::with_listing(listing(&[item(
        1,
        "Renamed Title",
        "tt0000001",
        Some("Other plot"),
    )])));
    let report = orchestrator(second, db.clone())
        .run("", "action", 1)
        .await
        .expect("second run");

    assert_eq!(report.stored, 0);
    assert_eq!(report.movies[0].title, "Renamed Title");
    assert_eq!(db.count_movies().await.expect("count"), 1);
    let row = db
        .get_by_url(&title_url("tt0000001"))
        .await
        .expect("query")
        .expect("row");
    assert_eq!(row.movie.title, "Original Title");
    assert_eq!(row.movie.plot, "Plot");
}

#[tokio::test]
async fn test_detail_failure_is_contained() {
    let broken = title_url("tt0000001");
    let healthy = title_url("tt0000002");
    let renderer = Arc::new(
        ScriptedRenderer::with_listing(listing(&[
            item(1, "Broken", "tt0000001", None),
            item(2, "Healthy", "tt0000002", None),
        ]))
        .failing(&broken)
        .detail(&healthy, &detail_page("Ana Director", &["Lead"], "Healthy plot")),
    );
    let db = test_database().await;
    let mut orchestrator = orchestrator(renderer.clone(), db.clone());

    let report = orchestrator.run("", "thriller", 1).await.expect("run");

    assert_eq!(report.movies.len(), 2);
    assert_eq!(report.detail_failures, 1);
    let broken_movie = &report.movies[0];
    assert_eq!(broken_movie.directors, NOT_AVAILABLE);
    assert_eq!(broken_movie.actors, NOT_AVAILABLE);
    assert_eq!(broken_movie.plot, NOT_AVAILABLE);
    assert_eq!(report.movies[1].directors, "Ana Director");
    assert_eq!(report.movies[1].plot, "Healthy plot");
    assert_eq!(db.count_movies().await.expect("count"), 2);

    // Listing first, then details in listing order.
    let urls = renderer.called_urls();
    assert!(urls[0].contains("/search/title/"));
    assert_eq!(&urls[1..], &[broken, healthy]);
}

#[tokio::test]
async fn test_duplicates_returned_but_persisted_once() {
    let url = title_url("tt0000001");
    let renderer = Arc::new(
        ScriptedRenderer::with_listing(listing(&[
            item(1, "Twice", "tt0000001", None),
            item(2, "Twice", "tt0000001", None),
        ]))
        .detail(&url, &detail_page("Director", &["Actor"], "Plot")),
    );
    let store = Arc::new(RecordingStore::default());
    let mut orchestrator = orchestrator(renderer.clone(), store.clone());

    let report = orchestrator.run("twice", "comedy", 1).await.expect("run");

    assert_eq!(report.movies.len(), 2);
    assert_eq!(report.unique_urls, 1);
    assert_eq!(report.stored, 1);
    assert_eq!(report.duplicates_skipped, 1);
    assert_eq!(store.rows.lock().unwrap().len(), 1);
    assert_eq!(renderer.calls_to(&url), 1);
    assert_eq!(orchestrator.cache().len(), 1);
}

#[tokio::test]
async fn test_store_failures_do_not_abort() {
    let renderer = Arc::new(ScriptedRenderer::with_listing(listing(&[
        item(1, "One", "tt0000001", Some("p")),
        item(2, "Two", "tt0000002", Some("p")),
    ])));
    let store = Arc::new(RecordingStore {
        fail_writes: true,
        ..RecordingStore::default()
    });
    let mut orchestrator = orchestrator(renderer, store);

    let report = orchestrator.run("", "action", 1).await.expect("run");

    assert_eq!(report.movies.len(), 2);
    assert_eq!(report.store_failures, 2);
    assert_eq!(report.stored, 0);
}

#[tokio::test]
async fn test_empty_listing_is_valid() {
    let renderer = Arc::new(ScriptedRenderer::with_listing(
        "<html><body><p>No results found</p></body></html>",
    ));
    let mut orchestrator = orchestrator(renderer, Arc::new(RecordingStore::default()));

    let report = orchestrator.run("zzzz", "action", 1).await.expect("run");

    assert!(report.movies.is_empty());
    assert_eq!(report.unique_urls, 0);
}

#[tokio::test]
async fn test_listing_failure_is_fatal() {
    let listing_url = "https://www.imdb.com/search/title/?title=&genres=action&title_type=feature&sort=user_rating%2Cdesc&count=50&start=1";
    let renderer = Arc::new(ScriptedRenderer::default().failing(listing_url));
    let store = Arc::new(RecordingStore::default());
    let mut orchestrator = orchestrator(renderer.clone(), store.clone());

    let err = orchestrator.run("", "action", 1).await.unwrap_err();

    assert!(matches!(err, ScrapeError::ListingFetch { .. }));
    assert_eq!(renderer.called_urls(), vec![listing_url.to_string()]);
    assert!(store.rows.lock().unwrap().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_requests_follow_fixed_cadence() {
    let urls: Vec<String> = (1..=3).map(|n| title_url(&format!("tt000000{n}"))).collect();
    let mut scripted = ScriptedRenderer::with_listing(listing(&[
        item(1, "A", "tt0000001", None),
        item(2, "B", "tt0000002", None),
        item(3, "C", "tt0000003", None),
    ]));
    for url in &urls {
        scripted = scripted.detail(url, &detail_page("D", &["X"], "P"));
    }
    let renderer = Arc::new(scripted);
    let mut orchestrator = ScrapeOrchestrator::new(
        renderer.clone(),
        Arc::new(RecordingStore::default()),
        ScrapingConfig::default(),
    )
    .expect("valid config");

    orchestrator.run("", "action", 1).await.expect("run");

    let calls = renderer.calls.lock().unwrap().clone();
    assert_eq!(calls.len(), 4);
    for pair in calls.windows(2) {
        assert!(pair[1].1 - pair[0].1 >= Duration::from_millis(2000));
    }
}
