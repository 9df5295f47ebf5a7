//! Cinescrape command-line entry point.

mod cli;
mod output;

use anyhow::{Context, Result};
use cinescrape_browser::{ChromiumRenderer, RenderOptions};
use cinescrape_core::AppConfig;
use cinescrape_db::Database;
use cinescrape_scraper::ScrapeOrchestrator;
use clap::Parser;
use cli::Args;
use std::fs::{self, File, OpenOptions};
use std::path::Path;
use std::process::ExitCode;
use std::sync::{Arc, Mutex};
use tracing::{error, info};

/// Initialize tracing subscriber for logging.
///
/// Errors are additionally appended to `error_log` when it can be opened.
fn init_tracing(error_log: Option<&Path>) {
    use tracing_subscriber::{filter::LevelFilter, fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,cinescrape=debug"));

    let error_file = error_log.and_then(|path| match open_log_file(path) {
        Ok(file) => Some(file),
        Err(e) => {
            eprintln!("warning: cannot open error log {}: {e}", path.display());
            None
        }
    });
    let error_layer = error_file.map(|file| {
        fmt::layer()
            .with_ansi(false)
            .with_writer(Mutex::new(file))
            .with_filter(LevelFilter::ERROR)
    });

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true))
        .with(error_layer)
        .with(filter)
        .init();
}

fn open_log_file(path: &Path) -> std::io::Result<File> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    OpenOptions::new().create(true).append(true).open(path)
}

fn load_config(args: &Args) -> Result<AppConfig> {
    let mut config = AppConfig::load_with_env(args.config.as_deref())
        .context("failed to load configuration")?;
    if let Some(path) = &args.db_path {
        config.storage.database_path = Some(path.clone());
    }
    if let Some(dir) = &args.out_dir {
        config.storage.output_dir = Some(dir.clone());
    }
    Ok(config)
}

async fn run(args: &Args, config: &AppConfig) -> Result<()> {
    let db_path = config.database_path()?;
    let db = Database::open(&db_path)
        .await
        .with_context(|| format!("failed to open database {}", db_path.display()))?;

    let result = scrape(args, config, &db).await;
    db.close().await;
    result
}

async fn scrape(args: &Args, config: &AppConfig, db: &Database) -> Result<()> {
    db.run_migrations().await?;

    let renderer = Arc::new(ChromiumRenderer::new(RenderOptions::from(&config.browser)));
    let mut orchestrator = ScrapeOrchestrator::from_config(renderer, Arc::new(db.clone()), config)?;

    let report = orchestrator
        .run(&args.keyword, &args.genre, args.pages)
        .await?;

    if let Some(path) = output::write_output(args.output, &report.movies, &config.output_dir()?)? {
        info!("Data saved to {}", path.display());
    }

    info!(
        "Successfully scraped {} movies: {} stored, {} duplicates skipped, {} detail failures, {} store failures",
        report.movies.len(),
        report.stored,
        report.duplicates_skipped,
        report.detail_failures,
        report.store_failures
    );
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    let config = match load_config(&args) {
        Ok(config) => config,
        Err(e) => {
            init_tracing(None);
            error!("Scraping failed: {e:#}");
            return ExitCode::FAILURE;
        }
    };

    init_tracing(config.error_log_path().ok().as_deref());
    info!("Starting Cinescrape v{}", env!("CARGO_PKG_VERSION"));

    match run(&args, &config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Scraping failed: {e:#}");
            ExitCode::FAILURE
        }
    }
}
