//! Command-line arguments.

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Scrape an IMDB title listing and store the enriched movies.
#[derive(Debug, Parser)]
#[command(name = "cinescrape", version, about)]
pub struct Args {
    /// Search keyword for movies
    #[arg(short, long)]
    pub keyword: String,

    /// Genre to search for
    #[arg(short, long)]
    pub genre: String,

    /// Number of listing pages worth of results to request
    #[arg(short, long, default_value_t = 1)]
    pub pages: u32,

    /// Output format; records are always written to the database
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Db)]
    pub output: OutputFormat,

    /// Config file (defaults to the XDG config location)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Override the database file location
    #[arg(long)]
    pub db_path: Option<PathBuf>,

    /// Directory for movies.json / movies.csv
    #[arg(long)]
    pub out_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Json,
    Csv,
    Db,
}
