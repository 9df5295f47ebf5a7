//! JSON and CSV serialization of scrape results.

use crate::cli::OutputFormat;
use anyhow::{Context, Result};
use cinescrape_core::MovieDetail;
use std::fs;
use std::path::{Path, PathBuf};

const CSV_COLUMNS: [&str; 7] = ["title", "url", "year", "rating", "plot", "directors", "actors"];

/// Pretty-printed JSON array.
pub fn to_json(movies: &[MovieDetail]) -> serde_json::Result<String> {
    serde_json::to_string_pretty(movies)
}

/// CSV with a header row. Every value is quoted and embedded quotes are
/// doubled. An empty collection produces an empty string.
pub fn to_csv(movies: &[MovieDetail]) -> String {
    if movies.is_empty() {
        return String::new();
    }

    let mut lines = Vec::with_capacity(movies.len() + 1);
    lines.push(CSV_COLUMNS.join(","));
    for movie in movies {
        let row = [
            &movie.title,
            &movie.url,
            &movie.year,
            &movie.rating,
            &movie.plot,
            &movie.directors,
            &movie.actors,
        ];
        let cells: Vec<String> = row.iter().map(|value| quote(value)).collect();
        lines.push(cells.join(","));
    }
    lines.join("\n")
}

fn quote(value: &str) -> String {
    format!("\"{}\"", value.replace('"', "\"\""))
}

/// Write `movies` to `dir` in the requested format.
///
/// Returns the written path, or `None` for [`OutputFormat::Db`] which has no
/// file output.
pub fn write_output(
    format: OutputFormat,
    movies: &[MovieDetail],
    dir: &Path,
) -> Result<Option<PathBuf>> {
    let (file_name, contents) = match format {
        OutputFormat::Db => return Ok(None),
        OutputFormat::Json => ("movies.json", to_json(movies)?),
        OutputFormat::Csv => ("movies.csv", to_csv(movies)),
    };

    fs::create_dir_all(dir)
        .with_context(|| format!("failed to create output directory {}", dir.display()))?;
    let path = dir.join(file_name);
    fs::write(&path, contents).with_context(|| format!("failed to write {}", path.display()))?;
    Ok(Some(path))
}
