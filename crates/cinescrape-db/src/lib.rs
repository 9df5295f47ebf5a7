//! Cinescrape Database Layer
//!
//! Provides `SQLite` storage for scraped movies. Uses `SQLx` with embedded
//! migrations.
//!
//! # Example
//!
//! ```ignore
//! use cinescrape_db::Database;
//!
//! let db = Database::open("data/movies.db").await?;
//! db.run_migrations().await?;
//! db.insert_if_absent(&movie).await?;
//! db.close().await;
//! ```
//!
//! # Design Principles
//!
//! - `url` carries a `UNIQUE` constraint; inserts use `INSERT OR IGNORE`
//! - Identifiers and timestamps are assigned by the store, never the caller
//! - Migrations are idempotent and run on every start

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod connection;
pub mod error;
pub mod migrations;
pub mod movies;

// Re-export commonly used types
pub use error::{DatabaseError, Result};
pub use movies::PersistedMovie;

use cinescrape_core::MovieDetail;
use std::path::Path;

/// High-level database interface with migrations.
#[derive(Debug, Clone)]
pub struct Database {
    pool: sqlx::Pool<sqlx::Sqlite>,
}

impl Database {
    /// Open (creating if necessary) the database file at `path`.
    ///
    /// # Errors
    /// Returns `DatabaseError` if the database cannot be opened.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let pool = connection::connect(path).await?;
        Ok(Self { pool })
    }

    /// Open a private in-memory database. Mostly useful for tests.
    pub async fn in_memory() -> Result<Self> {
        let pool = connection::connect_in_memory().await?;
        Ok(Self { pool })
    }

    /// Run all pending database migrations.
    ///
    /// This should be called after opening the database to ensure the
    /// schema is up to date.
    pub async fn run_migrations(&self) -> Result<()> {
        migrations::run_migrations(&self.pool).await
    }

    /// Get the current schema version.
    pub async fn get_schema_version(&self) -> Result<i64> {
        migrations::get_schema_version(&self.pool).await
    }

    /// Get a reference to the underlying connection pool.
    #[must_use]
    pub fn pool(&self) -> &sqlx::Pool<sqlx::Sqlite> {
        &self.pool
    }

    /// Insert a movie unless its URL is already stored. Returns `true` if a row was created.
    pub async fn insert_if_absent(&self, movie: &MovieDetail) -> Result<bool> {
        movies::insert_if_absent(&self.pool, movie).await
    }

    /// Look up a stored movie by URL.
    pub async fn get_by_url(&self, url: &str) -> Result<Option<PersistedMovie>> {
        movies::get_by_url(&self.pool, url).await
    }

    /// List all stored movies, oldest first.
    pub async fn list_movies(&self) -> Result<Vec<PersistedMovie>> {
        movies::list_movies(&self.pool).await
    }

    /// Number of stored movies.
    pub async fn count_movies(&self) -> Result<i64> {
        movies::count_movies(&self.pool).await
    }

    /// Close the database connection gracefully.
    pub async fn close(self) {
        self.pool.close().await;
        tracing::info!("Database closed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_database_schema() {
        let db = Database::in_memory().await.expect("open database");
        db.run_migrations().await.expect("run migrations");

        let columns: Vec<String> =
            sqlx::query_scalar("SELECT name FROM pragma_table_info('movies') ORDER BY cid")
                .fetch_all(db.pool())
                .await
                .expect("query columns");

        assert_eq!(
            columns,
            vec![
                "id",
                "title",
                "year",
                "rating",
                "directors",
                "actors",
                "plot",
                "url",
                "created_at"
            ]
        );

        let schema: String = sqlx::query_scalar(
            "SELECT sql FROM sqlite_master WHERE type='table' AND name='movies'",
        )
        .fetch_one(db.pool())
        .await
        .expect("query schema");
        assert!(schema.contains("url TEXT UNIQUE"));
        assert!(schema.contains("title TEXT NOT NULL"));
    }

    #[tokio::test]
    async fn test_file_database_persists_across_reopen() {
        let tmp = TempDir::new().expect("create temp dir");
        let path = tmp.path().join("movies.db");
        let movie = MovieDetail {
            title: "Heat".to_string(),
            url: "https://www.imdb.com/title/tt0113277/".to_string(),
            year: "1995".to_string(),
            rating: "8.3".to_string(),
            plot: "A group of high-end professional thieves...".to_string(),
            directors: "Michael Mann".to_string(),
            actors: "Al Pacino, Robert De Niro".to_string(),
        };

        let db = Database::open(&path).await.expect("open database");
        db.run_migrations().await.expect("run migrations");
        db.insert_if_absent(&movie).await.expect("insert");
        db.close().await;

        let db = Database::open(&path).await.expect("reopen database");
        db.run_migrations().await.expect("run migrations again");
        assert_eq!(db.count_movies().await.expect("count"), 1);
        let stored = db
            .get_by_url(&movie.url)
            .await
            .expect("query")
            .expect("row exists");
        assert_eq!(stored.movie, movie);
        db.close().await;
    }

    #[tokio::test]
    async fn test_database_close() {
        let db = Database::in_memory().await.expect("open database");
        db.close().await; // Should not panic
    }
}
