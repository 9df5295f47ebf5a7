//! Movie row operations.
//!
//! Rows are unique by `url`. Inserting a URL that is already present is a
//! no-op: the existing row keeps the fields from its first insert.

use crate::error::{DatabaseError, Result};
use chrono::{DateTime, Utc};
use cinescrape_core::MovieDetail;
use serde::{Deserialize, Serialize};
use sqlx::{sqlite::SqliteRow, Pool, Row, Sqlite};

/// A stored movie with its store-assigned identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedMovie {
    /// UUID assigned at insert time
    pub id: String,
    /// The enriched record as it was first inserted
    #[serde(flatten)]
    pub movie: MovieDetail,
    /// When the row was created
    pub created_at: DateTime<Utc>,
}

/// Insert a movie unless a row with the same URL exists.
///
/// Returns `true` when a new row was created.
///
/// # Errors
/// Returns `DatabaseError::Sqlx` if the insert fails (for example a missing table).
pub async fn insert_if_absent(pool: &Pool<Sqlite>, movie: &MovieDetail) -> Result<bool> {
    let id = uuid::Uuid::new_v4().to_string();
    let created_at = Utc::now();

    let result = sqlx::query(
        "INSERT OR IGNORE INTO movies (id, title, year, rating, directors, actors, plot, url, created_at)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&id)
    .bind(&movie.title)
    .bind(&movie.year)
    .bind(&movie.rating)
    .bind(&movie.directors)
    .bind(&movie.actors)
    .bind(&movie.plot)
    .bind(&movie.url)
    .bind(created_at.to_rfc3339())
    .execute(pool)
    .await?;

    let inserted = result.rows_affected() > 0;
    if inserted {
        tracing::info!("Stored movie: {} ({})", movie.title, movie.url);
    } else {
        tracing::debug!("Movie already stored, left unchanged: {}", movie.url);
    }
    Ok(inserted)
}

/// Look up a stored movie by URL.
pub async fn get_by_url(pool: &Pool<Sqlite>, url: &str) -> Result<Option<PersistedMovie>> {
    let row = sqlx::query(
        "SELECT id, title, year, rating, directors, actors, plot, url, created_at
         FROM movies
         WHERE url = ?",
    )
    .bind(url)
    .fetch_optional(pool)
    .await?;

    row.map(|r| parse_movie_row(&r)).transpose()
}

/// List every stored movie, oldest first.
pub async fn list_movies(pool: &Pool<Sqlite>) -> Result<Vec<PersistedMovie>> {
    let rows = sqlx::query(
        "SELECT id, title, year, rating, directors, actors, plot, url, created_at
         FROM movies
         ORDER BY created_at ASC, rowid ASC",
    )
    .fetch_all(pool)
    .await?;

    rows.iter().map(parse_movie_row).collect()
}

/// Count stored movies.
pub async fn count_movies(pool: &Pool<Sqlite>) -> Result<i64> {
    let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM movies")
        .fetch_one(pool)
        .await?;
    Ok(count)
}

fn parse_movie_row(row: &SqliteRow) -> Result<PersistedMovie> {
    let created_at: String = row.try_get("created_at")?;
    let created_at = DateTime::parse_from_rfc3339(&created_at)
        .map_err(|e| DatabaseError::Decode(format!("invalid created_at '{created_at}': {e}")))?
        .with_timezone(&Utc);

    // Nullable text columns read back as the sentinel.
    let text = |column: &str| -> Result<String> {
        let value: Option<String> = row.try_get(column)?;
        Ok(cinescrape_core::or_sentinel(value))
    };

    Ok(PersistedMovie {
        id: row.try_get("id")?,
        movie: MovieDetail {
            title: row.try_get("title")?,
            url: row.try_get("url")?,
            year: text("year")?,
            rating: text("rating")?,
            plot: text("plot")?,
            directors: text("directors")?,
            actors: text("actors")?,
        },
        created_at,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Database;

    async fn setup_test_db() -> Database {
        let db = Database::in_memory().await.expect("open database");
        db.run_migrations().await.expect("run migrations");
        db
    }

    fn test_movie() -> MovieDetail {
        MovieDetail {
            title: "Test Movie".to_string(),
            url: "https://www.imdb.com/title/tt0000001/".to_string(),
            year: "2023".to_string(),
            rating: "8.5".to_string(),
            plot: "A test plot".to_string(),
            directors: "John Doe".to_string(),
            actors: "Jane Doe, Bob Smith".to_string(),
        }
    }

    #[tokio::test]
    async fn test_insert_new_movie() {
        let db = setup_test_db().await;
        let movie = test_movie();

        let inserted = insert_if_absent(db.pool(), &movie).await.expect("insert");
        assert!(inserted);

        let row = get_by_url(db.pool(), &movie.url)
            .await
            .expect("query")
            .expect("row exists");
        assert_eq!(row.movie, movie);
        assert!(!row.id.is_empty());
        assert!(row.created_at <= Utc::now());
    }

    #[tokio::test]
    async fn test_duplicate_url_keeps_first_insert() {
        let db = setup_test_db().await;
        let first = test_movie();
        let second = MovieDetail {
            title: "Duplicate Movie".to_string(),
            year: "2024".to_string(),
            rating: "9.0".to_string(),
            plot: "Another plot".to_string(),
            directors: "Jane Smith".to_string(),
            actors: "Tom Lee".to_string(),
            ..test_movie()
        };

        assert!(insert_if_absent(db.pool(), &first).await.expect("first insert"));
        assert!(!insert_if_absent(db.pool(), &second)
            .await
            .expect("duplicate insert is not an error"));

        assert_eq!(count_movies(db.pool()).await.expect("count"), 1);
        let row = get_by_url(db.pool(), &first.url)
            .await
            .expect("query")
            .expect("row exists");
        assert_eq!(row.movie.title, "Test Movie");
        assert_eq!(row.movie.directors, "John Doe");
    }

    #[tokio::test]
    async fn test_list_movies_in_insert_order() {
        let db = setup_test_db().await;
        for n in 1..=3 {
            let movie = MovieDetail {
                title: format!("Movie {n}"),
                url: format!("https://www.imdb.com/title/tt000000{n}/"),
                ..test_movie()
            };
            insert_if_absent(db.pool(), &movie).await.expect("insert");
        }

        let movies = list_movies(db.pool()).await.expect("list");
        let titles: Vec<_> = movies.iter().map(|m| m.movie.title.as_str()).collect();
        assert_eq!(titles, vec!["Movie 1", "Movie 2", "Movie 3"]);
    }

    #[tokio::test]
    async fn test_get_missing_url() {
        let db = setup_test_db().await;
        let row = get_by_url(db.pool(), "https://www.imdb.com/title/tt9999999/")
            .await
            .expect("query");
        assert!(row.is_none());
    }

    #[tokio::test]
    async fn test_malformed_timestamp_is_decode_error() {
        let db = setup_test_db().await;
        sqlx::query(
            "INSERT INTO movies (id, title, url, created_at) VALUES ('x', 'Broken', ?, 'yesterday')",
        )
        .bind("https://www.imdb.com/title/tt0000009/")
        .execute(db.pool())
        .await
        .expect("raw insert");

        let result = get_by_url(db.pool(), "https://www.imdb.com/title/tt0000009/").await;
        assert!(matches!(result, Err(DatabaseError::Decode(_))));
    }

    #[tokio::test]
    async fn test_insert_without_schema_fails() {
        let db = Database::in_memory().await.expect("open database");
        let result = insert_if_absent(db.pool(), &test_movie()).await;
        assert!(matches!(result, Err(DatabaseError::Sqlx(_))));
    }
}
