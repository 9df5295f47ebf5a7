//! Connection pool construction for file-backed and in-memory stores.

use crate::error::{DatabaseError, Result};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Pool, Sqlite};
use std::path::Path;
use std::str::FromStr;

/// Open (creating if missing) a `SQLite` database file.
///
/// Parent directories are created as needed.
///
/// # Errors
/// Returns `DatabaseError::Open` if the path is not UTF-8 or the file cannot be opened.
pub async fn connect(path: impl AsRef<Path>) -> Result<Pool<Sqlite>> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent).await?;
        }
    }

    let path_str = path.to_str().ok_or_else(|| {
        DatabaseError::Open("invalid database path: not valid UTF-8".to_string())
    })?;

    let connect_options = SqliteConnectOptions::from_str(path_str)
        .map_err(|e| DatabaseError::Open(format!("invalid connection string: {e}")))?
        .create_if_missing(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(connect_options)
        .await
        .map_err(|e| DatabaseError::Open(format!("failed to open {path_str}: {e}")))?;

    tracing::info!("Database pool created at {}", path_str);
    Ok(pool)
}

/// Open a private in-memory database.
///
/// A single connection that never idles out keeps the database alive for
/// the lifetime of the pool.
pub async fn connect_in_memory() -> Result<Pool<Sqlite>> {
    let connect_options = SqliteConnectOptions::from_str(":memory:")
        .map_err(|e| DatabaseError::Open(format!("invalid connection string: {e}")))?;

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .min_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(connect_options)
        .await
        .map_err(|e| DatabaseError::Open(format!("failed to open in-memory database: {e}")))?;

    Ok(pool)
}
