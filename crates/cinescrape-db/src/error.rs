//! Database error types.

use thiserror::Error;

/// Failures of the movie store.
///
/// A failed insert surfaces here and is counted by the caller; it never aborts a run.
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// The database file could not be created or opened.
    #[error("failed to open database: {0}")]
    Open(String),

    /// The embedded `movies` schema could not be applied.
    #[error("migration failed: {0}")]
    Migration(String),

    /// A stored row could not be read back, e.g. a malformed `created_at`.
    #[error("decode error: {0}")]
    Decode(String),

    /// Query failure, including a write against a missing `movies` table.
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    /// Creating the database's parent directory failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for store operations.
pub type Result<T> = std::result::Result<T, DatabaseError>;
