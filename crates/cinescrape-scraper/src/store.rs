use cinescrape_core::MovieDetail;
use cinescrape_db::{Database, DatabaseError};

/// Insert-if-absent persistence consumed by the orchestrator.
#[async_trait::async_trait]
pub trait MovieStore: Send + Sync {
    /// Persist `movie` unless its URL is already stored. Returns `true` if a row was created.
    async fn insert_if_absent(&self, movie: &MovieDetail) -> Result<bool, DatabaseError>;
}

#[async_trait::async_trait]
impl MovieStore for Database {
    async fn insert_if_absent(&self, movie: &MovieDetail) -> Result<bool, DatabaseError> {
        Database::insert_if_absent(self, movie).await
    }
}
