//! Repository Module
//!
//! Per-table CRUD over the embedded SurrealDB. Every datastore call runs
//! under a bounded timeout; mutations that must serialize (status writes,
//! counters, running averages) are expressed as single datastore-side
//! statements, never read-modify-write.

pub mod category;
pub mod delivery_zone;
pub mod expense;
pub mod order;
pub mod product;

// Re-exports
pub use category::CategoryRepository;
pub use delivery_zone::DeliveryZoneRepository;
pub use expense::ExpenseRepository;
pub use order::OrderRepository;
pub use product::ProductRepository;

use std::time::Duration;

use surrealdb::Surreal;
use surrealdb::engine::local::Db;
use thiserror::Error;

/// Repository error types
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Duplicate: {0}")]
    Duplicate(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Datastore call timed out")]
    Timeout,
}

impl From<surrealdb::Error> for RepoError {
    fn from(err: surrealdb::Error) -> Self {
        RepoError::Database(err.to_string())
    }
}

/// Result type for repository operations
pub type RepoResult<T> = Result<T, RepoError>;

/// Parse an id that may arrive as a bare key or as `table:key`
pub fn record_id(table: &str, id: &str) -> RepoResult<surrealdb::RecordId> {
    if id.contains(':') {
        id.parse()
            .map_err(|_| RepoError::NotFound(format!("Invalid {table} id: {id}")))
    } else {
        Ok(surrealdb::RecordId::from_table_key(table, id))
    }
}

/// Default bound on a single datastore call
pub const DEFAULT_STORE_TIMEOUT: Duration = Duration::from_millis(5000);

/// Base repository with database reference and call timeout
#[derive(Clone)]
pub struct BaseRepository {
    db: Surreal<Db>,
    timeout: Duration,
}

impl BaseRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            db,
            timeout: DEFAULT_STORE_TIMEOUT,
        }
    }

    pub fn with_timeout(db: Surreal<Db>, timeout: Duration) -> Self {
        Self { db, timeout }
    }

    pub fn db(&self) -> &Surreal<Db> {
        &self.db
    }

    /// Run a datastore future under the configured timeout
    pub async fn run<T, F>(&self, fut: F) -> RepoResult<T>
    where
        F: Future<Output = RepoResult<T>>,
    {
        tokio::time::timeout(self.timeout, fut)
            .await
            .map_err(|_| RepoError::Timeout)?
    }
}
