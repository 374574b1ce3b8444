//! Database Module
//!
//! Embedded SurrealDB with an explicit open/close lifecycle. Catalog tables
//! (`product`, `category`, `delivery_zone`, `expense`) and the `order`
//! document table live in the same embedded database; all access goes
//! through the repositories in [`repository`].

pub mod models;
pub mod repository;

use surrealdb::Surreal;
use surrealdb::engine::local::{Db, Mem, RocksDb};

use crate::utils::AppError;

const NAMESPACE: &str = "cantina";
const DATABASE: &str = "main";

/// Database service — owns the embedded SurrealDB handle
#[derive(Clone, Debug)]
pub struct DbService {
    pub db: Surreal<Db>,
}

impl DbService {
    /// Open (or create) the on-disk database at `path`
    pub async fn new(path: &str) -> Result<Self, AppError> {
        let db = Surreal::new::<RocksDb>(path)
            .await
            .map_err(|e| AppError::internal(format!("Failed to open database: {e}")))?;

        db.use_ns(NAMESPACE)
            .use_db(DATABASE)
            .await
            .map_err(|e| AppError::internal(format!("Failed to select database: {e}")))?;

        tracing::info!(path, "Database connection established (embedded SurrealDB)");
        Ok(Self { db })
    }

    /// In-memory database, used by tests
    pub async fn memory() -> Result<Self, AppError> {
        let db = Surreal::new::<Mem>(())
            .await
            .map_err(|e| AppError::internal(format!("Failed to open memory database: {e}")))?;
        db.use_ns(NAMESPACE)
            .use_db(DATABASE)
            .await
            .map_err(|e| AppError::internal(format!("Failed to select database: {e}")))?;
        Ok(Self { db })
    }
}
