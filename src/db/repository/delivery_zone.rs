//! Delivery Zone Repository
//!
//! Zones are admin-created and never updated or deleted. Lookups are
//! read-only; the overlap tie-break (narrowest range first, then lowest
//! `zip_start`) is expressed in the query, never left to storage order.

use std::time::Duration;

use super::{BaseRepository, RepoError, RepoResult};
use crate::db::models::{DeliveryZone, DeliveryZoneCreate};
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

const ZONE_TABLE: &str = "delivery_zone";

#[derive(Clone)]
pub struct DeliveryZoneRepository {
    base: BaseRepository,
}

impl DeliveryZoneRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    pub fn with_timeout(db: Surreal<Db>, timeout: Duration) -> Self {
        Self {
            base: BaseRepository::with_timeout(db, timeout),
        }
    }

    pub async fn find_all(&self) -> RepoResult<Vec<DeliveryZone>> {
        self.base
            .run(async {
                let zones: Vec<DeliveryZone> = self
                    .base
                    .db()
                    .query("SELECT * FROM delivery_zone ORDER BY zip_start")
                    .await?
                    .take(0)?;
                Ok(zones)
            })
            .await
    }

    pub async fn create(&self, data: DeliveryZoneCreate) -> RepoResult<DeliveryZone> {
        if data.zip_start > data.zip_end {
            return Err(RepoError::Validation(
                "zip_start must not exceed zip_end".into(),
            ));
        }
        if data.price < 0 {
            return Err(RepoError::Validation("price must not be negative".into()));
        }

        let zone = DeliveryZone {
            id: None,
            zip_start: data.zip_start,
            zip_end: data.zip_end,
            price: data.price,
        };

        self.base
            .run(async {
                let created: Option<DeliveryZone> =
                    self.base.db().create(ZONE_TABLE).content(zone).await?;
                created.ok_or_else(|| RepoError::Database("Failed to create zone".into()))
            })
            .await
    }

    /// Find the zone covering a numeric postal code. With overlapping
    /// ranges the narrowest wins, ties broken by lowest `zip_start`.
    pub async fn find_for_postal_code(&self, code: i64) -> RepoResult<Option<DeliveryZone>> {
        self.base
            .run(async {
                let zones: Vec<DeliveryZone> = self
                    .base
                    .db()
                    .query(
                        "SELECT *, zip_end - zip_start AS width FROM delivery_zone \
                         WHERE zip_start <= $code AND zip_end >= $code \
                         ORDER BY width ASC, zip_start ASC LIMIT 1",
                    )
                    .bind(("code", code))
                    .await?
                    .take(0)?;
                Ok(zones.into_iter().next())
            })
            .await
    }
}
