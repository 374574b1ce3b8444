//! Product Repository
//!
//! Counter and rating mutations are single datastore-side statements so
//! concurrent flows (lifecycle completion, rating) serialize per row.

use std::time::Duration;

use super::{BaseRepository, RepoError, RepoResult, record_id};
use crate::db::models::{Product, ProductCreate, ProductSnapshotRow, ProductUpdate, ProductView};
use surrealdb::{RecordId, Surreal};
use surrealdb::engine::local::Db;

const PRODUCT_TABLE: &str = "product";
const CATEGORY_TABLE: &str = "category";

#[derive(Clone)]
pub struct ProductRepository {
    base: BaseRepository,
}

impl ProductRepository {
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

    /// Find all available products with the category name resolved
    pub async fn find_available(&self) -> RepoResult<Vec<ProductView>> {
        self.base
            .run(async {
                let products: Vec<ProductView> = self
                    .base
                    .db()
                    .query(
                        "SELECT *, type::record(category).name AS category_name FROM product \
                         WHERE is_available = true ORDER BY name",
                    )
                    .await?
                    .take(0)?;
                Ok(products)
            })
            .await
    }

    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<Product>> {
        let record_id = record_id(PRODUCT_TABLE, id)?;
        self.base
            .run(async {
                let product: Option<Product> = self.base.db().select(record_id).await?;
                Ok(product)
            })
            .await
    }

    /// Resolve the requested ids into catalog snapshots. Unknown or
    /// unavailable ids are simply absent from the result; the caller decides
    /// what that means.
    pub async fn snapshot_by_ids(&self, ids: Vec<RecordId>) -> RepoResult<Vec<ProductSnapshotRow>> {
        self.base
            .run(async {
                let rows: Vec<ProductSnapshotRow> = self
                    .base
                    .db()
                    .query(
                        "SELECT id, name, price, image_path, \
                         type::record(category).name AS category_name \
                         FROM product WHERE id IN $ids AND is_available = true",
                    )
                    .bind(("ids", ids))
                    .await?
                    .take(0)?;
                Ok(rows)
            })
            .await
    }

    /// Create a new product
    pub async fn create(&self, data: ProductCreate) -> RepoResult<Product> {
        let category = record_id(CATEGORY_TABLE, &data.category_id)?;
        let product = Product {
            id: None,
            name: data.name,
            price: data.price,
            category,
            image_path: data.image_path,
            is_offer: data.is_offer,
            description: data.description,
            is_available: data.is_available,
            sold_count: 0,
            rating_average: 0.0,
            rating_count: 0,
        };

        self.base
            .run(async {
                let created: Option<Product> = self
                    .base
                    .db()
                    .create(PRODUCT_TABLE)
                    .content(product)
                    .await?;
                created.ok_or_else(|| RepoError::Database("Failed to create product".into()))
            })
            .await
    }

    /// Partial update
    pub async fn update(&self, id: &str, data: ProductUpdate) -> RepoResult<Product> {
        let thing = record_id(PRODUCT_TABLE, id)?;
        let category = match &data.category_id {
            Some(cat) => Some(record_id(CATEGORY_TABLE, cat)?),
            None => None,
        };

        // Build dynamic SET clauses with typed bindings
        let mut set_parts: Vec<&str> = Vec::new();
        if data.name.is_some() {
            set_parts.push("name = $name");
        }
        if data.price.is_some() {
            set_parts.push("price = $price");
        }
        if category.is_some() {
            set_parts.push("category = $category");
        }
        if data.image_path.is_some() {
            set_parts.push("image_path = $image_path");
        }
        if data.is_offer.is_some() {
            set_parts.push("is_offer = $is_offer");
        }
        if data.description.is_some() {
            set_parts.push("description = $description");
        }
        if data.is_available.is_some() {
            set_parts.push("is_available = $is_available");
        }

        if set_parts.is_empty() {
            return self
                .find_by_id(id)
                .await?
                .ok_or_else(|| RepoError::NotFound(format!("Product {id} not found")));
        }

        let query_str = format!(
            "UPDATE $thing SET {} RETURN AFTER",
            set_parts.join(", ")
        );

        self.base
            .run(async {
                let mut query = self.base.db().query(query_str).bind(("thing", thing));
                if let Some(v) = data.name {
                    query = query.bind(("name", v));
                }
                if let Some(v) = data.price {
                    query = query.bind(("price", v));
                }
                if let Some(v) = category {
                    query = query.bind(("category", v));
                }
                if let Some(v) = data.image_path {
                    query = query.bind(("image_path", v));
                }
                if let Some(v) = data.is_offer {
                    query = query.bind(("is_offer", v));
                }
                if let Some(v) = data.description {
                    query = query.bind(("description", v));
                }
                if let Some(v) = data.is_available {
                    query = query.bind(("is_available", v));
                }

                let products: Vec<Product> = query.await?.take(0)?;
                products
                    .into_iter()
                    .next()
                    .ok_or_else(|| RepoError::NotFound(format!("Product {id} not found")))
            })
            .await
    }

    /// Soft delete: the product stays on historical orders but leaves the
    /// catalog
    pub async fn soft_delete(&self, id: &str) -> RepoResult<Product> {
        let thing = record_id(PRODUCT_TABLE, id)?;
        self.base
            .run(async {
                let products: Vec<Product> = self
                    .base
                    .db()
                    .query("UPDATE $thing SET is_available = false RETURN AFTER")
                    .bind(("thing", thing))
                    .await?
                    .take(0)?;
                products
                    .into_iter()
                    .next()
                    .ok_or_else(|| RepoError::NotFound(format!("Product {id} not found")))
            })
            .await
    }

    /// Atomically add `quantity` to the product's sold count
    pub async fn increment_sold(&self, id: &RecordId, quantity: i64) -> RepoResult<()> {
        let thing = id.clone();
        self.base
            .run(async {
                self.base
                    .db()
                    .query("UPDATE $thing SET sold_count += $qty")
                    .bind(("thing", thing))
                    .bind(("qty", quantity))
                    .await?
                    .check()?;
                Ok(())
            })
            .await
    }

    /// Fold one star rating into the running average, in a single statement
    pub async fn apply_rating(&self, id: &str, stars: i64) -> RepoResult<Product> {
        let thing = record_id(PRODUCT_TABLE, id)?;
        self.base
            .run(async {
                let products: Vec<Product> = self
                    .base
                    .db()
                    .query(
                        "UPDATE $thing SET \
                         rating_average = ((rating_average * rating_count) + $stars) / (rating_count + 1), \
                         rating_count = rating_count + 1 \
                         RETURN AFTER",
                    )
                    .bind(("thing", thing))
                    .bind(("stars", stars))
                    .await?
                    .take(0)?;
                products
                    .into_iter()
                    .next()
                    .ok_or_else(|| RepoError::NotFound(format!("Product {id} not found")))
            })
            .await
    }
}
