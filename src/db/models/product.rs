//! Product Model
//!
//! Prices are integer minor currency units (centavos). `rating_average` is
//! the running mean of every 1-5 star rating applied; `rating_count` never
//! decreases. Products are soft-deleted by clearing `is_available`.

use super::serde_helpers;
use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

/// Product entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    #[serde(
        default,
        with = "serde_helpers::option_record_id",
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<RecordId>,
    pub name: String,
    /// Price in minor currency units
    pub price: i64,
    #[serde(with = "serde_helpers::record_id")]
    pub category: RecordId,
    /// Stored filename of the product image
    #[serde(default)]
    pub image_path: String,
    #[serde(default)]
    pub is_offer: bool,
    pub description: String,
    #[serde(default = "default_true")]
    pub is_available: bool,
    #[serde(default)]
    pub sold_count: i64,
    #[serde(default)]
    pub rating_average: f64,
    #[serde(default)]
    pub rating_count: i64,
}

fn default_true() -> bool {
    true
}

/// Product row with the category name resolved, for catalog listings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductView {
    #[serde(
        default,
        with = "serde_helpers::option_record_id",
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<RecordId>,
    pub name: String,
    pub price: i64,
    #[serde(with = "serde_helpers::record_id")]
    pub category: RecordId,
    pub category_name: Option<String>,
    #[serde(default)]
    pub image_path: String,
    #[serde(default)]
    pub is_offer: bool,
    pub description: String,
    pub is_available: bool,
    #[serde(default)]
    pub sold_count: i64,
    #[serde(default)]
    pub rating_average: f64,
    #[serde(default)]
    pub rating_count: i64,
}

/// Minimal projection used when snapshotting products into order lines
#[derive(Debug, Clone, Deserialize)]
pub struct ProductSnapshotRow {
    #[serde(with = "serde_helpers::record_id")]
    pub id: RecordId,
    pub name: String,
    pub price: i64,
    #[serde(default)]
    pub image_path: String,
    pub category_name: Option<String>,
}

/// Create product payload
#[derive(Debug, Clone)]
pub struct ProductCreate {
    pub name: String,
    pub price: i64,
    pub category_id: String,
    pub image_path: String,
    pub is_offer: bool,
    pub description: String,
    pub is_available: bool,
}

/// Partial product update
#[derive(Debug, Clone, Default)]
pub struct ProductUpdate {
    pub name: Option<String>,
    pub price: Option<i64>,
    pub category_id: Option<String>,
    pub image_path: Option<String>,
    pub is_offer: Option<bool>,
    pub description: Option<String>,
    pub is_available: Option<bool>,
}
