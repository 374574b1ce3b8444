//! Order Model
//!
//! Orders are mutable documents: created at checkout, mutated by status
//! updates, chat messages and rating, never physically deleted. Line items
//! carry a catalog snapshot taken at creation time so later catalog changes
//! cannot alter historical orders.

use super::serde_helpers;
use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

/// Order status. `Created` is initial; `Delivered` and `Canceled` are
/// terminal. The legal transition table lives in [`crate::orders::status`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    Created,
    Preparing,
    Ready,
    Delivering,
    Delivered,
    Canceled,
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            OrderStatus::Created => "CREATED",
            OrderStatus::Preparing => "PREPARING",
            OrderStatus::Ready => "READY",
            OrderStatus::Delivering => "DELIVERING",
            OrderStatus::Delivered => "DELIVERED",
            OrderStatus::Canceled => "CANCELED",
        };
        f.write_str(s)
    }
}

/// Delivery vs. pickup at the counter
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OrderType {
    Delivery,
    Takeout,
}

/// One product entry within an order, snapshotted from the catalog
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineItem {
    #[serde(with = "serde_helpers::record_id")]
    pub product_id: RecordId,
    pub name: String,
    /// Unit price in minor currency units at order-creation time
    pub unit_price: i64,
    pub category: String,
    pub image_url: String,
    pub quantity: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub observation: Option<String>,
}

/// Chat message attached to an order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderMessage {
    pub user_name: String,
    pub text: String,
    /// Unix millis
    pub created_at: i64,
}

/// Delivery address, required iff `order_type == Delivery`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Address {
    pub cep: String,
    pub street: String,
    pub number: String,
    pub neighborhood: String,
    pub city: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub complement: Option<String>,
}

/// Order document
///
/// Invariant: `total == Σ(unit_price * quantity) + delivery_fee`.
/// `is_rated` transitions false→true exactly once.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    #[serde(
        default,
        with = "serde_helpers::option_record_id",
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<RecordId>,
    pub user_id: String,
    pub user_name: String,
    pub line_items: Vec<LineItem>,
    pub status: OrderStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub observation: Option<String>,
    pub payment_method: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_id: Option<String>,
    pub order_type: OrderType,
    /// Fee in minor currency units, zero for takeout
    pub delivery_fee: i64,
    /// Grand total in minor currency units
    pub total: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<Address>,
    #[serde(default)]
    pub is_rated: bool,
    #[serde(default)]
    pub messages: Vec<OrderMessage>,
    /// Unix millis
    pub created_at: i64,
}
