//! Delivery Zone Model
//!
//! A zone maps an inclusive postal-code range to a flat delivery fee.
//! Overlapping ranges are allowed in storage; the lookup defines the
//! tie-break (narrowest range wins).

use super::serde_helpers;
use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

/// Delivery zone entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeliveryZone {
    #[serde(
        default,
        with = "serde_helpers::option_record_id",
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<RecordId>,
    pub zip_start: i64,
    pub zip_end: i64,
    /// Flat fee in minor currency units
    pub price: i64,
}

/// Create zone payload. Invariant `zip_start <= zip_end` is checked before
/// the write.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeliveryZoneCreate {
    pub zip_start: i64,
    pub zip_end: i64,
    pub price: i64,
}
