//! Expense Model

use super::serde_helpers;
use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

/// Expense entity, feeds the dashboard's net-profit figures
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Expense {
    #[serde(
        default,
        with = "serde_helpers::option_record_id",
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<RecordId>,
    pub description: String,
    /// Amount in minor currency units
    pub value: i64,
    /// Unix millis at the start of the expense day
    pub date: i64,
}

/// Create expense payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExpenseCreate {
    pub description: String,
    pub value: i64,
    pub date: i64,
}
