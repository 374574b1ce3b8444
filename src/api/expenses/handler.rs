//! Expense API Handlers

use axum::{Json, extract::State, http::StatusCode};
use serde::Deserialize;
use validator::Validate;

use crate::core::ServerState;
use crate::db::models::{Expense, ExpenseCreate};
use crate::utils::validation;
use crate::utils::AppResult;

#[derive(Debug, Deserialize, Validate)]
pub struct CreateExpensePayload {
    #[validate(length(min = 1, max = 500, message = "must be 1-500 characters"))]
    pub description: String,
    /// Amount in minor currency units
    #[validate(range(min = 0, message = "must not be negative"))]
    pub value: i64,
    /// Unix millis
    pub date: i64,
}

/// POST /expenses - record an expense (admin)
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<CreateExpensePayload>,
) -> AppResult<(StatusCode, Json<Expense>)> {
    validation::check(&payload)?;
    let expense = state
        .expenses()
        .create(ExpenseCreate {
            description: payload.description,
            value: payload.value,
            date: payload.date,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(expense)))
}
