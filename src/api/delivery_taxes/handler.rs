//! Delivery fee API Handlers

use axum::{Json, extract::State, http::StatusCode};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::core::ServerState;
use crate::db::models::{DeliveryZone, DeliveryZoneCreate};
use crate::utils::validation;
use crate::utils::AppResult;

/// GET /delivery-taxes - every zone (admin)
pub async fn list(State(state): State<ServerState>) -> AppResult<Json<Vec<DeliveryZone>>> {
    let zones = state.zones().find_all().await?;
    Ok(Json(zones))
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateZonePayload {
    #[validate(range(min = 0, message = "must not be negative"))]
    pub zip_start: i64,
    #[validate(range(min = 0, message = "must not be negative"))]
    pub zip_end: i64,
    #[validate(range(min = 0, message = "must not be negative"))]
    pub price: i64,
}

/// POST /delivery-taxes - create a zone (admin). The repository rejects
/// inverted ranges.
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<CreateZonePayload>,
) -> AppResult<(StatusCode, Json<DeliveryZone>)> {
    validation::check(&payload)?;
    let zone = state
        .zones()
        .create(DeliveryZoneCreate {
            zip_start: payload.zip_start,
            zip_end: payload.zip_end,
            price: payload.price,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(zone)))
}

#[derive(Debug, Deserialize, Validate)]
pub struct CalculatePayload {
    #[validate(length(min = 1, max = 100, message = "must be 1-100 characters"))]
    pub cep: String,
}

#[derive(Debug, Serialize)]
pub struct CalculateResponse {
    pub price: i64,
}

/// POST /delivery-calculate - fee for a postal code, or out-of-service-area
pub async fn calculate(
    State(state): State<ServerState>,
    Json(payload): Json<CalculatePayload>,
) -> AppResult<Json<CalculateResponse>> {
    validation::check(&payload)?;
    let price = state.pricer().delivery_fee_for_cep(&payload.cep).await?;
    Ok(Json(CalculateResponse { price }))
}
