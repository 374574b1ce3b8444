//! Payment API Handlers
//!
//! The frontend asks for a payment intent before placing a card order. The
//! amount contract is `Σ(price × quantity) + delivery_fee`, in minor units.

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::core::ServerState;
use crate::services::payment;
use crate::utils::validation;
use crate::utils::AppResult;

#[derive(Debug, Serialize, Deserialize)]
pub struct IntentLine {
    /// Unit price in minor currency units
    pub price: i64,
    pub quantity: i64,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateIntentPayload {
    #[validate(length(min = 1, message = "must contain at least one item"))]
    pub products: Vec<IntentLine>,
    #[validate(range(min = 0, message = "must not be negative"))]
    pub delivery_fee: i64,
}

#[derive(Debug, Serialize)]
pub struct CreateIntentResponse {
    pub client_secret: String,
}

/// POST /create_payment_intent - ask the provider for a card payment intent
pub async fn create_intent(
    State(state): State<ServerState>,
    Json(payload): Json<CreateIntentPayload>,
) -> AppResult<Json<CreateIntentResponse>> {
    validation::check(&payload)?;

    let lines: Vec<(i64, i64)> = payload
        .products
        .iter()
        .map(|line| (line.price, line.quantity))
        .collect();
    let amount = payment::order_amount(&lines, payload.delivery_fee);

    let client_secret = state.payments().create_intent(amount).await?;
    Ok(Json(CreateIntentResponse { client_secret }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intent_payload_requires_at_least_one_item() {
        let empty = CreateIntentPayload {
            products: Vec::new(),
            delivery_fee: 0,
        };
        assert!(validation::check(&empty).is_err());

        let ok = CreateIntentPayload {
            products: vec![IntentLine {
                price: 1000,
                quantity: 2,
            }],
            delivery_fee: 300,
        };
        assert!(validation::check(&ok).is_ok());
    }

    #[test]
    fn test_intent_payload_rejects_negative_fee() {
        let payload = CreateIntentPayload {
            products: vec![IntentLine {
                price: 1000,
                quantity: 1,
            }],
            delivery_fee: -1,
        };
        assert!(validation::check(&payload).is_err());
    }
}
