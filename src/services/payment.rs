//! Payment provider client
//!
//! Thin client for the card-payment provider. The contract is amount in minor
//! currency units plus a currency code in, a client secret out; everything
//! else about the provider is opaque to this service.

use serde::Deserialize;

use crate::utils::{AppError, AppResult};

#[derive(Debug, Clone)]
pub struct PaymentConfig {
    pub base_url: String,
    pub secret_key: String,
    pub currency: String,
}

impl PaymentConfig {
    pub fn from_env() -> Self {
        Self {
            base_url: std::env::var("PAYMENT_BASE_URL")
                .unwrap_or_else(|_| "https://api.stripe.com".to_string()),
            secret_key: std::env::var("PAYMENT_SECRET_KEY").unwrap_or_default(),
            currency: std::env::var("PAYMENT_CURRENCY").unwrap_or_else(|_| "brl".to_string()),
        }
    }
}

#[derive(Debug, Deserialize)]
struct IntentResponse {
    client_secret: String,
}

#[derive(Clone)]
pub struct PaymentClient {
    http: reqwest::Client,
    config: PaymentConfig,
}

impl PaymentClient {
    pub fn new(config: PaymentConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
        }
    }

    /// Create a payment intent for `amount` minor units. Returns the client
    /// secret the frontend finishes the payment with.
    pub async fn create_intent(&self, amount: i64) -> AppResult<String> {
        if amount <= 0 {
            return Err(AppError::validation("payment amount must be positive"));
        }

        let url = format!(
            "{}/v1/payment_intents",
            self.config.base_url.trim_end_matches('/')
        );
        let params = [
            ("amount", amount.to_string()),
            ("currency", self.config.currency.clone()),
            ("payment_method_types[]", "card".to_string()),
        ];

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.config.secret_key)
            .form(&params)
            .send()
            .await
            .map_err(|e| AppError::internal(format!("Payment provider unreachable: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::error!(%status, body, "Payment intent creation failed");
            return Err(AppError::internal(format!(
                "Payment provider returned {status}"
            )));
        }

        let intent: IntentResponse = response
            .json()
            .await
            .map_err(|e| AppError::internal(format!("Malformed payment provider reply: {e}")))?;
        Ok(intent.client_secret)
    }
}

/// Amount the provider must charge for a cart:
/// `Σ(price × quantity) + delivery_fee`, all in minor units.
pub fn order_amount(lines: &[(i64, i64)], delivery_fee: i64) -> i64 {
    lines
        .iter()
        .map(|(price, quantity)| price * quantity)
        .sum::<i64>()
        + delivery_fee
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_amount_is_lines_plus_fee() {
        assert_eq!(order_amount(&[(1000, 2), (500, 1)], 300), 2800);
    }

    #[test]
    fn test_amount_without_delivery() {
        assert_eq!(order_amount(&[(700, 3)], 0), 2100);
    }

    #[tokio::test]
    async fn test_non_positive_amount_is_rejected() {
        let client = PaymentClient::new(PaymentConfig {
            base_url: "http://localhost:1".to_string(),
            secret_key: "sk_test".to_string(),
            currency: "brl".to_string(),
        });
        let err = client.create_intent(0).await.unwrap_err();
        assert!(matches!(err, AppError::Validation { .. }));
    }
}
