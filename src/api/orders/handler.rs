//! Order API Handlers

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Deserialize;
use validator::Validate;

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::models::{Address, Order, OrderStatus, OrderType};
use crate::orders::{OrderRequest, RequestedLine};
use crate::utils::AppResult;
use crate::utils::validation;

#[derive(Debug, Deserialize)]
pub struct OrderLinePayload {
    pub product_id: String,
    pub quantity: i64,
    pub observation: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateOrderPayload {
    pub products: Vec<OrderLinePayload>,
    pub order_type: OrderType,
    pub address: Option<Address>,
    #[validate(length(max = 500, message = "max 500 characters"))]
    pub observation: Option<String>,
    #[validate(length(min = 1, max = 100, message = "must be 1-100 characters"))]
    pub payment_method: String,
    #[validate(length(max = 100, message = "max 100 characters"))]
    pub payment_id: Option<String>,
}

/// POST /orders - price and place an order for the current user
pub async fn create(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(payload): Json<CreateOrderPayload>,
) -> AppResult<(StatusCode, Json<Order>)> {
    validation::check(&payload)?;

    let request = OrderRequest {
        lines: payload
            .products
            .into_iter()
            .map(|line| RequestedLine {
                product_id: line.product_id,
                quantity: line.quantity,
                observation: line.observation,
            })
            .collect(),
        order_type: payload.order_type,
        address: payload.address,
        observation: payload.observation,
        payment_method: payload.payment_method,
        payment_id: payload.payment_id,
    };

    let now = state.lifecycle().now_ms();
    let draft = state
        .pricer()
        .build_draft(&user.id, &user.name, request, now)
        .await?;
    let order = state.lifecycle().place(draft).await?;
    Ok((StatusCode::CREATED, Json(order)))
}

/// GET /orders - every order, newest first (admin)
pub async fn list_all(State(state): State<ServerState>) -> AppResult<Json<Vec<Order>>> {
    let orders = state.orders().find_all().await?;
    Ok(Json(orders))
}

/// GET /orders/history - the current user's orders
pub async fn history(
    State(state): State<ServerState>,
    user: CurrentUser,
) -> AppResult<Json<Vec<Order>>> {
    let orders = state.orders().find_by_user(&user.id).await?;
    Ok(Json(orders))
}

#[derive(Debug, Deserialize)]
pub struct AdvancePayload {
    pub status: OrderStatus,
}

/// PUT /orders/:id - move the order to the requested status (admin)
pub async fn advance(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
    Json(payload): Json<AdvancePayload>,
) -> AppResult<Json<Order>> {
    let actor = format!("admin:{}", user.id);
    let order = state
        .lifecycle()
        .advance(&id, payload.status, &actor)
        .await?;
    Ok(Json(order))
}

/// PUT /orders/:id/cancel - customer self-cancel within the window
pub async fn cancel(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Json<Order>> {
    let order = state.lifecycle().cancel(&id, &user.id).await?;
    Ok(Json(order))
}

#[derive(Debug, Deserialize, Validate)]
pub struct RateOrderPayload {
    #[validate(range(min = 1, max = 5, message = "must be between 1 and 5"))]
    pub stars: i64,
}

/// POST /orders/:id/rate - rate every product of a finished order once
pub async fn rate(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
    Json(payload): Json<RateOrderPayload>,
) -> AppResult<StatusCode> {
    validation::check(&payload)?;
    state.lifecycle().rate(&id, &user.id, payload.stars).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize, Validate)]
pub struct MessagePayload {
    #[validate(length(min = 1, max = 500, message = "must be 1-500 characters"))]
    pub text: String,
}

/// POST /orders/:id/messages - append a chat message and broadcast it.
/// Customers may only message their own orders; staff may message any.
pub async fn add_message(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
    Json(payload): Json<MessagePayload>,
) -> AppResult<(StatusCode, Json<Order>)> {
    validation::check(&payload)?;

    if !user.is_admin() {
        state
            .orders()
            .find_owned(&id, &user.id)
            .await?
            .ok_or_else(|| crate::utils::AppError::not_found(format!("Order {id}")))?;
    }

    let order = state
        .lifecycle()
        .add_message(&id, &user.name, payload.text)
        .await?;
    Ok((StatusCode::CREATED, Json(order)))
}
