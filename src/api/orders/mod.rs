//! Order API module
//!
//! Customers create, cancel, rate and chat on their own orders; staff list
//! everything and drive the status forward.

mod handler;

use axum::{
    Router, middleware,
    routing::{get, post, put},
};

use crate::auth;
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    let admin = Router::new()
        .route("/orders", get(handler::list_all))
        .route("/orders/{id}", put(handler::advance))
        .route_layer(middleware::from_fn(auth::require_admin));

    Router::new()
        .route("/orders", post(handler::create))
        .route("/orders/history", get(handler::history))
        .route("/orders/{id}/cancel", put(handler::cancel))
        .route("/orders/{id}/rate", post(handler::rate))
        .route("/orders/{id}/messages", post(handler::add_message))
        .merge(admin)
}
