//! Expense API module (admin-only)

mod handler;

use axum::{Router, middleware, routing::post};

use crate::auth;
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/expenses", post(handler::create))
        .route_layer(middleware::from_fn(auth::require_admin))
}
