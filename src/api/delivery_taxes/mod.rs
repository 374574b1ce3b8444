//! Delivery fee API module
//!
//! Zone management is admin-only; the fee calculation is open to any
//! logged-in customer at checkout.

mod handler;

use axum::{
    Router, middleware,
    routing::{get, post},
};

use crate::auth;
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    let admin = Router::new()
        .route(
            "/delivery-taxes",
            get(handler::list).post(handler::create),
        )
        .route_layer(middleware::from_fn(auth::require_admin));

    Router::new()
        .route("/delivery-calculate", post(handler::calculate))
        .merge(admin)
}
