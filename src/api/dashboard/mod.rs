//! Dashboard API module (admin-only)

mod handler;

use axum::{Router, middleware, routing::get};

use crate::auth;
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/dashboard", get(handler::summary))
        .route("/dashboard/reports", get(handler::reports))
        .route_layer(middleware::from_fn(auth::require_admin))
}
