//! Category API module
//!
//! Listing is public; create and update are admin-only.

mod handler;

use axum::{
    Router, middleware,
    routing::{get, post, put},
};

use crate::auth;
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    let admin = Router::new()
        .route("/categories", post(handler::create))
        .route("/categories/{id}", put(handler::update))
        .route_layer(middleware::from_fn(auth::require_admin));

    Router::new()
        .route("/categories", get(handler::list))
        .merge(admin)
}
