//! Product API module
//!
//! Listing is public; create/update/delete are admin-only; rating requires a
//! logged-in customer.

mod handler;

use axum::{
    Router, middleware,
    routing::{get, post, put},
};

use crate::auth;
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    let admin = Router::new()
        .route("/products", post(handler::create))
        .route("/products/{id}", put(handler::update).delete(handler::remove))
        .route_layer(middleware::from_fn(auth::require_admin));

    Router::new()
        .route("/products", get(handler::list))
        .route("/products/{id}/rate", post(handler::rate))
        .merge(admin)
}
