//! HTTP API, one module per area. Every module exposes
//! `fn router() -> Router<ServerState>`; they are merged in
//! [`crate::core::server::build_app`].

pub mod categories;
pub mod dashboard;
pub mod delivery_taxes;
pub mod expenses;
pub mod health;
pub mod orders;
pub mod payments;
pub mod products;
