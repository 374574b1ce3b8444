//! cantina-server
//!
//! Backend for a food-ordering platform: product and category catalog,
//! delivery-fee zones, an order lifecycle state machine with realtime
//! notifications, expense and dashboard reporting, and payment-intent
//! creation.

pub mod api;
pub mod auth;
pub mod core;
pub mod db;
pub mod events;
pub mod orders;
pub mod services;
pub mod utils;

pub use crate::core::{Config, Server, ServerState};
pub use utils::{AppError, AppResult};
