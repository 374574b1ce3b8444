//! Order lifecycle events and their fanout
//!
//! The lifecycle engine talks to an [`EventPublisher`] seam, never to a
//! transport. [`bus::EventBus`] is the in-process implementation;
//! [`socket::SocketFanout`] bridges bus events onto socket.io rooms.

pub mod bus;
pub mod socket;

use serde::Serialize;

use crate::db::models::{Order, OrderMessage, OrderStatus};

/// A lifecycle event pushed to connected clients
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum OrderEvent {
    /// An order was created (broadcast to everyone)
    NewOrder { order: Order },
    /// An order changed status (sent to the order's room)
    StatusUpdate {
        order_id: String,
        new_status: OrderStatus,
    },
    /// A chat message was appended (broadcast to everyone)
    NewOrderMessage {
        order_id: String,
        message: OrderMessage,
    },
}

/// Publishing seam between the lifecycle engine and any transport.
///
/// Publishing is fire-and-forget: implementations log delivery problems and
/// never surface them, so a notification failure cannot fail a transition.
pub trait EventPublisher: Send + Sync {
    fn publish(&self, event: OrderEvent);
}

/// Publisher that drops everything, for tests and headless tools
#[derive(Debug, Clone, Default)]
pub struct NullPublisher;

impl EventPublisher for NullPublisher {
    fn publish(&self, _event: OrderEvent) {}
}

pub use bus::EventBus;
pub use socket::SocketFanout;
