//! Socket.io fanout
//!
//! Bridges [`EventBus`] events onto socket.io: `new_order` and
//! `new_order_message` go to every connected client, `status_update` goes to
//! the room named after the order id. Clients join a room by sending
//! `join_order_room` with the order id.

use serde_json::json;
use socketioxide::SocketIo;
use socketioxide::extract::{Data, SocketRef};
use tokio_util::sync::CancellationToken;

use super::{EventBus, OrderEvent};

/// Socket.io layer over the event bus
#[derive(Clone)]
pub struct SocketFanout {
    io: SocketIo,
}

impl SocketFanout {
    /// Build the socket.io layer and its fanout handle. The returned layer
    /// must be attached to the axum router.
    pub fn new_layer() -> (socketioxide::layer::SocketIoLayer, Self) {
        let (layer, io) = SocketIo::new_layer();
        io.ns("/", on_connect);
        (layer, Self { io })
    }

    /// Forward bus events to connected clients until shutdown. Delivery is
    /// best effort; a failed emit is logged and skipped.
    pub async fn forward_events(self, bus: EventBus, shutdown: CancellationToken) {
        let mut rx = bus.subscribe();
        loop {
            tokio::select! {
                _ = shutdown.cancelled() => break,
                event = rx.recv() => match event {
                    Ok(event) => self.emit(event).await,
                    Err(tokio::sync::broadcast::error::RecvError::Lagged(missed)) => {
                        tracing::warn!(missed, "Socket fanout lagged behind the event bus");
                    }
                    Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
                },
            }
        }
        tracing::info!("Socket fanout stopped");
    }

    async fn emit(&self, event: OrderEvent) {
        let result = match event {
            OrderEvent::NewOrder { order } => self.io.emit("new_order", &order).await,
            OrderEvent::StatusUpdate {
                order_id,
                new_status,
            } => {
                let payload = json!({ "orderId": &order_id, "newStatus": new_status });
                self.io.to(order_id).emit("status_update", &payload).await
            }
            OrderEvent::NewOrderMessage { order_id, message } => {
                let payload = json!({ "orderId": order_id, "message": message });
                self.io.emit("new_order_message", &payload).await
            }
        };

        if let Err(e) = result {
            tracing::warn!(error = %e, "Failed to emit socket event");
        }
    }
}

async fn on_connect(socket: SocketRef) {
    tracing::debug!(sid = %socket.id, "Client connected");

    socket.on(
        "join_order_room",
        |socket: SocketRef, Data::<String>(order_id)| async move {
            tracing::debug!(sid = %socket.id, order_id = %order_id, "Joining order room");
            socket.join(order_id);
        },
    );
}
