//! In-process event bus
//!
//! A thin wrapper over `tokio::sync::broadcast`. Producers publish without
//! waiting; every subscriber gets its own receiver. Lagging subscribers drop
//! old events rather than block publishers.

use tokio::sync::broadcast;

use super::{EventPublisher, OrderEvent};

/// Default capacity of the broadcast channel
const DEFAULT_CAPACITY: usize = 1024;

/// Event bus — fans lifecycle events out to any number of subscribers
#[derive(Debug, Clone)]
pub struct EventBus {
    tx: broadcast::Sender<OrderEvent>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Subscribe to all future events
    pub fn subscribe(&self) -> broadcast::Receiver<OrderEvent> {
        self.tx.subscribe()
    }

    /// Number of live subscribers
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EventPublisher for EventBus {
    fn publish(&self, event: OrderEvent) {
        // send only errors when nobody is subscribed, which is a fine state
        // for a fire-and-forget channel
        if self.tx.send(event).is_err() {
            tracing::debug!("Order event published with no subscribers");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::OrderStatus;

    #[tokio::test]
    async fn test_subscriber_receives_published_event() {
        let bus = EventBus::new();
        let mut rx = bus.subscribe();

        bus.publish(OrderEvent::StatusUpdate {
            order_id: "order:abc".into(),
            new_status: OrderStatus::Preparing,
        });

        match rx.recv().await.expect("event") {
            OrderEvent::StatusUpdate {
                order_id,
                new_status,
            } => {
                assert_eq!(order_id, "order:abc");
                assert_eq!(new_status, OrderStatus::Preparing);
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[test]
    fn test_publish_without_subscribers_does_not_panic() {
        let bus = EventBus::new();
        bus.publish(OrderEvent::StatusUpdate {
            order_id: "order:abc".into(),
            new_status: OrderStatus::Canceled,
        });
        assert_eq!(bus.subscriber_count(), 0);
    }
}
