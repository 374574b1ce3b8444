//! Order lifecycle engine
//!
//! Owns every order mutation after creation: status transitions, customer
//! cancellation, rating and chat messages. The transition itself is an atomic
//! conditional update in the repository; this layer decides legality, applies
//! side effects and notifies the fanout. Notification is fire-and-forget — a
//! publish failure never fails the mutation that triggered it.

use std::collections::HashSet;
use std::sync::Arc;

use surrealdb::RecordId;
use tracing::{info, warn};

use crate::db::models::{Order, OrderMessage, OrderStatus};
use crate::db::repository::{OrderRepository, ProductRepository, RepoError};
use crate::events::{EventPublisher, OrderEvent};
use crate::utils::{AppError, AppResult};

use super::status;

/// How long after creation a customer may still self-cancel
pub const CANCEL_WINDOW_MS: i64 = 30 * 60 * 1000;

/// Millisecond clock, injectable so the cancel window is testable
pub type Clock = Arc<dyn Fn() -> i64 + Send + Sync>;

fn system_clock() -> Clock {
    Arc::new(|| chrono::Utc::now().timestamp_millis())
}

#[derive(Clone)]
pub struct OrderLifecycle {
    orders: OrderRepository,
    products: ProductRepository,
    publisher: Arc<dyn EventPublisher>,
    clock: Clock,
}

impl OrderLifecycle {
    pub fn new(
        orders: OrderRepository,
        products: ProductRepository,
        publisher: Arc<dyn EventPublisher>,
    ) -> Self {
        Self::with_clock(orders, products, publisher, system_clock())
    }

    pub fn with_clock(
        orders: OrderRepository,
        products: ProductRepository,
        publisher: Arc<dyn EventPublisher>,
        clock: Clock,
    ) -> Self {
        Self {
            orders,
            products,
            publisher,
            clock,
        }
    }

    pub fn now_ms(&self) -> i64 {
        (self.clock)()
    }

    /// Persist a priced order draft and announce it
    pub async fn place(&self, draft: Order) -> AppResult<Order> {
        let order = self.orders.create(draft).await?;
        info!(
            order_id = %display_id(&order),
            user_id = %order.user_id,
            total = order.total,
            "Order placed"
        );
        self.publisher.publish(OrderEvent::NewOrder {
            order: order.clone(),
        });
        Ok(order)
    }

    /// Move an order to `requested`, enforcing the transition table.
    ///
    /// The write is conditional on the status observed here, so of two
    /// concurrent identical requests exactly one succeeds; the loser gets
    /// `InvalidTransition`. On entering `DELIVERED` each line item's product
    /// has its sold count bumped by the line quantity.
    pub async fn advance(
        &self,
        order_id: &str,
        requested: OrderStatus,
        actor: &str,
    ) -> AppResult<Order> {
        let order = self
            .orders
            .find_by_id(order_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Order {order_id}")))?;

        let current = order.status;
        if !status::can_transition(current, requested) {
            return Err(AppError::invalid_transition(format!(
                "{current} -> {requested} is not allowed"
            )));
        }

        let updated = self
            .write_status(record_id_of(&order)?, current, requested)
            .await?;
        info!(
            order_id = %display_id(&updated),
            from = %current,
            to = %requested,
            actor,
            "Order status updated"
        );

        if requested == OrderStatus::Delivered {
            self.record_sales(&updated).await;
        }

        self.notify_status(&updated);
        Ok(updated)
    }

    /// Customer self-cancel. Only the order's owner can cancel, only from
    /// CREATED or PREPARING, and only within the window after creation.
    pub async fn cancel(&self, order_id: &str, user_id: &str) -> AppResult<Order> {
        let order = self
            .orders
            .find_owned(order_id, user_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Order {order_id}")))?;

        let current = order.status;
        if !status::customer_cancelable(current) {
            return Err(AppError::invalid_transition(format!(
                "Order in {current} can no longer be canceled by the customer"
            )));
        }
        if self.now_ms() - order.created_at > CANCEL_WINDOW_MS {
            return Err(AppError::WindowExpired);
        }

        let updated = self
            .write_status(record_id_of(&order)?, current, OrderStatus::Canceled)
            .await?;
        info!(
            order_id = %display_id(&updated),
            user_id,
            "Order canceled by customer"
        );

        self.notify_status(&updated);
        Ok(updated)
    }

    /// Apply one 1-5 star rating to every distinct product of the order and
    /// mark the order rated, atomically. Only the order's owner may rate;
    /// another user's order reads as absent.
    pub async fn rate(&self, order_id: &str, user_id: &str, stars: i64) -> AppResult<()> {
        if !(1..=5).contains(&stars) {
            return Err(AppError::validation("stars must be between 1 and 5"));
        }

        let order = self
            .orders
            .find_owned(order_id, user_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Order {order_id}")))?;
        if order.is_rated {
            return Err(AppError::AlreadyRated);
        }

        let mut seen = HashSet::new();
        let product_ids: Vec<RecordId> = order
            .line_items
            .iter()
            .filter(|item| seen.insert(item.product_id.to_string()))
            .map(|item| item.product_id.clone())
            .collect();

        // the transaction's own is_rated guard decides races; the read above
        // only gives the common case a friendlier path
        self.orders
            .apply_rating(record_id_of(&order)?, product_ids, stars)
            .await
            .map_err(|e| match e {
                RepoError::Duplicate(_) => AppError::AlreadyRated,
                RepoError::Database(detail) => AppError::PartialRatingFailure(detail),
                other => other.into(),
            })?;

        info!(order_id, stars, "Order rated");
        Ok(())
    }

    /// Append a chat message and broadcast it
    pub async fn add_message(
        &self,
        order_id: &str,
        user_name: &str,
        text: String,
    ) -> AppResult<Order> {
        let message = OrderMessage {
            user_name: user_name.to_string(),
            text,
            created_at: self.now_ms(),
        };
        let order = self.orders.append_message(order_id, message.clone()).await?;

        self.publisher.publish(OrderEvent::NewOrderMessage {
            order_id: display_id(&order),
            message,
        });
        Ok(order)
    }

    async fn write_status(
        &self,
        id: &RecordId,
        expected: OrderStatus,
        new: OrderStatus,
    ) -> AppResult<Order> {
        self.orders
            .update_status_if(id, expected, new)
            .await?
            .ok_or_else(|| {
                // lost the race: someone moved the order first
                AppError::invalid_transition(format!("Order is no longer in {expected}"))
            })
    }

    /// Bump sold counts for a delivered order. The conditional status write
    /// already guaranteed this runs once per order, so a failed increment is
    /// logged and skipped rather than retried.
    async fn record_sales(&self, order: &Order) {
        for item in &order.line_items {
            if let Err(e) = self
                .products
                .increment_sold(&item.product_id, item.quantity)
                .await
            {
                warn!(
                    product_id = %item.product_id,
                    error = %e,
                    "Failed to record sale for delivered order"
                );
            }
        }
    }

    fn notify_status(&self, order: &Order) {
        self.publisher.publish(OrderEvent::StatusUpdate {
            order_id: display_id(order),
            new_status: order.status,
        });
    }
}

fn record_id_of(order: &Order) -> AppResult<&RecordId> {
    order
        .id
        .as_ref()
        .ok_or_else(|| AppError::internal("Persisted order is missing its id"))
}

fn display_id(order: &Order) -> String {
    order
        .id
        .as_ref()
        .map(|id| id.to_string())
        .unwrap_or_default()
}
