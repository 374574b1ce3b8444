//! Auto-completion sweeper
//!
//! Periodically closes orders stuck in DELIVERING past a configurable age by
//! driving them through the lifecycle engine's normal advance path, so the
//! transition table and the sold-count side effect apply exactly as they do
//! for a staff-initiated completion. One order failing is logged and the
//! sweep moves on.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::db::models::OrderStatus;
use crate::db::repository::OrderRepository;

use super::OrderLifecycle;

#[derive(Clone)]
pub struct AutoCompleteSweeper {
    orders: OrderRepository,
    lifecycle: Arc<OrderLifecycle>,
    interval: Duration,
    threshold: Duration,
}

impl AutoCompleteSweeper {
    pub fn new(
        orders: OrderRepository,
        lifecycle: Arc<OrderLifecycle>,
        interval: Duration,
        threshold: Duration,
    ) -> Self {
        Self {
            orders,
            lifecycle,
            interval,
            threshold,
        }
    }

    /// Run sweeps on the configured interval until cancellation
    pub async fn run(self, shutdown: CancellationToken) {
        info!(
            interval_secs = self.interval.as_secs(),
            threshold_secs = self.threshold.as_secs(),
            "Auto-completion sweeper started"
        );
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        // consume the immediate first tick
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => break,
                _ = ticker.tick() => {
                    self.sweep_once(self.lifecycle.now_ms()).await;
                }
            }
        }
        info!("Auto-completion sweeper stopped");
    }

    /// One sweep pass. Returns how many orders were completed.
    pub async fn sweep_once(&self, now_ms: i64) -> usize {
        let cutoff = now_ms - self.threshold.as_millis() as i64;
        let stale = match self.orders.find_stale_delivering(cutoff).await {
            Ok(orders) => orders,
            Err(e) => {
                warn!(error = %e, "Sweep scan failed");
                return 0;
            }
        };
        if stale.is_empty() {
            debug!("Sweep found nothing to complete");
            return 0;
        }

        let mut completed = 0;
        for order in stale {
            let Some(id) = order.id.as_ref().map(|id| id.to_string()) else {
                continue;
            };
            match self
                .lifecycle
                .advance(&id, OrderStatus::Delivered, "sweeper")
                .await
            {
                Ok(_) => {
                    info!(order_id = %id, "Auto-completed stale order");
                    completed += 1;
                }
                Err(e) => {
                    warn!(order_id = %id, error = %e, "Failed to auto-complete order");
                }
            }
        }
        completed
    }
}
