//! Dashboard API Handlers
//!
//! Reporting over a `[start, end)` period in Unix millis. A missing or
//! nonsensical range falls back to the current UTC day. Canceled orders are
//! excluded from revenue and reported separately.

use axum::{
    Json,
    extract::{Query, State},
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::core::ServerState;
use crate::db::models::{Expense, Order, OrderStatus, OrderType};
use crate::utils::AppResult;

const DAY_MS: i64 = 24 * 60 * 60 * 1000;

#[derive(Debug, Deserialize)]
pub struct RangeQuery {
    pub start: Option<i64>,
    pub end: Option<i64>,
}

/// Resolve a requested range, defaulting to the current UTC day when the
/// range is absent or invalid
fn resolve_range(query: &RangeQuery, now_ms: i64) -> (i64, i64) {
    match (query.start, query.end) {
        (Some(start), Some(end)) if start >= 0 && start < end => (start, end),
        _ => {
            let day_start = now_ms - now_ms.rem_euclid(DAY_MS);
            (day_start, day_start + DAY_MS)
        }
    }
}

#[derive(Debug, Default, Serialize, PartialEq, Eq)]
pub struct StatusCounts {
    pub created: usize,
    pub preparing: usize,
    pub ready: usize,
    pub delivering: usize,
    pub delivered: usize,
    pub canceled: usize,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ProductSales {
    pub name: String,
    pub quantity: i64,
    pub revenue: i64,
}

#[derive(Debug, Serialize)]
pub struct DashboardSummary {
    pub start: i64,
    pub end: i64,
    pub total_orders: usize,
    pub status_counts: StatusCounts,
    /// Line-item revenue of non-canceled orders
    pub product_revenue: i64,
    /// Delivery fees of non-canceled orders
    pub delivery_revenue: i64,
    /// Totals of non-canceled card orders
    pub card_revenue: i64,
    /// Totals of canceled orders, reported separately
    pub canceled_revenue: i64,
    pub expense_total: i64,
    /// `product_revenue + delivery_revenue - expense_total`
    pub net_profit: i64,
    pub best_sellers: Vec<ProductSales>,
    pub worst_sellers: Vec<ProductSales>,
}

/// Per-product quantity and revenue across non-canceled orders, by name
fn product_totals(orders: &[Order]) -> Vec<ProductSales> {
    let mut by_name: BTreeMap<&str, (i64, i64)> = BTreeMap::new();
    for order in orders {
        if order.status == OrderStatus::Canceled {
            continue;
        }
        for item in &order.line_items {
            let entry = by_name.entry(&item.name).or_default();
            entry.0 += item.quantity;
            entry.1 += item.unit_price * item.quantity;
        }
    }
    by_name
        .into_iter()
        .map(|(name, (quantity, revenue))| ProductSales {
            name: name.to_string(),
            quantity,
            revenue,
        })
        .collect()
}

fn summarize(orders: &[Order], expenses: &[Expense], start: i64, end: i64) -> DashboardSummary {
    let mut counts = StatusCounts::default();
    let mut product_revenue = 0;
    let mut delivery_revenue = 0;
    let mut card_revenue = 0;
    let mut canceled_revenue = 0;

    for order in orders {
        match order.status {
            OrderStatus::Created => counts.created += 1,
            OrderStatus::Preparing => counts.preparing += 1,
            OrderStatus::Ready => counts.ready += 1,
            OrderStatus::Delivering => counts.delivering += 1,
            OrderStatus::Delivered => counts.delivered += 1,
            OrderStatus::Canceled => counts.canceled += 1,
        }
        if order.status == OrderStatus::Canceled {
            canceled_revenue += order.total;
            continue;
        }
        product_revenue += order
            .line_items
            .iter()
            .map(|item| item.unit_price * item.quantity)
            .sum::<i64>();
        delivery_revenue += order.delivery_fee;
        if order.payment_method == "card" {
            card_revenue += order.total;
        }
    }

    let expense_total: i64 = expenses.iter().map(|e| e.value).sum();

    let mut totals = product_totals(orders);
    totals.sort_by(|a, b| b.quantity.cmp(&a.quantity).then(a.name.cmp(&b.name)));
    let best_sellers: Vec<_> = totals.iter().take(5).cloned().collect();
    let mut worst_sellers: Vec<_> = totals.iter().rev().take(5).cloned().collect();
    worst_sellers.sort_by(|a, b| a.quantity.cmp(&b.quantity).then(a.name.cmp(&b.name)));

    DashboardSummary {
        start,
        end,
        total_orders: orders.len(),
        status_counts: counts,
        product_revenue,
        delivery_revenue,
        card_revenue,
        canceled_revenue,
        expense_total,
        net_profit: product_revenue + delivery_revenue - expense_total,
        best_sellers,
        worst_sellers,
    }
}

/// GET /dashboard - period summary (admin)
pub async fn summary(
    State(state): State<ServerState>,
    Query(query): Query<RangeQuery>,
) -> AppResult<Json<DashboardSummary>> {
    let (start, end) = resolve_range(&query, state.lifecycle().now_ms());
    let orders = state.orders().find_in_range(start, end).await?;
    let expenses = state.expenses().find_in_range(start, end).await?;
    Ok(Json(summarize(&orders, &expenses, start, end)))
}

#[derive(Debug, Serialize)]
pub struct DashboardReports {
    pub start: i64,
    pub end: i64,
    /// Non-canceled orders
    pub sales: Vec<Order>,
    pub product_totals: Vec<ProductSales>,
    /// Non-canceled delivery orders
    pub deliveries: Vec<Order>,
    pub cancellations: Vec<Order>,
    pub expenses: Vec<Expense>,
}

/// GET /dashboard/reports - period detail lists (admin)
pub async fn reports(
    State(state): State<ServerState>,
    Query(query): Query<RangeQuery>,
) -> AppResult<Json<DashboardReports>> {
    let (start, end) = resolve_range(&query, state.lifecycle().now_ms());
    let orders = state.orders().find_in_range(start, end).await?;
    let expenses = state.expenses().find_in_range(start, end).await?;

    let product_totals = product_totals(&orders);
    let (cancellations, sales): (Vec<_>, Vec<_>) = orders
        .into_iter()
        .partition(|o| o.status == OrderStatus::Canceled);
    let deliveries = sales
        .iter()
        .filter(|o| o.order_type == OrderType::Delivery)
        .cloned()
        .collect();

    Ok(Json(DashboardReports {
        start,
        end,
        sales,
        product_totals,
        deliveries,
        cancellations,
        expenses,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::LineItem;
    use crate::db::repository::record_id;

    fn item(name: &str, unit_price: i64, quantity: i64) -> LineItem {
        LineItem {
            product_id: record_id("product", name).unwrap(),
            name: name.to_string(),
            unit_price,
            category: "snacks".to_string(),
            image_url: String::new(),
            quantity,
            observation: None,
        }
    }

    fn order(
        status: OrderStatus,
        items: Vec<LineItem>,
        delivery_fee: i64,
        payment_method: &str,
    ) -> Order {
        let total: i64 =
            items.iter().map(|i| i.unit_price * i.quantity).sum::<i64>() + delivery_fee;
        Order {
            id: None,
            user_id: "u1".to_string(),
            user_name: "Test User".to_string(),
            line_items: items,
            status,
            observation: None,
            payment_method: payment_method.to_string(),
            payment_id: None,
            order_type: if delivery_fee > 0 {
                OrderType::Delivery
            } else {
                OrderType::Takeout
            },
            delivery_fee,
            total,
            address: None,
            is_rated: false,
            messages: Vec::new(),
            created_at: 0,
        }
    }

    fn expense(value: i64) -> Expense {
        Expense {
            id: None,
            description: "supplies".to_string(),
            value,
            date: 0,
        }
    }

    #[test]
    fn test_canceled_orders_are_excluded_from_revenue() {
        let orders = vec![
            order(
                OrderStatus::Delivered,
                vec![item("Burger", 1000, 2)],
                300,
                "cash",
            ),
            order(
                OrderStatus::Canceled,
                vec![item("Burger", 1000, 5)],
                300,
                "cash",
            ),
        ];
        let summary = summarize(&orders, &[], 0, DAY_MS);

        assert_eq!(summary.product_revenue, 2000);
        assert_eq!(summary.delivery_revenue, 300);
        assert_eq!(summary.canceled_revenue, 5300);
        assert_eq!(summary.status_counts.canceled, 1);
        assert_eq!(summary.status_counts.delivered, 1);
    }

    #[test]
    fn test_card_revenue_only_counts_card_orders() {
        let orders = vec![
            order(
                OrderStatus::Delivered,
                vec![item("Burger", 1000, 1)],
                0,
                "card",
            ),
            order(
                OrderStatus::Delivered,
                vec![item("Soda", 500, 1)],
                0,
                "cash",
            ),
        ];
        let summary = summarize(&orders, &[], 0, DAY_MS);
        assert_eq!(summary.card_revenue, 1000);
    }

    #[test]
    fn test_net_profit_subtracts_expenses() {
        let orders = vec![order(
            OrderStatus::Delivered,
            vec![item("Burger", 1000, 2)],
            300,
            "cash",
        )];
        let summary = summarize(&orders, &[expense(400), expense(100)], 0, DAY_MS);
        assert_eq!(summary.expense_total, 500);
        assert_eq!(summary.net_profit, 2000 + 300 - 500);
    }

    #[test]
    fn test_best_sellers_sorted_by_quantity() {
        let orders = vec![
            order(
                OrderStatus::Delivered,
                vec![item("Burger", 1000, 1), item("Soda", 500, 4)],
                0,
                "cash",
            ),
            order(
                OrderStatus::Delivered,
                vec![item("Burger", 1000, 2)],
                0,
                "cash",
            ),
        ];
        let summary = summarize(&orders, &[], 0, DAY_MS);
        assert_eq!(summary.best_sellers[0].name, "Soda");
        assert_eq!(summary.best_sellers[0].quantity, 4);
        assert_eq!(summary.best_sellers[1].name, "Burger");
        assert_eq!(summary.best_sellers[1].quantity, 3);
        assert_eq!(summary.worst_sellers[0].name, "Burger");
    }

    #[test]
    fn test_missing_range_defaults_to_current_day() {
        let query = RangeQuery {
            start: None,
            end: None,
        };
        let now = 3 * DAY_MS + 12_345;
        let (start, end) = resolve_range(&query, now);
        assert_eq!(start, 3 * DAY_MS);
        assert_eq!(end, 4 * DAY_MS);
    }

    #[test]
    fn test_inverted_range_defaults_to_current_day() {
        let query = RangeQuery {
            start: Some(500),
            end: Some(100),
        };
        let now = DAY_MS + 1;
        let (start, end) = resolve_range(&query, now);
        assert_eq!((start, end), (DAY_MS, 2 * DAY_MS));
    }

    #[test]
    fn test_explicit_range_is_kept() {
        let query = RangeQuery {
            start: Some(100),
            end: Some(500),
        };
        assert_eq!(resolve_range(&query, 0), (100, 500));
    }
}
