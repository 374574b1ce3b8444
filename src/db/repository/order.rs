//! Order Repository
//!
//! Orders are mutable documents. The status write is an atomic conditional
//! update (`WHERE status = $expected`) — that single statement is the
//! serialization point every lifecycle invariant leans on.

use std::time::Duration;

use super::{BaseRepository, RepoError, RepoResult, record_id};
use crate::db::models::{Order, OrderMessage, OrderStatus};
use surrealdb::{RecordId, Surreal};
use surrealdb::engine::local::Db;

const ORDER_TABLE: &str = "order";

/// Thrown inside the rating transaction when the order is already rated
const ALREADY_RATED_MARKER: &str = "order already rated";

#[derive(Clone)]
pub struct OrderRepository {
    base: BaseRepository,
}

impl OrderRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    pub fn with_timeout(db: Surreal<Db>, timeout: Duration) -> Self {
        Self {
            base: BaseRepository::with_timeout(db, timeout),
        }
    }

    pub async fn create(&self, order: Order) -> RepoResult<Order> {
        self.base
            .run(async {
                let created: Option<Order> =
                    self.base.db().create(ORDER_TABLE).content(order).await?;
                created.ok_or_else(|| RepoError::Database("Failed to create order".into()))
            })
            .await
    }

    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<Order>> {
        let record_id = record_id(ORDER_TABLE, id)?;
        self.base
            .run(async {
                let order: Option<Order> = self.base.db().select(record_id).await?;
                Ok(order)
            })
            .await
    }

    /// The order only if it exists and belongs to `user_id`
    pub async fn find_owned(&self, id: &str, user_id: &str) -> RepoResult<Option<Order>> {
        let record_id = record_id(ORDER_TABLE, id)?;
        let user_id = user_id.to_string();
        self.base
            .run(async {
                let orders: Vec<Order> = self
                    .base
                    .db()
                    .query("SELECT * FROM order WHERE id = $id AND user_id = $user_id")
                    .bind(("id", record_id))
                    .bind(("user_id", user_id))
                    .await?
                    .take(0)?;
                Ok(orders.into_iter().next())
            })
            .await
    }

    pub async fn find_all(&self) -> RepoResult<Vec<Order>> {
        self.base
            .run(async {
                let orders: Vec<Order> = self
                    .base
                    .db()
                    .query("SELECT * FROM order ORDER BY created_at DESC")
                    .await?
                    .take(0)?;
                Ok(orders)
            })
            .await
    }

    pub async fn find_by_user(&self, user_id: &str) -> RepoResult<Vec<Order>> {
        let user_id = user_id.to_string();
        self.base
            .run(async {
                let orders: Vec<Order> = self
                    .base
                    .db()
                    .query(
                        "SELECT * FROM order WHERE user_id = $user_id ORDER BY created_at DESC",
                    )
                    .bind(("user_id", user_id))
                    .await?
                    .take(0)?;
                Ok(orders)
            })
            .await
    }

    /// Orders created in `[start, end)` (Unix millis), for reporting
    pub async fn find_in_range(&self, start: i64, end: i64) -> RepoResult<Vec<Order>> {
        self.base
            .run(async {
                let orders: Vec<Order> = self
                    .base
                    .db()
                    .query(
                        "SELECT * FROM order WHERE created_at >= $start AND created_at < $end \
                         ORDER BY created_at",
                    )
                    .bind(("start", start))
                    .bind(("end", end))
                    .await?
                    .take(0)?;
                Ok(orders)
            })
            .await
    }

    /// Atomic conditional status write. Returns the updated order, or `None`
    /// when the order no longer sits in `expected` — the caller treats that
    /// as a lost race, not as success.
    pub async fn update_status_if(
        &self,
        id: &RecordId,
        expected: OrderStatus,
        new: OrderStatus,
    ) -> RepoResult<Option<Order>> {
        let thing = id.clone();
        self.base
            .run(async {
                let orders: Vec<Order> = self
                    .base
                    .db()
                    .query(
                        "UPDATE $thing SET status = $new WHERE status = $expected RETURN AFTER",
                    )
                    .bind(("thing", thing))
                    .bind(("new", new))
                    .bind(("expected", expected))
                    .await?
                    .take(0)?;
                Ok(orders.into_iter().next())
            })
            .await
    }

    /// Append a chat message, returning the updated order
    pub async fn append_message(&self, id: &str, message: OrderMessage) -> RepoResult<Order> {
        let record_id = record_id(ORDER_TABLE, id)?;
        self.base
            .run(async {
                let orders: Vec<Order> = self
                    .base
                    .db()
                    .query("UPDATE $thing SET messages += $message RETURN AFTER")
                    .bind(("thing", record_id))
                    .bind(("message", message))
                    .await?
                    .take(0)?;
                orders
                    .into_iter()
                    .next()
                    .ok_or_else(|| RepoError::NotFound(format!("Order {id} not found")))
            })
            .await
    }

    /// Orders stuck in DELIVERING since before `cutoff` (Unix millis)
    pub async fn find_stale_delivering(&self, cutoff: i64) -> RepoResult<Vec<Order>> {
        self.base
            .run(async {
                let orders: Vec<Order> = self
                    .base
                    .db()
                    .query(
                        "SELECT * FROM order WHERE status = 'DELIVERING' \
                         AND created_at <= $cutoff",
                    )
                    .bind(("cutoff", cutoff))
                    .await?
                    .take(0)?;
                Ok(orders)
            })
            .await
    }

    /// Fold one rating into every product of the order and flip `is_rated`,
    /// as a single datastore transaction. The flip is conditional on
    /// `is_rated = false` and aborts the whole transaction when it matches
    /// nothing, so of two concurrent ratings exactly one commits; the loser
    /// fails with [`RepoError::Duplicate`] and leaves the products untouched.
    pub async fn apply_rating(
        &self,
        order_id: &RecordId,
        product_ids: Vec<RecordId>,
        stars: i64,
    ) -> RepoResult<()> {
        let mut statements = vec![
            "BEGIN TRANSACTION".to_string(),
            "LET $flipped = \
             (UPDATE $order SET is_rated = true WHERE is_rated = false RETURN AFTER)"
                .to_string(),
            format!("IF array::is_empty($flipped) {{ THROW '{ALREADY_RATED_MARKER}' }}"),
        ];
        for i in 0..product_ids.len() {
            statements.push(format!(
                "UPDATE $p{i} SET \
                 rating_average = ((rating_average * rating_count) + $stars) / (rating_count + 1), \
                 rating_count = rating_count + 1"
            ));
        }
        statements.push("COMMIT TRANSACTION".to_string());
        let query_str = statements.join(";\n");

        let order_id = order_id.clone();
        self.base
            .run(async {
                let mut query = self
                    .base
                    .db()
                    .query(query_str)
                    .bind(("order", order_id))
                    .bind(("stars", stars));
                for (i, product_id) in product_ids.into_iter().enumerate() {
                    query = query.bind((format!("p{i}"), product_id));
                }

                let mut response = query.await?;
                let errors = response.take_errors();
                if errors.is_empty() {
                    return Ok(());
                }
                // a cancelled transaction errors every statement; the THROW
                // message identifies the guard
                if errors
                    .values()
                    .any(|e| e.to_string().contains(ALREADY_RATED_MARKER))
                {
                    return Err(RepoError::Duplicate("Order already rated".into()));
                }
                let detail = errors
                    .into_values()
                    .map(|e| e.to_string())
                    .collect::<Vec<_>>()
                    .join("; ");
                Err(RepoError::Database(detail))
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DbService;
    use crate::db::models::{LineItem, OrderType};
    use crate::db::models::{Product, ProductCreate};
    use crate::db::repository::ProductRepository;

    async fn repos() -> (OrderRepository, ProductRepository) {
        let service = DbService::memory().await.expect("memory db");
        (
            OrderRepository::new(service.db.clone()),
            ProductRepository::new(service.db),
        )
    }

    async fn seed_product(products: &ProductRepository) -> Product {
        products
            .create(ProductCreate {
                name: "Pastel".to_string(),
                price: 700,
                category_id: "snacks".to_string(),
                image_path: String::new(),
                is_offer: false,
                description: "test".to_string(),
                is_available: true,
            })
            .await
            .expect("product")
    }

    async fn seed_order(orders: &OrderRepository, product: &Product) -> Order {
        orders
            .create(Order {
                id: None,
                user_id: "u1".to_string(),
                user_name: "Test User".to_string(),
                line_items: vec![LineItem {
                    product_id: product.id.clone().expect("product id"),
                    name: product.name.clone(),
                    unit_price: product.price,
                    category: "snacks".to_string(),
                    image_url: String::new(),
                    quantity: 1,
                    observation: None,
                }],
                status: OrderStatus::Delivered,
                observation: None,
                payment_method: "cash".to_string(),
                payment_id: None,
                order_type: OrderType::Takeout,
                delivery_fee: 0,
                total: 700,
                address: None,
                is_rated: false,
                messages: Vec::new(),
                created_at: 0,
            })
            .await
            .expect("order")
    }

    #[tokio::test]
    async fn test_second_rating_transaction_is_rejected() {
        let (orders, products) = repos().await;
        let product = seed_product(&products).await;
        let order = seed_order(&orders, &product).await;

        let order_id = order.id.as_ref().unwrap();
        let product_id = product.id.clone().unwrap();

        orders
            .apply_rating(order_id, vec![product_id.clone()], 4)
            .await
            .unwrap();
        let second = orders.apply_rating(order_id, vec![product_id], 5).await;
        assert!(matches!(second, Err(RepoError::Duplicate(_))));

        // the losing transaction must leave the products untouched
        let refreshed = products
            .find_by_id(&product.id.as_ref().unwrap().to_string())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(refreshed.rating_count, 1);
        assert!((refreshed.rating_average - 4.0).abs() < 1e-9);

        let order = orders
            .find_by_id(&order_id.to_string())
            .await
            .unwrap()
            .unwrap();
        assert!(order.is_rated);
    }

    #[tokio::test]
    async fn test_rating_flips_is_rated_with_the_same_commit() {
        let (orders, products) = repos().await;
        let product = seed_product(&products).await;
        let order = seed_order(&orders, &product).await;

        orders
            .apply_rating(order.id.as_ref().unwrap(), vec![product.id.clone().unwrap()], 5)
            .await
            .unwrap();

        let order = orders
            .find_by_id(&order.id.as_ref().unwrap().to_string())
            .await
            .unwrap()
            .unwrap();
        assert!(order.is_rated);
    }
}
