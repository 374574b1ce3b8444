//! Order pricing
//!
//! Turns a checkout request into a priced order draft: resolves the delivery
//! fee from the address, snapshots each requested product out of the catalog
//! and sums the total. Requested ids that do not resolve to an available
//! product are dropped with a warning; an order where nothing resolves is
//! rejected. The draft is not persisted here.

use std::collections::HashMap;

use surrealdb::RecordId;
use tracing::warn;

use crate::db::models::{Address, LineItem, Order, OrderStatus, OrderType};
use crate::db::repository::{self, DeliveryZoneRepository, ProductRepository};
use crate::utils::{AppError, AppResult};

/// One requested order line, by catalog id
#[derive(Debug, Clone)]
pub struct RequestedLine {
    pub product_id: String,
    pub quantity: i64,
    pub observation: Option<String>,
}

/// Checkout request as the pricer sees it, after transport-level validation
#[derive(Debug, Clone)]
pub struct OrderRequest {
    pub lines: Vec<RequestedLine>,
    pub order_type: OrderType,
    pub address: Option<Address>,
    pub observation: Option<String>,
    pub payment_method: String,
    pub payment_id: Option<String>,
}

#[derive(Clone)]
pub struct OrderPricer {
    products: ProductRepository,
    zones: DeliveryZoneRepository,
    /// Base URL under which stored images are served
    files_base_url: String,
}

impl OrderPricer {
    pub fn new(
        products: ProductRepository,
        zones: DeliveryZoneRepository,
        files_base_url: String,
    ) -> Self {
        Self {
            products,
            zones,
            files_base_url,
        }
    }

    /// Delivery fee for a raw CEP string. Non-digits are stripped before the
    /// zone lookup; no covering zone means the address is out of service.
    pub async fn delivery_fee_for_cep(&self, cep: &str) -> AppResult<i64> {
        let digits: String = cep.chars().filter(char::is_ascii_digit).collect();
        if digits.is_empty() {
            return Err(AppError::validation("cep must contain digits"));
        }
        let code: i64 = digits
            .parse()
            .map_err(|_| AppError::validation("cep is not a valid postal code"))?;

        match self.zones.find_for_postal_code(code).await? {
            Some(zone) => Ok(zone.price),
            None => Err(AppError::OutOfServiceArea),
        }
    }

    /// Build a priced, unpersisted order draft for `user`
    pub async fn build_draft(
        &self,
        user_id: &str,
        user_name: &str,
        request: OrderRequest,
        now_ms: i64,
    ) -> AppResult<Order> {
        self.check_request(&request)?;

        let delivery_fee = match request.order_type {
            OrderType::Delivery => {
                // address presence was checked above
                let address = request.address.as_ref().ok_or_else(|| {
                    AppError::validation("address is required for delivery orders")
                })?;
                self.delivery_fee_for_cep(&address.cep).await?
            }
            OrderType::Takeout => 0,
        };

        let line_items = self.snapshot_lines(&request.lines).await?;
        let total: i64 = line_items
            .iter()
            .map(|item| item.unit_price * item.quantity)
            .sum::<i64>()
            + delivery_fee;

        Ok(Order {
            id: None,
            user_id: user_id.to_string(),
            user_name: user_name.to_string(),
            line_items,
            status: OrderStatus::Created,
            observation: request.observation,
            payment_method: request.payment_method,
            payment_id: request.payment_id,
            order_type: request.order_type,
            delivery_fee,
            total,
            address: request.address,
            is_rated: false,
            messages: Vec::new(),
            created_at: now_ms,
        })
    }

    /// Field checks that need no datastore access. Problems are collected
    /// into one validation error rather than reported one at a time.
    fn check_request(&self, request: &OrderRequest) -> AppResult<()> {
        let mut problems = Vec::new();

        if request.lines.is_empty() {
            problems.push("lines: order must contain at least one item".to_string());
        }
        for (i, line) in request.lines.iter().enumerate() {
            if line.quantity < 1 {
                problems.push(format!("lines[{i}].quantity: must be at least 1"));
            }
        }
        if request.payment_method == "card" && request.payment_id.is_none() {
            problems.push("payment_id: required for card payments".to_string());
        }
        if request.order_type == OrderType::Delivery && request.address.is_none() {
            problems.push("address: required for delivery orders".to_string());
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(AppError::Validation {
                message: "Invalid order request".to_string(),
                details: Some(problems),
            })
        }
    }

    /// Resolve requested ids into catalog snapshots, in request order.
    /// Unknown and unavailable products are dropped with a warning.
    async fn snapshot_lines(&self, lines: &[RequestedLine]) -> AppResult<Vec<LineItem>> {
        let ids: Vec<RecordId> = lines
            .iter()
            .filter_map(|line| repository::record_id("product", &line.product_id).ok())
            .collect();

        let rows = self.products.snapshot_by_ids(ids).await?;
        let by_id: HashMap<String, _> = rows
            .into_iter()
            .map(|row| (row.id.to_string(), row))
            .collect();

        let mut items = Vec::with_capacity(lines.len());
        for line in lines {
            let key = match repository::record_id("product", &line.product_id) {
                Ok(id) => id.to_string(),
                Err(_) => line.product_id.clone(),
            };
            let Some(row) = by_id.get(&key) else {
                warn!(
                    product_id = %line.product_id,
                    "Dropping unknown or unavailable product from order"
                );
                continue;
            };
            items.push(LineItem {
                product_id: row.id.clone(),
                name: row.name.clone(),
                unit_price: row.price,
                category: row.category_name.clone().unwrap_or_default(),
                image_url: self.image_url(&row.image_path),
                quantity: line.quantity,
                observation: line.observation.clone(),
            });
        }

        if items.is_empty() {
            return Err(AppError::validation(
                "none of the requested products are available",
            ));
        }
        Ok(items)
    }

    fn image_url(&self, image_path: &str) -> String {
        if image_path.is_empty() {
            return String::new();
        }
        format!("{}/{image_path}", self.files_base_url.trim_end_matches('/'))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DbService;
    use crate::db::models::{DeliveryZoneCreate, Product, ProductCreate};

    struct TestEnv {
        products: ProductRepository,
        zones: DeliveryZoneRepository,
        pricer: OrderPricer,
    }

    async fn env() -> TestEnv {
        let service = DbService::memory().await.expect("memory db");
        let products = ProductRepository::new(service.db.clone());
        let zones = DeliveryZoneRepository::new(service.db);
        let pricer = OrderPricer::new(
            products.clone(),
            zones.clone(),
            "http://localhost:3000/files".to_string(),
        );
        TestEnv {
            products,
            zones,
            pricer,
        }
    }

    impl TestEnv {
        async fn product(&self, name: &str, price: i64) -> Product {
            self.products
                .create(ProductCreate {
                    name: name.to_string(),
                    price,
                    category_id: "snacks".to_string(),
                    image_path: format!("{name}.jpg"),
                    is_offer: false,
                    description: "test".to_string(),
                    is_available: true,
                })
                .await
                .expect("product")
        }

        async fn zone(&self, start: i64, end: i64, price: i64) {
            self.zones
                .create(DeliveryZoneCreate {
                    zip_start: start,
                    zip_end: end,
                    price,
                })
                .await
                .expect("zone");
        }
    }

    fn id_of(product: &Product) -> String {
        product.id.as_ref().expect("product id").to_string()
    }

    fn requested(product_id: String, quantity: i64) -> RequestedLine {
        RequestedLine {
            product_id,
            quantity,
            observation: None,
        }
    }

    fn delivery_request(lines: Vec<RequestedLine>, cep: &str) -> OrderRequest {
        OrderRequest {
            lines,
            order_type: OrderType::Delivery,
            address: Some(Address {
                cep: cep.to_string(),
                street: "Rua A".to_string(),
                number: "12".to_string(),
                neighborhood: "Centro".to_string(),
                city: "Campinas".to_string(),
                complement: None,
            }),
            observation: None,
            payment_method: "cash".to_string(),
            payment_id: None,
        }
    }

    fn takeout_request(lines: Vec<RequestedLine>) -> OrderRequest {
        OrderRequest {
            lines,
            order_type: OrderType::Takeout,
            address: None,
            observation: None,
            payment_method: "cash".to_string(),
            payment_id: None,
        }
    }

    #[tokio::test]
    async fn test_total_is_lines_plus_delivery_fee() {
        let env = env().await;
        env.zone(13_000_000, 13_999_999, 300).await;
        let burger = env.product("Burger", 1000).await;
        let soda = env.product("Soda", 500).await;

        let draft = env
            .pricer
            .build_draft(
                "u1",
                "Test User",
                delivery_request(
                    vec![requested(id_of(&burger), 2), requested(id_of(&soda), 1)],
                    "13083-100",
                ),
                42,
            )
            .await
            .unwrap();

        assert_eq!(draft.delivery_fee, 300);
        assert_eq!(draft.total, 1000 * 2 + 500 + 300);
        assert_eq!(draft.line_items.len(), 2);
        assert_eq!(draft.status, OrderStatus::Created);
        assert_eq!(draft.created_at, 42);
    }

    #[tokio::test]
    async fn test_snapshot_carries_catalog_fields() {
        let env = env().await;
        let burger = env.product("Burger", 1000).await;

        let draft = env
            .pricer
            .build_draft(
                "u1",
                "Test User",
                takeout_request(vec![requested(id_of(&burger), 1)]),
                0,
            )
            .await
            .unwrap();

        let item = &draft.line_items[0];
        assert_eq!(item.name, "Burger");
        assert_eq!(item.unit_price, 1000);
        assert_eq!(item.image_url, "http://localhost:3000/files/Burger.jpg");
    }

    #[tokio::test]
    async fn test_takeout_has_zero_fee_and_needs_no_address() {
        let env = env().await;
        let burger = env.product("Burger", 1000).await;

        let draft = env
            .pricer
            .build_draft(
                "u1",
                "Test User",
                takeout_request(vec![requested(id_of(&burger), 1)]),
                0,
            )
            .await
            .unwrap();

        assert_eq!(draft.delivery_fee, 0);
        assert_eq!(draft.total, 1000);
    }

    #[tokio::test]
    async fn test_unknown_product_ids_are_dropped() {
        let env = env().await;
        let burger = env.product("Burger", 1000).await;

        let draft = env
            .pricer
            .build_draft(
                "u1",
                "Test User",
                takeout_request(vec![
                    requested(id_of(&burger), 1),
                    requested("product:does_not_exist".to_string(), 4),
                ]),
                0,
            )
            .await
            .unwrap();

        assert_eq!(draft.line_items.len(), 1);
        assert_eq!(draft.total, 1000);
    }

    #[tokio::test]
    async fn test_order_with_no_resolvable_products_is_rejected() {
        let env = env().await;

        let err = env
            .pricer
            .build_draft(
                "u1",
                "Test User",
                takeout_request(vec![requested("product:ghost".to_string(), 1)]),
                0,
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation { .. }));
    }

    #[tokio::test]
    async fn test_unavailable_products_are_dropped() {
        let env = env().await;
        let burger = env.product("Burger", 1000).await;
        let retired = env.product("Old Special", 900).await;
        env.products.soft_delete(&id_of(&retired)).await.unwrap();

        let draft = env
            .pricer
            .build_draft(
                "u1",
                "Test User",
                takeout_request(vec![
                    requested(id_of(&burger), 1),
                    requested(id_of(&retired), 1),
                ]),
                0,
            )
            .await
            .unwrap();
        assert_eq!(draft.line_items.len(), 1);
    }

    #[tokio::test]
    async fn test_cep_outside_all_zones_is_out_of_service() {
        let env = env().await;
        env.zone(13_000_000, 13_999_999, 300).await;
        let burger = env.product("Burger", 1000).await;

        let err = env
            .pricer
            .build_draft(
                "u1",
                "Test User",
                delivery_request(vec![requested(id_of(&burger), 1)], "99999-999"),
                0,
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::OutOfServiceArea));
    }

    #[tokio::test]
    async fn test_request_problems_are_collected_together() {
        let env = env().await;

        let err = env
            .pricer
            .build_draft(
                "u1",
                "Test User",
                OrderRequest {
                    lines: Vec::new(),
                    order_type: OrderType::Delivery,
                    address: None,
                    observation: None,
                    payment_method: "card".to_string(),
                    payment_id: None,
                },
                0,
            )
            .await
            .unwrap_err();

        match err {
            AppError::Validation { details, .. } => {
                let details = details.expect("details");
                assert_eq!(details.len(), 3);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_cep_digits_are_stripped_before_lookup() {
        let env = env().await;
        env.zone(13_083_000, 13_083_999, 450).await;

        let fee = env.pricer.delivery_fee_for_cep("13.083-100").await.unwrap();
        assert_eq!(fee, 450);
    }
}
