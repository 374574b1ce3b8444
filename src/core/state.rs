//! Server state
//!
//! One cloneable struct holding every shared service: configuration, the
//! repositories over the embedded datastore, the order lifecycle engine and
//! pricer, the event bus and the external collaborators. Cloning is shallow.

use std::sync::Arc;

use crate::auth::JwtService;
use crate::core::Config;
use crate::db::DbService;
use crate::db::repository::{
    CategoryRepository, DeliveryZoneRepository, ExpenseRepository, OrderRepository,
    ProductRepository,
};
use crate::events::EventBus;
use crate::orders::{OrderLifecycle, OrderPricer};
use crate::services::{ImageStore, PaymentClient};

#[derive(Clone)]
pub struct ServerState {
    config: Arc<Config>,
    jwt: Arc<JwtService>,
    products: ProductRepository,
    categories: CategoryRepository,
    zones: DeliveryZoneRepository,
    expenses: ExpenseRepository,
    orders: OrderRepository,
    lifecycle: Arc<OrderLifecycle>,
    pricer: Arc<OrderPricer>,
    payments: PaymentClient,
    images: ImageStore,
    bus: EventBus,
}

impl ServerState {
    /// Open the datastore under the configured working directory and wire up
    /// every service.
    pub async fn initialize(config: Config) -> anyhow::Result<Self> {
        let db_path = config.db_path();
        std::fs::create_dir_all(&db_path)?;
        let service = DbService::new(&db_path.to_string_lossy()).await?;
        Self::from_db(config, service)
    }

    /// Build the state around an already-open datastore
    pub fn from_db(config: Config, service: DbService) -> anyhow::Result<Self> {
        let timeout = config.store_timeout();
        let db = service.db;

        let products = ProductRepository::with_timeout(db.clone(), timeout);
        let categories = CategoryRepository::with_timeout(db.clone(), timeout);
        let zones = DeliveryZoneRepository::with_timeout(db.clone(), timeout);
        let expenses = ExpenseRepository::with_timeout(db.clone(), timeout);
        let orders = OrderRepository::with_timeout(db, timeout);

        let bus = EventBus::new();
        let lifecycle = Arc::new(OrderLifecycle::new(
            orders.clone(),
            products.clone(),
            Arc::new(bus.clone()),
        ));
        let pricer = Arc::new(OrderPricer::new(
            products.clone(),
            zones.clone(),
            config.files_base_url(),
        ));

        let payments = PaymentClient::new(config.payment.clone());
        let images = ImageStore::new(config.upload_dir())?;
        let jwt = Arc::new(JwtService::new(config.jwt.clone()));

        Ok(Self {
            config: Arc::new(config),
            jwt,
            products,
            categories,
            zones,
            expenses,
            orders,
            lifecycle,
            pricer,
            payments,
            images,
            bus,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn jwt_service(&self) -> &JwtService {
        &self.jwt
    }

    pub fn products(&self) -> &ProductRepository {
        &self.products
    }

    pub fn categories(&self) -> &CategoryRepository {
        &self.categories
    }

    pub fn zones(&self) -> &DeliveryZoneRepository {
        &self.zones
    }

    pub fn expenses(&self) -> &ExpenseRepository {
        &self.expenses
    }

    pub fn orders(&self) -> &OrderRepository {
        &self.orders
    }

    pub fn lifecycle(&self) -> &Arc<OrderLifecycle> {
        &self.lifecycle
    }

    pub fn pricer(&self) -> &OrderPricer {
        &self.pricer
    }

    pub fn payments(&self) -> &PaymentClient {
        &self.payments
    }

    pub fn images(&self) -> &ImageStore {
        &self.images
    }

    pub fn bus(&self) -> &EventBus {
        &self.bus
    }
}
