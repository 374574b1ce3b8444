//! Database Models

// Serde helpers
pub mod serde_helpers;

// Catalog
pub mod category;
pub mod delivery_zone;
pub mod expense;
pub mod product;

// Orders
pub mod order;

// Re-exports
pub use category::{Category, CategoryCreate, CategoryUpdate};
pub use delivery_zone::{DeliveryZone, DeliveryZoneCreate};
pub use expense::{Expense, ExpenseCreate};
pub use order::{Address, LineItem, Order, OrderMessage, OrderStatus, OrderType};
pub use product::{Product, ProductCreate, ProductSnapshotRow, ProductUpdate, ProductView};
