//! External collaborators: the payment provider and on-disk image storage.

pub mod image_store;
pub mod payment;

pub use image_store::ImageStore;
pub use payment::{PaymentClient, PaymentConfig};
