//! Storage and gateway seams.
//!
//! The APIs in [`crate::api`] are generic over these traits, so any backend (the bundled SQLite implementation, or a
//! test double) can be slotted in.
mod catalog_management;
mod notification_management;
mod order_management;
mod payment_gateway;

pub use catalog_management::CatalogManagement;
pub use notification_management::NotificationManagement;
pub use order_management::OrderManagement;
pub use payment_gateway::PaymentGateway;
