//! The public face of the engine.
//!
//! Each API struct wraps a backend that implements the relevant [`crate::traits`] and adds the business rules on top:
//! validation, state checks, gateway calls and event publication.
pub mod catalog_api;
pub mod catalog_objects;
pub mod errors;
pub mod notification_api;
pub mod notification_objects;
pub mod order_flow_api;
pub mod order_objects;
pub mod payment_api;
pub mod payment_objects;
