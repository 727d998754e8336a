//! Deck Engine
//!
//! The provider-agnostic core of the Deck ordering backend. It takes an order from a buyer's basket to a settled
//! payment:
//! 1. The order builder ([`mod@order_builder`]) prices a basket against the catalog and the backend stores the order and
//!    its lines in one transaction.
//! 2. [`PaymentApi`] asks a [`PaymentGateway`] for a hosted checkout session, and later reconciles the gateway's signed
//!    status callbacks against the order.
//! 3. [`OrderFlowApi`], [`CatalogApi`] and [`NotificationApi`] provide the read side and admin actions.
//!
//! Storage is abstracted behind the traits in [`mod@traits`]. A SQLite implementation ships with the crate.
//!
//! Order creation and payment emit events ([`mod@events`]) that hooks can subscribe to. The server uses these to
//! raise admin notifications without slowing down the request that triggered them.
mod db;

pub mod api;
pub mod db_types;
pub mod events;
pub mod helpers;
pub mod order_builder;
pub mod traits;

#[cfg(any(feature = "test_utils", test))]
pub mod test_utils;


pub use api::{
    catalog_api::CatalogApi,
    errors::{CatalogError, ErrorKind, GatewayError, NotificationError, OrderFlowError},
    notification_api::NotificationApi,
    order_flow_api::OrderFlowApi,
    payment_api::PaymentApi,
};
#[cfg(feature = "sqlite")]
pub use db::sqlite::SqliteDatabase;
pub use traits::{CatalogManagement, NotificationManagement, OrderManagement, PaymentGateway};
