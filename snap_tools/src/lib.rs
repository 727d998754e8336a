//! Client side tooling for the Midtrans Snap hosted checkout.
//!
//! [`SnapApi`] creates checkout sessions. The data objects in this crate also describe the HTTP notifications that
//! Midtrans posts back once a payment changes state, so that servers can deserialize them without re-declaring the
//! wire format.
mod api;
mod config;
mod data_objects;
mod error;

pub use api::SnapApi;
pub use config::{SnapConfig, PRODUCTION_BASE_URL, SANDBOX_BASE_URL};
pub use data_objects::{
    CustomerDetails,
    ExpiryDetails,
    ExpiryUnit,
    ItemDetails,
    SnapNotification,
    SnapRequest,
    SnapResponse,
    TransactionDetails,
};
pub use error::SnapApiError;
