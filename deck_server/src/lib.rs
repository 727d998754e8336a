//! # Deck server
//! The REST face of the Deck ordering backend. It is responsible for:
//! * Accepting orders from buyers and pricing them against the catalog.
//! * Opening Midtrans Snap payment sessions for those orders.
//! * Receiving Midtrans payment notifications and updating the order's payment status.
//! * Serving the catalog, order lookups and admin notifications.
//!
//! ## Configuration
//! The server is configured via environment variables. See [config](config/index.html) for more information.
//!
//! ## Routes
//! * `/health`: A health check route that returns a 200 OK response.
//! * `/api/transactions`, `/api/payments`, `/api/products`, `/api/categories`, `/api/notifications`: see
//!   [routes](routes/index.html). Admin routes expect an HS256 bearer token.
pub mod cli;
pub mod config;
pub mod data_objects;
pub mod errors;
pub mod integrations;
pub mod middleware;
pub mod routes;
pub mod server;
