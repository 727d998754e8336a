use thiserror::Error;

use crate::db_types::{FieldErrors, OrderNumber, PaymentStatus};

/// Broad classes of failure. Callers at the HTTP boundary pick a status code by kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    NotFound,
    Conflict,
    Upstream,
    Persistence,
    Security,
}

#[derive(Debug, Clone, Error)]
pub enum OrderFlowError {
    #[error("Invalid request. {0}")]
    Validation(FieldErrors),
    #[error("Product not found or not available: {0}")]
    ProductUnavailable(i64),
    #[error("Order {0} does not exist")]
    OrderNotFound(OrderNumber),
    #[error("Order with id {0} does not exist")]
    OrderIdNotFound(i64),
    #[error("Transaction {0} is already paid")]
    AlreadyPaid(OrderNumber),
    #[error("Cannot change the payment status of {order_number} from {from} to {to}")]
    ForbiddenStatusChange { order_number: OrderNumber, from: PaymentStatus, to: PaymentStatus },
    #[error("Order {order_number} is no longer {expected}. It was changed by another request.")]
    StatusChanged { order_number: OrderNumber, expected: PaymentStatus },
    #[error("Payment gateway error. {0}")]
    GatewayError(String),
    #[error("A payment session for {order_number} was created, but could not be saved. {message}")]
    PersistenceAfterExternalSideEffect { order_number: OrderNumber, message: String },
    #[error("Could not save changes to the order. {0}")]
    PersistenceError(String),
    #[error("Invalid signature")]
    InvalidSignature,
    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl OrderFlowError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) => ErrorKind::Validation,
            Self::ProductUnavailable(_) | Self::OrderNotFound(_) | Self::OrderIdNotFound(_) => ErrorKind::NotFound,
            Self::AlreadyPaid(_) | Self::ForbiddenStatusChange { .. } | Self::StatusChanged { .. } => {
                ErrorKind::Conflict
            },
            Self::GatewayError(_) => ErrorKind::Upstream,
            Self::PersistenceAfterExternalSideEffect { .. } | Self::PersistenceError(_) | Self::DatabaseError(_) => {
                ErrorKind::Persistence
            },
            Self::InvalidSignature => ErrorKind::Security,
        }
    }
}

impl From<sqlx::Error> for OrderFlowError {
    fn from(e: sqlx::Error) -> Self {
        Self::DatabaseError(e.to_string())
    }
}

impl From<FieldErrors> for OrderFlowError {
    fn from(e: FieldErrors) -> Self {
        Self::Validation(e)
    }
}

#[derive(Debug, Clone, Error)]
pub enum CatalogError {
    #[error("Product {0} does not exist")]
    ProductNotFound(i64),
    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl CatalogError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::ProductNotFound(_) => ErrorKind::NotFound,
            Self::DatabaseError(_) => ErrorKind::Persistence,
        }
    }
}

impl From<sqlx::Error> for CatalogError {
    fn from(e: sqlx::Error) -> Self {
        Self::DatabaseError(e.to_string())
    }
}

#[derive(Debug, Clone, Error)]
pub enum NotificationError {
    #[error("Notification {0} does not exist")]
    NotificationNotFound(i64),
    #[error("Could not encode notification data. {0}")]
    InvalidData(String),
    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl NotificationError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotificationNotFound(_) => ErrorKind::NotFound,
            Self::InvalidData(_) => ErrorKind::Validation,
            Self::DatabaseError(_) => ErrorKind::Persistence,
        }
    }
}

impl From<sqlx::Error> for NotificationError {
    fn from(e: sqlx::Error) -> Self {
        Self::DatabaseError(e.to_string())
    }
}

/// The payment gateway could not create a session. Carries the upstream message.
#[derive(Debug, Clone, Error)]
#[error("{0}")]
pub struct GatewayError(pub String);

impl From<GatewayError> for OrderFlowError {
    fn from(e: GatewayError) -> Self {
        Self::GatewayError(e.0)
    }
}
