use std::{
    collections::BTreeMap,
    fmt::{Display, Formatter},
    str::FromStr,
};

use chrono::{DateTime, Utc};
pub use deck_common::Rupiah;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use thiserror::Error;

//--------------------------------------     OrderNumber     ---------------------------------------------------------
/// The human-readable order identifier, e.g. `ORD-20240501101500123456`. This is also the order id the payment gateway
/// knows the order by.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Type)]
#[sqlx(transparent)]
#[serde(transparent)]
pub struct OrderNumber(pub String);

pub const ORDER_NUMBER_PREFIX: &str = "ORD-";

impl OrderNumber {
    pub fn new<S: Into<String>>(value: S) -> Self {
        Self(value.into())
    }

    /// `ORD-` followed by the UTC timestamp to microsecond precision.
    pub fn from_timestamp(ts: DateTime<Utc>) -> Self {
        Self(format!("{ORDER_NUMBER_PREFIX}{}", ts.format("%Y%m%d%H%M%S%6f")))
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl Display for OrderNumber {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for OrderNumber {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for OrderNumber {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

//--------------------------------------    PaymentStatus    ---------------------------------------------------------
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum PaymentStatus {
    /// The order has been created and is awaiting payment.
    #[default]
    Pending,
    /// The payment gateway has confirmed the payment.
    Paid,
    Failed,
    /// The payment session lapsed before the buyer paid.
    Expired,
    Cancelled,
}

impl PaymentStatus {
    pub fn is_paid(&self) -> bool {
        matches!(self, Self::Paid)
    }
}

impl Display for PaymentStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Pending => "pending",
            Self::Paid => "paid",
            Self::Failed => "failed",
            Self::Expired => "expired",
            Self::Cancelled => "cancelled",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Error)]
#[error("Invalid payment status: {0}")]
pub struct PaymentStatusParseError(String);

impl FromStr for PaymentStatus {
    type Err = PaymentStatusParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "paid" => Ok(Self::Paid),
            "failed" => Ok(Self::Failed),
            "expired" => Ok(Self::Expired),
            "cancelled" => Ok(Self::Cancelled),
            _ => Err(PaymentStatusParseError(s.to_string())),
        }
    }
}

//--------------------------------------    CategoryType     ---------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum CategoryType {
    Appetizers,
    MainCourse,
    Desserts,
    Snacks,
    Food,
    Pastry,
    Other,
}

impl CategoryType {
    pub const ALL: [CategoryType; 7] = [
        Self::Appetizers,
        Self::MainCourse,
        Self::Desserts,
        Self::Snacks,
        Self::Food,
        Self::Pastry,
        Self::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Appetizers => "appetizers",
            Self::MainCourse => "main_course",
            Self::Desserts => "desserts",
            Self::Snacks => "snacks",
            Self::Food => "food",
            Self::Pastry => "pastry",
            Self::Other => "other",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Appetizers => "Appetizers",
            Self::MainCourse => "Main Course",
            Self::Desserts => "Desserts",
            Self::Snacks => "Snacks",
            Self::Food => "Food",
            Self::Pastry => "Pastry",
            Self::Other => "Other",
        }
    }
}

impl Display for CategoryType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Error)]
#[error("Invalid category: {0}")]
pub struct CategoryParseError(String);

impl FromStr for CategoryType {
    type Err = CategoryParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_ascii_lowercase();
        Self::ALL.into_iter().find(|c| c.as_str() == needle).ok_or_else(|| CategoryParseError(s.to_string()))
    }
}

//--------------------------------------       Product       ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub category: CategoryType,
    pub description: String,
    pub image: String,
    pub price: Rupiah,
    pub is_available: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

//--------------------------------------        Order        ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Order {
    pub id: i64,
    pub order_number: OrderNumber,
    pub buyer_name: String,
    pub phone: String,
    pub notes: Option<String>,
    pub sub_total: Rupiah,
    pub total_amount: Rupiah,
    pub payment_status: PaymentStatus,
    pub payment_method: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gateway_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gateway_order_id: Option<String>,
    pub paid_at: Option<DateTime<Utc>>,
    pub expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[sqlx(skip)]
    #[serde(rename = "transaction_details", default)]
    pub lines: Vec<OrderLine>,
}

impl Order {
    pub fn line_total(&self) -> Rupiah {
        self.lines.iter().map(|l| l.total_price).sum()
    }
}

/// A single line on an order. Name and unit price are copies of the product as it was when the order was placed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct OrderLine {
    pub id: i64,
    pub order_id: i64,
    pub product_id: i64,
    pub product_name: String,
    pub quantity: i64,
    pub price: Rupiah,
    pub total_price: Rupiah,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

pub const DEFAULT_PAYMENT_METHOD: &str = "midtrans";

//--------------------------------------      NewOrder       ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewOrderItem {
    pub product_id: i64,
    pub quantity: i64,
    #[serde(default)]
    pub notes: Option<String>,
}

impl NewOrderItem {
    pub fn new(product_id: i64, quantity: i64) -> Self {
        Self { product_id, quantity, notes: None }
    }

    pub fn with_notes<S: Into<String>>(mut self, notes: S) -> Self {
        self.notes = Some(notes.into());
        self
    }
}

/// An order request as submitted by a buyer. Prices are never part of the request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewOrder {
    pub buyer_name: String,
    pub phone: String,
    #[serde(default)]
    pub notes: Option<String>,
    pub items: Vec<NewOrderItem>,
}

impl NewOrder {
    pub fn new<S1: Into<String>, S2: Into<String>>(buyer_name: S1, phone: S2) -> Self {
        Self { buyer_name: buyer_name.into(), phone: phone.into(), notes: None, items: vec![] }
    }

    pub fn with_item(mut self, item: NewOrderItem) -> Self {
        self.items.push(item);
        self
    }

    pub fn with_notes<S: Into<String>>(mut self, notes: S) -> Self {
        self.notes = Some(notes.into());
        self
    }

    /// Checks the shape of the request. Availability and pricing are checked against the catalog when the order is
    /// built.
    pub fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::default();
        if self.buyer_name.trim().is_empty() {
            errors.insert("buyer_name", "Buyer name is required");
        }
        if self.phone.trim().is_empty() {
            errors.insert("phone", "Phone is required");
        }
        if self.items.is_empty() {
            errors.insert("items", "At least one item is required");
        }
        for (i, item) in self.items.iter().enumerate() {
            if item.product_id < 1 {
                errors.insert(format!("items[{i}].product_id"), "Product id must be a positive number");
            }
            if item.quantity < 1 {
                errors.insert(format!("items[{i}].quantity"), "Quantity must be at least 1");
            }
        }
        errors.into_result()
    }
}

//--------------------------------------     OrderUpdate     ---------------------------------------------------------
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderUpdate {
    pub payment_status: Option<PaymentStatus>,
    pub payment_method: Option<String>,
    pub gateway_token: Option<String>,
    pub gateway_order_id: Option<String>,
    /// Only ever fills an empty `paid_at`. An existing payment time is kept.
    pub paid_at: Option<DateTime<Utc>>,
    pub expires_at: Option<DateTime<Utc>>,
    /// When set, the update only applies if the order still has this payment status. This is a precondition, not a
    /// change.
    pub expected_status: Option<PaymentStatus>,
}

impl OrderUpdate {
    pub fn with_payment_status(mut self, status: PaymentStatus) -> Self {
        self.payment_status = Some(status);
        self
    }

    pub fn with_payment_method<S: Into<String>>(mut self, method: S) -> Self {
        self.payment_method = Some(method.into());
        self
    }

    pub fn with_gateway_session<S1: Into<String>, S2: Into<String>>(mut self, token: S1, gateway_order_id: S2) -> Self {
        self.gateway_token = Some(token.into());
        self.gateway_order_id = Some(gateway_order_id.into());
        self
    }

    pub fn with_paid_at(mut self, paid_at: DateTime<Utc>) -> Self {
        self.paid_at = Some(paid_at);
        self
    }

    pub fn with_expires_at(mut self, expires_at: DateTime<Utc>) -> Self {
        self.expires_at = Some(expires_at);
        self
    }

    pub fn expecting_status(mut self, status: PaymentStatus) -> Self {
        self.expected_status = Some(status);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.payment_status.is_none() &&
            self.payment_method.is_none() &&
            self.gateway_token.is_none() &&
            self.gateway_order_id.is_none() &&
            self.paid_at.is_none() &&
            self.expires_at.is_none()
    }
}

//--------------------------------------     Notification    ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Notification {
    pub id: i64,
    /// `None` means the notification is broadcast to every admin.
    pub recipient: Option<String>,
    #[serde(rename = "type")]
    pub kind: String,
    pub title: String,
    pub message: String,
    /// JSON encoded payload
    pub data: String,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewNotification {
    pub recipient: Option<String>,
    pub kind: String,
    pub title: String,
    pub message: String,
    pub data: String,
}

//--------------------------------------     FieldErrors     ---------------------------------------------------------
/// A field name to message map describing why a request was rejected.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, String>);

impl FieldErrors {
    pub fn single<K: Into<String>, V: Into<String>>(field: K, message: V) -> Self {
        let mut errors = Self::default();
        errors.insert(field, message);
        errors
    }

    pub fn insert<K: Into<String>, V: Into<String>>(&mut self, field: K, message: V) {
        self.0.insert(field.into(), message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn into_result(self) -> Result<(), Self> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl Display for FieldErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let msg = self.0.iter().map(|(k, v)| format!("{k}: {v}")).collect::<Vec<_>>().join(", ");
        f.write_str(&msg)
    }
}
