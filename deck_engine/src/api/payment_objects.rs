use chrono::{DateTime, Duration, Utc};
use deck_common::Rupiah;
use serde::{Deserialize, Serialize};

use crate::db_types::{Order, OrderNumber, PaymentStatus};

pub const STATUS_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Body of a request for a new payment session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentRequest {
    pub order_number: OrderNumber,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionItem {
    pub id: String,
    pub name: String,
    pub price: Rupiah,
    pub quantity: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionCustomer {
    pub name: String,
    pub phone: String,
}

/// Everything a payment gateway needs to open a hosted checkout for one order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentSessionRequest {
    /// The gateway-side order id. Always the order number.
    pub order_number: OrderNumber,
    pub gross_amount: Rupiah,
    pub items: Vec<SessionItem>,
    pub customer: SessionCustomer,
    pub expiry_minutes: i64,
}

impl PaymentSessionRequest {
    pub fn for_order(order: &Order, expiry: Duration) -> Self {
        let items = order
            .lines
            .iter()
            .map(|l| SessionItem {
                id: l.product_id.to_string(),
                name: l.product_name.clone(),
                price: l.price,
                quantity: l.quantity,
            })
            .collect();
        Self {
            order_number: order.order_number.clone(),
            gross_amount: order.total_amount,
            items,
            customer: SessionCustomer { name: order.buyer_name.clone(), phone: order.phone.clone() },
            expiry_minutes: expiry.num_minutes(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentSession {
    pub token: String,
    pub redirect_url: String,
}

/// A payment status callback, already decoded from the gateway's wire format.
///
/// `gross_amount` is kept verbatim, since it feeds the signature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatewayNotification {
    pub order_id: String,
    pub status_code: String,
    pub gross_amount: String,
    pub signature_key: String,
    pub transaction_status: String,
    #[serde(default)]
    pub payment_type: Option<String>,
}

/// The gateway's transaction status vocabulary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewayTransactionStatus {
    Capture,
    Settlement,
    Pending,
    Deny,
    Cancel,
    Expire,
    Failure,
    Unrecognised(String),
}

impl GatewayTransactionStatus {
    pub fn parse(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "capture" => Self::Capture,
            "settlement" => Self::Settlement,
            "pending" => Self::Pending,
            "deny" => Self::Deny,
            "cancel" => Self::Cancel,
            "expire" => Self::Expire,
            "failure" => Self::Failure,
            _ => Self::Unrecognised(s.to_string()),
        }
    }

    /// The payment status an order moves to when this status is reported, or `None` if the report should be ignored.
    pub fn payment_status(&self) -> Option<PaymentStatus> {
        match self {
            Self::Capture | Self::Settlement => Some(PaymentStatus::Paid),
            Self::Pending => Some(PaymentStatus::Pending),
            Self::Deny | Self::Cancel => Some(PaymentStatus::Cancelled),
            Self::Expire => Some(PaymentStatus::Expired),
            Self::Failure => Some(PaymentStatus::Failed),
            Self::Unrecognised(_) => None,
        }
    }
}

/// Returned to the gateway once a callback has been processed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallbackAck {
    pub order_number: OrderNumber,
    pub payment_status: PaymentStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentStatusSnapshot {
    pub order_number: OrderNumber,
    pub payment_status: PaymentStatus,
    pub payment_method: String,
    pub paid_at: Option<String>,
    pub expired_at: Option<String>,
}

impl From<&Order> for PaymentStatusSnapshot {
    fn from(order: &Order) -> Self {
        Self {
            order_number: order.order_number.clone(),
            payment_status: order.payment_status,
            payment_method: order.payment_method.clone(),
            paid_at: order.paid_at.map(format_timestamp),
            expired_at: order.expires_at.map(format_timestamp),
        }
    }
}

fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.format(STATUS_TIMESTAMP_FORMAT).to_string()
}
