use serde::{Deserialize, Serialize};

/// Body of `POST /transactions`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapRequest {
    pub transaction_details: TransactionDetails,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub item_details: Vec<ItemDetails>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub customer_details: Option<CustomerDetails>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub enabled_payments: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub expiry: Option<ExpiryDetails>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionDetails {
    pub order_id: String,
    pub gross_amount: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemDetails {
    pub id: String,
    pub name: String,
    pub price: i64,
    pub quantity: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerDetails {
    pub first_name: String,
    pub phone: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExpiryUnit {
    Minutes,
    Hours,
    Days,
}

/// Snap counts the expiry from the moment the session is created when no start time is given.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpiryDetails {
    pub unit: ExpiryUnit,
    pub duration: i64,
}

impl ExpiryDetails {
    pub fn minutes(duration: i64) -> Self {
        Self { unit: ExpiryUnit::Minutes, duration }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapResponse {
    pub token: String,
    pub redirect_url: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub(crate) struct SnapErrorResponse {
    #[serde(default)]
    pub error_messages: Vec<String>,
}

/// The HTTP notification Midtrans sends whenever a transaction changes state.
///
/// `gross_amount` is kept as the exact string Midtrans sent (e.g. `"100000.00"`), since the signature is computed over
/// that representation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapNotification {
    pub order_id: String,
    pub status_code: String,
    pub gross_amount: String,
    pub signature_key: String,
    pub transaction_status: String,
    #[serde(default)]
    pub payment_type: Option<String>,
    #[serde(default)]
    pub transaction_id: Option<String>,
    #[serde(default)]
    pub transaction_time: Option<String>,
    #[serde(default)]
    pub fraud_status: Option<String>,
    #[serde(default)]
    pub status_message: Option<String>,
}
