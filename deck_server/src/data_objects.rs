use std::fmt::Display;

use chrono::{DateTime, NaiveDate, Utc};
use deck_engine::{
    api::{catalog_objects::ProductQueryFilter, order_objects::OrderQueryFilter},
    db_types::{CategoryType, FieldErrors, PaymentStatus},
};
use serde::{Deserialize, Serialize};

/// The envelope every JSON endpoint answers with.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonResponse<T = serde_json::Value> {
    pub success: bool,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<FieldErrors>,
}

impl JsonResponse {
    pub fn success<S: Display>(message: S) -> Self {
        Self { success: true, message: message.to_string(), data: None, errors: None }
    }

    pub fn failure<S: Display>(message: S) -> Self {
        Self { success: false, message: message.to_string(), data: None, errors: None }
    }
}

impl<T> JsonResponse<T> {
    pub fn with_data<S: Display>(message: S, data: T) -> Self {
        Self { success: true, message: message.to_string(), data: Some(data), errors: None }
    }

    pub fn with_errors(mut self, errors: FieldErrors) -> Self {
        self.errors = Some(errors);
        self
    }
}

/// Query string for the admin order listing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrderSearchParams {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub buyer_name: Option<String>,
    #[serde(default)]
    pub since: Option<String>,
}

/// Query string for the product listing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProductSearchParams {
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub available: Option<String>,
}

impl TryFrom<OrderSearchParams> for OrderQueryFilter {
    type Error = FieldErrors;

    fn try_from(params: OrderSearchParams) -> Result<Self, Self::Error> {
        let mut errors = FieldErrors::default();
        let mut filter = OrderQueryFilter::default();
        if let Some(status) = non_blank(params.status) {
            match status.parse::<PaymentStatus>() {
                Ok(s) => filter = filter.with_payment_status(s),
                Err(e) => errors.insert("status", e.to_string()),
            }
        }
        if let Some(name) = non_blank(params.buyer_name) {
            filter = filter.with_buyer_name(name);
        }
        if let Some(since) = non_blank(params.since) {
            match parse_since(&since) {
                Some(ts) => filter = filter.since(ts),
                None => errors.insert("since", "Expected an RFC 3339 timestamp or a YYYY-MM-DD date"),
            }
        }
        errors.into_result().map(|_| filter)
    }
}

impl TryFrom<ProductSearchParams> for ProductQueryFilter {
    type Error = FieldErrors;

    fn try_from(params: ProductSearchParams) -> Result<Self, Self::Error> {
        let mut errors = FieldErrors::default();
        let mut filter = ProductQueryFilter::default();
        if let Some(category) = non_blank(params.category) {
            match category.parse::<CategoryType>() {
                Ok(c) => filter = filter.with_category(c),
                Err(e) => errors.insert("category", e.to_string()),
            }
        }
        if let Some(name) = non_blank(params.name) {
            filter = filter.with_name(name);
        }
        if let Some(available) = non_blank(params.available) {
            match available.to_ascii_lowercase().as_str() {
                "1" | "true" => filter.available = Some(true),
                "0" | "false" => filter.available = Some(false),
                _ => errors.insert("available", "Expected true or false"),
            }
        }
        errors.into_result().map(|_| filter)
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

fn parse_since(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(s) {
        return Some(ts.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d").ok().and_then(|d| d.and_hms_opt(0, 0, 0)).map(|d| d.and_utc())
}
