use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::db_types::PaymentStatus;

/// Criteria for the admin order listing. Empty fields do not constrain the search.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderQueryFilter {
    #[serde(default, alias = "status")]
    pub payment_status: Option<PaymentStatus>,
    /// Case-insensitive substring match on the buyer's name
    #[serde(default)]
    pub buyer_name: Option<String>,
    /// Only orders created at or after this time
    #[serde(default)]
    pub since: Option<DateTime<Utc>>,
}

impl OrderQueryFilter {
    pub fn with_payment_status(mut self, status: PaymentStatus) -> Self {
        self.payment_status = Some(status);
        self
    }

    pub fn with_buyer_name<S: Into<String>>(mut self, name: S) -> Self {
        self.buyer_name = Some(name.into());
        self
    }

    pub fn since(mut self, since: DateTime<Utc>) -> Self {
        self.since = Some(since);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.payment_status.is_none() && self.buyer_name.is_none() && self.since.is_none()
    }
}

/// Body of the admin status override request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusUpdateRequest {
    pub payment_status: PaymentStatus,
}
