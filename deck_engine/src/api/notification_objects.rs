use serde::{Deserialize, Serialize};

use crate::db_types::Notification;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationList {
    pub total: usize,
    pub notifications: Vec<Notification>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnreadCount {
    pub count: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkedAsRead {
    pub updated: u64,
}

/// Notification type tags
pub const NEW_ORDER_NOTIFICATION: &str = "new_order";
pub const PAYMENT_RECEIVED_NOTIFICATION: &str = "payment_received";
