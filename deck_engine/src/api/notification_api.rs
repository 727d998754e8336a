use std::fmt::Debug;

use log::*;
use serde::Serialize;
use serde_json::json;

use crate::{
    api::{
        errors::NotificationError,
        notification_objects::{
            MarkedAsRead,
            NotificationList,
            UnreadCount,
            NEW_ORDER_NOTIFICATION,
            PAYMENT_RECEIVED_NOTIFICATION,
        },
    },
    db_types::{NewNotification, Notification, Order},
    traits::NotificationManagement,
};

/// Admin notifications: broadcasting, listing and read tracking.
pub struct NotificationApi<B> {
    db: B,
}

impl<B> Debug for NotificationApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "NotificationApi")
    }
}

impl<B> NotificationApi<B> {
    pub fn new(db: B) -> Self {
        Self { db }
    }

    pub fn db(&self) -> &B {
        &self.db
    }
}

impl<B> NotificationApi<B>
where B: NotificationManagement
{
    /// Stores a notification visible to every admin. `data` is serialized to JSON and stored alongside.
    pub async fn broadcast_to_admins<T: Serialize>(
        &self,
        kind: &str,
        title: &str,
        message: &str,
        data: &T,
    ) -> Result<Notification, NotificationError> {
        let data = serde_json::to_string(data).map_err(|e| NotificationError::InvalidData(e.to_string()))?;
        let notification = NewNotification {
            recipient: None,
            kind: kind.to_string(),
            title: title.to_string(),
            message: message.to_string(),
            data,
        };
        let result = self.db.insert_notification(notification).await?;
        debug!("📬️ Broadcast notification #{} ({kind}) to admins", result.id);
        Ok(result)
    }

    /// Tells admins that a new order has arrived.
    pub async fn notify_new_order(&self, order: &Order) -> Result<Notification, NotificationError> {
        let title = "New order";
        let message = format!("{} placed order {} for {}", order.buyer_name, order.order_number, order.total_amount);
        let items = order
            .lines
            .iter()
            .map(|l| json!({ "product_name": l.product_name, "quantity": l.quantity, "total_price": l.total_price }))
            .collect::<Vec<_>>();
        let data = json!({
            "order_number": order.order_number,
            "buyer_name": order.buyer_name,
            "total_amount": order.total_amount,
            "items": items,
        });
        self.broadcast_to_admins(NEW_ORDER_NOTIFICATION, title, &message, &data).await
    }

    /// Tells admins that an order has been paid.
    pub async fn notify_payment_received(&self, order: &Order) -> Result<Notification, NotificationError> {
        let title = "Payment received";
        let message = format!("Order {} has been paid ({})", order.order_number, order.total_amount);
        let data = json!({
            "order_number": order.order_number,
            "buyer_name": order.buyer_name,
            "total_amount": order.total_amount,
            "payment_method": order.payment_method,
        });
        self.broadcast_to_admins(PAYMENT_RECEIVED_NOTIFICATION, title, &message, &data).await
    }

    pub async fn notifications(&self, recipient: &str) -> Result<NotificationList, NotificationError> {
        let notifications = self.db.fetch_notifications(recipient).await?;
        Ok(NotificationList { total: notifications.len(), notifications })
    }

    pub async fn unread_count(&self, recipient: &str) -> Result<UnreadCount, NotificationError> {
        let count = self.db.count_unread(recipient).await?;
        Ok(UnreadCount { count })
    }

    pub async fn mark_as_read(&self, id: i64, recipient: &str) -> Result<(), NotificationError> {
        if self.db.mark_as_read(id, recipient).await? {
            trace!("📬️ Notification #{id} marked as read by {recipient}");
            Ok(())
        } else {
            Err(NotificationError::NotificationNotFound(id))
        }
    }

    pub async fn mark_all_as_read(&self, recipient: &str) -> Result<MarkedAsRead, NotificationError> {
        let updated = self.db.mark_all_as_read(recipient).await?;
        debug!("📬️ {updated} notifications marked as read by {recipient}");
        Ok(MarkedAsRead { updated })
    }
}
