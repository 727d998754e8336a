use crate::{
    api::errors::NotificationError,
    db_types::{NewNotification, Notification},
};

/// Storage for admin notifications. A notification with no recipient is visible to every admin.
#[allow(async_fn_in_trait)]
pub trait NotificationManagement {
    async fn insert_notification(&self, notification: NewNotification) -> Result<Notification, NotificationError>;

    /// Notifications addressed to `recipient` or broadcast, newest first.
    async fn fetch_notifications(&self, recipient: &str) -> Result<Vec<Notification>, NotificationError>;

    async fn count_unread(&self, recipient: &str) -> Result<i64, NotificationError>;

    /// Marks a notification visible to `recipient` as read. Returns `false` if there is no such notification.
    async fn mark_as_read(&self, id: i64, recipient: &str) -> Result<bool, NotificationError>;

    /// Marks every unread notification visible to `recipient` as read, returning the number changed.
    async fn mark_all_as_read(&self, recipient: &str) -> Result<u64, NotificationError>;
}
