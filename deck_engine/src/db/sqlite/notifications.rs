use chrono::{DateTime, Utc};
use sqlx::SqliteConnection;

use crate::db_types::{NewNotification, Notification};

const NOTIFICATION_COLUMNS: &str = "id, recipient, kind, title, message, data, is_read, created_at, updated_at";

pub async fn insert_notification(
    notification: NewNotification,
    now: DateTime<Utc>,
    conn: &mut SqliteConnection,
) -> Result<Notification, sqlx::Error> {
    let sql = format!(
        "INSERT INTO notifications (recipient, kind, title, message, data, is_read, created_at, updated_at) VALUES ($1, \
         $2, $3, $4, $5, 0, $6, $7) RETURNING {NOTIFICATION_COLUMNS}"
    );
    sqlx::query_as::<_, Notification>(&sql)
        .bind(notification.recipient)
        .bind(notification.kind)
        .bind(notification.title)
        .bind(notification.message)
        .bind(notification.data)
        .bind(now)
        .bind(now)
        .fetch_one(conn)
        .await
}

pub async fn fetch_notifications(
    recipient: &str,
    conn: &mut SqliteConnection,
) -> Result<Vec<Notification>, sqlx::Error> {
    let sql = format!(
        "SELECT {NOTIFICATION_COLUMNS} FROM notifications WHERE recipient = $1 OR recipient IS NULL ORDER BY created_at \
         DESC, id DESC"
    );
    sqlx::query_as::<_, Notification>(&sql).bind(recipient).fetch_all(conn).await
}

pub async fn count_unread(recipient: &str, conn: &mut SqliteConnection) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar("SELECT COUNT(*) FROM notifications WHERE (recipient = $1 OR recipient IS NULL) AND is_read = 0")
        .bind(recipient)
        .fetch_one(conn)
        .await
}

pub async fn mark_as_read(
    id: i64,
    recipient: &str,
    now: DateTime<Utc>,
    conn: &mut SqliteConnection,
) -> Result<u64, sqlx::Error> {
    let res = sqlx::query(
        "UPDATE notifications SET is_read = 1, updated_at = $1 WHERE id = $2 AND (recipient = $3 OR recipient IS NULL)",
    )
    .bind(now)
    .bind(id)
    .bind(recipient)
    .execute(conn)
    .await?;
    Ok(res.rows_affected())
}

pub async fn mark_all_as_read(
    recipient: &str,
    now: DateTime<Utc>,
    conn: &mut SqliteConnection,
) -> Result<u64, sqlx::Error> {
    let res = sqlx::query(
        "UPDATE notifications SET is_read = 1, updated_at = $1 WHERE (recipient = $2 OR recipient IS NULL) AND is_read \
         = 0",
    )
    .bind(now)
    .bind(recipient)
    .execute(conn)
    .await?;
    Ok(res.rows_affected())
}
