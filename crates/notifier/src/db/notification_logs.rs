//! Notification audit log queries.

use sqlx::PgPool;

use order_reminders_core::{NotificationLogId, OrderId};

use super::RepositoryError;
use crate::models::{NewNotificationLog, NotificationLog};

/// Append a log row.
///
/// # Errors
///
/// Returns error if the database insert fails.
pub async fn insert_notification_log(
    pool: &PgPool,
    entry: &NewNotificationLog,
) -> Result<NotificationLogId, RepositoryError> {
    let id = sqlx::query_scalar::<_, NotificationLogId>(
        r"
        INSERT INTO notification_logs (
            user_id, order_id, notification_type, reminder_window, message, status
        )
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING id
        ",
    )
    .bind(entry.user_id)
    .bind(entry.order_id)
    .bind(&entry.notification_type)
    .bind(entry.reminder_window.map(|w| w.number()))
    .bind(&entry.message)
    .bind(entry.status)
    .fetch_one(pool)
    .await?;

    Ok(id)
}

/// Get the log rows for an order, newest first.
///
/// # Errors
///
/// Returns error if the database query fails.
pub async fn get_logs_for_order(
    pool: &PgPool,
    order_id: OrderId,
) -> Result<Vec<NotificationLog>, RepositoryError> {
    let logs = sqlx::query_as::<_, NotificationLog>(
        r"
        SELECT
            id, user_id, order_id, notification_type, reminder_window,
            message, status, created_at
        FROM notification_logs
        WHERE order_id = $1
        ORDER BY created_at DESC, id DESC
        ",
    )
    .bind(order_id)
    .fetch_all(pool)
    .await?;

    Ok(logs)
}
