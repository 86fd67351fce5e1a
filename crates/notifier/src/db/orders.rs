//! Order queries: due-order selection and reminder flag updates.
//!
//! Each window owns its own pair of columns, so every statement exists once
//! per window and is picked with a `match`. Column names are never spliced in
//! at runtime.

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::PgPool;

use order_reminders_core::{OrderId, ReminderWindow};

use super::RepositoryError;
use crate::models::DueOrder;

macro_rules! due_orders_sql {
    ($flag:literal) => {
        concat!(
            r"
        SELECT
            o.id, o.user_id, o.order_number, o.scheduled_date, o.scheduled_time,
            o.status, u.username, u.email
        FROM orders o
        JOIN users u ON u.id = o.user_id
        WHERE o.scheduled_date = $1
          AND (o.",
            $flag,
            r" IS NULL OR o.",
            $flag,
            r" = FALSE)
          AND COALESCE(o.is_deleted, FALSE) = FALSE
          AND o.status IN ('pending', 'processing')
        ORDER BY o.scheduled_time ASC, o.id ASC
        "
        )
    };
}

macro_rules! mark_sent_sql {
    ($flag:literal) => {
        concat!(
            "UPDATE orders SET ",
            $flag,
            " = TRUE, ",
            $flag,
            "_at = $2 WHERE id = $1"
        )
    };
}

const DUE_MORNING: &str = due_orders_sql!("notification_1_sent");
const DUE_AFTERNOON: &str = due_orders_sql!("notification_2_sent");
const DUE_EVENING: &str = due_orders_sql!("notification_3_sent");

const MARK_MORNING: &str = mark_sent_sql!("notification_1_sent");
const MARK_AFTERNOON: &str = mark_sent_sql!("notification_2_sent");
const MARK_EVENING: &str = mark_sent_sql!("notification_3_sent");

const fn due_orders_statement(window: ReminderWindow) -> &'static str {
    match window {
        ReminderWindow::Morning => DUE_MORNING,
        ReminderWindow::Afternoon => DUE_AFTERNOON,
        ReminderWindow::Evening => DUE_EVENING,
    }
}

const fn mark_sent_statement(window: ReminderWindow) -> &'static str {
    match window {
        ReminderWindow::Morning => MARK_MORNING,
        ReminderWindow::Afternoon => MARK_AFTERNOON,
        ReminderWindow::Evening => MARK_EVENING,
    }
}

/// Get orders scheduled on `due_date` that still need the `window` reminder.
///
/// Only non-deleted orders in an actionable status are returned, earliest
/// scheduled time first.
///
/// # Errors
///
/// Returns error if the database query fails.
pub async fn get_due_orders(
    pool: &PgPool,
    window: ReminderWindow,
    due_date: NaiveDate,
) -> Result<Vec<DueOrder>, RepositoryError> {
    let orders = sqlx::query_as::<_, DueOrder>(due_orders_statement(window))
        .bind(due_date)
        .fetch_all(pool)
        .await?;

    Ok(orders)
}

/// Set the `window` reminder flag and its timestamp.
///
/// # Errors
///
/// Returns `RepositoryError::NotFound` if the order does not exist, or a
/// database error if the update fails.
pub async fn mark_reminder_sent(
    pool: &PgPool,
    order_id: OrderId,
    window: ReminderWindow,
    sent_at: DateTime<Utc>,
) -> Result<(), RepositoryError> {
    let result = sqlx::query(mark_sent_statement(window))
        .bind(order_id)
        .bind(sent_at)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(RepositoryError::NotFound);
    }

    Ok(())
}
