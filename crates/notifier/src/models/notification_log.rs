//! Notification audit log models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use order_reminders_core::{DeliveryStatus, NotificationLogId, OrderId, ReminderWindow, UserId};

/// Type tag stored on every reminder log row.
pub const REMINDER_NOTIFICATION_TYPE: &str = "order_reminder";

/// A log row to append.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewNotificationLog {
    pub user_id: UserId,
    pub order_id: OrderId,
    pub notification_type: String,
    pub reminder_window: Option<ReminderWindow>,
    pub message: String,
    pub status: DeliveryStatus,
}

impl NewNotificationLog {
    /// A reminder log row for one order in one window.
    #[must_use]
    pub fn reminder(
        user_id: UserId,
        order_id: OrderId,
        window: ReminderWindow,
        message: impl Into<String>,
        status: DeliveryStatus,
    ) -> Self {
        Self {
            user_id,
            order_id,
            notification_type: REMINDER_NOTIFICATION_TYPE.to_string(),
            reminder_window: Some(window),
            message: message.into(),
            status,
        }
    }
}

/// A stored log row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct NotificationLog {
    pub id: NotificationLogId,
    pub user_id: UserId,
    pub order_id: OrderId,
    pub notification_type: String,
    /// Window number (1-3), `NULL` for non-window notifications.
    pub reminder_window: Option<i16>,
    pub message: String,
    pub status: DeliveryStatus,
    pub created_at: DateTime<Utc>,
}

impl NotificationLog {
    /// The window this row belongs to, if any.
    #[must_use]
    pub fn window(&self) -> Option<ReminderWindow> {
        self.reminder_window.and_then(ReminderWindow::from_number)
    }
}
