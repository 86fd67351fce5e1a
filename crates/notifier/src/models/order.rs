//! Order domain models.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use order_reminders_core::{OrderId, OrderStatus, ReminderWindow, UserId};

/// A customer of the ordering system. Read-only here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub email: String,
}

/// Per-window reminder state on an order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReminderFlag {
    /// `None` when the column is NULL (never written).
    pub sent: Option<bool>,
    pub sent_at: Option<DateTime<Utc>>,
}

impl ReminderFlag {
    /// Whether the window's reminder has already gone out.
    #[must_use]
    pub fn is_sent(&self) -> bool {
        self.sent.unwrap_or(false)
    }
}

/// An order with its three reminder flags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub user_id: UserId,
    pub order_number: String,
    pub scheduled_date: NaiveDate,
    pub scheduled_time: NaiveTime,
    pub status: OrderStatus,
    pub is_deleted: bool,
    /// Flags indexed by window: morning, afternoon, evening.
    pub reminders: [ReminderFlag; 3],
}

impl Order {
    /// Reminder state for `window`.
    #[must_use]
    pub fn reminder(&self, window: ReminderWindow) -> &ReminderFlag {
        match window {
            ReminderWindow::Morning => &self.reminders[0],
            ReminderWindow::Afternoon => &self.reminders[1],
            ReminderWindow::Evening => &self.reminders[2],
        }
    }

    /// Mutable reminder state for `window`.
    pub fn reminder_mut(&mut self, window: ReminderWindow) -> &mut ReminderFlag {
        match window {
            ReminderWindow::Morning => &mut self.reminders[0],
            ReminderWindow::Afternoon => &mut self.reminders[1],
            ReminderWindow::Evening => &mut self.reminders[2],
        }
    }

    /// Whether this order should receive the `window` reminder for `due_date`.
    #[must_use]
    pub fn is_due(&self, window: ReminderWindow, due_date: NaiveDate) -> bool {
        self.scheduled_date == due_date
            && !self.is_deleted
            && self.status.is_actionable()
            && !self.reminder(window).is_sent()
    }
}

/// An order selected for a reminder, joined with its owner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct DueOrder {
    pub id: OrderId,
    pub user_id: UserId,
    pub order_number: String,
    pub scheduled_date: NaiveDate,
    pub scheduled_time: NaiveTime,
    pub status: OrderStatus,
    pub username: String,
    pub email: String,
}

impl DueOrder {
    /// Project an order and its owner into a selection row.
    #[must_use]
    pub fn from_parts(order: &Order, user: &User) -> Self {
        Self {
            id: order.id,
            user_id: order.user_id,
            order_number: order.order_number.clone(),
            scheduled_date: order.scheduled_date,
            scheduled_time: order.scheduled_time,
            status: order.status,
            username: user.username.clone(),
            email: user.email.clone(),
        }
    }
}
