//! Persistence boundary of the notifier.
//!
//! [`ReminderStore`] is everything a run needs from the relational store.
//! [`PgReminderStore`] backs it with `PostgreSQL`; [`MemoryStore`] keeps the
//! same semantics in process for tests and local dry runs.

mod memory;
mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgReminderStore;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};

use order_reminders_core::{OrderId, ReminderWindow, SubscriptionId, UserId};

use crate::db::RepositoryError;
use crate::models::{DueOrder, NewNotificationLog, NotificationLog, PushSubscription};

/// Storage operations used by a reminder run.
///
/// Implementations must be shareable across tasks; each call stands alone and
/// no transaction spans two calls.
#[async_trait]
pub trait ReminderStore: Send + Sync {
    /// Orders on `due_date` still owed the `window` reminder, earliest first,
    /// each at most once.
    async fn due_orders(
        &self,
        window: ReminderWindow,
        due_date: NaiveDate,
    ) -> Result<Vec<DueOrder>, RepositoryError>;

    /// Subscriptions registered by `user_id`.
    async fn subscriptions_for_user(
        &self,
        user_id: UserId,
    ) -> Result<Vec<PushSubscription>, RepositoryError>;

    /// Remove one subscription. Returns `true` if it existed.
    async fn delete_subscription(&self, id: SubscriptionId) -> Result<bool, RepositoryError>;

    /// Remove subscriptions with the given endpoint. Returns the count removed.
    async fn delete_subscription_by_endpoint(&self, endpoint: &str)
    -> Result<u64, RepositoryError>;

    /// Set the `window` reminder flag of an order.
    async fn mark_sent(
        &self,
        order_id: OrderId,
        window: ReminderWindow,
        sent_at: DateTime<Utc>,
    ) -> Result<(), RepositoryError>;

    /// Append one audit row.
    async fn log_notification(&self, entry: &NewNotificationLog) -> Result<(), RepositoryError>;

    /// Audit rows for an order, newest first.
    async fn notification_history(
        &self,
        order_id: OrderId,
    ) -> Result<Vec<NotificationLog>, RepositoryError>;
}
