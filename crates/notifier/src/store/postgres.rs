//! `PostgreSQL` implementation of [`ReminderStore`].

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::PgPool;

use order_reminders_core::{OrderId, ReminderWindow, SubscriptionId, UserId};

use super::ReminderStore;
use crate::db::{self, RepositoryError};
use crate::models::{DueOrder, NewNotificationLog, NotificationLog, PushSubscription};

/// Reminder store backed by a `PgPool`.
#[derive(Clone)]
pub struct PgReminderStore {
    pool: PgPool,
}

impl PgReminderStore {
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[must_use]
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl ReminderStore for PgReminderStore {
    async fn due_orders(
        &self,
        window: ReminderWindow,
        due_date: NaiveDate,
    ) -> Result<Vec<DueOrder>, RepositoryError> {
        db::orders::get_due_orders(&self.pool, window, due_date).await
    }

    async fn subscriptions_for_user(
        &self,
        user_id: UserId,
    ) -> Result<Vec<PushSubscription>, RepositoryError> {
        db::subscriptions::get_subscriptions_for_user(&self.pool, user_id).await
    }

    async fn delete_subscription(&self, id: SubscriptionId) -> Result<bool, RepositoryError> {
        db::subscriptions::delete_subscription(&self.pool, id).await
    }

    async fn delete_subscription_by_endpoint(
        &self,
        endpoint: &str,
    ) -> Result<u64, RepositoryError> {
        db::subscriptions::delete_subscription_by_endpoint(&self.pool, endpoint).await
    }

    async fn mark_sent(
        &self,
        order_id: OrderId,
        window: ReminderWindow,
        sent_at: DateTime<Utc>,
    ) -> Result<(), RepositoryError> {
        db::orders::mark_reminder_sent(&self.pool, order_id, window, sent_at).await
    }

    async fn log_notification(&self, entry: &NewNotificationLog) -> Result<(), RepositoryError> {
        db::notification_logs::insert_notification_log(&self.pool, entry).await?;
        Ok(())
    }

    async fn notification_history(
        &self,
        order_id: OrderId,
    ) -> Result<Vec<NotificationLog>, RepositoryError> {
        db::notification_logs::get_logs_for_order(&self.pool, order_id).await
    }
}
