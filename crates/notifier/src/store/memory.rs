//! In-process [`ReminderStore`] with the same selection semantics as the
//! `PostgreSQL` queries, plus fault injection for failure-path tests.

use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};

use order_reminders_core::{NotificationLogId, OrderId, ReminderWindow, SubscriptionId, UserId};

use super::ReminderStore;
use crate::db::RepositoryError;
use crate::models::{DueOrder, NewNotificationLog, NotificationLog, Order, PushSubscription, User};

#[derive(Default)]
struct State {
    users: Vec<User>,
    orders: Vec<Order>,
    subscriptions: Vec<PushSubscription>,
    logs: Vec<NotificationLog>,
    next_subscription_id: i32,
    next_log_id: i32,
    failing_users: HashSet<UserId>,
    fail_selection: bool,
    failing_mark_sent: HashSet<OrderId>,
    fail_log_insert: bool,
    due_order_queries: usize,
    mark_sent_calls: Vec<(OrderId, ReminderWindow)>,
}

/// Reminder store held in memory.
#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<State>,
}

fn unavailable() -> RepositoryError {
    RepositoryError::Database(sqlx::Error::PoolTimedOut)
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn insert_user(&self, user: User) {
        self.lock().users.push(user);
    }

    pub fn insert_order(&self, order: Order) {
        self.lock().orders.push(order);
    }

    /// Register a subscription, assigning it the next ID.
    pub fn insert_subscription(
        &self,
        user_id: UserId,
        endpoint: &str,
        p256dh: Option<&str>,
        auth: Option<&str>,
    ) -> SubscriptionId {
        let mut state = self.lock();
        state.next_subscription_id += 1;
        let id = SubscriptionId::new(state.next_subscription_id);
        state.subscriptions.push(PushSubscription {
            id,
            user_id,
            endpoint: endpoint.to_string(),
            p256dh: p256dh.map(str::to_string),
            auth: auth.map(str::to_string),
            created_at: Utc::now(),
        });
        id
    }

    /// Make subscription lookups for `user_id` fail with a store error.
    pub fn fail_subscription_lookup_for(&self, user_id: UserId) {
        self.lock().failing_users.insert(user_id);
    }

    /// Make due-order selection fail with a store error.
    pub fn fail_order_selection(&self) {
        self.lock().fail_selection = true;
    }

    /// Make `mark_sent` for `order_id` fail with a store error.
    pub fn fail_mark_sent_for(&self, order_id: OrderId) {
        self.lock().failing_mark_sent.insert(order_id);
    }

    /// Make every audit log insert fail with a store error.
    pub fn fail_log_insert(&self) {
        self.lock().fail_log_insert = true;
    }

    #[must_use]
    pub fn order(&self, id: OrderId) -> Option<Order> {
        self.lock().orders.iter().find(|o| o.id == id).cloned()
    }

    #[must_use]
    pub fn subscriptions(&self) -> Vec<PushSubscription> {
        self.lock().subscriptions.clone()
    }

    #[must_use]
    pub fn logs(&self) -> Vec<NotificationLog> {
        self.lock().logs.clone()
    }

    /// Number of due-order selections issued so far.
    #[must_use]
    pub fn due_order_queries(&self) -> usize {
        self.lock().due_order_queries
    }

    /// Every `mark_sent` call received, in order.
    #[must_use]
    pub fn mark_sent_calls(&self) -> Vec<(OrderId, ReminderWindow)> {
        self.lock().mark_sent_calls.clone()
    }
}

#[async_trait]
impl ReminderStore for MemoryStore {
    async fn due_orders(
        &self,
        window: ReminderWindow,
        due_date: NaiveDate,
    ) -> Result<Vec<DueOrder>, RepositoryError> {
        let mut state = self.lock();
        state.due_order_queries += 1;
        if state.fail_selection {
            return Err(unavailable());
        }

        let mut seen = HashSet::new();
        let mut due: Vec<DueOrder> = state
            .orders
            .iter()
            .filter(|order| order.is_due(window, due_date))
            .filter(|order| seen.insert(order.id))
            .filter_map(|order| {
                state
                    .users
                    .iter()
                    .find(|u| u.id == order.user_id)
                    .map(|user| DueOrder::from_parts(order, user))
            })
            .collect();
        due.sort_by_key(|o| (o.scheduled_time, o.id.as_i32()));

        Ok(due)
    }

    async fn subscriptions_for_user(
        &self,
        user_id: UserId,
    ) -> Result<Vec<PushSubscription>, RepositoryError> {
        let state = self.lock();
        if state.failing_users.contains(&user_id) {
            return Err(unavailable());
        }

        Ok(state
            .subscriptions
            .iter()
            .filter(|s| s.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn delete_subscription(&self, id: SubscriptionId) -> Result<bool, RepositoryError> {
        let mut state = self.lock();
        let before = state.subscriptions.len();
        state.subscriptions.retain(|s| s.id != id);
        Ok(state.subscriptions.len() < before)
    }

    async fn delete_subscription_by_endpoint(
        &self,
        endpoint: &str,
    ) -> Result<u64, RepositoryError> {
        let mut state = self.lock();
        let before = state.subscriptions.len();
        state.subscriptions.retain(|s| s.endpoint != endpoint);
        Ok((before - state.subscriptions.len()) as u64)
    }

    async fn mark_sent(
        &self,
        order_id: OrderId,
        window: ReminderWindow,
        sent_at: DateTime<Utc>,
    ) -> Result<(), RepositoryError> {
        let mut state = self.lock();
        state.mark_sent_calls.push((order_id, window));
        if state.failing_mark_sent.contains(&order_id) {
            return Err(unavailable());
        }
        let order = state
            .orders
            .iter_mut()
            .find(|o| o.id == order_id)
            .ok_or(RepositoryError::NotFound)?;

        let flag = order.reminder_mut(window);
        flag.sent = Some(true);
        flag.sent_at = Some(sent_at);
        Ok(())
    }

    async fn log_notification(&self, entry: &NewNotificationLog) -> Result<(), RepositoryError> {
        let mut state = self.lock();
        if state.fail_log_insert {
            return Err(unavailable());
        }
        state.next_log_id += 1;
        let id = NotificationLogId::new(state.next_log_id);
        state.logs.push(NotificationLog {
            id,
            user_id: entry.user_id,
            order_id: entry.order_id,
            notification_type: entry.notification_type.clone(),
            reminder_window: entry.reminder_window.map(ReminderWindow::number),
            message: entry.message.clone(),
            status: entry.status,
            created_at: Utc::now(),
        });
        Ok(())
    }

    async fn notification_history(
        &self,
        order_id: OrderId,
    ) -> Result<Vec<NotificationLog>, RepositoryError> {
        Ok(self
            .lock()
            .logs
            .iter()
            .rev()
            .filter(|l| l.order_id == order_id)
            .cloned()
            .collect())
    }
}
