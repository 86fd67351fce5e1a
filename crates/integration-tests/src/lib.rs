//! End-to-end tests for reminder runs.
//!
//! Runs go through the real orchestrator, dispatcher and recorder, backed by
//! [`MemoryStore`] and a [`ScriptedTransport`] whose answer is chosen per
//! endpoint. The clock is pinned to 2026-10-17 in UTC, so "tomorrow" is
//! always [`due_date`].
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p order-reminders-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `reminder_runs` - Window selection, idempotence and per-window flags
//! - `delivery_failures` - Transient, permanent and store failures
//! - `gateway_delivery` - Runs through the HTTP relay transport

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};

use order_reminders_core::{OrderId, OrderStatus, SubscriptionId, UserId};
use order_reminders_notifier::models::{Order, ReminderFlag, User};
use order_reminders_notifier::push::{DeliveryReport, PushError, PushTarget};
use order_reminders_notifier::services::FixedClock;
use order_reminders_notifier::{MemoryStore, NotificationOrchestrator, PushTransport};

/// The day every run happens on.
#[must_use]
pub fn run_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, 17).expect("valid date")
}

/// The day after [`run_date`]; orders on it are due.
#[must_use]
pub fn due_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, 18).expect("valid date")
}

/// Instant of a run at `hour`:05 UTC on [`run_date`].
#[must_use]
pub fn run_instant(hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 10, 17, hour, 5, 0)
        .single()
        .expect("valid instant")
}

/// What the transport answers for an endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Deliver,
    /// 410 Gone.
    Expire,
    /// Non-2xx status other than 404/410.
    Reject(u16),
    /// Transport error, nothing reached the push service.
    Unreachable,
}

/// One message handed to the transport.
#[derive(Debug, Clone)]
pub struct SentMessage {
    pub endpoint: String,
    pub payload: serde_json::Value,
}

/// Transport answering per endpoint; unscripted endpoints are delivered.
#[derive(Default)]
pub struct ScriptedTransport {
    verdicts: Mutex<HashMap<String, Verdict>>,
    sent: Mutex<Vec<SentMessage>>,
}

impl ScriptedTransport {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn script(&self, endpoint: &str, verdict: Verdict) {
        lock(&self.verdicts).insert(endpoint.to_string(), verdict);
    }

    /// Every message received so far, in order.
    #[must_use]
    pub fn messages(&self) -> Vec<SentMessage> {
        lock(&self.sent).clone()
    }

    #[must_use]
    pub fn endpoints(&self) -> Vec<String> {
        lock(&self.sent).iter().map(|m| m.endpoint.clone()).collect()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[async_trait]
impl PushTransport for ScriptedTransport {
    async fn deliver(
        &self,
        target: PushTarget<'_>,
        payload: &str,
    ) -> Result<DeliveryReport, PushError> {
        lock(&self.sent).push(SentMessage {
            endpoint: target.endpoint.to_string(),
            payload: serde_json::from_str(payload).unwrap_or(serde_json::Value::Null),
        });

        let verdict = lock(&self.verdicts)
            .get(target.endpoint)
            .copied()
            .unwrap_or(Verdict::Deliver);

        match verdict {
            Verdict::Deliver => Ok(DeliveryReport::Delivered),
            Verdict::Expire => Ok(DeliveryReport::from_status(410, "Gone")),
            Verdict::Reject(status) => Ok(DeliveryReport::from_status(status, "push service error")),
            Verdict::Unreachable => Err(PushError::Unavailable),
        }
    }
}

/// Store and transport shared by one test.
pub struct Fixture {
    pub store: Arc<MemoryStore>,
    pub transport: Arc<ScriptedTransport>,
}

impl Default for Fixture {
    fn default() -> Self {
        Self::new()
    }
}

impl Fixture {
    #[must_use]
    pub fn new() -> Self {
        Self {
            store: Arc::new(MemoryStore::new()),
            transport: Arc::new(ScriptedTransport::new()),
        }
    }

    /// Add a customer.
    pub fn user(&self, id: i32) -> UserId {
        let user_id = UserId::new(id);
        self.store.insert_user(User {
            id: user_id,
            username: format!("customer{id}"),
            email: format!("customer{id}@example.com"),
        });
        user_id
    }

    /// Add a pending order due tomorrow at `hour`:00.
    pub fn order(&self, id: i32, user_id: UserId, hour: u32) -> OrderId {
        self.insert_order(id, user_id, hour, |_| {})
    }

    /// Add an order due tomorrow at `hour`:00, adjusted by `customize`.
    pub fn insert_order(
        &self,
        id: i32,
        user_id: UserId,
        hour: u32,
        customize: impl FnOnce(&mut Order),
    ) -> OrderId {
        let mut order = Order {
            id: OrderId::new(id),
            user_id,
            order_number: format!("ORD-2026-{id:04}"),
            scheduled_date: due_date(),
            scheduled_time: NaiveTime::from_hms_opt(hour, 0, 0).expect("valid time"),
            status: OrderStatus::Pending,
            is_deleted: false,
            reminders: [ReminderFlag::default(); 3],
        };
        customize(&mut order);
        self.store.insert_order(order);
        OrderId::new(id)
    }

    /// Register a device with full key material.
    pub fn subscribe(&self, user_id: UserId, endpoint: &str) -> SubscriptionId {
        self.store.insert_subscription(
            user_id,
            endpoint,
            Some("BNcRdreALRFXTkOOUHK1EtK2wtaz5Ry4YfYCA_0QTpQt"),
            Some("tBHItJI5svbpez7KI4CCXg"),
        )
    }

    /// Orchestrator whose clock reads `hour`:05 UTC on [`run_date`].
    #[must_use]
    pub fn orchestrator_at(&self, hour: u32) -> NotificationOrchestrator {
        NotificationOrchestrator::new(self.store.clone(), self.transport.clone())
            .with_clock(Arc::new(FixedClock(run_instant(hour))))
            .with_base_path("/app")
    }

    #[must_use]
    pub fn order_state(&self, id: OrderId) -> Order {
        self.store.order(id).expect("order exists")
    }
}
