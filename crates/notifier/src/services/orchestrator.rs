//! One reminder run.
//!
//! A run classifies the local hour, selects tomorrow's orders owed the
//! window's reminder and processes them one by one. Each order ends up either
//! sent (at least one device accepted it, flag set) or failed (flag left
//! unset so a later run in the same window retries it). Once a device has
//! accepted the reminder the order counts as sent, even if recording it
//! fails. Faults on one order never stop the next.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use chrono_tz::Tz;
use serde::Serialize;
use tracing::{debug, error, info, instrument, warn};

use order_reminders_core::{DeliveryStatus, ReminderWindow};

use super::clock::{Clock, LocalMoment, SystemClock};
use super::composer::NotificationComposer;
use super::recorder::DeliveryRecorder;
use super::window::{AlwaysOnWindows, ScheduledWindows, WindowClassifier};
use crate::config::NotifierConfig;
use crate::db::RepositoryError;
use crate::error::NotifierError;
use crate::models::DueOrder;
use crate::push::{Dispatcher, PushTransport};
use crate::store::ReminderStore;

const DEFAULT_DISPATCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Counts reported at the end of a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub processed: usize,
    pub sent: usize,
    pub failed: usize,
    /// Window name, or `none` when the hour fell outside every window.
    pub window: String,
}

impl RunSummary {
    fn empty(window: Option<ReminderWindow>) -> Self {
        Self {
            processed: 0,
            sent: 0,
            failed: 0,
            window: ReminderWindow::label(window).to_string(),
        }
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "window={} processed={} sent={} failed={}",
            self.window, self.processed, self.sent, self.failed
        )
    }
}

/// What a run would do right now, without sending anything.
#[derive(Debug, Clone, Serialize)]
pub struct RunPreview {
    pub window: String,
    pub local_hour: u32,
    pub due_date: NaiveDate,
    pub orders: Vec<DueOrder>,
}

enum OrderOutcome {
    Sent,
    Failed,
}

/// Drives reminder runs.
pub struct NotificationOrchestrator {
    store: Arc<dyn ReminderStore>,
    transport: Arc<dyn PushTransport>,
    classifier: Arc<dyn WindowClassifier>,
    clock: Arc<dyn Clock>,
    timezone: Tz,
    composer: NotificationComposer,
    dispatch_timeout: Duration,
}

impl NotificationOrchestrator {
    /// Orchestrator with the default schedule, UTC, the system clock and
    /// root-relative links.
    #[must_use]
    pub fn new(store: Arc<dyn ReminderStore>, transport: Arc<dyn PushTransport>) -> Self {
        Self {
            store,
            transport,
            classifier: Arc::new(ScheduledWindows::default()),
            clock: Arc::new(SystemClock),
            timezone: chrono_tz::UTC,
            composer: NotificationComposer::default(),
            dispatch_timeout: DEFAULT_DISPATCH_TIMEOUT,
        }
    }

    /// Orchestrator configured from the environment. `test_mode` swaps in
    /// [`AlwaysOnWindows`] so every hour maps to a window.
    #[must_use]
    pub fn from_config(
        store: Arc<dyn ReminderStore>,
        transport: Arc<dyn PushTransport>,
        config: &NotifierConfig,
        test_mode: bool,
    ) -> Self {
        let classifier: Arc<dyn WindowClassifier> = if test_mode {
            Arc::new(AlwaysOnWindows::new(config.windows))
        } else {
            Arc::new(ScheduledWindows::new(config.windows))
        };

        Self::new(store, transport)
            .with_classifier(classifier)
            .with_timezone(config.timezone)
            .with_base_path(config.base_path.clone())
            .with_dispatch_timeout(config.push.timeout)
    }

    #[must_use]
    pub fn with_classifier(mut self, classifier: Arc<dyn WindowClassifier>) -> Self {
        self.classifier = classifier;
        self
    }

    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    #[must_use]
    pub const fn with_timezone(mut self, timezone: Tz) -> Self {
        self.timezone = timezone;
        self
    }

    #[must_use]
    pub fn with_base_path(mut self, base_path: impl Into<String>) -> Self {
        self.composer = NotificationComposer::new(base_path);
        self
    }

    #[must_use]
    pub const fn with_dispatch_timeout(mut self, timeout: Duration) -> Self {
        self.dispatch_timeout = timeout;
        self
    }

    fn moment(&self) -> LocalMoment {
        LocalMoment::new(self.clock.now(), self.timezone)
    }

    /// Perform one run.
    ///
    /// # Errors
    ///
    /// Returns [`NotifierError::StoreQuery`] if due orders cannot be
    /// selected. Failures after selection are counted, not returned.
    #[instrument(skip(self), fields(classifier = self.classifier.name(), timezone = %self.timezone))]
    pub async fn run(&self) -> Result<RunSummary, NotifierError> {
        let moment = self.moment();
        let Some(window) = self.classifier.classify(moment.hour()) else {
            info!(local_hour = moment.hour(), "Outside reminder windows, nothing to do");
            return Ok(RunSummary::empty(None));
        };

        let due_date = moment.tomorrow();
        let orders = self
            .store
            .due_orders(window, due_date)
            .await
            .map_err(NotifierError::StoreQuery)?;

        info!(
            window = %window,
            local_hour = moment.hour(),
            due_date = %due_date,
            count = orders.len(),
            "Processing due orders"
        );

        let dispatcher = Dispatcher::new(
            self.transport.clone(),
            self.store.clone(),
            self.dispatch_timeout,
        );
        let recorder = DeliveryRecorder::new(self.store.clone(), self.clock.clone());

        let mut summary = RunSummary::empty(Some(window));
        for order in &orders {
            summary.processed += 1;
            match self.process_order(&dispatcher, &recorder, window, order).await {
                Ok(OrderOutcome::Sent) => summary.sent += 1,
                Ok(OrderOutcome::Failed) => summary.failed += 1,
                Err(e) => {
                    error!(order_id = %order.id, error = %e, "Failed to process order");
                    summary.failed += 1;
                }
            }
        }

        info!(
            window = %window,
            processed = summary.processed,
            sent = summary.sent,
            failed = summary.failed,
            "Reminder run complete"
        );
        Ok(summary)
    }

    #[instrument(skip_all, fields(order_id = %order.id, order_number = %order.order_number))]
    async fn process_order(
        &self,
        dispatcher: &Dispatcher,
        recorder: &DeliveryRecorder,
        window: ReminderWindow,
        order: &DueOrder,
    ) -> Result<OrderOutcome, RepositoryError> {
        let subscriptions = self.store.subscriptions_for_user(order.user_id).await?;
        if subscriptions.is_empty() {
            debug!(user_id = %order.user_id, "No subscriptions for order owner");
            recorder.log_no_subscriptions(order, window).await?;
            return Ok(OrderOutcome::Failed);
        }

        let payload = self.composer.compose(window, order);
        let json = payload.to_json();

        let mut delivered = 0usize;
        let mut failures = Vec::new();
        for subscription in &subscriptions {
            let outcome = dispatcher.dispatch(subscription, &json).await;
            if outcome.is_sent() {
                delivered += 1;
            } else if let Some(reason) = outcome.reason() {
                failures.push(reason.to_string());
            }
        }

        if delivered == 0 {
            warn!(devices = subscriptions.len(), "Reminder not delivered to any device");
            let message = format!("Delivery failed: {}", failures.join("; "));
            recorder
                .log_notification(order, window, message, DeliveryStatus::Failed)
                .await?;
            return Ok(OrderOutcome::Failed);
        }

        // Delivered: write errors from here on are reported but do not change
        // the outcome, and the audit row is attempted even if flagging failed.
        if let Err(e) = recorder.mark_sent(order, window).await {
            error!(error = %e, "Reminder delivered but flag could not be set");
        }

        let message = if failures.is_empty() {
            payload.body
        } else {
            format!("{} (failed: {})", payload.body, failures.join("; "))
        };
        if let Err(e) = recorder
            .log_notification(order, window, message, DeliveryStatus::Sent)
            .await
        {
            error!(error = %e, "Reminder delivered but notification log could not be written");
        }

        info!(delivered, devices = subscriptions.len(), "Reminder sent");
        Ok(OrderOutcome::Sent)
    }

    /// Report the window and due orders a run would handle now.
    ///
    /// # Errors
    ///
    /// Returns [`NotifierError::StoreQuery`] if due orders cannot be selected.
    #[instrument(skip(self))]
    pub async fn preview(&self) -> Result<RunPreview, NotifierError> {
        let moment = self.moment();
        let window = self.classifier.classify(moment.hour());
        let due_date = moment.tomorrow();

        let orders = match window {
            Some(window) => self
                .store
                .due_orders(window, due_date)
                .await
                .map_err(NotifierError::StoreQuery)?,
            None => Vec::new(),
        };

        Ok(RunPreview {
            window: ReminderWindow::label(window).to_string(),
            local_hour: moment.hour(),
            due_date,
            orders,
        })
    }
}
