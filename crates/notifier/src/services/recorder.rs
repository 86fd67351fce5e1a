//! Delivery state recording: reminder flags and the audit log.

use std::sync::Arc;

use order_reminders_core::{DeliveryStatus, ReminderWindow};

use super::clock::Clock;
use crate::db::RepositoryError;
use crate::models::{DueOrder, NewNotificationLog};
use crate::store::ReminderStore;

/// Log message written when the order owner has no registered device.
pub const NO_SUBSCRIPTIONS_MESSAGE: &str = "No subscriptions found";

/// Writes the outcome of an order's reminder to the store.
#[derive(Clone)]
pub struct DeliveryRecorder {
    store: Arc<dyn ReminderStore>,
    clock: Arc<dyn Clock>,
}

impl DeliveryRecorder {
    #[must_use]
    pub fn new(store: Arc<dyn ReminderStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// Flag the order's `window` reminder as delivered now.
    ///
    /// Call only after at least one device accepted the notification.
    ///
    /// # Errors
    ///
    /// Returns error if the update fails.
    pub async fn mark_sent(
        &self,
        order: &DueOrder,
        window: ReminderWindow,
    ) -> Result<(), RepositoryError> {
        self.store.mark_sent(order.id, window, self.clock.now()).await
    }

    /// Append the single audit row for this order and window.
    ///
    /// # Errors
    ///
    /// Returns error if the insert fails.
    pub async fn log_notification(
        &self,
        order: &DueOrder,
        window: ReminderWindow,
        message: impl Into<String> + Send,
        status: DeliveryStatus,
    ) -> Result<(), RepositoryError> {
        let entry = NewNotificationLog::reminder(order.user_id, order.id, window, message, status);
        self.store.log_notification(&entry).await
    }

    /// Record that the owner has no devices. The reminder flag is left unset.
    ///
    /// # Errors
    ///
    /// Returns error if the insert fails.
    pub async fn log_no_subscriptions(
        &self,
        order: &DueOrder,
        window: ReminderWindow,
    ) -> Result<(), RepositoryError> {
        self.log_notification(order, window, NO_SUBSCRIPTIONS_MESSAGE, DeliveryStatus::Failed)
            .await
    }
}
