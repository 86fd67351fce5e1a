//! Single-subscription dispatch with outcome classification.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use order_reminders_core::SubscriptionId;

use super::{DeliveryReport, PushError, PushTarget, PushTransport};
use crate::models::PushSubscription;
use crate::store::ReminderStore;

/// Result of one dispatch attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// The push service accepted the message.
    Sent,
    /// The subscription lacks key material; nothing was sent.
    Unusable { reason: String },
    /// The endpoint is gone; the subscription has been deleted.
    Invalid { reason: String },
    /// Anything else. The subscription is kept for the next run.
    Failed { reason: String },
}

impl DispatchOutcome {
    #[must_use]
    pub const fn is_sent(&self) -> bool {
        matches!(self, Self::Sent)
    }

    /// Failure reason, if this was not a success.
    #[must_use]
    pub fn reason(&self) -> Option<&str> {
        match self {
            Self::Sent => None,
            Self::Unusable { reason } | Self::Invalid { reason } | Self::Failed { reason } => {
                Some(reason)
            }
        }
    }
}

/// Delivers payloads to individual subscriptions.
#[derive(Clone)]
pub struct Dispatcher {
    transport: Arc<dyn PushTransport>,
    store: Arc<dyn ReminderStore>,
    timeout: Duration,
}

impl Dispatcher {
    #[must_use]
    pub fn new(
        transport: Arc<dyn PushTransport>,
        store: Arc<dyn ReminderStore>,
        timeout: Duration,
    ) -> Self {
        Self {
            transport,
            store,
            timeout,
        }
    }

    /// Deliver `payload` to `subscription`.
    ///
    /// Never fails: every path, including transport errors and timeouts,
    /// becomes a [`DispatchOutcome`].
    pub async fn dispatch(&self, subscription: &PushSubscription, payload: &str) -> DispatchOutcome {
        let Some((p256dh, auth)) = subscription.keys() else {
            debug!(subscription_id = %subscription.id, "Subscription missing keys, skipping");
            return DispatchOutcome::Unusable {
                reason: format!("subscription {} is missing encryption keys", subscription.id),
            };
        };

        let target = PushTarget {
            endpoint: &subscription.endpoint,
            p256dh,
            auth,
        };

        let result = tokio::time::timeout(self.timeout, self.transport.deliver(target, payload))
            .await
            .unwrap_or_else(|_| Err(PushError::Timeout(self.timeout)));

        match result {
            Ok(DeliveryReport::Delivered) => {
                debug!(subscription_id = %subscription.id, "Push delivered");
                DispatchOutcome::Sent
            }
            Ok(DeliveryReport::Expired { status, reason }) => {
                self.remove_subscription(subscription.id).await;
                DispatchOutcome::Invalid {
                    reason: format!(
                        "subscription {} expired (HTTP {status}): {reason}",
                        subscription.id
                    ),
                }
            }
            Ok(DeliveryReport::Rejected { status, reason }) => {
                warn!(subscription_id = %subscription.id, status, reason = %reason, "Push rejected");
                DispatchOutcome::Failed {
                    reason: format!(
                        "subscription {} rejected (HTTP {status}): {reason}",
                        subscription.id
                    ),
                }
            }
            Err(e) => {
                warn!(subscription_id = %subscription.id, error = %e, "Push delivery failed");
                DispatchOutcome::Failed {
                    reason: format!("subscription {} failed: {e}", subscription.id),
                }
            }
        }
    }

    async fn remove_subscription(&self, id: SubscriptionId) {
        match self.store.delete_subscription(id).await {
            Ok(true) => info!(subscription_id = %id, "Removed expired subscription"),
            Ok(false) => debug!(subscription_id = %id, "Expired subscription already removed"),
            Err(e) => warn!(subscription_id = %id, error = %e, "Failed to remove expired subscription"),
        }
    }
}
