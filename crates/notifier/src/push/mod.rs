//! Push delivery.
//!
//! The Web Push protocol itself (VAPID signing, payload encryption) lives
//! outside this crate. [`PushTransport`] is the seam to whatever performs it:
//!
//! - [`GatewayTransport`] - forwards each message to an HTTP relay
//! - [`UnavailableTransport`] - used when no relay is configured; every
//!   delivery fails so nothing is ever reported as sent by mistake
//!
//! [`Dispatcher`] wraps a transport with key checks, a timeout, outcome
//! classification and cleanup of dead subscriptions.

mod dispatcher;
mod gateway;

pub use dispatcher::{DispatchOutcome, Dispatcher};
pub use gateway::GatewayTransport;

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

/// Errors raised by a transport before a push service verdict is known.
#[derive(Debug, Error)]
pub enum PushError {
    /// HTTP request to the relay failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// No delivery capability is configured.
    #[error("push delivery is not configured")]
    Unavailable,

    /// The dispatch did not finish in time.
    #[error("timed out after {0:?}")]
    Timeout(Duration),

    /// Client construction failed.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Where and how to deliver one message.
#[derive(Debug, Clone, Copy)]
pub struct PushTarget<'a> {
    pub endpoint: &'a str,
    pub p256dh: &'a str,
    pub auth: &'a str,
}

/// Verdict of the push service for one message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryReport {
    /// Accepted for delivery.
    Delivered,
    /// The endpoint no longer exists (expired or unsubscribed).
    Expired { status: u16, reason: String },
    /// Refused for any other reason; the endpoint may still be valid.
    Rejected { status: u16, reason: String },
}

impl DeliveryReport {
    /// Classify a push service status code.
    ///
    /// 404 and 410 mean the subscription is gone for good.
    #[must_use]
    pub fn from_status(status: u16, reason: impl Into<String>) -> Self {
        match status {
            200..=299 => Self::Delivered,
            404 | 410 => Self::Expired {
                status,
                reason: reason.into(),
            },
            _ => Self::Rejected {
                status,
                reason: reason.into(),
            },
        }
    }
}

/// Capability that hands an encrypted message to a browser push service.
#[async_trait]
pub trait PushTransport: Send + Sync {
    /// Deliver `payload` (serialized JSON) to `target`.
    async fn deliver(
        &self,
        target: PushTarget<'_>,
        payload: &str,
    ) -> Result<DeliveryReport, PushError>;
}

/// Transport used when delivery is not configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnavailableTransport;

#[async_trait]
impl PushTransport for UnavailableTransport {
    async fn deliver(
        &self,
        _target: PushTarget<'_>,
        _payload: &str,
    ) -> Result<DeliveryReport, PushError> {
        Err(PushError::Unavailable)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_classification() {
        assert_eq!(DeliveryReport::from_status(201, ""), DeliveryReport::Delivered);
        assert!(matches!(
            DeliveryReport::from_status(410, "gone"),
            DeliveryReport::Expired { status: 410, .. }
        ));
        assert!(matches!(
            DeliveryReport::from_status(404, "missing"),
            DeliveryReport::Expired { status: 404, .. }
        ));
        assert!(matches!(
            DeliveryReport::from_status(429, "slow down"),
            DeliveryReport::Rejected { status: 429, .. }
        ));
        assert!(matches!(
            DeliveryReport::from_status(500, "oops"),
            DeliveryReport::Rejected { status: 500, .. }
        ));
    }

    #[tokio::test]
    async fn test_unavailable_transport_never_succeeds() {
        let target = PushTarget {
            endpoint: "https://push.example.com/x",
            p256dh: "p",
            auth: "a",
        };
        let result = UnavailableTransport.deliver(target, "{}").await;
        assert!(matches!(result, Err(PushError::Unavailable)));
    }
}
