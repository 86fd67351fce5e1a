//! Push subscription model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use order_reminders_core::{SubscriptionId, UserId};

/// A browser/device registered to receive push notifications for a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct PushSubscription {
    pub id: SubscriptionId,
    pub user_id: UserId,
    /// Push service URL issued by the browser.
    pub endpoint: String,
    /// Client ECDH public key (base64url).
    pub p256dh: Option<String>,
    /// Client auth secret (base64url).
    pub auth: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl PushSubscription {
    /// Both key fields, if present and non-blank.
    #[must_use]
    pub fn keys(&self) -> Option<(&str, &str)> {
        let p256dh = self.p256dh.as_deref().filter(|k| !k.trim().is_empty())?;
        let auth = self.auth.as_deref().filter(|k| !k.trim().is_empty())?;
        Some((p256dh, auth))
    }

    /// Whether the subscription carries enough key material to be delivered to.
    #[must_use]
    pub fn is_usable(&self) -> bool {
        self.keys().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn subscription(p256dh: Option<&str>, auth: Option<&str>) -> PushSubscription {
        PushSubscription {
            id: SubscriptionId::new(1),
            user_id: UserId::new(1),
            endpoint: "https://push.example.com/abc".to_string(),
            p256dh: p256dh.map(str::to_string),
            auth: auth.map(str::to_string),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_usable_requires_both_keys() {
        assert!(subscription(Some("p"), Some("a")).is_usable());
        assert!(!subscription(None, Some("a")).is_usable());
        assert!(!subscription(Some("p"), None).is_usable());
        assert!(!subscription(Some("  "), Some("a")).is_usable());
    }

    #[test]
    fn test_keys_returns_both_values() {
        let sub = subscription(Some("p256"), Some("secret"));
        assert_eq!(sub.keys(), Some(("p256", "secret")));
    }
}
