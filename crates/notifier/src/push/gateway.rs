//! HTTP relay transport.
//!
//! The relay receives one JSON document per message, performs the Web Push
//! encryption and VAPID signing, and answers with the status code the browser
//! push service returned:
//!
//! ```json
//! {
//!   "subscription": { "endpoint": "...", "keys": { "p256dh": "...", "auth": "..." } },
//!   "payload": "{\"title\":\"...\"}",
//!   "ttl": 86400
//! }
//! ```
//!
//! - `2xx` - accepted
//! - `404` / `410` - subscription expired or unsubscribed
//! - anything else - rejected, body used as the reason

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use secrecy::ExposeSecret;
use serde::Serialize;
use url::Url;

use super::{DeliveryReport, PushError, PushTarget, PushTransport};
use crate::config::PushConfig;

/// Longest relay response body kept in a failure reason.
const MAX_REASON_LEN: usize = 200;

#[derive(Serialize)]
struct RelayKeys<'a> {
    p256dh: &'a str,
    auth: &'a str,
}

#[derive(Serialize)]
struct RelaySubscription<'a> {
    endpoint: &'a str,
    keys: RelayKeys<'a>,
}

#[derive(Serialize)]
struct RelayRequest<'a> {
    subscription: RelaySubscription<'a>,
    payload: &'a str,
    ttl: u32,
}

/// Transport that posts each message to a Web Push relay.
#[derive(Clone)]
pub struct GatewayTransport {
    inner: Arc<GatewayTransportInner>,
}

struct GatewayTransportInner {
    client: reqwest::Client,
    url: Url,
    ttl_seconds: u32,
}

impl GatewayTransport {
    /// Build a transport for `url`.
    ///
    /// # Errors
    ///
    /// Returns error if the token is not a valid header value or the HTTP
    /// client fails to build.
    pub fn new(url: Url, config: &PushConfig) -> Result<Self, PushError> {
        let mut headers = HeaderMap::new();

        if let Some(token) = &config.gateway_token {
            let value = format!("Bearer {}", token.expose_secret());
            let mut value = HeaderValue::from_str(&value)
                .map_err(|e| PushError::Config(format!("Invalid gateway token: {e}")))?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()?;

        Ok(Self {
            inner: Arc::new(GatewayTransportInner {
                client,
                url,
                ttl_seconds: config.ttl_seconds,
            }),
        })
    }

    /// Build a transport from configuration, if a relay URL is set.
    ///
    /// # Errors
    ///
    /// Returns error if the client cannot be built.
    pub fn from_config(config: &PushConfig) -> Result<Option<Self>, PushError> {
        config
            .gateway_url
            .clone()
            .map(|url| Self::new(url, config))
            .transpose()
    }
}

#[async_trait]
impl PushTransport for GatewayTransport {
    async fn deliver(
        &self,
        target: PushTarget<'_>,
        payload: &str,
    ) -> Result<DeliveryReport, PushError> {
        let body = RelayRequest {
            subscription: RelaySubscription {
                endpoint: target.endpoint,
                keys: RelayKeys {
                    p256dh: target.p256dh,
                    auth: target.auth,
                },
            },
            payload,
            ttl: self.inner.ttl_seconds,
        };

        let response = self
            .inner
            .client
            .post(self.inner.url.clone())
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            return Ok(DeliveryReport::Delivered);
        }

        let text = response.text().await.unwrap_or_default();
        let reason = if text.trim().is_empty() {
            status
                .canonical_reason()
                .unwrap_or("unknown status")
                .to_string()
        } else {
            text.trim().chars().take(MAX_REASON_LEN).collect()
        };

        Ok(DeliveryReport::from_status(status.as_u16(), reason))
    }
}
