//! Notifier configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `REMINDERS_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)
//!
//! ## Optional
//! - `REMINDERS_TIMEZONE` - IANA timezone used to decide "tomorrow" and the current hour (default: UTC)
//! - `REMINDERS_BASE_PATH` - Application path prefix for notification deep links (default: empty)
//! - `REMINDERS_MORNING_HOURS` - Morning window as `start-end` (default: 8-13)
//! - `REMINDERS_AFTERNOON_HOURS` - Afternoon window as `start-end` (default: 13-19)
//! - `REMINDERS_EVENING_HOURS` - Evening window as `start-end` (default: 19-23)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//!
//! ## Optional (Push gateway - without it every dispatch fails as transient)
//! - `PUSH_GATEWAY_URL` - Web Push relay endpoint that performs the VAPID encryption
//! - `PUSH_GATEWAY_TOKEN` - Bearer token for the relay
//! - `PUSH_TTL_SECONDS` - TTL handed to the push service (default: 86400)
//! - `PUSH_TIMEOUT_SECS` - Per-dispatch timeout (default: 10)

use std::collections::HashMap;
use std::time::Duration;

use chrono_tz::Tz;
use secrecy::SecretString;
use thiserror::Error;
use url::Url;

use crate::services::window::{HourRange, WindowSchedule};

const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;
const DEFAULT_TTL_SECONDS: u32 = 86_400;
const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "secret",
    "password",
    "xxx",
    "todo",
    "fixme",
    "insert",
    "enter-",
    "put-your",
    "add-your",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Notifier configuration.
#[derive(Debug, Clone)]
pub struct NotifierConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: SecretString,
    /// Timezone the reminder windows and order dates are expressed in
    pub timezone: Tz,
    /// Path prefix for deep links and icons, without trailing slash
    pub base_path: String,
    /// Hour ranges of the three daily windows
    pub windows: WindowSchedule,
    /// Push delivery configuration
    pub push: PushConfig,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment (e.g., "staging", "production")
    pub sentry_environment: Option<String>,
}

/// Push gateway configuration.
///
/// Implements `Debug` manually to redact the gateway token.
#[derive(Clone)]
pub struct PushConfig {
    /// Relay endpoint; `None` disables delivery
    pub gateway_url: Option<Url>,
    /// Bearer token for the relay
    pub gateway_token: Option<SecretString>,
    /// Time-to-live the push service keeps an undelivered message
    pub ttl_seconds: u32,
    /// Upper bound for a single dispatch
    pub timeout: Duration,
}

impl std::fmt::Debug for PushConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PushConfig")
            .field("gateway_url", &self.gateway_url.as_ref().map(Url::as_str))
            .field(
                "gateway_token",
                &self.gateway_token.as_ref().map(|_| "[REDACTED]"),
            )
            .field("ttl_seconds", &self.ttl_seconds)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl Default for PushConfig {
    fn default() -> Self {
        Self {
            gateway_url: None,
            gateway_token: None,
            ttl_seconds: DEFAULT_TTL_SECONDS,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl NotifierConfig {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing, invalid, or
    /// if the gateway token fails validation (placeholder detection, entropy check).
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let database_url = get_database_url("REMINDERS_DATABASE_URL")?;
        let timezone = get_env_or_default("REMINDERS_TIMEZONE", "UTC")
            .parse::<Tz>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("REMINDERS_TIMEZONE".to_string(), e.to_string())
            })?;
        let base_path = normalize_base_path(&get_env_or_default("REMINDERS_BASE_PATH", ""));

        let defaults = WindowSchedule::default();
        let windows = WindowSchedule::new(
            get_hour_range("REMINDERS_MORNING_HOURS", defaults.morning)?,
            get_hour_range("REMINDERS_AFTERNOON_HOURS", defaults.afternoon)?,
            get_hour_range("REMINDERS_EVENING_HOURS", defaults.evening)?,
        )
        .map_err(|e| ConfigError::InvalidEnvVar("REMINDERS_*_HOURS".to_string(), e.to_string()))?;

        let push = PushConfig::from_env()?;
        let sentry_dsn = get_optional_env("SENTRY_DSN");
        let sentry_environment = get_optional_env("SENTRY_ENVIRONMENT");

        Ok(Self {
            database_url,
            timezone,
            base_path,
            windows,
            push,
            sentry_dsn,
            sentry_environment,
        })
    }
}

impl PushConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let gateway_url = get_optional_env("PUSH_GATEWAY_URL")
            .map(|raw| {
                Url::parse(&raw).map_err(|e| {
                    ConfigError::InvalidEnvVar("PUSH_GATEWAY_URL".to_string(), e.to_string())
                })
            })
            .transpose()?;

        let gateway_token = match get_optional_env("PUSH_GATEWAY_TOKEN") {
            Some(token) => {
                validate_secret_strength(&token, "PUSH_GATEWAY_TOKEN")?;
                Some(SecretString::from(token))
            }
            None => None,
        };

        let ttl_seconds = get_env_or_default("PUSH_TTL_SECONDS", &DEFAULT_TTL_SECONDS.to_string())
            .parse::<u32>()
            .map_err(|e| ConfigError::InvalidEnvVar("PUSH_TTL_SECONDS".to_string(), e.to_string()))?;
        let timeout_secs =
            get_env_or_default("PUSH_TIMEOUT_SECS", &DEFAULT_TIMEOUT_SECS.to_string())
                .parse::<u64>()
                .map_err(|e| {
                    ConfigError::InvalidEnvVar("PUSH_TIMEOUT_SECS".to_string(), e.to_string())
                })?;
        if timeout_secs == 0 {
            return Err(ConfigError::InvalidEnvVar(
                "PUSH_TIMEOUT_SECS".to_string(),
                "must be greater than zero".to_string(),
            ));
        }

        Ok(Self {
            gateway_url,
            gateway_token,
            ttl_seconds,
            timeout: Duration::from_secs(timeout_secs),
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get database URL with fallback to generic `DATABASE_URL`.
fn get_database_url(primary_key: &str) -> Result<SecretString, ConfigError> {
    if let Ok(value) = std::env::var(primary_key) {
        return Ok(SecretString::from(value));
    }
    if let Ok(value) = std::env::var("DATABASE_URL") {
        return Ok(SecretString::from(value));
    }
    Err(ConfigError::MissingEnvVar(primary_key.to_string()))
}

/// Get an optional environment variable, treating blank values as unset.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Read an hour range variable, falling back to `default` when unset.
fn get_hour_range(key: &str, default: HourRange) -> Result<HourRange, ConfigError> {
    get_optional_env(key).map_or(Ok(default), |raw| {
        parse_hour_range(&raw).map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e))
    })
}

/// Parse `start-end` into a half-open hour range.
fn parse_hour_range(raw: &str) -> Result<HourRange, String> {
    let (start, end) = raw
        .split_once('-')
        .ok_or_else(|| format!("expected `start-end`, got `{raw}`"))?;
    let start = start
        .trim()
        .parse::<u32>()
        .map_err(|e| format!("invalid start hour: {e}"))?;
    let end = end
        .trim()
        .parse::<u32>()
        .map_err(|e| format!("invalid end hour: {e}"))?;
    HourRange::new(start, end).map_err(|e| e.to_string())
}

/// Strip whitespace and trailing slashes so links can be joined with `/`.
///
/// Anything that is not an absolute path or URL collapses to an empty prefix.
#[must_use]
pub fn normalize_base_path(raw: &str) -> String {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.starts_with('/') || trimmed.starts_with("https://") || trimmed.starts_with("http://")
    {
        trimmed.to_string()
    } else {
        String::new()
    }
}

/// Calculate Shannon entropy in bits per character.
fn shannon_entropy(s: &str) -> f64 {
    if s.is_empty() {
        return 0.0;
    }

    let mut freq: HashMap<char, usize> = HashMap::new();
    for c in s.chars() {
        *freq.entry(c).or_insert(0) += 1;
    }

    #[allow(clippy::cast_precision_loss)] // String length will never exceed f64 precision
    let len = s.len() as f64;
    freq.values()
        .map(|&count| {
            #[allow(clippy::cast_precision_loss)] // Character count will never exceed f64 precision
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// Validate that a secret is not a placeholder and has sufficient entropy.
fn validate_secret_strength(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = secret.to_lowercase();

    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_string(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }

    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1}). Use a randomly generated secret."
            ),
        ));
    }

    Ok(())
}
