//! Run-level error handling.
//!
//! Only failures that happen before orders are selected surface here.
//! Everything after that point is folded into the run summary and the
//! audit log.

use thiserror::Error;

use crate::config::ConfigError;
use crate::db::RepositoryError;
use crate::push::PushError;

/// Errors that abort a reminder run.
#[derive(Debug, Error)]
pub enum NotifierError {
    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The database could not be reached.
    #[error("Store unavailable: {0}")]
    StoreUnavailable(#[source] sqlx::Error),

    /// Selecting due orders failed.
    #[error("Store query failed: {0}")]
    StoreQuery(#[source] RepositoryError),

    /// The push transport could not be built.
    #[error("Push transport error: {0}")]
    Push(#[from] PushError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notifier_error_display() {
        let err = NotifierError::StoreQuery(RepositoryError::NotFound);
        assert_eq!(err.to_string(), "Store query failed: not found");

        let err = NotifierError::StoreUnavailable(sqlx::Error::PoolTimedOut);
        assert!(err.to_string().starts_with("Store unavailable: "));

        let err = NotifierError::from(ConfigError::MissingEnvVar("REMINDERS_DATABASE_URL".into()));
        assert_eq!(
            err.to_string(),
            "Configuration error: Missing environment variable: REMINDERS_DATABASE_URL"
        );
    }
}
