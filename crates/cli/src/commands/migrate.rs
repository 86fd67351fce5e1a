//! Database migration command.
//!
//! # Usage
//!
//! ```bash
//! reminders-cli migrate
//! ```
//!
//! # Environment Variables
//!
//! - `REMINDERS_DATABASE_URL` (or `DATABASE_URL`) - `PostgreSQL` connection string
//!
//! Migrations live in `crates/notifier/migrations/` and are embedded at
//! build time.

use thiserror::Error;

use order_reminders_notifier::{NotifierConfig, NotifierError, db};

/// Errors that can occur while migrating.
#[derive(Debug, Error)]
pub enum MigrationError {
    #[error(transparent)]
    Connect(#[from] NotifierError),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

/// Apply all pending migrations.
///
/// # Errors
///
/// Returns error if the database is unreachable or a migration fails.
pub async fn run(config: &NotifierConfig) -> Result<(), MigrationError> {
    let store = super::connect(config).await?;

    tracing::info!("Running migrations...");
    db::run_migrations(store.pool()).await?;

    tracing::info!("Migrations complete!");
    Ok(())
}
