//! Database operations for the reminders `PostgreSQL` database.
//!
//! ## Tables
//!
//! - `users` - Order owners (read-only here)
//! - `orders` - Scheduled orders with three per-window reminder flags
//! - `push_subscriptions` - Registered Web Push endpoints per user
//! - `notification_logs` - Append-only delivery audit log
//!
//! # Migrations
//!
//! Migrations are stored in `crates/notifier/migrations/` and run via:
//! ```bash
//! cargo run -p order-reminders-cli -- migrate
//! ```

pub mod notification_logs;
pub mod orders;
pub mod subscriptions;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,
}

/// Create a `PostgreSQL` connection pool.
///
/// A batch run issues one statement at a time, so the pool stays small.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(4)
        .min_connections(1)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

/// Apply the embedded migrations.
///
/// # Errors
///
/// Returns `MigrateError` if a migration fails or the history is inconsistent.
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}
