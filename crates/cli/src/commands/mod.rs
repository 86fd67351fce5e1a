//! CLI command implementations.
//!
//! - `run` - One reminder run (or a dry-run preview)
//! - `window` - Window schedule inspection
//! - `migrate` - Database migrations
//! - `subscriptions` - Subscription maintenance
//! - `history` - Notification log lookup

pub mod history;
pub mod migrate;
pub mod run;
pub mod subscriptions;
pub mod window;

use order_reminders_notifier::db::create_pool;
use order_reminders_notifier::{NotifierConfig, NotifierError, PgReminderStore};

/// Connect to the configured database.
async fn connect(config: &NotifierConfig) -> Result<PgReminderStore, NotifierError> {
    tracing::info!("Connecting to database...");
    let pool = create_pool(&config.database_url)
        .await
        .map_err(NotifierError::StoreUnavailable)?;
    Ok(PgReminderStore::new(pool))
}
