//! Subscription maintenance commands.

use order_reminders_notifier::{NotifierConfig, ReminderStore};

/// Delete every subscription registered for `endpoint`.
///
/// # Errors
///
/// Returns error if the database is unreachable or the delete fails.
pub async fn prune(
    config: &NotifierConfig,
    endpoint: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let store = super::connect(config).await?;
    let removed = store.delete_subscription_by_endpoint(endpoint).await?;

    if removed == 0 {
        tracing::warn!(endpoint, "No subscription found for endpoint");
    } else {
        tracing::info!(endpoint, removed, "Subscription removed");
    }
    Ok(())
}
