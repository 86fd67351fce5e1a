//! Notification log lookup.

use order_reminders_core::{OrderId, ReminderWindow};
use order_reminders_notifier::{NotifierConfig, ReminderStore};

/// Print the notification log of an order, newest first.
///
/// # Errors
///
/// Returns error if the database is unreachable or the query fails.
#[allow(clippy::print_stdout)]
pub async fn show(
    config: &NotifierConfig,
    order_id: i32,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let store = super::connect(config).await?;
    let logs = store.notification_history(OrderId::new(order_id)).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&logs)?);
        return Ok(());
    }

    if logs.is_empty() {
        println!("No notifications logged for order {order_id}");
        return Ok(());
    }

    for log in &logs {
        println!(
            "{} {:<9} {:<6} {}",
            log.created_at.format("%Y-%m-%d %H:%M:%S"),
            ReminderWindow::label(log.window()),
            log.status,
            log.message
        );
    }
    Ok(())
}
