//! Reminder run command.
//!
//! # Usage
//!
//! ```bash
//! # Hourly from cron
//! reminders-cli run
//!
//! # Outside the schedule, treat the current hour as the nearest window
//! reminders-cli run --test-mode
//!
//! # Preview without sending
//! reminders-cli run --dry-run --json
//! ```
//!
//! Exits non-zero only when the database is unreachable or due orders cannot
//! be selected. Per-order failures are reported in the summary.

use std::sync::Arc;

use order_reminders_notifier::services::{RunPreview, RunSummary};
use order_reminders_notifier::{
    GatewayTransport, NotificationOrchestrator, NotifierConfig, NotifierError, PushTransport,
    UnavailableTransport,
};

/// Flags of the `run` command.
#[derive(Debug, Clone, Copy, Default)]
#[allow(clippy::struct_excessive_bools)]
pub struct RunOptions {
    pub test_mode: bool,
    pub dry_run: bool,
    pub json: bool,
}

fn transport(config: &NotifierConfig) -> Result<Arc<dyn PushTransport>, NotifierError> {
    match GatewayTransport::from_config(&config.push)? {
        Some(gateway) => Ok(Arc::new(gateway)),
        None => {
            tracing::warn!("PUSH_GATEWAY_URL not set, every delivery will fail");
            Ok(Arc::new(UnavailableTransport))
        }
    }
}

/// Perform one run (or preview) and print the result.
///
/// # Errors
///
/// Returns error if the store is unavailable or order selection fails.
pub async fn execute(
    config: &NotifierConfig,
    options: RunOptions,
) -> Result<(), Box<dyn std::error::Error>> {
    let store = Arc::new(super::connect(config).await?);
    let orchestrator =
        NotificationOrchestrator::from_config(store, transport(config)?, config, options.test_mode);

    if options.dry_run {
        let preview = orchestrator.preview().await?;
        print_preview(&preview, options.json)?;
    } else {
        let summary = orchestrator.run().await?;
        print_summary(&summary, options.json)?;
    }
    Ok(())
}

#[allow(clippy::print_stdout)]
fn print_summary(summary: &RunSummary, json: bool) -> Result<(), serde_json::Error> {
    if json {
        println!("{}", serde_json::to_string(summary)?);
    } else {
        println!("{summary}");
    }
    Ok(())
}

#[allow(clippy::print_stdout)]
fn print_preview(preview: &RunPreview, json: bool) -> Result<(), serde_json::Error> {
    if json {
        println!("{}", serde_json::to_string_pretty(preview)?);
        return Ok(());
    }

    println!(
        "window={} local_hour={} due_date={} orders={}",
        preview.window,
        preview.local_hour,
        preview.due_date,
        preview.orders.len()
    );
    for order in &preview.orders {
        println!(
            "  #{:<6} {:<16} {} {} ({}, {})",
            order.id,
            order.order_number,
            order.scheduled_date,
            order.scheduled_time.format("%H:%M"),
            order.status,
            order.username
        );
    }
    Ok(())
}
