//! Integration tests for complete reminder runs.
//!
//! These tests drive the orchestrator end to end over the in-memory store
//! and verify window selection, flags, the audit log and idempotence.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use secrecy::SecretString;

use order_reminders_core::{DeliveryStatus, OrderStatus, ReminderWindow};
use order_reminders_integration_tests::{Fixture, Verdict, due_date, run_instant};
use order_reminders_notifier::config::PushConfig;
use order_reminders_notifier::services::{
    FixedClock, NO_SUBSCRIPTIONS_MESSAGE, RunSummary, WindowSchedule,
};
use order_reminders_notifier::{NotificationOrchestrator, NotifierConfig};

fn counts(summary: &RunSummary) -> (usize, usize, usize) {
    (summary.processed, summary.sent, summary.failed)
}

// =============================================================================
// Single Window Scenarios
// =============================================================================

#[tokio::test]
async fn test_morning_run_delivers_and_flags_order() {
    let fx = Fixture::new();
    let user = fx.user(1);
    let order = fx.order(10, user, 14);
    fx.subscribe(user, "https://push.example/one");

    let summary = fx.orchestrator_at(9).run().await.unwrap();

    assert_eq!(counts(&summary), (1, 1, 0));
    assert_eq!(summary.window, "morning");

    let state = fx.order_state(order);
    let flag = state.reminder(ReminderWindow::Morning);
    assert_eq!(flag.sent, Some(true));
    assert_eq!(flag.sent_at, Some(run_instant(9)));
    assert!(!state.reminder(ReminderWindow::Afternoon).is_sent());

    let logs = fx.store.logs();
    assert_eq!(logs.len(), 1);
    assert_eq!(logs[0].status, DeliveryStatus::Sent);
    assert_eq!(logs[0].notification_type, "order_reminder");
    assert_eq!(logs[0].window(), Some(ReminderWindow::Morning));
    assert_eq!(
        logs[0].message,
        "Good morning! Just a reminder that order #ORD-2026-0010 is scheduled for tomorrow, Sunday, October 18, 2026 at 2:00 PM."
    );
}

#[tokio::test]
async fn test_payload_sent_to_device() {
    let fx = Fixture::new();
    let user = fx.user(1);
    fx.order(10, user, 14);
    fx.subscribe(user, "https://push.example/one");

    fx.orchestrator_at(20).run().await.unwrap();

    let messages = fx.transport.messages();
    assert_eq!(messages.len(), 1);
    let payload = &messages[0].payload;
    assert_eq!(payload["title"], "🌙 Evening Order Reminder");
    assert_eq!(payload["tag"], "order-reminder-evening-10");
    assert_eq!(payload["requireInteraction"], true);
    assert_eq!(payload["icon"], "/app/icons/icon-192.png");
    assert_eq!(payload["data"]["url"], "/app/orders/10");
    assert_eq!(payload["data"]["date"], "2026-10-18");
    assert_eq!(payload["data"]["time"], "14:00");
    assert_eq!(payload["data"]["window"], 3);
}

#[tokio::test]
async fn test_no_subscriptions_logs_failure_without_flag() {
    let fx = Fixture::new();
    let user = fx.user(1);
    let order = fx.order(10, user, 9);

    let summary = fx.orchestrator_at(9).run().await.unwrap();

    assert_eq!(counts(&summary), (1, 0, 1));
    assert!(!fx.order_state(order).reminder(ReminderWindow::Morning).is_sent());
    assert!(fx.store.mark_sent_calls().is_empty());

    let logs = fx.store.logs();
    assert_eq!(logs.len(), 1);
    assert_eq!(logs[0].status, DeliveryStatus::Failed);
    assert_eq!(logs[0].message, NO_SUBSCRIPTIONS_MESSAGE);
}

#[tokio::test]
async fn test_hour_outside_windows_does_nothing() {
    let fx = Fixture::new();
    let user = fx.user(1);
    fx.order(10, user, 9);
    fx.subscribe(user, "https://push.example/one");

    for hour in [0, 3, 7, 23] {
        let summary = fx.orchestrator_at(hour).run().await.unwrap();
        assert_eq!(counts(&summary), (0, 0, 0));
        assert_eq!(summary.window, "none");
    }

    assert_eq!(fx.store.due_order_queries(), 0);
    assert!(fx.transport.messages().is_empty());
    assert!(fx.store.logs().is_empty());
}

// =============================================================================
// Selection Tests
// =============================================================================

#[tokio::test]
async fn test_only_actionable_orders_for_tomorrow_are_selected() {
    let fx = Fixture::new();
    let user = fx.user(1);
    fx.subscribe(user, "https://push.example/one");

    let pending = fx.order(1, user, 9);
    let processing = fx.insert_order(2, user, 10, |o| o.status = OrderStatus::Processing);
    fx.insert_order(3, user, 11, |o| o.status = OrderStatus::Completed);
    fx.insert_order(4, user, 12, |o| o.status = OrderStatus::Cancelled);
    fx.insert_order(5, user, 13, |o| o.is_deleted = true);
    fx.insert_order(6, user, 14, |o| {
        o.scheduled_date = o.scheduled_date.succ_opt().unwrap();
    });
    fx.insert_order(7, user, 15, |o| {
        o.reminders[0].sent = Some(true);
    });

    let summary = fx.orchestrator_at(10).run().await.unwrap();

    assert_eq!(counts(&summary), (2, 2, 0));
    let flagged: Vec<_> = fx.store.mark_sent_calls().into_iter().map(|(id, _)| id).collect();
    assert_eq!(flagged, vec![pending, processing]);
}

#[tokio::test]
async fn test_orders_processed_earliest_first() {
    let fx = Fixture::new();
    let early = fx.user(1);
    let late = fx.user(2);
    fx.subscribe(late, "https://push.example/late");
    fx.subscribe(early, "https://push.example/early");
    fx.order(1, late, 18);
    fx.order(2, early, 8);

    fx.orchestrator_at(15).run().await.unwrap();

    assert_eq!(
        fx.transport.endpoints(),
        vec!["https://push.example/early", "https://push.example/late"]
    );
}

// =============================================================================
// Idempotence Tests
// =============================================================================

#[tokio::test]
async fn test_second_run_in_same_window_sends_nothing() {
    let fx = Fixture::new();
    let user = fx.user(1);
    fx.order(10, user, 9);
    fx.order(11, user, 17);
    fx.subscribe(user, "https://push.example/one");

    let first = fx.orchestrator_at(8).run().await.unwrap();
    let second = fx.orchestrator_at(12).run().await.unwrap();

    assert_eq!(counts(&first), (2, 2, 0));
    assert_eq!(counts(&second), (0, 0, 0));
    assert_eq!(second.window, "morning");
    assert_eq!(fx.transport.messages().len(), 2);
    assert_eq!(fx.store.mark_sent_calls().len(), 2);
    assert_eq!(fx.store.logs().len(), 2);
}

#[tokio::test]
async fn test_each_window_sends_its_own_reminder() {
    let fx = Fixture::new();
    let user = fx.user(1);
    let order = fx.order(10, user, 9);
    fx.subscribe(user, "https://push.example/one");

    for hour in [9, 15, 21] {
        let summary = fx.orchestrator_at(hour).run().await.unwrap();
        assert_eq!(counts(&summary), (1, 1, 0));
    }

    let state = fx.order_state(order);
    for window in ReminderWindow::ALL {
        assert!(state.reminder(window).is_sent(), "{window} not flagged");
    }
    let tags: Vec<String> = fx
        .transport
        .messages()
        .iter()
        .map(|m| m.payload["tag"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(
        tags,
        vec![
            "order-reminder-morning-10",
            "order-reminder-afternoon-10",
            "order-reminder-evening-10"
        ]
    );
}

#[tokio::test]
async fn test_failed_order_is_retried_by_next_run() {
    let fx = Fixture::new();
    let user = fx.user(1);
    let order = fx.order(10, user, 9);
    fx.subscribe(user, "https://push.example/one");
    fx.transport.script("https://push.example/one", Verdict::Unreachable);

    let first = fx.orchestrator_at(9).run().await.unwrap();
    assert_eq!(counts(&first), (1, 0, 1));
    assert!(!fx.order_state(order).reminder(ReminderWindow::Morning).is_sent());

    fx.transport.script("https://push.example/one", Verdict::Deliver);
    let second = fx.orchestrator_at(10).run().await.unwrap();
    assert_eq!(counts(&second), (1, 1, 0));
    assert!(fx.order_state(order).reminder(ReminderWindow::Morning).is_sent());

    let statuses: Vec<_> = fx.store.logs().iter().map(|l| l.status).collect();
    assert_eq!(statuses, vec![DeliveryStatus::Failed, DeliveryStatus::Sent]);
}

// =============================================================================
// Configuration Tests
// =============================================================================

fn config(timezone: chrono_tz::Tz) -> NotifierConfig {
    NotifierConfig {
        database_url: SecretString::from("postgres://localhost/reminders"),
        timezone,
        base_path: String::new(),
        windows: WindowSchedule::default(),
        push: PushConfig::default(),
        sentry_dsn: None,
        sentry_environment: None,
    }
}

#[tokio::test]
async fn test_test_mode_covers_hours_outside_schedule() {
    let fx = Fixture::new();
    let user = fx.user(1);
    fx.order(10, user, 9);
    fx.subscribe(user, "https://push.example/one");

    let orchestrator = NotificationOrchestrator::from_config(
        fx.store.clone(),
        fx.transport.clone(),
        &config(chrono_tz::UTC),
        true,
    )
    .with_clock(Arc::new(FixedClock(run_instant(2))));

    let summary = orchestrator.run().await.unwrap();
    assert_eq!(summary.window, "morning");
    assert_eq!(counts(&summary), (1, 1, 0));
}

#[tokio::test]
async fn test_configured_timezone_decides_window_and_due_date() {
    let fx = Fixture::new();
    let user = fx.user(1);
    fx.order(10, user, 9);
    fx.subscribe(user, "https://push.example/one");

    // 01:05 UTC on the 17th is 21:05 on the 16th in New York: evening, and
    // tomorrow there is the 17th, which has no orders.
    let orchestrator = NotificationOrchestrator::from_config(
        fx.store.clone(),
        fx.transport.clone(),
        &config(chrono_tz::America::New_York),
        false,
    )
    .with_clock(Arc::new(FixedClock(run_instant(1))));

    let preview = orchestrator.preview().await.unwrap();
    assert_eq!(preview.window, "evening");
    assert_eq!(preview.local_hour, 21);
    assert_eq!(preview.due_date, due_date().pred_opt().unwrap());
    assert!(preview.orders.is_empty());

    let summary = orchestrator.run().await.unwrap();
    assert_eq!(counts(&summary), (0, 0, 0));
    assert_eq!(summary.window, "evening");
}
