//! Integration tests for delivery and store failures during a run.
//!
//! Failures are per subscription or per order; none of them may stop the
//! rest of the run.

#![allow(clippy::unwrap_used)]

use order_reminders_core::{DeliveryStatus, ReminderWindow};
use order_reminders_integration_tests::{Fixture, Verdict};
use order_reminders_notifier::NotifierError;

// =============================================================================
// Multi-Device Tests
// =============================================================================

#[tokio::test]
async fn test_transient_failure_on_one_device_still_sends() {
    let fx = Fixture::new();
    let user = fx.user(1);
    let order = fx.order(10, user, 9);
    let flaky = fx.subscribe(user, "https://push.example/flaky");
    let healthy = fx.subscribe(user, "https://push.example/healthy");
    fx.transport.script("https://push.example/flaky", Verdict::Unreachable);

    let summary = fx.orchestrator_at(9).run().await.unwrap();

    assert_eq!((summary.sent, summary.failed), (1, 0));
    assert!(fx.order_state(order).reminder(ReminderWindow::Morning).is_sent());
    assert_eq!(fx.store.subscriptions().len(), 2);

    let logs = fx.store.logs();
    assert_eq!(logs.len(), 1);
    assert_eq!(logs[0].status, DeliveryStatus::Sent);
    assert!(logs[0].message.contains(&format!("subscription {flaky} failed")));
    assert!(!logs[0].message.contains(&format!("subscription {healthy}")));
}

#[tokio::test]
async fn test_expired_subscription_is_removed_alone() {
    let fx = Fixture::new();
    let user = fx.user(1);
    let other = fx.user(2);
    fx.order(10, user, 9);
    fx.subscribe(user, "https://push.example/gone");
    fx.subscribe(user, "https://push.example/phone");
    fx.subscribe(other, "https://push.example/other");
    fx.transport.script("https://push.example/gone", Verdict::Expire);

    let summary = fx.orchestrator_at(9).run().await.unwrap();

    assert_eq!(summary.sent, 1);
    let endpoints: Vec<String> = fx.store.subscriptions().into_iter().map(|s| s.endpoint).collect();
    assert_eq!(
        endpoints,
        vec!["https://push.example/phone", "https://push.example/other"]
    );
    assert!(fx.store.logs()[0].message.contains("expired (HTTP 410)"));
}

#[tokio::test]
async fn test_all_devices_failing_leaves_order_unflagged() {
    let fx = Fixture::new();
    let user = fx.user(1);
    let order = fx.order(10, user, 9);
    fx.subscribe(user, "https://push.example/gone");
    fx.subscribe(user, "https://push.example/busy");
    fx.transport.script("https://push.example/gone", Verdict::Expire);
    fx.transport.script("https://push.example/busy", Verdict::Reject(503));

    let summary = fx.orchestrator_at(9).run().await.unwrap();

    assert_eq!((summary.processed, summary.sent, summary.failed), (1, 0, 1));
    assert!(!fx.order_state(order).reminder(ReminderWindow::Morning).is_sent());
    assert!(fx.store.mark_sent_calls().is_empty());

    let remaining: Vec<String> = fx.store.subscriptions().into_iter().map(|s| s.endpoint).collect();
    assert_eq!(remaining, vec!["https://push.example/busy"]);

    let logs = fx.store.logs();
    assert_eq!(logs[0].status, DeliveryStatus::Failed);
    assert!(logs[0].message.starts_with("Delivery failed: "));
    assert!(logs[0].message.contains("HTTP 410"));
    assert!(logs[0].message.contains("HTTP 503"));
}

#[tokio::test]
async fn test_device_without_keys_is_skipped() {
    let fx = Fixture::new();
    let user = fx.user(1);
    fx.order(10, user, 9);
    fx.store
        .insert_subscription(user, "https://push.example/legacy", None, Some("auth"));

    let summary = fx.orchestrator_at(9).run().await.unwrap();

    assert_eq!((summary.sent, summary.failed), (0, 1));
    assert!(fx.transport.messages().is_empty());
    assert_eq!(fx.store.subscriptions().len(), 1);
    assert!(fx.store.logs()[0].message.contains("missing encryption keys"));
}

#[tokio::test]
async fn test_order_flagged_once_for_many_devices() {
    let fx = Fixture::new();
    let user = fx.user(1);
    let order = fx.order(10, user, 9);
    for device in ["a", "b", "c"] {
        fx.subscribe(user, &format!("https://push.example/{device}"));
    }

    let summary = fx.orchestrator_at(9).run().await.unwrap();

    assert_eq!(summary.sent, 1);
    assert_eq!(fx.transport.messages().len(), 3);
    assert_eq!(
        fx.store.mark_sent_calls(),
        vec![(order, ReminderWindow::Morning)]
    );
    assert_eq!(fx.store.logs().len(), 1);
}

// =============================================================================
// Store Failure Tests
// =============================================================================

#[tokio::test]
async fn test_subscription_lookup_failure_is_isolated() {
    let fx = Fixture::new();
    let first = fx.user(1);
    let broken = fx.user(2);
    let last = fx.user(3);
    let order_first = fx.order(1, first, 8);
    let order_broken = fx.order(2, broken, 9);
    let order_last = fx.order(3, last, 10);
    for user in [first, broken, last] {
        fx.subscribe(user, &format!("https://push.example/{user}"));
    }
    fx.store.fail_subscription_lookup_for(broken);

    let summary = fx.orchestrator_at(9).run().await.unwrap();

    assert_eq!((summary.processed, summary.sent, summary.failed), (3, 2, 1));
    assert!(fx.order_state(order_first).reminder(ReminderWindow::Morning).is_sent());
    assert!(!fx.order_state(order_broken).reminder(ReminderWindow::Morning).is_sent());
    assert!(fx.order_state(order_last).reminder(ReminderWindow::Morning).is_sent());
    assert_eq!(
        fx.transport.endpoints(),
        vec!["https://push.example/1", "https://push.example/3"]
    );
}

#[tokio::test]
async fn test_log_failure_after_delivery_still_counts_as_sent() {
    let fx = Fixture::new();
    let user = fx.user(1);
    let order = fx.order(10, user, 9);
    fx.subscribe(user, "https://push.example/one");
    fx.store.fail_log_insert();

    let summary = fx.orchestrator_at(9).run().await.unwrap();

    assert_eq!((summary.processed, summary.sent, summary.failed), (1, 1, 0));
    assert!(fx.order_state(order).reminder(ReminderWindow::Morning).is_sent());
    assert!(fx.store.logs().is_empty());

    let rerun = fx.orchestrator_at(10).run().await.unwrap();
    assert_eq!(rerun.processed, 0);
    assert_eq!(fx.transport.messages().len(), 1);
}

#[tokio::test]
async fn test_flag_failure_after_delivery_still_logs_sent() {
    let fx = Fixture::new();
    let user = fx.user(1);
    let order = fx.order(10, user, 9);
    let next = fx.order(11, user, 10);
    fx.subscribe(user, "https://push.example/one");
    fx.store.fail_mark_sent_for(order);

    let summary = fx.orchestrator_at(9).run().await.unwrap();

    assert_eq!((summary.processed, summary.sent, summary.failed), (2, 2, 0));
    assert!(!fx.order_state(order).reminder(ReminderWindow::Morning).is_sent());
    assert!(fx.order_state(next).reminder(ReminderWindow::Morning).is_sent());

    let logs = fx.store.logs();
    assert_eq!(logs.len(), 2);
    assert_eq!(logs[0].order_id, order);
    assert_eq!(logs[0].status, DeliveryStatus::Sent);
    assert_eq!(
        fx.store.mark_sent_calls(),
        vec![(order, ReminderWindow::Morning), (next, ReminderWindow::Morning)]
    );
}

#[tokio::test]
async fn test_order_selection_failure_aborts_run() {
    let fx = Fixture::new();
    let user = fx.user(1);
    fx.order(10, user, 9);
    fx.subscribe(user, "https://push.example/one");
    fx.store.fail_order_selection();

    let result = fx.orchestrator_at(9).run().await;

    assert!(matches!(result, Err(NotifierError::StoreQuery(_))));
    assert!(fx.transport.messages().is_empty());
    assert!(fx.store.logs().is_empty());
}
