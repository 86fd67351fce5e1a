//! Notification payload composition.

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use order_reminders_core::{OrderId, ReminderWindow};

use crate::models::DueOrder;

/// Payload delivered to the service worker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationPayload {
    pub title: String,
    pub body: String,
    pub icon: String,
    pub badge: String,
    /// Collapses repeated notifications for the same order and window.
    pub tag: String,
    pub require_interaction: bool,
    pub data: NotificationData,
}

/// Data the client uses when the notification is activated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationData {
    pub order_id: OrderId,
    pub order_number: String,
    /// ISO date (`YYYY-MM-DD`).
    pub date: String,
    /// 24-hour time (`HH:MM`).
    pub time: String,
    pub window: i16,
    pub url: String,
}

impl NotificationPayload {
    /// Serialize for the wire.
    #[must_use]
    pub fn to_json(&self) -> String {
        // Only strings, integers and bools; serialization cannot fail.
        serde_json::to_string(self).unwrap_or_default()
    }
}

const fn glyph(window: ReminderWindow) -> &'static str {
    match window {
        ReminderWindow::Morning => "🌅",
        ReminderWindow::Afternoon => "☀️",
        ReminderWindow::Evening => "🌙",
    }
}

const fn title_label(window: ReminderWindow) -> &'static str {
    match window {
        ReminderWindow::Morning => "Morning Order Reminder",
        ReminderWindow::Afternoon => "Afternoon Order Reminder",
        ReminderWindow::Evening => "Evening Order Reminder",
    }
}

const fn phrase(window: ReminderWindow) -> &'static str {
    match window {
        ReminderWindow::Morning => "Good morning! Just a reminder that",
        ReminderWindow::Afternoon => "Afternoon check-in:",
        ReminderWindow::Evening => "Evening heads-up:",
    }
}

/// `Sunday, October 18, 2026`
#[must_use]
pub fn format_long_date(date: NaiveDate) -> String {
    date.format("%A, %B %-d, %Y").to_string()
}

/// `2:30 PM`
#[must_use]
pub fn format_time_12h(time: NaiveTime) -> String {
    time.format("%-I:%M %p").to_string()
}

/// Builds reminder payloads for one deployment.
#[derive(Debug, Clone, Default)]
pub struct NotificationComposer {
    base_path: String,
}

impl NotificationComposer {
    /// `base_path` is expected to be normalized (see
    /// [`normalize_base_path`](crate::config::normalize_base_path)).
    #[must_use]
    pub fn new(base_path: impl Into<String>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    /// Compose the reminder for `order` in `window`.
    #[must_use]
    pub fn compose(&self, window: ReminderWindow, order: &DueOrder) -> NotificationPayload {
        let title = format!("{} {}", glyph(window), title_label(window));
        let body = format!(
            "{} order #{} is scheduled for tomorrow, {} at {}.",
            phrase(window),
            order.order_number,
            format_long_date(order.scheduled_date),
            format_time_12h(order.scheduled_time),
        );

        NotificationPayload {
            title,
            body,
            icon: format!("{}/icons/icon-192.png", self.base_path),
            badge: format!("{}/icons/badge-72.png", self.base_path),
            tag: format!("order-reminder-{}-{}", window.as_str(), order.id),
            require_interaction: true,
            data: NotificationData {
                order_id: order.id,
                order_number: order.order_number.clone(),
                date: order.scheduled_date.format("%Y-%m-%d").to_string(),
                time: order.scheduled_time.format("%H:%M").to_string(),
                window: window.number(),
                url: format!("{}/orders/{}", self.base_path, order.id),
            },
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use order_reminders_core::{OrderStatus, UserId};

    use super::*;

    fn due_order() -> DueOrder {
        DueOrder {
            id: OrderId::new(42),
            user_id: UserId::new(7),
            order_number: "ORD-2026-0042".to_string(),
            scheduled_date: NaiveDate::from_ymd_opt(2026, 10, 18).unwrap(),
            scheduled_time: NaiveTime::from_hms_opt(14, 30, 0).unwrap(),
            status: OrderStatus::Pending,
            username: "maria".to_string(),
            email: "maria@example.com".to_string(),
        }
    }

    #[test]
    fn test_formatting() {
        assert_eq!(
            format_long_date(NaiveDate::from_ymd_opt(2026, 10, 18).unwrap()),
            "Sunday, October 18, 2026"
        );
        assert_eq!(format_time_12h(NaiveTime::from_hms_opt(14, 30, 0).unwrap()), "2:30 PM");
        assert_eq!(format_time_12h(NaiveTime::from_hms_opt(9, 5, 0).unwrap()), "9:05 AM");
        assert_eq!(format_time_12h(NaiveTime::from_hms_opt(0, 0, 0).unwrap()), "12:00 AM");
    }

    #[test]
    fn test_morning_payload() {
        let payload = NotificationComposer::new("/app").compose(ReminderWindow::Morning, &due_order());

        assert_eq!(payload.title, "🌅 Morning Order Reminder");
        assert_eq!(
            payload.body,
            "Good morning! Just a reminder that order #ORD-2026-0042 is scheduled for tomorrow, Sunday, October 18, 2026 at 2:30 PM."
        );
        assert!(!payload.body.contains('\n'));
        assert_eq!(payload.tag, "order-reminder-morning-42");
        assert_eq!(payload.data.url, "/app/orders/42");
        assert_eq!(payload.data.date, "2026-10-18");
        assert_eq!(payload.data.time, "14:30");
        assert_eq!(payload.data.window, 1);
    }

    #[test]
    fn test_tag_unique_per_window() {
        let composer = NotificationComposer::default();
        let order = due_order();
        let tags: Vec<String> = ReminderWindow::ALL
            .into_iter()
            .map(|w| composer.compose(w, &order).tag)
            .collect();

        assert_eq!(tags.len(), 3);
        assert_ne!(tags[0], tags[1]);
        assert_ne!(tags[1], tags[2]);
        assert_ne!(tags[0], tags[2]);
    }

    #[test]
    fn test_empty_base_path_gives_root_relative_links() {
        let payload = NotificationComposer::default().compose(ReminderWindow::Evening, &due_order());
        assert_eq!(payload.data.url, "/orders/42");
        assert_eq!(payload.icon, "/icons/icon-192.png");
        assert_eq!(payload.title, "🌙 Evening Order Reminder");
    }

    #[test]
    fn test_json_uses_camel_case() {
        let payload = NotificationComposer::default().compose(ReminderWindow::Afternoon, &due_order());
        let json: serde_json::Value = serde_json::from_str(&payload.to_json()).unwrap();

        assert_eq!(json["requireInteraction"], true);
        assert_eq!(json["data"]["orderId"], 42);
        assert_eq!(json["data"]["orderNumber"], "ORD-2026-0042");
        assert_eq!(json["data"]["window"], 2);
    }
}
