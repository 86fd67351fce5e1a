//! Domain models for the notifier.
//!
//! - [`order`] - Orders, their per-window reminder flags and due-order projections
//! - [`subscription`] - Registered push endpoints
//! - [`notification_log`] - Append-only delivery audit rows

pub mod notification_log;
pub mod order;
pub mod subscription;

pub use notification_log::{NewNotificationLog, NotificationLog, REMINDER_NOTIFICATION_TYPE};
pub use order::{DueOrder, Order, ReminderFlag, User};
pub use subscription::PushSubscription;
