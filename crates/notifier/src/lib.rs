//! Order Reminders Notifier - scheduled push reminders for tomorrow's orders.
//!
//! A run, triggered externally (e.g. hourly from cron):
//!
//! 1. classifies the current local hour into a reminder window
//! 2. selects tomorrow's orders still owed that window's reminder
//! 3. sends one push notification per order to every device of its owner
//! 4. flags delivered orders and appends one audit row per order
//! 5. returns a [`RunSummary`] of processed / sent / failed orders
//!
//! Running again in the same window is harmless: flagged orders are no
//! longer selected.
//!
//! # Modules
//!
//! - [`config`] - Environment configuration
//! - [`db`] - `PostgreSQL` pool, migrations and queries
//! - [`store`] - Storage boundary ([`ReminderStore`]) with `PostgreSQL` and in-memory backends
//! - [`push`] - Delivery boundary ([`PushTransport`]) and the per-subscription dispatcher
//! - [`services`] - Window classification, composition, recording and orchestration

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod push;
pub mod services;
pub mod store;

pub use config::NotifierConfig;
pub use error::NotifierError;
pub use push::{GatewayTransport, PushTransport, UnavailableTransport};
pub use services::{NotificationOrchestrator, RunSummary};
pub use store::{MemoryStore, PgReminderStore, ReminderStore};
