//! Reminder run services.
//!
//! # Services
//!
//! - `clock` - Injectable time source and timezone helpers
//! - `window` - Reminder window schedule and classification strategies
//! - `composer` - Notification payload construction
//! - `recorder` - Reminder flags and audit log writes
//! - `orchestrator` - One run: classify, select, dispatch, record, summarize

pub mod clock;
pub mod composer;
pub mod orchestrator;
pub mod recorder;
pub mod window;

pub use clock::{Clock, FixedClock, LocalMoment, SystemClock};
pub use composer::{NotificationComposer, NotificationData, NotificationPayload};
pub use orchestrator::{NotificationOrchestrator, RunPreview, RunSummary};
pub use recorder::{DeliveryRecorder, NO_SUBSCRIPTIONS_MESSAGE};
pub use window::{
    AlwaysOnWindows, HourRange, ScheduleError, ScheduledWindows, WindowClassifier, WindowSchedule,
};
