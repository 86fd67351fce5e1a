//! Window schedule inspection.

use chrono::Utc;

use order_reminders_core::ReminderWindow;
use order_reminders_notifier::NotifierConfig;
use order_reminders_notifier::services::{
    AlwaysOnWindows, LocalMoment, ScheduledWindows, WindowClassifier,
};

/// Print the configured ranges and how `hour` (or the current local hour)
/// is classified.
#[allow(clippy::print_stdout)]
pub fn show(config: &NotifierConfig, hour: Option<u32>) {
    let schedule = config.windows;

    println!("Timezone: {}", config.timezone);
    for window in ReminderWindow::ALL {
        println!("  {:<10} {}", window.as_str(), schedule.range(window));
    }

    let hour = hour.unwrap_or_else(|| LocalMoment::new(Utc::now(), config.timezone).hour());
    let scheduled = ScheduledWindows::new(schedule).classify(hour);
    let test_mode = AlwaysOnWindows::new(schedule).classify(hour);

    println!("Hour {hour:02}: {}", ReminderWindow::label(scheduled));
    println!("Hour {hour:02} (test mode): {}", ReminderWindow::label(test_mode));
}
