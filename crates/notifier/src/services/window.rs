//! Reminder window classification.
//!
//! A run belongs to at most one window, decided purely from the local hour.
//! Two strategies implement [`WindowClassifier`]:
//!
//! - [`ScheduledWindows`] - the production policy; hours outside every
//!   configured range have no window.
//! - [`AlwaysOnWindows`] - a test-mode policy that maps every hour of the day
//!   onto one of the three windows so the pipeline can be exercised at any time.

use order_reminders_core::ReminderWindow;
use thiserror::Error;

/// Errors raised when building hour ranges or a window schedule.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScheduleError {
    /// Range is empty, reversed or extends past midnight.
    #[error("invalid hour range {start}-{end}: need 0 <= start < end <= 24")]
    InvalidRange { start: u32, end: u32 },

    /// Two windows share at least one hour.
    #[error("{first} and {second} windows overlap")]
    Overlap {
        first: ReminderWindow,
        second: ReminderWindow,
    },
}

/// Half-open range of hours `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HourRange {
    start: u32,
    end: u32,
}

impl HourRange {
    /// Create a range covering `start..end`.
    ///
    /// # Errors
    ///
    /// Returns [`ScheduleError::InvalidRange`] unless `start < end <= 24`.
    pub const fn new(start: u32, end: u32) -> Result<Self, ScheduleError> {
        if start < end && end <= 24 {
            Ok(Self { start, end })
        } else {
            Err(ScheduleError::InvalidRange { start, end })
        }
    }

    #[must_use]
    pub const fn start(&self) -> u32 {
        self.start
    }

    #[must_use]
    pub const fn end(&self) -> u32 {
        self.end
    }

    #[must_use]
    pub const fn contains(&self, hour: u32) -> bool {
        self.start <= hour && hour < self.end
    }

    const fn overlaps(&self, other: &Self) -> bool {
        self.start < other.end && other.start < self.end
    }
}

impl std::fmt::Display for HourRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:02}:00-{:02}:00", self.start, self.end)
    }
}

/// Hour ranges of the three daily windows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowSchedule {
    pub morning: HourRange,
    pub afternoon: HourRange,
    pub evening: HourRange,
}

impl Default for WindowSchedule {
    fn default() -> Self {
        Self {
            morning: HourRange { start: 8, end: 13 },
            afternoon: HourRange { start: 13, end: 19 },
            evening: HourRange { start: 19, end: 23 },
        }
    }
}

impl WindowSchedule {
    /// Build a schedule, rejecting overlapping windows.
    ///
    /// # Errors
    ///
    /// Returns [`ScheduleError::Overlap`] naming the first pair that overlaps.
    pub fn new(
        morning: HourRange,
        afternoon: HourRange,
        evening: HourRange,
    ) -> Result<Self, ScheduleError> {
        let schedule = Self {
            morning,
            afternoon,
            evening,
        };

        for (i, first) in ReminderWindow::ALL.iter().enumerate() {
            for second in ReminderWindow::ALL.iter().skip(i + 1) {
                if schedule.range(*first).overlaps(&schedule.range(*second)) {
                    return Err(ScheduleError::Overlap {
                        first: *first,
                        second: *second,
                    });
                }
            }
        }

        Ok(schedule)
    }

    /// Range configured for `window`.
    #[must_use]
    pub const fn range(&self, window: ReminderWindow) -> HourRange {
        match window {
            ReminderWindow::Morning => self.morning,
            ReminderWindow::Afternoon => self.afternoon,
            ReminderWindow::Evening => self.evening,
        }
    }
}

/// Strategy that decides which window an hour of the day belongs to.
pub trait WindowClassifier: Send + Sync {
    /// Classify a local hour (0-23). Returns `None` outside every window.
    fn classify(&self, hour: u32) -> Option<ReminderWindow>;

    /// Short name used in logs.
    fn name(&self) -> &'static str;
}

/// Production classifier: an hour belongs to the window whose range contains it.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScheduledWindows {
    schedule: WindowSchedule,
}

impl ScheduledWindows {
    #[must_use]
    pub const fn new(schedule: WindowSchedule) -> Self {
        Self { schedule }
    }

    #[must_use]
    pub const fn schedule(&self) -> &WindowSchedule {
        &self.schedule
    }
}

impl WindowClassifier for ScheduledWindows {
    fn classify(&self, hour: u32) -> Option<ReminderWindow> {
        ReminderWindow::ALL
            .into_iter()
            .find(|window| self.schedule.range(*window).contains(hour))
    }

    fn name(&self) -> &'static str {
        "scheduled"
    }
}

/// Test-mode classifier: every hour maps to some window.
///
/// Hours before the afternoon window start count as morning, hours from the
/// afternoon start up to the evening start count as afternoon, and everything
/// later counts as evening.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysOnWindows {
    schedule: WindowSchedule,
}

impl AlwaysOnWindows {
    #[must_use]
    pub const fn new(schedule: WindowSchedule) -> Self {
        Self { schedule }
    }
}

impl WindowClassifier for AlwaysOnWindows {
    fn classify(&self, hour: u32) -> Option<ReminderWindow> {
        let window = if hour < self.schedule.afternoon.start() {
            ReminderWindow::Morning
        } else if hour < self.schedule.evening.start() {
            ReminderWindow::Afternoon
        } else {
            ReminderWindow::Evening
        };
        Some(window)
    }

    fn name(&self) -> &'static str {
        "always-on"
    }
}
