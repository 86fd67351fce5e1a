//! Daily reminder windows.

use serde::{Deserialize, Serialize};

use super::status::ParseStatusError;

/// One of the three daily periods in which an order may receive a reminder.
///
/// Each window owns one reminder flag on the order (`notification_1_sent`,
/// `notification_2_sent`, `notification_3_sent`). "No window" is expressed as
/// `Option<ReminderWindow>::None` so that code which needs a window cannot be
/// handed the absence of one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReminderWindow {
    Morning,
    Afternoon,
    Evening,
}

impl ReminderWindow {
    /// All windows in chronological order.
    pub const ALL: [Self; 3] = [Self::Morning, Self::Afternoon, Self::Evening];

    /// Label used in run summaries when no window is active.
    pub const NONE_LABEL: &'static str = "none";

    /// Persisted window number (1, 2 or 3).
    #[must_use]
    pub const fn number(self) -> i16 {
        match self {
            Self::Morning => 1,
            Self::Afternoon => 2,
            Self::Evening => 3,
        }
    }

    /// Look up a window by its persisted number.
    #[must_use]
    pub const fn from_number(number: i16) -> Option<Self> {
        match number {
            1 => Some(Self::Morning),
            2 => Some(Self::Afternoon),
            3 => Some(Self::Evening),
            _ => None,
        }
    }

    /// Lowercase identifier (`morning`, `afternoon`, `evening`).
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Morning => "morning",
            Self::Afternoon => "afternoon",
            Self::Evening => "evening",
        }
    }

    /// Summary label for an optional window.
    #[must_use]
    pub const fn label(window: Option<Self>) -> &'static str {
        match window {
            Some(window) => window.as_str(),
            None => Self::NONE_LABEL,
        }
    }
}

impl std::fmt::Display for ReminderWindow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ReminderWindow {
    type Err = ParseStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|window| window.as_str() == s)
            .ok_or_else(|| ParseStatusError::new("reminder window", s))
    }
}
