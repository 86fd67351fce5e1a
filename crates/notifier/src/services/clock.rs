//! Time source for runs.
//!
//! The orchestrator never reads the system clock directly, so tests can pin
//! "now" with [`FixedClock`].

use chrono::{DateTime, Days, NaiveDate, Timelike, Utc};
use chrono_tz::Tz;

/// Provides the current instant.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock frozen at a given instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// An instant viewed in the configured timezone.
#[derive(Debug, Clone, Copy)]
pub struct LocalMoment {
    pub utc: DateTime<Utc>,
    pub local: DateTime<Tz>,
}

impl LocalMoment {
    #[must_use]
    pub fn new(utc: DateTime<Utc>, timezone: Tz) -> Self {
        Self {
            utc,
            local: utc.with_timezone(&timezone),
        }
    }

    /// Local hour of day (0-23).
    #[must_use]
    pub fn hour(&self) -> u32 {
        self.local.hour()
    }

    /// The local calendar day after today.
    #[must_use]
    pub fn tomorrow(&self) -> NaiveDate {
        let today = self.local.date_naive();
        today.checked_add_days(Days::new(1)).unwrap_or(today)
    }
}
