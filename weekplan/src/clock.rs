//! Wall-clock source injected into the planner.
//!
//! "Today", the selected weekday and reminder timing all depend on local
//! time, so the planner never calls `Local::now()` directly.

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, Utc};
use parking_lot::Mutex;

use weekplan_model::Day;

/// Source of the current time.
pub trait Clock: Send + Sync {
    /// Current instant, used for `createdAt` / `completedAt` stamps.
    fn now(&self) -> DateTime<Utc>;

    /// Current local wall-clock time, used for "today" and reminders.
    fn local_now(&self) -> NaiveDateTime;

    /// Today's local calendar date.
    fn today(&self) -> NaiveDate {
        self.local_now().date()
    }

    /// Today's weekday bucket.
    fn weekday(&self) -> Day {
        Day::of_date(self.today())
    }
}

/// The operating system clock in the local timezone.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn local_now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// A settable clock for tests and replays. Local time is treated as UTC.
#[derive(Debug)]
pub struct FixedClock {
    now: Mutex<NaiveDateTime>,
}

impl FixedClock {
    /// A clock frozen at `local`.
    #[must_use]
    pub fn new(local: NaiveDateTime) -> Self {
        Self {
            now: Mutex::new(local),
        }
    }

    /// Moves the clock forward.
    pub fn advance(&self, by: chrono::Duration) {
        let mut now = self.now.lock();
        *now += by;
    }

    /// Jumps to `local`.
    pub fn set(&self, local: NaiveDateTime) {
        *self.now.lock() = local;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.now.lock().and_utc()
    }

    fn local_now(&self) -> NaiveDateTime {
        *self.now.lock()
    }
}
