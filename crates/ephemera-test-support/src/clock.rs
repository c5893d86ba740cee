//! Test clocks — deterministic `Clock` implementations for tests.

use std::sync::Mutex;

use chrono::{DateTime, TimeDelta, TimeZone, Utc};
use ephemera_core::clock::Clock;

/// The instant every test clock starts from unless told otherwise.
///
/// # Panics
///
/// Never; the date literal is valid.
#[must_use]
pub fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 1, 15, 10, 0, 0).unwrap()
}

/// A clock that always returns a fixed point in time.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// A clock that only moves when a test tells it to. Used to drive fragment
/// decay one frame at a time.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    /// Creates a clock frozen at `start`.
    #[must_use]
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    /// Creates a clock frozen at [`fixed_now`].
    #[must_use]
    pub fn starting_now() -> Self {
        Self::new(fixed_now())
    }

    /// Moves the clock forward by `millis` milliseconds.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn advance_millis(&self, millis: i64) {
        let mut now = self.now.lock().unwrap();
        *now += TimeDelta::milliseconds(millis);
    }

    /// Jumps to an absolute instant.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn set(&self, instant: DateTime<Utc>) {
        *self.now.lock().unwrap() = instant;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap()
    }
}
