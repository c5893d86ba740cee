//! Clock abstraction for determinism.
//!
//! Fragment ages are measured against this clock rather than the wall clock
//! so that decay can be driven step by step in tests.

use chrono::{DateTime, TimeDelta, Utc};

/// Abstraction over system time.
pub trait Clock: Send + Sync {
    /// Returns the current time.
    fn now(&self) -> DateTime<Utc>;

    /// Time elapsed between `earlier` and now. Negative if `earlier` lies in
    /// the future of this clock.
    fn elapsed_since(&self, earlier: DateTime<Utc>) -> TimeDelta {
        self.now() - earlier
    }
}

/// Production clock that delegates to the system clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
