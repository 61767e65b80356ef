//! Time source abstraction.
//!
//! Offline progress and every recorded timestamp read the current time
//! through [`Clock`], so tests and replays can pin or step time explicitly.

use std::cell::Cell;

use chrono::{DateTime, Duration, Utc};

/// Supplies the current instant.
pub trait Clock {
    /// The current instant.
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock frozen at one instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// A clock that only moves when told to.
///
/// Used by the turn driver to map each turn onto a fixed slice of
/// simulated time.
#[derive(Debug, Clone)]
pub struct ManualClock {
    current: Cell<DateTime<Utc>>,
}

impl ManualClock {
    /// Start the clock at `start`.
    pub const fn starting_at(start: DateTime<Utc>) -> Self {
        Self {
            current: Cell::new(start),
        }
    }

    /// Move the clock forward by `seconds`. Saturates at the maximum
    /// representable instant.
    pub fn advance_secs(&self, seconds: u64) {
        let step = i64::try_from(seconds)
            .ok()
            .and_then(Duration::try_seconds)
            .unwrap_or(Duration::MAX);
        let next = self
            .current
            .get()
            .checked_add_signed(step)
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        self.current.set(next);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        self.current.get()
    }
}
