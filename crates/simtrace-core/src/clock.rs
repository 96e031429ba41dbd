//! Wall-clock abstraction.
//!
//! Everything time-dependent (episode timing, speed, checkpoint timestamps)
//! reads an injected [`Clock`] so tests can drive time explicitly.

use std::sync::Mutex;

use chrono::{DateTime, Duration, Utc};

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// The real clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    /// A clock starting at the Unix epoch plus `millis`.
    pub fn at_millis(millis: i64) -> Self {
        Self::new(DateTime::<Utc>::default() + Duration::milliseconds(millis))
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap_or_else(|e| e.into_inner());
        *now += by;
    }

    pub fn advance_millis(&self, millis: i64) {
        self.advance(Duration::milliseconds(millis));
    }

    pub fn set(&self, to: DateTime<Utc>) {
        *self.now.lock().unwrap_or_else(|e| e.into_inner()) = to;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Whole milliseconds from `from` to `to` (negative if `to` is earlier).
pub fn elapsed_millis(from: DateTime<Utc>, to: DateTime<Utc>) -> i64 {
    (to - from).num_milliseconds()
}

/// Seconds from `from` to `to` as a float (negative if `to` is earlier).
pub fn elapsed_seconds(from: DateTime<Utc>, to: DateTime<Utc>) -> f64 {
    match (to - from).num_microseconds() {
        Some(us) => us as f64 / 1_000_000.0,
        None => (to - from).num_milliseconds() as f64 / 1_000.0,
    }
}
