//! Time source for visit timestamps, cookie expiry and save-time filtering

use chrono::Utc;

/// A source of the current time as unix seconds
pub trait Clock: Send {
    fn now(&self) -> i64;
}

/// Wall-clock time
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> i64 {
        Utc::now().timestamp()
    }
}

/// A clock frozen at a given instant, for tests and replay
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub i64);

impl Clock for FixedClock {
    fn now(&self) -> i64 {
        self.0
    }
}
