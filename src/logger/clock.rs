//! Time source and time-bucket labels.

use std::sync::{Arc, Mutex, PoisonError};

use chrono::{DateTime, Local};

/// Source of the current wall-clock time.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Local>;
}

/// The host clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Local> {
        Local::now()
    }
}

/// A clock that only moves when told to. Clones share the same time.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Arc<Mutex<DateTime<Local>>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Local>) -> Self {
        Self {
            now: Arc::new(Mutex::new(start)),
        }
    }

    pub fn advance(&self, by: chrono::Duration) {
        let mut now = self.now.lock().unwrap_or_else(PoisonError::into_inner);
        *now += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Local> {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Date, hour and minute labels of one instant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeBucket {
    /// `YYYYMMDD`
    pub date: String,
    /// `HH`
    pub hour: String,
    /// `MM`
    pub minute: String,
}

impl TimeBucket {
    pub fn at(now: &DateTime<Local>) -> Self {
        Self {
            date: now.format("%Y%m%d").to_string(),
            hour: now.format("%H").to_string(),
            minute: now.format("%M").to_string(),
        }
    }
}

/// Milliseconds since the Unix epoch.
pub fn epoch_millis(now: &DateTime<Local>) -> i64 {
    now.timestamp_millis()
}
