//! Injectable wall clock for diagnosis timestamps
//!
//! Analysis is otherwise a pure function of its inputs; routing the only
//! "current time" read through this trait keeps it reproducible in tests.

use chrono::{DateTime, Utc};

/// Source of the `generatedAt` timestamp
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

/// Reads the system clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Always returns the same instant
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}
