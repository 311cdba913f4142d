//! Reference time source for resolving relative and partial expressions.
//!
//! "tomorrow" or a bare `5号` only mean something against a reference date.
//! The extractor reads it through [`Clock`] so tests can pin it.

use chrono::{Local, NaiveDate, NaiveDateTime};

/// Supplies the local wall-clock "now" (allows mocking for tests).
pub trait Clock: Send + Sync {
    fn now(&self) -> NaiveDateTime;

    fn today(&self) -> NaiveDate {
        self.now().date()
    }
}

/// Local system time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// A clock frozen at a given instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock(pub NaiveDateTime);

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.0
    }
}
