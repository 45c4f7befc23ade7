use chrono::{Local, NaiveDate, NaiveDateTime};

/// Clock abstracts access to the current local time so the engine stays deterministic in tests.
pub trait Clock: Send + Sync {
    /// Returns the current local wall-clock instant.
    fn now(&self) -> NaiveDateTime;

    /// Returns the current local date. Defaults to `now().date()`.
    fn today(&self) -> NaiveDate {
        self.now().date()
    }
}

/// Reads the host's local time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// Always reports the same instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDateTime);

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.0
    }
}

/// Midnight at the start of `day`.
pub fn start_of_day(day: NaiveDate) -> NaiveDateTime {
    day.and_time(chrono::NaiveTime::MIN)
}
