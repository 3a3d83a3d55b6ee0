use chrono::{Local, NaiveDate};

/// Source of the calendar date that partitions the rate cache.
pub trait Clock: Send + Sync {
    fn today(&self) -> NaiveDate;
}

/// The local calendar date of the running process.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// Always reports the same date.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}
