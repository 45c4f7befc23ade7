use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum TimeUnit {
    Day,
    Week,
    Month,
}

/// A repeat interval such as "every 2 weeks".
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct TimeInterval {
    pub every: u32,
    pub unit: TimeUnit,
}

impl TimeInterval {
    pub fn new(every: u32, unit: TimeUnit) -> Self {
        Self {
            every: every.max(1),
            unit,
        }
    }

    /// Steps `from` forward by one interval, keeping the time of day.
    ///
    /// Month steps clamp to the last day of shorter months.
    pub fn next_after(&self, from: NaiveDateTime) -> NaiveDateTime {
        let every = self.every.max(1);
        match self.unit {
            TimeUnit::Day => from + Duration::days(i64::from(every)),
            TimeUnit::Week => from + Duration::weeks(i64::from(every)),
            TimeUnit::Month => {
                shift_month(from.date(), every as i32).and_time(from.time())
            }
        }
    }
}

/// Moves `date` by `months`, clamping the day to the target month's length.
pub fn shift_month(date: NaiveDate, months: i32) -> NaiveDate {
    let index = date.year() * 12 + date.month0() as i32 + months;
    let year = index.div_euclid(12);
    let month = index.rem_euclid(12) as u32 + 1;
    let day = date.day().min(days_in_month(year, month));
    NaiveDate::from_ymd_opt(year, month, day).unwrap_or(date)
}

/// Whole calendar months from `from` to `to`, ignoring the day of month.
pub fn months_between(from: NaiveDate, to: NaiveDate) -> i32 {
    (to.year() * 12 + to.month0() as i32) - (from.year() * 12 + from.month0() as i32)
}

pub fn days_in_month(year: i32, month: u32) -> u32 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        _ if is_leap_year(year) => 29,
        _ => 28,
    }
}

fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}
