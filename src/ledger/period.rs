//! Period and bucket boundaries.
//!
//! Every interval here is half-open: `start` is inclusive and `end` exclusive.

use std::{fmt, str::FromStr};

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use super::time_interval::{months_between, shift_month};
use crate::{clock::start_of_day, config::CalendarConfig, errors::EngineError};

pub const DAYS_PER_WEEK: i64 = 7;
pub const MONTHS_PER_YEAR: i32 = 12;

/// Budget and reporting period kinds, stored by their numeric code.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(try_from = "u8", into = "u8")]
pub enum PeriodKind {
    Day,
    Week,
    Month,
    Year,
    AllTime,
}

impl PeriodKind {
    pub fn code(self) -> u8 {
        match self {
            Self::Day => 1,
            Self::Week => 2,
            Self::Month => 3,
            Self::Year => 4,
            Self::AllTime => 5,
        }
    }

    /// Sub-period size used for breakdowns inside a window of this kind.
    pub fn granularity(self) -> Granularity {
        match self {
            Self::Day | Self::Week | Self::Month => Granularity::Day,
            Self::Year | Self::AllTime => Granularity::Month,
        }
    }
}

impl TryFrom<u8> for PeriodKind {
    type Error = EngineError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            1 => Ok(Self::Day),
            2 => Ok(Self::Week),
            3 => Ok(Self::Month),
            4 => Ok(Self::Year),
            5 => Ok(Self::AllTime),
            other => Err(EngineError::InvalidConfiguration(format!(
                "unknown period kind code {other}"
            ))),
        }
    }
}

impl From<PeriodKind> for u8 {
    fn from(kind: PeriodKind) -> Self {
        kind.code()
    }
}

impl FromStr for PeriodKind {
    type Err = EngineError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "day" | "daily" => Ok(Self::Day),
            "week" | "weekly" => Ok(Self::Week),
            "month" | "monthly" => Ok(Self::Month),
            "year" | "yearly" => Ok(Self::Year),
            "all" | "all-time" | "alltime" => Ok(Self::AllTime),
            other => other
                .parse::<u8>()
                .map_err(|_| {
                    EngineError::InvalidConfiguration(format!("unknown period kind `{other}`"))
                })
                .and_then(Self::try_from),
        }
    }
}

/// A `[start, end)` range produced by [`compute_period`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Period {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl Period {
    pub fn contains(&self, at: NaiveDateTime) -> bool {
        self.start <= at && at < self.end
    }
}

/// Computes the period of `kind` that contains `now`.
pub fn compute_period(now: NaiveDateTime, kind: PeriodKind, config: &CalendarConfig) -> Period {
    let today = now.date();
    let (start, end) = match kind {
        PeriodKind::Day => (today, today + Duration::days(1)),
        PeriodKind::Week => {
            let week_start = config.week_start().num_days_from_sunday() as i64;
            let current = today.weekday().num_days_from_sunday() as i64;
            let back = (current - week_start).rem_euclid(DAYS_PER_WEEK);
            let start = today - Duration::days(back);
            (start, start + Duration::days(DAYS_PER_WEEK))
        }
        PeriodKind::Month => {
            let start = month_period_start(today, config.month_start_day());
            (start, shift_month(start, 1))
        }
        PeriodKind::Year => {
            let start = today - Duration::days(i64::from(today.ordinal0()));
            (start, shift_month(start, MONTHS_PER_YEAR))
        }
        PeriodKind::AllTime => (NaiveDate::MIN, NaiveDate::MAX),
    };
    Period {
        start: start_of_day(start),
        end: start_of_day(end),
    }
}

/// Start of the custom month containing `today`: day `start_day` of this month, or of the
/// previous month when `today` falls before it.
fn month_period_start(today: NaiveDate, start_day: u32) -> NaiveDate {
    let first = today - Duration::days(i64::from(today.day0()));
    let base = if today.day() < start_day {
        shift_month(first, -1)
    } else {
        first
    };
    base + Duration::days(i64::from(start_day.saturating_sub(1)))
}

/// Sub-period size of a window breakdown.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    Day,
    Month,
}

/// One aggregation unit inside a window.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Bucket {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub label: String,
}

/// The overall `[start, end)` range being summarised, split into buckets of `granularity`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Window {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub granularity: Granularity,
}

impl Window {
    /// Returns `None` unless `end > start`.
    pub fn new(start: NaiveDateTime, end: NaiveDateTime, granularity: Granularity) -> Option<Self> {
        (end > start).then_some(Self {
            start,
            end,
            granularity,
        })
    }

    /// The window of `kind` containing `now`.
    ///
    /// Returns `None` for [`PeriodKind::AllTime`], which has no natural bounds to bucket;
    /// build those with [`Window::all_time`].
    pub fn for_period(
        now: NaiveDateTime,
        kind: PeriodKind,
        config: &CalendarConfig,
    ) -> Option<Self> {
        if kind == PeriodKind::AllTime {
            return None;
        }
        let period = compute_period(now, kind, config);
        Some(Self {
            start: period.start,
            end: period.end,
            granularity: kind.granularity(),
        })
    }

    /// Monthly window from the month of `earliest` through the month containing `now`.
    pub fn all_time(earliest: NaiveDate, now: NaiveDateTime) -> Self {
        let first = earliest.min(now.date());
        let start = first - Duration::days(i64::from(first.day0()));
        let current = now.date() - Duration::days(i64::from(now.date().day0()));
        Self {
            start: start_of_day(start),
            end: start_of_day(shift_month(current, 1)),
            granularity: Granularity::Month,
        }
    }

    pub fn contains(&self, at: NaiveDateTime) -> bool {
        self.start <= at && at < self.end
    }

    fn first_day(&self) -> NaiveDate {
        self.start.date()
    }

    fn last_day(&self) -> NaiveDate {
        (self.end - Duration::nanoseconds(1)).date()
    }

    /// Nominal number of buckets in the window.
    pub fn bucket_count(&self) -> usize {
        let span = match self.granularity {
            Granularity::Day => (self.last_day() - self.first_day()).num_days(),
            Granularity::Month => i64::from(months_between(self.first_day(), self.last_day())),
        };
        usize::try_from(span + 1).unwrap_or(0)
    }

    /// Index of the bucket containing `at`, computed without walking the calendar.
    pub fn bucket_index(&self, at: NaiveDateTime) -> Option<usize> {
        if !self.contains(at) {
            return None;
        }
        let offset = match self.granularity {
            Granularity::Day => (at.date() - self.first_day()).num_days(),
            Granularity::Month => i64::from(months_between(self.first_day(), at.date())),
        };
        usize::try_from(offset).ok()
    }

    /// Buckets elapsed by `now`, counting the one in progress.
    pub fn elapsed_buckets(&self, now: NaiveDateTime) -> usize {
        if now < self.start {
            0
        } else if now >= self.end {
            self.bucket_count()
        } else {
            self.bucket_index(now).map(|index| index + 1).unwrap_or(0)
        }
    }

    /// Materialises the bucket boundaries. Days are regular; months are stepped one by one.
    pub fn buckets(&self) -> Vec<Bucket> {
        let count = self.bucket_count();
        let mut buckets = Vec::with_capacity(count);
        match self.granularity {
            Granularity::Day => {
                let first = self.first_day();
                for offset in 0..count as i64 {
                    let day = first + Duration::days(offset);
                    buckets.push(Bucket {
                        start: start_of_day(day),
                        end: start_of_day(day + Duration::days(1)),
                        label: day.format("%b %-d").to_string(),
                    });
                }
            }
            Granularity::Month => {
                let first = self.first_day();
                let mut month = first - Duration::days(i64::from(first.day0()));
                for _ in 0..count {
                    let next = shift_month(month, 1);
                    buckets.push(Bucket {
                        start: start_of_day(month),
                        end: start_of_day(next),
                        label: month.format("%b %Y").to_string(),
                    });
                    month = next;
                }
            }
        }
        buckets
    }
}

impl fmt::Display for Window {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{} .. {})", self.start, self.end)
    }
}
