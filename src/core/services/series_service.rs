//! Gap-filled chart series over fixed lookback windows.

use std::{iter::FusedIterator, str::FromStr, vec};

use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use super::aggregation_service::AggregationService;
use crate::{
    clock::start_of_day,
    errors::EngineError,
    ledger::{
        time_interval::shift_month, Flow, Granularity, Transaction, TransactionFilter, Window,
    },
};

/// Lookback windows a chart can ask for, all ending with today.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SeriesWindow {
    LastSevenDays,
    LastMonth,
    YearToDate,
}

impl SeriesWindow {
    pub fn window(self, today: NaiveDate) -> Window {
        let tomorrow = start_of_day(today + Duration::days(1));
        let (start, end, granularity) = match self {
            SeriesWindow::LastSevenDays => (
                start_of_day(today - Duration::days(6)),
                tomorrow,
                Granularity::Day,
            ),
            SeriesWindow::LastMonth => (
                start_of_day(shift_month(today, -1) + Duration::days(1)),
                tomorrow,
                Granularity::Day,
            ),
            SeriesWindow::YearToDate => {
                let first_of_month = today - Duration::days(i64::from(today.day0()));
                let jan_first = today - Duration::days(i64::from(today.ordinal0()));
                (
                    start_of_day(jan_first),
                    start_of_day(shift_month(first_of_month, 1)),
                    Granularity::Month,
                )
            }
        };
        Window {
            start,
            end,
            granularity,
        }
    }
}

impl FromStr for SeriesWindow {
    type Err = EngineError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "week" | "7d" | "last-seven-days" => Ok(Self::LastSevenDays),
            "month" | "last-month" => Ok(Self::LastMonth),
            "year" | "ytd" | "year-to-date" => Ok(Self::YearToDate),
            other => Err(EngineError::InvalidConfiguration(format!(
                "unknown series window `{other}`"
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SeriesMetric {
    /// Running balance carried across buckets.
    Cumulative,
    /// Each bucket's own total.
    PerBucket,
}

impl FromStr for SeriesMetric {
    type Err = EngineError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "cumulative" | "running" => Ok(Self::Cumulative),
            "per-bucket" | "bucket" | "net" => Ok(Self::PerBucket),
            other => Err(EngineError::InvalidConfiguration(format!(
                "unknown series metric `{other}`"
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DataPoint {
    pub date: NaiveDate,
    pub amount: f64,
}

/// One point per bucket, in order, consumed once.
///
/// Daily points are dated at the bucket's day. Monthly points are dated at the last day
/// before the next bucket begins.
#[derive(Debug)]
pub struct Series {
    dates: vec::IntoIter<NaiveDate>,
    totals: vec::IntoIter<f64>,
    metric: SeriesMetric,
    running: f64,
}

impl Series {
    fn new(window: &Window, totals: Vec<f64>, metric: SeriesMetric) -> Self {
        let dates: Vec<NaiveDate> = window
            .buckets()
            .into_iter()
            .map(|bucket| match window.granularity {
                Granularity::Day => bucket.start.date(),
                Granularity::Month => bucket.end.date() - Duration::days(1),
            })
            .collect();
        debug_assert_eq!(dates.len(), totals.len());
        Self {
            dates: dates.into_iter(),
            totals: totals.into_iter(),
            metric,
            running: 0.0,
        }
    }

    /// An all-zero series covering `window`.
    pub fn zeros(window: &Window, metric: SeriesMetric) -> Self {
        Self::new(window, vec![0.0; window.bucket_count()], metric)
    }

    pub fn into_points(self) -> Vec<DataPoint> {
        self.collect()
    }
}

impl Iterator for Series {
    type Item = DataPoint;

    fn next(&mut self) -> Option<DataPoint> {
        let date = self.dates.next()?;
        let total = self.totals.next()?;
        let amount = match self.metric {
            SeriesMetric::Cumulative => {
                self.running += total;
                self.running
            }
            SeriesMetric::PerBucket => total,
        };
        Some(DataPoint { date, amount })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.dates.len().min(self.totals.len());
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Series {}

impl FusedIterator for Series {}

pub struct SeriesService;

impl SeriesService {
    /// Builds the series for `kind` ending on `today` from already-fetched transactions.
    pub fn build(
        transactions: &[Transaction],
        kind: SeriesWindow,
        metric: SeriesMetric,
        flow: Option<Flow>,
        today: NaiveDate,
    ) -> Series {
        let window = kind.window(today);
        let filter = TransactionFilter::new(flow, &[]);
        let totals = AggregationService::bucket_totals(transactions, &window, &filter);
        tracing::debug!(window = %window, points = totals.len(), "series built");
        Series::new(&window, totals, metric)
    }
}
