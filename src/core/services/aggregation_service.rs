//! Window totals, per-bucket breakdowns and partial-period averages.

use chrono::NaiveDateTime;
use serde::Serialize;

use crate::ledger::{Bucket, Flow, Transaction, TransactionFilter, Window};

/// Divisor used for a window's average.
///
/// A window still running at `now` divides by the buckets elapsed so far, counting the
/// current one; a finished window divides by its nominal bucket count (7 for a week, the
/// day count for a month, 12 for a year).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "basis", content = "buckets", rename_all = "lowercase")]
pub enum AverageBasis {
    Elapsed(usize),
    Nominal(usize),
}

impl AverageBasis {
    pub fn for_window(window: &Window, now: NaiveDateTime) -> Self {
        let nominal = window.bucket_count().max(1);
        if window.end > now {
            AverageBasis::Elapsed(window.elapsed_buckets(now).clamp(1, nominal))
        } else {
            AverageBasis::Nominal(nominal)
        }
    }

    pub fn divisor(self) -> usize {
        match self {
            AverageBasis::Elapsed(count) | AverageBasis::Nominal(count) => count.max(1),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubperiodTotal {
    pub bucket: Bucket,
    pub amount: f64,
}

/// Totals for one window.
///
/// `total` is the headline figure: the signed net when no flow filter is set, otherwise
/// the magnitude of the filtered flow. Breakdown, maximum and average use the same measure.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub window: Window,
    pub net: f64,
    pub income: f64,
    pub expense: f64,
    pub total: f64,
    pub breakdown: Vec<SubperiodTotal>,
    pub max: f64,
    pub active_subperiods: usize,
    pub average: f64,
    pub average_basis: AverageBasis,
}

impl Summary {
    /// An all-zero summary with one empty entry per bucket.
    pub fn empty(window: Window, now: NaiveDateTime) -> Self {
        let breakdown = window
            .buckets()
            .into_iter()
            .map(|bucket| SubperiodTotal {
                bucket,
                amount: 0.0,
            })
            .collect();
        Self {
            window,
            net: 0.0,
            income: 0.0,
            expense: 0.0,
            total: 0.0,
            breakdown,
            max: 0.0,
            active_subperiods: 0,
            average: 0.0,
            average_basis: AverageBasis::for_window(&window, now),
        }
    }
}

pub struct AggregationService;

impl AggregationService {
    /// Summarises the transactions that fall in `window` and match `filter`.
    pub fn summarize(
        transactions: &[Transaction],
        window: Window,
        filter: &TransactionFilter,
        now: NaiveDateTime,
    ) -> Summary {
        let mut summary = Summary::empty(window, now);

        for txn in transactions {
            if !filter.matches(txn) {
                continue;
            }
            let Some(index) = window.bucket_index(txn.date) else {
                continue;
            };
            if txn.income {
                summary.income += txn.amount;
            } else {
                summary.expense += txn.amount;
            }
            if let Some(entry) = summary.breakdown.get_mut(index) {
                entry.amount += filter.contribution(txn);
            }
        }

        summary.net = summary.income - summary.expense;
        summary.total = match filter.flow {
            Some(Flow::Income) => summary.income,
            Some(Flow::Expense) => summary.expense,
            None => summary.net,
        };
        summary.max = summary
            .breakdown
            .iter()
            .map(|entry| entry.amount)
            .fold(0.0, |max: f64, amount| {
                if amount.abs() > max.abs() {
                    amount
                } else {
                    max
                }
            });
        summary.active_subperiods = summary
            .breakdown
            .iter()
            .filter(|entry| entry.amount != 0.0)
            .count();
        summary.average = summary.total / summary.average_basis.divisor() as f64;

        tracing::debug!(
            window = %window,
            total = summary.total,
            divisor = summary.average_basis.divisor(),
            "window summarised"
        );
        summary
    }

    /// Per-bucket amounts for `window`, zero-filled, in bucket order.
    pub fn bucket_totals(
        transactions: &[Transaction],
        window: &Window,
        filter: &TransactionFilter,
    ) -> Vec<f64> {
        let mut totals = vec![0.0; window.bucket_count()];
        for txn in transactions.iter().filter(|txn| filter.matches(txn)) {
            if let Some(slot) = window
                .bucket_index(txn.date)
                .and_then(|index| totals.get_mut(index))
            {
                *slot += filter.contribution(txn);
            }
        }
        totals
    }
}
