use std::collections::HashMap;

use chrono::{Duration, NaiveDate, NaiveDateTime};
use serde::Serialize;
use uuid::Uuid;

use super::{time_interval::TimeInterval, Transaction};
use crate::clock::start_of_day;

/// Where a chain stands relative to a given day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ChainState {
    /// The next occurrence falls after the day.
    Scheduled,
    /// One or more occurrences are due on or before the day.
    Materializing,
    /// The chain has no live member.
    Terminated,
}

/// Result of catching one chain up to the present.
#[derive(Debug, Clone)]
pub struct ChainAdvance {
    pub series_id: Uuid,
    /// The previously live member, now carrying no recurrence.
    pub terminated: Uuid,
    /// New occurrences in date order. Only the last one carries the recurrence.
    pub materialized: Vec<Transaction>,
}

impl ChainAdvance {
    pub fn live(&self) -> Option<&Transaction> {
        self.materialized
            .last()
            .filter(|txn| txn.recurrence.is_live())
    }
}

/// The occurrences sharing one recurrence, owned through a single pending member.
///
/// Only the pending member ever carries a live descriptor. Catching up replaces it with
/// the newest materialized occurrence, so a chain can never hold zero or two live members
/// after a successful pass.
#[derive(Debug, Clone)]
pub struct RecurrenceChain {
    series_id: Uuid,
    pending: Transaction,
    interval: TimeInterval,
}

impl RecurrenceChain {
    /// Builds a chain from its live member; `None` if the transaction does not recur.
    pub fn from_live(transaction: &Transaction) -> Option<Self> {
        let interval = transaction.recurrence.interval()?;
        let series_id = transaction.recurrence_series()?;
        Some(Self {
            series_id,
            pending: transaction.clone(),
            interval,
        })
    }

    pub fn series_id(&self) -> Uuid {
        self.series_id
    }

    pub fn pending(&self) -> &Transaction {
        &self.pending
    }

    pub fn next_due(&self) -> NaiveDateTime {
        self.interval.next_after(self.pending.date)
    }

    pub fn state(&self, today: NaiveDate) -> ChainState {
        if !self.pending.recurrence.is_live() {
            ChainState::Terminated
        } else if self.next_due() < horizon(today) {
            ChainState::Materializing
        } else {
            ChainState::Scheduled
        }
    }

    /// Materializes every occurrence dated before the end of `today`.
    ///
    /// Returns `None` when nothing is due. Otherwise the old pending member is terminated
    /// and the last new occurrence becomes pending, keeping the descriptor.
    pub fn catch_up(&mut self, today: NaiveDate) -> Option<ChainAdvance> {
        if self.state(today) != ChainState::Materializing {
            return None;
        }
        let horizon = horizon(today);
        let mut next = self.next_due();
        let mut materialized = Vec::new();
        while next < horizon {
            let mut occurrence = self.pending.occurrence_at(next);
            occurrence.recurrence_series_id = Some(self.series_id);
            materialized.push(occurrence);
            next = self.interval.next_after(next);
        }

        let last = materialized.last_mut()?;
        last.recurrence = self.pending.recurrence;
        let terminated = self.pending.id;
        self.pending = last.clone();
        tracing::debug!(
            series = %self.series_id,
            created = materialized.len(),
            "recurrence chain advanced"
        );
        Some(ChainAdvance {
            series_id: self.series_id,
            terminated,
            materialized,
        })
    }
}

fn horizon(today: NaiveDate) -> NaiveDateTime {
    start_of_day(today + Duration::days(1))
}

/// Number of live descriptors per recurrence series.
pub fn live_members_by_series(transactions: &[Transaction]) -> HashMap<Uuid, usize> {
    let mut counts: HashMap<Uuid, usize> = HashMap::new();
    for txn in transactions {
        if let Some(series) = txn.recurrence_series() {
            let entry = counts.entry(series).or_default();
            if txn.recurrence.is_live() {
                *entry += 1;
            }
        }
    }
    counts
}
