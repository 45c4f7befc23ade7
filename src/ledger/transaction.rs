use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::time_interval::{TimeInterval, TimeUnit};

/// A single income or expense entry.
///
/// `amount` is always a non-negative magnitude; the direction lives in `income`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Transaction {
    pub id: Uuid,
    pub amount: f64,
    pub date: NaiveDateTime,
    pub day: NaiveDate,
    pub income: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_id: Option<Uuid>,
    #[serde(default)]
    pub recurrence: RecurrenceDescriptor,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recurrence_series_id: Option<Uuid>,
}

impl Transaction {
    pub fn new(amount: f64, date: NaiveDateTime, income: bool) -> Self {
        Self {
            id: Uuid::new_v4(),
            amount: amount.abs(),
            date,
            day: date.date(),
            income,
            note: None,
            category_id: None,
            recurrence: RecurrenceDescriptor::none(),
            recurrence_series_id: None,
        }
    }

    pub fn expense(amount: f64, date: NaiveDateTime) -> Self {
        Self::new(amount, date, false)
    }

    pub fn income(amount: f64, date: NaiveDateTime) -> Self {
        Self::new(amount, date, true)
    }

    pub fn with_category(mut self, category_id: Uuid) -> Self {
        self.category_id = Some(category_id);
        self
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    /// Starts a new recurrence chain rooted at this transaction.
    pub fn with_recurrence(mut self, kind: RecurrenceKind, coefficient: u32) -> Self {
        self.set_recurrence(RecurrenceDescriptor::new(kind, coefficient));
        self
    }

    pub fn set_recurrence(&mut self, recurrence: RecurrenceDescriptor) {
        if recurrence.is_live() && self.recurrence_series_id.is_none() {
            self.recurrence_series_id = Some(self.id);
        }
        self.recurrence = recurrence;
    }

    pub fn flow(&self) -> Flow {
        if self.income {
            Flow::Income
        } else {
            Flow::Expense
        }
    }

    /// Income counts positive, expenses negative.
    pub fn signed_amount(&self) -> f64 {
        if self.income {
            self.amount
        } else {
            -self.amount
        }
    }

    /// The chain this transaction belongs to, if it was ever recurring.
    pub fn recurrence_series(&self) -> Option<Uuid> {
        self.recurrence_series_id
            .or_else(|| self.recurrence.is_live().then_some(self.id))
    }

    /// Next scheduled date of a live recurrence, anchored on this transaction's date.
    pub fn next_occurrence(&self) -> Option<NaiveDateTime> {
        self.recurrence
            .interval()
            .map(|interval| interval.next_after(self.date))
    }

    /// Copies the user-visible fields into a fresh, non-recurring transaction at `date`.
    pub fn occurrence_at(&self, date: NaiveDateTime) -> Transaction {
        Transaction {
            id: Uuid::new_v4(),
            amount: self.amount,
            date,
            day: date.date(),
            income: self.income,
            note: self.note.clone(),
            category_id: self.category_id,
            recurrence: RecurrenceDescriptor::none(),
            recurrence_series_id: self.recurrence_series(),
        }
    }
}

/// Direction filter for income and expense entries.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Flow {
    Income,
    Expense,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum RecurrenceKind {
    #[default]
    None,
    Daily,
    Weekly,
    Monthly,
}

/// How a transaction repeats. The anchor is the owning transaction's date.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct RecurrenceDescriptor {
    pub kind: RecurrenceKind,
    pub coefficient: u32,
}

impl Default for RecurrenceDescriptor {
    fn default() -> Self {
        Self::none()
    }
}

impl RecurrenceDescriptor {
    pub fn new(kind: RecurrenceKind, coefficient: u32) -> Self {
        Self {
            kind,
            coefficient: coefficient.max(1),
        }
    }

    pub fn none() -> Self {
        Self {
            kind: RecurrenceKind::None,
            coefficient: 1,
        }
    }

    pub fn is_live(&self) -> bool {
        self.kind != RecurrenceKind::None
    }

    pub fn interval(&self) -> Option<TimeInterval> {
        let unit = match self.kind {
            RecurrenceKind::None => return None,
            RecurrenceKind::Daily => TimeUnit::Day,
            RecurrenceKind::Weekly => TimeUnit::Week,
            RecurrenceKind::Monthly => TimeUnit::Month,
        };
        Some(TimeInterval::new(self.coefficient, unit))
    }
}
