//! The ledger store boundary: filtered reads and atomic change sets.

pub mod json_backend;
pub mod memory;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    errors::{EngineError, EngineResult},
    ledger::{Budget, Category, RecurrenceDescriptor, Transaction, TransactionFilter},
};

pub use json_backend::JsonStore;
pub use memory::MemoryStore;

/// Selects transactions from a store. Results come back sorted by date.
#[derive(Debug, Clone, Default)]
pub struct TransactionQuery {
    /// Half-open `[start, end)` date range.
    pub range: Option<(NaiveDateTime, NaiveDateTime)>,
    pub filter: TransactionFilter,
    pub live_recurrences_only: bool,
}

impl TransactionQuery {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn between(start: NaiveDateTime, end: NaiveDateTime) -> Self {
        Self {
            range: Some((start, end)),
            ..Self::default()
        }
    }

    pub fn live_recurrences() -> Self {
        Self {
            live_recurrences_only: true,
            ..Self::default()
        }
    }

    pub fn with_filter(mut self, filter: TransactionFilter) -> Self {
        self.filter = filter;
        self
    }

    pub fn matches(&self, txn: &Transaction) -> bool {
        let in_range = self
            .range
            .map_or(true, |(start, end)| start <= txn.date && txn.date < end);
        in_range
            && self.filter.matches(txn)
            && (!self.live_recurrences_only || txn.recurrence.is_live())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DescriptorUpdate {
    pub transaction_id: Uuid,
    pub recurrence: RecurrenceDescriptor,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BudgetStartUpdate {
    pub budget_id: Uuid,
    pub start: NaiveDateTime,
}

/// Writes that must land together or not at all.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChangeSet {
    pub inserts: Vec<Transaction>,
    pub descriptor_updates: Vec<DescriptorUpdate>,
    pub budget_starts: Vec<BudgetStartUpdate>,
}

impl ChangeSet {
    pub fn is_empty(&self) -> bool {
        self.inserts.is_empty() && self.descriptor_updates.is_empty() && self.budget_starts.is_empty()
    }

    pub fn merge(&mut self, other: ChangeSet) {
        self.inserts.extend(other.inserts);
        self.descriptor_updates.extend(other.descriptor_updates);
        self.budget_starts.extend(other.budget_starts);
    }
}

/// Persistence collaborator the engine reads from and commits to.
pub trait LedgerStore: Send + Sync {
    fn transactions(&self, query: &TransactionQuery) -> EngineResult<Vec<Transaction>>;
    fn categories(&self) -> EngineResult<Vec<Category>>;
    fn budgets(&self) -> EngineResult<Vec<Budget>>;

    /// Applies every change or none of them.
    fn commit(&mut self, changes: ChangeSet) -> EngineResult<()>;

    fn category(&self, id: Uuid) -> EngineResult<Category> {
        self.categories()?
            .into_iter()
            .find(|category| category.id == id)
            .ok_or_else(|| EngineError::category_not_found(id))
    }

    fn budget(&self, id: Uuid) -> EngineResult<Budget> {
        self.budgets()?
            .into_iter()
            .find(|budget| budget.id == id)
            .ok_or_else(|| EngineError::budget_not_found(id))
    }
}
