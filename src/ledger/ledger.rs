use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{budget::Budget, category::Category, recurring, transaction::Transaction};
use crate::{
    errors::{EngineError, EngineResult},
    storage::{ChangeSet, TransactionQuery},
};

pub const CURRENT_SCHEMA_VERSION: u8 = 1;

/// In-memory snapshot of everything the engine reads and writes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ledger {
    #[serde(default)]
    pub categories: Vec<Category>,
    #[serde(default)]
    pub transactions: Vec<Transaction>,
    #[serde(default)]
    pub budgets: Vec<Budget>,
    pub updated_at: DateTime<Utc>,
    #[serde(default = "Ledger::schema_version_default")]
    pub schema_version: u8,
}

impl Default for Ledger {
    fn default() -> Self {
        Self::new()
    }
}

impl Ledger {
    pub fn new() -> Self {
        Self {
            categories: Vec::new(),
            transactions: Vec::new(),
            budgets: Vec::new(),
            updated_at: Utc::now(),
            schema_version: CURRENT_SCHEMA_VERSION,
        }
    }

    pub fn add_category(&mut self, category: Category) -> Uuid {
        let id = category.id;
        self.categories.push(category);
        self.touch();
        id
    }

    pub fn add_transaction(&mut self, transaction: Transaction) -> Uuid {
        let id = transaction.id;
        self.transactions.push(transaction);
        self.touch();
        id
    }

    pub fn add_budget(&mut self, budget: Budget) -> Uuid {
        let id = budget.id;
        self.budgets.push(budget);
        self.touch();
        id
    }

    pub fn category(&self, id: Uuid) -> Option<&Category> {
        self.categories.iter().find(|category| category.id == id)
    }

    pub fn budget(&self, id: Uuid) -> Option<&Budget> {
        self.budgets.iter().find(|budget| budget.id == id)
    }

    pub fn transaction(&self, id: Uuid) -> Option<&Transaction> {
        self.transactions.iter().find(|txn| txn.id == id)
    }

    /// Transactions matching `query`, oldest first.
    pub fn query(&self, query: &TransactionQuery) -> Vec<Transaction> {
        let mut matches: Vec<Transaction> = self
            .transactions
            .iter()
            .filter(|txn| query.matches(txn))
            .cloned()
            .collect();
        matches.sort_by_key(|txn| txn.date);
        matches
    }

    /// Applies `changes` all-or-nothing.
    ///
    /// Fails without touching `self` if a change refers to an unknown id, inserts a
    /// duplicate id, or leaves a touched recurrence series with more than one live member.
    pub fn apply(&mut self, changes: &ChangeSet) -> EngineResult<()> {
        let mut scratch = self.clone();
        let mut touched_series = HashSet::new();

        for update in &changes.descriptor_updates {
            let txn = scratch
                .transactions
                .iter_mut()
                .find(|txn| txn.id == update.transaction_id)
                .ok_or_else(|| EngineError::transaction_not_found(update.transaction_id))?;
            if let Some(series) = txn.recurrence_series() {
                touched_series.insert(series);
            }
            txn.set_recurrence(update.recurrence);
            if let Some(series) = txn.recurrence_series() {
                touched_series.insert(series);
            }
        }

        let mut known: HashSet<Uuid> = scratch.transactions.iter().map(|txn| txn.id).collect();
        for txn in &changes.inserts {
            if !known.insert(txn.id) {
                return Err(EngineError::Persistence(format!(
                    "transaction {} already exists",
                    txn.id
                )));
            }
            if let Some(series) = txn.recurrence_series() {
                touched_series.insert(series);
            }
            scratch.transactions.push(txn.clone());
        }

        for update in &changes.budget_starts {
            let budget = scratch
                .budgets
                .iter_mut()
                .find(|budget| budget.id == update.budget_id)
                .ok_or_else(|| EngineError::budget_not_found(update.budget_id))?;
            budget.start = update.start;
        }

        let live = recurring::live_members_by_series(&scratch.transactions);
        for series in touched_series {
            let count = live.get(&series).copied().unwrap_or(0);
            if count > 1 {
                return Err(EngineError::Persistence(format!(
                    "recurrence series {series} would have {count} live members"
                )));
            }
        }

        scratch.touch();
        *self = scratch;
        Ok(())
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    pub fn schema_version_default() -> u8 {
        CURRENT_SCHEMA_VERSION
    }
}
