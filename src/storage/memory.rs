use crate::{
    errors::EngineResult,
    ledger::{Budget, Category, Ledger, Transaction},
};

use super::{ChangeSet, LedgerStore, TransactionQuery};

/// Store that keeps the ledger in memory only.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    ledger: Ledger,
}

impl MemoryStore {
    pub fn new(ledger: Ledger) -> Self {
        Self { ledger }
    }
}

impl LedgerStore for MemoryStore {
    fn transactions(&self, query: &TransactionQuery) -> EngineResult<Vec<Transaction>> {
        Ok(self.ledger.query(query))
    }

    fn categories(&self) -> EngineResult<Vec<Category>> {
        let mut categories = self.ledger.categories.clone();
        categories.sort_by_key(|category| category.order);
        Ok(categories)
    }

    fn budgets(&self) -> EngineResult<Vec<Budget>> {
        Ok(self.ledger.budgets.clone())
    }

    fn commit(&mut self, changes: ChangeSet) -> EngineResult<()> {
        if changes.is_empty() {
            return Ok(());
        }
        self.ledger.apply(&changes)
    }
}
