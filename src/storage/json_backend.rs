use std::path::{Path, PathBuf};

use crate::{
    errors::EngineResult,
    ledger::{Budget, Category, Ledger, Transaction},
    utils::persistence::{load_ledger_from_file, save_ledger_to_file},
};

use super::{ChangeSet, LedgerStore, TransactionQuery};

/// File-backed store holding one JSON ledger snapshot.
///
/// Commits are applied to a copy, written to a staging file and renamed into place;
/// the in-memory view only changes once the rename succeeds.
#[derive(Debug, Clone)]
pub struct JsonStore {
    path: PathBuf,
    ledger: Ledger,
}

impl JsonStore {
    /// Opens the ledger at `path`, starting empty when the file does not exist yet.
    pub fn open(path: impl Into<PathBuf>) -> EngineResult<Self> {
        let path = path.into();
        let ledger = if path.exists() {
            load_ledger_from_file(&path)?
        } else {
            Ledger::new()
        };
        Ok(Self { path, ledger })
    }

    /// Writes `ledger` to `path`, replacing any existing file.
    pub fn create(path: impl Into<PathBuf>, ledger: Ledger) -> EngineResult<Self> {
        let path = path.into();
        save_ledger_to_file(&ledger, &path)?;
        Ok(Self { path, ledger })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }
}

impl LedgerStore for JsonStore {
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
        let mut next = self.ledger.clone();
        next.apply(&changes)?;
        save_ledger_to_file(&next, &self.path)?;
        self.ledger = next;
        tracing::debug!(path = %self.path.display(), "ledger committed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::{Budget, PeriodKind};
    use crate::storage::BudgetStartUpdate;
    use chrono::NaiveDate;
    use tempfile::tempdir;
    use uuid::Uuid;

    fn start() -> chrono::NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    #[test]
    fn commit_persists_to_disk() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("ledger.json");
        let mut ledger = Ledger::new();
        let budget_id = ledger.add_budget(Budget::new(50.0, PeriodKind::Day, start()));
        let mut store = JsonStore::create(&path, ledger).expect("create");

        let later = start() + chrono::Duration::days(3);
        store
            .commit(ChangeSet {
                budget_starts: vec![BudgetStartUpdate {
                    budget_id,
                    start: later,
                }],
                ..ChangeSet::default()
            })
            .expect("commit");

        let reopened = JsonStore::open(&path).expect("open");
        assert_eq!(reopened.budget(budget_id).expect("budget").start, later);
    }

    #[test]
    fn rejected_commit_keeps_file_and_memory() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("ledger.json");
        let mut store = JsonStore::create(&path, Ledger::new()).expect("create");
        let before = std::fs::read_to_string(&path).expect("read");

        let result = store.commit(ChangeSet {
            budget_starts: vec![BudgetStartUpdate {
                budget_id: Uuid::new_v4(),
                start: start(),
            }],
            ..ChangeSet::default()
        });
        assert!(result.is_err());
        assert_eq!(std::fs::read_to_string(&path).expect("read"), before);
        assert!(store.ledger().budgets.is_empty());
    }

    #[test]
    fn open_missing_file_starts_empty() {
        let dir = tempdir().expect("tempdir");
        let store = JsonStore::open(dir.path().join("new.json")).expect("open");
        assert!(store.ledger().transactions.is_empty());
    }
}
