#![allow(dead_code)]

use std::{path::PathBuf, sync::Mutex};

use budget_engine::{
    errors::{EngineError, EngineResult},
    ledger::{Budget, Category, Ledger, Transaction},
    storage::{ChangeSet, LedgerStore, MemoryStore, TransactionQuery},
    CalendarConfig, Engine, FixedClock,
};
use chrono::{NaiveDate, NaiveDateTime};
use once_cell::sync::Lazy;
use tempfile::TempDir;

/// Holds TempDir guards so temporary folders live for the duration of the test run.
static TEST_DIRS: Lazy<Mutex<Vec<TempDir>>> = Lazy::new(|| Mutex::new(Vec::new()));

/// A fresh directory that outlives the calling test.
pub fn temp_dir() -> PathBuf {
    let temp = TempDir::new().expect("create temp dir");
    let path = temp.path().to_path_buf();
    TEST_DIRS.lock().expect("lock temp dir registry").push(temp);
    path
}

pub fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

pub fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
    day(y, m, d).and_hms_opt(h, min, 0).expect("valid time")
}

/// Engine over an in-memory copy of `ledger`, frozen at `now`.
pub fn engine_at(ledger: Ledger, now: NaiveDateTime) -> Engine {
    engine_with_calendar(ledger, now, CalendarConfig::default())
}

pub fn engine_with_calendar(ledger: Ledger, now: NaiveDateTime, calendar: CalendarConfig) -> Engine {
    Engine::new(MemoryStore::new(ledger), calendar).with_clock(FixedClock(now))
}

pub fn all_transactions(store: &dyn LedgerStore) -> Vec<Transaction> {
    store
        .transactions(&TransactionQuery::all())
        .expect("memory store reads")
}

pub fn live_transactions(store: &dyn LedgerStore) -> Vec<Transaction> {
    store
        .transactions(&TransactionQuery::live_recurrences())
        .expect("memory store reads")
}

fn unavailable<T>() -> EngineResult<T> {
    Err(EngineError::Persistence("store offline".into()))
}

/// A store whose every read and write fails.
#[derive(Debug, Default)]
pub struct FailingStore;

impl LedgerStore for FailingStore {
    fn transactions(&self, _query: &TransactionQuery) -> EngineResult<Vec<Transaction>> {
        unavailable()
    }

    fn categories(&self) -> EngineResult<Vec<Category>> {
        unavailable()
    }

    fn budgets(&self) -> EngineResult<Vec<Budget>> {
        unavailable()
    }

    fn commit(&mut self, _changes: ChangeSet) -> EngineResult<()> {
        unavailable()
    }
}

/// Serves reads from memory but rejects every commit.
#[derive(Debug, Default)]
pub struct ReadOnlyStore(pub MemoryStore);

impl LedgerStore for ReadOnlyStore {
    fn transactions(&self, query: &TransactionQuery) -> EngineResult<Vec<Transaction>> {
        self.0.transactions(query)
    }

    fn categories(&self) -> EngineResult<Vec<Category>> {
        self.0.categories()
    }

    fn budgets(&self) -> EngineResult<Vec<Budget>> {
        self.0.budgets()
    }

    fn commit(&mut self, _changes: ChangeSet) -> EngineResult<()> {
        unavailable()
    }
}
