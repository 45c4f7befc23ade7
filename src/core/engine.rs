//! Engine facade over a [`LedgerStore`], a [`Clock`] and the calendar settings.
//!
//! Reads that feed totals, series and maintenance never fail outward: a store error is
//! logged and the call degrades to an empty or zero result. Lookups by id propagate.

use chrono::NaiveDateTime;
use serde::Serialize;
use uuid::Uuid;

use super::services::{
    AggregationService, BudgetService, BudgetStatus, RecurrenceService, Series, SeriesMetric,
    SeriesService, SeriesWindow, Summary,
};
use crate::{
    clock::{Clock, SystemClock},
    config::CalendarConfig,
    errors::{EngineError, EngineResult},
    ledger::{
        compute_period, Budget, Category, Flow, Period, PeriodKind, Transaction,
        TransactionFilter, Window,
    },
    storage::{ChangeSet, LedgerStore, TransactionQuery},
};

/// What one maintenance pass committed.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MaintenanceReport {
    pub materialized: usize,
    pub chains_advanced: usize,
    pub budgets_rolled: Vec<Budget>,
    pub committed: bool,
}

pub struct Engine {
    store: Box<dyn LedgerStore>,
    clock: Box<dyn Clock>,
    calendar: CalendarConfig,
}

impl Engine {
    pub fn new(store: impl LedgerStore + 'static, calendar: CalendarConfig) -> Self {
        Self {
            store: Box::new(store),
            clock: Box::new(SystemClock),
            calendar: calendar.normalized(),
        }
    }

    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    pub fn calendar(&self) -> &CalendarConfig {
        &self.calendar
    }

    pub fn store(&self) -> &dyn LedgerStore {
        self.store.as_ref()
    }

    pub fn now(&self) -> NaiveDateTime {
        self.clock.now()
    }

    pub fn compute_period(&self, now: NaiveDateTime, kind: PeriodKind) -> Period {
        compute_period(now, kind, &self.calendar)
    }

    /// The window of `kind` containing `now`. All-time windows start at the month of the
    /// earliest stored transaction.
    pub fn window(&self, kind: PeriodKind, now: NaiveDateTime) -> Window {
        if let Some(window) = Window::for_period(now, kind, &self.calendar) {
            return window;
        }
        let earliest = self
            .read_transactions(&TransactionQuery::all(), "all-time window")
            .first()
            .map(|txn| txn.day)
            .unwrap_or_else(|| now.date());
        Window::all_time(earliest, now)
    }

    pub fn aggregate(
        &self,
        window: Window,
        flow: Option<Flow>,
        categories: &[Uuid],
        now: NaiveDateTime,
    ) -> Summary {
        let filter = TransactionFilter::new(flow, categories);
        let query = TransactionQuery::between(window.start, window.end).with_filter(filter.clone());
        match self.store.transactions(&query) {
            Ok(transactions) => AggregationService::summarize(&transactions, window, &filter, now),
            Err(err) => {
                tracing::warn!(
                    error = %err,
                    window = %window,
                    "aggregation read failed, reporting zeros"
                );
                Summary::empty(window, now)
            }
        }
    }

    /// Builds a chart series ending on the clock's current day.
    pub fn build_series(
        &self,
        kind: SeriesWindow,
        metric: SeriesMetric,
        flow: Option<Flow>,
    ) -> Series {
        let today = self.clock.today();
        let window = kind.window(today);
        let query = TransactionQuery::between(window.start, window.end)
            .with_filter(TransactionFilter::new(flow, &[]));
        match self.store.transactions(&query) {
            Ok(transactions) => SeriesService::build(&transactions, kind, metric, flow, today),
            Err(err) => {
                tracing::warn!(
                    error = %err,
                    window = %window,
                    "series read failed, reporting zeros"
                );
                Series::zeros(&window, metric)
            }
        }
    }

    /// Materializes every due recurrence occurrence and returns how many were committed.
    pub fn advance_recurrences(&mut self, now: NaiveDateTime) -> usize {
        let live = self.read_transactions(&TransactionQuery::live_recurrences(), "recurrence");
        let plan = RecurrenceService::plan(&live, now.date());
        if plan.is_empty() {
            return 0;
        }
        let created = plan.materialized();
        if !self.commit(plan.changes, "recurrence") {
            return 0;
        }
        tracing::info!(created, chains = plan.advances.len(), "recurrences advanced");
        created
    }

    /// Moves every budget past its elapsed periods and returns the budgets that changed.
    pub fn rollover_budgets(&mut self, now: NaiveDateTime) -> Vec<Budget> {
        let budgets = self.read_budgets("rollover");
        let plan = BudgetService::plan_rollovers(&budgets, now, &self.calendar);
        if plan.updated.is_empty() {
            return Vec::new();
        }
        if !self.commit(plan.changes, "rollover") {
            return Vec::new();
        }
        tracing::info!(budgets = plan.updated.len(), "budgets rolled over");
        plan.updated
    }

    /// Recurrence catch-up and budget rollover committed as one batch.
    pub fn run_maintenance(&mut self, now: NaiveDateTime) -> MaintenanceReport {
        let live = self.read_transactions(&TransactionQuery::live_recurrences(), "maintenance");
        let budgets = self.read_budgets("maintenance");
        let recurrences = RecurrenceService::plan(&live, now.date());
        let rollovers = BudgetService::plan_rollovers(&budgets, now, &self.calendar);

        let materialized = recurrences.materialized();
        let chains_advanced = recurrences.advances.len();
        let mut changes = recurrences.changes;
        changes.merge(rollovers.changes);
        if changes.is_empty() {
            return MaintenanceReport {
                committed: true,
                ..MaintenanceReport::default()
            };
        }
        if !self.commit(changes, "maintenance") {
            return MaintenanceReport::default();
        }
        tracing::info!(
            materialized,
            chains = chains_advanced,
            budgets = rollovers.updated.len(),
            "maintenance committed"
        );
        MaintenanceReport {
            materialized,
            chains_advanced,
            budgets_rolled: rollovers.updated,
            committed: true,
        }
    }

    /// Budget amount minus spending in its current period. Negative means overspent.
    pub fn leftover(&self, budget: &Budget, now: NaiveDateTime) -> f64 {
        self.status_for(budget, now).leftover
    }

    pub fn budget_status(&self, budget_id: Uuid, now: NaiveDateTime) -> EngineResult<BudgetStatus> {
        let budget = self.budget(budget_id)?;
        Ok(self.status_for(&budget, now))
    }

    pub fn category(&self, id: Uuid) -> EngineResult<Category> {
        self.store.category(id)
    }

    pub fn budget(&self, id: Uuid) -> EngineResult<Budget> {
        self.store.budget(id)
    }

    fn status_for(&self, budget: &Budget, now: NaiveDateTime) -> BudgetStatus {
        let period = BudgetService::current_period(budget, now, &self.calendar);
        let query = TransactionQuery::between(period.start, period.end)
            .with_filter(BudgetService::spending_filter(budget));
        let transactions = self.read_transactions(&query, "leftover");
        BudgetService::status(budget, &transactions, now, &self.calendar)
    }

    fn read_transactions(&self, query: &TransactionQuery, purpose: &str) -> Vec<Transaction> {
        self.store.transactions(query).unwrap_or_else(|err| {
            warn_degraded(&err, purpose);
            Vec::new()
        })
    }

    fn read_budgets(&self, purpose: &str) -> Vec<Budget> {
        self.store.budgets().unwrap_or_else(|err| {
            warn_degraded(&err, purpose);
            Vec::new()
        })
    }

    fn commit(&mut self, changes: ChangeSet, purpose: &str) -> bool {
        match self.store.commit(changes) {
            Ok(()) => true,
            Err(err) => {
                warn_degraded(&err, purpose);
                false
            }
        }
    }
}

fn warn_degraded(err: &EngineError, purpose: &str) {
    tracing::warn!(error = %err, purpose, "ledger store unavailable, skipping");
}
