#![doc(test(attr(deny(warnings))))]

//! Budget Engine computes period boundaries, windowed totals and chart series over a
//! personal-finance ledger, and keeps recurring transactions and budget periods current.

pub mod clock;
pub mod config;
pub mod core;
pub mod errors;
pub mod ledger;
pub mod storage;
pub mod utils;

use std::sync::Once;

pub use crate::core::services::{
    AverageBasis, BudgetStatus, DataPoint, Series, SeriesMetric, SeriesWindow, Summary,
};
pub use crate::core::{Engine, MaintenanceReport};
pub use clock::{Clock, FixedClock, SystemClock};
pub use config::{CalendarConfig, Config, ConfigManager};
pub use errors::{EngineError, EngineResult};
pub use ledger::{
    compute_period, Budget, Category, Flow, Period, PeriodKind, RecurrenceKind, Transaction,
    Window,
};
pub use storage::{JsonStore, LedgerStore, MemoryStore};

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing and emits a startup info log.
pub fn init() {
    INIT_TRACING.call_once(|| {
        utils::init_tracing();
        tracing::info!("Budget Engine tracing initialized.");
    });
}

#[cfg(test)]
mod tests {
    #[test]
    fn init_does_not_panic() {
        super::init();
        super::init();
    }
}
