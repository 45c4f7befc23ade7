pub mod aggregation_service;
pub mod budget_service;
pub mod recurrence_service;
pub mod series_service;

pub use aggregation_service::{AggregationService, AverageBasis, SubperiodTotal, Summary};
pub use budget_service::{BudgetService, BudgetStatus, Rollover, RolloverPlan};
pub use recurrence_service::{RecurrencePlan, RecurrenceService};
pub use series_service::{DataPoint, Series, SeriesMetric, SeriesService, SeriesWindow};
