//! Ledger domain models, calendar arithmetic, and the recurrence chain.

pub mod budget;
pub mod category;
pub mod filter;
#[allow(clippy::module_inception)]
pub mod ledger;
pub mod period;
pub mod recurring;
pub mod time_interval;
pub mod transaction;

pub use budget::Budget;
pub use category::Category;
pub use filter::TransactionFilter;
pub use ledger::Ledger;
pub use period::{compute_period, Bucket, Granularity, Period, PeriodKind, Window};
pub use recurring::{live_members_by_series, ChainAdvance, ChainState, RecurrenceChain};
pub use time_interval::{TimeInterval, TimeUnit};
pub use transaction::{Flow, RecurrenceDescriptor, RecurrenceKind, Transaction};
