//! Plans recurrence catch-up for every live chain as one change set.

use chrono::NaiveDate;

use crate::{
    ledger::{
        live_members_by_series, ChainAdvance, RecurrenceChain, RecurrenceDescriptor,
        Transaction,
    },
    storage::{ChangeSet, DescriptorUpdate},
};

/// Writes needed to bring all chains up to date, plus what each chain did.
#[derive(Debug, Clone, Default)]
pub struct RecurrencePlan {
    pub changes: ChangeSet,
    pub advances: Vec<ChainAdvance>,
}

impl RecurrencePlan {
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    /// Number of transactions the plan creates.
    pub fn materialized(&self) -> usize {
        self.changes.inserts.len()
    }
}

/// Stateless helpers that turn live recurring transactions into materialized occurrences.
pub struct RecurrenceService;

impl RecurrenceService {
    /// Catches every chain owned by `live` up to the end of `today`.
    ///
    /// Transactions without a live descriptor are skipped, as are series that already
    /// hold more than one live member. Nothing is written here; the returned change set
    /// must be committed as a whole.
    pub fn plan(live: &[Transaction], today: NaiveDate) -> RecurrencePlan {
        let mut plan = RecurrencePlan::default();
        let live_counts = live_members_by_series(live);
        for txn in live {
            let Some(mut chain) = RecurrenceChain::from_live(txn) else {
                continue;
            };
            let members = live_counts.get(&chain.series_id()).copied().unwrap_or(0);
            if members > 1 {
                tracing::warn!(
                    series = %chain.series_id(),
                    transaction = %txn.id,
                    members,
                    "recurrence series has several live members, leaving it untouched"
                );
                continue;
            }
            let Some(advance) = chain.catch_up(today) else {
                continue;
            };
            plan.changes.descriptor_updates.push(DescriptorUpdate {
                transaction_id: advance.terminated,
                recurrence: RecurrenceDescriptor::none(),
            });
            plan.changes
                .inserts
                .extend(advance.materialized.iter().cloned());
            plan.advances.push(advance);
        }
        if !plan.is_empty() {
            tracing::debug!(
                chains = plan.advances.len(),
                created = plan.materialized(),
                "recurrence catch-up planned"
            );
        }
        plan
    }
}
