//! Budget period rollover and leftover calculations.

use chrono::NaiveDateTime;
use serde::Serialize;
use uuid::Uuid;

use crate::{
    config::CalendarConfig,
    ledger::{compute_period, Budget, Flow, Period, Transaction, TransactionFilter},
    storage::{BudgetStartUpdate, ChangeSet},
};

/// A budget after its start was moved past every elapsed period.
#[derive(Debug, Clone, PartialEq)]
pub struct Rollover {
    pub budget: Budget,
    /// How many whole periods were skipped.
    pub periods: usize,
}

/// Budget start moves for a batch of budgets.
#[derive(Debug, Clone, Default)]
pub struct RolloverPlan {
    pub changes: ChangeSet,
    /// Only budgets whose start moved, already updated.
    pub updated: Vec<Budget>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BudgetStatus {
    pub budget_id: Uuid,
    pub period: Period,
    pub amount: f64,
    pub spent: f64,
    /// `amount - spent`; negative when over budget.
    pub leftover: f64,
}

/// Stateless helpers over [`Budget`] values.
pub struct BudgetService;

impl BudgetService {
    /// Advances `budget.start` one period at a time until its period ends after `now`.
    pub fn roll_forward(budget: &Budget, now: NaiveDateTime, config: &CalendarConfig) -> Rollover {
        let mut rolled = budget.clone();
        let mut periods = 0;
        loop {
            let period = compute_period(rolled.start, rolled.period, config);
            if period.end > now || period.end <= rolled.start {
                break;
            }
            rolled.start = period.end;
            periods += 1;
        }
        if periods > 0 {
            tracing::debug!(
                budget = %budget.id,
                periods,
                start = %rolled.start,
                "budget rolled over"
            );
        }
        Rollover {
            budget: rolled,
            periods,
        }
    }

    pub fn plan_rollovers(
        budgets: &[Budget],
        now: NaiveDateTime,
        config: &CalendarConfig,
    ) -> RolloverPlan {
        let mut plan = RolloverPlan::default();
        for budget in budgets {
            let rollover = Self::roll_forward(budget, now, config);
            if rollover.periods == 0 {
                continue;
            }
            plan.changes.budget_starts.push(BudgetStartUpdate {
                budget_id: budget.id,
                start: rollover.budget.start,
            });
            plan.updated.push(rollover.budget);
        }
        plan
    }

    /// Expenses in the budget's category, or every expense for the overall budget.
    pub fn spending_filter(budget: &Budget) -> TransactionFilter {
        let categories: Vec<Uuid> = budget.category_id.into_iter().collect();
        TransactionFilter::new(Some(Flow::Expense), &categories)
    }

    /// The period a budget is measured over at `now`, after rollover.
    pub fn current_period(budget: &Budget, now: NaiveDateTime, config: &CalendarConfig) -> Period {
        let rolled = Self::roll_forward(budget, now, config).budget;
        compute_period(rolled.start, rolled.period, config)
    }

    /// Spending and leftover for `budget` in its current period.
    ///
    /// `transactions` may be wider than the period; anything outside it is ignored.
    pub fn status(
        budget: &Budget,
        transactions: &[Transaction],
        now: NaiveDateTime,
        config: &CalendarConfig,
    ) -> BudgetStatus {
        let period = Self::current_period(budget, now, config);
        let filter = Self::spending_filter(budget);
        let spent: f64 = transactions
            .iter()
            .filter(|txn| period.contains(txn.date) && filter.matches(txn))
            .map(|txn| txn.amount)
            .sum();
        BudgetStatus {
            budget_id: budget.id,
            period,
            amount: budget.amount,
            spent,
            leftover: budget.amount - spent,
        }
    }
}
