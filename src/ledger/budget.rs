use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::period::PeriodKind;

/// A spending limit for one period kind, optionally scoped to a category.
///
/// A budget without a category is the "overall" budget and counts every expense.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Budget {
    pub id: Uuid,
    pub amount: f64,
    pub period: PeriodKind,
    pub start: NaiveDateTime,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_id: Option<Uuid>,
}

impl Budget {
    pub fn new(amount: f64, period: PeriodKind, start: NaiveDateTime) -> Self {
        Self {
            id: Uuid::new_v4(),
            amount,
            period,
            start,
            category_id: None,
        }
    }

    pub fn for_category(mut self, category_id: Uuid) -> Self {
        self.category_id = Some(category_id);
        self
    }
}
