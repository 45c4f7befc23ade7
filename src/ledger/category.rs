use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Categorises ledger activity for budgeting and reporting.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    pub emoji: String,
    pub colour: String,
    pub income: bool,
    pub order: u32,
}

impl Category {
    pub fn new(name: impl Into<String>, emoji: impl Into<String>, income: bool) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            emoji: emoji.into(),
            colour: "#808080".into(),
            income,
            order: 0,
        }
    }

    pub fn with_order(mut self, order: u32) -> Self {
        self.order = order;
        self
    }
}
