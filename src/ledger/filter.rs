use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Flow, Transaction};

/// Income/expense and category restrictions applied to transactions.
///
/// Categories are OR-ed together and AND-ed with the flow. An empty category list
/// means "any category".
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct TransactionFilter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flow: Option<Flow>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub categories: Vec<Uuid>,
}

impl TransactionFilter {
    pub fn new(flow: Option<Flow>, categories: &[Uuid]) -> Self {
        Self {
            flow,
            categories: categories.to_vec(),
        }
    }

    pub fn flow(flow: Flow) -> Self {
        Self {
            flow: Some(flow),
            categories: Vec::new(),
        }
    }

    pub fn matches(&self, txn: &Transaction) -> bool {
        let flow_ok = self.flow.map_or(true, |flow| txn.flow() == flow);
        let category_ok = self.categories.is_empty()
            || txn
                .category_id
                .map_or(false, |id| self.categories.contains(&id));
        flow_ok && category_ok
    }

    /// The amount a matching transaction contributes to a total.
    ///
    /// Unfiltered totals are signed nets; flow-filtered totals are magnitudes of that flow.
    pub fn contribution(&self, txn: &Transaction) -> f64 {
        match self.flow {
            Some(_) => txn.amount,
            None => txn.signed_amount(),
        }
    }
}
