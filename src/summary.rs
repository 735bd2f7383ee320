use crate::aggregator::Ledger;
use crate::utils::round2;
use schemars::JsonSchema;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize, JsonSchema)]
pub struct Summary {
    pub total_years: usize,
    pub total_amount: f64,
    pub years: Vec<String>,
}

impl Summary {
    pub fn from_ledger(ledger: &Ledger) -> Self {
        Self {
            total_years: ledger.len(),
            total_amount: round2(ledger.values().map(|l| l.total()).sum()),
            years: ledger.keys().cloned().collect(),
        }
    }
}
