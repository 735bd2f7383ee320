use crate::aggregator::Ledger;
use crate::classifier::SubtotalClaim;
use crate::utils::round2;
use log::{info, warn};
use schemars::JsonSchema;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize, JsonSchema)]
pub struct YearMatch {
    pub year: String,
    pub our_total: f64,
    pub expected: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, JsonSchema)]
pub struct YearMismatch {
    pub year: String,
    pub our_total: f64,
    pub expected: f64,
    pub diff: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, JsonSchema)]
pub struct ReconciliationReport {
    pub matches: Vec<YearMatch>,
    pub mismatches: Vec<YearMismatch>,
    pub total_match: bool,
    pub our_grand_total: f64,
    pub expected_grand_total: f64,
    pub total_diff: f64,
}

/// Cross-checks aggregated totals against the totals printed in the document.
pub struct Reconciler {
    tolerance: f64,
}

impl Reconciler {
    pub fn new(tolerance: f64) -> Self {
        Self { tolerance }
    }

    fn agrees(&self, diff: f64) -> bool {
        diff.abs() < self.tolerance
    }

    pub fn reconcile(&self, ledger: &Ledger, claims: &[SubtotalClaim]) -> ReconciliationReport {
        let mut matches = Vec::new();
        let mut mismatches = Vec::new();

        for (year, year_ledger) in ledger {
            let Some(claim) = claims.iter().find(|c| &c.year == year) else {
                continue;
            };

            let our_total = year_ledger.total();
            let expected = round2(claim.amount);
            let diff = round2(our_total - expected);

            if self.agrees(diff) {
                matches.push(YearMatch {
                    year: year.clone(),
                    our_total,
                    expected,
                });
            } else {
                warn!(
                    "Year {}: our total {} differs from printed total {} by {}",
                    year, our_total, expected, diff
                );
                mismatches.push(YearMismatch {
                    year: year.clone(),
                    our_total,
                    expected,
                    diff,
                });
            }
        }

        let our_grand_total = round2(ledger.values().map(|l| l.total()).sum());
        let expected_grand_total = round2(claims.iter().map(|c| c.amount).sum());
        let total_diff = round2(our_grand_total - expected_grand_total);
        let total_match = self.agrees(total_diff);

        info!(
            "Reconciliation: {} matching years, {} mismatching, grand total {} vs {}",
            matches.len(),
            mismatches.len(),
            our_grand_total,
            expected_grand_total
        );

        ReconciliationReport {
            matches,
            mismatches,
            total_match,
            our_grand_total,
            expected_grand_total,
            total_diff,
        }
    }
}
