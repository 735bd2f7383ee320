use crate::classifier::IncomeRecord;
use crate::utils::{cents_to_amount, micros_to_cents, to_micros};
use log::{debug, info};
use schemars::JsonSchema;
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize, JsonSchema)]
pub struct CodeEntry {
    pub name: String,
    pub amount: f64,
}

/// Income of one year broken down by code.
///
/// Serializes as a flat object of code entries plus a `"_total"` key. The
/// total is recomputed from the entries and cannot be set on its own.
/// Amounts are summed as whole millionths, so the result does not depend on
/// the order records arrive in.
#[derive(Debug, Clone, Default, PartialEq, Serialize, JsonSchema)]
pub struct YearLedger {
    #[serde(flatten)]
    entries: BTreeMap<String, CodeEntry>,

    #[serde(rename = "_total")]
    total: f64,
}

impl YearLedger {
    pub fn entries(&self) -> &BTreeMap<String, CodeEntry> {
        &self.entries
    }

    pub fn get(&self, code: &str) -> Option<&CodeEntry> {
        self.entries.get(code)
    }

    pub fn total(&self) -> f64 {
        self.total
    }

    fn from_entries(entries: BTreeMap<String, CodeEntry>) -> Self {
        let cents: i128 = entries
            .values()
            .map(|e| micros_to_cents(to_micros(e.amount)))
            .sum();
        let total = cents_to_amount(cents);
        Self { entries, total }
    }
}

/// Year → ledger, both levels in ascending key order.
pub type Ledger = BTreeMap<String, YearLedger>;

#[derive(Default)]
struct Bucket {
    name: String,
    micros: i128,
}

pub fn aggregate(records: &[IncomeRecord]) -> Ledger {
    info!("Grouping and summing {} records", records.len());

    let mut grouped: BTreeMap<&str, BTreeMap<&str, Bucket>> = BTreeMap::new();

    for (idx, record) in records.iter().enumerate() {
        let bucket = grouped
            .entry(record.year.as_str())
            .or_default()
            .entry(record.code.as_str())
            .or_default();

        bucket.micros += to_micros(record.amount);
        if bucket.name.is_empty() && !record.code_name.is_empty() {
            bucket.name = record.code_name.clone();
        }

        debug!(
            "Record {}: {}/{} += {} (total now: {})",
            idx,
            record.year,
            record.code,
            record.amount,
            bucket.micros as f64 / 1_000_000.0
        );
    }

    grouped
        .into_iter()
        .map(|(year, codes)| {
            let entries: BTreeMap<String, CodeEntry> = codes
                .into_iter()
                .map(|(code, bucket)| {
                    (
                        code.to_string(),
                        CodeEntry {
                            name: bucket.name,
                            amount: cents_to_amount(micros_to_cents(bucket.micros)),
                        },
                    )
                })
                .collect();

            let ledger = YearLedger::from_entries(entries);
            info!(
                "Year {} total: {} ({} codes)",
                year,
                ledger.total(),
                ledger.entries().len()
            );
            (year.to_string(), ledger)
        })
        .collect()
}
