use crate::stitcher::LogicalRow;
use crate::utils::{extract_amount, extract_code, extract_year};
use log::debug;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// One line of the declaration that parsed on year, code and amount.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct IncomeRecord {
    pub year: String,
    pub code: String,
    pub code_name: String,
    pub amount: f64,
}

/// A yearly total printed by the document itself. Only used for verification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SubtotalClaim {
    pub year: String,
    pub amount: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ClassifiedRow {
    Record(IncomeRecord),
    Subtotal(SubtotalClaim),
    Dropped,
}

/// Decides whether a row is one the document printed as a total.
pub trait RowPredicate: Send + Sync {
    fn matches(&self, row: &LogicalRow) -> bool;
}

/// Case-insensitive substring match of any marker against any cell of the row.
#[derive(Debug, Clone)]
pub struct MarkerPredicate {
    markers: Vec<String>,
}

impl MarkerPredicate {
    pub fn new<I, S>(markers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            markers: markers
                .into_iter()
                .map(|m| m.as_ref().trim().to_lowercase())
                .filter(|m| !m.is_empty())
                .collect(),
        }
    }
}

impl RowPredicate for MarkerPredicate {
    fn matches(&self, row: &LogicalRow) -> bool {
        row.raw_row.iter().any(|cell| {
            let lowered = cell.to_lowercase();
            self.markers.iter().any(|m| lowered.contains(m.as_str()))
        })
    }
}

pub struct RowClassifier<'a> {
    subtotal: &'a dyn RowPredicate,
}

impl<'a> RowClassifier<'a> {
    pub fn new(subtotal: &'a dyn RowPredicate) -> Self {
        Self { subtotal }
    }

    pub fn classify(&self, row: &LogicalRow) -> ClassifiedRow {
        if self.subtotal.matches(row) {
            return match (extract_year(&row.year_text), extract_amount(&row.amount_text)) {
                (Some(year), Some(amount)) => ClassifiedRow::Subtotal(SubtotalClaim { year, amount }),
                _ => {
                    debug!(
                        "Table {} row {}: total row without year/amount, skipped",
                        row.source_table_index, row.source_row_index
                    );
                    ClassifiedRow::Dropped
                }
            };
        }

        let Some(year) = extract_year(&row.year_text) else {
            debug!(
                "Table {} row {}: no year in '{}'",
                row.source_table_index, row.source_row_index, row.year_text
            );
            return ClassifiedRow::Dropped;
        };

        let Some(amount) = extract_amount(&row.amount_text) else {
            debug!(
                "Table {} row {}: no amount in '{}'",
                row.source_table_index, row.source_row_index, row.amount_text
            );
            return ClassifiedRow::Dropped;
        };

        let Some((code, code_name)) = extract_code(&row.code_text) else {
            debug!(
                "Table {} row {}: no code in '{}'",
                row.source_table_index, row.source_row_index, row.code_text
            );
            return ClassifiedRow::Dropped;
        };

        ClassifiedRow::Record(IncomeRecord {
            year,
            code,
            code_name,
            amount,
        })
    }

    /// Splits a row stream into records and subtotal claims, dropping the rest.
    pub fn split(&self, rows: &[LogicalRow]) -> (Vec<IncomeRecord>, Vec<SubtotalClaim>) {
        let mut records = Vec::new();
        let mut subtotals = Vec::new();

        for row in rows {
            match self.classify(row) {
                ClassifiedRow::Record(record) => records.push(record),
                ClassifiedRow::Subtotal(claim) => subtotals.push(claim),
                ClassifiedRow::Dropped => {}
            }
        }

        debug!(
            "Classified {} rows: {} records, {} subtotals",
            rows.len(),
            records.len(),
            subtotals.len()
        );

        (records, subtotals)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(year: &str, amount: &str, code: &str) -> LogicalRow {
        LogicalRow {
            source_table_index: 1,
            source_row_index: 0,
            year_text: year.to_string(),
            amount_text: amount.to_string(),
            code_text: code.to_string(),
            raw_row: vec![
                "1".to_string(),
                year.to_string(),
                amount.to_string(),
                code.to_string(),
            ],
        }
    }

    #[test]
    fn test_data_row() {
        let predicate = MarkerPredicate::new(["total"]);
        let classifier = RowClassifier::new(&predicate);

        let result = classifier.classify(&row("2022", "9387.08", "101 - Заробітна плата"));
        assert_eq!(
            result,
            ClassifiedRow::Record(IncomeRecord {
                year: "2022".to_string(),
                code: "101".to_string(),
                code_name: "Заробітна плата".to_string(),
                amount: 9387.08,
            })
        );
    }

    #[test]
    fn test_total_row_is_a_claim() {
        let predicate = MarkerPredicate::new(["total"]);
        let classifier = RowClassifier::new(&predicate);

        let mut total = row("2022", "10 887,08", "");
        total.raw_row[0] = "TOTAL".to_string();

        assert_eq!(
            classifier.classify(&total),
            ClassifiedRow::Subtotal(SubtotalClaim {
                year: "2022".to_string(),
                amount: 10887.08,
            })
        );
    }

    #[test]
    fn test_total_row_never_becomes_a_record() {
        let predicate = MarkerPredicate::new(["total"]);
        let classifier = RowClassifier::new(&predicate);

        let mut total = row("", "500.00", "101");
        total.raw_row[0] = "Total".to_string();

        assert_eq!(classifier.classify(&total), ClassifiedRow::Dropped);
    }

    #[test]
    fn test_incomplete_rows_dropped() {
        let predicate = MarkerPredicate::new(["total"]);
        let classifier = RowClassifier::new(&predicate);

        assert_eq!(classifier.classify(&row("", "1.00", "101")), ClassifiedRow::Dropped);
        assert_eq!(classifier.classify(&row("2022", "n/a", "101")), ClassifiedRow::Dropped);
        assert_eq!(classifier.classify(&row("2022", "1.00", "")), ClassifiedRow::Dropped);
    }

    #[test]
    fn test_custom_markers() {
        let predicate = MarkerPredicate::new(["Усього", "  "]);
        let classifier = RowClassifier::new(&predicate);

        let mut total = row("2021", "42.00", "");
        total.raw_row[0] = "усього за рік".to_string();

        assert!(matches!(classifier.classify(&total), ClassifiedRow::Subtotal(_)));
    }

    #[test]
    fn test_split() {
        let predicate = MarkerPredicate::new(["total"]);
        let classifier = RowClassifier::new(&predicate);

        let mut total = row("2022", "3.00", "");
        total.raw_row[0] = "Total".to_string();
        let rows = vec![
            row("2022", "1.00", "101"),
            row("", "", ""),
            total,
            row("2022", "2.00", "102 - Премія"),
        ];

        let (records, subtotals) = classifier.split(&rows);
        assert_eq!(records.len(), 2);
        assert_eq!(subtotals.len(), 1);
        assert_eq!(records[1].code_name, "Премія");
    }
}
