use crate::classifier::{IncomeRecord, MarkerPredicate, RowClassifier, SubtotalClaim};
use crate::error::Result;
use crate::grid::Grid;
use crate::header::ColumnMap;
use crate::layout::{HeaderKeywords, LayoutProfile};
use crate::schema::Document;
use crate::stitcher::{LogicalRow, Stitcher};
use log::{debug, info};
use once_cell::sync::Lazy;
use regex::Regex;

/// Records and printed totals pulled out of one document by one strategy.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Extraction {
    pub records: Vec<IncomeRecord>,
    pub subtotals: Vec<SubtotalClaim>,
}

pub trait ExtractionStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    /// An `Err` is structural and aborts the whole parse; an empty
    /// `Extraction` hands over to the next strategy.
    fn extract(&self, document: &Document, profile: &LayoutProfile) -> Result<Extraction>;
}

/// The strategies tried in order when none are configured explicitly.
pub fn default_strategies() -> Vec<Box<dyn ExtractionStrategy>> {
    vec![
        Box::new(StitchedTables),
        Box::new(KeywordHeaderTables),
        Box::new(RawText),
    ]
}

fn classify_rows(rows: &[LogicalRow], profile: &LayoutProfile) -> Extraction {
    let predicate = MarkerPredicate::new(&profile.subtotal_markers);
    let (records, subtotals) = RowClassifier::new(&predicate).split(rows);
    Extraction { records, subtotals }
}

/// Index-row anchored extraction over all fragments stitched together.
pub struct StitchedTables;

impl ExtractionStrategy for StitchedTables {
    fn name(&self) -> &'static str {
        "stitched_tables"
    }

    fn extract(&self, document: &Document, profile: &LayoutProfile) -> Result<Extraction> {
        let rows = Stitcher::new(&profile.anchor).stitch(&document.tables)?;
        Ok(classify_rows(&rows, profile))
    }
}

/// Per-table extraction for tables whose columns are recognizable only by
/// their printed header text.
pub struct KeywordHeaderTables;

impl KeywordHeaderTables {
    fn locate_columns(grid: &Grid, keywords: &HeaderKeywords) -> Option<(usize, ColumnMap)> {
        let mut year = None;
        let mut amount = None;
        let mut code = None;
        let mut last_header_row = None;

        for (&row_index, row) in grid.rows().range(..keywords.scan_rows) {
            for (&col, text) in row {
                let mut hit = false;
                if HeaderKeywords::matches(&keywords.year, text) {
                    year = Some(col);
                    hit = true;
                }
                if HeaderKeywords::matches(&keywords.amount, text) {
                    amount = Some(col);
                    hit = true;
                }
                if HeaderKeywords::matches(&keywords.code, text) {
                    code = Some(col);
                    hit = true;
                }
                if hit {
                    last_header_row = Some(row_index);
                }
            }
        }

        let columns = ColumnMap {
            year: year?,
            amount: amount?,
            code: code?,
        };
        Some((last_header_row?, columns))
    }
}

impl ExtractionStrategy for KeywordHeaderTables {
    fn name(&self) -> &'static str {
        "keyword_header_tables"
    }

    fn extract(&self, document: &Document, profile: &LayoutProfile) -> Result<Extraction> {
        let mut rows = Vec::new();

        for (table_index, table) in document.tables.iter().enumerate() {
            let grid = Grid::from_table(table);
            let Some((header_row, columns)) =
                Self::locate_columns(&grid, &profile.header_keywords)
            else {
                debug!("Table {}: header keywords not found", table_index);
                continue;
            };

            debug!(
                "Table {}: header row {} ({:?})",
                table_index, header_row, columns
            );

            rows.extend(
                grid.rows()
                    .range(header_row + 1..)
                    .map(|(&row_index, _)| LogicalRow::from_grid(&grid, table_index, row_index, columns)),
            );
        }

        Ok(classify_rows(&rows, profile))
    }
}

static TEXT_YEAR: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b(20[0-9]{2})\b").unwrap());
static TEXT_AMOUNT: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b([0-9]+\.[0-9]{2})\b").unwrap());
static TEXT_CODE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b([0-9]{3})\s*-\s*([^\n]+)").unwrap());

/// Line-based fallback over the document's full text.
pub struct RawText;

impl RawText {
    fn parse_line(line: &str) -> Option<IncomeRecord> {
        let year = TEXT_YEAR.captures(line)?.get(1)?.as_str().to_string();
        let amount = TEXT_AMOUNT
            .captures(line)?
            .get(1)?
            .as_str()
            .parse::<f64>()
            .ok()?;
        let code_caps = TEXT_CODE.captures(line)?;

        Some(IncomeRecord {
            year,
            code: code_caps.get(1)?.as_str().to_string(),
            code_name: code_caps.get(2)?.as_str().trim().to_string(),
            amount,
        })
    }
}

impl ExtractionStrategy for RawText {
    fn name(&self) -> &'static str {
        "raw_text"
    }

    fn extract(&self, document: &Document, _profile: &LayoutProfile) -> Result<Extraction> {
        let records: Vec<IncomeRecord> = document.content.lines().filter_map(Self::parse_line).collect();
        info!("Extracted {} records from text", records.len());
        Ok(Extraction {
            records,
            subtotals: Vec::new(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::IncomeLedgerError;
    use crate::grid::table_from_rows;

    #[test]
    fn test_stitched_tables_propagates_structural_errors() {
        let document = Document {
            content: String::new(),
            tables: vec![table_from_rows(&[&["letterhead"]])],
        };
        let result = StitchedTables.extract(&document, &LayoutProfile::default());
        assert!(matches!(
            result,
            Err(IncomeLedgerError::InsufficientFragments { found: 1 })
        ));
    }

    #[test]
    fn test_keyword_header_tables() {
        let document = Document {
            content: String::new(),
            tables: vec![table_from_rows(&[
                &["№", "Рік", "Сума доходу нарахованого", "Код та назва ознаки доходу"],
                &["1", "2022", "100,50", "101 - Заробітна плата"],
                &["2", "2022", "49.50", "101"],
                &["", "", "", ""],
            ])],
        };

        let extraction = KeywordHeaderTables
            .extract(&document, &LayoutProfile::default())
            .unwrap();

        assert_eq!(extraction.records.len(), 2);
        assert_eq!(extraction.records[0].amount, 100.5);
        assert_eq!(extraction.records[0].code_name, "Заробітна плата");
        assert_eq!(extraction.records[1].code_name, "");
    }

    #[test]
    fn test_keyword_header_tables_skips_tables_without_headers() {
        let document = Document {
            content: String::new(),
            tables: vec![table_from_rows(&[&["1", "2022", "100.00", "101"]])],
        };

        let extraction = KeywordHeaderTables
            .extract(&document, &LayoutProfile::default())
            .unwrap();
        assert!(extraction.records.is_empty());
    }

    #[test]
    fn test_raw_text_lines() {
        let document = Document {
            content: "Довідка про доходи\n1 2022 9387.08 9387.08 101 - Заробітна плата\n2 2023 no amount 102 - Премія\n"
                .to_string(),
            tables: Vec::new(),
        };

        let extraction = RawText.extract(&document, &LayoutProfile::default()).unwrap();
        assert_eq!(
            extraction.records,
            vec![IncomeRecord {
                year: "2022".to_string(),
                code: "101".to_string(),
                code_name: "Заробітна плата".to_string(),
                amount: 9387.08,
            }]
        );
    }

    #[test]
    fn test_default_strategy_order() {
        let names: Vec<&str> = default_strategies().iter().map(|s| s.name()).collect();
        assert_eq!(names, vec!["stitched_tables", "keyword_header_tables", "raw_text"]);
    }
}
