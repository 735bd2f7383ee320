use crate::error::{IncomeLedgerError, Result};
use crate::grid::Grid;
use crate::header::{locate_anchor, ColumnMap};
use crate::layout::AnchorMarkers;
use crate::schema::Table;
use log::{debug, info};

/// A table row after column roles have been resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct LogicalRow {
    pub source_table_index: usize,
    pub source_row_index: usize,
    pub year_text: String,
    pub amount_text: String,
    pub code_text: String,
    pub raw_row: Vec<String>,
}

impl LogicalRow {
    pub fn from_grid(grid: &Grid, table_index: usize, row_index: usize, columns: ColumnMap) -> Self {
        Self {
            source_table_index: table_index,
            source_row_index: row_index,
            year_text: grid.text(row_index, columns.year).to_string(),
            amount_text: grid.text(row_index, columns.amount).to_string(),
            code_text: grid.text(row_index, columns.code).to_string(),
            raw_row: grid.row_texts(row_index),
        }
    }
}

/// Merges table fragments into one ordered row stream.
///
/// Fragment 0 is the letterhead and never carries data. Fragment 1 must hold
/// an index row; its columns are reused for every later fragment that has no
/// index row of its own.
pub struct Stitcher<'a> {
    markers: &'a AnchorMarkers,
}

impl<'a> Stitcher<'a> {
    pub fn new(markers: &'a AnchorMarkers) -> Self {
        Self { markers }
    }

    pub fn stitch(&self, tables: &[Table]) -> Result<Vec<LogicalRow>> {
        if tables.len() < 2 {
            return Err(IncomeLedgerError::InsufficientFragments {
                found: tables.len(),
            });
        }

        debug!("Skipping preamble fragment 0");

        let first_grid = Grid::from_table(&tables[1]);
        let first_anchor = locate_anchor(&first_grid, self.markers)
            .ok_or(IncomeLedgerError::AnchorNotFound { table_index: 1 })?;
        let fallback_columns = first_anchor.columns;

        info!(
            "Table 1: anchor row {} (year col {}, amount col {}, code col {})",
            first_anchor.row,
            fallback_columns.year,
            fallback_columns.amount,
            fallback_columns.code
        );

        let mut rows = Vec::new();
        collect_rows(&first_grid, 1, Some(first_anchor.row), fallback_columns, &mut rows);

        for (table_index, table) in tables.iter().enumerate().skip(2) {
            let grid = Grid::from_table(table);

            let (anchor_row, columns) = match locate_anchor(&grid, self.markers) {
                Some(anchor) => {
                    debug!(
                        "Table {}: own anchor row {} ({:?})",
                        table_index, anchor.row, anchor.columns
                    );
                    (Some(anchor.row), anchor.columns)
                }
                None => {
                    debug!(
                        "Table {}: no anchor row, reusing columns from table 1",
                        table_index
                    );
                    (None, fallback_columns)
                }
            };

            collect_rows(&grid, table_index, anchor_row, columns, &mut rows);
        }

        info!(
            "Stitched {} rows from {} data fragments",
            rows.len(),
            tables.len() - 1
        );

        Ok(rows)
    }
}

fn collect_rows(
    grid: &Grid,
    table_index: usize,
    anchor_row: Option<usize>,
    columns: ColumnMap,
    out: &mut Vec<LogicalRow>,
) {
    for &row_index in grid.rows().keys() {
        if anchor_row.is_some_and(|anchor| row_index <= anchor) {
            continue;
        }
        out.push(LogicalRow::from_grid(grid, table_index, row_index, columns));
    }
}
