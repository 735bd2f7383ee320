use crate::grid::{Grid, GridRow};
use crate::layout::AnchorMarkers;

/// Column positions of the three fields the ledger needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnMap {
    pub year: usize,
    pub amount: usize,
    pub code: usize,
}

/// The index row of a fragment and the columns it identifies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Anchor {
    pub row: usize,
    pub columns: ColumnMap,
}

/// Finds the first row whose column 0 reads the index start and which carries
/// all three column markers. Rows with a matching column 0 but missing markers
/// (e.g. a data row numbered "1") are passed over.
pub fn locate_anchor(grid: &Grid, markers: &AnchorMarkers) -> Option<Anchor> {
    grid.rows().iter().find_map(|(&row_index, row)| {
        let first = row.get(&0).map(|t| t.trim()).unwrap_or("");
        if first != markers.index_start.trim() {
            return None;
        }

        let columns = ColumnMap {
            year: find_marker(row, &markers.year_marker)?,
            amount: find_marker(row, &markers.amount_marker)?,
            code: find_marker(row, &markers.code_marker)?,
        };

        Some(Anchor {
            row: row_index,
            columns,
        })
    })
}

fn find_marker(row: &GridRow, marker: &str) -> Option<usize> {
    let marker = marker.trim();
    row.iter()
        .find(|(_, text)| text.trim() == marker)
        .map(|(&col, _)| col)
}
