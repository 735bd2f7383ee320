use crate::schema::Table;
use std::collections::{BTreeMap, HashMap};

pub type GridRow = BTreeMap<usize, String>;

/// Addressable view of one table fragment, rebuilt per table.
#[derive(Debug, Clone, Default)]
pub struct Grid {
    row_count: usize,
    col_count: usize,
    points: HashMap<(usize, usize), String>,
    rows: BTreeMap<usize, GridRow>,
}

impl Grid {
    pub fn from_table(table: &Table) -> Self {
        let mut grid = Self {
            row_count: table.row_count,
            col_count: table.col_count,
            ..Self::default()
        };

        for cell in &table.cells {
            if cell.row_index >= table.row_count || cell.col_index >= table.col_count {
                continue;
            }

            grid.points
                .insert((cell.row_index, cell.col_index), cell.text.clone());
            grid.rows
                .entry(cell.row_index)
                .or_default()
                .insert(cell.col_index, cell.text.clone());
        }

        grid
    }

    pub fn row_count(&self) -> usize {
        self.row_count
    }

    pub fn col_count(&self) -> usize {
        self.col_count
    }

    /// Text at a position; absent cells read back as empty text.
    pub fn text(&self, row: usize, col: usize) -> &str {
        self.points.get(&(row, col)).map(String::as_str).unwrap_or("")
    }

    /// Rows that carry at least one cell, in ascending row order.
    pub fn rows(&self) -> &BTreeMap<usize, GridRow> {
        &self.rows
    }

    /// Dense copy of a row, one entry per column.
    pub fn row_texts(&self, row: usize) -> Vec<String> {
        (0..self.col_count)
            .map(|col| self.text(row, col).to_string())
            .collect()
    }
}

/// Dense table fixture for unit tests: `rows[r][c]` becomes the cell at `(r, c)`.
#[cfg(test)]
pub(crate) fn table_from_rows(rows: &[&[&str]]) -> Table {
    use crate::schema::Cell;

    let col_count = rows.iter().map(|r| r.len()).max().unwrap_or(0);
    let cells = rows
        .iter()
        .enumerate()
        .flat_map(|(r, row)| {
            row.iter().enumerate().map(move |(c, text)| Cell {
                row_index: r,
                col_index: c,
                text: text.to_string(),
                byte_offset: None,
                page_number: None,
            })
        })
        .collect();
    Table {
        row_count: rows.len(),
        col_count,
        cells,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Cell;

    fn cell(row: usize, col: usize, text: &str) -> Cell {
        Cell {
            row_index: row,
            col_index: col,
            text: text.to_string(),
            byte_offset: None,
            page_number: None,
        }
    }

    #[test]
    fn test_grid_lookup() {
        let table = Table {
            row_count: 2,
            col_count: 3,
            cells: vec![cell(0, 0, "a"), cell(1, 2, "f")],
        };
        let grid = Grid::from_table(&table);

        assert_eq!(grid.text(0, 0), "a");
        assert_eq!(grid.text(1, 2), "f");
        assert_eq!(grid.text(1, 1), "");
        assert_eq!(grid.row_texts(1), vec!["", "", "f"]);
        assert_eq!(grid.rows().len(), 2);
    }

    #[test]
    fn test_out_of_range_cells_ignored() {
        let table = Table {
            row_count: 1,
            col_count: 1,
            cells: vec![cell(0, 0, "ok"), cell(3, 0, "row"), cell(0, 5, "col")],
        };
        let grid = Grid::from_table(&table);

        assert_eq!(grid.rows().len(), 1);
        assert_eq!(grid.rows()[&0].len(), 1);
        assert_eq!(grid.text(3, 0), "");
    }

    #[test]
    fn test_ragged_fixture_rows() {
        let grid = Grid::from_table(&table_from_rows(&[&["a", "b", "c"], &["d"]]));

        assert_eq!(grid.col_count(), 3);
        assert_eq!(grid.row_texts(1), vec!["d", "", ""]);
    }
}
