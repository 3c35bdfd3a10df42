//! Table reconstruction from flat cell streams.
//!
//! Cells arrive as one list per table, each tagged with a kind and a column
//! index. Headers and rows are rebuilt into index-addressed slots; cell order
//! within a row is not column-ascending in general.

use tracing::{debug, warn};

use crate::models::analysis::{Cell, TableElement};
use crate::models::table::DataTable;

fn column_headers(cells: &[Cell]) -> Vec<&Cell> {
    let mut headers: Vec<&Cell> = cells
        .iter()
        .filter(|cell| cell.is_header() && !cell.is_spanning())
        .collect();
    headers.sort_by_key(|cell| cell.column_index);
    headers
}

/// Column headers of a table.
///
/// Spanning headers (`columnSpan >= 2`) are dropped. The remaining headers
/// are ordered by column index, one slot per header; gaps left by dropped
/// headers are closed.
pub fn reconstruct_headers(cells: &[Cell]) -> Vec<String> {
    let headers = column_headers(cells);

    let contiguous = headers
        .iter()
        .enumerate()
        .all(|(slot, header)| header.column_index == slot);
    if !contiguous {
        warn!(
            "header column indices {:?} are not 0..{}; closing the gaps",
            headers.iter().map(|h| h.column_index).collect::<Vec<_>>(),
            headers.len()
        );
    }

    headers.into_iter().map(|header| header.content.clone()).collect()
}

/// Content rows of a table with `column_count` columns.
///
/// A new row starts every `column_count` content cells in stream order.
/// Within a row each cell lands at its column index. Rows are not repaired:
/// unfilled slots stay `None`, and a cell whose index is not below
/// `column_count` is kept past the row's width.
pub fn reconstruct_rows(cells: &[Cell], column_count: usize) -> Vec<Vec<Option<String>>> {
    build_rows(cells, column_count, |index| (index < column_count).then_some(index))
}

fn build_rows<F>(cells: &[Cell], column_count: usize, slot_of: F) -> Vec<Vec<Option<String>>>
where
    F: Fn(usize) -> Option<usize>,
{
    let content: Vec<&Cell> = cells.iter().filter(|cell| cell.is_content()).collect();

    if column_count == 0 {
        if !content.is_empty() {
            warn!("table has {} content cells but no column headers; no rows extracted", content.len());
        }
        return Vec::new();
    }

    let mut rows = Vec::with_capacity(content.len() / column_count + 1);
    let mut row = vec![None; column_count];

    for (position, cell) in content.iter().enumerate() {
        if position > 0 && position % column_count == 0 {
            rows.push(std::mem::replace(&mut row, vec![None; column_count]));
        }
        match slot_of(cell.column_index) {
            Some(slot) => place(&mut row, slot, &cell.content),
            None => {
                debug!("column {} has no header; kept past the row width", cell.column_index);
                row.push(Some(cell.content.clone()));
            }
        }
    }

    if !content.is_empty() {
        rows.push(row);
    }

    rows
}

/// Rebuild one table element into a [`DataTable`].
///
/// Content cells follow their header: a cell under the n-th header by column
/// index fills slot n.
pub fn reconstruct(table: &TableElement) -> DataTable {
    let header_indices: Vec<usize> = column_headers(&table.cells)
        .iter()
        .map(|header| header.column_index)
        .collect();
    let headers = reconstruct_headers(&table.cells);
    let rows = build_rows(&table.cells, header_indices.len(), |index| {
        header_indices.iter().position(|&h| h == index)
    });

    debug!("reconstructed table: {} columns, {} rows", headers.len(), rows.len());

    DataTable::new(headers, rows)
}

fn place(row: &mut [Option<String>], slot: usize, content: &str) {
    if row[slot].is_some() {
        debug!("column {} filled twice; keeping the later cell", slot);
    }
    row[slot] = Some(content.to_string());
}
