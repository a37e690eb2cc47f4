//! Single-column extraction, bypassing templates

use crate::core::labels::resolve_column;
use crate::error::Xls2JsonResult;
use crate::types::{CellValue, ColumnSelector, Worksheet};
use indexmap::IndexSet;
use tracing::info;

/// Resolve `selector` against the header of `sheet` and extract the column
pub fn extract_column(sheet: &Worksheet, selector: &ColumnSelector) -> Xls2JsonResult<Vec<CellValue>> {
    let column = resolve_column(sheet.header(), selector)?;
    Ok(extract_flat(sheet.data_rows(), column))
}

/// Distinct values of `column` across the data rows, in the order they first
/// appear. Empty cells, and rows too short to reach `column`, count as one
/// `Empty` value.
pub fn extract_flat<I, R>(rows: I, column: usize) -> Vec<CellValue>
where
    I: IntoIterator<Item = R>,
    R: AsRef<[CellValue]>,
{
    let mut seen = IndexSet::new();
    let mut row_count = 0usize;
    for row in rows {
        row_count += 1;
        // insert keeps the first position of a value already present
        seen.insert(row.as_ref().get(column).cloned().unwrap_or(CellValue::Empty));
    }

    info!(rows = row_count, distinct = seen.len(), column, "extracted column");
    seen.into_iter().collect()
}
