//! Row → record mapping with optional deduplication by a unique key

use crate::core::labels::{
    required_labels, resolve_column, resolve_labels, LabelIndexMap, NOW, ROW_NUMBER,
};
use crate::core::template::{expand, RowContext, Template};
use crate::error::Xls2JsonResult;
use crate::types::{CellValue, ColumnSelector, Record, Worksheet};
use chrono::{SubsecRound, Utc};
use indexmap::map::Entry;
use indexmap::IndexMap;
use tracing::{debug, info};

/// The `_now` value for one run: UTC wall clock at millisecond precision
pub fn capture_now() -> CellValue {
    CellValue::DateTime(Utc::now().naive_utc().trunc_subsecs(3))
}

/// Resolve every label `template` needs (and the unique key), then map all
/// data rows of `sheet`. Resolution failures abort before any row is read.
pub fn map_worksheet(
    sheet: &Worksheet,
    template: &Template,
    unique_key: Option<&ColumnSelector>,
    now: &CellValue,
) -> Xls2JsonResult<Vec<Record>> {
    let header = sheet.header();
    let label_index_map = resolve_labels(header, &required_labels(template))?;
    let unique_column = unique_key
        .map(|selector| resolve_column(header, selector))
        .transpose()?;
    if let (Some(selector), Some(column)) = (unique_key, unique_column) {
        debug!(%selector, column, "resolved unique key");
    }

    map_rows(sheet.data_rows(), template, &label_index_map, now, unique_column)
}

/// Build the named values for one row: runtime fields first, then the
/// header-resolved cells. Reserved names are never shadowed.
pub fn build_row_context<'a>(
    row: &[CellValue],
    row_number: usize,
    label_index_map: &'a LabelIndexMap,
    now: &CellValue,
) -> RowContext<'a> {
    let mut context = RowContext::with_capacity(label_index_map.len() + 2);
    context.insert(ROW_NUMBER, CellValue::Number(row_number as f64));
    context.insert(NOW, now.clone());
    for (label, &column) in label_index_map {
        if context.contains_key(label.as_str()) {
            continue;
        }
        let value = row.get(column).cloned().unwrap_or(CellValue::Empty);
        context.insert(label.as_str(), value);
    }
    context
}

/// Expand `template` for every data row.
///
/// Without `unique_key` the result has one record per row in sheet order.
/// With it, rows sharing a key value collapse: the last row's record is
/// kept, at the position where the key was first seen.
pub fn map_rows<I, R>(
    rows: I,
    template: &Template,
    label_index_map: &LabelIndexMap,
    now: &CellValue,
    unique_key: Option<usize>,
) -> Xls2JsonResult<Vec<Record>>
where
    I: IntoIterator<Item = R>,
    R: AsRef<[CellValue]>,
{
    let mut records = Vec::new();
    let mut by_key: IndexMap<CellValue, Record> = IndexMap::new();
    let mut row_count = 0;

    for (index, row) in rows.into_iter().enumerate() {
        let row = row.as_ref();
        let row_number = index + 1;
        row_count = row_number;

        let context = build_row_context(row, row_number, label_index_map, now);
        let record = expand(template, &context)?;

        match unique_key {
            None => records.push(record),
            Some(column) => {
                let key = row.get(column).cloned().unwrap_or(CellValue::Empty);
                match by_key.entry(key) {
                    Entry::Occupied(mut entry) => {
                        debug!(key = %entry.key(), row_number, "duplicate unique key, keeping later row");
                        entry.insert(record);
                    }
                    Entry::Vacant(entry) => {
                        entry.insert(record);
                    }
                }
            }
        }
    }

    if unique_key.is_some() {
        records = by_key.into_values().collect();
        info!(
            rows = row_count,
            records = records.len(),
            "mapped rows with unique key"
        );
    } else {
        info!(rows = row_count, "mapped rows");
    }

    Ok(records)
}
