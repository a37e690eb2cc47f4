//! Label extraction from templates and resolution against the header row

use crate::core::template::Template;
use crate::error::{Xls2JsonError, Xls2JsonResult};
use crate::types::{CellValue, ColumnSelector};
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

/// 1-based ordinal of the data row
pub const ROW_NUMBER: &str = "_row_number";
/// Timestamp captured once per run
pub const NOW: &str = "_now";
pub const RESERVED_LABELS: [&str; 2] = [ROW_NUMBER, NOW];

/// Label name → 0-based column position
pub type LabelIndexMap = BTreeMap<String, usize>;

pub fn is_reserved(label: &str) -> bool {
    RESERVED_LABELS.contains(&label)
}

/// All distinct placeholder names in a template, reserved ones included
pub fn extract_labels(template: &Template) -> BTreeSet<String> {
    template
        .leaves()
        .into_iter()
        .flat_map(|leaf| leaf.field_names())
        .map(str::to_string)
        .collect()
}

/// The labels the header row has to provide for `template`
pub fn required_labels(template: &Template) -> BTreeSet<String> {
    let mut labels = extract_labels(template);
    labels.retain(|label| !is_reserved(label));
    labels
}

/// Map every required label to its column.
///
/// A header cell matches when its text form equals the label. With
/// duplicate header labels the last column wins.
pub fn resolve_labels(
    header: &[CellValue],
    required: &BTreeSet<String>,
) -> Xls2JsonResult<LabelIndexMap> {
    let mut index_map = LabelIndexMap::new();
    for (column, cell) in header.iter().enumerate() {
        let text = cell.to_string();
        if required.contains(&text) {
            if let Some(previous) = index_map.insert(text.clone(), column) {
                debug!(label = %text, previous, column, "duplicate header label, using later column");
            }
        }
    }

    if let Some(missing) = required.iter().find(|label| !index_map.contains_key(*label)) {
        return Err(Xls2JsonError::LabelNotFound {
            label: missing.clone(),
            available: header_labels(header),
        });
    }

    debug!(labels = ?index_map, "resolved header labels");
    Ok(index_map)
}

/// Resolve a single column selector against the header row
pub fn resolve_column(header: &[CellValue], selector: &ColumnSelector) -> Xls2JsonResult<usize> {
    match selector {
        ColumnSelector::Index(index) if *index < header.len() => Ok(*index),
        ColumnSelector::Index(index) => Err(Xls2JsonError::Configuration(format!(
            "column index {index} is out of range, the header has {} columns",
            header.len()
        ))),
        ColumnSelector::Label(label) => {
            let required = BTreeSet::from([label.clone()]);
            let index_map = resolve_labels(header, &required)?;
            Ok(index_map[label])
        }
    }
}

fn header_labels(header: &[CellValue]) -> Vec<String> {
    header
        .iter()
        .filter(|cell| !cell.is_empty())
        .map(ToString::to_string)
        .collect()
}
