//! Mapping engine: label resolution, template expansion, row mapping and
//! flat column extraction

pub mod flat;
pub mod format_spec;
pub mod labels;
pub mod mapper;
pub mod template;

pub use flat::{extract_column, extract_flat};
pub use format_spec::FormatSpec;
pub use labels::{extract_labels, required_labels, resolve_column, resolve_labels, LabelIndexMap};
pub use mapper::{build_row_context, capture_now, map_rows, map_worksheet};
pub use template::{expand, FormatString, RowContext, Segment, Template};
