//! xls2json - spreadsheet rows to templated JSON records
//!
//! Reads one sheet of a workbook, resolves the header labels a template
//! refers to, and expands the template once per data row.
//!
//! # Features
//!
//! - Nested JSON templates with `{label}` / `{label:spec}` placeholders
//! - Runtime fields `_row_number` and `_now`
//! - Deduplication by a unique key (last row wins, first-seen order)
//! - Flat extraction of the distinct values of one column
//!
//! # Example
//!
//! ```no_run
//! use xls2json::core::{capture_now, map_worksheet};
//! use xls2json::excel::WorkbookReader;
//! use xls2json::parser::parse_template_str;
//!
//! let template = parse_template_str(r#"{"user_id": "{id}", "contact": "{email}"}"#)?;
//! let mut reader = WorkbookReader::open("users.xlsx")?;
//! let sheet = reader.worksheet("Sheet1")?;
//! let records = map_worksheet(&sheet, &template, None, &capture_now())?;
//!
//! println!("Records: {}", records.len());
//! # Ok::<(), xls2json::error::Xls2JsonError>(())
//! ```

pub mod cli;
pub mod core;
pub mod error;
pub mod excel;
pub mod parser;
pub mod types;
pub mod writer;

// Re-export commonly used types
pub use error::{Xls2JsonError, Xls2JsonResult};
pub use types::{CellValue, ColumnSelector, Record, Worksheet};
