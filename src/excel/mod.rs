//! Spreadsheet input
//!
//! Opens xls/xlsx/xlsb/ods workbooks through calamine and exposes one sheet
//! as a `Worksheet` (header row + data rows of typed cells).

mod reader;

pub use reader::{data_to_cell_value, WorkbookReader};
