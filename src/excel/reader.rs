//! Workbook reader - Excel/ODS sheet → `Worksheet`

use crate::error::{Xls2JsonError, Xls2JsonResult};
use crate::types::{CellValue, Row, Worksheet};
use calamine::{open_workbook_auto, open_workbook_auto_from_rs, Data, Range, Reader, Sheets};
use chrono::{NaiveDate, NaiveDateTime, SubsecRound};
use std::fs::File;
use std::io::{BufReader, Cursor};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// An opened workbook, read from disk or from decrypted bytes
enum Source {
    File(Sheets<BufReader<File>>),
    Decrypted(Sheets<Cursor<Vec<u8>>>),
}

/// Reads sheets from an xls, xlsx, xlsb or ods workbook
pub struct WorkbookReader {
    path: PathBuf,
    source: Source,
}

fn ensure_exists(path: &Path) -> Xls2JsonResult<()> {
    if path.exists() {
        return Ok(());
    }
    Err(Xls2JsonError::Io(std::io::Error::new(
        std::io::ErrorKind::NotFound,
        format!("workbook not found: {}", path.display()),
    )))
}

impl WorkbookReader {
    /// Open a workbook, detecting the format from the file extension
    pub fn open<P: AsRef<Path>>(path: P) -> Xls2JsonResult<Self> {
        let path = path.as_ref().to_path_buf();
        ensure_exists(&path)?;
        let workbook = open_workbook_auto(&path).map_err(|e| {
            Xls2JsonError::Workbook(format!("Failed to open {}: {}", path.display(), e))
        })?;
        Ok(Self {
            path,
            source: Source::File(workbook),
        })
    }

    /// Decrypt a password-protected Office workbook in memory, then open it
    pub fn open_with_password<P: AsRef<Path>>(path: P, password: &str) -> Xls2JsonResult<Self> {
        let path = path.as_ref().to_path_buf();
        ensure_exists(&path)?;
        let encrypted = std::fs::read(&path)?;
        let decrypted = office_crypto::decrypt_from_bytes(encrypted, password).map_err(|e| {
            Xls2JsonError::Workbook(format!("Failed to decrypt {}: {}", path.display(), e))
        })?;
        info!(file = %path.display(), bytes = decrypted.len(), "decrypted workbook");

        let workbook = open_workbook_auto_from_rs(Cursor::new(decrypted)).map_err(|e| {
            Xls2JsonError::Workbook(format!("Failed to open {}: {}", path.display(), e))
        })?;
        Ok(Self {
            path,
            source: Source::Decrypted(workbook),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn sheet_names(&self) -> Vec<String> {
        match &self.source {
            Source::File(workbook) => workbook.sheet_names(),
            Source::Decrypted(workbook) => workbook.sheet_names(),
        }
    }

    /// Load one sheet by name
    pub fn worksheet(&mut self, name: &str) -> Xls2JsonResult<Worksheet> {
        let available = self.sheet_names();
        if !available.iter().any(|sheet| sheet == name) {
            return Err(Xls2JsonError::SheetNotFound {
                name: name.to_string(),
                available,
            });
        }

        let range = match &mut self.source {
            Source::File(workbook) => workbook.worksheet_range(name),
            Source::Decrypted(workbook) => workbook.worksheet_range(name),
        }
        .map_err(|e| Xls2JsonError::Workbook(format!("Failed to read sheet '{}': {}", name, e)))?;
        let rows = range_to_rows(&range);
        debug!(sheet = name, rows = rows.len(), "loaded worksheet");
        Ok(Worksheet::new(name, rows))
    }
}

/// Convert a calamine range into rows anchored at cell A1, so column
/// positions match the sheet's lettering even when the used range starts
/// further down or to the right.
fn range_to_rows(range: &Range<Data>) -> Vec<Row> {
    let Some((start_row, start_col)) = range.start() else {
        return Vec::new();
    };
    let (start_row, start_col) = (start_row as usize, start_col as usize);
    let width = start_col + range.width();

    let mut rows: Vec<Row> = Vec::with_capacity(start_row + range.height());
    rows.extend((0..start_row).map(|_| vec![CellValue::Empty; width]));
    for source in range.rows() {
        let mut row = Vec::with_capacity(width);
        row.resize(start_col, CellValue::Empty);
        row.extend(source.iter().map(data_to_cell_value));
        rows.push(row);
    }
    rows
}

/// Convert calamine Data to CellValue
pub fn data_to_cell_value(data: &Data) -> CellValue {
    match data {
        Data::Empty => CellValue::Empty,
        Data::String(s) => CellValue::Text(s.clone()),
        Data::Int(i) => CellValue::Number(*i as f64),
        Data::Float(f) => CellValue::Number(*f),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::DateTime(dt) => match dt.as_datetime() {
            Some(datetime) => cell_datetime(datetime),
            None => CellValue::Number(dt.as_f64()),
        },
        Data::DateTimeIso(s) => parse_iso_datetime(s)
            .map(cell_datetime)
            .unwrap_or_else(|| CellValue::Text(s.clone())),
        Data::DurationIso(s) => CellValue::Text(s.clone()),
        Data::Error(e) => CellValue::Text(format!("#ERROR: {e}")),
    }
}

/// Cell date-times carry whole seconds only. Serial-date float noise is
/// rounded away at millisecond precision before the fraction is dropped.
fn cell_datetime(datetime: NaiveDateTime) -> CellValue {
    CellValue::DateTime(datetime.round_subsecs(3).trunc_subsecs(0))
}

fn parse_iso_datetime(s: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
}
