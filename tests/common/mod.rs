//! Workbook fixtures built at test time

#![allow(dead_code)]

use rust_xlsxwriter::{ExcelDateTime, Format, Workbook};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub enum Cell {
    Text(&'static str),
    Number(f64),
    Bool(bool),
    DateTime(&'static str),
    Blank,
}

pub use Cell::{Blank, Bool, DateTime, Number, Text};

/// Write `sheets` (name, rows) into a new xlsx file at `path`
pub fn write_workbook(path: &Path, sheets: &[(&str, Vec<Vec<Cell>>)]) {
    let mut workbook = Workbook::new();
    let date_format = Format::new().set_num_format("yyyy-mm-dd hh:mm:ss");

    for (name, rows) in sheets {
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(*name).unwrap();
        for (r, row) in rows.iter().enumerate() {
            let (r, row_cells) = (r as u32, row);
            for (c, cell) in row_cells.iter().enumerate() {
                let c = c as u16;
                match cell {
                    Cell::Text(s) => {
                        worksheet.write_string(r, c, *s).unwrap();
                    }
                    Cell::Number(n) => {
                        worksheet.write_number(r, c, *n).unwrap();
                    }
                    Cell::Bool(b) => {
                        worksheet.write_boolean(r, c, *b).unwrap();
                    }
                    Cell::DateTime(s) => {
                        let dt = ExcelDateTime::parse_from_str(s).unwrap();
                        worksheet
                            .write_datetime_with_format(r, c, &dt, &date_format)
                            .unwrap();
                    }
                    Cell::Blank => {}
                }
            }
        }
    }

    workbook.save(path).unwrap();
}

/// Header `id, name, email` plus three users; Ann appears twice
pub fn users_rows() -> Vec<Vec<Cell>> {
    vec![
        vec![Text("id"), Text("name"), Text("email"), Text("joined")],
        vec![Number(1.0), Text("Ann"), Text("ann@example.com"), DateTime("2024-03-05 14:07:09")],
        vec![Number(2.0), Text("Bob"), Text("bob@example.com"), DateTime("2024-03-06 08:00:00")],
        vec![Number(3.0), Text("Ann B."), Text("ann@example.com"), DateTime("2024-04-01 00:00:00")],
    ]
}

pub fn users_workbook(dir: &TempDir) -> PathBuf {
    let path = dir.path().join("users.xlsx");
    write_workbook(&path, &[("Sheet1", users_rows())]);
    path
}

pub fn write_template(dir: &TempDir, json: &str) -> PathBuf {
    let path = dir.path().join("template.json");
    std::fs::write(&path, json).unwrap();
    path
}
