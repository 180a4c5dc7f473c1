//! Spreadsheet import: bytes → raw rows.
//!
//! # Invariants
//! - Only the first sheet is read; its first row is the header.
//! - Empty cells are omitted so the normalizer sees them as absent.
//! - Fully blank rows are skipped.
//! - File names are checked before any byte is parsed.

use crate::model::normalize::{RawRow, RawValue};
use calamine::{open_workbook_auto_from_rs, Data, Range, Reader};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::io::Cursor;

const ACCEPTED_EXTENSIONS: &[&str] = &[".xlsx", ".xls"];

/// Input that could not be processed at all.
#[derive(Debug)]
pub enum ImportError {
    UnsupportedExtension(String),
    Unreadable(calamine::Error),
    NoSheet,
}

impl Display for ImportError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnsupportedExtension(name) => write!(
                f,
                "`{name}` is not an Excel file; please select a .xlsx or .xls file"
            ),
            Self::Unreadable(err) => write!(f, "error reading spreadsheet: {err}"),
            Self::NoSheet => write!(f, "spreadsheet contains no sheets"),
        }
    }
}

impl Error for ImportError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Unreadable(err) => Some(err),
            _ => None,
        }
    }
}

/// Rejects file names without an accepted spreadsheet extension.
pub fn check_file_name(file_name: &str) -> Result<(), ImportError> {
    let lowered = file_name.trim().to_ascii_lowercase();
    if ACCEPTED_EXTENSIONS.iter().any(|ext| lowered.ends_with(ext)) {
        Ok(())
    } else {
        Err(ImportError::UnsupportedExtension(file_name.to_string()))
    }
}

/// Checks `file_name`, then parses `bytes` into raw rows.
pub fn read_spreadsheet(file_name: &str, bytes: &[u8]) -> Result<Vec<RawRow>, ImportError> {
    check_file_name(file_name)?;
    read_rows(bytes)
}

/// Parses the first sheet of an `.xlsx`/`.xls` workbook into raw rows.
pub fn read_rows(bytes: &[u8]) -> Result<Vec<RawRow>, ImportError> {
    let mut workbook =
        open_workbook_auto_from_rs(Cursor::new(bytes)).map_err(ImportError::Unreadable)?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or(ImportError::NoSheet)?
        .map_err(ImportError::Unreadable)?;
    Ok(rows_from_range(&range))
}

fn rows_from_range(range: &Range<Data>) -> Vec<RawRow> {
    let mut rows = range.rows();
    let Some(header_cells) = rows.next() else {
        return Vec::new();
    };
    let headers: Vec<Option<String>> = header_cells
        .iter()
        .map(|cell| Some(cell.to_string()).filter(|header| !header.trim().is_empty()))
        .collect();

    rows.filter_map(|cells| {
        let mut row = RawRow::new();
        for (header, cell) in headers.iter().zip(cells) {
            let (Some(header), Some(value)) = (header, cell_value(cell)) else {
                continue;
            };
            row.entry(header.clone()).or_insert(value);
        }
        (!row.is_empty()).then_some(row)
    })
    .collect()
}

fn cell_value(cell: &Data) -> Option<RawValue> {
    match cell {
        Data::Empty | Data::Error(_) => None,
        Data::String(text) => Some(RawValue::Text(text.clone())),
        Data::Float(value) => Some(RawValue::Number(*value)),
        Data::Int(value) => Some(RawValue::Number(*value as f64)),
        Data::Bool(value) => Some(RawValue::Bool(*value)),
        other => Some(RawValue::Text(other.to_string())),
    }
}
