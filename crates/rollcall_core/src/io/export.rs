//! Spreadsheet export of a record subset.

use crate::model::student::StudentRecord;
use chrono::{NaiveDate, Utc};
use rust_xlsxwriter::{Workbook, XlsxError};
use std::error::Error;
use std::fmt::{Display, Formatter};

const SHEET_NAME: &str = "Students";

/// Column headers, in output order.
pub const EXPORT_COLUMNS: &[&str] = &[
    "Name",
    "Branch",
    "Year",
    "Email",
    "Phone",
    "GPA",
    "Projects",
    "Skills",
    "Status",
    "Interests",
];

#[derive(Debug)]
pub enum ExportError {
    /// Neither a selection nor a filtered projection had any record.
    NothingToExport,
    Xlsx(XlsxError),
}

impl Display for ExportError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NothingToExport => write!(f, "no data to export"),
            Self::Xlsx(err) => write!(f, "failed to write spreadsheet: {err}"),
        }
    }
}

impl Error for ExportError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::NothingToExport => None,
            Self::Xlsx(err) => Some(err),
        }
    }
}

impl From<XlsxError> for ExportError {
    fn from(value: XlsxError) -> Self {
        Self::Xlsx(value)
    }
}

/// A generated workbook ready to be handed to the host for download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedFile {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// `students_export_<YYYY-MM-DD>.xlsx`
pub fn export_file_name(date: NaiveDate) -> String {
    format!("students_export_{}.xlsx", date.format("%Y-%m-%d"))
}

/// Exports `records` with today's UTC date in the file name.
pub fn export_students(records: &[&StudentRecord]) -> Result<ExportedFile, ExportError> {
    export_students_on(records, Utc::now().date_naive())
}

/// Exports `records` into a single-sheet workbook named for `date`.
///
/// # Errors
/// - `NothingToExport` for an empty subset; no workbook is produced.
pub fn export_students_on(
    records: &[&StudentRecord],
    date: NaiveDate,
) -> Result<ExportedFile, ExportError> {
    if records.is_empty() {
        return Err(ExportError::NothingToExport);
    }

    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.set_name(SHEET_NAME)?;

    for (col, header) in EXPORT_COLUMNS.iter().enumerate() {
        sheet.write_string(0, col as u16, *header)?;
    }

    for (index, record) in records.iter().enumerate() {
        let row = index as u32 + 1;
        sheet.write_string(row, 0, record.name.as_str())?;
        sheet.write_string(row, 1, record.branch.as_str())?;
        if let Some(year) = record.year {
            sheet.write_number(row, 2, year as f64)?;
        }
        sheet.write_string(row, 3, record.email.as_str())?;
        sheet.write_string(row, 4, record.phone.as_str())?;
        if let Some(gpa) = record.gpa {
            sheet.write_number(row, 5, gpa)?;
        }
        sheet.write_number(row, 6, f64::from(record.projects))?;
        sheet.write_string(row, 7, record.skills.as_str())?;
        sheet.write_string(row, 8, record.status.as_str())?;
        sheet.write_string(row, 9, record.interests_text())?;
    }

    Ok(ExportedFile {
        file_name: export_file_name(date),
        bytes: workbook.save_to_buffer()?,
    })
}

#[cfg(test)]
mod tests {
    use super::{export_file_name, export_students_on, ExportError};
    use crate::io::import::read_rows;
    use crate::model::normalize::RawValue;
    use crate::model::student::StudentRecord;
    use chrono::NaiveDate;

    fn record() -> StudentRecord {
        StudentRecord {
            id: 1,
            name: "Ann".to_string(),
            branch: "CS".to_string(),
            year: Some(1),
            email: "a@b.com".to_string(),
            phone: "555".to_string(),
            skills: "Rust".to_string(),
            status: "Active".to_string(),
            gpa: Some(3.6),
            interests: vec!["AI/ML".to_string(), "Hiking".to_string()],
            projects: 2,
            validation_errors: None,
        }
    }

    #[test]
    fn file_name_uses_iso_date() {
        let date = NaiveDate::from_ymd_opt(2026, 3, 9).unwrap();
        assert_eq!(export_file_name(date), "students_export_2026-03-09.xlsx");
    }

    #[test]
    fn empty_subset_is_refused() {
        let date = NaiveDate::from_ymd_opt(2026, 3, 9).unwrap();
        assert!(matches!(
            export_students_on(&[], date),
            Err(ExportError::NothingToExport)
        ));
    }

    #[test]
    fn exported_sheet_reads_back_with_expected_columns() {
        let date = NaiveDate::from_ymd_opt(2026, 3, 9).unwrap();
        let record = record();
        let file = export_students_on(&[&record], date).unwrap();

        let rows = read_rows(&file.bytes).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["Name"], RawValue::from("Ann"));
        assert_eq!(rows[0]["GPA"], RawValue::Number(3.6));
        assert_eq!(rows[0]["Interests"], RawValue::from("AI/ML, Hiking"));
        assert_eq!(rows[0]["Projects"], RawValue::Number(2.0));
    }
}
