use calamine::{open_workbook_auto_from_rs, Data, Reader};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rollcall_core::db::open_db_in_memory;
use rollcall_core::{
    AddPolicy, ExportError, ImportError, MailtoError, RosterService, Selection, ServiceError,
    SqliteRosterRepository, StudentQuery,
};
use rust_xlsxwriter::Workbook;
use std::io::Cursor;

fn roster_workbook() -> Vec<u8> {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    let rows: [[&str; 6]; 4] = [
        ["Name", "Branch", "Year", "Email", "GPA", "Interests"],
        ["Ann", "CS", "2", "ann@uni.edu", "3.6", "Web Dev"],
        ["Bo", "EE", "3", "bo@uni.edu", "2.9", "Robotics, Chess"],
        ["Cy", "ME", "9", "cy-at-uni", "3.0", ""],
    ];
    for (row_index, row) in rows.iter().enumerate() {
        for (col_index, value) in row.iter().enumerate() {
            if value.is_empty() {
                continue;
            }
            sheet
                .write_string(row_index as u32, col_index as u16, *value)
                .unwrap();
        }
    }
    workbook.save_to_buffer().unwrap()
}

fn exported_names(bytes: &[u8]) -> Vec<String> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec())).unwrap();
    let range = workbook.worksheet_range("Students").unwrap();
    range
        .rows()
        .skip(1)
        .map(|row| match &row[0] {
            Data::String(name) => name.clone(),
            other => panic!("unexpected cell {other:?}"),
        })
        .collect()
}

#[test]
fn spreadsheet_import_then_export_filtered_projection() {
    let conn = open_db_in_memory().unwrap();
    let mut service = RosterService::open_with_rng(
        SqliteRosterRepository::new(&conn),
        AddPolicy::RejectAndReport,
        StdRng::seed_from_u64(3),
    );

    let summary = service
        .import_spreadsheet("Roster.XLSX", &roster_workbook())
        .unwrap();
    assert_eq!(summary.valid, 2);
    assert_eq!(summary.invalid, 1);

    let query = StudentQuery {
        branch: Some("EE".to_string()),
        ..StudentQuery::default()
    };
    let file = service.export(&query, &Selection::new()).unwrap();
    assert!(file.file_name.starts_with("students_export_"));
    assert!(file.file_name.ends_with(".xlsx"));
    assert_eq!(exported_names(&file.bytes), vec!["Bo"]);
}

#[test]
fn selection_overrides_filters_for_export() {
    let conn = open_db_in_memory().unwrap();
    let mut service = RosterService::open_with_rng(
        SqliteRosterRepository::new(&conn),
        AddPolicy::RejectAndReport,
        StdRng::seed_from_u64(3),
    );
    service
        .import_spreadsheet("roster.xlsx", &roster_workbook())
        .unwrap();

    let query = StudentQuery {
        search: "bo@".to_string(),
        ..StudentQuery::default()
    };
    let mut selection = Selection::new();
    selection.toggle(1);

    let file = service.export(&query, &selection).unwrap();
    assert_eq!(exported_names(&file.bytes), vec!["Ann"]);
}

#[test]
fn export_of_empty_projection_is_refused() {
    let conn = open_db_in_memory().unwrap();
    let mut service = RosterService::open_with_rng(
        SqliteRosterRepository::new(&conn),
        AddPolicy::RejectAndReport,
        StdRng::seed_from_u64(3),
    );
    service
        .import_spreadsheet("roster.xlsx", &roster_workbook())
        .unwrap();

    let query = StudentQuery {
        search: "nobody".to_string(),
        ..StudentQuery::default()
    };
    assert!(matches!(
        service.export(&query, &Selection::new()),
        Err(ServiceError::Export(ExportError::NothingToExport))
    ));
}

#[test]
fn unsupported_extension_leaves_roster_untouched() {
    let conn = open_db_in_memory().unwrap();
    let mut service = RosterService::open_with_rng(
        SqliteRosterRepository::new(&conn),
        AddPolicy::RejectAndReport,
        StdRng::seed_from_u64(3),
    );
    service
        .import_spreadsheet("roster.xlsx", &roster_workbook())
        .unwrap();
    let before = service.store().clone();

    let err = service
        .import_spreadsheet("roster.csv", b"Name,Branch\nAnn,CS\n")
        .unwrap_err();
    assert!(matches!(
        err,
        ServiceError::Import(ImportError::UnsupportedExtension(_))
    ));
    assert_eq!(service.store(), &before);
}

#[test]
fn mail_to_selection_clears_it_on_success_only() {
    let conn = open_db_in_memory().unwrap();
    let mut service = RosterService::open_with_rng(
        SqliteRosterRepository::new(&conn),
        AddPolicy::RejectAndReport,
        StdRng::seed_from_u64(3),
    );
    service
        .import_spreadsheet("roster.xlsx", &roster_workbook())
        .unwrap();

    let mut selection = Selection::new();
    selection.toggle(1);
    selection.toggle(2);

    let err = service
        .compose_mail(&mut selection, "  ", "Body")
        .unwrap_err();
    assert!(matches!(
        err,
        ServiceError::Mailto(MailtoError::MissingContent)
    ));
    assert_eq!(selection.len(), 2);

    let link = service
        .compose_mail(&mut selection, "Lab meeting", "See you at 5")
        .unwrap();
    assert_eq!(
        link,
        "mailto:ann@uni.edu,bo@uni.edu?subject=Lab%20meeting&body=See%20you%20at%205"
    );
    assert!(selection.is_empty());
}

#[test]
fn unreadable_workbook_leaves_memory_and_storage_untouched() {
    let conn = open_db_in_memory().unwrap();
    let mut service = RosterService::open_with_rng(
        SqliteRosterRepository::new(&conn),
        AddPolicy::RejectAndReport,
        StdRng::seed_from_u64(3),
    );
    service
        .import_spreadsheet("roster.xlsx", &roster_workbook())
        .unwrap();
    let before = service.store().clone();
    let persisted_before = persisted_valid(&conn);

    let err = service
        .import_spreadsheet("roster.xlsx", b"not a workbook")
        .unwrap_err();

    assert!(matches!(
        err,
        ServiceError::Import(ImportError::Unreadable(_))
    ));
    assert_eq!(service.store(), &before);
    assert_eq!(persisted_valid(&conn), persisted_before);
}

fn persisted_valid(conn: &rusqlite::Connection) -> String {
    conn.query_row(
        "SELECT value FROM kv_store WHERE key = 'students';",
        [],
        |row| row.get(0),
    )
    .unwrap()
}
