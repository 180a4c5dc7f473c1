use rand::rngs::StdRng;
use rand::SeedableRng;
use rollcall_core::db::open_db_in_memory;
use rollcall_core::{
    AddOutcome, AddPolicy, RawRow, RepoError, RepoResult, RosterRepository, RosterService,
    ServiceError, SqliteRosterRepository, StoreError, StudentDraft, StudentPatch, StudentRecord,
    INVALID_KEY, VALID_KEY,
};
use serde_json::json;
use std::cell::Cell;

fn rows() -> Vec<RawRow> {
    serde_json::from_value(json!([
        {"Name": "Ann", "Branch": "CS", "Year": "second", "Email": "ann@uni.edu", "GPA": "3.2"},
        {"Name": "Ünal", "Branch": "CS", "Year": "2", "Email": "unal@uni.edu", "GPA": "3.0"}
    ]))
    .unwrap()
}

fn open_service(repo: SqliteRosterRepository<'_>) -> RosterService<SqliteRosterRepository<'_>> {
    RosterService::open_with_rng(repo, AddPolicy::RejectAndReport, StdRng::seed_from_u64(9))
}

#[test]
fn import_persists_both_collections_under_fixed_keys() {
    let conn = open_db_in_memory().unwrap();
    let mut service = open_service(SqliteRosterRepository::new(&conn));
    service.import_rows(&rows());

    let repo = SqliteRosterRepository::new(&conn);
    let valid = repo.load_collection(VALID_KEY).unwrap();
    let invalid = repo.load_collection(INVALID_KEY).unwrap();
    assert_eq!(valid.len(), 1);
    assert_eq!(invalid.len(), 1);
    assert_eq!(valid[0].name, "Ann");
    assert!(invalid[0].validation_errors.is_some());

    let raw: String = conn
        .query_row(
            "SELECT value FROM kv_store WHERE key = 'incorrectStudents';",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert!(raw.contains("\"validationErrors\""));
}

#[test]
fn reopened_service_sees_persisted_state() {
    let conn = open_db_in_memory().unwrap();
    {
        let mut service = open_service(SqliteRosterRepository::new(&conn));
        service.import_rows(&rows());
        service
            .update_by_id(
                2,
                &StudentPatch {
                    name: Some("Unal".to_string()),
                    ..StudentPatch::default()
                },
            )
            .unwrap();
    }

    let service = open_service(SqliteRosterRepository::new(&conn));
    assert_eq!(service.store().valid().len(), 2);
    assert!(service.store().invalid().is_empty());
}

#[test]
fn missing_keys_load_as_empty_roster() {
    let conn = open_db_in_memory().unwrap();
    let service = open_service(SqliteRosterRepository::new(&conn));
    assert!(service.store().is_empty());
}

#[test]
fn corrupt_snapshot_is_reported_and_service_starts_empty() {
    let conn = open_db_in_memory().unwrap();
    conn.execute(
        "INSERT INTO kv_store (key, value) VALUES ('students', '{not json');",
        [],
    )
    .unwrap();

    let repo = SqliteRosterRepository::new(&conn);
    assert!(matches!(
        repo.load_collection(VALID_KEY),
        Err(RepoError::InvalidData { .. })
    ));

    let service = open_service(repo);
    assert!(service.store().is_empty());
}

#[test]
fn rejected_manual_entry_is_not_persisted() {
    let conn = open_db_in_memory().unwrap();
    let mut service = open_service(SqliteRosterRepository::new(&conn));

    let outcome = service
        .add_new(&StudentDraft {
            name: "Cy".to_string(),
            branch: "ME".to_string(),
            year: "7".to_string(),
            email: "cy@uni.edu".to_string(),
            gpa: "3.0".to_string(),
            interests: String::new(),
        })
        .unwrap();
    assert!(matches!(outcome, AddOutcome::Rejected(_)));

    let repo = SqliteRosterRepository::new(&conn);
    assert!(repo.load_collection(INVALID_KEY).unwrap().is_empty());
}

struct FailingRepo {
    saves: Cell<usize>,
}

impl RosterRepository for FailingRepo {
    fn load_collection(&self, _key: &str) -> RepoResult<Vec<StudentRecord>> {
        Ok(Vec::new())
    }

    fn save_collection(&self, key: &str, _records: &[StudentRecord]) -> RepoResult<()> {
        self.saves.set(self.saves.get() + 1);
        Err(RepoError::InvalidData {
            key: key.to_string(),
            message: "storage full".to_string(),
        })
    }
}

#[test]
fn persistence_failure_keeps_in_memory_change() {
    let repo = FailingRepo {
        saves: Cell::new(0),
    };
    let mut service =
        RosterService::open_with_rng(repo, AddPolicy::RejectAndQuarantine, StdRng::seed_from_u64(1));

    let summary = service.import_rows(&rows());
    assert_eq!(summary.valid, 1);
    assert_eq!(service.store().len(), 2);

    let outcome = service
        .add_new(&StudentDraft {
            name: "Dee".to_string(),
            branch: "CS".to_string(),
            year: "1".to_string(),
            email: "dee".to_string(),
            gpa: "3.3".to_string(),
            interests: "Cloud".to_string(),
        })
        .unwrap();
    assert!(matches!(outcome, AddOutcome::Quarantined { id: 3, .. }));
    assert_eq!(service.store().invalid().len(), 2);
}

#[test]
fn loaded_id_gap_rejects_manual_entry_and_keeps_storage() {
    let conn = open_db_in_memory().unwrap();
    {
        let mut service = open_service(SqliteRosterRepository::new(&conn));
        service.import_rows(&rows());
    }
    let repo = SqliteRosterRepository::new(&conn);
    let (mut valid, mut invalid) = repo.load_roster().unwrap();
    valid[0].id = 3;
    invalid[0].id = 2;
    repo.save_roster(&valid, &invalid).unwrap();

    let mut service = open_service(SqliteRosterRepository::new(&conn));
    assert!(service.store().has_id_gap());
    let draft = StudentDraft {
        name: "Eve".to_string(),
        branch: "CS".to_string(),
        year: "1".to_string(),
        email: "eve@uni.edu".to_string(),
        gpa: "3.9".to_string(),
        interests: "DSA".to_string(),
    };
    for _ in 0..2 {
        assert!(matches!(
            service.add_new(&draft),
            Err(ServiceError::Store(StoreError::DuplicateId(3)))
        ));
    }

    let (stored_valid, stored_invalid) = repo.load_roster().unwrap();
    assert_eq!(stored_valid, valid);
    assert_eq!(stored_invalid.len(), 1);
    assert_eq!(stored_invalid[0].id, 2);
}
