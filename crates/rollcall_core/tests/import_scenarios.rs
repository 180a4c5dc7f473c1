use rand::rngs::StdRng;
use rand::SeedableRng;
use rollcall_core::{RawRow, RosterStore, StudentField};
use serde_json::json;
use std::collections::BTreeSet;

fn rows(value: serde_json::Value) -> Vec<RawRow> {
    serde_json::from_value(value).unwrap()
}

fn rng() -> StdRng {
    StdRng::seed_from_u64(2024)
}

#[test]
fn well_formed_row_lands_in_valid_collection() {
    let mut store = RosterStore::new();
    let summary = store.insert_from_import(
        &rows(json!([{
            "Name": "Ann",
            "Branch": "CS",
            "Year": "first",
            "Email": "a@b.com",
            "GPA": "3.6",
            "Interests": "AI/ML, Hiking"
        }])),
        &mut rng(),
    );

    assert_eq!(summary.valid, 1);
    assert_eq!(summary.invalid, 0);

    let record = &store.valid()[0];
    assert_eq!(record.id, 1);
    assert_eq!(record.year, Some(1));
    assert_eq!(record.gpa, Some(3.6));
    assert_eq!(record.interests, vec!["AI/ML", "Hiking"]);
    assert_eq!(record.validation_errors, None);
}

#[test]
fn malformed_row_is_quarantined_with_every_failing_field() {
    let mut store = RosterStore::new();
    store.insert_from_import(
        &rows(json!([{
            "Name": "",
            "Branch": "CS",
            "Year": "9",
            "Email": "bad",
            "GPA": "5"
        }])),
        &mut rng(),
    );

    assert!(store.valid().is_empty());
    let record = &store.invalid()[0];
    let keys: BTreeSet<StudentField> = record
        .validation_errors
        .as_ref()
        .unwrap()
        .keys()
        .copied()
        .collect();
    assert_eq!(
        keys,
        BTreeSet::from([
            StudentField::Name,
            StudentField::Email,
            StudentField::Gpa,
            StudentField::Year,
        ])
    );
}

#[test]
fn import_replaces_previous_roster_and_numbers_from_one() {
    let mut store = RosterStore::new();
    store.insert_from_import(
        &rows(json!([{"Email": "x@y.io"}, {"Email": "z@y.io"}, {"Email": "q@y.io"}])),
        &mut rng(),
    );
    assert_eq!(store.len(), 3);

    store.insert_from_import(
        &rows(json!([{"email": "second@y.io"}, {"email": "broken"}])),
        &mut rng(),
    );
    assert_eq!(store.len(), 2);
    assert_eq!(store.valid()[0].id, 1);
    assert_eq!(store.invalid()[0].id, 2);
}

#[test]
fn sparse_rows_always_have_required_fields() {
    let mut store = RosterStore::new();
    store.insert_from_import(
        &rows(json!([{}, {"phone": 12345}, {"Status": "Alumni"}])),
        &mut rng(),
    );

    for (index, record) in store.invalid().iter().chain(store.valid()).enumerate() {
        assert!(!record.name.is_empty(), "row {index} lost its name");
        assert!(!record.branch.is_empty());
        assert!(!record.status.is_empty());
        assert!(record.year.is_some());
        assert!(record.gpa.is_some());
    }

    // No email means every sparse row is quarantined.
    assert_eq!(store.invalid().len(), 3);
    assert_eq!(store.invalid()[1].phone, "12345");
    assert_eq!(store.invalid()[2].status, "Alumni");
}

#[test]
fn lowercase_headers_are_accepted() {
    let mut store = RosterStore::new();
    store.insert_from_import(
        &rows(json!([{
            "name": "Dev",
            "branch": "IT",
            "year": 4,
            "email": "dev@uni.edu",
            "gpa": 3.95,
            "interests": "Blockchain",
            "projects": 3
        }])),
        &mut rng(),
    );

    let record = &store.valid()[0];
    assert_eq!(record.name, "Dev");
    assert_eq!(record.year, Some(4));
    assert_eq!(record.gpa, Some(3.95));
    assert_eq!(record.projects, 3);
}

#[test]
fn unrecognized_interests_fail_but_empty_interests_pass() {
    let mut store = RosterStore::new();
    store.insert_from_import(
        &rows(json!([
            {"Name": "A", "Branch": "CS", "Email": "a@b.co", "GPA": 3, "Interests": "Chess, Golf"},
            {"Name": "B", "Branch": "CS", "Email": "b@b.co", "GPA": 3, "Interests": " , "}
        ])),
        &mut rng(),
    );

    assert_eq!(store.valid().len(), 1);
    assert_eq!(store.valid()[0].name, "B");
    assert!(store.invalid()[0]
        .validation_errors
        .as_ref()
        .unwrap()
        .contains_key(&StudentField::Interests));
}
