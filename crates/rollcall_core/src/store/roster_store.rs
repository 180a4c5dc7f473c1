//! Dual-collection roster store.
//!
//! # Responsibility
//! - Hold the valid and quarantined (invalid) collections.
//! - Reconcile records between collections after every re-validation.
//!
//! # Invariants
//! - `id` is unique across the union of both collections.
//! - Records in `valid` carry no error map; records moved into `invalid`
//!   carry the map that put them there.
//! - Import is a full replace with ids `1..=N` in input order.
//! - Records are never removed from the union by these operations.

use crate::model::normalize::{draft_to_record, normalize_row, RawRow};
use crate::model::student::{FieldErrors, StudentDraft, StudentId, StudentPatch, StudentRecord};
use crate::model::validate::validate_student;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type StoreResult<T> = Result<T, StoreError>;

/// Store-level integrity and lookup errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    NotFound(StudentId),
    /// `promote_if_valid` was asked about a record that is already valid.
    NotQuarantined(StudentId),
    DuplicateId(StudentId),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound(id) => write!(f, "student not found: {id}"),
            Self::NotQuarantined(id) => write!(f, "student {id} is not in the invalid list"),
            Self::DuplicateId(id) => write!(f, "duplicate student id: {id}"),
        }
    }
}

impl Error for StoreError {}

/// Which collection holds a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Partition {
    Valid,
    Invalid,
}

/// What `add_new` does with a record that fails validation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AddPolicy {
    /// Return the error map to the submitter and store nothing.
    #[default]
    RejectAndReport,
    /// Store the record in the invalid collection, like import and edit do.
    RejectAndQuarantine,
}

/// Per-partition counts after an import.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportSummary {
    pub valid: usize,
    pub invalid: usize,
}

/// Result of `add_new`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddOutcome {
    Added(StudentId),
    Rejected(FieldErrors),
    Quarantined { id: StudentId, errors: FieldErrors },
}

/// Result of `update_by_id`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reconciliation {
    /// Was invalid, now valid: moved to the valid collection.
    Promoted,
    /// Was invalid, still invalid: replaced in place with fresh errors.
    StillInvalid(FieldErrors),
    /// Was valid, still valid: replaced in place.
    Updated,
    /// Was valid, now invalid: moved to the invalid collection.
    Demoted(FieldErrors),
}

/// Result of `promote_if_valid`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromoteOutcome {
    Promoted,
    StillInvalid(FieldErrors),
}

/// Owned state of both collections. All mutation goes through its methods.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RosterStore {
    valid: Vec<StudentRecord>,
    invalid: Vec<StudentRecord>,
}

impl RosterStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds a store from previously persisted collections.
    ///
    /// Error maps are stripped from valid records and recomputed for
    /// invalid records that lost theirs.
    ///
    /// # Errors
    /// - `DuplicateId` when any id appears twice across both collections.
    pub fn from_collections(
        mut valid: Vec<StudentRecord>,
        mut invalid: Vec<StudentRecord>,
    ) -> StoreResult<Self> {
        let mut seen = HashSet::new();
        for record in valid.iter().chain(invalid.iter()) {
            if !seen.insert(record.id) {
                return Err(StoreError::DuplicateId(record.id));
            }
        }

        for record in &mut valid {
            record.validation_errors = None;
        }
        for record in &mut invalid {
            if !record.is_quarantined() {
                let report = validate_student(record);
                record.validation_errors = (!report.is_valid()).then_some(report.errors);
            }
        }

        Ok(Self { valid, invalid })
    }

    pub fn valid(&self) -> &[StudentRecord] {
        &self.valid
    }

    pub fn invalid(&self) -> &[StudentRecord] {
        &self.invalid
    }

    /// Number of records across both collections.
    pub fn len(&self) -> usize {
        self.valid.len() + self.invalid.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether ids are not exactly `1..=len()`. Manual entry takes id
    /// `len() + 1`, so a gap means that id may already be in use.
    pub fn has_id_gap(&self) -> bool {
        let len = self.len();
        self.valid
            .iter()
            .chain(&self.invalid)
            .any(|record| record.id as usize > len)
    }

    /// Finds a record in whichever collection holds it.
    pub fn get(&self, id: StudentId) -> Option<(Partition, &StudentRecord)> {
        self.valid
            .iter()
            .find(|record| record.id == id)
            .map(|record| (Partition::Valid, record))
            .or_else(|| {
                self.invalid
                    .iter()
                    .find(|record| record.id == id)
                    .map(|record| (Partition::Invalid, record))
            })
    }

    /// Replaces both collections with the normalized, validated `rows`.
    pub fn insert_from_import<R: Rng + ?Sized>(
        &mut self,
        rows: &[RawRow],
        rng: &mut R,
    ) -> ImportSummary {
        self.valid.clear();
        self.invalid.clear();

        for (index, row) in rows.iter().enumerate() {
            let record = normalize_row(row, index, rng);
            self.file(record);
        }

        ImportSummary {
            valid: self.valid.len(),
            invalid: self.invalid.len(),
        }
    }

    /// Adds one manually entered record with id `len() + 1`.
    ///
    /// # Errors
    /// - `DuplicateId` when the computed id is already taken, which only
    ///   happens with externally loaded, non-contiguous ids.
    pub fn add_new(&mut self, draft: &StudentDraft, policy: AddPolicy) -> StoreResult<AddOutcome> {
        let id = self.next_id();
        if self.get(id).is_some() {
            return Err(StoreError::DuplicateId(id));
        }

        let mut record = draft_to_record(draft, id);
        let report = validate_student(&record);
        if report.is_valid() {
            self.valid.push(record);
            return Ok(AddOutcome::Added(id));
        }

        match policy {
            AddPolicy::RejectAndReport => Ok(AddOutcome::Rejected(report.errors)),
            AddPolicy::RejectAndQuarantine => {
                record.validation_errors = Some(report.errors.clone());
                self.invalid.push(record);
                Ok(AddOutcome::Quarantined {
                    id,
                    errors: report.errors,
                })
            }
        }
    }

    /// Merges `patch` over the record `id`, re-validates and reconciles.
    pub fn update_by_id(
        &mut self,
        id: StudentId,
        patch: &StudentPatch,
    ) -> StoreResult<Reconciliation> {
        if let Some(index) = position(&self.invalid, id) {
            let mut record = self.invalid[index].clone();
            patch.apply_to(&mut record);
            let report = validate_student(&record);

            if report.is_valid() {
                self.invalid.remove(index);
                record.validation_errors = None;
                self.valid.push(record);
                return Ok(Reconciliation::Promoted);
            }
            record.validation_errors = Some(report.errors.clone());
            self.invalid[index] = record;
            return Ok(Reconciliation::StillInvalid(report.errors));
        }

        let index = position(&self.valid, id).ok_or(StoreError::NotFound(id))?;
        let mut record = self.valid[index].clone();
        patch.apply_to(&mut record);
        let report = validate_student(&record);

        if report.is_valid() {
            record.validation_errors = None;
            self.valid[index] = record;
            return Ok(Reconciliation::Updated);
        }
        self.valid.remove(index);
        record.validation_errors = Some(report.errors.clone());
        self.invalid.push(record);
        Ok(Reconciliation::Demoted(report.errors))
    }

    /// Re-validates a quarantined record without changing its fields.
    ///
    /// A still-invalid record is left exactly as it was.
    pub fn promote_if_valid(&mut self, id: StudentId) -> StoreResult<PromoteOutcome> {
        let Some(index) = position(&self.invalid, id) else {
            return Err(match position(&self.valid, id) {
                Some(_) => StoreError::NotQuarantined(id),
                None => StoreError::NotFound(id),
            });
        };

        let report = validate_student(&self.invalid[index]);
        if !report.is_valid() {
            return Ok(PromoteOutcome::StillInvalid(report.errors));
        }

        let mut record = self.invalid.remove(index);
        record.validation_errors = None;
        self.valid.push(record);
        Ok(PromoteOutcome::Promoted)
    }

    fn next_id(&self) -> StudentId {
        StudentId::try_from(self.len() + 1).unwrap_or(StudentId::MAX)
    }

    fn file(&mut self, mut record: StudentRecord) {
        let report = validate_student(&record);
        if report.is_valid() {
            record.validation_errors = None;
            self.valid.push(record);
        } else {
            record.validation_errors = Some(report.errors);
            self.invalid.push(record);
        }
    }
}

fn position(records: &[StudentRecord], id: StudentId) -> Option<usize> {
    records.iter().position(|record| record.id == id)
}
