//! Roster use-case service.
//!
//! # Responsibility
//! - Provide one entry point per user action (import, add, edit, promote,
//!   export, mail).
//! - Persist both collections after each mutation, best-effort.
//!
//! # Invariants
//! - Actions run to completion one at a time; the service is not shared
//!   across threads.
//! - A failed load starts from an empty roster instead of failing open.

use crate::io::export::{export_students, ExportError, ExportedFile};
use crate::io::import::{read_spreadsheet, ImportError};
use crate::io::mailto::{compose_mailto, MailtoError};
use crate::model::normalize::RawRow;
use crate::model::student::{StudentDraft, StudentId, StudentPatch};
use crate::query::selection::Selection;
use crate::query::view::StudentQuery;
use crate::repo::roster_repo::RosterRepository;
use crate::store::roster_store::{
    AddOutcome, AddPolicy, ImportSummary, PromoteOutcome, Reconciliation, RosterStore, StoreError,
};
use log::{error, info, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;

/// Service error for roster use-cases.
#[derive(Debug)]
pub enum ServiceError {
    Import(ImportError),
    Store(StoreError),
    Export(ExportError),
    Mailto(MailtoError),
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Import(err) => write!(f, "{err}"),
            Self::Store(err) => write!(f, "{err}"),
            Self::Export(err) => write!(f, "{err}"),
            Self::Mailto(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Import(err) => Some(err),
            Self::Store(err) => Some(err),
            Self::Export(err) => Some(err),
            Self::Mailto(err) => Some(err),
        }
    }
}

impl From<ImportError> for ServiceError {
    fn from(value: ImportError) -> Self {
        Self::Import(value)
    }
}

impl From<StoreError> for ServiceError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

impl From<ExportError> for ServiceError {
    fn from(value: ExportError) -> Self {
        Self::Export(value)
    }
}

impl From<MailtoError> for ServiceError {
    fn from(value: MailtoError) -> Self {
        Self::Mailto(value)
    }
}

/// Roster facade over a persistence repository.
pub struct RosterService<R: RosterRepository> {
    repo: R,
    store: RosterStore,
    add_policy: AddPolicy,
    rng: StdRng,
}

impl<R: RosterRepository> RosterService<R> {
    /// Loads persisted state; synthetic defaults use an entropy-seeded RNG.
    pub fn open(repo: R, add_policy: AddPolicy) -> Self {
        Self::open_with_rng(repo, add_policy, StdRng::from_entropy())
    }

    /// Loads persisted state with a caller-provided RNG for synthetic
    /// GPA/projects defaults.
    pub fn open_with_rng(repo: R, add_policy: AddPolicy, rng: StdRng) -> Self {
        let store = load_store(&repo);
        Self {
            repo,
            store,
            add_policy,
            rng,
        }
    }

    pub fn store(&self) -> &RosterStore {
        &self.store
    }

    pub fn add_policy(&self) -> AddPolicy {
        self.add_policy
    }

    /// Checks the file name, parses the first sheet and replaces the roster.
    ///
    /// # Errors
    /// - `Import` for a bad extension or unreadable bytes; state is unchanged.
    pub fn import_spreadsheet(
        &mut self,
        file_name: &str,
        bytes: &[u8],
    ) -> Result<ImportSummary, ServiceError> {
        let rows = match read_spreadsheet(file_name, bytes) {
            Ok(rows) => rows,
            Err(err) => {
                warn!(
                    "event=roster_import module=service status=error bytes={} error={}",
                    bytes.len(),
                    err
                );
                return Err(err.into());
            }
        };
        Ok(self.import_rows(&rows))
    }

    /// Replaces the roster with normalized, validated `rows`.
    pub fn import_rows(&mut self, rows: &[RawRow]) -> ImportSummary {
        let started_at = Instant::now();
        let summary = self.store.insert_from_import(rows, &mut self.rng);
        info!(
            "event=roster_import module=service status=ok rows={} valid={} invalid={} duration_ms={}",
            rows.len(),
            summary.valid,
            summary.invalid,
            started_at.elapsed().as_millis()
        );
        self.persist();
        summary
    }

    /// Adds one manual entry under the configured add policy.
    pub fn add_new(&mut self, draft: &StudentDraft) -> Result<AddOutcome, ServiceError> {
        let outcome = match self.store.add_new(draft, self.add_policy) {
            Ok(outcome) => outcome,
            Err(err) => {
                warn!("event=roster_add module=service status=error error={err}");
                return Err(err.into());
            }
        };
        match &outcome {
            AddOutcome::Added(id) => {
                info!("event=roster_add module=service status=ok id={id}");
                self.persist();
            }
            AddOutcome::Quarantined { id, errors } => {
                info!(
                    "event=roster_add module=service status=quarantined id={id} errors={}",
                    errors.len()
                );
                self.persist();
            }
            AddOutcome::Rejected(errors) => {
                info!(
                    "event=roster_add module=service status=rejected errors={}",
                    errors.len()
                );
            }
        }
        Ok(outcome)
    }

    /// Applies a profile edit and reconciles the record's collection.
    pub fn update_by_id(
        &mut self,
        id: StudentId,
        patch: &StudentPatch,
    ) -> Result<Reconciliation, ServiceError> {
        let outcome = self.store.update_by_id(id, patch)?;
        let label = match &outcome {
            Reconciliation::Promoted => "promoted",
            Reconciliation::StillInvalid(_) => "still_invalid",
            Reconciliation::Updated => "updated",
            Reconciliation::Demoted(_) => "demoted",
        };
        info!("event=roster_update module=service status=ok id={id} outcome={label}");
        self.persist();
        Ok(outcome)
    }

    /// Moves a quarantined record to the valid list if it now validates.
    pub fn promote_if_valid(&mut self, id: StudentId) -> Result<PromoteOutcome, ServiceError> {
        let outcome = self.store.promote_if_valid(id)?;
        match &outcome {
            PromoteOutcome::Promoted => {
                info!("event=roster_promote module=service status=ok id={id}");
                self.persist();
            }
            PromoteOutcome::StillInvalid(errors) => {
                info!(
                    "event=roster_promote module=service status=still_invalid id={id} errors={}",
                    errors.len()
                );
            }
        }
        Ok(outcome)
    }

    /// Exports the selection, or the filtered projection when nothing is
    /// selected.
    pub fn export(
        &self,
        query: &StudentQuery,
        selection: &Selection,
    ) -> Result<ExportedFile, ServiceError> {
        let valid = self.store.valid();
        let filtered = query.apply(valid);
        let subset = selection.export_subset(valid, &filtered);
        let file = export_students(&subset)?;
        info!(
            "event=roster_export module=service status=ok records={} bytes={}",
            subset.len(),
            file.bytes.len()
        );
        Ok(file)
    }

    /// Builds a `mailto:` link for the selected valid records and clears
    /// the selection on success.
    pub fn compose_mail(
        &self,
        selection: &mut Selection,
        subject: &str,
        body: &str,
    ) -> Result<String, ServiceError> {
        let recipients = selection.selected(self.store.valid());
        let link = compose_mailto(&recipients, subject, body)?;
        info!(
            "event=roster_mailto module=service status=ok recipients={}",
            recipients.len()
        );
        selection.clear();
        Ok(link)
    }

    fn persist(&self) {
        if let Err(err) = self
            .repo
            .save_roster(self.store.valid(), self.store.invalid())
        {
            error!("event=roster_persist module=service status=error error={err}");
        }
    }
}

fn load_store<R: RosterRepository>(repo: &R) -> RosterStore {
    let loaded = repo
        .load_roster()
        .map_err(|err| err.to_string())
        .and_then(|(valid, invalid)| {
            RosterStore::from_collections(valid, invalid).map_err(|err| err.to_string())
        });

    match loaded {
        Ok(store) => {
            if store.has_id_gap() {
                warn!(
                    "event=roster_load module=service status=id_gap records={} next_id={}",
                    store.len(),
                    store.len() + 1
                );
            }
            info!(
                "event=roster_load module=service status=ok valid={} invalid={}",
                store.valid().len(),
                store.invalid().len()
            );
            store
        }
        Err(err) => {
            error!("event=roster_load module=service status=error error={err}");
            RosterStore::new()
        }
    }
}
