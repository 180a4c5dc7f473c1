//! Core domain logic for the Rollcall student dashboard.
//! This crate is the single source of truth for record invariants.

pub mod config;
pub mod db;
pub mod io;
pub mod logging;
pub mod model;
pub mod query;
pub mod repo;
pub mod service;
pub mod store;

pub use config::{ConfigError, CoreConfig};
pub use io::export::{export_file_name, export_students, ExportError, ExportedFile};
pub use io::import::{check_file_name, read_rows, read_spreadsheet, ImportError};
pub use io::mailto::{compose_mailto, MailtoError};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::normalize::{normalize_row, RawRow, RawValue};
pub use model::student::{
    FieldErrors, StudentDraft, StudentField, StudentId, StudentPatch, StudentRecord,
};
pub use model::validate::{validate_student, ValidationReport};
pub use query::selection::Selection;
pub use query::stats::{DashboardStats, FilterOptions, GpaClass, ValidationSummary};
pub use query::view::{SortDirection, SortKey, SortState, StudentQuery};
pub use repo::roster_repo::{
    RepoError, RepoResult, RosterRepository, SqliteRosterRepository, INVALID_KEY, VALID_KEY,
};
pub use service::roster_service::{RosterService, ServiceError};
pub use store::roster_store::{
    AddOutcome, AddPolicy, ImportSummary, Partition, PromoteOutcome, Reconciliation,
    RosterStore, StoreError, StoreResult,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
