//! Local SQLite file that holds the roster snapshots.
//!
//! The schema is a single `kv_store` table; the roster repository owns
//! everything stored in it. This module only opens the file and brings the
//! schema up to date.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod migrations;
mod open;

pub use open::{open_db, open_db_in_memory};

/// In-memory target label used in errors and logs.
pub const MEMORY_TARGET: &str = ":memory:";

pub type DbResult<T> = Result<T, DbError>;

/// Failure while preparing the roster database.
#[derive(Debug)]
pub enum DbError {
    /// The file (or in-memory database) could not be opened or configured.
    Open {
        target: String,
        source: rusqlite::Error,
    },
    /// `PRAGMA user_version` could not be read.
    SchemaVersion(rusqlite::Error),
    /// Migration `version` failed; nothing from the batch was committed.
    Migration {
        version: u32,
        source: rusqlite::Error,
    },
    /// The file was written by a newer build and is left untouched.
    SchemaTooNew { found: u32, supported: u32 },
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Open { target, source } => {
                write!(f, "cannot open roster database `{target}`: {source}")
            }
            Self::SchemaVersion(err) => write!(f, "cannot read roster schema version: {err}"),
            Self::Migration { version, source } => {
                write!(f, "roster schema migration {version} failed: {source}")
            }
            Self::SchemaTooNew { found, supported } => write!(
                f,
                "roster database uses schema {found}; this build supports up to {supported}"
            ),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Open { source, .. } | Self::Migration { source, .. } => Some(source),
            Self::SchemaVersion(err) => Some(err),
            Self::SchemaTooNew { .. } => None,
        }
    }
}
