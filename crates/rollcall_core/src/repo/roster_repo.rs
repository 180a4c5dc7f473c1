//! Roster repository contract and SQLite key-value implementation.
//!
//! # Invariants
//! - Values are JSON arrays of `StudentRecord` in camelCase wire naming.
//! - Read paths reject corrupt JSON instead of masking it.

use crate::model::student::StudentRecord;
use rusqlite::{params, Connection, OptionalExtension};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Key holding the valid collection.
pub const VALID_KEY: &str = "students";
/// Key holding the quarantined collection.
pub const INVALID_KEY: &str = "incorrectStudents";

pub type RepoResult<T> = Result<T, RepoError>;

#[derive(Debug)]
pub enum RepoError {
    Sqlite(rusqlite::Error),
    Encode(serde_json::Error),
    InvalidData { key: String, message: String },
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "roster storage query failed: {err}"),
            Self::Encode(err) => write!(f, "failed to encode roster: {err}"),
            Self::InvalidData { key, message } => {
                write!(f, "invalid persisted roster under `{key}`: {message}")
            }
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            Self::Encode(err) => Some(err),
            Self::InvalidData { .. } => None,
        }
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}

/// Key-value persistence for record collections.
pub trait RosterRepository {
    fn load_collection(&self, key: &str) -> RepoResult<Vec<StudentRecord>>;
    fn save_collection(&self, key: &str, records: &[StudentRecord]) -> RepoResult<()>;

    /// Loads `(valid, invalid)` from their fixed keys.
    fn load_roster(&self) -> RepoResult<(Vec<StudentRecord>, Vec<StudentRecord>)> {
        Ok((
            self.load_collection(VALID_KEY)?,
            self.load_collection(INVALID_KEY)?,
        ))
    }

    /// Saves both collections under their fixed keys.
    fn save_roster(&self, valid: &[StudentRecord], invalid: &[StudentRecord]) -> RepoResult<()> {
        self.save_collection(VALID_KEY, valid)?;
        self.save_collection(INVALID_KEY, invalid)
    }
}

/// SQLite-backed key-value repository over the `kv_store` table.
pub struct SqliteRosterRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteRosterRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl RosterRepository for SqliteRosterRepository<'_> {
    fn load_collection(&self, key: &str) -> RepoResult<Vec<StudentRecord>> {
        let value: Option<String> = self
            .conn
            .query_row(
                "SELECT value FROM kv_store WHERE key = ?1;",
                [key],
                |row| row.get(0),
            )
            .optional()?;

        let Some(value) = value else {
            return Ok(Vec::new());
        };
        serde_json::from_str(&value).map_err(|err| RepoError::InvalidData {
            key: key.to_string(),
            message: err.to_string(),
        })
    }

    fn save_collection(&self, key: &str, records: &[StudentRecord]) -> RepoResult<()> {
        let value = serde_json::to_string(records).map_err(RepoError::Encode)?;
        self.conn.execute(
            "INSERT INTO kv_store (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = (strftime('%s', 'now') * 1000);",
            params![key, value],
        )?;
        Ok(())
    }

    fn save_roster(&self, valid: &[StudentRecord], invalid: &[StudentRecord]) -> RepoResult<()> {
        let tx = self.conn.unchecked_transaction()?;
        self.save_collection(VALID_KEY, valid)?;
        self.save_collection(INVALID_KEY, invalid)?;
        tx.commit()?;
        Ok(())
    }
}
