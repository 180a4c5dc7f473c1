//! Student record domain model.
//!
//! # Responsibility
//! - Define the canonical record shared by import, manual entry and edits.
//! - Define the field-level error map produced by validation.
//!
//! # Invariants
//! - `id` is stable for the record lifetime and unique across both
//!   collections of a store.
//! - `validation_errors` is `Some` only while the record is quarantined.
//! - `year`/`gpa` of `None` mean "unparseable input", never "absent".

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};

/// Stable identifier assigned by the store.
pub type StudentId = u32;

/// Field name → human-readable message.
pub type FieldErrors = BTreeMap<StudentField, String>;

/// Status applied when input omits one.
pub const DEFAULT_STATUS: &str = "Active";

/// Fields that can carry a validation message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StudentField {
    Name,
    Branch,
    Email,
    Gpa,
    Year,
    Interests,
}

impl StudentField {
    /// Wire/display name, matching the serialized map key.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Branch => "branch",
            Self::Email => "email",
            Self::Gpa => "gpa",
            Self::Year => "year",
            Self::Interests => "interests",
        }
    }
}

impl Display for StudentField {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Canonical student record.
///
/// Serialized with camelCase keys so persisted snapshots keep the
/// `validationErrors` naming used by the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentRecord {
    pub id: StudentId,
    pub name: String,
    pub branch: String,
    /// Semantically 1..=5. `None` when the input could not be parsed.
    pub year: Option<i64>,
    pub email: String,
    pub phone: String,
    pub skills: String,
    pub status: String,
    /// Semantically 0.0..=4.0. `None` when the input could not be parsed.
    pub gpa: Option<f64>,
    /// Trimmed, non-empty tokens in input order. Duplicates are kept.
    #[serde(default)]
    pub interests: Vec<String>,
    #[serde(default)]
    pub projects: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation_errors: Option<FieldErrors>,
}

impl StudentRecord {
    /// Whether the record carries a non-empty error map.
    pub fn is_quarantined(&self) -> bool {
        self.validation_errors
            .as_ref()
            .is_some_and(|errors| !errors.is_empty())
    }

    /// Year rendered for display and search; empty when unparseable.
    pub fn year_text(&self) -> String {
        self.year.map(|year| year.to_string()).unwrap_or_default()
    }

    /// GPA rendered for display and search; empty when unparseable.
    pub fn gpa_text(&self) -> String {
        self.gpa.map(|gpa| gpa.to_string()).unwrap_or_default()
    }

    /// Interests rendered as a comma-joined list.
    pub fn interests_text(&self) -> String {
        self.interests.join(", ")
    }
}

/// Manual-entry form input.
///
/// Numeric fields stay textual here and are parsed with the same rules the
/// import normalizer uses.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StudentDraft {
    pub name: String,
    pub branch: String,
    pub year: String,
    pub email: String,
    pub gpa: String,
    pub interests: String,
}

/// Partial update applied by a profile edit. `None` keeps the stored value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StudentPatch {
    pub name: Option<String>,
    pub branch: Option<String>,
    pub year: Option<Option<i64>>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub skills: Option<String>,
    pub status: Option<String>,
    pub gpa: Option<Option<f64>>,
    pub interests: Option<Vec<String>>,
    pub projects: Option<u32>,
}

impl StudentPatch {
    /// Merges this patch over `record`, leaving `id` untouched.
    pub fn apply_to(&self, record: &mut StudentRecord) {
        if let Some(name) = &self.name {
            record.name = name.clone();
        }
        if let Some(branch) = &self.branch {
            record.branch = branch.clone();
        }
        if let Some(year) = self.year {
            record.year = year;
        }
        if let Some(email) = &self.email {
            record.email = email.clone();
        }
        if let Some(phone) = &self.phone {
            record.phone = phone.clone();
        }
        if let Some(skills) = &self.skills {
            record.skills = skills.clone();
        }
        if let Some(status) = &self.status {
            record.status = status.clone();
        }
        if let Some(gpa) = self.gpa {
            record.gpa = gpa;
        }
        if let Some(interests) = &self.interests {
            record.interests = interests.clone();
        }
        if let Some(projects) = self.projects {
            record.projects = projects;
        }
    }
}
