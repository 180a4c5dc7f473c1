//! Field-level validation rules for student records.
//!
//! # Responsibility
//! - Produce a pass/fail verdict plus a field → message map.
//! - Serve import, manual entry and edits with one rule set.
//!
//! # Invariants
//! - Every rule runs; a failing field never hides another failing field.
//! - Validation is pure: same record, same report.
//! - An empty interests list passes the recognized-skill rule.

use crate::model::student::{FieldErrors, StudentField, StudentRecord};
use once_cell::sync::Lazy;
use regex::Regex;

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email regex"));
static NON_PRINTABLE_ASCII_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^\x20-\x7E]").expect("valid printable ascii regex"));

/// Lowercase keywords an interests list must mention at least once.
pub const RECOGNIZED_SKILLS: &[&str] = &[
    "web dev",
    "cybersecurity",
    "dsa",
    "cloud",
    "ai/ml",
    "blockchain",
    "robotics",
    "app dev",
];

pub const MSG_NAME_EMPTY: &str = "Name cannot be empty.";
pub const MSG_NAME_NOT_ENGLISH: &str = "Name must be in English.";
pub const MSG_BRANCH_EMPTY: &str = "Branch cannot be empty.";
pub const MSG_BRANCH_NOT_ENGLISH: &str = "Branch name must be in English.";
pub const MSG_EMAIL_INVALID: &str = "Invalid email format.";
pub const MSG_GPA_RANGE: &str = "GPA must be a number between 0 and 4.";
pub const MSG_YEAR_RANGE: &str = "Year must be a number between 1 and 5.";
pub const MSG_INTERESTS_UNRECOGNIZED: &str =
    "Interests must include at least one popular skill (e.g., Web Dev, AI/ML).";

/// Outcome of validating one record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    pub errors: FieldErrors,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Applies every field rule to `record`.
pub fn validate_student(record: &StudentRecord) -> ValidationReport {
    let mut errors = FieldErrors::new();

    if let Some(message) = check_english_text(&record.name, MSG_NAME_EMPTY, MSG_NAME_NOT_ENGLISH) {
        errors.insert(StudentField::Name, message.to_string());
    }
    if let Some(message) =
        check_english_text(&record.branch, MSG_BRANCH_EMPTY, MSG_BRANCH_NOT_ENGLISH)
    {
        errors.insert(StudentField::Branch, message.to_string());
    }
    if !EMAIL_RE.is_match(&record.email) {
        errors.insert(StudentField::Email, MSG_EMAIL_INVALID.to_string());
    }
    if !record.gpa.is_some_and(|gpa| (0.0..=4.0).contains(&gpa)) {
        errors.insert(StudentField::Gpa, MSG_GPA_RANGE.to_string());
    }
    if !record.year.is_some_and(|year| (1..=5).contains(&year)) {
        errors.insert(StudentField::Year, MSG_YEAR_RANGE.to_string());
    }
    if !record.interests.is_empty() && !record.interests.iter().any(|i| mentions_skill(i)) {
        errors.insert(
            StudentField::Interests,
            MSG_INTERESTS_UNRECOGNIZED.to_string(),
        );
    }

    ValidationReport { errors }
}

/// Whether `interest` contains a recognized skill keyword, ignoring case.
pub fn mentions_skill(interest: &str) -> bool {
    let lowered = interest.to_lowercase();
    RECOGNIZED_SKILLS
        .iter()
        .any(|skill| lowered.contains(skill))
}

fn check_english_text(
    value: &str,
    empty_message: &'static str,
    non_english_message: &'static str,
) -> Option<&'static str> {
    if value.trim().is_empty() {
        Some(empty_message)
    } else if NON_PRINTABLE_ASCII_RE.is_match(value) {
        Some(non_english_message)
    } else {
        None
    }
}
