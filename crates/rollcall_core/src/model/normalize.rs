//! Raw-row normalization.
//!
//! # Responsibility
//! - Turn one loosely-typed spreadsheet row into a canonical record.
//! - Resolve header variants through one declarative alias table.
//! - Fill absent fields with defaults; GPA/projects defaults come from an
//!   injected random source and are synthetic, not measured data.
//!
//! # Invariants
//! - Normalization never rejects a row; correctness is decided by
//!   `validate_student`.
//! - Unparseable year/GPA text becomes `None`, which always fails validation.
//! - Only a missing key counts as absent. An empty string is kept as-is.

use crate::model::student::{StudentDraft, StudentId, StudentRecord, DEFAULT_STATUS};
use once_cell::sync::Lazy;
use rand::Rng;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

static LEADING_INT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*([+-]?\d+)").expect("valid leading int regex"));
static LEADING_FLOAT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*([+-]?(?:\d+\.?\d*|\.\d+)(?:[eE][+-]?\d+)?)")
        .expect("valid leading float regex")
});

const YEAR_WORDS: &[(&str, i64)] = &[
    ("first", 1),
    ("second", 2),
    ("third", 3),
    ("fourth", 4),
    ("fifth", 5),
];

const DEFAULT_BRANCH: &str = "Unknown";
const DEFAULT_YEAR: i64 = 1;
const SYNTHETIC_GPA_MIN: f64 = 2.0;
const SYNTHETIC_GPA_SPAN: f64 = 2.0;
const SYNTHETIC_PROJECTS_MAX: u32 = 4;

/// One loosely-typed cell value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawValue {
    Bool(bool),
    Number(f64),
    Text(String),
}

impl RawValue {
    /// Renders the value as text, numbers in shortest decimal form.
    pub fn to_text(&self) -> String {
        match self {
            Self::Bool(value) => value.to_string(),
            Self::Number(value) => value.to_string(),
            Self::Text(value) => value.clone(),
        }
    }
}

impl From<&str> for RawValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for RawValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<f64> for RawValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

/// Header name → cell value for one input row.
pub type RawRow = BTreeMap<String, RawValue>;

/// Canonical fields an input row can populate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputField {
    Name,
    Branch,
    Year,
    Email,
    Phone,
    Gpa,
    Projects,
    Skills,
    Status,
    Interests,
}

/// Accepted header variants per field, in lookup priority order.
///
/// When none matches exactly, the first variant is compared
/// case-insensitively against every header.
const INPUT_KEYS: &[(InputField, &[&str])] = &[
    (InputField::Name, &["Name", "name"]),
    (InputField::Branch, &["Branch", "branch"]),
    (InputField::Year, &["Year", "year"]),
    (InputField::Email, &["Email", "email"]),
    (InputField::Phone, &["Phone", "phone"]),
    (InputField::Gpa, &["GPA", "gpa"]),
    (InputField::Projects, &["Projects", "projects"]),
    (InputField::Skills, &["Skills", "skills"]),
    (InputField::Status, &["Status", "status"]),
    (InputField::Interests, &["Interests", "interests"]),
];

/// Returns the accepted header variants for `field`.
pub fn input_keys(field: InputField) -> &'static [&'static str] {
    INPUT_KEYS
        .iter()
        .find(|(candidate, _)| *candidate == field)
        .map_or(&[][..], |(_, keys)| *keys)
}

/// Looks up `field` in `row` through the alias table.
pub fn resolve_field(row: &RawRow, field: InputField) -> Option<&RawValue> {
    let keys = input_keys(field);
    if let Some(value) = keys.iter().find_map(|key| row.get(*key)) {
        return Some(value);
    }
    let canonical = keys.first()?;
    row.iter()
        .find(|(header, _)| header.trim().eq_ignore_ascii_case(canonical))
        .map(|(_, value)| value)
}

/// Normalizes one raw row at 0-based `index` into a canonical record.
///
/// The returned record has `id = index + 1` and no error map; the caller
/// validates and files it.
pub fn normalize_row<R: Rng + ?Sized>(row: &RawRow, index: usize, rng: &mut R) -> StudentRecord {
    let text_or = |field: InputField, default: String| {
        resolve_field(row, field).map_or(default, RawValue::to_text)
    };

    let year = match resolve_field(row, InputField::Year) {
        None => Some(DEFAULT_YEAR),
        Some(RawValue::Number(value)) => integral(*value),
        Some(other) => parse_year_text(&other.to_text()),
    };

    let gpa = match resolve_field(row, InputField::Gpa) {
        None => Some(synthetic_gpa(rng)),
        Some(RawValue::Number(value)) => Some(*value).filter(|value| !value.is_nan()),
        Some(other) => parse_gpa_text(&other.to_text()),
    };

    let projects = resolve_field(row, InputField::Projects)
        .and_then(parse_projects)
        .unwrap_or_else(|| synthetic_projects(rng));

    let interests = resolve_field(row, InputField::Interests)
        .map(|value| parse_interests(&value.to_text()))
        .unwrap_or_default();

    StudentRecord {
        id: StudentId::try_from(index + 1).unwrap_or(StudentId::MAX),
        name: text_or(InputField::Name, format!("Student {}", index + 1)),
        branch: text_or(InputField::Branch, DEFAULT_BRANCH.to_string()),
        year,
        email: text_or(InputField::Email, String::new()),
        phone: text_or(InputField::Phone, String::new()),
        skills: text_or(InputField::Skills, String::new()),
        status: text_or(InputField::Status, DEFAULT_STATUS.to_string()),
        gpa,
        interests,
        projects,
        validation_errors: None,
    }
}

/// Builds a record from manual-entry form input.
///
/// Manual entry never invents GPA or projects: missing numbers stay
/// unparseable and projects start at zero.
pub fn draft_to_record(draft: &StudentDraft, id: StudentId) -> StudentRecord {
    StudentRecord {
        id,
        name: draft.name.clone(),
        branch: draft.branch.clone(),
        year: parse_leading_int(&draft.year),
        email: draft.email.clone(),
        phone: String::new(),
        skills: String::new(),
        status: DEFAULT_STATUS.to_string(),
        gpa: parse_gpa_text(&draft.gpa),
        interests: parse_interests(&draft.interests),
        projects: 0,
        validation_errors: None,
    }
}

/// Parses a year cell: ordinal words first, then a leading integer.
pub fn parse_year_text(text: &str) -> Option<i64> {
    let lowered = text.trim().to_lowercase();
    YEAR_WORDS
        .iter()
        .find(|(word, _)| *word == lowered)
        .map(|(_, year)| *year)
        .or_else(|| parse_leading_int(&lowered))
}

/// Parses the leading integer of `text` (`"2nd"` → 2).
pub fn parse_leading_int(text: &str) -> Option<i64> {
    LEADING_INT_RE
        .captures(text)
        .and_then(|caps| caps[1].parse::<i64>().ok())
}

/// Parses the leading decimal number of `text` (`"3.5 approx"` → 3.5).
pub fn parse_gpa_text(text: &str) -> Option<f64> {
    LEADING_FLOAT_RE
        .captures(text)
        .and_then(|caps| caps[1].parse::<f64>().ok())
        .filter(|value| !value.is_nan())
}

/// Splits a comma-separated list into trimmed, non-empty tokens.
pub fn parse_interests(text: &str) -> Vec<String> {
    text.split(',')
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_projects(value: &RawValue) -> Option<u32> {
    match value {
        RawValue::Number(number) => integral(*number).and_then(|n| u32::try_from(n).ok()),
        RawValue::Text(text) => text.trim().parse::<u32>().ok(),
        RawValue::Bool(_) => None,
    }
}

fn integral(value: f64) -> Option<i64> {
    if value.is_finite() && value.fract() == 0.0 {
        Some(value as i64)
    } else {
        None
    }
}

fn synthetic_gpa<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    let raw = rng.gen::<f64>() * SYNTHETIC_GPA_SPAN + SYNTHETIC_GPA_MIN;
    (raw * 100.0).round() / 100.0
}

fn synthetic_projects<R: Rng + ?Sized>(rng: &mut R) -> u32 {
    rng.gen_range(0..=SYNTHETIC_PROJECTS_MAX)
}
