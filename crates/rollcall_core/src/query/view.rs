//! Filtered, sorted projection of the valid collection.
//!
//! # Responsibility
//! - Apply search, branch and year filters.
//! - Apply the click-to-toggle column sort.
//!
//! # Invariants
//! - Projections borrow records; they never mutate the store.
//! - Sorting is stable: ties keep collection order.

use crate::model::student::StudentRecord;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Sortable table columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    Name,
    Branch,
    Year,
    Email,
    Gpa,
}

impl SortKey {
    /// Parses a column name as used by table headers and the CLI.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "name" => Some(Self::Name),
            "branch" => Some(Self::Branch),
            "year" => Some(Self::Year),
            "email" => Some(Self::Email),
            "gpa" => Some(Self::Gpa),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

/// Active sort column and direction. No key means collection order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SortState {
    pub key: Option<SortKey>,
    pub direction: SortDirection,
}

impl SortState {
    /// Header click: same ascending key flips to descending, anything else
    /// starts ascending on `key`.
    pub fn toggle(&mut self, key: SortKey) {
        self.direction = if self.key == Some(key) && self.direction == SortDirection::Asc {
            SortDirection::Desc
        } else {
            SortDirection::Asc
        };
        self.key = Some(key);
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Sorts `records` in place according to this state.
    pub fn apply(&self, records: &mut [&StudentRecord]) {
        let Some(key) = self.key else {
            return;
        };
        records.sort_by(|left, right| {
            let ordering = compare_by(key, left, right);
            match self.direction {
                SortDirection::Asc => ordering,
                SortDirection::Desc => ordering.reverse(),
            }
        });
    }
}

/// Filter and sort settings for the valid-record views.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StudentQuery {
    /// Case-insensitive substring over every field. Empty matches all.
    pub search: String,
    /// Exact branch match.
    pub branch: Option<String>,
    /// Exact year match.
    pub year: Option<i64>,
    pub sort: SortState,
}

impl StudentQuery {
    /// Resets search, filters and sorting.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Whether `record` passes search, branch and year filters.
    pub fn matches(&self, record: &StudentRecord) -> bool {
        let search = self.search.to_lowercase();
        let matches_search = search.is_empty()
            || searchable_values(record).any(|value| value.to_lowercase().contains(&search));
        let matches_branch = self
            .branch
            .as_deref()
            .map_or(true, |branch| record.branch == branch);
        let matches_year = self.year.map_or(true, |year| record.year == Some(year));

        matches_search && matches_branch && matches_year
    }

    /// Filters then sorts `records`.
    pub fn apply<'a>(&self, records: &'a [StudentRecord]) -> Vec<&'a StudentRecord> {
        let mut projected: Vec<&StudentRecord> =
            records.iter().filter(|record| self.matches(record)).collect();
        self.sort.apply(&mut projected);
        projected
    }
}

fn searchable_values(record: &StudentRecord) -> impl Iterator<Item = String> + '_ {
    [
        record.id.to_string(),
        record.name.clone(),
        record.branch.clone(),
        record.year_text(),
        record.email.clone(),
        record.interests.join(","),
        record.phone.clone(),
        record.gpa_text(),
        record.projects.to_string(),
        record.skills.clone(),
        record.status.clone(),
    ]
    .into_iter()
}

fn compare_by(key: SortKey, left: &StudentRecord, right: &StudentRecord) -> Ordering {
    match key {
        SortKey::Name => left.name.cmp(&right.name),
        SortKey::Branch => left.branch.cmp(&right.branch),
        SortKey::Email => left.email.cmp(&right.email),
        SortKey::Year => left.year.cmp(&right.year),
        SortKey::Gpa => left
            .gpa
            .partial_cmp(&right.gpa)
            .unwrap_or(Ordering::Equal),
    }
}
