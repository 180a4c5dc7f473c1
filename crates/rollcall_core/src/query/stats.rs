//! Read-only aggregates for the dashboard header, filters and charts.

use crate::model::student::StudentRecord;
use crate::model::validate::mentions_skill;
use crate::store::roster_store::RosterStore;
use serde::Serialize;

const GPA_BUCKETS: &[(&str, f64)] = &[("0-2", 2.0), ("2-3", 3.0), ("3-3.5", 3.5)];
const GPA_TOP_BUCKET: &str = "3.5-4";

/// Header cards over the valid collection.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DashboardStats {
    pub total: usize,
    /// Mean GPA rounded to two decimals; `0.0` for an empty roster.
    pub average_gpa: f64,
    pub branches: usize,
    pub active: usize,
}

/// Distinct filter values, sorted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FilterOptions {
    pub branches: Vec<String>,
    pub years: Vec<i64>,
}

/// Counts of records in each collection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ValidationSummary {
    pub valid: usize,
    pub invalid: usize,
}

/// One labelled chart bar or slice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Bucket {
    pub label: String,
    pub count: usize,
}

/// GPA badge tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum GpaClass {
    Excellent,
    Good,
    NeedsImprovement,
}

pub fn dashboard_stats(records: &[StudentRecord]) -> DashboardStats {
    if records.is_empty() {
        return DashboardStats::default();
    }

    let gpa_sum: f64 = records.iter().filter_map(|record| record.gpa).sum();
    let average = gpa_sum / records.len() as f64;
    let mut branches: Vec<&str> = records.iter().map(|record| record.branch.as_str()).collect();
    branches.sort_unstable();
    branches.dedup();

    DashboardStats {
        total: records.len(),
        average_gpa: (average * 100.0).round() / 100.0,
        branches: branches.len(),
        active: records
            .iter()
            .filter(|record| record.status == "Active")
            .count(),
    }
}

pub fn filter_options(records: &[StudentRecord]) -> FilterOptions {
    let mut branches: Vec<String> = records.iter().map(|record| record.branch.clone()).collect();
    branches.sort();
    branches.dedup();

    let mut years: Vec<i64> = records.iter().filter_map(|record| record.year).collect();
    years.sort_unstable();
    years.dedup();

    FilterOptions { branches, years }
}

pub fn validation_summary(store: &RosterStore) -> ValidationSummary {
    ValidationSummary {
        valid: store.valid().len(),
        invalid: store.invalid().len(),
    }
}

/// Students per branch, in first-seen order.
pub fn branch_distribution(records: &[&StudentRecord]) -> Vec<Bucket> {
    count_in_order(records.iter().map(|record| record.branch.clone()))
}

/// Students per year, labelled `Year N`, in first-seen order.
pub fn year_distribution(records: &[&StudentRecord]) -> Vec<Bucket> {
    count_in_order(
        records
            .iter()
            .map(|record| format!("Year {}", record.year_text())),
    )
}

/// Students per fixed GPA band: `0-2`, `2-3`, `3-3.5`, `3.5-4`.
pub fn gpa_distribution(records: &[&StudentRecord]) -> Vec<Bucket> {
    let mut buckets: Vec<Bucket> = GPA_BUCKETS
        .iter()
        .map(|(label, _)| *label)
        .chain(std::iter::once(GPA_TOP_BUCKET))
        .map(|label| Bucket {
            label: label.to_string(),
            count: 0,
        })
        .collect();

    for gpa in records.iter().filter_map(|record| record.gpa) {
        let index = GPA_BUCKETS
            .iter()
            .position(|(_, upper)| gpa < *upper)
            .unwrap_or(GPA_BUCKETS.len());
        buckets[index].count += 1;
    }
    buckets
}

pub fn gpa_class(gpa: f64) -> GpaClass {
    if gpa >= 3.5 {
        GpaClass::Excellent
    } else if gpa >= 3.0 {
        GpaClass::Good
    } else {
        GpaClass::NeedsImprovement
    }
}

/// Interests that mention a recognized skill, for the card view.
pub fn featured_interests(record: &StudentRecord) -> Vec<&str> {
    record
        .interests
        .iter()
        .filter(|interest| mentions_skill(interest))
        .map(String::as_str)
        .collect()
}

fn count_in_order(labels: impl Iterator<Item = String>) -> Vec<Bucket> {
    let mut buckets: Vec<Bucket> = Vec::new();
    for label in labels {
        match buckets.iter_mut().find(|bucket| bucket.label == label) {
            Some(bucket) => bucket.count += 1,
            None => buckets.push(Bucket { label, count: 1 }),
        }
    }
    buckets
}
