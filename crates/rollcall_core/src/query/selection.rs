//! Row selection for bulk actions (export, mail).

use crate::model::student::{StudentId, StudentRecord};
use std::collections::BTreeSet;

/// Set of selected student ids.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    ids: BTreeSet<StudentId>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn contains(&self, id: StudentId) -> bool {
        self.ids.contains(&id)
    }

    pub fn ids(&self) -> impl Iterator<Item = StudentId> + '_ {
        self.ids.iter().copied()
    }

    pub fn toggle(&mut self, id: StudentId) {
        if !self.ids.remove(&id) {
            self.ids.insert(id);
        }
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    /// Whether every record of a non-empty projection is selected.
    pub fn all_selected(&self, filtered: &[&StudentRecord]) -> bool {
        !filtered.is_empty() && filtered.iter().all(|record| self.contains(record.id))
    }

    /// Deselects the projection when fully selected, otherwise selects all of it.
    pub fn toggle_all(&mut self, filtered: &[&StudentRecord]) {
        if self.all_selected(filtered) {
            for record in filtered {
                self.ids.remove(&record.id);
            }
        } else {
            self.ids.extend(filtered.iter().map(|record| record.id));
        }
    }

    /// Selected valid records, in collection order.
    pub fn selected<'a>(&self, valid: &'a [StudentRecord]) -> Vec<&'a StudentRecord> {
        valid
            .iter()
            .filter(|record| self.contains(record.id))
            .collect()
    }

    /// Records a bulk export should cover: the selection when non-empty,
    /// otherwise the filtered projection.
    pub fn export_subset<'a>(
        &self,
        valid: &'a [StudentRecord],
        filtered: &[&'a StudentRecord],
    ) -> Vec<&'a StudentRecord> {
        if self.is_empty() {
            filtered.to_vec()
        } else {
            self.selected(valid)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Selection;
    use crate::model::student::StudentRecord;

    fn record(id: u32) -> StudentRecord {
        StudentRecord {
            id,
            name: format!("S{id}"),
            branch: "CS".to_string(),
            year: Some(1),
            email: format!("s{id}@uni.edu"),
            phone: String::new(),
            skills: String::new(),
            status: "Active".to_string(),
            gpa: Some(3.0),
            interests: Vec::new(),
            projects: 0,
            validation_errors: None,
        }
    }

    #[test]
    fn toggle_all_selects_then_deselects_projection() {
        let valid = vec![record(1), record(2), record(3)];
        let filtered: Vec<&StudentRecord> = valid.iter().take(2).collect();
        let mut selection = Selection::new();

        selection.toggle_all(&filtered);
        assert!(selection.all_selected(&filtered));
        assert_eq!(selection.len(), 2);

        selection.toggle_all(&filtered);
        assert!(selection.is_empty());
    }

    #[test]
    fn export_subset_prefers_selection() {
        let valid = vec![record(1), record(2), record(3)];
        let filtered: Vec<&StudentRecord> = valid.iter().collect();
        let mut selection = Selection::new();
        assert_eq!(selection.export_subset(&valid, &filtered).len(), 3);

        selection.toggle(3);
        let subset = selection.export_subset(&valid, &filtered);
        assert_eq!(subset.len(), 1);
        assert_eq!(subset[0].id, 3);

        selection.toggle(3);
        assert!(selection.is_empty());
    }

    #[test]
    fn empty_projection_is_never_all_selected() {
        assert!(!Selection::new().all_selected(&[]));
    }
}
