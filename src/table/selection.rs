//! Checked rows of the record table

use crate::record::RecordId;
use std::collections::BTreeSet;

/// Set of record ids currently checked
///
/// Ids are kept ordered so bulk requests list them deterministically.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    ids: BTreeSet<RecordId>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Checks `id`; returns false if it already was
    pub fn insert(&mut self, id: RecordId) -> bool {
        self.ids.insert(id)
    }

    /// Unchecks `id`; returns false if it was not checked
    pub fn remove(&mut self, id: RecordId) -> bool {
        self.ids.remove(&id)
    }

    pub fn contains(&self, id: RecordId) -> bool {
        self.ids.contains(&id)
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Checked ids in ascending order
    pub fn ids(&self) -> Vec<RecordId> {
        self.ids.iter().copied().collect()
    }

    /// Drops every id not in `visible`; returns how many were dropped
    pub fn retain_visible(&mut self, visible: &[RecordId]) -> usize {
        let before = self.ids.len();
        self.ids.retain(|id| visible.contains(id));
        before - self.ids.len()
    }

    /// True when `visible` is non-empty and every id in it is checked
    pub fn covers(&self, visible: &[RecordId]) -> bool {
        !visible.is_empty() && visible.iter().all(|id| self.ids.contains(id))
    }
}
