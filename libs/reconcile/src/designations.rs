//! A job's own bookkeeping of the designations it is responsible for.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::host::Designation;

/// Designations owned by one job, oldest first.
///
/// Order matters: surplus withdrawal takes the most recently added first.
/// Membership checks go through a hash index.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(from = "Vec<Designation>", into = "Vec<Designation>")]
pub struct LocalDesignations {
    entries: Vec<Designation>,
    index: HashSet<Designation>,
}

impl PartialEq for LocalDesignations {
    fn eq(&self, other: &Self) -> bool {
        self.entries == other.entries
    }
}

impl Eq for LocalDesignations {}

impl LocalDesignations {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, designation: &Designation) -> bool {
        self.index.contains(designation)
    }

    /// Append as the newest entry. Returns false if already present.
    pub fn push(&mut self, designation: Designation) -> bool {
        if !self.index.insert(designation) {
            return false;
        }
        self.entries.push(designation);
        true
    }

    pub fn remove(&mut self, designation: &Designation) -> bool {
        if !self.index.remove(designation) {
            return false;
        }
        self.entries.retain(|d| d != designation);
        true
    }

    /// Keep only entries present in `global`; returns the dropped ones.
    pub fn retain_in(&mut self, global: &HashSet<Designation>) -> Vec<Designation> {
        let mut dropped = Vec::new();
        self.entries.retain(|d| {
            let keep = global.contains(d);
            if !keep {
                dropped.push(*d);
            }
            keep
        });
        for d in &dropped {
            self.index.remove(d);
        }
        dropped
    }

    /// Remove everything; returns the removed entries oldest first.
    pub fn clear(&mut self) -> Vec<Designation> {
        self.index.clear();
        std::mem::take(&mut self.entries)
    }

    /// Oldest first.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &Designation> {
        self.entries.iter()
    }
}

impl From<Vec<Designation>> for LocalDesignations {
    fn from(entries: Vec<Designation>) -> Self {
        let mut local = Self::new();
        for d in entries {
            local.push(d);
        }
        local
    }
}

impl From<LocalDesignations> for Vec<Designation> {
    fn from(local: LocalDesignations) -> Self {
        local.entries
    }
}
