//! In-memory designation registry.

use steward_id::{DesignationKind, ThingId};
use steward_reconcile::{Designation, DesignationRegistry};

/// Registry that keeps designations in placement order and allows at most
/// one designation per target.
#[derive(Debug, Clone, Default)]
pub struct FakeRegistry {
    designations: Vec<Designation>,
    adds: usize,
    deletes: usize,
}

impl FakeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Place a designation the way a player would by hand.
    pub fn designate_by_hand(&mut self, target: ThingId, kind: DesignationKind) -> Option<Designation> {
        self.add_designation(target, kind)
    }

    pub fn contains(&self, designation: &Designation) -> bool {
        self.designations.contains(designation)
    }

    pub fn all(&self) -> &[Designation] {
        &self.designations
    }

    pub fn len(&self) -> usize {
        self.designations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.designations.is_empty()
    }

    /// Drop every designation on `target` (the target left the world).
    pub fn forget_target(&mut self, target: ThingId) {
        self.designations.retain(|d| d.target != target);
    }

    /// Successful `add_designation` calls so far.
    pub fn adds(&self) -> usize {
        self.adds
    }

    /// Successful `delete` calls so far.
    pub fn deletes(&self) -> usize {
        self.deletes
    }
}

impl DesignationRegistry for FakeRegistry {
    fn add_designation(&mut self, target: ThingId, kind: DesignationKind) -> Option<Designation> {
        if self.designation_on(target).is_some() {
            return None;
        }
        let designation = Designation::new(target, kind);
        self.designations.push(designation);
        self.adds += 1;
        Some(designation)
    }

    fn by_kind(&self, kind: DesignationKind) -> Vec<Designation> {
        self.designations
            .iter()
            .filter(|d| d.kind == kind)
            .copied()
            .collect()
    }

    fn designation_on(&self, target: ThingId) -> Option<Designation> {
        self.designations.iter().find(|d| d.target == target).copied()
    }

    fn delete(&mut self, designation: &Designation) -> bool {
        let before = self.designations.len();
        self.designations.retain(|d| d != designation);
        let removed = self.designations.len() != before;
        if removed {
            self.deletes += 1;
        }
        removed
    }
}
