//! Map plus registry, with a stand-in for colonists doing the work.

use std::collections::BTreeMap;

use steward_id::DesignationKind;
use steward_reconcile::{Designation, DesignationRegistry, HostContext, Tick, WorldMap};
use tracing::trace;

use crate::{FakeMap, FakeRegistry};

/// A complete host for the engine.
#[derive(Debug, Clone, Default)]
pub struct FakeWorld {
    pub map: FakeMap,
    pub registry: FakeRegistry,
    /// Stock def credited when a designation of a kind is fulfilled. Kinds
    /// without an entry credit nothing.
    pub produce: BTreeMap<DesignationKind, String>,
}

impl FakeWorld {
    pub fn new(map: FakeMap) -> Self {
        Self {
            map,
            registry: FakeRegistry::new(),
            produce: BTreeMap::new(),
        }
    }

    pub fn producing(mut self, kind: DesignationKind, def: &str) -> Self {
        self.produce.insert(kind, def.to_string());
        self
    }

    /// Borrow the world for one engine call.
    pub fn context(&mut self, tick: Tick) -> HostContext<'_> {
        HostContext {
            tick,
            registry: &mut self.registry,
            map: &self.map,
            stock: &self.map,
        }
    }

    /// Carry out one designation: remove it, apply its effect on the
    /// target, and credit produce. False if it was not outstanding.
    pub fn fulfil(&mut self, designation: &Designation) -> bool {
        if !self.registry.delete(designation) {
            return false;
        }
        let Some(thing) = self.map.thing(designation.target) else {
            return true;
        };

        let amount = match designation.kind {
            DesignationKind::Hunt | DesignationKind::Slaughter => thing.animal().map(|a| a.meat_yield),
            DesignationKind::CutPlant => thing.plant().map(|p| p.wood_yield),
            DesignationKind::HarvestPlant => thing.plant().map(|p| p.harvest_yield),
            DesignationKind::Tame => None,
        }
        .unwrap_or_default();

        match designation.kind {
            DesignationKind::Tame => {
                self.map.tame(thing.id);
            }
            _ => {
                self.map.despawn(thing.id);
            }
        }
        if let Some(def) = self.produce.get(&designation.kind) {
            self.map.add_stock(def, amount);
        }

        trace!(designation = %designation, amount, "Designation fulfilled");
        true
    }

    /// Fulfil up to `n` of the oldest outstanding designations. Returns how
    /// many were carried out.
    pub fn work(&mut self, n: usize) -> usize {
        let batch: Vec<Designation> = self.registry.all().iter().take(n).copied().collect();
        batch.iter().filter(|d| self.fulfil(d)).count()
    }
}
