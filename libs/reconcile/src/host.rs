//! Collaborators the host simulation provides.
//!
//! The engine never owns world state. It reads entities through [`WorldMap`],
//! counts stock through [`StockCounter`], and places or removes work orders
//! through [`DesignationRegistry`]. All three are borrowed for the duration
//! of one call via [`HostContext`].

use serde::{Deserialize, Serialize};
use steward_id::{AreaId, DesignationKind, ThingId};

use crate::trigger::{CountScope, StockFilter};
use crate::Tick;

/// Map cell coordinates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub z: i32,
}

impl Position {
    pub const fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }

    /// Straight-line distance in cells.
    pub fn distance(&self, other: Position) -> f64 {
        let dx = f64::from(self.x) - f64::from(other.x);
        let dz = f64::from(self.z) - f64::from(other.z);
        (dx * dx + dz * dz).sqrt()
    }
}

/// A work order: one action on one target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Designation {
    pub target: ThingId,
    pub kind: DesignationKind,
}

impl Designation {
    pub const fn new(target: ThingId, kind: DesignationKind) -> Self {
        Self { target, kind }
    }
}

impl std::fmt::Display for Designation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}@{}", self.kind, self.target)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sex {
    Female,
    Male,
}

/// Facts about an animal, computed by the host.
#[derive(Debug, Clone, PartialEq)]
pub struct AnimalTraits {
    /// Not owned by the colony.
    pub wild: bool,
    pub sex: Sex,
    pub adult: bool,
    /// Meat expected from butchering the carcass.
    pub meat_yield: u32,
}

/// Facts about a plant, computed by the host.
#[derive(Debug, Clone, PartialEq)]
pub struct PlantTraits {
    pub tree: bool,
    /// Growth in `0.0..=1.0`.
    pub growth: f32,
    /// Wood expected from cutting it down.
    pub wood_yield: u32,
    /// Produce expected from harvesting it.
    pub harvest_yield: u32,
    /// The host would accept a harvest order now.
    pub harvestable: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ThingTraits {
    Animal(AnimalTraits),
    Plant(PlantTraits),
    Item,
}

/// Snapshot of one world entity.
#[derive(Debug, Clone, PartialEq)]
pub struct Thing {
    pub id: ThingId,
    pub def: String,
    pub position: Position,
    pub traits: ThingTraits,
}

impl Thing {
    pub fn animal(&self) -> Option<&AnimalTraits> {
        match &self.traits {
            ThingTraits::Animal(traits) => Some(traits),
            _ => None,
        }
    }

    pub fn plant(&self) -> Option<&PlantTraits> {
        match &self.traits {
            ThingTraits::Plant(traits) => Some(traits),
            _ => None,
        }
    }
}

/// The host's registry of outstanding designations.
pub trait DesignationRegistry {
    /// Place a designation. `None` if the host refuses (e.g. the target
    /// already carries one).
    fn add_designation(&mut self, target: ThingId, kind: DesignationKind) -> Option<Designation>;

    /// Every designation of `kind`, in the host's order.
    fn by_kind(&self, kind: DesignationKind) -> Vec<Designation>;

    /// The designation on `target`, of any kind.
    fn designation_on(&self, target: ThingId) -> Option<Designation>;

    /// Remove a designation. Returns false if it was not present.
    fn delete(&mut self, designation: &Designation) -> bool;
}

/// Counts resources on hand.
pub trait StockCounter {
    fn count_of(&self, filter: &StockFilter, scope: CountScope) -> u32;
}

/// Read access to world entities and map geometry.
pub trait WorldMap {
    /// Entities the host considers physically valid targets for `kind`
    /// (huntable animals, cuttable trees, ...), in a stable order.
    fn candidates(&self, kind: DesignationKind) -> Vec<Thing>;

    /// Current snapshot of one entity, if it is still in the world.
    fn thing(&self, id: ThingId) -> Option<Thing>;

    /// Colony-owned animals of one def.
    fn colony_animals(&self, def: &str) -> Vec<Thing>;

    /// `None` if the area does not exist.
    fn area_contains(&self, area: AreaId, position: Position) -> Option<bool>;

    fn is_reachable(&self, position: Position) -> bool;

    /// Where haulers bring resources; distances are measured from here.
    fn base_position(&self) -> Position;

    /// Whether the def name exists in the host's content.
    fn is_known_def(&self, def: &str) -> bool;
}

/// Everything one engine call may touch.
pub struct HostContext<'h> {
    pub tick: Tick,
    pub registry: &'h mut dyn DesignationRegistry,
    pub map: &'h dyn WorldMap,
    pub stock: &'h dyn StockCounter,
}
