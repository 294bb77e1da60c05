//! In-memory world map with stockpiles.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use steward_id::{AreaId, DesignationKind, ThingId};
use steward_reconcile::{
    AnimalTraits, CountScope, PlantTraits, Position, Sex, StockCounter, StockFilter, Thing,
    ThingTraits, WorldMap,
};

/// Axis-aligned rectangle of cells, inclusive on both ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub min: Position,
    pub max: Position,
}

impl Rect {
    pub const fn new(min: Position, max: Position) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, p: Position) -> bool {
        (self.min.x..=self.max.x).contains(&p.x) && (self.min.z..=self.max.z).contains(&p.z)
    }
}

/// Map of animals and plants plus two stock tallies: items in stockpiles
/// and items lying loose.
#[derive(Debug, Clone, Default)]
pub struct FakeMap {
    things: BTreeMap<ThingId, Thing>,
    next_id: u64,
    areas: HashMap<AreaId, Rect>,
    unreachable: HashSet<Position>,
    base: Position,
    known_defs: BTreeSet<String>,
    stockpiled: BTreeMap<String, u32>,
    loose: BTreeMap<String, u32>,
}

impl FakeMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_base(mut self, base: Position) -> Self {
        self.base = base;
        self
    }

    /// Make a def name known without spawning anything.
    pub fn know_def(&mut self, def: &str) {
        self.known_defs.insert(def.to_string());
    }

    fn spawn(&mut self, def: &str, position: Position, traits: ThingTraits) -> ThingId {
        self.next_id += 1;
        let id = ThingId::new(self.next_id);
        self.know_def(def);
        self.things.insert(
            id,
            Thing {
                id,
                def: def.to_string(),
                position,
                traits,
            },
        );
        id
    }

    /// A wild adult female carrying `meat_yield` meat.
    pub fn spawn_animal(&mut self, def: &str, position: Position, meat_yield: u32) -> ThingId {
        self.spawn_animal_with(
            def,
            position,
            AnimalTraits {
                wild: true,
                sex: Sex::Female,
                adult: true,
                meat_yield,
            },
        )
    }

    pub fn spawn_animal_with(&mut self, def: &str, position: Position, traits: AnimalTraits) -> ThingId {
        self.spawn(def, position, ThingTraits::Animal(traits))
    }

    /// A fully grown tree.
    pub fn spawn_tree(&mut self, def: &str, position: Position, wood_yield: u32) -> ThingId {
        self.spawn_plant_with(
            def,
            position,
            PlantTraits {
                tree: true,
                growth: 1.0,
                wood_yield,
                harvest_yield: 0,
                harvestable: false,
            },
        )
    }

    /// A fully grown, harvestable non-tree plant.
    pub fn spawn_plant(&mut self, def: &str, position: Position, harvest_yield: u32) -> ThingId {
        self.spawn_plant_with(
            def,
            position,
            PlantTraits {
                tree: false,
                growth: 1.0,
                wood_yield: 0,
                harvest_yield,
                harvestable: true,
            },
        )
    }

    pub fn spawn_plant_with(&mut self, def: &str, position: Position, traits: PlantTraits) -> ThingId {
        self.spawn(def, position, ThingTraits::Plant(traits))
    }

    pub fn despawn(&mut self, id: ThingId) -> Option<Thing> {
        self.things.remove(&id)
    }

    /// Hand a wild animal to the colony. False if `id` is not an animal.
    pub fn tame(&mut self, id: ThingId) -> bool {
        match self.things.get_mut(&id).map(|t| &mut t.traits) {
            Some(ThingTraits::Animal(animal)) => {
                animal.wild = false;
                true
            }
            _ => false,
        }
    }

    pub fn add_area(&mut self, id: AreaId, rect: Rect) {
        self.areas.insert(id, rect);
    }

    pub fn remove_area(&mut self, id: AreaId) {
        self.areas.remove(&id);
    }

    pub fn set_unreachable(&mut self, position: Position) {
        self.unreachable.insert(position);
    }

    pub fn set_stock(&mut self, def: &str, amount: u32) {
        self.know_def(def);
        self.stockpiled.insert(def.to_string(), amount);
    }

    pub fn set_loose(&mut self, def: &str, amount: u32) {
        self.know_def(def);
        self.loose.insert(def.to_string(), amount);
    }

    /// Deliver produce straight into stockpiles.
    pub fn add_stock(&mut self, def: &str, amount: u32) {
        self.know_def(def);
        *self.stockpiled.entry(def.to_string()).or_default() += amount;
    }

    pub fn stock(&self, def: &str) -> u32 {
        self.stockpiled.get(def).copied().unwrap_or_default()
    }

    pub fn things(&self) -> impl Iterator<Item = &Thing> {
        self.things.values()
    }

    fn accepts_kind(kind: DesignationKind, thing: &Thing) -> bool {
        match (&thing.traits, kind) {
            (ThingTraits::Animal(a), DesignationKind::Hunt | DesignationKind::Tame) => a.wild,
            (ThingTraits::Animal(a), DesignationKind::Slaughter) => !a.wild,
            (ThingTraits::Plant(p), DesignationKind::CutPlant) => p.tree,
            (ThingTraits::Plant(p), DesignationKind::HarvestPlant) => p.harvestable,
            _ => false,
        }
    }
}

impl WorldMap for FakeMap {
    fn candidates(&self, kind: DesignationKind) -> Vec<Thing> {
        self.things
            .values()
            .filter(|t| Self::accepts_kind(kind, t))
            .cloned()
            .collect()
    }

    fn thing(&self, id: ThingId) -> Option<Thing> {
        self.things.get(&id).cloned()
    }

    fn colony_animals(&self, def: &str) -> Vec<Thing> {
        self.things
            .values()
            .filter(|t| t.def == def && t.animal().is_some_and(|a| !a.wild))
            .cloned()
            .collect()
    }

    fn area_contains(&self, area: AreaId, position: Position) -> Option<bool> {
        self.areas.get(&area).map(|rect| rect.contains(position))
    }

    fn is_reachable(&self, position: Position) -> bool {
        !self.unreachable.contains(&position)
    }

    fn base_position(&self) -> Position {
        self.base
    }

    fn is_known_def(&self, def: &str) -> bool {
        self.known_defs.contains(def)
    }
}

impl StockCounter for FakeMap {
    fn count_of(&self, filter: &StockFilter, scope: CountScope) -> u32 {
        let tally = |table: &BTreeMap<String, u32>| -> u32 {
            table
                .iter()
                .filter(|(def, _)| filter.contains(def))
                .map(|(_, n)| *n)
                .sum()
        };
        match scope {
            CountScope::Stockpiles => tally(&self.stockpiled),
            CountScope::WholeMap => tally(&self.stockpiled) + tally(&self.loose),
        }
    }
}
