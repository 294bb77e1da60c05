//! Job kinds and the reconciliation passes they contribute.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use steward_id::{AreaId, DesignationKind};
use steward_reconcile::{
    ReconcilePass, Scoring, StockCounter, Thing, ThresholdTrigger, WorldMap,
};

use super::livestock::LivestockConfig;
use crate::error::JobError;

/// Growth below which a tree counts as a sapling.
pub const DEFAULT_MIN_GROWTH: f32 = 0.9;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobKindTag {
    Hunting,
    Forestry,
    Foraging,
    Livestock,
}

impl JobKindTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobKindTag::Hunting => "hunting",
            JobKindTag::Forestry => "forestry",
            JobKindTag::Foraging => "foraging",
            JobKindTag::Livestock => "livestock",
        }
    }
}

impl fmt::Display for JobKindTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Hunt wild animals for meat.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HuntingConfig {
    pub allowed: BTreeSet<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub area: Option<AreaId>,
}

impl HuntingConfig {
    pub fn new<I, S>(allowed: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            allowed: allowed.into_iter().map(Into::into).collect(),
            area: None,
        }
    }

    pub fn in_area(mut self, area: AreaId) -> Self {
        self.area = Some(area);
        self
    }
}

/// Cut trees for wood.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForestryConfig {
    pub allowed: BTreeSet<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub area: Option<AreaId>,
    #[serde(default)]
    pub allow_saplings: bool,
    #[serde(default = "default_min_growth")]
    pub min_growth: f32,
}

fn default_min_growth() -> f32 {
    DEFAULT_MIN_GROWTH
}

impl ForestryConfig {
    pub fn new<I, S>(allowed: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            allowed: allowed.into_iter().map(Into::into).collect(),
            area: None,
            allow_saplings: false,
            min_growth: DEFAULT_MIN_GROWTH,
        }
    }

    pub fn in_area(mut self, area: AreaId) -> Self {
        self.area = Some(area);
        self
    }
}

/// Harvest wild plants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForagingConfig {
    pub allowed: BTreeSet<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub area: Option<AreaId>,
    /// Only harvest plants at full growth.
    #[serde(default)]
    pub force_full_grown: bool,
}

impl ForagingConfig {
    pub fn new<I, S>(allowed: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            allowed: allowed.into_iter().map(Into::into).collect(),
            area: None,
            force_full_grown: false,
        }
    }

    pub fn in_area(mut self, area: AreaId) -> Self {
        self.area = Some(area);
        self
    }
}

/// What a job manages, with its kind-specific configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum JobKind {
    Hunting(HuntingConfig),
    Forestry(ForestryConfig),
    Foraging(ForagingConfig),
    Livestock(LivestockConfig),
}

impl JobKind {
    pub fn tag(&self) -> JobKindTag {
        match self {
            JobKind::Hunting(_) => JobKindTag::Hunting,
            JobKind::Forestry(_) => JobKindTag::Forestry,
            JobKind::Foraging(_) => JobKindTag::Foraging,
            JobKind::Livestock(_) => JobKindTag::Livestock,
        }
    }

    /// Check the configuration against the host's content and map.
    pub fn validate(&self, trigger: &ThresholdTrigger, map: &dyn WorldMap) -> Result<(), JobError> {
        match self {
            JobKind::Hunting(config) => {
                validate_defs(&config.allowed, map)?;
                validate_area(config.area, map)?;
                validate_defs(&filter_defs(trigger), map)
            }
            JobKind::Forestry(config) => {
                validate_defs(&config.allowed, map)?;
                validate_area(config.area, map)?;
                validate_defs(&filter_defs(trigger), map)
            }
            JobKind::Foraging(config) => {
                validate_defs(&config.allowed, map)?;
                validate_area(config.area, map)?;
                validate_defs(&filter_defs(trigger), map)
            }
            JobKind::Livestock(config) => config.validate(map),
        }
    }

    /// Stock the trigger compares against its target.
    pub fn current(&self, trigger: &ThresholdTrigger, map: &dyn WorldMap, stock: &dyn StockCounter) -> i64 {
        match self {
            JobKind::Livestock(config) => config.colony_size(map),
            _ => i64::from(trigger.count(stock)),
        }
    }

    /// The passes one reconciliation runs, given the current stock.
    pub fn passes<'a>(
        &'a self,
        trigger: &ThresholdTrigger,
        current: i64,
        map: &'a dyn WorldMap,
    ) -> Vec<ReconcilePass<'a>> {
        let target = i64::from(trigger.target());
        match self {
            JobKind::Hunting(config) => vec![ReconcilePass::new(DesignationKind::Hunt, target, current)
                .eligible(move |t| {
                    config.allowed.contains(&t.def)
                        && t.animal().is_some_and(|a| a.wild)
                        && placed(map, config.area, t)
                })
                .yields(|t| t.animal().map_or(0, |a| a.meat_yield))
                .scoring(Scoring::YieldPerDistance)],
            JobKind::Forestry(config) => vec![ReconcilePass::new(DesignationKind::CutPlant, target, current)
                .eligible(move |t| {
                    config.allowed.contains(&t.def)
                        && t.plant().is_some_and(|p| {
                            p.tree && (config.allow_saplings || p.growth >= config.min_growth)
                        })
                        && placed(map, config.area, t)
                })
                .yields(|t| t.plant().map_or(0, |p| p.wood_yield))
                .scoring(Scoring::YieldPerDistance)],
            JobKind::Foraging(config) => vec![ReconcilePass::new(DesignationKind::HarvestPlant, target, current)
                .eligible(move |t| {
                    config.allowed.contains(&t.def)
                        && t.plant().is_some_and(|p| {
                            p.harvestable && (!config.force_full_grown || p.growth >= 1.0)
                        })
                        && placed(map, config.area, t)
                })
                .yields(|t| t.plant().map_or(0, |p| p.harvest_yield))
                .scoring(Scoring::YieldPerDistanceSquared)],
            JobKind::Livestock(config) => config.passes(map),
        }
    }
}

/// Reachable, and inside `area` when one is set.
pub(crate) fn placed(map: &dyn WorldMap, area: Option<AreaId>, thing: &Thing) -> bool {
    map.is_reachable(thing.position)
        && area.is_none_or(|area| map.area_contains(area, thing.position) == Some(true))
}

fn filter_defs(trigger: &ThresholdTrigger) -> BTreeSet<String> {
    trigger.filter().defs().map(str::to_string).collect()
}

pub(crate) fn validate_defs(defs: &BTreeSet<String>, map: &dyn WorldMap) -> Result<(), JobError> {
    if defs.is_empty() {
        return Err(JobError::EmptyFilter);
    }
    match defs.iter().find(|def| !map.is_known_def(def)) {
        Some(def) => Err(JobError::UnknownDef(def.clone())),
        None => Ok(()),
    }
}

pub(crate) fn validate_area(area: Option<AreaId>, map: &dyn WorldMap) -> Result<(), JobError> {
    match area {
        Some(area) if map.area_contains(area, map.base_position()).is_none() => {
            Err(JobError::MissingArea(area))
        }
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use steward_reconcile::{PlantTraits, Position, StockFilter};
    use steward_testing::{FakeMap, Rect};

    fn trigger(def: &str, target: u32) -> ThresholdTrigger {
        ThresholdTrigger::new(target, StockFilter::new([def]))
    }

    #[test]
    fn test_validate_reports_config_errors() {
        let mut map = FakeMap::new();
        map.know_def("deer");
        map.know_def("meat");

        let ok = JobKind::Hunting(HuntingConfig::new(["deer"]));
        assert_eq!(ok.validate(&trigger("meat", 10), &map), Ok(()));

        let empty = JobKind::Hunting(HuntingConfig::new(Vec::<String>::new()));
        assert_eq!(empty.validate(&trigger("meat", 10), &map), Err(JobError::EmptyFilter));

        let unknown = JobKind::Hunting(HuntingConfig::new(["dragon"]));
        assert_eq!(
            unknown.validate(&trigger("meat", 10), &map),
            Err(JobError::UnknownDef("dragon".into()))
        );

        let area = AreaId::new(4);
        let missing = JobKind::Hunting(HuntingConfig::new(["deer"]).in_area(area));
        assert_eq!(
            missing.validate(&trigger("meat", 10), &map),
            Err(JobError::MissingArea(area))
        );

        assert_eq!(
            ok.validate(&trigger("leather", 10), &map),
            Err(JobError::UnknownDef("leather".into()))
        );
    }

    #[test]
    fn test_hunting_respects_area_and_reach() {
        let mut map = FakeMap::new();
        let area = AreaId::new(1);
        map.add_area(area, Rect::new(Position::new(0, 0), Position::new(10, 10)));
        let inside = map.spawn_animal("deer", Position::new(5, 5), 20);
        let outside = map.spawn_animal("deer", Position::new(20, 5), 20);
        let cut_off = map.spawn_animal("deer", Position::new(6, 6), 20);
        map.set_unreachable(Position::new(6, 6));
        let boar = map.spawn_animal("boar", Position::new(4, 4), 20);

        let kind = JobKind::Hunting(HuntingConfig::new(["deer"]).in_area(area));
        let passes = kind.passes(&trigger("meat", 100), 0, &map);
        let pass = &passes[0];

        let accepts = |id| pass.accepts(&map.thing(id).unwrap());
        assert!(accepts(inside));
        assert!(!accepts(outside));
        assert!(!accepts(cut_off));
        assert!(!accepts(boar));
    }

    #[test]
    fn test_forestry_sapling_rule() {
        let mut map = FakeMap::new();
        let young = PlantTraits {
            tree: true,
            growth: 0.3,
            wood_yield: 5,
            harvest_yield: 0,
            harvestable: false,
        };
        let sapling = map.spawn_plant_with("oak", Position::new(1, 1), young);
        let grown = map.spawn_tree("oak", Position::new(2, 2), 25);

        let mut config = ForestryConfig::new(["oak"]);
        let strict = JobKind::Forestry(config.clone());
        let passes = strict.passes(&trigger("wood", 100), 0, &map);
        assert!(!passes[0].accepts(&map.thing(sapling).unwrap()));
        assert!(passes[0].accepts(&map.thing(grown).unwrap()));
        assert_eq!(passes[0].yield_of(&map.thing(grown).unwrap()), 25);

        config.allow_saplings = true;
        let lenient = JobKind::Forestry(config);
        let passes = lenient.passes(&trigger("wood", 100), 0, &map);
        assert!(passes[0].accepts(&map.thing(sapling).unwrap()));
    }

    #[test]
    fn test_foraging_full_grown_rule() {
        let mut map = FakeMap::new();
        let half = PlantTraits {
            tree: false,
            growth: 0.6,
            wood_yield: 0,
            harvest_yield: 4,
            harvestable: true,
        };
        let bush = map.spawn_plant_with("berry_bush", Position::new(1, 1), half);

        let mut config = ForagingConfig::new(["berry_bush"]);
        let kind = JobKind::Foraging(config.clone());
        let passes = kind.passes(&trigger("berries", 50), 0, &map);
        assert!(passes[0].accepts(&map.thing(bush).unwrap()));
        assert_eq!(passes[0].scoring, Scoring::YieldPerDistanceSquared);

        config.force_full_grown = true;
        let kind = JobKind::Foraging(config);
        let passes = kind.passes(&trigger("berries", 50), 0, &map);
        assert!(!passes[0].accepts(&map.thing(bush).unwrap()));
    }

    #[test]
    fn test_serde_tagged_by_kind() {
        let kind = JobKind::Hunting(HuntingConfig::new(["deer"]).in_area(AreaId::new(2)));
        let json = serde_json::to_value(&kind).unwrap();
        assert_eq!(json["kind"], "hunting");
        assert_eq!(json["area"], "area_2");

        let back: JobKind = serde_json::from_value(json).unwrap();
        assert_eq!(back, kind);
    }
}
