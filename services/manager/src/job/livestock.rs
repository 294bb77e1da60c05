//! Livestock: keep a herd at per-bucket sizes by taming and culling.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use steward_id::{AreaId, DesignationKind};
use steward_reconcile::{AnimalTraits, ReconcilePass, Scoring, Sex, Thing, WorldMap};

use super::kind::{placed, validate_area};
use crate::error::JobError;
use crate::training::TrainingGraph;

/// Herd bucket by age and sex.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgeSex {
    AdultFemale,
    AdultMale,
    JuvenileFemale,
    JuvenileMale,
}

impl AgeSex {
    pub const ALL: [AgeSex; 4] = [
        AgeSex::AdultFemale,
        AgeSex::AdultMale,
        AgeSex::JuvenileFemale,
        AgeSex::JuvenileMale,
    ];

    pub fn of(animal: &AnimalTraits) -> Self {
        match (animal.adult, animal.sex) {
            (true, Sex::Female) => AgeSex::AdultFemale,
            (true, Sex::Male) => AgeSex::AdultMale,
            (false, Sex::Female) => AgeSex::JuvenileFemale,
            (false, Sex::Male) => AgeSex::JuvenileMale,
        }
    }

    fn matches(self, thing: &Thing) -> bool {
        thing.animal().is_some_and(|a| AgeSex::of(a) == self)
    }
}

fn enabled() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LivestockConfig {
    pub animal: String,
    /// Wanted herd size per bucket; missing buckets want zero.
    #[serde(default)]
    pub targets: BTreeMap<AgeSex, u32>,
    #[serde(default = "enabled")]
    pub tame: bool,
    #[serde(default = "enabled")]
    pub cull: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub taming_area: Option<AreaId>,
    #[serde(default = "TrainingGraph::standard")]
    pub training: TrainingGraph,
}

impl LivestockConfig {
    pub fn new(animal: impl Into<String>) -> Self {
        Self {
            animal: animal.into(),
            targets: BTreeMap::new(),
            tame: true,
            cull: true,
            taming_area: None,
            training: TrainingGraph::standard(),
        }
    }

    pub fn with_target(mut self, bucket: AgeSex, count: u32) -> Self {
        self.targets.insert(bucket, count);
        self
    }

    pub fn target_for(&self, bucket: AgeSex) -> u32 {
        self.targets.get(&bucket).copied().unwrap_or_default()
    }

    /// Sum over all buckets.
    pub fn total_target(&self) -> u32 {
        self.targets.values().fold(0u32, |sum, n| sum.saturating_add(*n))
    }

    pub fn colony_size(&self, map: &dyn WorldMap) -> i64 {
        map.colony_animals(&self.animal).len() as i64
    }

    pub(crate) fn validate(&self, map: &dyn WorldMap) -> Result<(), JobError> {
        if !map.is_known_def(&self.animal) {
            return Err(JobError::UnknownDef(self.animal.clone()));
        }
        validate_area(self.taming_area, map)
    }

    /// Per bucket: a taming pass up to the bucket target, and a culling pass
    /// over whatever exceeds it.
    pub(crate) fn passes<'a>(&'a self, map: &'a dyn WorldMap) -> Vec<ReconcilePass<'a>> {
        let colony = map.colony_animals(&self.animal);
        let mut passes = Vec::new();

        for bucket in AgeSex::ALL {
            let target = i64::from(self.target_for(bucket));
            let have = colony.iter().filter(|t| bucket.matches(t)).count() as i64;

            if self.tame {
                passes.push(
                    ReconcilePass::new(DesignationKind::Tame, target, have)
                        .eligible(move |t| {
                            t.def == self.animal
                                && bucket.matches(t)
                                && t.animal().is_some_and(|a| a.wild)
                                && placed(map, self.taming_area, t)
                        })
                        .scoring(Scoring::YieldPerDistance),
                );
            }
            if self.cull {
                passes.push(
                    ReconcilePass::new(DesignationKind::Slaughter, (have - target).max(0), 0)
                        .eligible(move |t| {
                            t.def == self.animal
                                && bucket.matches(t)
                                && t.animal().is_some_and(|a| !a.wild)
                        })
                        .scoring(Scoring::Yield),
                );
            }
        }

        passes
    }
}
