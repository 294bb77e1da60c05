//! Typed ID definitions.

use serde::{Deserialize, Serialize};

use crate::IdError;

// =============================================================================
// Engine
// =============================================================================

define_engine_id!(JobId, "job");

// =============================================================================
// Host
// =============================================================================

define_host_id!(ThingId, "thing");
define_host_id!(AreaId, "area");

// =============================================================================
// Designations
// =============================================================================

/// The action a designation orders the colony to perform on its target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DesignationKind {
    /// Hunt a wild animal for meat.
    Hunt,
    /// Tame a wild animal.
    Tame,
    /// Slaughter a colony animal.
    Slaughter,
    /// Cut down a plant (logging).
    CutPlant,
    /// Harvest a plant's produce.
    HarvestPlant,
}

impl DesignationKind {
    /// All designation kinds, in declaration order.
    pub const ALL: [DesignationKind; 5] = [
        DesignationKind::Hunt,
        DesignationKind::Tame,
        DesignationKind::Slaughter,
        DesignationKind::CutPlant,
        DesignationKind::HarvestPlant,
    ];

    /// Stable code used in logs and events.
    pub fn as_str(&self) -> &'static str {
        match self {
            DesignationKind::Hunt => "hunt",
            DesignationKind::Tame => "tame",
            DesignationKind::Slaughter => "slaughter",
            DesignationKind::CutPlant => "cut_plant",
            DesignationKind::HarvestPlant => "harvest_plant",
        }
    }
}

impl std::fmt::Display for DesignationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for DesignationKind {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| IdError::UnknownKind(s.to_string()))
    }
}
