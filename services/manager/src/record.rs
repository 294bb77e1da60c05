//! Job state that survives a save and reload.
//!
//! Runtime-only state (cached status, the trigger's last evaluation, the
//! valid flag) is rebuilt after loading.

use serde::{Deserialize, Serialize};
use steward_history::History;
use steward_id::JobId;
use steward_reconcile::{LocalDesignations, ThresholdTrigger, Tick};

use crate::job::JobKind;

/// Current record layout. Records with any other version load as invalid
/// jobs.
pub const RECORD_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobRecord {
    pub version: u32,
    pub id: JobId,
    pub priority: usize,
    pub suspended: bool,
    pub last_action: Option<Tick>,
    pub action_interval: Tick,
    pub kind: JobKind,
    pub trigger: ThresholdTrigger,
    pub history: History,
    pub designations: LocalDesignations,
}
