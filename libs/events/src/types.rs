//! Event type definitions for every engine event.

use serde::{Deserialize, Serialize};
use steward_id::{DesignationKind, ThingId};

// =============================================================================
// Event Type Constants
// =============================================================================

/// All event type names as constants.
pub mod event_types {
    // Job lifecycle
    pub const JOB_ADDED: &str = "job.added";
    pub const JOB_DELETED: &str = "job.deleted";
    pub const JOB_INVALIDATED: &str = "job.invalidated";
    pub const JOB_PRIORITY_CHANGED: &str = "job.priority_changed";
    pub const JOB_SUSPENDED: &str = "job.suspended";
    pub const JOB_RESUMED: &str = "job.resumed";

    // Designations
    pub const DESIGNATION_ISSUED: &str = "designation.issued";
    pub const DESIGNATION_ADOPTED: &str = "designation.adopted";
    pub const DESIGNATION_WITHDRAWN: &str = "designation.withdrawn";
    pub const DESIGNATION_PRUNED: &str = "designation.pruned";
    pub const DESIGNATION_RELEASED: &str = "designation.released";

    // Triggers
    pub const TRIGGER_CHANGED: &str = "trigger.changed";
}

/// Something the engine did.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EngineEvent {
    /// A job entered the scheduler.
    JobAdded { kind: String, priority: usize },

    /// A job left the scheduler after cancelling its designations.
    JobDeleted { cancelled: usize },

    /// A job was excluded from scheduling because its configuration is unusable.
    JobInvalidated { reason: String },

    /// A job moved within the priority order.
    JobPriorityChanged { from: usize, to: usize },

    /// The user suspended a job.
    JobSuspended,

    /// The user resumed a job.
    JobResumed,

    /// The engine placed a new designation.
    DesignationIssued {
        target: ThingId,
        kind: DesignationKind,
    },

    /// A designation placed by someone else was taken over by a job.
    DesignationAdopted {
        target: ThingId,
        kind: DesignationKind,
    },

    /// A designation was withdrawn because the job had a surplus.
    DesignationWithdrawn {
        target: ThingId,
        kind: DesignationKind,
    },

    /// A designation was cancelled because its target no longer matches the
    /// job's configuration.
    DesignationPruned {
        target: ThingId,
        kind: DesignationKind,
    },

    /// A designation disappeared from the host registry (completed, cancelled
    /// by hand, or its target left the world) and the job forgot it.
    DesignationReleased {
        target: ThingId,
        kind: DesignationKind,
    },

    /// A job's threshold trigger flipped.
    TriggerChanged {
        active: bool,
        current: i64,
        pending: i64,
        target: i64,
    },
}

impl EngineEvent {
    /// The dotted event type name.
    pub fn event_type(&self) -> &'static str {
        match self {
            EngineEvent::JobAdded { .. } => event_types::JOB_ADDED,
            EngineEvent::JobDeleted { .. } => event_types::JOB_DELETED,
            EngineEvent::JobInvalidated { .. } => event_types::JOB_INVALIDATED,
            EngineEvent::JobPriorityChanged { .. } => event_types::JOB_PRIORITY_CHANGED,
            EngineEvent::JobSuspended => event_types::JOB_SUSPENDED,
            EngineEvent::JobResumed => event_types::JOB_RESUMED,
            EngineEvent::DesignationIssued { .. } => event_types::DESIGNATION_ISSUED,
            EngineEvent::DesignationAdopted { .. } => event_types::DESIGNATION_ADOPTED,
            EngineEvent::DesignationWithdrawn { .. } => event_types::DESIGNATION_WITHDRAWN,
            EngineEvent::DesignationPruned { .. } => event_types::DESIGNATION_PRUNED,
            EngineEvent::DesignationReleased { .. } => event_types::DESIGNATION_RELEASED,
            EngineEvent::TriggerChanged { .. } => event_types::TRIGGER_CHANGED,
        }
    }

    /// Returns true for events that changed the host's designation registry.
    pub fn mutates_registry(&self) -> bool {
        matches!(
            self,
            EngineEvent::DesignationIssued { .. }
                | EngineEvent::DesignationWithdrawn { .. }
                | EngineEvent::DesignationPruned { .. }
        )
    }
}
