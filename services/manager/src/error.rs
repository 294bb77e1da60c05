//! Error types for jobs and the scheduler.

use steward_id::{AreaId, JobId};
use steward_reconcile::TriggerError;
use thiserror::Error;

use crate::job::JobKindTag;

/// Result type for scheduler operations.
pub type SchedulerResult<T> = Result<T, SchedulerError>;

/// A job configuration the host cannot act on.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum JobError {
    #[error("nothing to match: allow-list or stock filter is empty")]
    EmptyFilter,

    #[error("unknown def: {0}")]
    UnknownDef(String),

    #[error("area {0} does not exist")]
    MissingArea(AreaId),

    #[error("unsupported record version {0}")]
    UnsupportedVersion(u32),

    #[error("operation needs a {expected} job, this is a {actual} job")]
    WrongKind {
        expected: JobKindTag,
        actual: JobKindTag,
    },

    #[error("{0} jobs derive their target from per-bucket targets")]
    DerivedTarget(JobKindTag),

    #[error("invalid threshold: {0}")]
    Trigger(#[from] TriggerError),
}

/// Errors returned by [`Scheduler`](crate::Scheduler) operations.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SchedulerError {
    #[error("job not found: {0}")]
    JobNotFound(JobId),

    /// Threshold errors arrive here as [`JobError::Trigger`].
    #[error(transparent)]
    Job(#[from] JobError),
}
