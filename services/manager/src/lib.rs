//! steward Job Manager
//!
//! Keeps configured resource targets met by placing and withdrawing
//! designations in a host simulation.
//!
//! ## Architecture
//!
//! ```text
//! Scheduler                 (priority order, one reconcile per tick)
//! └── Job                   (trigger, history, local designations)
//!     └── JobKind           (hunting, forestry, foraging, livestock)
//!         └── ReconcilePass (kind, target, eligibility, yield, scoring)
//! ```
//!
//! The host drives everything through [`Scheduler::tick`], handing over its
//! registry, map and stock counter in a [`HostContext`]. Decisions are
//! reported through tracing and through [`Scheduler::drain_events`].
//!
//! ## Modules
//!
//! - `config`: scheduler tunables
//! - `job`: jobs, job kinds and their reconciliation passes
//! - `record`: what survives a save and reload
//! - `scheduler`: priority order and the tick loop
//! - `training`: trainable skills and their prerequisites

pub mod config;
pub mod error;
pub mod job;
pub mod record;
pub mod scheduler;
pub mod training;

pub use config::SchedulerConfig;
pub use error::{JobError, SchedulerError, SchedulerResult};
pub use job::{
    AgeSex, ForagingConfig, ForestryConfig, HuntingConfig, Job, JobKind, JobKindTag, JobState,
    JobStatus, LivestockConfig,
};
pub use record::{JobRecord, RECORD_VERSION};
pub use scheduler::{Scheduler, TickSummary};
pub use steward_reconcile::HostContext;
pub use training::{TrainingError, TrainingGraph};
