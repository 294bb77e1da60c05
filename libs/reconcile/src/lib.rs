//! Reconciliation primitives for resource-management jobs.
//!
//! A job keeps a target quantity of some resource by placing designations
//! (work orders) on world entities. This library holds the parts every job
//! type shares:
//!
//! - [`ThresholdTrigger`]: is the target currently unmet?
//! - [`LocalDesignations`]: what the job believes it owns.
//! - [`reconcile`]: bring that belief in line with the host registry and
//!   close the gap between stock and target.
//! - [`TimedValue`]: reuse expensive counts for a few ticks.
//!
//! # Invariants
//!
//! - After [`reconcile`] returns, every local designation is in the registry
//! - A second call with no external change mutates nothing
//! - Surplus withdrawal never re-opens a deficit, so issue and withdraw
//!   cannot alternate
//!
//! The host's world, stock and registry are reached only through the traits
//! in [`host`].

mod algorithm;
mod cache;
mod designations;
pub mod host;
mod trigger;

pub use algorithm::{assess, reconcile, PassBalance, ReconcileOutcome, ReconcilePass, Scoring};
pub use cache::TimedValue;
pub use designations::LocalDesignations;
pub use host::{
    AnimalTraits, Designation, DesignationRegistry, HostContext, PlantTraits, Position, Sex,
    StockCounter, Thing, ThingTraits, WorldMap,
};
pub use trigger::{
    CountScope, StockFilter, ThresholdTrigger, Transition, TriggerError, DEFAULT_MAX_UPPER,
};

/// Simulation time in ticks.
pub type Tick = u64;
