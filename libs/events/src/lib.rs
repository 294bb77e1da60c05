//! # steward-events
//!
//! Events emitted by the steward engine so that the embedding host can show
//! what the automation did (and why) without polling every job.
//!
//! Each event records a decision that has already been applied, stamped
//! with the tick it happened on. Job-scoped events also carry the job ID.
//!
//! The [`EventLog`] is bounded. Once full it drops the oldest entry and
//! bumps a counter, so a host that drains too slowly can see it fell behind.
//!
//! Event type names are dotted: `job.*`, `designation.*` and `trigger.*`.

mod envelope;
mod error;
mod log;
mod types;

pub use envelope::*;
pub use error::EventError;
pub use log::{EventLog, DEFAULT_EVENT_LOG_CAPACITY};
pub use types::*;
