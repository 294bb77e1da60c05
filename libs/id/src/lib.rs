//! # steward-id
//!
//! Typed identifiers shared by every steward crate.
//!
//! ## ID Families
//!
//! - **Engine IDs** (`JobId`) are generated by the engine. They are ULID based
//!   so that jobs created in the same session sort by creation time.
//! - **Host IDs** (`ThingId`, `AreaId`) are assigned by the simulation that
//!   embeds the engine. The engine never invents them; it only carries them.
//!
//! Both families render as `{prefix}_{value}` and parse strictly:
//!
//! - `job_01HV4Z2WQXKJNM8GPQY6VBKC3D`
//! - `thing_4182`
//! - `area_3`
//!
//! `DesignationKind` lives here too, because designations are identified by
//! the pair `(ThingId, DesignationKind)`.

mod error;
#[macro_use]
mod macros;
mod types;

pub use error::IdError;
pub use types::*;

pub use ulid::Ulid;
