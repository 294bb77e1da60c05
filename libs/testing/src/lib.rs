//! # steward-testing
//!
//! A small in-memory host: a designation registry, a map of animals and
//! plants with stockpiles, and a [`FakeWorld`] tying them together with a
//! crude "colonists do the work" step.
//!
//! Used by unit and end-to-end tests, and by the `steward-sim` binary.

mod map;
mod registry;
mod world;

pub use map::{FakeMap, Rect};
pub use registry::FakeRegistry;
pub use world::FakeWorld;
