//! Foundation utilities shared across the engine
//!
//! Math type aliases and frame timing. These modules have no rendering
//! dependencies and are usable from any layer.

pub mod math;
pub mod time;
