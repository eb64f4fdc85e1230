//! Physics module for the pendulum simulation
//!
//! A single degree of freedom advanced by semi-implicit Euler
//! integration; deliberately not a general physics engine.

pub mod pendulum;

pub use pendulum::{Pendulum, GRAVITY};
