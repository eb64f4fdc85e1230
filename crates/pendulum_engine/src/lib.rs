//! # Pendulum Engine
//!
//! A small rendering engine that animates a swinging pendulum in a
//! mirrored room: the mirror shows a stencil-clipped reflection and
//! the floor carries a planar projected shadow.
//!
//! ## Architecture
//!
//! - **Physics**: semi-implicit Euler integration of a single
//!   pendulum angle
//! - **Transforms**: primary, mirror-reflected, and shadow-projected
//!   world matrices derived from that angle each tick
//! - **Frame ring**: per-frame GPU resources reused round-robin under
//!   fence synchronization, so the CPU records ahead of the GPU
//! - **Composer**: the fixed per-frame sequence from simulation step
//!   to submitted command list
//!
//! The render core is backend-free: it records inspectable command
//! lists through narrow device traits, which keeps the whole frame
//! loop testable without a GPU.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use pendulum_engine::prelude::*;
//!
//! fn main() -> Result<(), RenderError> {
//!     let mut device = HeadlessDevice::new();
//!     let fence = Arc::new(HeadlessFence::new());
//!     let mut queue = HeadlessQueue::new(Arc::clone(&fence));
//!     let reset = Arc::new(AngleReset::new());
//!
//!     let mut composer = FrameComposer::new(
//!         &mut device,
//!         3,
//!         Pendulum::new(Vec3::new(0.0, 6.0, -5.0), 3.0, 0.3),
//!         OrbitCamera::pendulum_demo(800.0 / 600.0),
//!         (800.0, 600.0),
//!         Arc::clone(&reset),
//!     )?;
//!
//!     composer.compose_frame(&mut queue, fence.as_ref(), 1.0 / 60.0, 0.0)?;
//!     composer.flush(fence.as_ref())
//! }
//! ```

pub mod config;
pub mod foundation;
pub mod input;
pub mod physics;
pub mod render;

/// Common imports for engine users
pub mod prelude {
    pub use crate::{
        config::{Config, ConfigError, SimulationConfig},
        foundation::{
            math::{Mat4, Vec3, Vec4},
            time::Timer,
        },
        input::{AngleReset, CameraMotion, MouseButton, MouseTracker},
        physics::Pendulum,
        render::{
            FrameComposer, HeadlessDevice, HeadlessFence, HeadlessQueue, OrbitCamera,
            RenderError, RenderResult,
        },
    };
}
