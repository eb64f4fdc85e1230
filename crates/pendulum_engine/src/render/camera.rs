//! Orbit camera
//!
//! Spherical-coordinate camera circling a fixed look target. Mouse
//! drags adjust yaw/pitch and radius; both are clamped so the camera
//! stays in the front-facing hemisphere and inside a sensible distance
//! band, keeping the mirror visible.

use crate::foundation::math::{self, constants::PI, look_at_lh, perspective_fov_lh, Mat4, Vec3};

/// Limits applied to the orbit parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrbitLimits {
    /// Inclusive yaw (theta) range in radians
    pub theta: (f32, f32),
    /// Inclusive pitch (phi) range in radians
    pub phi: (f32, f32),
    /// Inclusive radius range in world units
    pub radius: (f32, f32),
}

impl Default for OrbitLimits {
    fn default() -> Self {
        Self {
            theta: (PI * 7.0 / 6.0, PI * 11.0 / 6.0),
            phi: (PI / 6.0, PI / 2.0 - 0.1),
            radius: (15.0, 50.0),
        }
    }
}

/// Orbit camera with perspective projection
#[derive(Debug, Clone, PartialEq)]
pub struct OrbitCamera {
    theta: f32,
    phi: f32,
    radius: f32,
    target: Vec3,
    limits: OrbitLimits,

    fov_y: f32,
    aspect: f32,
    near: f32,
    far: f32,
}

impl OrbitCamera {
    /// Camera placed as the pendulum demo starts
    pub fn pendulum_demo(aspect: f32) -> Self {
        Self {
            theta: 1.5 * PI,
            phi: 0.4 * PI,
            radius: 20.0,
            target: Vec3::new(1.0, 0.0, 0.0),
            limits: OrbitLimits::default(),
            fov_y: 0.25 * PI,
            aspect,
            near: 1.0,
            far: 1000.0,
        }
    }

    /// Replace the orbit limits
    pub fn with_limits(mut self, limits: OrbitLimits) -> Self {
        self.limits = limits;
        self.clamp_orbit();
        self
    }

    /// Apply yaw/pitch deltas in radians, clamped to the limits
    pub fn orbit(&mut self, yaw: f32, pitch: f32) {
        self.theta += yaw;
        self.phi += pitch;
        self.clamp_orbit();
    }

    /// Apply a radius delta, clamped to the limits
    pub fn zoom(&mut self, delta: f32) {
        self.radius = math::clamp(self.radius + delta, self.limits.radius.0, self.limits.radius.1);
    }

    /// Update the projection aspect ratio after a resize
    pub fn set_aspect_ratio(&mut self, aspect: f32) {
        self.aspect = aspect;
    }

    fn clamp_orbit(&mut self) {
        self.theta = math::clamp(self.theta, self.limits.theta.0, self.limits.theta.1);
        self.phi = math::clamp(self.phi, self.limits.phi.0, self.limits.phi.1);
    }

    /// World-space camera position from the spherical coordinates
    pub fn position(&self) -> Vec3 {
        Vec3::new(
            self.radius * self.phi.sin() * self.theta.cos(),
            self.radius * self.phi.cos(),
            self.radius * self.phi.sin() * self.theta.sin(),
        )
    }

    /// View matrix looking at the fixed target
    pub fn view_matrix(&self) -> Mat4 {
        look_at_lh(self.position(), self.target, Vec3::y())
    }

    /// Perspective projection matrix
    pub fn projection_matrix(&self) -> Mat4 {
        perspective_fov_lh(self.fov_y, self.aspect, self.near, self.far)
    }

    /// Near plane distance
    pub fn near(&self) -> f32 {
        self.near
    }

    /// Far plane distance
    pub fn far(&self) -> f32 {
        self.far
    }

    /// Current orbit radius
    pub fn radius(&self) -> f32 {
        self.radius
    }
}
