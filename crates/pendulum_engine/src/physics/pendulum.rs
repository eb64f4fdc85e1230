//! Single-pendulum equation of motion
//!
//! The newtonian differential equation is sampled into a difference
//! equation and advanced once per frame. The angular velocity update
//! runs before the angle update within the same step (semi-implicit
//! Euler); swapping the order changes the numerical behavior.

use crate::foundation::math::Vec3;

/// Gravitational acceleration constant in m/s^2
pub const GRAVITY: f32 = 9.8;

/// Simple pendulum state advanced by semi-implicit Euler integration
///
/// Owns the angle and angular velocity exclusively; both are mutated
/// once per frame tick by [`step`](Self::step) and reset together by
/// [`reset_to`](Self::reset_to). The angle is unbounded and may wind
/// beyond ±π; the trigonometric functions handle wraparound.
#[derive(Debug, Clone, PartialEq)]
pub struct Pendulum {
    /// Angular position in radians, measured from the rest direction
    theta: f32,

    /// Angular velocity in rad/s
    omega: f32,

    /// Wire length in meters
    wire_length: f32,

    /// World-space anchor the wire hangs from
    anchor: Vec3,

    /// Gravitational acceleration in m/s^2
    gravity: f32,
}

impl Pendulum {
    /// Create a pendulum at rest at the given angle
    pub fn new(anchor: Vec3, wire_length: f32, initial_angle: f32) -> Self {
        debug_assert!(wire_length > 0.0);
        Self {
            theta: initial_angle,
            omega: 0.0,
            wire_length,
            anchor,
            gravity: GRAVITY,
        }
    }

    /// Override the gravitational constant (defaults to [`GRAVITY`])
    pub fn with_gravity(mut self, gravity: f32) -> Self {
        self.gravity = gravity;
        self
    }

    /// Advance the equation of motion by `dt` seconds
    ///
    /// ω ← ω − dt·(g/L)·sin(θ), then θ ← θ + dt·ω. The caller
    /// guarantees `dt` is non-negative (it comes from a monotonic
    /// frame timer). Deterministic: the same state and `dt` sequence
    /// always produces bit-identical results.
    pub fn step(&mut self, dt: f32) {
        debug_assert!(dt >= 0.0);

        self.omega -= dt * (self.gravity / self.wire_length) * self.theta.sin();
        self.theta += dt * self.omega;
    }

    /// Reset to a new release angle with zero angular velocity
    ///
    /// Both fields change together; no `step` ever observes a new
    /// angle paired with a stale velocity.
    pub fn reset_to(&mut self, angle: f32) {
        self.theta = angle;
        self.omega = 0.0;
    }

    /// Current angular position in radians
    pub fn theta(&self) -> f32 {
        self.theta
    }

    /// Current angular velocity in rad/s
    pub fn omega(&self) -> f32 {
        self.omega
    }

    /// Wire length in meters
    pub fn wire_length(&self) -> f32 {
        self.wire_length
    }

    /// World-space anchor position
    pub fn anchor(&self) -> Vec3 {
        self.anchor
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn test_pendulum(angle: f32) -> Pendulum {
        Pendulum::new(Vec3::new(0.0, 6.0, -5.0), 3.0, angle)
    }

    #[test]
    fn test_reset_then_step_matches_closed_form() {
        let mut pendulum = test_pendulum(0.0);
        pendulum.reset_to(0.3);

        let dt = 1.0 / 60.0;
        pendulum.step(dt);

        let expected_omega = -dt * (GRAVITY / 3.0) * 0.3f32.sin();
        let expected_theta = 0.3 + dt * expected_omega;

        assert_eq!(pendulum.omega(), expected_omega);
        assert_eq!(pendulum.theta(), expected_theta);
    }

    #[test]
    fn test_step_is_deterministic() {
        let mut a = test_pendulum(0.7);
        let mut b = test_pendulum(0.7);

        for i in 0..1000 {
            let dt = if i % 3 == 0 { 1.0 / 60.0 } else { 1.0 / 144.0 };
            a.step(dt);
            b.step(dt);
        }

        // Bit-identical, not merely close.
        assert_eq!(a.theta().to_bits(), b.theta().to_bits());
        assert_eq!(a.omega().to_bits(), b.omega().to_bits());
    }

    #[test]
    fn test_zero_dt_is_a_no_op() {
        let mut pendulum = test_pendulum(0.5);
        pendulum.step(1.0 / 60.0);
        let (theta, omega) = (pendulum.theta(), pendulum.omega());

        pendulum.step(0.0);
        assert_eq!(pendulum.theta(), theta);
        assert_eq!(pendulum.omega(), omega);
    }

    #[test]
    fn test_angle_winds_without_bounds() {
        // A fast-spinning pendulum keeps accumulating angle past 2π.
        let mut pendulum = test_pendulum(0.0);
        pendulum.omega = 50.0;
        for _ in 0..120 {
            pendulum.step(1.0 / 60.0);
        }
        assert!(pendulum.theta() > 2.0 * std::f32::consts::PI);
    }

    #[test]
    fn test_sixty_steps_match_reference_trajectory() {
        // Reference computed independently in f64.
        let mut theta64: f64 = 0.3;
        let mut omega64: f64 = 0.0;
        let dt64 = 1.0_f64 / 60.0;
        for _ in 0..60 {
            omega64 -= dt64 * (9.8 / 3.0) * theta64.sin();
            theta64 += dt64 * omega64;
        }

        let mut pendulum = test_pendulum(0.3);
        let dt = 1.0 / 60.0;
        for _ in 0..60 {
            pendulum.step(dt);
        }

        assert_relative_eq!(pendulum.theta(), theta64 as f32, epsilon = 1e-4);
        assert_relative_eq!(pendulum.omega(), omega64 as f32, epsilon = 1e-4);
    }
}
