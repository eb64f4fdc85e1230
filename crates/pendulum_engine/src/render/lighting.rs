//! Scene lighting
//!
//! Backend-free light definitions: pure data interpreted by the
//! shading pipeline through the common constant buffer. The demo scene
//! uses three directional lights; point and spot slots exist in the
//! wire format but are unused here.

use crate::foundation::math::{Mat4, Vec3};
use crate::render::constants::GpuLight;

/// Fixed capacity of the light array in the common constants
pub const MAX_LIGHTS: usize = 16;

/// Index of the primary light used for shadow projection
///
/// Fixed policy: the shadow pass always projects along light 0.
pub const PRIMARY_LIGHT: usize = 0;

/// A single light source
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Light {
    /// Direction the light travels (normalized)
    pub direction: Vec3,
    /// Radiant strength
    pub strength: Vec3,
}

impl Light {
    /// Create a directional light
    pub fn directional(direction: Vec3, strength: Vec3) -> Self {
        Self { direction, strength }
    }

    /// Convert to the constant-buffer layout
    pub fn to_gpu(&self) -> GpuLight {
        GpuLight {
            strength: self.strength.into(),
            direction: self.direction.into(),
            ..GpuLight::default()
        }
    }
}

/// Ambient term plus the active light list
#[derive(Debug, Clone, PartialEq)]
pub struct SceneLighting {
    /// Ambient light contribution
    pub ambient: [f32; 4],
    /// Active lights, at most [`MAX_LIGHTS`]
    pub lights: Vec<Light>,
}

impl SceneLighting {
    /// The three-directional-light setup of the pendulum scene
    pub fn pendulum_demo() -> Self {
        Self {
            ambient: [0.25, 0.25, 0.25, 1.0],
            lights: vec![
                Light::directional(
                    Vec3::new(0.57735, -0.70735, 0.57735),
                    Vec3::new(0.8, 0.8, 0.8),
                ),
                Light::directional(
                    Vec3::new(-0.57735, -0.57735, 0.57735),
                    Vec3::new(0.3, 0.3, 0.3),
                ),
                Light::directional(
                    Vec3::new(0.0, -0.707, -0.707),
                    Vec3::new(0.15, 0.15, 0.15),
                ),
            ],
        }
    }

    /// Fill a constant-buffer light array from the active lights
    pub fn to_gpu(&self) -> [GpuLight; MAX_LIGHTS] {
        debug_assert!(self.lights.len() <= MAX_LIGHTS);

        let mut slots = [GpuLight::default(); MAX_LIGHTS];
        for (slot, light) in slots.iter_mut().zip(&self.lights) {
            *slot = light.to_gpu();
        }
        slots
    }

    /// Light array with every direction reflected by `reflection`
    ///
    /// Used for the mirror pass: the reflected world must be lit from
    /// the mirrored directions or shading inside the mirror looks
    /// inverted.
    pub fn to_gpu_reflected(&self, reflection: &Mat4) -> [GpuLight; MAX_LIGHTS] {
        let mut slots = self.to_gpu();
        for (slot, light) in slots.iter_mut().zip(&self.lights) {
            let reflected = reflection.transform_vector(&light.direction);
            slot.direction = reflected.into();
        }
        slots
    }

    /// Direction of the shadow-casting primary light
    pub fn primary_direction(&self) -> Vec3 {
        self.lights[PRIMARY_LIGHT].direction
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::transforms::reflection_matrix;
    use crate::foundation::math::Vec4;
    use approx::assert_relative_eq;

    #[test]
    fn test_demo_lighting_has_three_lights() {
        let lighting = SceneLighting::pendulum_demo();
        assert_eq!(lighting.lights.len(), 3);
        assert_eq!(lighting.ambient, [0.25, 0.25, 0.25, 1.0]);
    }

    #[test]
    fn test_gpu_array_zeroes_unused_slots() {
        let lighting = SceneLighting::pendulum_demo();
        let slots = lighting.to_gpu();

        assert_eq!(slots[0].strength, [0.8, 0.8, 0.8]);
        for slot in &slots[3..] {
            assert_eq!(slot.strength, [0.0, 0.0, 0.0]);
        }
    }

    #[test]
    fn test_reflected_lights_flip_across_mirror_plane() {
        let lighting = SceneLighting::pendulum_demo();
        let mirror = reflection_matrix(Vec4::new(0.0, 0.0, 1.0, 0.0));
        let slots = lighting.to_gpu_reflected(&mirror);

        // The xy-plane mirror negates z and keeps x, y.
        let original = lighting.lights[0].direction;
        assert_relative_eq!(slots[0].direction[0], original.x, epsilon = 1e-6);
        assert_relative_eq!(slots[0].direction[1], original.y, epsilon = 1e-6);
        assert_relative_eq!(slots[0].direction[2], -original.z, epsilon = 1e-6);

        // Strengths are untouched.
        assert_eq!(slots[0].strength, [0.8, 0.8, 0.8]);
    }
}
