//! Math utilities and types
//!
//! Provides fundamental math types for 3D graphics, plus the left-handed
//! view and projection constructors the shading pipeline expects.
//!
//! All matrices follow nalgebra's column-vector convention: transforms
//! compose right-to-left (`T * R` rotates first, then translates).

pub use nalgebra::{Matrix3, Matrix4, Unit, Vector2, Vector3, Vector4};

/// 2D vector type
pub type Vec2 = Vector2<f32>;

/// 3D vector type
pub type Vec3 = Vector3<f32>;

/// 4D vector type
pub type Vec4 = Vector4<f32>;

/// 3x3 matrix type
pub type Mat3 = Matrix3<f32>;

/// 4x4 matrix type
pub type Mat4 = Matrix4<f32>;

/// 3D point type
pub type Point3 = nalgebra::Point3<f32>;

/// Math constants
pub mod constants {
    /// Archimedes' constant
    pub const PI: f32 = std::f32::consts::PI;
}

/// Left-handed look-at view matrix.
///
/// The camera sits at `eye` looking toward `target` with `up` defining
/// the vertical. Left-handed to match the shading pipeline's clip-space
/// conventions.
pub fn look_at_lh(eye: Vec3, target: Vec3, up: Vec3) -> Mat4 {
    Mat4::look_at_lh(&Point3::from(eye), &Point3::from(target), &up)
}

/// Left-handed perspective projection with a vertical field of view.
///
/// Maps the view-space z range `[near, far]` onto clip-space `[0, 1]`
/// with +z forward.
pub fn perspective_fov_lh(fov_y: f32, aspect: f32, near: f32, far: f32) -> Mat4 {
    debug_assert!(fov_y > 0.0 && aspect > 0.0 && far > near && near > 0.0);

    let h = 1.0 / (0.5 * fov_y).tan();
    let w = h / aspect;
    let range = far / (far - near);

    Mat4::new(
        w, 0.0, 0.0, 0.0,
        0.0, h, 0.0, 0.0,
        0.0, 0.0, range, -range * near,
        0.0, 0.0, 1.0, 0.0,
    )
}

/// Clamp a value to the inclusive range `[low, high]`.
pub fn clamp(value: f32, low: f32, high: f32) -> f32 {
    debug_assert!(low <= high);
    value.max(low).min(high)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const EPSILON: f32 = 1e-5;

    #[test]
    fn test_look_at_lh_places_eye_at_origin() {
        let eye = Vec3::new(0.0, 0.0, -10.0);
        let view = look_at_lh(eye, Vec3::zeros(), Vec3::y());

        let eye_view = view.transform_point(&Point3::from(eye));
        assert_relative_eq!(eye_view.coords, Vec3::zeros(), epsilon = EPSILON);

        // Target lies straight ahead on +z in view space (left-handed).
        let target_view = view.transform_point(&Point3::origin());
        assert!(target_view.z > 0.0);
    }

    #[test]
    fn test_perspective_lh_depth_range() {
        let proj = perspective_fov_lh(constants::PI / 4.0, 1.5, 1.0, 1000.0);

        // A point on the near plane projects to depth 0, far plane to 1.
        let near_clip = proj * Vec4::new(0.0, 0.0, 1.0, 1.0);
        assert_relative_eq!(near_clip.z / near_clip.w, 0.0, epsilon = EPSILON);

        let far_clip = proj * Vec4::new(0.0, 0.0, 1000.0, 1.0);
        assert_relative_eq!(far_clip.z / far_clip.w, 1.0, epsilon = EPSILON);
    }

    #[test]
    fn test_clamp() {
        assert_eq!(clamp(5.0, 0.0, 1.0), 1.0);
        assert_eq!(clamp(-5.0, 0.0, 1.0), 0.0);
        assert_eq!(clamp(0.5, 0.0, 1.0), 0.5);
    }
}
