//! Derived world transforms: pendulum rig, mirror reflection, planar shadow
//!
//! For each moving body the scene needs three world matrices: the
//! primary transform, a mirror-image variant reflected about the
//! mirror plane, and a shadow variant projected onto the floor along
//! the primary light. All matrices use the column-vector convention,
//! so variants pre-multiply the primary world matrix.
//!
//! Every matrix here is recomputed each tick whether or not the angle
//! changed; at this scale recomputation is cheaper than tracking
//! change state.

use crate::foundation::math::{Mat4, Vec3, Vec4};
use crate::physics::Pendulum;

/// Fixed lift of shadow geometry along the floor normal
///
/// Prevents z-fighting between the projected shadow and the coplanar
/// floor. Policy constant, not configurable per call.
pub const SHADOW_LIFT: f32 = 0.001;

/// Reflection matrix about the plane `n·x + d = 0`
///
/// `plane` holds `(n, d)`; the normal need not be unit length. The
/// result is an involution: applying it twice restores the input.
pub fn reflection_matrix(plane: Vec4) -> Mat4 {
    let n = Vec3::new(plane.x, plane.y, plane.z).normalize();
    let d = plane.w / Vec3::new(plane.x, plane.y, plane.z).magnitude();

    let mut m = Mat4::identity();
    for row in 0..3 {
        for col in 0..3 {
            m[(row, col)] -= 2.0 * n[row] * n[col];
        }
        m[(row, 3)] = -2.0 * d * n[row];
    }
    m
}

/// Planar projection matrix flattening geometry onto `n·x + d = 0`
/// along the direction toward the light
///
/// `to_light` points from the surface toward the light (the negated
/// travel direction of a directional light). The light must not be
/// parallel to the plane.
pub fn shadow_matrix(plane: Vec4, to_light: Vec3) -> Mat4 {
    let n = Vec3::new(plane.x, plane.y, plane.z);
    let d = plane.w;
    let dot = n.dot(&to_light);
    debug_assert!(dot.abs() > 1e-6, "light direction parallel to shadow plane");

    let mut m = Mat4::zeros();
    for row in 0..3 {
        for col in 0..3 {
            m[(row, col)] = -to_light[row] * n[col];
        }
        m[(row, row)] += dot;
        m[(row, 3)] = -d * to_light[row];
    }
    m[(3, 3)] = dot;
    m
}

/// Static geometry of the mirror/floor environment
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MirrorEnvironment {
    /// Mirror plane `(n, d)`; the demo mirror lies on the xy-plane
    pub mirror_plane: Vec4,
    /// Floor plane `(n, d)`; the demo floor is the xz-plane
    pub floor_plane: Vec4,
}

impl Default for MirrorEnvironment {
    fn default() -> Self {
        Self {
            mirror_plane: Vec4::new(0.0, 0.0, 1.0, 0.0),
            floor_plane: Vec4::new(0.0, 1.0, 0.0, 0.0),
        }
    }
}

/// Primary, mirror-reflected, and shadow-projected world matrices
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DerivedTransforms {
    /// World matrix of the object itself
    pub primary: Mat4,
    /// World matrix of its mirror image
    pub reflected: Mat4,
    /// World matrix of its floor shadow
    pub shadow: Mat4,
}

/// World matrices of both moving pendulum bodies for one tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PendulumTransforms {
    /// Wire (cylinder) transforms
    pub wire: DerivedTransforms,
    /// Ball (sphere) transforms
    pub ball: DerivedTransforms,
}

/// Geometric constants of the swinging assembly
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PendulumRig {
    /// Ball radius; the ball center hangs at wire length + radius
    pub ball_radius: f32,
}

impl Default for PendulumRig {
    fn default() -> Self {
        Self { ball_radius: 0.1 }
    }
}

impl PendulumRig {
    /// World matrix of the wire: rotated about the pivot z-axis by θ,
    /// midpoint tracing a circle of radius L/2 about the anchor
    pub fn wire_world(&self, pendulum: &Pendulum) -> Mat4 {
        self.swing_world(pendulum, pendulum.wire_length() / 2.0)
    }

    /// World matrix of the ball at radius L + ball radius
    pub fn ball_world(&self, pendulum: &Pendulum) -> Mat4 {
        self.swing_world(pendulum, pendulum.wire_length() + self.ball_radius)
    }

    fn swing_world(&self, pendulum: &Pendulum, radius: f32) -> Mat4 {
        let theta = pendulum.theta();
        let center = pendulum.anchor()
            + Vec3::new(radius * theta.sin(), -radius * theta.cos(), 0.0);

        Mat4::new_translation(&center) * Mat4::new_rotation(Vec3::z() * theta)
    }
}

/// Recompute all six derived world matrices for one tick
///
/// `to_light` points toward the primary light. The shadow variants are
/// lifted by [`SHADOW_LIFT`] along the floor normal.
pub fn derive_pendulum_transforms(
    pendulum: &Pendulum,
    rig: &PendulumRig,
    environment: &MirrorEnvironment,
    to_light: Vec3,
) -> PendulumTransforms {
    let reflect = reflection_matrix(environment.mirror_plane);
    let shadow = shadow_matrix(environment.floor_plane, to_light);

    let floor_normal =
        Vec3::new(environment.floor_plane.x, environment.floor_plane.y, environment.floor_plane.z)
            .normalize();
    let lift = Mat4::new_translation(&(floor_normal * SHADOW_LIFT));

    let derive = |world: Mat4| DerivedTransforms {
        primary: world,
        reflected: reflect * world,
        shadow: lift * shadow * world,
    };

    PendulumTransforms {
        wire: derive(rig.wire_world(pendulum)),
        ball: derive(rig.ball_world(pendulum)),
    }
}
