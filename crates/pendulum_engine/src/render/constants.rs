//! Shader-facing constant-buffer records
//!
//! These structs are the wire format between the CPU and the shading
//! pipeline: `#[repr(C)]`, plain-old-data, and written with matrices
//! transposed relative to the CPU-side column-vector representation.
//! Each record is padded to the platform's minimum constant-buffer
//! alignment so successive buffered elements can be addressed as
//! `base + index * aligned_stride`.

use bytemuck::{Pod, Zeroable};

use crate::foundation::math::Mat4;
use crate::render::lighting::MAX_LIGHTS;

/// Minimum constant-buffer alignment in bytes
pub const CONSTANT_BUFFER_ALIGNMENT: u64 = 256;

/// Round `byte_size` up to the constant-buffer alignment
pub fn align_constant_size(byte_size: u64) -> u64 {
    (byte_size + CONSTANT_BUFFER_ALIGNMENT - 1) & !(CONSTANT_BUFFER_ALIGNMENT - 1)
}

/// Aligned byte stride of one buffered element of `T`
pub fn aligned_stride<T>() -> u64 {
    align_constant_size(std::mem::size_of::<T>() as u64)
}

/// Convert a matrix into the transposed array layout the shaders read
pub fn shader_matrix(m: &Mat4) -> [[f32; 4]; 4] {
    m.transpose().into()
}

/// Identity matrix in shader layout
pub fn shader_identity() -> [[f32; 4]; 4] {
    shader_matrix(&Mat4::identity())
}

/// One light slot in the common constants
///
/// The field order interleaves vectors with scalars so the struct
/// packs into three float4 registers without implicit padding.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct GpuLight {
    /// Radiant strength (color * intensity)
    pub strength: [f32; 3],
    /// Point/spot attenuation start
    pub falloff_start: f32,
    /// Direction the light travels (directional/spot)
    pub direction: [f32; 3],
    /// Point/spot attenuation end
    pub falloff_end: f32,
    /// World-space position (point/spot)
    pub position: [f32; 3],
    /// Spot cone exponent
    pub spot_power: f32,
}

impl Default for GpuLight {
    fn default() -> Self {
        Self::zeroed()
    }
}

/// Per-object constants: world and texture transforms
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct ObjectConstants {
    /// World matrix, transposed for the shader
    pub world: [[f32; 4]; 4],
    /// Texture-coordinate transform, transposed for the shader
    pub tex_transform: [[f32; 4]; 4],
}

impl Default for ObjectConstants {
    fn default() -> Self {
        Self {
            world: shader_identity(),
            tex_transform: shader_identity(),
        }
    }
}

/// Per-material constants
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct MaterialConstants {
    /// Diffuse albedo with alpha
    pub diffuse_albedo: [f32; 4],
    /// Fresnel reflectance at normal incidence
    pub fresnel_r0: [f32; 3],
    /// Surface roughness in [0, 1]
    pub roughness: f32,
    /// Material texture transform, transposed for the shader
    pub mat_transform: [[f32; 4]; 4],
}

impl Default for MaterialConstants {
    fn default() -> Self {
        Self {
            diffuse_albedo: [1.0, 1.0, 1.0, 1.0],
            fresnel_r0: [0.01, 0.01, 0.01],
            roughness: 0.25,
            mat_transform: shader_identity(),
        }
    }
}

/// Frame-wide constants shared by every draw in a pass
///
/// Two live copies exist per frame slot: the primary record at element
/// index 0 and the mirror-reflected record (light directions reflected
/// across the mirror plane) at index 1. They must sit contiguously in
/// the same buffer because the reflected pass binds
/// `base + aligned_stride` rather than a separate resource.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct CommonConstants {
    /// View matrix (transposed)
    pub view: [[f32; 4]; 4],
    /// Inverse view matrix (transposed)
    pub inv_view: [[f32; 4]; 4],
    /// Projection matrix (transposed)
    pub proj: [[f32; 4]; 4],
    /// Inverse projection matrix (transposed)
    pub inv_proj: [[f32; 4]; 4],
    /// View * projection (transposed)
    pub view_proj: [[f32; 4]; 4],
    /// Inverse of view * projection (transposed)
    pub inv_view_proj: [[f32; 4]; 4],
    /// World-space camera position
    pub camera_pos: [f32; 3],
    /// Explicit padding to the next float4 boundary
    pub _pad0: f32,
    /// Render-target size in pixels
    pub render_target_size: [f32; 2],
    /// Reciprocal render-target size
    pub inv_render_target_size: [f32; 2],
    /// Near plane distance
    pub near_z: f32,
    /// Far plane distance
    pub far_z: f32,
    /// Seconds since startup
    pub total_time: f32,
    /// Seconds since the previous frame
    pub delta_time: f32,
    /// Ambient light contribution
    pub ambient_light: [f32; 4],
    /// Fixed-capacity light array; unused slots stay zeroed
    pub lights: [GpuLight; MAX_LIGHTS],
}

impl Default for CommonConstants {
    fn default() -> Self {
        Self {
            view: shader_identity(),
            inv_view: shader_identity(),
            proj: shader_identity(),
            inv_proj: shader_identity(),
            view_proj: shader_identity(),
            inv_view_proj: shader_identity(),
            camera_pos: [0.0; 3],
            _pad0: 0.0,
            render_target_size: [0.0; 2],
            inv_render_target_size: [0.0; 2],
            near_z: 0.0,
            far_z: 0.0,
            total_time: 0.0,
            delta_time: 0.0,
            ambient_light: [0.0, 0.0, 0.0, 1.0],
            lights: [GpuLight::zeroed(); MAX_LIGHTS],
        }
    }
}
