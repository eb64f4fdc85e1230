//! Material system for rendering
//!
//! Materials are shared by several render items through slotmap keys.
//! Each material owns a fixed constant-buffer index and a dirty-frame
//! countdown: after any mutation the countdown is reset to the frame
//! ring depth so the new constants reach every buffered frame slot
//! before the material goes idle again.

use slotmap::{new_key_type, SlotMap};

use crate::foundation::math::Mat4;
use crate::render::constants::{shader_matrix, MaterialConstants};

new_key_type! {
    /// Stable handle to a material in the [`MaterialRegistry`]
    pub struct MaterialKey;
}

/// Material properties for the shading pipeline
#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    /// Debug name
    pub name: String,

    /// Diffuse albedo with alpha
    pub diffuse_albedo: [f32; 4],

    /// Fresnel reflectance at normal incidence
    pub fresnel_r0: [f32; 3],

    /// Roughness factor (0.0 = mirror, 1.0 = completely rough)
    pub roughness: f32,

    /// Texture-coordinate transform
    pub mat_transform: Mat4,

    /// Index of the diffuse texture in the descriptor table
    pub texture_index: u32,

    /// Index of this material's constants inside each frame slot
    pub buffer_index: u32,

    /// Frames still needing a constants re-upload
    pub frames_dirty: usize,
}

impl Material {
    /// Create a material with neutral defaults
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            diffuse_albedo: [1.0, 1.0, 1.0, 1.0],
            fresnel_r0: [0.01, 0.01, 0.01],
            roughness: 0.25,
            mat_transform: Mat4::identity(),
            texture_index: 0,
            buffer_index: 0,
            frames_dirty: 0,
        }
    }

    /// Set the diffuse albedo
    pub fn with_albedo(mut self, r: f32, g: f32, b: f32, a: f32) -> Self {
        self.diffuse_albedo = [r, g, b, a];
        self
    }

    /// Set the Fresnel reflectance
    pub fn with_fresnel(mut self, r0: f32) -> Self {
        self.fresnel_r0 = [r0, r0, r0];
        self
    }

    /// Set the roughness factor
    pub fn with_roughness(mut self, roughness: f32) -> Self {
        self.roughness = roughness.clamp(0.0, 1.0);
        self
    }

    /// Set the diffuse texture descriptor index
    pub fn with_texture(mut self, texture_index: u32) -> Self {
        self.texture_index = texture_index;
        self
    }

    /// Constants record in shader layout
    pub fn to_constants(&self) -> MaterialConstants {
        MaterialConstants {
            diffuse_albedo: self.diffuse_albedo,
            fresnel_r0: self.fresnel_r0,
            roughness: self.roughness,
            mat_transform: shader_matrix(&self.mat_transform),
        }
    }
}

/// Owning storage for all materials, static after setup
#[derive(Debug, Default)]
pub struct MaterialRegistry {
    materials: SlotMap<MaterialKey, Material>,
    ring_depth: usize,
}

impl MaterialRegistry {
    /// Create a registry for a frame ring of the given depth
    pub fn new(ring_depth: usize) -> Self {
        Self {
            materials: SlotMap::with_key(),
            ring_depth,
        }
    }

    /// Insert a material, assigning its constant-buffer index
    ///
    /// The new material starts fully dirty so its constants reach
    /// every frame slot.
    pub fn insert(&mut self, mut material: Material) -> MaterialKey {
        material.buffer_index = self.materials.len() as u32;
        material.frames_dirty = self.ring_depth;
        log::debug!(
            "registering material '{}' at buffer index {}",
            material.name,
            material.buffer_index
        );
        self.materials.insert(material)
    }

    /// Borrow a material
    pub fn get(&self, key: MaterialKey) -> Option<&Material> {
        self.materials.get(key)
    }

    /// Mutably borrow a material, restarting its dirty countdown
    pub fn get_mut(&mut self, key: MaterialKey) -> Option<&mut Material> {
        let ring_depth = self.ring_depth;
        self.materials.get_mut(key).map(|material| {
            material.frames_dirty = ring_depth;
            material
        })
    }

    /// Iterate over materials with pending constant uploads, handing
    /// each to `upload` and decrementing its countdown
    pub fn flush_dirty(&mut self, mut upload: impl FnMut(u32, MaterialConstants)) {
        for material in self.materials.values_mut() {
            if material.frames_dirty > 0 {
                upload(material.buffer_index, material.to_constants());
                material.frames_dirty -= 1;
            }
        }
    }

    /// Number of live materials; sizes the per-slot material buffer
    pub fn len(&self) -> usize {
        self.materials.len()
    }

    /// Whether the registry is empty
    pub fn is_empty(&self) -> bool {
        self.materials.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_assigns_sequential_buffer_indices() {
        let mut registry = MaterialRegistry::new(3);
        let a = registry.insert(Material::new("a"));
        let b = registry.insert(Material::new("b"));

        assert_eq!(registry.get(a).unwrap().buffer_index, 0);
        assert_eq!(registry.get(b).unwrap().buffer_index, 1);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_new_material_is_dirty_for_full_ring() {
        let mut registry = MaterialRegistry::new(3);
        let key = registry.insert(Material::new("a"));
        assert_eq!(registry.get(key).unwrap().frames_dirty, 3);
    }

    #[test]
    fn test_flush_dirty_uploads_ring_depth_times_then_stops() {
        let mut registry = MaterialRegistry::new(3);
        registry.insert(Material::new("a"));

        let mut uploads = 0;
        for _ in 0..5 {
            registry.flush_dirty(|_, _| uploads += 1);
        }
        assert_eq!(uploads, 3);
    }

    #[test]
    fn test_mutation_restarts_countdown() {
        let mut registry = MaterialRegistry::new(3);
        let key = registry.insert(Material::new("a"));

        for _ in 0..3 {
            registry.flush_dirty(|_, _| {});
        }

        registry.get_mut(key).unwrap().roughness = 0.9;

        let mut uploaded = Vec::new();
        registry.flush_dirty(|index, constants| uploaded.push((index, constants.roughness)));
        assert_eq!(uploaded, vec![(0, 0.9)]);
    }

    #[test]
    fn test_constants_carry_material_fields() {
        let material = Material::new("mirror")
            .with_albedo(1.0, 1.0, 1.0, 0.3)
            .with_fresnel(0.1)
            .with_roughness(0.5);
        let constants = material.to_constants();

        assert_eq!(constants.diffuse_albedo[3], 0.3);
        assert_eq!(constants.fresnel_r0, [0.1, 0.1, 0.1]);
        assert_eq!(constants.roughness, 0.5);
    }
}
