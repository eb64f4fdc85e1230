//! Render items and the layered draw registry
//!
//! A render item ties together a submesh range, a material, a world
//! transform, and a fixed index into the per-frame object constant
//! buffer. Items are grouped into five ordered layers whose draw order
//! is a total order fixed at compile time: reflected geometry must be
//! visible through the mirror before the mirror's translucent surface
//! is composited over it, and shadows blend over everything last.

use slotmap::{new_key_type, SlotMap};

use crate::foundation::math::Mat4;
use crate::render::constants::{shader_matrix, ObjectConstants};
use crate::render::geometry::{MeshKey, PrimitiveTopology, Submesh};
use crate::render::material::MaterialKey;

new_key_type! {
    /// Stable handle to a render item in the [`RenderItemRegistry`]
    pub struct ItemKey;
}

/// Draw layers in mandated submission order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RenderLayer {
    /// Fully opaque scene geometry
    Opaque,
    /// Mirror surface, stencil-mark pass with color writes disabled
    Mirror,
    /// Mirror-image geometry, stencil-equal test, inverted winding
    Reflected,
    /// Alpha-blended mirror surface over the reflected contents
    Transparent,
    /// Planar shadows, stencil-increment to prevent double-darkening
    Shadow,
}

impl RenderLayer {
    /// All layers in draw order
    pub const ORDERED: [RenderLayer; 5] = [
        RenderLayer::Opaque,
        RenderLayer::Mirror,
        RenderLayer::Reflected,
        RenderLayer::Transparent,
        RenderLayer::Shadow,
    ];

    fn index(self) -> usize {
        match self {
            RenderLayer::Opaque => 0,
            RenderLayer::Mirror => 1,
            RenderLayer::Reflected => 2,
            RenderLayer::Transparent => 3,
            RenderLayer::Shadow => 4,
        }
    }
}

/// One drawable item
#[derive(Debug, Clone)]
pub struct RenderItem {
    /// World transform
    pub world: Mat4,
    /// Texture-coordinate transform
    pub tex_transform: Mat4,
    /// Index into the per-frame object constant buffer
    pub object_index: u32,
    /// Frames still needing an object-constants re-upload
    pub frames_dirty: usize,
    /// Geometry holding this item's submesh
    pub mesh: MeshKey,
    /// Material reference
    pub material: MaterialKey,
    /// Primitive topology
    pub topology: PrimitiveTopology,
    /// Draw range inside the shared buffers
    pub submesh: Submesh,
}

impl RenderItem {
    /// Create an item with identity transforms
    pub fn new(mesh: MeshKey, submesh: Submesh, material: MaterialKey) -> Self {
        Self {
            world: Mat4::identity(),
            tex_transform: Mat4::identity(),
            object_index: 0,
            frames_dirty: 0,
            mesh,
            material,
            topology: PrimitiveTopology::TriangleList,
            submesh,
        }
    }

    /// Set the world transform at setup time
    pub fn with_world(mut self, world: Mat4) -> Self {
        self.world = world;
        self
    }

    /// Object constants record in shader layout
    pub fn to_constants(&self) -> ObjectConstants {
        ObjectConstants {
            world: shader_matrix(&self.world),
            tex_transform: shader_matrix(&self.tex_transform),
        }
    }
}

/// Static catalog of drawable items grouped into ordered layers
///
/// Items are inserted during setup and never removed; the object
/// constant-buffer size of every frame slot is derived from the final
/// item count. An item may appear in more than one layer (the mirror
/// is drawn in the stencil-mark pass and again alpha-blended).
#[derive(Debug)]
pub struct RenderItemRegistry {
    items: SlotMap<ItemKey, RenderItem>,
    layers: [Vec<ItemKey>; 5],
    ring_depth: usize,
}

impl RenderItemRegistry {
    /// Create a registry for a frame ring of the given depth
    pub fn new(ring_depth: usize) -> Self {
        Self {
            items: SlotMap::with_key(),
            layers: Default::default(),
            ring_depth,
        }
    }

    /// Insert an item into the given layers
    ///
    /// Assigns the next dense object-buffer index and starts the item
    /// fully dirty so its constants reach every frame slot.
    pub fn insert(&mut self, mut item: RenderItem, layers: &[RenderLayer]) -> ItemKey {
        debug_assert!(!layers.is_empty());

        item.object_index = self.items.len() as u32;
        item.frames_dirty = self.ring_depth;

        let key = self.items.insert(item);
        for layer in layers {
            self.layers[layer.index()].push(key);
        }
        key
    }

    /// Borrow an item
    pub fn get(&self, key: ItemKey) -> Option<&RenderItem> {
        self.items.get(key)
    }

    /// Overwrite an item's world matrix, restarting its dirty countdown
    pub fn set_world(&mut self, key: ItemKey, world: Mat4) {
        let ring_depth = self.ring_depth;
        if let Some(item) = self.items.get_mut(key) {
            item.world = world;
            item.frames_dirty = ring_depth;
        }
    }

    /// Iterate over items with pending constant uploads, handing each
    /// to `upload` and decrementing its countdown
    pub fn flush_dirty(&mut self, mut upload: impl FnMut(u32, ObjectConstants)) {
        for item in self.items.values_mut() {
            if item.frames_dirty > 0 {
                upload(item.object_index, item.to_constants());
                item.frames_dirty -= 1;
            }
        }
    }

    /// Items of one layer, in insertion order
    pub fn layer(&self, layer: RenderLayer) -> impl Iterator<Item = &RenderItem> {
        self.layers[layer.index()].iter().map(|&key| &self.items[key])
    }

    /// Number of live items; sizes the per-slot object buffer
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the registry is empty
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::geometry::{GeometryStore, MeshGeometry};
    use crate::render::material::{Material, MaterialRegistry};
    use std::collections::HashMap;

    fn test_keys() -> (MeshKey, MaterialKey) {
        let mut geometry = GeometryStore::new();
        let mesh = geometry.insert(MeshGeometry {
            name: "test".into(),
            vertices: Vec::new(),
            indices: Vec::new(),
            submeshes: HashMap::new(),
        });
        let mut materials = MaterialRegistry::new(3);
        let material = materials.insert(Material::new("test"));
        (mesh, material)
    }

    #[test]
    fn test_insert_assigns_dense_object_indices() {
        let (mesh, material) = test_keys();
        let mut registry = RenderItemRegistry::new(3);

        let a = registry.insert(
            RenderItem::new(mesh, Submesh::default(), material),
            &[RenderLayer::Opaque],
        );
        let b = registry.insert(
            RenderItem::new(mesh, Submesh::default(), material),
            &[RenderLayer::Shadow],
        );

        assert_eq!(registry.get(a).unwrap().object_index, 0);
        assert_eq!(registry.get(b).unwrap().object_index, 1);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_item_can_join_multiple_layers() {
        let (mesh, material) = test_keys();
        let mut registry = RenderItemRegistry::new(3);

        registry.insert(
            RenderItem::new(mesh, Submesh::default(), material),
            &[RenderLayer::Mirror, RenderLayer::Transparent],
        );

        assert_eq!(registry.layer(RenderLayer::Mirror).count(), 1);
        assert_eq!(registry.layer(RenderLayer::Transparent).count(), 1);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_set_world_restarts_countdown() {
        let (mesh, material) = test_keys();
        let mut registry = RenderItemRegistry::new(3);
        let key = registry.insert(
            RenderItem::new(mesh, Submesh::default(), material),
            &[RenderLayer::Opaque],
        );

        for _ in 0..3 {
            registry.flush_dirty(|_, _| {});
        }

        let mut uploads = 0;
        registry.flush_dirty(|_, _| uploads += 1);
        assert_eq!(uploads, 0);

        registry.set_world(key, Mat4::new_translation(&crate::foundation::math::Vec3::x()));
        for _ in 0..5 {
            registry.flush_dirty(|_, _| uploads += 1);
        }
        assert_eq!(uploads, 3);
    }

    #[test]
    fn test_layer_order_is_total() {
        assert_eq!(
            RenderLayer::ORDERED,
            [
                RenderLayer::Opaque,
                RenderLayer::Mirror,
                RenderLayer::Reflected,
                RenderLayer::Transparent,
                RenderLayer::Shadow,
            ]
        );
    }
}
