//! Mesh geometry and procedural shape generation
//!
//! Several logical shapes share one concatenated vertex/index buffer;
//! named submesh ranges record where each shape lives. Geometry is
//! uploaded once at setup and never mutated, so render items refer to
//! it through stable slotmap keys rather than shared pointers.

use std::collections::HashMap;

use bytemuck::{Pod, Zeroable};
use slotmap::{new_key_type, SlotMap};

use crate::foundation::math::constants::PI;

new_key_type! {
    /// Stable handle to a mesh geometry in the [`GeometryStore`]
    pub struct MeshKey;
}

/// Vertex format fed to the input assembler
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    /// Position in 3D space
    pub position: [f32; 3],
    /// Normal vector
    pub normal: [f32; 3],
    /// Texture coordinates
    pub tex_coord: [f32; 2],
}

impl Vertex {
    /// Create a vertex from raw components
    pub fn new(position: [f32; 3], normal: [f32; 3], tex_coord: [f32; 2]) -> Self {
        Self { position, normal, tex_coord }
    }
}

/// Index range of one shape inside a concatenated buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Submesh {
    /// Number of indices to draw
    pub index_count: u32,
    /// First index inside the shared index buffer
    pub start_index: u32,
    /// Value added to each index before vertex lookup
    pub base_vertex: i32,
}

/// Primitive topology of a draw
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimitiveTopology {
    /// Independent triangles
    TriangleList,
    /// Independent line segments
    LineList,
}

/// A concatenated vertex/index buffer with named submesh ranges
#[derive(Debug, Clone)]
pub struct MeshGeometry {
    /// Debug name
    pub name: String,
    /// Shared vertex buffer
    pub vertices: Vec<Vertex>,
    /// Shared index buffer
    pub indices: Vec<u32>,
    /// Shape name to draw range
    pub submeshes: HashMap<String, Submesh>,
}

impl MeshGeometry {
    /// Look up a submesh by name, panicking on a setup-phase typo
    pub fn submesh(&self, name: &str) -> Submesh {
        self.submeshes[name]
    }
}

/// Owning storage for all mesh geometry in the scene
#[derive(Debug, Default)]
pub struct GeometryStore {
    meshes: SlotMap<MeshKey, MeshGeometry>,
}

impl GeometryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a geometry, returning its stable key
    pub fn insert(&mut self, geometry: MeshGeometry) -> MeshKey {
        log::debug!(
            "registering geometry '{}': {} vertices, {} indices, {} submeshes",
            geometry.name,
            geometry.vertices.len(),
            geometry.indices.len(),
            geometry.submeshes.len()
        );
        self.meshes.insert(geometry)
    }

    /// Borrow a geometry by key
    pub fn get(&self, key: MeshKey) -> Option<&MeshGeometry> {
        self.meshes.get(key)
    }

    /// Number of stored geometries
    pub fn len(&self) -> usize {
        self.meshes.len()
    }

    /// Whether the store is empty
    pub fn is_empty(&self) -> bool {
        self.meshes.is_empty()
    }
}

/// Raw shape data before concatenation
#[derive(Debug, Clone, Default)]
pub struct ShapeData {
    /// Shape vertices
    pub vertices: Vec<Vertex>,
    /// Shape indices, local to this shape
    pub indices: Vec<u32>,
}

/// Generate an axis-aligned box centered at the origin
pub fn box_shape(width: f32, height: f32, depth: f32) -> ShapeData {
    let (w, h, d) = (0.5 * width, 0.5 * height, 0.5 * depth);

    // 24 vertices, four per face, so normals stay flat.
    let faces: [([f32; 3], [f32; 3], [f32; 3]); 6] = [
        // (normal, u axis, v axis); face corner = normal*extent ± u ± v
        ([0.0, 0.0, -1.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
        ([0.0, 0.0, 1.0], [-1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
        ([-1.0, 0.0, 0.0], [0.0, 0.0, -1.0], [0.0, 1.0, 0.0]),
        ([1.0, 0.0, 0.0], [0.0, 0.0, 1.0], [0.0, 1.0, 0.0]),
        ([0.0, 1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, 1.0]),
        ([0.0, -1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, -1.0]),
    ];

    let extent = [w, h, d];
    let mut shape = ShapeData::default();

    for (normal, u_axis, v_axis) in faces {
        let base = shape.vertices.len() as u32;
        let center: Vec<f32> = (0..3).map(|i| normal[i] * extent[i]).collect();

        for (su, sv, uv) in [
            (-1.0, -1.0, [0.0, 1.0]),
            (-1.0, 1.0, [0.0, 0.0]),
            (1.0, 1.0, [1.0, 0.0]),
            (1.0, -1.0, [1.0, 1.0]),
        ] {
            let mut position = [0.0f32; 3];
            for i in 0..3 {
                position[i] = center[i] + su * u_axis[i] * extent[i] + sv * v_axis[i] * extent[i];
            }
            shape.vertices.push(Vertex::new(position, normal, uv));
        }

        shape.indices.extend([base, base + 1, base + 2, base, base + 2, base + 3]);
    }

    shape
}

/// Generate a capped cylinder along the y axis, centered at the origin
pub fn cylinder_shape(
    bottom_radius: f32,
    top_radius: f32,
    height: f32,
    slices: u32,
    stacks: u32,
) -> ShapeData {
    let mut shape = ShapeData::default();

    let stack_height = height / stacks as f32;
    let radius_step = (top_radius - bottom_radius) / stacks as f32;

    // Side rings, bottom to top.
    for ring in 0..=stacks {
        let y = -0.5 * height + ring as f32 * stack_height;
        let radius = bottom_radius + ring as f32 * radius_step;

        for slice in 0..=slices {
            let angle = slice as f32 * 2.0 * PI / slices as f32;
            let (sin, cos) = angle.sin_cos();

            shape.vertices.push(Vertex::new(
                [radius * cos, y, radius * sin],
                [cos, 0.0, sin],
                [slice as f32 / slices as f32, 1.0 - ring as f32 / stacks as f32],
            ));
        }
    }

    let ring_stride = slices + 1;
    for ring in 0..stacks {
        for slice in 0..slices {
            let a = ring * ring_stride + slice;
            let b = a + 1;
            let c = a + ring_stride;
            let d = c + 1;
            shape.indices.extend([a, c, d, a, d, b]);
        }
    }

    // Caps: a center vertex fanned to a rim ring.
    for (y, normal, radius) in [
        (0.5 * height, [0.0, 1.0, 0.0], top_radius),
        (-0.5 * height, [0.0, -1.0, 0.0], bottom_radius),
    ] {
        let base = shape.vertices.len() as u32;
        for slice in 0..=slices {
            let angle = slice as f32 * 2.0 * PI / slices as f32;
            let (sin, cos) = angle.sin_cos();
            shape.vertices.push(Vertex::new(
                [radius * cos, y, radius * sin],
                normal,
                [cos * 0.5 + 0.5, sin * 0.5 + 0.5],
            ));
        }
        let center = shape.vertices.len() as u32;
        shape.vertices.push(Vertex::new([0.0, y, 0.0], normal, [0.5, 0.5]));

        for slice in 0..slices {
            if normal[1] > 0.0 {
                shape.indices.extend([center, base + slice + 1, base + slice]);
            } else {
                shape.indices.extend([center, base + slice, base + slice + 1]);
            }
        }
    }

    shape
}

/// Generate a UV sphere centered at the origin
pub fn sphere_shape(radius: f32, slices: u32, stacks: u32) -> ShapeData {
    let mut shape = ShapeData::default();

    shape.vertices.push(Vertex::new([0.0, radius, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0]));

    for stack in 1..stacks {
        let phi = stack as f32 * PI / stacks as f32;
        for slice in 0..=slices {
            let theta = slice as f32 * 2.0 * PI / slices as f32;

            let position = [
                radius * phi.sin() * theta.cos(),
                radius * phi.cos(),
                radius * phi.sin() * theta.sin(),
            ];
            let inv_len = 1.0 / radius;
            let normal = [position[0] * inv_len, position[1] * inv_len, position[2] * inv_len];

            shape.vertices.push(Vertex::new(
                position,
                normal,
                [theta / (2.0 * PI), phi / PI],
            ));
        }
    }

    shape.vertices.push(Vertex::new([0.0, -radius, 0.0], [0.0, -1.0, 0.0], [0.0, 1.0]));

    // Top cap fan.
    for slice in 1..=slices {
        shape.indices.extend([0, slice + 1, slice]);
    }

    // Interior quads.
    let ring_stride = slices + 1;
    let first_ring = 1;
    for stack in 0..stacks - 2 {
        for slice in 0..slices {
            let a = first_ring + stack * ring_stride + slice;
            let b = a + 1;
            let c = a + ring_stride;
            let d = c + 1;
            shape.indices.extend([a, b, d, a, d, c]);
        }
    }

    // Bottom cap fan.
    let south_pole = shape.vertices.len() as u32 - 1;
    let last_ring = south_pole - ring_stride;
    for slice in 0..slices {
        shape
            .indices
            .extend([south_pole, last_ring + slice, last_ring + slice + 1]);
    }

    shape
}

/// Concatenate shapes into one [`MeshGeometry`] with named submeshes
pub fn concatenate(name: &str, shapes: &[(&str, &ShapeData)]) -> MeshGeometry {
    let mut geometry = MeshGeometry {
        name: name.to_string(),
        vertices: Vec::new(),
        indices: Vec::new(),
        submeshes: HashMap::new(),
    };

    for (shape_name, shape) in shapes {
        let submesh = Submesh {
            index_count: shape.indices.len() as u32,
            start_index: geometry.indices.len() as u32,
            base_vertex: geometry.vertices.len() as i32,
        };

        geometry.vertices.extend_from_slice(&shape.vertices);
        geometry.indices.extend_from_slice(&shape.indices);
        geometry.submeshes.insert((*shape_name).to_string(), submesh);
    }

    geometry
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_box_has_flat_faces() {
        let shape = box_shape(2.0, 0.2, 2.0);
        assert_eq!(shape.vertices.len(), 24);
        assert_eq!(shape.indices.len(), 36);

        for vertex in &shape.vertices {
            let n = vertex.normal;
            let len = (n[0] * n[0] + n[1] * n[1] + n[2] * n[2]).sqrt();
            assert_relative_eq!(len, 1.0, epsilon = 1e-6);
        }
    }

    #[test]
    fn test_box_extents() {
        let shape = box_shape(2.0, 0.2, 2.0);
        for vertex in &shape.vertices {
            assert!(vertex.position[0].abs() <= 1.0 + 1e-6);
            assert!(vertex.position[1].abs() <= 0.1 + 1e-6);
            assert!(vertex.position[2].abs() <= 1.0 + 1e-6);
        }
    }

    #[test]
    fn test_cylinder_vertices_lie_on_radius() {
        let shape = cylinder_shape(0.05, 0.05, 3.0, 10, 10);

        // Side vertices (before the caps) sit on the cylinder surface.
        let side_count = (10 + 1) * (10 + 1);
        for vertex in &shape.vertices[..side_count] {
            let r = (vertex.position[0].powi(2) + vertex.position[2].powi(2)).sqrt();
            assert_relative_eq!(r, 0.05, epsilon = 1e-5);
            assert!(vertex.position[1].abs() <= 1.5 + 1e-6);
        }
    }

    #[test]
    fn test_sphere_vertices_lie_on_radius() {
        let shape = sphere_shape(0.2, 10, 10);
        for vertex in &shape.vertices {
            let r = (vertex.position[0].powi(2)
                + vertex.position[1].powi(2)
                + vertex.position[2].powi(2))
            .sqrt();
            assert_relative_eq!(r, 0.2, epsilon = 1e-5);
        }
    }

    #[test]
    fn test_indices_stay_in_bounds() {
        for shape in [
            box_shape(1.0, 1.0, 1.0),
            cylinder_shape(0.05, 0.05, 3.0, 10, 10),
            sphere_shape(0.2, 10, 10),
        ] {
            let vertex_count = shape.vertices.len() as u32;
            assert!(shape.indices.iter().all(|&i| i < vertex_count));
            assert_eq!(shape.indices.len() % 3, 0);
        }
    }

    #[test]
    fn test_concatenate_offsets_submeshes() {
        let a = box_shape(1.0, 1.0, 1.0);
        let b = sphere_shape(0.2, 10, 10);
        let geometry = concatenate("combined", &[("box", &a), ("sphere", &b)]);

        let box_range = geometry.submesh("box");
        let sphere_range = geometry.submesh("sphere");

        assert_eq!(box_range.start_index, 0);
        assert_eq!(box_range.base_vertex, 0);
        assert_eq!(sphere_range.start_index, a.indices.len() as u32);
        assert_eq!(sphere_range.base_vertex, a.vertices.len() as i32);
        assert_eq!(
            geometry.indices.len(),
            (box_range.index_count + sphere_range.index_count) as usize
        );
    }
}
