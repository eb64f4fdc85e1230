//! Demo scene assembly
//!
//! Builds the static catalog the frame loop draws from: room geometry
//! (floor, wall, mirror), the pendulum assembly (ceiling, wire, ball),
//! five materials, and the twelve render items across the five draw
//! layers. Runs once at setup; afterwards the registries are static
//! and the frame ring sizes its buffers from their counts.

use crate::foundation::math::{Mat4, Vec3};
use crate::physics::Pendulum;
use crate::render::geometry::{
    box_shape, concatenate, cylinder_shape, sphere_shape, GeometryStore, MeshGeometry, MeshKey,
    Submesh, Vertex,
};
use crate::render::items::{ItemKey, RenderItem, RenderItemRegistry, RenderLayer};
use crate::render::lighting::SceneLighting;
use crate::render::material::{Material, MaterialKey, MaterialRegistry};
use crate::render::transforms::{
    reflection_matrix, shadow_matrix, MirrorEnvironment, PendulumRig, SHADOW_LIFT,
};

/// Primary, reflected, and shadow items of one moving body
#[derive(Debug, Clone, Copy)]
pub struct BodyItems {
    /// The object itself (opaque layer)
    pub primary: ItemKey,
    /// Its mirror image (reflected layer)
    pub reflected: ItemKey,
    /// Its floor shadow (shadow layer)
    pub shadow: ItemKey,
}

/// Cached item keys for the parts updated every tick
#[derive(Debug, Clone, Copy)]
pub struct PendulumItems {
    /// Wire cylinder triple
    pub wire: BodyItems,
    /// Ball sphere triple
    pub ball: BodyItems,
}

/// The assembled demo scene
#[derive(Debug)]
pub struct Scene {
    /// All mesh geometry
    pub geometry: GeometryStore,
    /// All materials
    pub materials: MaterialRegistry,
    /// All render items in their layers
    pub items: RenderItemRegistry,
    /// Keys of the per-tick dynamic items
    pub pendulum_items: PendulumItems,
}

/// Floor, wall, and mirror quads sharing one buffer
///
/// Texture coordinates tile across the floor and wall; the wall leaves
/// a gap in the middle for the mirror.
fn background_geometry() -> MeshGeometry {
    let vertices = vec![
        // Floor
        Vertex::new([-3.5, 0.0, -10.0], [0.0, 1.0, 0.0], [0.0, 4.0]),
        Vertex::new([-3.5, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0]),
        Vertex::new([7.5, 0.0, 0.0], [0.0, 1.0, 0.0], [4.0, 0.0]),
        Vertex::new([7.5, 0.0, -10.0], [0.0, 1.0, 0.0], [4.0, 4.0]),
        // Wall, left of the mirror gap
        Vertex::new([-3.5, 0.0, 0.0], [0.0, 0.0, -1.0], [0.0, 2.0]),
        Vertex::new([-3.5, 5.0, 0.0], [0.0, 0.0, -1.0], [0.0, 0.0]),
        Vertex::new([-2.5, 5.0, 0.0], [0.0, 0.0, -1.0], [0.5, 0.0]),
        Vertex::new([-2.5, 0.0, 0.0], [0.0, 0.0, -1.0], [0.5, 2.0]),
        // Wall, right of the mirror gap
        Vertex::new([2.5, 0.0, 0.0], [0.0, 0.0, -1.0], [0.0, 2.0]),
        Vertex::new([2.5, 5.0, 0.0], [0.0, 0.0, -1.0], [0.0, 0.0]),
        Vertex::new([7.5, 5.0, 0.0], [0.0, 0.0, -1.0], [2.0, 0.0]),
        Vertex::new([7.5, 0.0, 0.0], [0.0, 0.0, -1.0], [2.0, 2.0]),
        // Wall strip above the mirror
        Vertex::new([-3.5, 5.0, 0.0], [0.0, 0.0, -1.0], [0.0, 1.0]),
        Vertex::new([-3.5, 5.0, 0.0], [0.0, 0.0, -1.0], [0.0, 0.0]),
        Vertex::new([7.5, 5.0, 0.0], [0.0, 0.0, -1.0], [6.0, 0.0]),
        Vertex::new([7.5, 5.0, 0.0], [0.0, 0.0, -1.0], [6.0, 1.0]),
        // Mirror
        Vertex::new([-2.5, 0.0, 0.0], [0.0, 0.0, -1.0], [0.0, 1.0]),
        Vertex::new([-2.5, 5.0, 0.0], [0.0, 0.0, -1.0], [0.0, 0.0]),
        Vertex::new([2.5, 5.0, 0.0], [0.0, 0.0, -1.0], [1.0, 0.0]),
        Vertex::new([2.5, 0.0, 0.0], [0.0, 0.0, -1.0], [1.0, 1.0]),
    ];

    let indices = vec![
        0, 1, 2, 0, 2, 3, // floor
        4, 5, 6, 4, 6, 7, // wall pieces
        8, 9, 10, 8, 10, 11,
        12, 13, 14, 12, 14, 15,
        16, 17, 18, 16, 18, 19, // mirror
    ];

    let submeshes = [
        ("floor", Submesh { index_count: 6, start_index: 0, base_vertex: 0 }),
        ("wall", Submesh { index_count: 18, start_index: 6, base_vertex: 0 }),
        ("mirror", Submesh { index_count: 6, start_index: 24, base_vertex: 0 }),
    ]
    .into_iter()
    .map(|(name, submesh)| (name.to_string(), submesh))
    .collect();

    MeshGeometry {
        name: "background".to_string(),
        vertices,
        indices,
        submeshes,
    }
}

/// Ceiling box, wire cylinder, and ball sphere in one buffer
fn pendulum_geometry(rig: &PendulumRig, wire_length: f32) -> MeshGeometry {
    let ceiling = box_shape(2.0, 0.2, 2.0);
    let wire = cylinder_shape(0.05, 0.05, wire_length, 10, 10);
    let ball = sphere_shape(rig.ball_radius * 2.0, 10, 10);

    concatenate(
        "pendulum",
        &[("ceiling", &ceiling), ("wire", &wire), ("ball", &ball)],
    )
}

fn demo_materials(materials: &mut MaterialRegistry) -> [MaterialKey; 5] {
    let bricks = materials.insert(
        Material::new("bricks")
            .with_texture(0)
            .with_fresnel(0.05)
            .with_roughness(0.25),
    );
    let floor = materials.insert(
        Material::new("floor")
            .with_texture(1)
            .with_fresnel(0.07)
            .with_roughness(0.3),
    );
    let mirror = materials.insert(
        Material::new("mirror")
            .with_texture(2)
            .with_albedo(1.0, 1.0, 1.0, 0.3)
            .with_fresnel(0.1)
            .with_roughness(0.5),
    );
    let white = materials.insert(
        Material::new("white")
            .with_texture(3)
            .with_fresnel(0.05)
            .with_roughness(0.3),
    );
    let shadow = materials.insert(
        Material::new("shadow")
            .with_texture(3)
            .with_albedo(0.0, 0.0, 0.0, 0.5)
            .with_fresnel(0.001)
            .with_roughness(0.0),
    );
    [bricks, floor, mirror, white, shadow]
}

/// Insert the primary/reflected/shadow triple of one body
///
/// The reflected item keeps the body's material; the shadow item uses
/// the translucent shadow material.
fn insert_body_triple(
    items: &mut RenderItemRegistry,
    mesh: MeshKey,
    submesh: Submesh,
    material: MaterialKey,
    shadow_material: MaterialKey,
    world: Mat4,
    reflect: &Mat4,
    shadow: &Mat4,
) -> BodyItems {
    let primary = items.insert(
        RenderItem::new(mesh, submesh, material).with_world(world),
        &[RenderLayer::Opaque],
    );
    let reflected = items.insert(
        RenderItem::new(mesh, submesh, material).with_world(reflect * world),
        &[RenderLayer::Reflected],
    );
    let shadow = items.insert(
        RenderItem::new(mesh, submesh, shadow_material).with_world(shadow * world),
        &[RenderLayer::Shadow],
    );

    BodyItems { primary, reflected, shadow }
}

/// Assemble the complete pendulum demo scene
pub fn build_pendulum_scene(
    ring_depth: usize,
    pendulum: &Pendulum,
    rig: &PendulumRig,
    environment: &MirrorEnvironment,
    lighting: &SceneLighting,
) -> Scene {
    let mut geometry = GeometryStore::new();
    let mut materials = MaterialRegistry::new(ring_depth);
    let mut items = RenderItemRegistry::new(ring_depth);

    let background_geo = background_geometry();
    let pendulum_geo = pendulum_geometry(rig, pendulum.wire_length());

    let floor_sub = background_geo.submesh("floor");
    let wall_sub = background_geo.submesh("wall");
    let mirror_sub = background_geo.submesh("mirror");
    let ceiling_sub = pendulum_geo.submesh("ceiling");
    let wire_sub = pendulum_geo.submesh("wire");
    let ball_sub = pendulum_geo.submesh("ball");

    let background = geometry.insert(background_geo);
    let pendulum_mesh = geometry.insert(pendulum_geo);

    let [bricks, floor_mat, mirror_mat, white, shadow_mat] = demo_materials(&mut materials);

    // Static room items.
    items.insert(
        RenderItem::new(background, floor_sub, floor_mat),
        &[RenderLayer::Opaque],
    );
    items.insert(
        RenderItem::new(background, wall_sub, bricks),
        &[RenderLayer::Opaque],
    );
    // The mirror is drawn twice: once to mark the stencil, once
    // alpha-blended over the reflected contents.
    items.insert(
        RenderItem::new(background, mirror_sub, mirror_mat),
        &[RenderLayer::Mirror, RenderLayer::Transparent],
    );

    let reflect = reflection_matrix(environment.mirror_plane);
    let to_light = -lighting.primary_direction();
    let floor_normal = Vec3::new(
        environment.floor_plane.x,
        environment.floor_plane.y,
        environment.floor_plane.z,
    )
    .normalize();
    let shadow = Mat4::new_translation(&(floor_normal * SHADOW_LIFT))
        * shadow_matrix(environment.floor_plane, to_light);

    // Ceiling triple: static, so its derived worlds are final here.
    insert_body_triple(
        &mut items,
        pendulum_mesh,
        ceiling_sub,
        floor_mat,
        shadow_mat,
        Mat4::new_translation(&pendulum.anchor()),
        &reflect,
        &shadow,
    );

    // Wire and ball triples: worlds are placeholders overwritten by the
    // transform derivation on the first tick.
    let wire = insert_body_triple(
        &mut items,
        pendulum_mesh,
        wire_sub,
        white,
        shadow_mat,
        rig.wire_world(pendulum),
        &reflect,
        &shadow,
    );
    let ball = insert_body_triple(
        &mut items,
        pendulum_mesh,
        ball_sub,
        white,
        shadow_mat,
        rig.ball_world(pendulum),
        &reflect,
        &shadow,
    );

    log::info!(
        "scene assembled: {} items, {} materials, {} geometries",
        items.len(),
        materials.len(),
        geometry.len()
    );

    Scene {
        geometry,
        materials,
        items,
        pendulum_items: PendulumItems { wire, ball },
    }
}
