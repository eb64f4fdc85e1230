//! # Rendering System
//!
//! Backend-free rendering core built around two ideas:
//!
//! - **Frame ring**: the CPU records frame N+1 while the GPU consumes
//!   frame N. Each ring slot owns a command allocator and the upload
//!   buffers one in-flight frame writes; a monotonic fence arbitrates
//!   slot reuse.
//! - **Fixed pass graph**: every frame draws the same five passes in
//!   the same order (opaque, stencil-mark, reflected, transparent,
//!   shadow), producing the mirror and planar-shadow effects with
//!   stencil state alone.
//!
//! The core talks to the platform only through the narrow traits in
//! [`device`]; tests and the demo binary drive it with the headless
//! implementations in [`headless`].

pub mod camera;
pub mod composer;
pub mod constants;
pub mod device;
pub mod error;
pub mod frame;
pub mod geometry;
pub mod headless;
pub mod items;
pub mod lighting;
pub mod material;
pub mod scene;
pub mod transforms;

pub use camera::{OrbitCamera, OrbitLimits};
pub use composer::FrameComposer;
pub use constants::{CommonConstants, GpuLight, MaterialConstants, ObjectConstants};
pub use device::{CommandList, CommandQueue, DrawCommand, GpuFence, PipelineKind, RenderDevice};
pub use error::{RenderError, RenderResult};
pub use frame::{FrameSlot, FrameSlotAllocator};
pub use geometry::{GeometryStore, MeshGeometry, MeshKey, PrimitiveTopology, Submesh, Vertex};
pub use headless::{HeadlessDevice, HeadlessFence, HeadlessQueue};
pub use items::{ItemKey, RenderItem, RenderItemRegistry, RenderLayer};
pub use lighting::{Light, SceneLighting, MAX_LIGHTS};
pub use material::{Material, MaterialKey, MaterialRegistry};
pub use scene::{build_pendulum_scene, PendulumItems, Scene};
pub use transforms::{
    derive_pendulum_transforms, reflection_matrix, shadow_matrix, DerivedTransforms,
    MirrorEnvironment, PendulumRig, PendulumTransforms,
};
