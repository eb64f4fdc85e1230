//! Narrow GPU abstraction the core renders through
//!
//! The core never touches a native graphics API. It depends on three
//! trait seams provided by the platform layer: a device that creates
//! command allocators and GPU-visible upload buffers, a monotonic
//! fence for CPU/GPU synchronization, and a queue that executes
//! recorded command lists in FIFO order. Pipeline state objects are
//! pure configuration owned by the platform layer; the core only
//! selects among five named configurations.

use crate::render::error::RenderResult;
use crate::render::geometry::{MeshKey, PrimitiveTopology};

/// GPU virtual address of a buffered resource
pub type GpuAddress = u64;

/// Opaque handle to a command-recording allocator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CommandAllocatorHandle(pub u32);

/// Opaque handle to a GPU-visible upload buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UploadBufferHandle {
    /// Device-assigned identifier
    pub id: u32,
    /// GPU virtual address of the first byte
    pub base_address: GpuAddress,
}

/// The five fixed pipeline configurations, selected by pass
///
/// Constructed by the shader/pipeline collaborator; the core binds
/// them by name in the mandated pass order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PipelineKind {
    /// Standard depth-tested opaque rendering
    Opaque,
    /// Stencil-mark: writes stencil ref where the mirror is visible,
    /// color writes disabled
    MirrorMark,
    /// Stencil-equal test with inverted winding for mirror images
    Reflected,
    /// Alpha blending for the translucent mirror surface
    Transparent,
    /// Alpha blending with stencil-increment to stop shadow overdraw
    Shadow,
}

/// One recorded GPU command
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    /// Clear the back and depth/stencil buffers and bind render targets
    BeginFrame {
        /// Back-buffer clear color
        clear_color: [f32; 4],
    },
    /// Select a pipeline configuration
    SetPipeline(PipelineKind),
    /// Set the stencil reference value for subsequent draws
    SetStencilRef(u32),
    /// Bind the frame-common constant buffer at a GPU address
    BindCommonConstants(GpuAddress),
    /// Bind an object constant record at a GPU address
    BindObjectConstants(GpuAddress),
    /// Bind a material constant record at a GPU address
    BindMaterialConstants(GpuAddress),
    /// Bind a diffuse texture from the descriptor table
    BindTexture(u32),
    /// Bind vertex/index buffers of a geometry
    BindGeometry(MeshKey),
    /// Set the primitive topology
    SetTopology(PrimitiveTopology),
    /// Issue an indexed draw
    DrawIndexed {
        /// Number of indices
        index_count: u32,
        /// First index in the bound index buffer
        start_index: u32,
        /// Value added to each index before vertex lookup
        base_vertex: i32,
    },
}

/// A frame's worth of recorded commands, tied to the slot's allocator
#[derive(Debug, Clone, PartialEq)]
pub struct CommandList {
    /// Allocator backing this recording
    pub allocator: CommandAllocatorHandle,
    /// Commands in submission order
    pub commands: Vec<DrawCommand>,
}

impl CommandList {
    /// Start recording against an allocator
    pub fn new(allocator: CommandAllocatorHandle) -> Self {
        Self {
            allocator,
            commands: Vec::new(),
        }
    }

    /// Append a command
    pub fn push(&mut self, command: DrawCommand) {
        self.commands.push(command);
    }
}

/// Resource-creation surface of the platform device
pub trait RenderDevice {
    /// Create a command-recording allocator
    fn create_command_allocator(&mut self) -> RenderResult<CommandAllocatorHandle>;

    /// Create a GPU-visible upload buffer of `byte_size` bytes
    fn create_upload_buffer(&mut self, byte_size: u64) -> RenderResult<UploadBufferHandle>;
}

/// Monotonic completion fence
///
/// The GPU-side counter only ever increases. A frame slot whose
/// recorded fence value is at or below [`completed_value`]
/// (`Self::completed_value`) has fully retired on the GPU.
pub trait GpuFence {
    /// Latest fence value the GPU has reported complete
    fn completed_value(&self) -> u64;

    /// Block until the completed value reaches `value`
    ///
    /// A single blocking wait against the fence's completion event; no
    /// spin-polling, no timeout. An unresponsive GPU stalls the caller.
    fn wait_until(&self, value: u64) -> RenderResult<()>;
}

/// FIFO command queue of the platform device
pub trait CommandQueue {
    /// Execute a recorded command list
    fn execute(&mut self, list: CommandList) -> RenderResult<()>;

    /// Enqueue a fence signal after all previously executed work
    fn signal(&mut self, value: u64) -> RenderResult<()>;

    /// Present the completed frame
    fn present(&mut self) -> RenderResult<()>;
}
