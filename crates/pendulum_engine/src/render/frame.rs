//! Per-frame GPU resource ring
//!
//! The CPU records frame N+1 while the GPU consumes frame N. Each ring
//! slot owns the resources one in-flight frame needs: a command
//! allocator and three upload-buffer regions (common, object, and
//! material constants). A slot belongs to the GPU from submission
//! until its recorded fence value completes, and to the CPU otherwise;
//! round-robin reuse blocks on the oldest outstanding fence, bounding
//! CPU look-ahead to ring depth − 1 frames.
//!
//! The wait capability is injected through [`GpuFence`], so the ring
//! logic is exercised in tests with a scripted fence.

use std::marker::PhantomData;

use bytemuck::Pod;

use crate::render::constants::{aligned_stride, CommonConstants, MaterialConstants, ObjectConstants};
use crate::render::device::{
    CommandAllocatorHandle, GpuAddress, GpuFence, RenderDevice, UploadBufferHandle,
};
use crate::render::error::RenderResult;

/// Number of common-constant elements per slot: primary + reflected
pub const COMMON_ELEMENTS: usize = 2;

/// A typed view over a GPU-visible upload buffer
///
/// Elements are spaced by the aligned constant-buffer stride, so the
/// GPU address of element `i` is `base + i * stride`.
#[derive(Debug)]
pub struct UploadRegion<T> {
    handle: UploadBufferHandle,
    bytes: Vec<u8>,
    stride: usize,
    capacity: usize,
    _element: PhantomData<T>,
}

impl<T: Pod> UploadRegion<T> {
    /// Allocate a region holding `capacity` aligned elements
    pub fn new(device: &mut dyn RenderDevice, capacity: usize) -> RenderResult<Self> {
        let stride = aligned_stride::<T>() as usize;
        let byte_size = stride * capacity;
        let handle = device.create_upload_buffer(byte_size as u64)?;

        Ok(Self {
            handle,
            bytes: vec![0; byte_size],
            stride,
            capacity,
            _element: PhantomData,
        })
    }

    /// Write one element at `index`
    ///
    /// Out-of-range indices are a setup-phase sizing bug; buffer
    /// capacities are derived from the registry counts, so this cannot
    /// fire in a correctly assembled scene.
    pub fn copy_data(&mut self, index: usize, value: &T) {
        assert!(index < self.capacity, "constant-buffer index {index} out of range");
        let offset = index * self.stride;
        self.bytes[offset..offset + std::mem::size_of::<T>()]
            .copy_from_slice(bytemuck::bytes_of(value));
    }

    /// Read back one element (test and debug inspection)
    pub fn read(&self, index: usize) -> T {
        assert!(index < self.capacity);
        let offset = index * self.stride;
        bytemuck::pod_read_unaligned(&self.bytes[offset..offset + std::mem::size_of::<T>()])
    }

    /// GPU address of element `index`
    pub fn gpu_address(&self, index: usize) -> GpuAddress {
        debug_assert!(index < self.capacity);
        self.handle.base_address + (index * self.stride) as u64
    }

    /// GPU address of element 0
    pub fn base_address(&self) -> GpuAddress {
        self.handle.base_address
    }

    /// Aligned byte stride between elements
    pub fn stride(&self) -> u64 {
        self.stride as u64
    }

    /// Number of elements
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

/// Per-frame resource bundle: one element of the ring
#[derive(Debug)]
pub struct FrameSlot {
    /// Command-recording allocator owned by this slot
    pub command_allocator: CommandAllocatorHandle,
    /// Common constants: element 0 primary, element 1 mirror-reflected
    pub common: UploadRegion<CommonConstants>,
    /// Object constants, one element per render item
    pub object: UploadRegion<ObjectConstants>,
    /// Material constants, one element per material
    pub material: UploadRegion<MaterialConstants>,
    fence_value: u64,
}

impl FrameSlot {
    fn new(
        device: &mut dyn RenderDevice,
        object_count: usize,
        material_count: usize,
    ) -> RenderResult<Self> {
        Ok(Self {
            command_allocator: device.create_command_allocator()?,
            common: UploadRegion::new(device, COMMON_ELEMENTS)?,
            object: UploadRegion::new(device, object_count)?,
            material: UploadRegion::new(device, material_count)?,
            fence_value: 0,
        })
    }

    /// Fence value recorded at this slot's last submission
    pub fn fence_value(&self) -> u64 {
        self.fence_value
    }
}

/// Fixed-size round-robin pool of [`FrameSlot`]s
#[derive(Debug)]
pub struct FrameSlotAllocator {
    slots: Vec<FrameSlot>,
    current: usize,
}

impl FrameSlotAllocator {
    /// Build a ring of `ring_depth` slots sized for the scene
    ///
    /// `object_count` and `material_count` must equal the live render
    /// item and material counts; per-slot buffer capacities are fixed
    /// from them here and never grow.
    pub fn new(
        device: &mut dyn RenderDevice,
        ring_depth: usize,
        object_count: usize,
        material_count: usize,
    ) -> RenderResult<Self> {
        assert!(ring_depth >= 1, "frame ring needs at least one slot");

        let mut slots = Vec::with_capacity(ring_depth);
        for _ in 0..ring_depth {
            slots.push(FrameSlot::new(device, object_count, material_count)?);
        }

        log::info!(
            "frame ring ready: {} slots, {} object + {} material elements per slot",
            ring_depth,
            object_count,
            material_count
        );

        Ok(Self { slots, current: 0 })
    }

    /// Advance to the next slot, blocking until the GPU releases it
    ///
    /// If the new current slot is still in flight (its recorded fence
    /// value exceeds the completed value), performs one blocking wait
    /// against the fence. Returns exclusive access to the slot.
    pub fn acquire_next(&mut self, fence: &dyn GpuFence) -> RenderResult<&mut FrameSlot> {
        self.current = (self.current + 1) % self.slots.len();
        let slot = &mut self.slots[self.current];

        if slot.fence_value != 0 && fence.completed_value() < slot.fence_value {
            log::trace!("frame ring full, waiting for fence value {}", slot.fence_value);
            fence.wait_until(slot.fence_value)?;
        }

        Ok(slot)
    }

    /// Current slot without advancing
    pub fn current(&self) -> &FrameSlot {
        &self.slots[self.current]
    }

    /// Current slot without advancing, mutable
    pub fn current_mut(&mut self) -> &mut FrameSlot {
        &mut self.slots[self.current]
    }

    /// Record the fence value just signalled for the current slot
    ///
    /// The slot is GPU-owned until that value completes.
    pub fn submit(&mut self, fence_value: u64) {
        self.slots[self.current].fence_value = fence_value;
    }

    /// Wait until every outstanding slot has retired
    ///
    /// Shutdown drain: resources must not be released while any slot
    /// is still GPU-owned.
    pub fn flush(&self, fence: &dyn GpuFence) -> RenderResult<()> {
        let newest = self.slots.iter().map(|s| s.fence_value).max().unwrap_or(0);
        if newest != 0 && fence.completed_value() < newest {
            fence.wait_until(newest)?;
        }
        Ok(())
    }

    /// Number of slots in the ring
    pub fn ring_depth(&self) -> usize {
        self.slots.len()
    }
}
