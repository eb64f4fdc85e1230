//! Headless device layer
//!
//! Stands in for the platform graphics backend where no window or GPU
//! is available: integration tests and the demo binary's drive loop.
//! The queue retains every executed command list for inspection, and
//! the fence completes as soon as the queue signals it, so frames
//! never block.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::render::device::{
    CommandAllocatorHandle, CommandList, CommandQueue, GpuFence, RenderDevice, UploadBufferHandle,
};
use crate::render::error::RenderResult;

/// Spacing between upload-buffer base addresses
///
/// Large enough that regions never overlap, so address arithmetic bugs
/// show up as wildly wrong addresses in tests.
const ADDRESS_SPACING: u64 = 1 << 20;

/// Headless resource factory
#[derive(Debug, Default)]
pub struct HeadlessDevice {
    next_allocator: u32,
    next_buffer: u32,
}

impl HeadlessDevice {
    /// Create a device with no resources
    pub fn new() -> Self {
        Self::default()
    }
}

impl RenderDevice for HeadlessDevice {
    fn create_command_allocator(&mut self) -> RenderResult<CommandAllocatorHandle> {
        let handle = CommandAllocatorHandle(self.next_allocator);
        self.next_allocator += 1;
        Ok(handle)
    }

    fn create_upload_buffer(&mut self, byte_size: u64) -> RenderResult<UploadBufferHandle> {
        debug_assert!(byte_size <= ADDRESS_SPACING);
        let handle = UploadBufferHandle {
            id: self.next_buffer,
            base_address: u64::from(self.next_buffer + 1) * ADDRESS_SPACING,
        };
        self.next_buffer += 1;
        Ok(handle)
    }
}

/// Fence that completes when the headless queue signals it
#[derive(Debug, Default)]
pub struct HeadlessFence {
    completed: AtomicU64,
}

impl HeadlessFence {
    /// Create a fence at completed value 0
    pub fn new() -> Self {
        Self::default()
    }

    fn complete(&self, value: u64) {
        self.completed.fetch_max(value, Ordering::Release);
    }
}

impl GpuFence for HeadlessFence {
    fn completed_value(&self) -> u64 {
        self.completed.load(Ordering::Acquire)
    }

    fn wait_until(&self, value: u64) -> RenderResult<()> {
        // Work retires at signal time, so the wait never actually blocks.
        debug_assert!(self.completed_value() >= value);
        Ok(())
    }
}

/// Queue that retires work immediately and keeps what it executed
#[derive(Debug)]
pub struct HeadlessQueue {
    fence: Arc<HeadlessFence>,
    executed: Vec<CommandList>,
    presented_frames: u64,
}

impl HeadlessQueue {
    /// Create a queue signalling the given fence
    pub fn new(fence: Arc<HeadlessFence>) -> Self {
        Self {
            fence,
            executed: Vec::new(),
            presented_frames: 0,
        }
    }

    /// Every command list executed so far, oldest first
    pub fn executed(&self) -> &[CommandList] {
        &self.executed
    }

    /// Most recently executed command list
    pub fn last_executed(&self) -> Option<&CommandList> {
        self.executed.last()
    }

    /// Number of presented frames
    pub fn presented_frames(&self) -> u64 {
        self.presented_frames
    }
}

impl CommandQueue for HeadlessQueue {
    fn execute(&mut self, list: CommandList) -> RenderResult<()> {
        self.executed.push(list);
        Ok(())
    }

    fn signal(&mut self, value: u64) -> RenderResult<()> {
        self.fence.complete(value);
        Ok(())
    }

    fn present(&mut self) -> RenderResult<()> {
        self.presented_frames += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::device::DrawCommand;

    #[test]
    fn test_device_assigns_distinct_buffer_addresses() {
        let mut device = HeadlessDevice::new();
        let a = device.create_upload_buffer(1024).unwrap();
        let b = device.create_upload_buffer(1024).unwrap();

        assert_ne!(a.id, b.id);
        assert!(b.base_address - a.base_address >= 1024);
    }

    #[test]
    fn test_signal_completes_fence() {
        let fence = Arc::new(HeadlessFence::new());
        let mut queue = HeadlessQueue::new(Arc::clone(&fence));

        assert_eq!(fence.completed_value(), 0);
        queue.signal(7).unwrap();
        assert_eq!(fence.completed_value(), 7);
        fence.wait_until(7).unwrap();
    }

    #[test]
    fn test_queue_retains_executed_lists() {
        let fence = Arc::new(HeadlessFence::new());
        let mut queue = HeadlessQueue::new(fence);
        let mut device = HeadlessDevice::new();

        let allocator = device.create_command_allocator().unwrap();
        let mut list = CommandList::new(allocator);
        list.push(DrawCommand::SetStencilRef(1));
        queue.execute(list).unwrap();
        queue.present().unwrap();

        assert_eq!(queue.executed().len(), 1);
        assert_eq!(queue.presented_frames(), 1);
        assert_eq!(
            queue.last_executed().unwrap().commands,
            vec![DrawCommand::SetStencilRef(1)]
        );
    }
}
