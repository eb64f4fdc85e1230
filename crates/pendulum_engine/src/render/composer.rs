//! Per-frame composition
//!
//! [`FrameComposer`] runs the fixed frame sequence: acquire a frame
//! slot, advance the simulation and rewrite the six derived world
//! matrices, flush dirty object and material constants into the slot's
//! buffers, write both common-constant records, record the five draw
//! passes, then submit and fence the slot. The sequence never reorders
//! and never skips a step, so a frame is either fully composed and
//! fenced or not produced at all.

use std::sync::Arc;

use crate::foundation::math::Mat4;
use crate::input::{AngleReset, CameraMotion};
use crate::physics::Pendulum;
use crate::render::camera::OrbitCamera;
use crate::render::constants::{shader_matrix, CommonConstants};
use crate::render::device::{CommandList, CommandQueue, DrawCommand, GpuFence, PipelineKind, RenderDevice};
use crate::render::error::RenderResult;
use crate::render::frame::{FrameSlot, FrameSlotAllocator};
use crate::render::items::RenderLayer;
use crate::render::lighting::SceneLighting;
use crate::render::scene::{build_pendulum_scene, Scene};
use crate::render::transforms::{
    derive_pendulum_transforms, reflection_matrix, MirrorEnvironment, PendulumRig,
};

/// Back-buffer clear color (light steel blue)
const CLEAR_COLOR: [f32; 4] = [0.690_196, 0.768_627, 0.870_588, 1.0];

/// Owns the scene and the frame ring and produces one frame per call
pub struct FrameComposer {
    pendulum: Pendulum,
    rig: PendulumRig,
    environment: MirrorEnvironment,
    camera: OrbitCamera,
    lighting: SceneLighting,
    scene: Scene,
    frames: FrameSlotAllocator,
    reset: Arc<AngleReset>,
    next_fence_value: u64,
    viewport: (f32, f32),
}

impl FrameComposer {
    /// Assemble the demo scene and build the frame ring
    ///
    /// Per-slot buffer capacities are fixed from the assembled scene's
    /// item and material counts.
    pub fn new(
        device: &mut dyn RenderDevice,
        ring_depth: usize,
        pendulum: Pendulum,
        camera: OrbitCamera,
        viewport: (f32, f32),
        reset: Arc<AngleReset>,
    ) -> RenderResult<Self> {
        let rig = PendulumRig::default();
        let environment = MirrorEnvironment::default();
        let lighting = SceneLighting::pendulum_demo();
        let scene = build_pendulum_scene(ring_depth, &pendulum, &rig, &environment, &lighting);
        let frames = FrameSlotAllocator::new(
            device,
            ring_depth,
            scene.items.len(),
            scene.materials.len(),
        )?;

        Ok(Self {
            pendulum,
            rig,
            environment,
            camera,
            lighting,
            scene,
            frames,
            reset,
            next_fence_value: 0,
            viewport,
        })
    }

    /// Compose, submit, and present one frame
    ///
    /// `delta` and `total` are seconds; both timing values reach the
    /// shaders through the common constants.
    pub fn compose_frame(
        &mut self,
        queue: &mut dyn CommandQueue,
        fence: &dyn GpuFence,
        delta: f32,
        total: f32,
    ) -> RenderResult<()> {
        self.frames.acquire_next(fence)?;
        self.advance_simulation(delta);

        let common = self.common_constants(delta, total);
        let reflected = self.reflected_constants(&common);

        let slot = self.frames.current_mut();
        self.scene
            .items
            .flush_dirty(|index, constants| slot.object.copy_data(index as usize, &constants));
        self.scene
            .materials
            .flush_dirty(|index, constants| slot.material.copy_data(index as usize, &constants));
        slot.common.copy_data(0, &common);
        slot.common.copy_data(1, &reflected);

        let list = record_frame(&self.scene, slot);
        queue.execute(list)?;

        self.next_fence_value += 1;
        queue.signal(self.next_fence_value)?;
        self.frames.submit(self.next_fence_value);
        queue.present()?;

        log::trace!(
            "frame {} submitted, pendulum angle {:.4}",
            self.next_fence_value,
            self.pendulum.theta()
        );
        Ok(())
    }

    /// Drain the frame ring before releasing GPU resources
    pub fn flush(&self, fence: &dyn GpuFence) -> RenderResult<()> {
        self.frames.flush(fence)
    }

    /// Steer the orbit camera
    pub fn apply_camera_motion(&mut self, motion: CameraMotion) {
        match motion {
            CameraMotion::Orbit { yaw, pitch } => self.camera.orbit(yaw, pitch),
            CameraMotion::Zoom(delta) => self.camera.zoom(delta),
        }
    }

    /// Update the viewport after a resize
    pub fn set_viewport(&mut self, width: f32, height: f32) {
        self.viewport = (width, height);
        self.camera.set_aspect_ratio(width / height);
    }

    /// The simulated pendulum
    pub fn pendulum(&self) -> &Pendulum {
        &self.pendulum
    }

    /// The orbit camera
    pub fn camera(&self) -> &OrbitCamera {
        &self.camera
    }

    /// The assembled scene
    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// The frame ring
    pub fn frame_ring(&self) -> &FrameSlotAllocator {
        &self.frames
    }

    /// Consume any pending reset, step the pendulum, and rewrite the
    /// six derived world matrices
    fn advance_simulation(&mut self, delta: f32) {
        if let Some(angle) = self.reset.take() {
            log::info!("resetting pendulum to angle {angle:.4}");
            self.pendulum.reset_to(angle);
        }
        self.pendulum.step(delta);

        let transforms = derive_pendulum_transforms(
            &self.pendulum,
            &self.rig,
            &self.environment,
            -self.lighting.primary_direction(),
        );

        let keys = self.scene.pendulum_items;
        let items = &mut self.scene.items;
        items.set_world(keys.wire.primary, transforms.wire.primary);
        items.set_world(keys.wire.reflected, transforms.wire.reflected);
        items.set_world(keys.wire.shadow, transforms.wire.shadow);
        items.set_world(keys.ball.primary, transforms.ball.primary);
        items.set_world(keys.ball.reflected, transforms.ball.reflected);
        items.set_world(keys.ball.shadow, transforms.ball.shadow);
    }

    fn common_constants(&self, delta: f32, total: f32) -> CommonConstants {
        let view = self.camera.view_matrix();
        let proj = self.camera.projection_matrix();
        let view_proj = proj * view;
        let invert = |m: &Mat4| m.try_inverse().unwrap_or_else(Mat4::identity);
        let (width, height) = self.viewport;

        CommonConstants {
            view: shader_matrix(&view),
            inv_view: shader_matrix(&invert(&view)),
            proj: shader_matrix(&proj),
            inv_proj: shader_matrix(&invert(&proj)),
            view_proj: shader_matrix(&view_proj),
            inv_view_proj: shader_matrix(&invert(&view_proj)),
            camera_pos: self.camera.position().into(),
            _pad0: 0.0,
            render_target_size: [width, height],
            inv_render_target_size: [1.0 / width, 1.0 / height],
            near_z: self.camera.near(),
            far_z: self.camera.far(),
            total_time: total,
            delta_time: delta,
            ambient_light: self.lighting.ambient,
            lights: self.lighting.to_gpu(),
        }
    }

    /// Copy of the primary record with light directions reflected
    /// across the mirror plane
    fn reflected_constants(&self, primary: &CommonConstants) -> CommonConstants {
        let mirror = reflection_matrix(self.environment.mirror_plane);
        CommonConstants {
            lights: self.lighting.to_gpu_reflected(&mirror),
            ..*primary
        }
    }
}

/// Record the five draw passes in their mandated order
///
/// Pass 1 draws opaque geometry with the primary common record. Pass 2
/// marks the mirror in the stencil with ref 1, color writes off. Pass 3
/// draws reflected geometry where stencil == 1, binding the second
/// common record at `base + stride`. Pass 4 restores the primary record
/// and ref 0 and blends the mirror surface. Pass 5 blends the planar
/// shadows.
fn record_frame(scene: &Scene, slot: &FrameSlot) -> CommandList {
    let mut list = CommandList::new(slot.command_allocator);
    list.push(DrawCommand::BeginFrame { clear_color: CLEAR_COLOR });

    list.push(DrawCommand::SetPipeline(PipelineKind::Opaque));
    list.push(DrawCommand::BindCommonConstants(slot.common.base_address()));
    record_layer(&mut list, scene, slot, RenderLayer::Opaque);

    list.push(DrawCommand::SetStencilRef(1));
    list.push(DrawCommand::SetPipeline(PipelineKind::MirrorMark));
    record_layer(&mut list, scene, slot, RenderLayer::Mirror);

    list.push(DrawCommand::SetPipeline(PipelineKind::Reflected));
    list.push(DrawCommand::BindCommonConstants(slot.common.gpu_address(1)));
    record_layer(&mut list, scene, slot, RenderLayer::Reflected);

    list.push(DrawCommand::SetPipeline(PipelineKind::Transparent));
    list.push(DrawCommand::BindCommonConstants(slot.common.base_address()));
    list.push(DrawCommand::SetStencilRef(0));
    record_layer(&mut list, scene, slot, RenderLayer::Transparent);

    list.push(DrawCommand::SetPipeline(PipelineKind::Shadow));
    record_layer(&mut list, scene, slot, RenderLayer::Shadow);

    list
}

fn record_layer(list: &mut CommandList, scene: &Scene, slot: &FrameSlot, layer: RenderLayer) {
    for item in scene.items.layer(layer) {
        let Some(material) = scene.materials.get(item.material) else {
            continue;
        };

        list.push(DrawCommand::BindGeometry(item.mesh));
        list.push(DrawCommand::SetTopology(item.topology));
        list.push(DrawCommand::BindTexture(material.texture_index));
        list.push(DrawCommand::BindObjectConstants(
            slot.object.gpu_address(item.object_index as usize),
        ));
        list.push(DrawCommand::BindMaterialConstants(
            slot.material.gpu_address(material.buffer_index as usize),
        ));
        list.push(DrawCommand::DrawIndexed {
            index_count: item.submesh.index_count,
            start_index: item.submesh.start_index,
            base_vertex: item.submesh.base_vertex,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::Vec3;
    use crate::render::headless::{HeadlessDevice, HeadlessFence, HeadlessQueue};

    const DT: f32 = 1.0 / 60.0;

    fn demo_pendulum() -> Pendulum {
        Pendulum::new(Vec3::new(0.0, 6.0, -5.0), 3.0, 0.3)
    }

    fn demo_composer(device: &mut HeadlessDevice, reset: Arc<AngleReset>) -> FrameComposer {
        FrameComposer::new(
            device,
            3,
            demo_pendulum(),
            OrbitCamera::pendulum_demo(800.0 / 600.0),
            (800.0, 600.0),
            reset,
        )
        .unwrap()
    }

    fn run_frames(
        composer: &mut FrameComposer,
        queue: &mut HeadlessQueue,
        fence: &HeadlessFence,
        count: usize,
    ) {
        for frame in 0..count {
            composer
                .compose_frame(queue, fence, DT, frame as f32 * DT)
                .unwrap();
        }
    }

    fn pipelines(list: &CommandList) -> Vec<PipelineKind> {
        list.commands
            .iter()
            .filter_map(|command| match command {
                DrawCommand::SetPipeline(kind) => Some(*kind),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_passes_are_recorded_in_mandated_order() {
        let mut device = HeadlessDevice::new();
        let fence = Arc::new(HeadlessFence::new());
        let mut queue = HeadlessQueue::new(Arc::clone(&fence));
        let mut composer = demo_composer(&mut device, Arc::new(AngleReset::new()));

        run_frames(&mut composer, &mut queue, &fence, 1);

        let list = queue.last_executed().unwrap();
        assert_eq!(
            pipelines(list),
            vec![
                PipelineKind::Opaque,
                PipelineKind::MirrorMark,
                PipelineKind::Reflected,
                PipelineKind::Transparent,
                PipelineKind::Shadow,
            ]
        );
        assert_eq!(list.commands[0], DrawCommand::BeginFrame { clear_color: CLEAR_COLOR });
    }

    #[test]
    fn test_stencil_refs_bracket_the_mirror_passes() {
        let mut device = HeadlessDevice::new();
        let fence = Arc::new(HeadlessFence::new());
        let mut queue = HeadlessQueue::new(Arc::clone(&fence));
        let mut composer = demo_composer(&mut device, Arc::new(AngleReset::new()));

        run_frames(&mut composer, &mut queue, &fence, 1);

        let commands = &queue.last_executed().unwrap().commands;
        let ref_one = commands
            .iter()
            .position(|c| *c == DrawCommand::SetStencilRef(1))
            .unwrap();
        let ref_zero = commands
            .iter()
            .position(|c| *c == DrawCommand::SetStencilRef(0))
            .unwrap();
        let mark = commands
            .iter()
            .position(|c| *c == DrawCommand::SetPipeline(PipelineKind::MirrorMark))
            .unwrap();
        let transparent = commands
            .iter()
            .position(|c| *c == DrawCommand::SetPipeline(PipelineKind::Transparent))
            .unwrap();

        assert!(ref_one < mark);
        assert!(transparent < ref_zero);
    }

    #[test]
    fn test_reflected_pass_binds_second_common_record() {
        let mut device = HeadlessDevice::new();
        let fence = Arc::new(HeadlessFence::new());
        let mut queue = HeadlessQueue::new(Arc::clone(&fence));
        let mut composer = demo_composer(&mut device, Arc::new(AngleReset::new()));

        run_frames(&mut composer, &mut queue, &fence, 1);

        let slot = composer.frame_ring().current();
        let base = slot.common.base_address();
        let stride = slot.common.stride();

        let bound: Vec<_> = queue
            .last_executed()
            .unwrap()
            .commands
            .iter()
            .filter_map(|command| match command {
                DrawCommand::BindCommonConstants(address) => Some(*address),
                _ => None,
            })
            .collect();

        assert_eq!(bound, vec![base, base + stride, base]);
    }

    #[test]
    fn test_every_layer_item_is_drawn() {
        let mut device = HeadlessDevice::new();
        let fence = Arc::new(HeadlessFence::new());
        let mut queue = HeadlessQueue::new(Arc::clone(&fence));
        let mut composer = demo_composer(&mut device, Arc::new(AngleReset::new()));

        run_frames(&mut composer, &mut queue, &fence, 1);

        let draws = queue
            .last_executed()
            .unwrap()
            .commands
            .iter()
            .filter(|c| matches!(c, DrawCommand::DrawIndexed { .. }))
            .count();

        // 5 opaque + 1 mirror mark + 3 reflected + 1 transparent + 3 shadow.
        assert_eq!(draws, 13);
    }

    #[test]
    fn test_slot_object_buffer_carries_current_ball_world() {
        let mut device = HeadlessDevice::new();
        let fence = Arc::new(HeadlessFence::new());
        let mut queue = HeadlessQueue::new(Arc::clone(&fence));
        let mut composer = demo_composer(&mut device, Arc::new(AngleReset::new()));

        run_frames(&mut composer, &mut queue, &fence, 1);

        let ball_key = composer.scene().pendulum_items.ball.primary;
        let item = composer.scene().items.get(ball_key).unwrap();
        let uploaded = composer
            .frame_ring()
            .current()
            .object
            .read(item.object_index as usize);

        assert_eq!(uploaded, item.to_constants());
    }

    #[test]
    fn test_reset_is_consumed_exactly_once() {
        let mut device = HeadlessDevice::new();
        let fence = Arc::new(HeadlessFence::new());
        let mut queue = HeadlessQueue::new(Arc::clone(&fence));
        let reset = Arc::new(AngleReset::new());
        let mut composer = demo_composer(&mut device, Arc::clone(&reset));

        reset.request(0.5);
        composer
            .compose_frame(&mut queue, fence.as_ref(), 0.0, 0.0)
            .unwrap();
        assert_eq!(composer.pendulum().theta(), 0.5);
        assert_eq!(composer.pendulum().omega(), 0.0);

        // No new request: the next zero-dt frame leaves the state alone.
        composer
            .compose_frame(&mut queue, fence.as_ref(), 0.0, 0.0)
            .unwrap();
        assert_eq!(composer.pendulum().theta(), 0.5);
    }

    #[test]
    fn test_fence_values_advance_with_presents() {
        let mut device = HeadlessDevice::new();
        let fence = Arc::new(HeadlessFence::new());
        let mut queue = HeadlessQueue::new(Arc::clone(&fence));
        let mut composer = demo_composer(&mut device, Arc::new(AngleReset::new()));

        run_frames(&mut composer, &mut queue, &fence, 5);

        assert_eq!(queue.presented_frames(), 5);
        assert_eq!(queue.executed().len(), 5);
        assert_eq!(fence.completed_value(), 5);
        composer.flush(fence.as_ref()).unwrap();
    }

    #[test]
    fn test_composed_trajectory_matches_direct_stepping() {
        let mut device = HeadlessDevice::new();
        let fence = Arc::new(HeadlessFence::new());
        let mut queue = HeadlessQueue::new(Arc::clone(&fence));
        let mut composer = demo_composer(&mut device, Arc::new(AngleReset::new()));

        run_frames(&mut composer, &mut queue, &fence, 60);

        let mut reference = demo_pendulum();
        for _ in 0..60 {
            reference.step(DT);
        }

        // Identical step sequence, identical floats.
        assert_eq!(composer.pendulum().theta(), reference.theta());
        assert_eq!(composer.pendulum().omega(), reference.omega());
    }

    #[test]
    fn test_camera_motion_reaches_the_camera() {
        let mut device = HeadlessDevice::new();
        let mut composer = demo_composer(&mut device, Arc::new(AngleReset::new()));

        composer.apply_camera_motion(CameraMotion::Zoom(1000.0));
        assert_eq!(composer.camera().radius(), 50.0);
    }
}
