//! Pendulum demo application
//!
//! Drives the frame composer with the headless device layer: the full
//! frame sequence runs (simulation, constant uploads, five-pass
//! recording, fence-synchronized submission) without a window or GPU.
//! A mid-run angle reset and a couple of camera drags exercise the
//! external input paths.

use std::sync::Arc;

use pendulum_engine::input::MouseTracker;
use pendulum_engine::prelude::*;

const FRAME_DT: f32 = 1.0 / 60.0;
const FRAME_COUNT: u64 = 600;

fn load_config() -> SimulationConfig {
    match SimulationConfig::load_from_file("pendulum.toml") {
        Ok(config) => {
            log::info!("loaded configuration from pendulum.toml");
            config
        }
        Err(ConfigError::Io(_)) => SimulationConfig::default(),
        Err(e) => {
            log::warn!("ignoring invalid pendulum.toml: {e}");
            SimulationConfig::default()
        }
    }
}

fn run() -> RenderResult<()> {
    let config = load_config();
    log::info!(
        "starting pendulum demo: L = {} m, g = {} m/s^2, {} frame slots",
        config.wire_length,
        config.gravity,
        config.frame_slots
    );

    let mut device = HeadlessDevice::new();
    let fence = Arc::new(HeadlessFence::new());
    let mut queue = HeadlessQueue::new(Arc::clone(&fence));
    let reset = Arc::new(AngleReset::new());

    let pendulum = Pendulum::new(
        Vec3::new(0.0, 6.0, -5.0),
        config.wire_length,
        config.initial_angle,
    )
    .with_gravity(config.gravity);

    let camera = OrbitCamera::pendulum_demo(800.0 / 600.0).with_limits(
        pendulum_engine::render::OrbitLimits {
            radius: (config.camera_radius_min, config.camera_radius_max),
            ..Default::default()
        },
    );

    let mut composer = FrameComposer::new(
        &mut device,
        config.frame_slots,
        pendulum,
        camera,
        (800.0, 600.0),
        Arc::clone(&reset),
    )?;

    let mut mouse = MouseTracker::new();
    let mut timer = Timer::new();

    for frame in 0..FRAME_COUNT {
        // Scripted input stands in for a UI surface.
        match frame {
            60 => {
                mouse.press(400.0, 300.0);
                composer.apply_camera_motion(mouse.drag(MouseButton::Left, 440.0, 290.0));
            }
            120 => {
                mouse.press(400.0, 300.0);
                composer.apply_camera_motion(mouse.drag(MouseButton::Right, 420.0, 300.0));
            }
            300 => reset.request(0.6),
            _ => {}
        }

        composer.compose_frame(&mut queue, fence.as_ref(), FRAME_DT, frame as f32 * FRAME_DT)?;
        timer.update();

        if frame % 60 == 0 {
            log::info!(
                "frame {frame}: angle {:.4} rad, velocity {:.4} rad/s",
                composer.pendulum().theta(),
                composer.pendulum().omega()
            );
        }
    }

    composer.flush(fence.as_ref())?;
    log::info!(
        "composed {FRAME_COUNT} frames in {:.3} s wall time",
        timer.total_time()
    );
    Ok(())
}

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        log::error!("fatal render error: {e}");
        std::process::exit(1);
    }
}
