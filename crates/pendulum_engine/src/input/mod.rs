//! Asynchronous external input for the render thread
//!
//! Two inputs reach the frame loop from outside: a "set initial angle"
//! request raised by a UI surface that may live on another thread, and
//! mouse drags steering the orbit camera. Both are modeled here so the
//! composer only ever reads plain values at the start of a frame.

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

/// Cross-thread "set initial angle" signal
///
/// Single producer (the UI surface), single consumer (the render
/// thread). The payload is published with release ordering before the
/// flag is raised, and the consumer reads it after an acquire load of
/// the flag, so a torn or stale angle is never observed.
#[derive(Debug, Default)]
pub struct AngleReset {
    pending: AtomicBool,
    angle_bits: AtomicU32,
}

impl AngleReset {
    /// Create a signal with no pending request
    pub fn new() -> Self {
        Self::default()
    }

    /// Request a pendulum reset to `angle` radians
    ///
    /// Called from the UI thread. A second request before the render
    /// thread consumes the first simply overwrites the payload; only
    /// the latest angle matters.
    pub fn request(&self, angle: f32) {
        self.angle_bits.store(angle.to_bits(), Ordering::Release);
        self.pending.store(true, Ordering::Release);
    }

    /// Consume the pending request, if any
    ///
    /// Called once per frame by the render thread.
    pub fn take(&self) -> Option<f32> {
        if self.pending.swap(false, Ordering::Acquire) {
            Some(f32::from_bits(self.angle_bits.load(Ordering::Acquire)))
        } else {
            None
        }
    }
}

/// Mouse button relevant to camera control
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseButton {
    /// Left button: orbit
    Left,
    /// Right button: zoom
    Right,
}

/// Camera motion produced by a mouse drag
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CameraMotion {
    /// Yaw/pitch deltas in radians
    Orbit {
        /// Yaw delta
        yaw: f32,
        /// Pitch delta
        pitch: f32,
    },
    /// Radius delta in world units
    Zoom(f32),
}

/// Tracks the last cursor position and converts drags to camera motion
///
/// Left drags orbit at a quarter degree per pixel; right drags zoom at
/// 0.2 units per pixel.
#[derive(Debug, Default)]
pub struct MouseTracker {
    last_x: f32,
    last_y: f32,
}

impl MouseTracker {
    /// Create a tracker with the cursor at the origin
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the cursor position at button press
    pub fn press(&mut self, x: f32, y: f32) {
        self.last_x = x;
        self.last_y = y;
    }

    /// Process cursor movement while `button` is held
    pub fn drag(&mut self, button: MouseButton, x: f32, y: f32) -> CameraMotion {
        let dx = x - self.last_x;
        let dy = y - self.last_y;
        self.last_x = x;
        self.last_y = y;

        match button {
            MouseButton::Left => CameraMotion::Orbit {
                yaw: (0.25 * dx).to_radians(),
                pitch: (0.25 * dy).to_radians(),
            },
            MouseButton::Right => CameraMotion::Zoom(0.2 * dx - 0.2 * dy),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_reset_take_consumes_once() {
        let reset = AngleReset::new();
        assert_eq!(reset.take(), None);

        reset.request(0.3);
        assert_eq!(reset.take(), Some(0.3));
        assert_eq!(reset.take(), None);
    }

    #[test]
    fn test_reset_latest_request_wins() {
        let reset = AngleReset::new();
        reset.request(0.1);
        reset.request(0.9);
        assert_eq!(reset.take(), Some(0.9));
    }

    #[test]
    fn test_reset_is_readable_across_threads() {
        use std::sync::Arc;

        let reset = Arc::new(AngleReset::new());
        let producer = Arc::clone(&reset);
        let handle = std::thread::spawn(move || producer.request(0.5));
        handle.join().unwrap();

        assert_eq!(reset.take(), Some(0.5));
    }

    #[test]
    fn test_left_drag_orbits_quarter_degree_per_pixel() {
        let mut tracker = MouseTracker::new();
        tracker.press(100.0, 100.0);

        match tracker.drag(MouseButton::Left, 104.0, 100.0) {
            CameraMotion::Orbit { yaw, pitch } => {
                assert_relative_eq!(yaw, 1.0_f32.to_radians(), epsilon = 1e-6);
                assert_relative_eq!(pitch, 0.0, epsilon = 1e-6);
            }
            other => panic!("expected orbit, got {other:?}"),
        }
    }

    #[test]
    fn test_right_drag_zooms() {
        let mut tracker = MouseTracker::new();
        tracker.press(0.0, 0.0);

        match tracker.drag(MouseButton::Right, 10.0, 5.0) {
            CameraMotion::Zoom(delta) => assert_relative_eq!(delta, 1.0, epsilon = 1e-6),
            other => panic!("expected zoom, got {other:?}"),
        }
    }
}
