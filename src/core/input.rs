//! Pointer drag tracking for map panning
//!
//! One [`DragController`] is created per scene and passed to whatever pans
//! the view. It holds the drag, inertia and click-selection state that would
//! otherwise leak into module-level globals.

use glam::Vec2;

/// Pointer travel (screen px) under which a press/release counts as a click
pub const CLICK_THRESHOLD: f32 = 4.0;

/// Inertia decay rate (1/s)
pub const INERTIA_FRICTION: f32 = 6.0;

/// Speeds (px/s) below this stop inertial panning
const MIN_INERTIA_SPEED: f32 = 1.0;

/// Tracks pointer drag state and produces per-frame pan deltas
#[derive(Debug, Clone)]
pub struct DragController {
    /// Pointer currently held down
    pressed: bool,
    /// Position where the current press started
    press_origin: Vec2,
    /// Last known pointer position
    position: Vec2,
    /// Movement accumulated since the last update
    pending_delta: Vec2,
    /// Total distance travelled during the current press
    travel: f32,
    /// Pan velocity (px/s) used for inertia after release
    velocity: Vec2,
    /// Inertia decay rate (1/s)
    pub friction: f32,
}

impl DragController {
    /// Create a new controller with default friction
    pub fn new() -> Self {
        Self {
            pressed: false,
            press_origin: Vec2::ZERO,
            position: Vec2::ZERO,
            pending_delta: Vec2::ZERO,
            travel: 0.0,
            velocity: Vec2::ZERO,
            friction: INERTIA_FRICTION,
        }
    }

    /// Pointer pressed at `pos`. Cancels any running inertia.
    pub fn pointer_down(&mut self, pos: Vec2) {
        self.pressed = true;
        self.press_origin = pos;
        self.position = pos;
        self.pending_delta = Vec2::ZERO;
        self.travel = 0.0;
        self.velocity = Vec2::ZERO;
    }

    /// Pointer moved to `pos`
    pub fn pointer_move(&mut self, pos: Vec2) {
        if self.pressed {
            let delta = pos - self.position;
            self.pending_delta += delta;
            self.travel += delta.length();
        }
        self.position = pos;
    }

    /// Pointer released at `pos`
    ///
    /// Returns the press origin when the gesture was a click (selection)
    /// rather than a drag.
    pub fn pointer_up(&mut self, pos: Vec2) -> Option<Vec2> {
        if !self.pressed {
            return None;
        }
        self.pointer_move(pos);
        self.pressed = false;

        if self.travel < CLICK_THRESHOLD {
            self.velocity = Vec2::ZERO;
            Some(self.press_origin)
        } else {
            None
        }
    }

    /// Advance by `dt` seconds and return the pan delta for this frame
    pub fn update(&mut self, dt: f32) -> Vec2 {
        if self.pressed {
            let delta = std::mem::take(&mut self.pending_delta);
            if dt > 0.0 {
                // Smooth so a single jittery frame does not dominate the fling
                self.velocity = self.velocity.lerp(delta / dt, 0.5);
            }
            return delta;
        }

        let mut delta = std::mem::take(&mut self.pending_delta);
        if self.velocity.length_squared() < MIN_INERTIA_SPEED * MIN_INERTIA_SPEED {
            self.velocity = Vec2::ZERO;
            return delta;
        }
        delta += self.velocity * dt;
        self.velocity *= (-self.friction * dt).exp();
        delta
    }

    /// Check if the pointer is held down
    pub fn is_dragging(&self) -> bool {
        self.pressed
    }

    /// Current inertial pan velocity
    pub fn velocity(&self) -> Vec2 {
        self.velocity
    }

    /// Last known pointer position
    pub fn position(&self) -> Vec2 {
        self.position
    }
}

impl Default for DragController {
    fn default() -> Self {
        Self::new()
    }
}
