//! Tile/world/screen coordinate mappings
//!
//! World space: X east, Y south, Z up. The tile grid is rotated +45° around Z
//! so that tile (0, 0) has its N corner at the world origin, the grid X axis
//! runs toward the E corner (down-right on screen) and the grid Y axis toward
//! the W corner (down-left on screen).

use std::f32::consts::FRAC_PI_4;

use serde::{Deserialize, Serialize};

use crate::core::events::{Observers, Subscription};
use crate::core::types::{Vec2, Vec3};

/// Rotation from tile-grid axes into world axes
pub const GRID_ROTATION: f32 = FRAC_PI_4;

/// Lowest camera elevation accepted (radians); keeps the ground plane invertible
pub const MIN_CAMERA_ANGLE: f32 = 5.0 * std::f32::consts::PI / 180.0;

/// Maps between tile-grid coordinates and world space
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TileLayout {
    /// Edge length of one tile in world units
    pub tile_size: f32,
}

impl TileLayout {
    pub fn new(tile_size: f32) -> Self {
        Self { tile_size }
    }

    /// World position of a (fractional) tile coordinate at `elevation`
    pub fn tile_to_world(&self, tile: Vec2, elevation: f32) -> Vec3 {
        let xy = Vec2::from_angle(GRID_ROTATION).rotate(tile * self.tile_size);
        xy.extend(elevation)
    }

    /// Fractional tile coordinate under a world position (Z is ignored)
    pub fn world_to_tile(&self, world: Vec3) -> Vec2 {
        Vec2::from_angle(-GRID_ROTATION).rotate(world.truncate()) / self.tile_size
    }

    /// World position of the centre of tile (x, y) at `elevation`
    pub fn tile_center(&self, x: u32, y: u32, elevation: f32) -> Vec3 {
        self.tile_to_world(Vec2::new(x as f32 + 0.5, y as f32 + 0.5), elevation)
    }
}

impl Default for TileLayout {
    fn default() -> Self {
        Self { tile_size: 32.0 }
    }
}

/// Projection family used by the renderer
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectionMode {
    /// Orthographic view tilted by the camera angle; heights foreshorten
    #[default]
    Axonometric,
    /// Ground plane foreshortened, heights drawn at full scale
    Oblique,
}

/// World-to-screen projection parameters
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Perspective {
    /// Camera elevation above the ground plane (radians)
    pub camera_angle: f32,
    pub mode: ProjectionMode,
}

impl Default for Perspective {
    fn default() -> Self {
        // 30° gives the classic 2:1 isometric diamond
        Self {
            camera_angle: 30.0_f32.to_radians(),
            mode: ProjectionMode::Axonometric,
        }
    }
}

impl Perspective {
    pub fn new(camera_angle: f32, mode: ProjectionMode) -> Self {
        Self {
            camera_angle: camera_angle.clamp(MIN_CAMERA_ANGLE, std::f32::consts::FRAC_PI_2),
            mode,
        }
    }

    /// Screen-space vertical scale of the ground plane and of heights
    fn factors(&self) -> (f32, f32) {
        let (sin, cos) = self.camera_angle.sin_cos();
        match self.mode {
            ProjectionMode::Axonometric => (sin, cos),
            ProjectionMode::Oblique => (sin, 1.0),
        }
    }

    /// Project a world position to screen space (Y down)
    pub fn world_to_screen(&self, world: Vec3) -> Vec2 {
        let (ground, height) = self.factors();
        Vec2::new(world.x, world.y * ground - world.z * height)
    }

    /// Inverse projection onto the horizontal plane at elevation `z`
    pub fn screen_to_ground(&self, screen: Vec2, z: f32) -> Vec3 {
        let (ground, height) = self.factors();
        Vec3::new(screen.x, (screen.y + z * height) / ground, z)
    }
}

/// Owns the active perspective and notifies subscribers when it changes
#[derive(Debug, Default)]
pub struct PerspectiveController {
    perspective: Perspective,
    observers: Observers<Perspective>,
}

impl PerspectiveController {
    pub fn new(perspective: Perspective) -> Self {
        Self {
            perspective,
            observers: Observers::new(),
        }
    }

    pub fn perspective(&self) -> Perspective {
        self.perspective
    }

    /// Register for perspective-change notifications
    pub fn subscribe(&mut self, callback: impl FnMut(&Perspective) + 'static) -> Subscription {
        self.observers.subscribe(callback)
    }

    pub fn unsubscribe(&mut self, subscription: Subscription) -> bool {
        self.observers.unsubscribe(subscription)
    }

    pub fn set_camera_angle(&mut self, camera_angle: f32) {
        self.apply(Perspective::new(camera_angle, self.perspective.mode));
    }

    pub fn set_mode(&mut self, mode: ProjectionMode) {
        self.apply(Perspective::new(self.perspective.camera_angle, mode));
    }

    fn apply(&mut self, next: Perspective) {
        if next == self.perspective {
            return;
        }
        log::debug!(
            "Perspective changed: {:.1}° {:?}",
            next.camera_angle.to_degrees(),
            next.mode
        );
        self.perspective = next;
        self.observers.notify(&next);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    const EPS: f32 = 1e-4;

    #[test]
    fn test_tile_axes_point_down_screen() {
        let layout = TileLayout::new(10.0);
        let east = layout.tile_to_world(Vec2::X, 0.0);
        let west = layout.tile_to_world(Vec2::Y, 0.0);
        assert!(east.x > 0.0 && east.y > 0.0);
        assert!(west.x < 0.0 && west.y > 0.0);
        assert!((east.truncate().length() - 10.0).abs() < EPS);
    }

    #[test]
    fn test_tile_world_inverse() {
        let layout = TileLayout::default();
        let tile = Vec2::new(3.25, 7.5);
        let world = layout.tile_to_world(tile, 12.0);
        assert_eq!(world.z, 12.0);
        assert!((layout.world_to_tile(world) - tile).length() < EPS);
    }

    #[test]
    fn test_screen_ground_inverse() {
        for mode in [ProjectionMode::Axonometric, ProjectionMode::Oblique] {
            let p = Perspective::new(0.6, mode);
            let world = Vec3::new(40.0, -12.0, 5.0);
            let back = p.screen_to_ground(p.world_to_screen(world), 5.0);
            assert!((back - world).length() < EPS, "{:?}", mode);
        }
    }

    #[test]
    fn test_higher_points_draw_higher() {
        let p = Perspective::default();
        let low = p.world_to_screen(Vec3::new(0.0, 0.0, 0.0));
        let high = p.world_to_screen(Vec3::new(0.0, 0.0, 10.0));
        assert!(high.y < low.y);
    }

    #[test]
    fn test_camera_angle_clamped() {
        let p = Perspective::new(0.0, ProjectionMode::Axonometric);
        assert!((p.camera_angle - MIN_CAMERA_ANGLE).abs() < EPS);
    }

    #[test]
    fn test_controller_notifies_on_change_only() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut controller = PerspectiveController::new(Perspective::default());
        let sink = Rc::clone(&seen);
        controller.subscribe(move |p| sink.borrow_mut().push(p.mode));

        controller.set_mode(ProjectionMode::Axonometric);
        assert!(seen.borrow().is_empty());

        controller.set_mode(ProjectionMode::Oblique);
        assert_eq!(*seen.borrow(), vec![ProjectionMode::Oblique]);
        assert_eq!(controller.perspective().mode, ProjectionMode::Oblique);
    }
}
