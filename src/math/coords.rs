//! World position with a lazily recomputed screen projection

use crate::core::types::{Vec2, Vec3};
use crate::math::projection::Perspective;

/// A world position that caches its screen-space projection
///
/// Mutations mark the cached value stale; [`ScreenCoord::screen`] recomputes
/// it on the next read.
#[derive(Clone, Debug)]
pub struct ScreenCoord {
    world: Vec3,
    perspective: Perspective,
    screen: Vec2,
    dirty: bool,
}

impl ScreenCoord {
    pub fn new(world: Vec3, perspective: Perspective) -> Self {
        Self {
            world,
            perspective,
            screen: Vec2::ZERO,
            dirty: true,
        }
    }

    pub fn world(&self) -> Vec3 {
        self.world
    }

    pub fn set_world(&mut self, world: Vec3) {
        if world != self.world {
            self.world = world;
            self.dirty = true;
        }
    }

    pub fn translate(&mut self, delta: Vec3) {
        self.set_world(self.world + delta);
    }

    /// Swap in a new projection, e.g. from a perspective-change notification
    pub fn set_perspective(&mut self, perspective: Perspective) {
        if perspective != self.perspective {
            self.perspective = perspective;
            self.dirty = true;
        }
    }

    pub fn is_stale(&self) -> bool {
        self.dirty
    }

    /// Screen position, recomputed if any input changed since the last read
    pub fn screen(&mut self) -> Vec2 {
        if self.dirty {
            self.screen = self.perspective.world_to_screen(self.world);
            self.dirty = false;
        }
        self.screen
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::projection::ProjectionMode;

    #[test]
    fn test_lazy_recompute() {
        let perspective = Perspective::default();
        let mut coord = ScreenCoord::new(Vec3::new(1.0, 2.0, 3.0), perspective);
        assert!(coord.is_stale());

        let first = coord.screen();
        assert!(!coord.is_stale());
        assert_eq!(first, perspective.world_to_screen(Vec3::new(1.0, 2.0, 3.0)));

        coord.translate(Vec3::new(0.0, 0.0, 1.0));
        assert!(coord.is_stale());
        let second = coord.screen();
        assert!(second.y < first.y);
    }

    #[test]
    fn test_same_value_keeps_cache() {
        let mut coord = ScreenCoord::new(Vec3::ZERO, Perspective::default());
        coord.screen();
        coord.set_world(Vec3::ZERO);
        assert!(!coord.is_stale());
    }

    #[test]
    fn test_perspective_change_invalidates() {
        let mut coord = ScreenCoord::new(Vec3::new(0.0, 0.0, 10.0), Perspective::default());
        let axon = coord.screen();
        coord.set_perspective(Perspective::new(30.0_f32.to_radians(), ProjectionMode::Oblique));
        assert!(coord.is_stale());
        assert_ne!(coord.screen(), axon);
    }
}
