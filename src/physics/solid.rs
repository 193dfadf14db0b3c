//! Physics-only body record shared by projectiles and targets

use crate::core::types::Vec3;

/// Point mass with a velocity
///
/// `inv_mass` is zero for immovable bodies.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Solid {
    pub position: Vec3,
    pub velocity: Vec3,
    pub mass: f32,
    pub inv_mass: f32,
}

impl Solid {
    /// Dynamic body; a non-positive or non-finite mass makes it immovable
    pub fn new(position: Vec3, velocity: Vec3, mass: f32) -> Self {
        let inv_mass = if mass > 0.0 && mass.is_finite() { 1.0 / mass } else { 0.0 };
        Self {
            position,
            velocity,
            mass,
            inv_mass,
        }
    }

    /// Immovable body at rest
    pub fn fixed(position: Vec3) -> Self {
        Self {
            position,
            velocity: Vec3::ZERO,
            mass: f32::INFINITY,
            inv_mass: 0.0,
        }
    }

    pub fn is_static(&self) -> bool {
        self.inv_mass == 0.0
    }

    /// Linear momentum, zero for immovable bodies
    pub fn momentum(&self) -> Vec3 {
        if self.is_static() {
            Vec3::ZERO
        } else {
            self.velocity * self.mass
        }
    }

    pub fn speed(&self) -> f32 {
        self.velocity.length()
    }
}
