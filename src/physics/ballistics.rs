//! Projectile flight: drag, gravity and ground contact
//!
//! Positions and velocities are in world units; forces are evaluated in SI
//! units through `PhysicsConfig::meters_per_unit`. Drag and gravity are
//! folded into the velocity once per drag interval over the time
//! accumulated since the last update, while the position advances every
//! sub-step (explicit Euler).

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::config::PhysicsConfig;
use crate::core::types::Vec3;
use crate::physics::collision::{ground_penetration, sphere_to_ground};
use crate::physics::solid::Solid;
use crate::terrain::query::Heightfield;

/// Sphere drag coefficient
pub const SPHERE_DRAG_COEFFICIENT: f32 = 0.47;

/// Physical description of a shell
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShellSpec {
    /// Mass (kg)
    pub mass: f32,
    /// Radius (m)
    pub radius: f32,
    pub drag_coefficient: f32,
}

impl Default for ShellSpec {
    fn default() -> Self {
        Self {
            mass: 5.0,
            radius: 0.075,
            drag_coefficient: SPHERE_DRAG_COEFFICIENT,
        }
    }
}

impl ShellSpec {
    /// `0.5 * rho * Cd * A`; drag force is this times speed squared
    pub fn drag_constant(&self, air_density: f32) -> f32 {
        let area = std::f32::consts::PI * self.radius * self.radius;
        0.5 * air_density * self.drag_coefficient * area
    }
}

/// Flying -> AtRest -> Destroyed
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProjectileState {
    Flying,
    /// Stopped on the ground with zero velocity
    AtRest,
    Destroyed,
}

/// Result of one integration step
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum StepOutcome {
    /// Not flying; nothing was integrated
    Idle,
    Flying,
    /// Came to rest during this step
    Rested,
    /// Struck the ground; `energy` is the splash in kg of TNT
    Impact { energy: f32, bounced: bool },
}

#[derive(Clone, Debug)]
pub struct Projectile {
    pub solid: Solid,
    /// Collision radius (world units)
    pub radius: f32,
    drag_constant: f32,
    drag_elapsed: f32,
    rest_elapsed: f32,
    state: ProjectileState,
}

impl Projectile {
    /// Launch from `origin` along `direction` at `speed` world units per second
    pub fn launch(origin: Vec3, direction: Vec3, speed: f32, spec: &ShellSpec, config: &PhysicsConfig) -> Self {
        let velocity = direction.normalize_or_zero() * speed;
        Self {
            solid: Solid::new(origin, velocity, spec.mass),
            radius: spec.radius / config.meters_per_unit,
            drag_constant: spec.drag_constant(config.air_density),
            drag_elapsed: 0.0,
            rest_elapsed: 0.0,
            state: ProjectileState::Flying,
        }
    }

    pub fn state(&self) -> ProjectileState {
        self.state
    }

    pub fn is_flying(&self) -> bool {
        self.state == ProjectileState::Flying
    }

    pub fn position(&self) -> Vec3 {
        self.solid.position
    }

    pub fn destroy(&mut self) {
        self.state = ProjectileState::Destroyed;
    }

    /// Add `dt` to the time spent at rest and return the total
    pub fn linger(&mut self, dt: f32) -> f32 {
        if self.state == ProjectileState::AtRest {
            self.rest_elapsed += dt;
        }
        self.rest_elapsed
    }

    /// Advance one sub-step of `dt` seconds
    ///
    /// Ground hardness is only drawn from `rng` when the shell is below the
    /// surface.
    pub fn step<H: Heightfield, R: Rng + ?Sized>(
        &mut self,
        dt: f32,
        ground: &H,
        rng: &mut R,
        config: &PhysicsConfig,
    ) -> StepOutcome {
        if self.state != ProjectileState::Flying {
            return StepOutcome::Idle;
        }

        if self.solid.velocity.length_squared() < config.rest_speed_sq {
            self.solid.velocity = Vec3::ZERO;
            self.solid.position.z = ground.elevation_at(self.solid.position).unwrap_or(0.0);
            self.state = ProjectileState::AtRest;
            return StepOutcome::Rested;
        }

        self.drag_elapsed += dt;
        // Tolerance absorbs sub-step accumulation error
        if self.drag_elapsed >= config.drag_interval - 1e-6 {
            let elapsed = std::mem::take(&mut self.drag_elapsed);
            self.apply_forces(elapsed, config);
        }

        self.solid.position += self.solid.velocity * dt;

        if ground_penetration(&self.solid, ground) > config.collision_epsilon {
            let hardness = ground.hardness_at(self.solid.position, rng);
            if let Some(energy) = sphere_to_ground(&mut self.solid, ground, hardness, config) {
                let bounced = self.solid.velocity != Vec3::ZERO;
                return StepOutcome::Impact { energy, bounced };
            }
        }
        StepOutcome::Flying
    }

    /// Drag opposite the velocity and gravity on Z, over `elapsed` seconds
    fn apply_forces(&mut self, elapsed: f32, config: &PhysicsConfig) {
        let mpu = config.meters_per_unit;
        let velocity = self.solid.velocity;
        let speed = velocity.length();
        if speed > 0.0 {
            let speed_mps = speed * mpu;
            let force = self.drag_constant * speed_mps * speed_mps;
            let decel = force * self.solid.inv_mass / mpu * elapsed;
            // Drag stops the shell at most, never reverses it
            self.solid.velocity -= velocity / speed * decel.min(speed);
        }
        self.solid.velocity.z -= config.gravity / mpu * elapsed;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::test_support::FlatGround;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn fly(p: &mut Projectile, seconds: f32, ground: &FlatGround, config: &PhysicsConfig) -> Vec<StepOutcome> {
        let mut rng = Pcg32::seed_from_u64(3);
        let steps = (seconds / config.visible_step).round() as usize;
        (0..steps)
            .map(|_| p.step(config.visible_step, ground, &mut rng, config))
            .collect()
    }

    #[test]
    fn test_drag_constant() {
        let spec = ShellSpec {
            mass: 1.0,
            radius: 0.1,
            drag_coefficient: 0.5,
        };
        let expected = 0.5 * 1.225 * 0.5 * std::f32::consts::PI * 0.01;
        assert!((spec.drag_constant(1.225) - expected).abs() < 1e-7);
    }

    #[test]
    fn test_gravity_only() {
        let config = PhysicsConfig::default();
        let spec = ShellSpec {
            drag_coefficient: 0.0,
            ..Default::default()
        };
        let ground = FlatGround::new();
        let mut p = Projectile::launch(Vec3::new(0.0, 0.0, 10_000.0), Vec3::X, 100.0, &spec, &config);
        fly(&mut p, 1.0, &ground, &config);

        let expected_vz = -config.gravity / config.meters_per_unit;
        assert!((p.solid.velocity.z - expected_vz).abs() < 0.05, "{}", p.solid.velocity.z);
        assert!((p.solid.velocity.x - 100.0).abs() < 1e-4);
        assert!((p.position().x - 100.0).abs() < 0.1);
    }

    #[test]
    fn test_drag_slows_without_reversing() {
        let config = PhysicsConfig {
            gravity: 0.0,
            ..Default::default()
        };
        let spec = ShellSpec {
            mass: 1.0,
            radius: 0.1,
            ..Default::default()
        };
        let ground = FlatGround::new();
        let mut p = Projectile::launch(Vec3::new(0.0, 0.0, 100.0), Vec3::new(1.0, 1.0, 0.0), 500.0, &spec, &config);

        let mut last = p.solid.speed();
        for _ in 0..40 {
            fly(&mut p, config.drag_interval, &ground, &config);
            let speed = p.solid.speed();
            assert!(speed <= last);
            last = speed;
            if p.is_flying() {
                assert!(p.solid.velocity.x >= 0.0 && p.solid.velocity.y >= 0.0);
            }
        }
        assert!(last < 500.0);
    }

    #[test]
    fn test_drag_only_updates_on_interval() {
        let config = PhysicsConfig::default();
        let ground = FlatGround::new();
        let mut rng = Pcg32::seed_from_u64(0);
        let mut p = Projectile::launch(Vec3::new(0.0, 0.0, 500.0), Vec3::X, 300.0, &ShellSpec::default(), &config);
        let v0 = p.solid.velocity;

        p.step(config.visible_step, &ground, &mut rng, &config);
        assert_eq!(p.solid.velocity, v0);

        let steps = (config.drag_interval / config.visible_step).round() as usize;
        for _ in 1..steps {
            p.step(config.visible_step, &ground, &mut rng, &config);
        }
        assert_ne!(p.solid.velocity, v0);
    }

    #[test]
    fn test_rest_snaps_to_ground() {
        let config = PhysicsConfig::default();
        let ground = FlatGround::at(4.0);
        let mut rng = Pcg32::seed_from_u64(0);
        let mut p = Projectile::launch(Vec3::new(1.0, 1.0, 9.0), Vec3::X, 0.05, &ShellSpec::default(), &config);

        assert_eq!(p.step(0.01, &ground, &mut rng, &config), StepOutcome::Rested);
        assert_eq!(p.state(), ProjectileState::AtRest);
        assert_eq!(p.solid.velocity, Vec3::ZERO);
        assert_eq!(p.position().z, 4.0);

        // At rest nothing moves
        assert_eq!(p.step(0.01, &ground, &mut rng, &config), StepOutcome::Idle);
        assert_eq!(p.linger(0.5), 0.5);
        assert_eq!(p.linger(0.25), 0.75);

        p.destroy();
        assert_eq!(p.state(), ProjectileState::Destroyed);
    }

    #[test]
    fn test_shot_lands_and_settles() {
        let config = PhysicsConfig::default();
        let ground = FlatGround::new();
        let direction = Vec3::new(1.0, 0.0, 1.0);
        let mut p = Projectile::launch(Vec3::new(0.0, 0.0, 1.0), direction, 60.0, &ShellSpec::default(), &config);

        let outcomes = fly(&mut p, 30.0, &ground, &config);
        let first_impact = outcomes
            .iter()
            .position(|o| matches!(o, StepOutcome::Impact { .. }))
            .unwrap();
        assert!(outcomes[..first_impact].iter().all(|o| *o == StepOutcome::Flying));
        assert!(outcomes.contains(&StepOutcome::Rested));
        assert_eq!(p.state(), ProjectileState::AtRest);
        assert!(p.position().z.abs() < 1e-3);
        assert!(p.position().x > 0.0);

        for o in outcomes {
            if let StepOutcome::Impact { energy, .. } = o {
                assert!(energy >= 0.0);
            }
        }
    }
}
