//! Battlefield simulation: live shells, target bodies and per-tick events
//!
//! Shells and targets are kept in id order and processed sequentially so a
//! run with the same seed and inputs replays exactly. Despawn requests are
//! queued and applied at tick boundaries, never while the shell list is
//! being walked.

use rand::SeedableRng;
use rand_pcg::Pcg32;

use crate::config::PhysicsConfig;
use crate::core::time::substeps;
use crate::core::types::Vec3;
use crate::physics::ballistics::{Projectile, ProjectileState, ShellSpec, StepOutcome};
use crate::physics::collision::sphere_to_sphere;
use crate::physics::solid::Solid;
use crate::terrain::query::Heightfield;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ProjectileId(pub u64);

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TargetId(pub u64);

/// Something that happened during a tick, in the order it happened
#[derive(Clone, Debug, PartialEq)]
pub enum SimEvent {
    /// Ground strike; `energy` is the splash in kg of TNT
    Impact { id: ProjectileId, position: Vec3, energy: f32 },
    /// The strike kept some of the shell's speed
    Bounce { id: ProjectileId, position: Vec3 },
    Rest { id: ProjectileId, position: Vec3 },
    /// Left the ground footprint and was destroyed
    OutOfBounds { id: ProjectileId },
    /// Removed from the battlefield
    Despawned { id: ProjectileId },
    /// Shell struck a target; `damage` is the exchanged impulse magnitude
    TargetHit { projectile: ProjectileId, target: TargetId, damage: f32 },
}

/// Body shells can strike
#[derive(Clone, Debug)]
pub struct Target {
    pub id: TargetId,
    pub solid: Solid,
    /// Collision radius (world units)
    pub radius: f32,
    /// Accumulated impulse taken from shells
    pub damage: f32,
}

#[derive(Clone, Debug)]
struct Shell {
    id: ProjectileId,
    projectile: Projectile,
}

pub struct Battlefield {
    config: PhysicsConfig,
    shells: Vec<Shell>,
    targets: Vec<Target>,
    rng: Pcg32,
    pending_despawn: Vec<ProjectileId>,
    next_projectile: u64,
    next_target: u64,
}

impl Battlefield {
    pub fn new(config: PhysicsConfig) -> Self {
        let rng = Pcg32::seed_from_u64(config.seed);
        Self {
            config,
            shells: Vec::new(),
            targets: Vec::new(),
            rng,
            pending_despawn: Vec::new(),
            next_projectile: 0,
            next_target: 0,
        }
    }

    pub fn config(&self) -> &PhysicsConfig {
        &self.config
    }

    /// Launch a shell; `speed` is in world units per second
    pub fn fire(&mut self, origin: Vec3, direction: Vec3, speed: f32, spec: &ShellSpec) -> ProjectileId {
        let id = ProjectileId(self.next_projectile);
        self.next_projectile += 1;
        let projectile = Projectile::launch(origin, direction, speed, spec, &self.config);
        log::debug!("Fired {:?} from {} at {:.1} u/s", id, origin, speed);
        self.shells.push(Shell { id, projectile });
        id
    }

    pub fn add_target(&mut self, solid: Solid, radius: f32) -> TargetId {
        let id = TargetId(self.next_target);
        self.next_target += 1;
        self.targets.push(Target {
            id,
            solid,
            radius,
            damage: 0.0,
        });
        id
    }

    pub fn remove_target(&mut self, id: TargetId) -> Option<Target> {
        let index = self.targets.iter().position(|t| t.id == id)?;
        Some(self.targets.remove(index))
    }

    /// Queue a shell for removal at the next tick boundary
    pub fn despawn(&mut self, id: ProjectileId) {
        if !self.pending_despawn.contains(&id) {
            self.pending_despawn.push(id);
        }
    }

    pub fn projectile(&self, id: ProjectileId) -> Option<&Projectile> {
        self.shells.iter().find(|s| s.id == id).map(|s| &s.projectile)
    }

    /// Live shells in id order
    pub fn projectiles(&self) -> impl Iterator<Item = (ProjectileId, &Projectile)> {
        self.shells.iter().map(|s| (s.id, &s.projectile))
    }

    pub fn target(&self, id: TargetId) -> Option<&Target> {
        self.targets.iter().find(|t| t.id == id)
    }

    pub fn targets(&self) -> &[Target] {
        &self.targets
    }

    pub fn projectile_count(&self) -> usize {
        self.shells.len()
    }

    /// Advance every shell by `dt` seconds
    ///
    /// Shells for which `is_visible` holds are sub-stepped at the fine
    /// interval, the rest at the coarse one.
    pub fn tick<H, V>(&mut self, dt: f32, ground: &H, is_visible: V) -> Vec<SimEvent>
    where
        H: Heightfield,
        V: Fn(Vec3) -> bool,
    {
        let mut events = Vec::new();
        self.flush_despawns(&mut events);

        let config = &self.config;
        for shell in &mut self.shells {
            let id = shell.id;
            let projectile = &mut shell.projectile;

            match projectile.state() {
                ProjectileState::Destroyed => continue,
                ProjectileState::AtRest => {
                    if projectile.linger(dt) >= config.rest_linger {
                        self.pending_despawn.push(id);
                    }
                    continue;
                }
                ProjectileState::Flying => {}
            }

            let max_step = if is_visible(projectile.position()) {
                config.visible_step
            } else {
                config.hidden_step
            };

            for step in substeps(dt, max_step) {
                match projectile.step(step, ground, &mut self.rng, config) {
                    StepOutcome::Impact { energy, bounced } => {
                        let position = projectile.position();
                        events.push(SimEvent::Impact { id, position, energy });
                        if bounced {
                            events.push(SimEvent::Bounce { id, position });
                        }
                    }
                    StepOutcome::Rested => {
                        events.push(SimEvent::Rest {
                            id,
                            position: projectile.position(),
                        });
                        break;
                    }
                    StepOutcome::Flying | StepOutcome::Idle => {}
                }

                if !ground.contains(projectile.position()) {
                    log::warn!("{:?} left the battlefield at {}", id, projectile.position());
                    projectile.destroy();
                    events.push(SimEvent::OutOfBounds { id });
                    self.pending_despawn.push(id);
                    break;
                }

                for target in &mut self.targets {
                    let reach = projectile.radius + target.radius;
                    let contact = sphere_to_sphere(&mut projectile.solid, &mut target.solid, reach * reach, config.restitution);
                    if let Some(contact) = contact {
                        let damage = contact.magnitude();
                        target.damage += damage;
                        events.push(SimEvent::TargetHit {
                            projectile: id,
                            target: target.id,
                            damage,
                        });
                    }
                }
            }
        }

        self.flush_despawns(&mut events);
        events
    }

    fn flush_despawns(&mut self, events: &mut Vec<SimEvent>) {
        if self.pending_despawn.is_empty() {
            return;
        }
        let pending = std::mem::take(&mut self.pending_despawn);
        self.shells.retain(|s| !pending.contains(&s.id));
        for id in pending {
            events.push(SimEvent::Despawned { id });
        }
    }
}
