//! Projectile ballistics and collision

pub mod solid;
pub use solid::Solid;

pub mod ballistics;
pub use ballistics::{Projectile, ProjectileState, ShellSpec, StepOutcome};

pub mod collision;
pub use collision::{SphereContact, TNT_JOULES_PER_KG, sphere_to_ground, sphere_to_sphere};

pub mod world;
pub use world::{Battlefield, ProjectileId, SimEvent, Target, TargetId};
