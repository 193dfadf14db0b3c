//! Sphere-vs-ground and sphere-vs-sphere contact resolution

use crate::config::PhysicsConfig;
use crate::core::types::Vec3;
use crate::math::vector::{normalize_or, reflect};
use crate::physics::solid::Solid;
use crate::terrain::query::Heightfield;

/// Explosive energy of one kilogram of TNT (J)
pub const TNT_JOULES_PER_KG: f32 = 4.184e6;

/// Squared distance and relative approach speed under which a pair is skipped
pub const SPHERE_EPSILON: f32 = 1e-4;

/// Combined inverse mass under which both bodies count as immovable
const MIN_TOTAL_INV_MASS: f32 = 0.0001;

/// Depth of `solid` below the ground surface; missing ground reads as level 0
pub fn ground_penetration<H: Heightfield>(solid: &Solid, ground: &H) -> f32 {
    ground.elevation_at(solid.position).unwrap_or(0.0) - solid.position.z
}

/// Resolve a body sunk into the ground
///
/// Returns `None` when the body is above the surface (within the collision
/// epsilon). Otherwise the body is pushed out along the surface normal, its
/// velocity is replaced by the bounce, and the splash energy in kilograms of
/// TNT is returned. `hardness` runs from 0 (soft, bounces straight up the
/// normal) to 1 (mirror reflection).
pub fn sphere_to_ground<H: Heightfield>(
    solid: &mut Solid,
    ground: &H,
    hardness: f32,
    config: &PhysicsConfig,
) -> Option<f32> {
    let depth = ground_penetration(solid, ground);
    if depth <= config.collision_epsilon {
        return None;
    }

    let normal = ground.normal_at(solid.position).unwrap_or(Vec3::Z);
    let hardness = hardness.clamp(0.0, 1.0);
    let velocity = solid.velocity;
    let speed = velocity.length();

    solid.position += normal * (depth + config.collision_epsilon);

    if speed <= f32::EPSILON {
        solid.velocity = Vec3::ZERO;
        return Some(0.0);
    }

    let cos_impact = -velocity.dot(normal) / speed;
    let parallel_factor = (1.0 - cos_impact).clamp(0.0, 1.0);
    let speed_mps = speed * config.meters_per_unit;
    let fast_factor = (speed_mps / config.max_bounce_speed).clamp(0.0, 1.0);
    let bounce_potential = parallel_factor * fast_factor;

    let mut bounce = hardness * bounce_potential;
    if bounce < config.min_bounce {
        bounce = 0.0;
    }

    let explosion = 1.0 - bounce;
    let mass = if solid.mass.is_finite() { solid.mass.max(0.0) } else { 0.0 };
    let energy = explosion * 0.5 * mass * speed_mps * speed_mps / TNT_JOULES_PER_KG;

    let soft = normal * speed;
    let mirror = reflect(velocity, normal);
    let direction = normalize_or(soft.lerp(mirror, hardness), normal);
    solid.velocity = direction * speed * bounce;

    Some(energy)
}

/// Impulse exchanged by two touching spheres
///
/// `axis` is the unnormalized separation from the first body to the
/// second; the impulse along it is `axis * scale`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SphereContact {
    pub axis: Vec3,
    pub scale: f32,
}

impl SphereContact {
    /// Impulse vector applied to the second body (the first receives its negation)
    pub fn impulse(&self) -> Vec3 {
        self.axis * self.scale
    }

    /// Impulse magnitude; the only place a square root is taken
    pub fn magnitude(&self) -> f32 {
        self.axis.length() * self.scale.abs()
    }
}

/// Exchange a restitution impulse between two spheres
///
/// `radius_sq` is the squared sum of the two radii. Pairs that do not
/// touch, that are already separating, that sit on the same point, or that
/// are both immovable are left alone and return `None`.
pub fn sphere_to_sphere(
    a: &mut Solid,
    b: &mut Solid,
    radius_sq: f32,
    restitution: f32,
) -> Option<SphereContact> {
    let axis = b.position - a.position;
    let dist_sq = axis.length_squared();
    if dist_sq >= radius_sq || dist_sq < SPHERE_EPSILON {
        return None;
    }

    let approach = (b.velocity - a.velocity).dot(axis);
    if approach >= -SPHERE_EPSILON {
        return None;
    }

    let total_inv_mass = a.inv_mass + b.inv_mass;
    if total_inv_mass < MIN_TOTAL_INV_MASS {
        return None;
    }

    let scale = -(1.0 + restitution) * approach / (dist_sq * total_inv_mass);
    a.velocity -= axis * (scale * a.inv_mass);
    b.velocity += axis * (scale * b.inv_mass);

    Some(SphereContact { axis, scale })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::test_support::FlatGround;

    fn approx(a: f32, b: f32, tol: f32) -> bool {
        (a - b).abs() <= tol
    }

    #[test]
    fn test_above_ground_is_no_collision() {
        let ground = FlatGround::new();
        let config = PhysicsConfig::default();
        let mut s = Solid::new(Vec3::new(0.0, 0.0, 1.0), Vec3::new(5.0, 0.0, -5.0), 1.0);
        assert_eq!(sphere_to_ground(&mut s, &ground, 0.5, &config), None);

        // Within epsilon of the surface
        s.position.z = -config.collision_epsilon * 0.5;
        assert_eq!(sphere_to_ground(&mut s, &ground, 0.5, &config), None);
        assert_eq!(s.velocity, Vec3::new(5.0, 0.0, -5.0));
    }

    #[test]
    fn test_grazing_steel_bounce_keeps_speed() {
        let ground = FlatGround::new();
        let config = PhysicsConfig::default();
        let before = Vec3::new(1000.0, 0.0, -1.0);
        let mut s = Solid::new(Vec3::new(0.0, 0.0, -0.5), before, 2.0);

        let energy = sphere_to_ground(&mut s, &ground, 1.0, &config).unwrap();
        assert!(energy >= 0.0);

        let after = s.velocity;
        let ratio = after.length() / before.length();
        assert!(approx(ratio, 1.0, 2e-3), "ratio {}", ratio);
        assert!(after.z > 0.0);
        assert!(approx(after.x, before.x, 2.0));
        assert!(s.position.z > 0.0);
    }

    #[test]
    fn test_head_on_impact_is_all_splash() {
        let ground = FlatGround::new();
        let config = PhysicsConfig::default();
        let mut s = Solid::new(Vec3::new(0.0, 0.0, -1.0), Vec3::new(0.0, 0.0, -200.0), 10.0);

        let energy = sphere_to_ground(&mut s, &ground, 1.0, &config).unwrap();
        let speed_mps = 200.0 * config.meters_per_unit;
        let expected = 0.5 * 10.0 * speed_mps * speed_mps / TNT_JOULES_PER_KG;
        assert!(approx(energy, expected, 1e-6));
        assert_eq!(s.velocity, Vec3::ZERO);
        // Pushed out by depth + epsilon
        assert!(approx(s.position.z, config.collision_epsilon, 1e-5));
    }

    #[test]
    fn test_soft_ground_bounces_along_normal() {
        let ground = FlatGround::new();
        let config = PhysicsConfig::default();
        let mut s = Solid::new(Vec3::new(0.0, 0.0, -0.1), Vec3::new(1000.0, 0.0, -1.0), 1.0);

        // Hardness 0 gives zero bounce and a pure splash
        sphere_to_ground(&mut s, &ground, 0.0, &config).unwrap();
        assert_eq!(s.velocity, Vec3::ZERO);

        // Half hardness blends toward the normal
        let mut s = Solid::new(Vec3::new(0.0, 0.0, -0.1), Vec3::new(1000.0, 0.0, -1.0), 1.0);
        sphere_to_ground(&mut s, &ground, 0.5, &config).unwrap();
        let d = s.velocity.normalize();
        assert!(d.z > 0.5 && d.x > 0.5, "{}", d);
    }

    #[test]
    fn test_weak_bounce_is_zeroed() {
        let ground = FlatGround::new();
        let config = PhysicsConfig::default();
        // Slow grazing shot: fast factor far below the minimum bounce
        let mut s = Solid::new(Vec3::new(0.0, 0.0, -0.1), Vec3::new(10.0, 0.0, -0.1), 1.0);
        let energy = sphere_to_ground(&mut s, &ground, 1.0, &config).unwrap();
        assert_eq!(s.velocity, Vec3::ZERO);
        assert!(energy > 0.0);
    }

    #[test]
    fn test_energy_never_negative() {
        let ground = FlatGround::new();
        let config = PhysicsConfig::default();
        for speed in [0.0_f32, 0.5, 10.0, 300.0, 800.0, 5000.0] {
            for mass in [0.0_f32, 0.1, 1.0, 50.0] {
                for hardness in [0.0_f32, 0.3, 0.7, 1.0, 1.5] {
                    for dir in [Vec3::new(1.0, 0.0, -0.01), Vec3::new(0.3, 0.4, -1.0), -Vec3::Z, Vec3::X] {
                        let mut s = Solid::new(Vec3::new(1.0, 2.0, -0.2), dir.normalize() * speed, mass);
                        match sphere_to_ground(&mut s, &ground, hardness, &config) {
                            Some(e) => assert!(e.is_finite() && e >= 0.0, "{} {} {} {}", speed, mass, hardness, e),
                            None => panic!("expected contact"),
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn test_off_map_reads_as_level_zero() {
        let ground = FlatGround::new().with_extent(1.0);
        let config = PhysicsConfig::default();
        let mut s = Solid::new(Vec3::new(50.0, 0.0, -2.0), Vec3::new(0.0, 0.0, -50.0), 1.0);
        assert!(sphere_to_ground(&mut s, &ground, 0.5, &config).is_some());
        assert!(s.position.z > 0.0);
    }

    #[test]
    fn test_sphere_momentum_conserved() {
        let mut a = Solid::new(Vec3::ZERO, Vec3::new(3.0, 1.0, 0.0), 2.0);
        let mut b = Solid::new(Vec3::new(1.0, 0.2, 0.0), Vec3::new(-1.0, 0.0, 0.5), 5.0);
        let before = a.momentum() + b.momentum();
        let energy_before = 0.5 * (a.mass * a.velocity.length_squared() + b.mass * b.velocity.length_squared());

        let contact = sphere_to_sphere(&mut a, &mut b, 1.5 * 1.5, 1.0).unwrap();
        let after = a.momentum() + b.momentum();
        assert!((before - after).length() < 1e-4, "{} vs {}", before, after);

        let energy_after = 0.5 * (a.mass * a.velocity.length_squared() + b.mass * b.velocity.length_squared());
        assert!(approx(energy_before, energy_after, 1e-3));
        assert!(contact.magnitude() > 0.0);
        // The second body gained exactly the reported impulse
        let b_before = Vec3::new(-5.0, 0.0, 2.5);
        assert!((b.momentum() - b_before - contact.impulse()).length() < 1e-4);
    }

    #[test]
    fn test_equal_mass_head_on_swaps_velocities() {
        let mut a = Solid::new(Vec3::ZERO, Vec3::X, 1.0);
        let mut b = Solid::new(Vec3::new(0.5, 0.0, 0.0), Vec3::ZERO, 1.0);
        sphere_to_sphere(&mut a, &mut b, 1.0, 1.0).unwrap();
        assert!((a.velocity - Vec3::ZERO).length() < 1e-5);
        assert!((b.velocity - Vec3::X).length() < 1e-5);
    }

    #[test]
    fn test_sphere_skips() {
        // Apart
        let mut a = Solid::new(Vec3::ZERO, Vec3::X, 1.0);
        let mut b = Solid::new(Vec3::new(3.0, 0.0, 0.0), Vec3::ZERO, 1.0);
        assert!(sphere_to_sphere(&mut a, &mut b, 1.0, 1.0).is_none());

        // Separating
        let mut a = Solid::new(Vec3::ZERO, -Vec3::X, 1.0);
        let mut b = Solid::new(Vec3::new(0.5, 0.0, 0.0), Vec3::ZERO, 1.0);
        assert!(sphere_to_sphere(&mut a, &mut b, 1.0, 1.0).is_none());
        assert_eq!(a.velocity, -Vec3::X);

        // Both immovable
        let mut a = Solid::fixed(Vec3::ZERO);
        let mut b = Solid::fixed(Vec3::new(0.5, 0.0, 0.0));
        a.velocity = Vec3::X;
        assert!(sphere_to_sphere(&mut a, &mut b, 1.0, 1.0).is_none());

        // Coincident
        let mut a = Solid::new(Vec3::ZERO, Vec3::X, 1.0);
        let mut b = Solid::new(Vec3::ZERO, Vec3::ZERO, 1.0);
        assert!(sphere_to_sphere(&mut a, &mut b, 1.0, 1.0).is_none());
    }

    #[test]
    fn test_static_target_reflects_projectile() {
        let mut shot = Solid::new(Vec3::ZERO, Vec3::new(4.0, 0.0, 0.0), 1.0);
        let mut wall = Solid::fixed(Vec3::new(0.8, 0.0, 0.0));
        sphere_to_sphere(&mut shot, &mut wall, 1.0, 1.0).unwrap();
        assert!((shot.velocity - Vec3::new(-4.0, 0.0, 0.0)).length() < 1e-4);
        assert_eq!(wall.velocity, Vec3::ZERO);
    }
}
