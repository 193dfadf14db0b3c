//! Ground surface materials and their hardness

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Spread of per-impact hardness around a surface's mean
pub const HARDNESS_STD_DEV: f32 = 0.1;

/// Ground material under an impact point
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Surface {
    Water,
    Mud,
    Snow,
    Sand,
    #[default]
    Grass,
    Dirt,
    Gravel,
    Ice,
    Rock,
    Concrete,
    Steel,
}

impl Surface {
    pub const ALL: [Surface; 11] = [
        Surface::Water,
        Surface::Mud,
        Surface::Snow,
        Surface::Sand,
        Surface::Grass,
        Surface::Dirt,
        Surface::Gravel,
        Surface::Ice,
        Surface::Rock,
        Surface::Concrete,
        Surface::Steel,
    ];

    /// Mean hardness: 0 absorbs everything, 1 is a perfect mirror bounce
    pub fn mean_hardness(&self) -> f32 {
        match self {
            Surface::Water => 0.0,
            Surface::Mud => 0.1,
            Surface::Snow => 0.2,
            Surface::Sand => 0.3,
            Surface::Grass => 0.4,
            Surface::Dirt => 0.5,
            Surface::Gravel => 0.6,
            Surface::Ice => 0.7,
            Surface::Rock => 0.8,
            Surface::Concrete => 0.9,
            Surface::Steel => 1.0,
        }
    }

    /// Draw a hardness from Normal(mean, 0.1), clamped to [0, 1]
    pub fn sample_hardness<R: Rng + ?Sized>(&self, rng: &mut R) -> f32 {
        let z = standard_normal(rng);
        (self.mean_hardness() + z * HARDNESS_STD_DEV).clamp(0.0, 1.0)
    }
}

/// Standard normal variate (Box-Muller)
fn standard_normal<R: Rng + ?Sized>(rng: &mut R) -> f32 {
    // 1 - u keeps the logarithm argument in (0, 1]
    let u1: f32 = 1.0 - rng.random::<f32>();
    let u2: f32 = rng.random::<f32>();
    (-2.0 * u1.ln()).sqrt() * (std::f32::consts::TAU * u2).cos()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_eleven_surfaces_ordered_by_hardness() {
        assert_eq!(Surface::ALL.len(), 11);
        for pair in Surface::ALL.windows(2) {
            assert!(pair[0].mean_hardness() < pair[1].mean_hardness());
        }
        assert_eq!(Surface::default(), Surface::Grass);
    }

    #[test]
    fn test_samples_clamped() {
        let mut rng = Pcg32::seed_from_u64(3);
        for surface in Surface::ALL {
            for _ in 0..200 {
                let h = surface.sample_hardness(&mut rng);
                assert!((0.0..=1.0).contains(&h));
            }
        }
    }

    #[test]
    fn test_sample_mean_close_to_surface_mean() {
        let mut rng = Pcg32::seed_from_u64(11);
        let n = 4000;
        let sum: f32 = (0..n).map(|_| Surface::Grass.sample_hardness(&mut rng)).sum();
        let mean = sum / n as f32;
        assert!((mean - 0.4).abs() < 0.02, "mean {}", mean);
    }

    #[test]
    fn test_seeded_sampling_is_reproducible() {
        let mut a = Pcg32::seed_from_u64(5);
        let mut b = Pcg32::seed_from_u64(5);
        for _ in 0..10 {
            assert_eq!(
                Surface::Dirt.sample_hardness(&mut a),
                Surface::Dirt.sample_hardness(&mut b)
            );
        }
    }
}
