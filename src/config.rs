//! Battlefield configuration
//!
//! Every section has defaults; a JSON file only needs the fields it
//! overrides.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::error::Error;
use crate::core::types::Result;
use crate::math::projection::{Perspective, ProjectionMode};
use crate::terrain::heightmap::HeightmapParams;
use crate::terrain::surface::Surface;

/// Terrain generation and raster settings
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TerrainConfig {
    /// Heightmap noise and size parameters
    pub heightmap: HeightmapParams,
    /// Raster samples per tile edge
    pub precision: usize,
    /// Tile edge length in world units
    pub tile_size: f32,
    /// Blur detail maps with wrap-around edges
    pub tileable: bool,
    /// Detail blur window radius (samples)
    pub detail_blur_radius: usize,
    /// Detail blur repetitions
    pub detail_blur_passes: usize,
    /// Material reported for every ground position
    pub surface: Surface,
}

impl Default for TerrainConfig {
    fn default() -> Self {
        Self {
            heightmap: HeightmapParams::default(),
            precision: 8,
            tile_size: 32.0,
            tileable: true,
            detail_blur_radius: 2,
            detail_blur_passes: 2,
            surface: Surface::Grass,
        }
    }
}

/// Projectile physics settings
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    /// Metres per world unit
    pub meters_per_unit: f32,
    /// Gravitational acceleration (m/s²)
    pub gravity: f32,
    /// Air density (kg/m³)
    pub air_density: f32,
    /// Sub-step while the projectile is on screen (s)
    pub visible_step: f32,
    /// Sub-step while the projectile is off screen (s)
    pub hidden_step: f32,
    /// Interval between drag/gravity velocity updates (s)
    pub drag_interval: f32,
    /// Squared speed (world units²/s²) under which a projectile comes to rest
    pub rest_speed_sq: f32,
    /// Seconds a resting projectile lingers before it is despawned
    pub rest_linger: f32,
    /// Penetration depth below which ground contact is ignored (world units)
    pub collision_epsilon: f32,
    /// Impact speed (m/s) at which the bounce potential saturates
    pub max_bounce_speed: f32,
    /// Bounce fraction below which an impact becomes a pure splash
    pub min_bounce: f32,
    /// Restitution for projectile/target contacts
    pub restitution: f32,
    /// Seed for hardness draws
    pub seed: u64,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            meters_per_unit: 0.5,
            gravity: 9.81,
            air_density: 1.225,
            visible_step: 1.0 / 120.0,
            hidden_step: 1.0 / 30.0,
            drag_interval: 1.0 / 20.0,
            rest_speed_sq: 0.01,
            rest_linger: 2.0,
            collision_epsilon: 0.01,
            max_bounce_speed: 400.0,
            min_bounce: 0.1,
            restitution: 0.5,
            seed: 12345,
        }
    }
}

/// Camera projection settings
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectionConfig {
    /// Camera elevation above the ground plane (degrees)
    pub camera_angle_deg: f32,
    pub mode: ProjectionMode,
}

impl Default for ProjectionConfig {
    fn default() -> Self {
        Self {
            camera_angle_deg: 30.0,
            mode: ProjectionMode::Axonometric,
        }
    }
}

impl ProjectionConfig {
    pub fn perspective(&self) -> Perspective {
        Perspective::new(self.camera_angle_deg.to_radians(), self.mode)
    }
}

/// Top-level configuration
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BattlefieldConfig {
    pub terrain: TerrainConfig,
    pub physics: PhysicsConfig,
    pub projection: ProjectionConfig,
}

impl BattlefieldConfig {
    /// Load and validate a JSON config file
    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&json)?;
        config.validate()?;
        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Write the config as pretty JSON
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Reject values the terrain pipeline or integrator cannot work with
    pub fn validate(&self) -> Result<()> {
        let t = &self.terrain;
        if t.heightmap.width == 0 || t.heightmap.height == 0 {
            return Err(Error::Config(format!(
                "terrain must have at least one tile, got {}x{}",
                t.heightmap.width, t.heightmap.height
            )));
        }
        if t.precision == 0 {
            return Err(Error::Config("terrain precision must be positive".to_string()));
        }
        if !(t.tile_size > 0.0) {
            return Err(Error::Config(format!("tile size {} must be positive", t.tile_size)));
        }

        let p = &self.physics;
        let positive = [
            ("meters_per_unit", p.meters_per_unit),
            ("visible_step", p.visible_step),
            ("hidden_step", p.hidden_step),
            ("drag_interval", p.drag_interval),
            ("max_bounce_speed", p.max_bounce_speed),
        ];
        if let Some((name, value)) = positive.iter().find(|(_, v)| !(*v > 0.0)) {
            return Err(Error::Config(format!("physics.{} = {} must be positive", name, value)));
        }
        if !(0.0..=1.0).contains(&p.restitution) {
            return Err(Error::Config(format!("restitution {} outside [0, 1]", p.restitution)));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        BattlefieldConfig::default().validate().unwrap();
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let json = r#"{ "terrain": { "precision": 4, "heightmap": { "seed": 7 } } }"#;
        let config: BattlefieldConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.terrain.precision, 4);
        assert_eq!(config.terrain.heightmap.seed, 7);
        assert_eq!(config.terrain.heightmap.width, HeightmapParams::default().width);
        assert_eq!(config.physics, PhysicsConfig::default());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = BattlefieldConfig::default();
        config.terrain.precision = 0;
        assert!(matches!(config.validate(), Err(Error::Config(_))));

        let mut config = BattlefieldConfig::default();
        config.physics.drag_interval = 0.0;
        assert!(matches!(config.validate(), Err(Error::Config(_))));

        let mut config = BattlefieldConfig::default();
        config.physics.restitution = 1.5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_save_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("battlefield.json");
        let mut config = BattlefieldConfig::default();
        config.projection.mode = ProjectionMode::Oblique;
        config.terrain.surface = Surface::Rock;
        config.save(&path).unwrap();

        let loaded = BattlefieldConfig::load(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_projection_perspective() {
        let p = ProjectionConfig::default().perspective();
        assert!((p.camera_angle - 30.0_f32.to_radians()).abs() < 1e-6);
    }
}
