//! World-space elevation, normal and hardness queries over a terrain raster

use rand::Rng;

use crate::core::types::{Vec2, Vec3};
use crate::math::projection::{GRID_ROTATION, TileLayout};
use crate::math::vector::rotate_xy;
use crate::terrain::raster::TerrainRaster;
use crate::terrain::surface::Surface;

/// Ground queried by collision and rendering code
///
/// Positions are world space (Z up). Queries outside the ground's footprint
/// return `None`; callers decide the fallback.
pub trait Heightfield {
    /// Ground elevation under `world`
    fn elevation_at(&self, world: Vec3) -> Option<f32>;

    /// Unit surface normal under `world`
    fn normal_at(&self, world: Vec3) -> Option<Vec3>;

    /// Surface material under `world`
    fn surface_at(&self, _world: Vec3) -> Surface {
        Surface::Grass
    }

    /// Whether `world` lies over the ground footprint
    fn contains(&self, world: Vec3) -> bool {
        self.elevation_at(world).is_some()
    }

    /// Stochastic hardness in [0, 1] drawn for the surface under `world`
    fn hardness_at<R: Rng + ?Sized>(&self, world: Vec3, rng: &mut R) -> f32
    where
        Self: Sized,
    {
        self.surface_at(world).sample_hardness(rng)
    }
}

/// [`Heightfield`] backed by a [`TerrainRaster`]
#[derive(Clone, Copy, Debug)]
pub struct TerrainQuery<'a> {
    raster: &'a TerrainRaster,
    layout: TileLayout,
    surface: Surface,
}

impl<'a> TerrainQuery<'a> {
    pub fn new(raster: &'a TerrainRaster, layout: TileLayout) -> Self {
        Self {
            raster,
            layout,
            surface: Surface::Grass,
        }
    }

    /// Report `surface` everywhere instead of grass
    pub fn with_surface(mut self, surface: Surface) -> Self {
        self.surface = surface;
        self
    }

    pub fn raster(&self) -> &'a TerrainRaster {
        self.raster
    }

    pub fn layout(&self) -> TileLayout {
        self.layout
    }

    /// World units per raster sample (horizontal and vertical)
    pub fn sample_size(&self) -> f32 {
        self.layout.tile_size / self.raster.precision() as f32
    }

    /// Fractional raster coordinate under a world position
    pub fn world_to_raster(&self, world: Vec3) -> Vec2 {
        self.layout.world_to_tile(world) * self.raster.precision() as f32
    }

    /// World position of a raster sample, at its stored height
    pub fn raster_to_world(&self, x: usize, y: usize) -> Vec3 {
        let tile = Vec2::new(x as f32, y as f32) / self.raster.precision() as f32;
        let elevation = self.raster.height_at(x, y) * self.sample_size();
        self.layout.tile_to_world(tile, elevation)
    }

    /// Raster-space height with two-triangle interpolation across the four
    /// surrounding samples, or the nearest sample at the raster edge
    fn raster_elevation(&self, r: Vec2) -> Option<f32> {
        let x0 = r.x.floor();
        let y0 = r.y.floor();
        let fx = r.x - x0;
        let fy = r.y - y0;
        let (x0, y0) = (x0 as i64, y0 as i64);

        let raster = self.raster;
        let quad = (
            raster.get_height(x0, y0),
            raster.get_height(x0 + 1, y0),
            raster.get_height(x0, y0 + 1),
            raster.get_height(x0 + 1, y0 + 1),
        );

        match quad {
            (Some(h00), Some(h10), Some(h01), Some(h11)) => {
                let h = if fx + fy <= 1.0 {
                    // upper-left triangle
                    h00 + fx * (h10 - h00) + fy * (h01 - h00)
                } else {
                    // lower-right triangle
                    h11 + (1.0 - fx) * (h01 - h11) + (1.0 - fy) * (h10 - h11)
                };
                Some(h)
            }
            _ => raster.get_height(r.x.round() as i64, r.y.round() as i64),
        }
    }
}

impl Heightfield for TerrainQuery<'_> {
    fn elevation_at(&self, world: Vec3) -> Option<f32> {
        let r = self.world_to_raster(world);
        self.raster_elevation(r).map(|h| h * self.sample_size())
    }

    fn normal_at(&self, world: Vec3) -> Option<Vec3> {
        let r = self.world_to_raster(world);
        self.raster
            .get_normal(r.x.round() as i64, r.y.round() as i64)
            .map(|n| rotate_xy(n, GRID_ROTATION))
    }

    fn surface_at(&self, _world: Vec3) -> Surface {
        self.surface
    }
}
