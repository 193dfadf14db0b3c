//! Tile-slope terrain: heightmap generation, rasterization and queries

pub mod slope;
pub use slope::{Corner, Quadrant, SLOPE_TABLE, TILE_ELEVATION_RATIO, TerrainTile};

pub mod heightmap;
pub use heightmap::{Heightmap, HeightmapGenerator, HeightmapParams};

pub mod tiles;
pub use tiles::{TileGrid, TileSlope};

pub mod raster;
pub use raster::{TerrainRaster, rasterize};

pub mod query;
pub use query::{Heightfield, TerrainQuery};

pub mod surface;
pub use surface::Surface;

pub mod blur;
pub use blur::{EdgeMode, blur_raster, fast_box_blur};

pub mod packing;
pub use packing::{PackedTerrain, PackedTerrainMeta};

pub mod tileset;
pub use tileset::{TileMeta, TilesetMeta};

use crate::config::TerrainConfig;
use crate::core::types::{Result, Vec2, Vec3};
use crate::math::projection::TileLayout;

/// Generated terrain: source heightmap, reduced tile grid and dense raster
///
/// Read-only once built; share it by reference.
pub struct Terrain {
    heightmap: Heightmap,
    tiles: TileGrid,
    raster: TerrainRaster,
    layout: TileLayout,
    surface: Surface,
    edge_mode: EdgeMode,
}

impl Terrain {
    /// Generate a heightmap from the config's noise parameters and build on it
    pub fn generate(config: &TerrainConfig) -> Result<Self> {
        let start = std::time::Instant::now();
        let heightmap = HeightmapGenerator::new(config.heightmap.clone()).generate()?;
        log::info!(
            "Generated {}x{} tile heightmap in {:.1}ms",
            heightmap.tile_width(),
            heightmap.tile_height(),
            start.elapsed().as_secs_f64() * 1000.0
        );
        Self::from_heightmap(heightmap, config)
    }

    /// Reduce an existing heightmap to slopes and rasterize it
    pub fn from_heightmap(heightmap: Heightmap, config: &TerrainConfig) -> Result<Self> {
        let start = std::time::Instant::now();
        let tiles = TileGrid::from_heightmap(&heightmap)?;
        let raster = rasterize(&tiles, config.precision)?;
        log::info!(
            "Rasterized terrain to {}x{} samples (precision {}) in {:.1}ms",
            raster.width(),
            raster.height(),
            raster.precision(),
            start.elapsed().as_secs_f64() * 1000.0
        );

        let edge_mode = if config.tileable {
            EdgeMode::Toroidal
        } else {
            EdgeMode::Clamp
        };

        Ok(Self {
            heightmap,
            tiles,
            raster,
            layout: TileLayout::new(config.tile_size),
            surface: config.surface,
            edge_mode,
        })
    }

    pub fn heightmap(&self) -> &Heightmap {
        &self.heightmap
    }

    pub fn tiles(&self) -> &TileGrid {
        &self.tiles
    }

    pub fn raster(&self) -> &TerrainRaster {
        &self.raster
    }

    pub fn layout(&self) -> TileLayout {
        self.layout
    }

    pub fn edge_mode(&self) -> EdgeMode {
        self.edge_mode
    }

    /// World-space ground queries
    pub fn query(&self) -> TerrainQuery<'_> {
        TerrainQuery::new(&self.raster, self.layout).with_surface(self.surface)
    }

    /// World position of the map centre, on the ground
    pub fn center(&self) -> Vec3 {
        let tile = Vec2::new(self.tiles.width() as f32, self.tiles.height() as f32) * 0.5;
        let flat = self.layout.tile_to_world(tile, 0.0);
        let elevation = self.query().elevation_at(flat).unwrap_or(0.0);
        Vec3::new(flat.x, flat.y, elevation)
    }

    /// Blurred copy of the raster for detail shading
    ///
    /// Wraps around the map edges when the terrain is tileable.
    pub fn detail_raster(&self, radius: usize, passes: usize) -> Result<TerrainRaster> {
        let start = std::time::Instant::now();
        let detail = blur_raster(&self.raster, radius, passes, self.edge_mode)?;
        log::info!(
            "Built detail raster (radius {}, {} passes) in {:.1}ms",
            radius,
            passes,
            start.elapsed().as_secs_f64() * 1000.0
        );
        Ok(detail)
    }
}
