//! Tile-slope grid reduced from a vertex heightmap

use crate::core::error::Error;
use crate::core::types::Result;
use crate::terrain::heightmap::Heightmap;
use crate::terrain::slope::TerrainTile;

/// A heightmap cell reduced to its canonical shape and base level
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TileSlope {
    pub tile: &'static TerrainTile,
    /// Elevation subtracted from every corner to reach the canonical code
    pub level: u32,
}

impl TileSlope {
    /// Absolute height (levels) at an in-tile point
    pub fn height_at(&self, norm_x: f32, norm_y: f32) -> f32 {
        self.level as f32 + self.tile.height_at(norm_x, norm_y)
    }
}

/// Row-major grid of tile slopes
#[derive(Clone, Debug, PartialEq)]
pub struct TileGrid {
    width: usize,
    height: usize,
    tiles: Vec<TileSlope>,
}

impl TileGrid {
    /// Reduce every heightmap cell to a slope table entry
    ///
    /// Fails on the first cell whose corners do not form a known code.
    pub fn from_heightmap(heightmap: &Heightmap) -> Result<Self> {
        let width = heightmap.tile_width();
        let height = heightmap.tile_height();
        let mut tiles = Vec::with_capacity(width * height);

        for y in 0..height {
            for x in 0..width {
                let corners = heightmap.tile_corners(x, y);
                let (tile, level) = TerrainTile::from_corners(corners).map_err(|e| match e {
                    Error::UnknownSlope(code) => {
                        Error::UnknownSlope(format!("{} at tile ({}, {})", code, x, y))
                    }
                    other => other,
                })?;
                tiles.push(TileSlope { tile, level });
            }
        }

        Ok(Self { width, height, tiles })
    }

    /// Build directly from slopes (row-major, `width * height` entries)
    pub fn from_slopes(width: usize, height: usize, tiles: Vec<TileSlope>) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(Error::EmptyTerrain(format!("tile grid of {}x{}", width, height)));
        }
        if tiles.len() != width * height {
            return Err(Error::EmptyTerrain(format!(
                "tile grid of {}x{} given {} tiles",
                width,
                height,
                tiles.len()
            )));
        }
        Ok(Self { width, height, tiles })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn tile(&self, x: usize, y: usize) -> &TileSlope {
        &self.tiles[y * self.width + x]
    }

    pub fn iter(&self) -> impl Iterator<Item = &TileSlope> {
        self.tiles.iter()
    }

    /// Highest point of any tile (levels)
    pub fn max_level(&self) -> f32 {
        self.tiles
            .iter()
            .map(|t| t.level as f32 + t.tile.corners.iter().copied().fold(0.0, f32::max))
            .fold(0.0, f32::max)
    }
}
