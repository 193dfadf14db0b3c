//! Dense per-sample height/normal raster built from a tile grid
//!
//! Each tile covers `precision x precision` samples. A sample at pixel
//! (px, py) lies at tile coordinate (px / precision, py / precision); its
//! height is the barycentric blend of the containing triangle's corners and
//! its normal is that triangle's flat normal. Heights are expressed in
//! raster samples, so one tile edge is `precision` units long.

use rayon::prelude::*;

use crate::core::error::Error;
use crate::core::types::{Result, Vec3};
use crate::terrain::slope::{Quadrant, TILE_ELEVATION_RATIO};
use crate::terrain::tiles::TileGrid;

/// Height and normal samples, row-major
#[derive(Clone, Debug, PartialEq)]
pub struct TerrainRaster {
    width: usize,
    height: usize,
    precision: usize,
    heights: Vec<f32>,
    normals: Vec<Vec3>,
}

impl TerrainRaster {
    /// Assemble a raster from existing sample buffers
    pub fn from_parts(
        width: usize,
        height: usize,
        precision: usize,
        heights: Vec<f32>,
        normals: Vec<Vec3>,
    ) -> Result<Self> {
        if width == 0 || height == 0 || precision == 0 {
            return Err(Error::EmptyTerrain(format!(
                "raster of {}x{} at precision {}",
                width, height, precision
            )));
        }
        let expected = width * height;
        if heights.len() != expected || normals.len() != expected {
            return Err(Error::EmptyTerrain(format!(
                "raster of {}x{} given {} heights and {} normals",
                width,
                height,
                heights.len(),
                normals.len()
            )));
        }
        Ok(Self { width, height, precision, heights, normals })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Samples per tile edge
    pub fn precision(&self) -> usize {
        self.precision
    }

    pub fn heights(&self) -> &[f32] {
        &self.heights
    }

    pub fn normals(&self) -> &[Vec3] {
        &self.normals
    }

    pub fn height_at(&self, x: usize, y: usize) -> f32 {
        self.heights[y * self.width + x]
    }

    pub fn normal_at(&self, x: usize, y: usize) -> Vec3 {
        self.normals[y * self.width + x]
    }

    /// Height at signed coordinates, `None` outside the raster
    pub fn get_height(&self, x: i64, y: i64) -> Option<f32> {
        self.index(x, y).map(|i| self.heights[i])
    }

    /// Normal at signed coordinates, `None` outside the raster
    pub fn get_normal(&self, x: i64, y: i64) -> Option<Vec3> {
        self.index(x, y).map(|i| self.normals[i])
    }

    fn index(&self, x: i64, y: i64) -> Option<usize> {
        if x < 0 || y < 0 || x >= self.width as i64 || y >= self.height as i64 {
            return None;
        }
        Some(y as usize * self.width + x as usize)
    }

    /// Lowest and highest sample
    pub fn height_bounds(&self) -> (f32, f32) {
        self.heights
            .iter()
            .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), &h| (lo.min(h), hi.max(h)))
    }
}

/// Expand a tile grid into a raster with `precision` samples per tile edge
///
/// O(width * height * precision²). Rows are filled in parallel; every sample
/// depends only on its own tile, so the result matches a sequential pass.
pub fn rasterize(tiles: &TileGrid, precision: usize) -> Result<TerrainRaster> {
    if precision == 0 {
        return Err(Error::EmptyTerrain("raster precision 0".to_string()));
    }
    let width = tiles.width() * precision;
    let height = tiles.height() * precision;
    if width == 0 || height == 0 {
        return Err(Error::EmptyTerrain("tile grid has no cells".to_string()));
    }

    let scale = TILE_ELEVATION_RATIO * precision as f32;
    let inv_precision = 1.0 / precision as f32;

    let mut heights = vec![0.0f32; width * height];
    let mut normals = vec![Vec3::Z; width * height];

    heights
        .par_chunks_mut(width)
        .zip(normals.par_chunks_mut(width))
        .enumerate()
        .for_each(|(py, (height_row, normal_row))| {
            let ty = py / precision;
            let norm_y = (py % precision) as f32 * inv_precision;

            for px in 0..width {
                let tx = px / precision;
                let norm_x = (px % precision) as f32 * inv_precision;

                let slope = tiles.tile(tx, ty);
                let quadrant = Quadrant::locate(norm_x, norm_y);
                let blended = slope.tile.height_in(quadrant, norm_x, norm_y);

                height_row[px] = (slope.level as f32 + blended) * scale;
                normal_row[px] = slope.tile.normal(quadrant);
            }
        });

    log::debug!(
        "Rasterized {}x{} tiles into {}x{} samples",
        tiles.width(),
        tiles.height(),
        width,
        height
    );

    Ok(TerrainRaster { width, height, precision, heights, normals })
}
