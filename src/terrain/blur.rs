//! Separable moving-sum box blur over interleaved multi-channel buffers
//!
//! Used to soften the faceted raster into detail maps for rendering. Each
//! pass runs a horizontal then a vertical sweep with a `2 * radius + 1`
//! window; the running sum makes the cost independent of the radius.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::core::types::{Result, Vec3};
use crate::math::vector::normalize_or;
use crate::terrain::raster::TerrainRaster;

/// How samples beyond the buffer edge are read
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeMode {
    /// Repeat the outermost sample
    #[default]
    Clamp,
    /// Wrap around, for maps that tile seamlessly
    Toroidal,
}

impl EdgeMode {
    #[inline]
    fn resolve(self, i: isize, len: usize) -> usize {
        match self {
            EdgeMode::Clamp => i.clamp(0, len as isize - 1) as usize,
            EdgeMode::Toroidal => i.rem_euclid(len as isize) as usize,
        }
    }
}

/// Box blur an interleaved `width x height x channels` buffer
///
/// A radius or pass count of zero returns the input unchanged.
pub fn fast_box_blur(
    data: &[f32],
    width: usize,
    height: usize,
    channels: usize,
    radius: usize,
    passes: usize,
    edge: EdgeMode,
) -> Vec<f32> {
    debug_assert_eq!(data.len(), width * height * channels);
    let mut out = data.to_vec();
    if radius == 0 || passes == 0 || width == 0 || height == 0 || channels == 0 {
        return out;
    }

    for _ in 0..passes {
        blur_rows(&mut out, width, channels, radius, edge);
        let mut columns = transpose(&out, width, height, channels);
        blur_rows(&mut columns, height, channels, radius, edge);
        out = transpose(&columns, height, width, channels);
    }
    out
}

/// Horizontal sweep over every row of `data`
fn blur_rows(data: &mut [f32], width: usize, channels: usize, radius: usize, edge: EdgeMode) {
    let window = (2 * radius + 1) as f32;
    let r = radius as isize;
    let stride = width * channels;

    data.par_chunks_mut(stride).for_each(|row| {
        let source = row.to_vec();
        let sample = |i: isize, c: usize| source[edge.resolve(i, width) * channels + c];

        for c in 0..channels {
            let mut sum: f32 = (-r..=r).map(|i| sample(i, c)).sum();
            for x in 0..width {
                row[x * channels + c] = sum / window;
                let x = x as isize;
                sum += sample(x + r + 1, c) - sample(x - r, c);
            }
        }
    });
}

/// Swap rows and columns of an interleaved buffer
fn transpose(data: &[f32], width: usize, height: usize, channels: usize) -> Vec<f32> {
    let mut out = vec![0.0; data.len()];
    for y in 0..height {
        for x in 0..width {
            let src = (y * width + x) * channels;
            let dst = (x * height + y) * channels;
            out[dst..dst + channels].copy_from_slice(&data[src..src + channels]);
        }
    }
    out
}

/// Blur a single-channel height buffer
pub fn blur_heights(
    heights: &[f32],
    width: usize,
    height: usize,
    radius: usize,
    passes: usize,
    edge: EdgeMode,
) -> Vec<f32> {
    fast_box_blur(heights, width, height, 1, radius, passes, edge)
}

/// Blur a normal buffer, renormalizing every output vector
///
/// Averaged unit vectors come out shorter than unit length; a vector that
/// cancels out entirely falls back to straight up.
pub fn blur_normals(
    normals: &[Vec3],
    width: usize,
    height: usize,
    radius: usize,
    passes: usize,
    edge: EdgeMode,
) -> Vec<Vec3> {
    let flat: Vec<f32> = normals.iter().flat_map(|n| n.to_array()).collect();
    let blurred = fast_box_blur(&flat, width, height, 3, radius, passes, edge);
    blurred
        .chunks_exact(3)
        .map(|c| normalize_or(Vec3::new(c[0], c[1], c[2]), Vec3::Z))
        .collect()
}

/// Blurred copy of a raster (heights and normals)
pub fn blur_raster(
    raster: &TerrainRaster,
    radius: usize,
    passes: usize,
    edge: EdgeMode,
) -> Result<TerrainRaster> {
    let (w, h) = (raster.width(), raster.height());
    let heights = blur_heights(raster.heights(), w, h, radius, passes, edge);
    let normals = if radius == 0 || passes == 0 {
        raster.normals().to_vec()
    } else {
        blur_normals(raster.normals(), w, h, radius, passes, edge)
    };
    log::debug!("Blurred {}x{} raster (radius {}, {} passes, {:?})", w, h, radius, passes, edge);
    TerrainRaster::from_parts(w, h, raster.precision(), heights, normals)
}
