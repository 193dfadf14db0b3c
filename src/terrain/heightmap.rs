//! Integer vertex heightmaps and their noise-based generator

use std::f64::consts::TAU;

use noise::{Fbm, MultiFractal, NoiseFn, Perlin};
use serde::{Deserialize, Serialize};

use crate::core::error::Error;
use crate::core::types::Result;

/// Parameters controlling heightmap generation
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeightmapParams {
    pub seed: u32,
    /// Map width in tiles (the heightmap has one more vertex column)
    pub width: usize,
    /// Map height in tiles (the heightmap has one more vertex row)
    pub height: usize,
    /// Highest elevation level a vertex may take
    pub max_level: u32,
    /// Noise features across the map (larger = busier terrain)
    pub scale: f64,
    pub octaves: u32,      // FBM octaves (detail levels)
    pub persistence: f64,  // FBM persistence (0.5 typical)
    pub lacunarity: f64,   // FBM lacunarity (2.0 typical)
}

impl Default for HeightmapParams {
    fn default() -> Self {
        Self {
            seed: 12345,
            width: 32,
            height: 32,
            max_level: 4,
            scale: 3.0,
            octaves: 4,
            persistence: 0.5,
            lacunarity: 2.0,
        }
    }
}

/// Grid of integer elevation levels, one per tile vertex
///
/// Vertices sharing a grid edge differ by at most one level.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Heightmap {
    width: usize,
    height: usize,
    values: Vec<u32>,
}

impl Heightmap {
    /// Build from rows of vertex values
    ///
    /// Rejects empty or ragged input. The neighbour invariant is checked
    /// later, when cells are reduced to slope codes.
    pub fn from_rows(rows: Vec<Vec<u32>>) -> Result<Self> {
        let height = rows.len();
        let width = rows.first().map_or(0, Vec::len);
        if width < 2 || height < 2 {
            return Err(Error::EmptyTerrain(format!(
                "heightmap needs at least 2x2 vertices, got {}x{}",
                width, height
            )));
        }
        if let Some((y, row)) = rows.iter().enumerate().find(|(_, r)| r.len() != width) {
            return Err(Error::InvalidHeightmap(format!(
                "row {} has {} vertices, expected {}",
                y,
                row.len(),
                width
            )));
        }
        Ok(Self {
            width,
            height,
            values: rows.into_iter().flatten().collect(),
        })
    }

    /// Vertex columns
    pub fn width(&self) -> usize {
        self.width
    }

    /// Vertex rows
    pub fn height(&self) -> usize {
        self.height
    }

    /// Tile columns
    pub fn tile_width(&self) -> usize {
        self.width - 1
    }

    /// Tile rows
    pub fn tile_height(&self) -> usize {
        self.height - 1
    }

    pub fn get(&self, x: usize, y: usize) -> u32 {
        self.values[y * self.width + x]
    }

    pub fn max_value(&self) -> u32 {
        self.values.iter().copied().max().unwrap_or(0)
    }

    pub fn rows(&self) -> impl Iterator<Item = &[u32]> {
        self.values.chunks(self.width)
    }

    /// Corner values of tile (x, y) in N, E, S, W order
    pub fn tile_corners(&self, x: usize, y: usize) -> [u32; 4] {
        [
            self.get(x, y),
            self.get(x + 1, y),
            self.get(x + 1, y + 1),
            self.get(x, y + 1),
        ]
    }

    /// First pair of edge-sharing vertices more than one level apart
    pub fn find_cliff(&self) -> Option<((usize, usize), (usize, usize))> {
        for y in 0..self.height {
            for x in 0..self.width {
                let v = self.get(x, y);
                if x + 1 < self.width && v.abs_diff(self.get(x + 1, y)) > 1 {
                    return Some(((x, y), (x + 1, y)));
                }
                if y + 1 < self.height && v.abs_diff(self.get(x, y + 1)) > 1 {
                    return Some(((x, y), (x, y + 1)));
                }
            }
        }
        None
    }
}

/// Tileable heightmap generator using fractal Brownian motion (FBM)
///
/// Vertices are filled row by row, left to right. Each one is clamped to
/// within one level of its left and top neighbours, which guarantees the
/// neighbour invariant but biases slopes toward the bottom-right.
pub struct HeightmapGenerator {
    params: HeightmapParams,
    noise: Fbm<Perlin>,
}

impl HeightmapGenerator {
    /// Create a new generator with the given parameters
    pub fn new(params: HeightmapParams) -> Self {
        let noise = Fbm::<Perlin>::new(params.seed)
            .set_octaves(params.octaves as usize)
            .set_persistence(params.persistence)
            .set_lacunarity(params.lacunarity);

        Self { params, noise }
    }

    pub fn params(&self) -> &HeightmapParams {
        &self.params
    }

    /// Noise in [0, 1] at vertex (x, y)
    ///
    /// The map wraps onto a torus in 4D noise space so opposite edges line
    /// up and the noise tiles seamlessly.
    pub fn sample(&self, x: usize, y: usize) -> f64 {
        let radius = self.params.scale / TAU;
        let u = x as f64 / self.params.width.max(1) as f64 * TAU;
        let v = y as f64 / self.params.height.max(1) as f64 * TAU;
        let point = [
            radius * u.cos(),
            radius * u.sin(),
            radius * v.cos(),
            radius * v.sin(),
        ];
        ((self.noise.get(point) + 1.0) * 0.5).clamp(0.0, 1.0)
    }

    /// Generate the heightmap
    pub fn generate(&self) -> Result<Heightmap> {
        let HeightmapParams { width, height, max_level, .. } = self.params;
        if width == 0 || height == 0 {
            return Err(Error::EmptyTerrain(format!(
                "map of {}x{} tiles",
                width, height
            )));
        }

        let cols = width + 1;
        let rows = height + 1;
        let mut values = vec![0u32; cols * rows];

        for y in 0..rows {
            for x in 0..cols {
                // Missing neighbours on the first row/column count as 0
                let left = if x > 0 { values[y * cols + x - 1] } else { 0 };
                let top = if y > 0 { values[(y - 1) * cols + x] } else { 0 };

                let min_allowed = left.saturating_sub(1).max(top.saturating_sub(1));
                let max_allowed = max_level.min(left + 1).min(top + 1);

                let noise = self.sample(x, y);
                let value = (min_allowed as f64).max(noise * max_allowed as f64).round();
                values[y * cols + x] = value as u32;
            }
        }

        log::debug!(
            "Generated {}x{} heightmap (seed {}, max level {})",
            cols,
            rows,
            self.params.seed,
            max_level
        );

        Ok(Heightmap {
            width: cols,
            height: rows,
            values,
        })
    }
}
