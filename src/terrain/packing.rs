//! 8-bit RGBA packing of terrain rasters
//!
//! RGB carries the unit normal (`(c * 0.5 + 0.5) * 255`), A the height
//! rescaled linearly between the stored bounds. Unpacking inverts both up to
//! 8-bit quantization.

use std::path::Path;

use image::{Rgba, RgbaImage};
use serde::{Deserialize, Serialize};

use crate::core::error::Error;
use crate::core::types::{Result, Vec3};
use crate::terrain::raster::TerrainRaster;

const IMAGE_FILE: &str = "terrain.png";
const META_FILE: &str = "terrain.json";

/// Bump when the packing layout changes
pub const PACKED_TERRAIN_VERSION: u32 = 1;

/// Height bounds and layout stored next to the packed image
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PackedTerrainMeta {
    pub version: u32,
    pub width: u32,
    pub height: u32,
    pub precision: usize,
    pub min_height: f32,
    pub max_height: f32,
}

/// Terrain raster packed into an RGBA image
#[derive(Clone, Debug)]
pub struct PackedTerrain {
    pub image: RgbaImage,
    pub min_height: f32,
    pub max_height: f32,
    pub precision: usize,
}

#[inline]
fn encode_unit(v: f32) -> u8 {
    ((v * 0.5 + 0.5).clamp(0.0, 1.0) * 255.0).round() as u8
}

#[inline]
fn decode_unit(b: u8) -> f32 {
    b as f32 / 255.0 * 2.0 - 1.0
}

impl TerrainRaster {
    /// Pack heights and normals into an RGBA image
    pub fn pack(&self) -> PackedTerrain {
        let (min_height, max_height) = self.height_bounds();
        let range = max_height - min_height;

        let image = RgbaImage::from_fn(self.width() as u32, self.height() as u32, |x, y| {
            let (x, y) = (x as usize, y as usize);
            let n = self.normal_at(x, y);
            let h = self.height_at(x, y);
            let a = if range > 0.0 {
                (((h - min_height) / range).clamp(0.0, 1.0) * 255.0).round() as u8
            } else {
                0
            };
            Rgba([encode_unit(n.x), encode_unit(n.y), encode_unit(n.z), a])
        });

        PackedTerrain {
            image,
            min_height,
            max_height,
            precision: self.precision(),
        }
    }
}

impl PackedTerrain {
    /// Decode back into a raster
    ///
    /// Decoded normals are not renormalized so each component stays within
    /// one quantization step of the original.
    pub fn unpack(&self) -> Result<TerrainRaster> {
        let (w, h) = self.image.dimensions();
        let range = self.max_height - self.min_height;

        let mut heights = Vec::with_capacity((w * h) as usize);
        let mut normals = Vec::with_capacity((w * h) as usize);
        for Rgba([r, g, b, a]) in self.image.pixels().copied() {
            normals.push(Vec3::new(decode_unit(r), decode_unit(g), decode_unit(b)));
            heights.push(self.min_height + a as f32 / 255.0 * range);
        }

        TerrainRaster::from_parts(w as usize, h as usize, self.precision, heights, normals)
    }

    pub fn meta(&self) -> PackedTerrainMeta {
        let (width, height) = self.image.dimensions();
        PackedTerrainMeta {
            version: PACKED_TERRAIN_VERSION,
            width,
            height,
            precision: self.precision,
            min_height: self.min_height,
            max_height: self.max_height,
        }
    }

    /// Write `terrain.png` and `terrain.json` into `dir`
    pub fn save(&self, dir: &Path) -> Result<()> {
        std::fs::create_dir_all(dir)?;
        self.image.save(dir.join(IMAGE_FILE))?;
        let json = serde_json::to_string_pretty(&self.meta())?;
        std::fs::write(dir.join(META_FILE), json)?;
        log::info!("Saved packed terrain to {}", dir.display());
        Ok(())
    }

    /// Read a packed terrain written by [`PackedTerrain::save`]
    pub fn load(dir: &Path) -> Result<Self> {
        let meta: PackedTerrainMeta =
            serde_json::from_str(&std::fs::read_to_string(dir.join(META_FILE))?)?;
        if meta.version != PACKED_TERRAIN_VERSION {
            return Err(Error::CorruptAsset(format!(
                "packed terrain version {} (expected {})",
                meta.version, PACKED_TERRAIN_VERSION
            )));
        }

        let image = image::open(dir.join(IMAGE_FILE))?.to_rgba8();
        if image.dimensions() != (meta.width, meta.height) {
            return Err(Error::CorruptAsset(format!(
                "packed image is {:?}, metadata says {}x{}",
                image.dimensions(),
                meta.width,
                meta.height
            )));
        }

        Ok(Self {
            image,
            min_height: meta.min_height,
            max_height: meta.max_height,
            precision: meta.precision,
        })
    }
}
