//! Tile-slope metadata shared with the tileset asset pipeline
//!
//! The tileset JSON lists one entry per tile image, each tagged with its
//! "NESW" slope code and centre height:
//!
//! ```json
//! { "tiles": [
//!     { "id": 3, "properties": [
//!         { "name": "slope", "type": "string", "value": "0010" },
//!         { "name": "center", "type": "float", "value": 0.0 } ] } ] }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::core::error::Error;
use crate::core::types::Result;
use crate::terrain::slope::{SLOPE_COUNT, SLOPE_TABLE, TerrainTile};

const SLOPE_PROPERTY: &str = "slope";
const CENTER_PROPERTY: &str = "center";

/// Typed key/value tag on a tile
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TileProperty {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub value: Value,
}

/// Metadata for one tile image
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TileMeta {
    pub id: u32,
    #[serde(default)]
    pub properties: Vec<TileProperty>,
}

impl TileMeta {
    fn property(&self, name: &str) -> Option<&Value> {
        self.properties.iter().find(|p| p.name == name).map(|p| &p.value)
    }

    /// The tile's "NESW" code
    pub fn slope_code(&self) -> Result<&str> {
        self.property(SLOPE_PROPERTY)
            .and_then(Value::as_str)
            .ok_or_else(|| Error::Tileset(format!("tile {} has no string '{}'", self.id, SLOPE_PROPERTY)))
    }

    /// The tile's centre height
    pub fn center(&self) -> Result<f32> {
        self.property(CENTER_PROPERTY)
            .and_then(Value::as_f64)
            .map(|c| c as f32)
            .ok_or_else(|| Error::Tileset(format!("tile {} has no numeric '{}'", self.id, CENTER_PROPERTY)))
    }
}

/// A tileset's slope metadata
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TilesetMeta {
    pub tiles: Vec<TileMeta>,
}

impl TilesetMeta {
    /// Canonical metadata, one tile per slope table entry in table order
    pub fn from_table() -> Self {
        let tiles = SLOPE_TABLE
            .iter()
            .enumerate()
            .map(|(id, tile)| TileMeta {
                id: id as u32,
                properties: vec![
                    TileProperty {
                        name: SLOPE_PROPERTY.to_string(),
                        kind: "string".to_string(),
                        value: Value::from(tile.code),
                    },
                    TileProperty {
                        name: CENTER_PROPERTY.to_string(),
                        kind: "float".to_string(),
                        value: Value::from(tile.center as f64),
                    },
                ],
            })
            .collect();
        Self { tiles }
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Load and validate a tileset metadata file
    pub fn load(path: &Path) -> Result<Self> {
        let meta = Self::from_json(&std::fs::read_to_string(path)?)?;
        meta.validate()?;
        Ok(meta)
    }

    /// Check the tileset against the slope table
    ///
    /// Every table entry must appear exactly once with a matching centre.
    pub fn validate(&self) -> Result<()> {
        if self.tiles.len() != SLOPE_COUNT {
            return Err(Error::TileCountMismatch {
                expected: SLOPE_COUNT,
                found: self.tiles.len(),
            });
        }

        let mut seen = Vec::with_capacity(SLOPE_COUNT);
        for meta in &self.tiles {
            let tile = TerrainTile::lookup(meta.slope_code()?)?;
            let center = meta.center()?;
            if (center - tile.center).abs() > 1e-6 {
                return Err(Error::Tileset(format!(
                    "tile {} ({}) has center {}, expected {}",
                    meta.id, tile.code, center, tile.center
                )));
            }
            if seen.contains(&tile.code) {
                return Err(Error::Tileset(format!("slope {} declared twice", tile.code)));
            }
            seen.push(tile.code);
        }
        Ok(())
    }

    /// Tile image id for every slope table entry, in table order
    pub fn tile_ids(&self) -> Result<Vec<u32>> {
        self.validate()?;
        SLOPE_TABLE
            .iter()
            .map(|tile| {
                self.tiles
                    .iter()
                    .find(|m| m.slope_code().is_ok_and(|c| c == tile.code))
                    .map(|m| m.id)
                    .ok_or_else(|| Error::UnknownSlope(tile.code.to_string()))
            })
            .collect()
    }
}
