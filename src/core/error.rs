//! Error types for terrain loading and generation

use thiserror::Error;

/// Main error type for the crate
///
/// Every variant other than the wrapped I/O and decoding errors signals a
/// corrupted asset or a generator bug. Callers abort the current load step
/// instead of retrying.
#[derive(Debug, Error)]
pub enum Error {
    #[error("unknown slope code {0:?}")]
    UnknownSlope(String),

    #[error("empty terrain: {0}")]
    EmptyTerrain(String),

    #[error("tileset declares {found} tiles, expected {expected}")]
    TileCountMismatch { expected: usize, found: usize },

    #[error("invalid heightmap: {0}")]
    InvalidHeightmap(String),

    #[error("corrupt terrain asset: {0}")]
    CorruptAsset(String),

    #[error("tileset error: {0}")]
    Tileset(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
