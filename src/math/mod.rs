//! Mathematical utilities and coordinate mappings

pub mod vector;
pub mod projection;
pub mod coords;

pub use vector::{barycentric, blend3, normalize_or, reflect, rotate_xy};
pub use projection::{Perspective, PerspectiveController, ProjectionMode, TileLayout};
pub use coords::ScreenCoord;
