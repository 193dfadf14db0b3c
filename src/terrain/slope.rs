//! Slope table: the 19 canonical tile shapes
//!
//! A tile is bounded by four heightmap vertices named after their on-screen
//! position: N (top), E (right), S (bottom), W (left). In grid space the
//! tile is the unit square with N at (0, 0), E at (1, 0), S at (1, 1) and
//! W at (0, 1). Both diagonals split it into four triangles (NE, SE, SW, NW)
//! that meet at the centre.
//!
//! Subtracting the lowest corner gives a four digit "NESW" code. Neighbouring
//! vertices differ by at most one level, which leaves exactly 19 codes.

use std::f32::consts::SQRT_2;
use std::sync::LazyLock;

use crate::core::error::Error;
use crate::core::types::{Result, Vec2, Vec3};
use crate::math::vector::{barycentric, blend3, tilted_normal};

/// Rise of one elevation level, as a fraction of the tile edge length
pub const TILE_ELEVATION_RATIO: f32 = 0.5;

/// Tilt of a tile raised one level along one grid axis
pub static TILE_ANGLE: LazyLock<f32> = LazyLock::new(|| TILE_ELEVATION_RATIO.atan());

/// Tilt of a triangle raised one level over half a tile diagonal
pub static DIAGONAL_ANGLE: LazyLock<f32> =
    LazyLock::new(|| (TILE_ELEVATION_RATIO * SQRT_2).atan());

/// Number of canonical tile shapes
pub const SLOPE_COUNT: usize = 19;

/// Tile corner
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Corner {
    N,
    E,
    S,
    W,
}

impl Corner {
    pub const ALL: [Corner; 4] = [Corner::N, Corner::E, Corner::S, Corner::W];

    /// Position in the unit tile square
    pub fn position(self) -> Vec2 {
        match self {
            Corner::N => Vec2::new(0.0, 0.0),
            Corner::E => Vec2::new(1.0, 0.0),
            Corner::S => Vec2::new(1.0, 1.0),
            Corner::W => Vec2::new(0.0, 1.0),
        }
    }

    pub fn index(self) -> usize {
        self as usize
    }
}

const CENTER: Vec2 = Vec2::new(0.5, 0.5);

/// One of the four triangles of a tile
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Quadrant {
    NE,
    SE,
    SW,
    NW,
}

impl Quadrant {
    pub const ALL: [Quadrant; 4] = [Quadrant::NE, Quadrant::SE, Quadrant::SW, Quadrant::NW];

    /// Triangle containing the in-tile point (`norm_x`, `norm_y`)
    pub fn locate(norm_x: f32, norm_y: f32) -> Quadrant {
        let top = norm_y < 1.0 - norm_x;
        let right = norm_y < norm_x;
        match (top, right) {
            (true, true) => Quadrant::NE,
            (true, false) => Quadrant::NW,
            (false, true) => Quadrant::SE,
            (false, false) => Quadrant::SW,
        }
    }

    /// The two tile corners of this triangle (the third vertex is the centre)
    pub fn corners(self) -> [Corner; 2] {
        match self {
            Quadrant::NE => [Corner::N, Corner::E],
            Quadrant::SE => [Corner::E, Corner::S],
            Quadrant::SW => [Corner::S, Corner::W],
            Quadrant::NW => [Corner::W, Corner::N],
        }
    }

    pub fn touches(self, corner: Corner) -> bool {
        self.corners().contains(&corner)
    }

    pub fn index(self) -> usize {
        self as usize
    }
}

/// Surface orientation of one triangle
#[derive(Clone, Copy, Debug)]
enum Tilt {
    Flat,
    /// Descends along `Vec2` at [`TILE_ANGLE`]
    Axis(Vec2),
    /// Descends along `Vec2` at [`DIAGONAL_ANGLE`]
    Diagonal(Vec2),
}

impl Tilt {
    fn normal(self) -> Vec3 {
        match self {
            Tilt::Flat => Vec3::Z,
            Tilt::Axis(downhill) => tilted_normal(downhill, *TILE_ANGLE),
            Tilt::Diagonal(downhill) => tilted_normal(downhill, *DIAGONAL_ANGLE),
        }
    }
}

/// A canonical tile shape
#[derive(Clone, Debug, PartialEq)]
pub struct TerrainTile {
    pub name: &'static str,
    /// Corner offsets in N, E, S, W order, e.g. "0010"
    pub code: &'static str,
    pub flat: bool,
    /// Height of the tile centre (0, 0.5 or 1 levels)
    pub center: f32,
    /// Corner heights in N, E, S, W order
    pub corners: [f32; 4],
    /// Unit normals of the NE, SE, SW, NW triangles (grid space, Z up)
    pub normals: [Vec3; 4],
}

impl TerrainTile {
    fn new(name: &'static str, code: &'static str, center: f32, tilts: [Tilt; 4]) -> Self {
        let mut corners = [0.0; 4];
        for (slot, digit) in corners.iter_mut().zip(code.bytes()) {
            *slot = (digit - b'0') as f32;
        }
        Self {
            name,
            code,
            flat: code == "0000",
            center,
            corners,
            normals: tilts.map(Tilt::normal),
        }
    }

    /// Height of a corner (levels above the tile base)
    pub fn corner(&self, corner: Corner) -> f32 {
        self.corners[corner.index()]
    }

    pub fn normal(&self, quadrant: Quadrant) -> Vec3 {
        self.normals[quadrant.index()]
    }

    /// Height (levels above the tile base) at an in-tile point, blended
    /// barycentrically within the containing triangle
    pub fn height_at(&self, norm_x: f32, norm_y: f32) -> f32 {
        let quadrant = Quadrant::locate(norm_x, norm_y);
        self.height_in(quadrant, norm_x, norm_y)
    }

    /// Height at an in-tile point using the plane of `quadrant`
    pub fn height_in(&self, quadrant: Quadrant, norm_x: f32, norm_y: f32) -> f32 {
        let [a, b] = quadrant.corners();
        let weights = barycentric(
            Vec2::new(norm_x, norm_y),
            a.position(),
            b.position(),
            CENTER,
        );
        blend3(weights, [self.corner(a), self.corner(b), self.center])
    }

    /// Flat normal of the triangle containing an in-tile point
    pub fn normal_at(&self, norm_x: f32, norm_y: f32) -> Vec3 {
        self.normal(Quadrant::locate(norm_x, norm_y))
    }

    /// Whether one corner sits two levels above the opposite one
    pub fn is_steep(&self) -> bool {
        self.code.contains('2')
    }

    /// Find the table entry for a "NESW" code
    ///
    /// An unknown code means the heightmap broke the neighbour invariant or
    /// the data is corrupted; it is never retried.
    pub fn lookup(code: &str) -> Result<&'static TerrainTile> {
        SLOPE_TABLE
            .iter()
            .find(|tile| tile.code == code)
            .ok_or_else(|| Error::UnknownSlope(code.to_string()))
    }

    /// Reduce absolute corner elevations (N, E, S, W) to a table entry and
    /// the base level that was subtracted
    pub fn from_corners(corners: [u32; 4]) -> Result<(&'static TerrainTile, u32)> {
        let level = corners.iter().copied().min().unwrap_or(0);
        let mut code = String::with_capacity(4);
        for c in corners {
            let offset = c - level;
            match char::from_digit(offset, 10) {
                Some(digit) if offset <= 2 => code.push(digit),
                _ => {
                    // Offsets beyond 2 cannot appear in the table
                    let raw = corners.map(|c| c.to_string()).join(",");
                    return Err(Error::UnknownSlope(format!("[{}] (offset {})", raw, offset)));
                }
            }
        }
        Ok((Self::lookup(&code)?, level))
    }
}

fn toward_center(corner: Corner) -> Vec2 {
    CENTER - corner.position()
}

/// One corner lifted: the two triangles touching it tilt toward the centre
fn lifted(corner: Corner) -> [Tilt; 4] {
    Quadrant::ALL.map(|q| {
        if q.touches(corner) {
            Tilt::Diagonal(toward_center(corner))
        } else {
            Tilt::Flat
        }
    })
}

/// Two neighbouring corners lifted: one plane across the tile
fn edge(a: Corner, b: Corner) -> [Tilt; 4] {
    let midpoint = (a.position() + b.position()) * 0.5;
    [Tilt::Axis(CENTER - midpoint); 4]
}

/// Two opposite corners lifted, centre halfway: each triangle runs from its
/// raised corner down to its lowered one
fn saddle(raised: [Corner; 2]) -> [Tilt; 4] {
    Quadrant::ALL.map(|q| {
        let [a, b] = q.corners();
        let (high, low) = if raised.contains(&a) { (a, b) } else { (b, a) };
        Tilt::Axis(low.position() - high.position())
    })
}

/// One corner lowered: the two triangles touching it tilt toward it
fn dipped(corner: Corner) -> [Tilt; 4] {
    Quadrant::ALL.map(|q| {
        if q.touches(corner) {
            Tilt::Diagonal(-toward_center(corner))
        } else {
            Tilt::Flat
        }
    })
}

/// One corner two levels up: the whole tile is one diagonal plane
fn steep(corner: Corner) -> [Tilt; 4] {
    [Tilt::Diagonal(toward_center(corner)); 4]
}

/// All canonical tile shapes
pub static SLOPE_TABLE: LazyLock<[TerrainTile; SLOPE_COUNT]> = LazyLock::new(|| {
    use Corner::*;
    [
        TerrainTile::new("FLAT", "0000", 0.0, [Tilt::Flat; 4]),
        TerrainTile::new("SLOPE_N", "1000", 0.0, lifted(N)),
        TerrainTile::new("SLOPE_E", "0100", 0.0, lifted(E)),
        TerrainTile::new("SLOPE_S", "0010", 0.0, lifted(S)),
        TerrainTile::new("SLOPE_W", "0001", 0.0, lifted(W)),
        TerrainTile::new("SLOPE_NE", "1100", 0.5, edge(N, E)),
        TerrainTile::new("SLOPE_SE", "0110", 0.5, edge(E, S)),
        TerrainTile::new("SLOPE_SW", "0011", 0.5, edge(S, W)),
        TerrainTile::new("SLOPE_NW", "1001", 0.5, edge(W, N)),
        TerrainTile::new("SADDLE_NS", "1010", 0.5, saddle([N, S])),
        TerrainTile::new("SADDLE_EW", "0101", 0.5, saddle([E, W])),
        TerrainTile::new("DIP_N", "0111", 1.0, dipped(N)),
        TerrainTile::new("DIP_E", "1011", 1.0, dipped(E)),
        TerrainTile::new("DIP_S", "1101", 1.0, dipped(S)),
        TerrainTile::new("DIP_W", "1110", 1.0, dipped(W)),
        TerrainTile::new("STEEP_N", "2101", 1.0, steep(N)),
        TerrainTile::new("STEEP_E", "1210", 1.0, steep(E)),
        TerrainTile::new("STEEP_S", "0121", 1.0, steep(S)),
        TerrainTile::new("STEEP_W", "1012", 1.0, steep(W)),
    ]
});

/// Look up a tile by name
pub fn by_name(name: &str) -> Option<&'static TerrainTile> {
    SLOPE_TABLE.iter().find(|tile| tile.name == name)
}
