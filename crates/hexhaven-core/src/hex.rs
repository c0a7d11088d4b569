//! Hex coordinate system using axial coordinates (q, r).
//!
//! Tiles are pointy-top hexes. Tile-local corners are numbered clockwise
//! from the top (corner 0), and side `i` runs from corner `i` to corner
//! `i + 1`, so side 0 is the north-east side.
//!
//! - `HexCoord`: identifies an individual hex tile
//! - `Direction`: one of the six sides of a hex, in tile-local side order
//! - `CornerKey` / `SideKey`: the physical identity of a corner or side,
//!   independent of which tile it is described from

use serde::{Deserialize, Serialize};

/// Direction of a side relative to a hex, in tile-local side order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Side 0 (top-right)
    NorthEast,
    /// Side 1 (right)
    East,
    /// Side 2 (bottom-right)
    SouthEast,
    /// Side 3 (bottom-left)
    SouthWest,
    /// Side 4 (left)
    West,
    /// Side 5 (top-left)
    NorthWest,
}

impl Direction {
    /// All directions, indexed by tile-local side number
    pub const ALL: [Direction; 6] = [
        Direction::NorthEast,
        Direction::East,
        Direction::SouthEast,
        Direction::SouthWest,
        Direction::West,
        Direction::NorthWest,
    ];

    /// Direction of tile-local side `index` (taken mod 6)
    pub fn from_side(index: u8) -> Self {
        Self::ALL[(index % 6) as usize]
    }
}

/// Axial coordinate for hex grid.
///
/// In axial coordinates:
/// - `q` increases going east (right)
/// - `r` increases going southeast
/// - The third coordinate `s` (not stored) satisfies: q + r + s = 0
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub struct HexCoord {
    /// Column (increases going east)
    pub q: i32,
    /// Row (increases going southeast)
    pub r: i32,
}

impl HexCoord {
    /// Create a new hex coordinate
    pub const fn new(q: i32, r: i32) -> Self {
        Self { q, r }
    }

    /// The implicit third coordinate (s = -q - r)
    pub const fn s(&self) -> i32 {
        -self.q - self.r
    }

    /// The six neighboring hexes in side order
    pub fn neighbors(&self) -> [HexCoord; 6] {
        Direction::ALL.map(|dir| self.neighbor(dir))
    }

    /// Get the neighbor across a specific side
    pub fn neighbor(&self, direction: Direction) -> HexCoord {
        match direction {
            Direction::East => HexCoord::new(self.q + 1, self.r),
            Direction::NorthEast => HexCoord::new(self.q + 1, self.r - 1),
            Direction::NorthWest => HexCoord::new(self.q, self.r - 1),
            Direction::West => HexCoord::new(self.q - 1, self.r),
            Direction::SouthWest => HexCoord::new(self.q - 1, self.r + 1),
            Direction::SouthEast => HexCoord::new(self.q, self.r + 1),
        }
    }

    /// Distance to another hex (in hex steps)
    pub fn distance_to(&self, other: &HexCoord) -> u32 {
        let dq = (self.q - other.q).abs();
        let dr = (self.r - other.r).abs();
        let ds = (self.s() - other.s()).abs();
        ((dq + dr + ds) / 2) as u32
    }

    /// Physical identity of tile-local corner `corner`.
    ///
    /// Corner `c` sits between side `c - 1` and side `c`, so it touches this
    /// hex and the neighbors across those two sides.
    pub fn corner_key(&self, corner: u8) -> CornerKey {
        let before = Direction::from_side((corner + 5) % 6);
        let after = Direction::from_side(corner);
        CornerKey::new([*self, self.neighbor(before), self.neighbor(after)])
    }

    /// Physical identity of tile-local side `side`.
    pub fn side_key(&self, side: u8) -> SideKey {
        SideKey::new([*self, self.neighbor(Direction::from_side(side))])
    }

    /// Odd-row offset column for this coordinate, shifted so a board of the
    /// given radius starts at column 0.
    pub fn offset_col(&self, radius: i32) -> i32 {
        self.q + (self.r - self.r.rem_euclid(2)) / 2 + radius
    }
}

/// The three hexes meeting at a corner, sorted.
///
/// Any two descriptions of the same physical corner yield equal keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CornerKey([HexCoord; 3]);

impl CornerKey {
    fn new(mut hexes: [HexCoord; 3]) -> Self {
        hexes.sort();
        Self(hexes)
    }
}

/// The two hexes sharing a side, sorted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SideKey([HexCoord; 2]);

impl SideKey {
    fn new(mut hexes: [HexCoord; 2]) -> Self {
        hexes.sort();
        Self(hexes)
    }
}
