//! Game board: resources, tile types and the fixed 37-tile layout.
//!
//! The layout is a radius-3 hex-of-hexes laid out in 7 rows of
//! 4, 5, 6, 7, 6, 5 and 4 tiles. The outer ring is water, the centre tile
//! is the desert, and the 18 tiles in between receive a shuffled resource
//! and a shuffled number token in ascending tile-id order.

use crate::hex::HexCoord;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Tile identifier, assigned row by row from the top-left water tile.
pub type TileId = u32;

/// Distance from the centre to the water ring
pub const BOARD_RADIUS: i32 = 3;

/// Resources distributed over the 18 resource tiles
pub const RESOURCE_POOL: [Resource; 18] = [
    Resource::Wood,
    Resource::Wood,
    Resource::Wood,
    Resource::Wood,
    Resource::Brick,
    Resource::Brick,
    Resource::Brick,
    Resource::Wheat,
    Resource::Wheat,
    Resource::Wheat,
    Resource::Wheat,
    Resource::Sheep,
    Resource::Sheep,
    Resource::Sheep,
    Resource::Sheep,
    Resource::Ore,
    Resource::Ore,
    Resource::Ore,
];

/// Number tokens distributed over the 18 resource tiles
pub const NUMBER_POOL: [u8; 18] = [2, 3, 3, 4, 4, 5, 5, 6, 6, 8, 8, 9, 9, 10, 10, 11, 11, 12];

/// Resource types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Resource {
    Wood,
    Brick,
    Wheat,
    Sheep,
    Ore,
}

impl Resource {
    /// All resource types
    pub const ALL: [Resource; 5] = [
        Resource::Wood,
        Resource::Brick,
        Resource::Wheat,
        Resource::Sheep,
        Resource::Ore,
    ];

    /// Lowercase name used in logs and on the wire
    pub fn name(&self) -> &'static str {
        match self {
            Resource::Wood => "wood",
            Resource::Brick => "brick",
            Resource::Wheat => "wheat",
            Resource::Sheep => "sheep",
            Resource::Ore => "ore",
        }
    }
}

/// Type of hex tile on the board
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TileType {
    Wood,
    Brick,
    Wheat,
    Sheep,
    Ore,
    /// No production; the robber starts here
    Desert,
    /// Surrounds the playable area
    Water,
}

impl TileType {
    /// The resource this tile produces, if any
    pub fn resource(&self) -> Option<Resource> {
        match self {
            TileType::Wood => Some(Resource::Wood),
            TileType::Brick => Some(Resource::Brick),
            TileType::Wheat => Some(Resource::Wheat),
            TileType::Sheep => Some(Resource::Sheep),
            TileType::Ore => Some(Resource::Ore),
            TileType::Desert | TileType::Water => None,
        }
    }

    pub fn is_water(&self) -> bool {
        matches!(self, TileType::Water)
    }
}

impl From<Resource> for TileType {
    fn from(resource: Resource) -> Self {
        match resource {
            Resource::Wood => TileType::Wood,
            Resource::Brick => TileType::Brick,
            Resource::Wheat => TileType::Wheat,
            Resource::Sheep => TileType::Sheep,
            Resource::Ore => TileType::Ore,
        }
    }
}

/// A single hex tile on the board
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tile {
    pub id: TileId,
    #[serde(rename = "type")]
    pub tile_type: TileType,
    /// Dice number that triggers production (2-12, None for desert/water)
    pub number: Option<u8>,
    pub row: u32,
    pub col: u32,
    /// Axial position on the hex grid
    pub coord: HexCoord,
}

impl Tile {
    /// The resource this tile produces, if any
    pub fn resource(&self) -> Option<Resource> {
        self.tile_type.resource()
    }

    pub fn is_water(&self) -> bool {
        self.tile_type.is_water()
    }
}

/// The immutable game board
#[derive(Debug, Clone)]
pub struct Board {
    /// Tiles in id order
    tiles: Vec<Tile>,
    desert: TileId,
}

impl Board {
    /// Create the standard layout with randomized resources and numbers
    pub fn standard() -> Self {
        let mut rng = rand::thread_rng();
        Self::standard_with_rng(&mut rng)
    }

    /// Create the standard layout with a provided RNG.
    /// This allows for deterministic board generation when needed
    pub fn standard_with_rng<R: Rng>(rng: &mut R) -> Self {
        let mut resources = RESOURCE_POOL.to_vec();
        let mut numbers = NUMBER_POOL.to_vec();
        resources.shuffle(rng);
        numbers.shuffle(rng);

        let centre = HexCoord::new(0, 0);
        let mut draws = resources.into_iter().zip(numbers);
        let mut tiles = Vec::with_capacity(37);
        let mut desert = 0;
        let mut resource_tiles = 0;

        for r in -BOARD_RADIUS..=BOARD_RADIUS {
            let first_q = (-BOARD_RADIUS).max(-BOARD_RADIUS - r);
            let last_q = BOARD_RADIUS.min(BOARD_RADIUS - r);
            for q in first_q..=last_q {
                let coord = HexCoord::new(q, r);
                let id = tiles.len() as TileId;
                let ring = coord.distance_to(&centre) as i32;

                let (tile_type, number) = if ring == BOARD_RADIUS {
                    (TileType::Water, None)
                } else if ring == 0 {
                    desert = id;
                    (TileType::Desert, None)
                } else {
                    resource_tiles += 1;
                    draws.next().map_or((TileType::Water, None), |(resource, number)| {
                        (TileType::from(resource), Some(number))
                    })
                };

                tiles.push(Tile {
                    id,
                    tile_type,
                    number,
                    row: (r + BOARD_RADIUS) as u32,
                    col: coord.offset_col(BOARD_RADIUS) as u32,
                    coord,
                });
            }
        }

        debug_assert_eq!(
            resource_tiles,
            RESOURCE_POOL.len(),
            "resource tiles and draw pools are out of step"
        );
        debug_assert!(draws.next().is_none());

        Self { tiles, desert }
    }

    // ==================== Query Methods ====================

    /// All tiles in id order
    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    /// Get a tile by id
    pub fn get_tile(&self, id: TileId) -> Option<&Tile> {
        self.tiles.get(id as usize)
    }

    /// All non-water tiles in id order
    pub fn land_tiles(&self) -> impl Iterator<Item = &Tile> {
        self.tiles.iter().filter(|t| !t.is_water())
    }

    /// Whether `id` is on the board and not water
    pub fn is_land(&self, id: TileId) -> bool {
        self.get_tile(id).is_some_and(|t| !t.is_water())
    }

    /// The desert tile, where the robber starts
    pub fn desert_id(&self) -> TileId {
        self.desert
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::standard()
    }
}
