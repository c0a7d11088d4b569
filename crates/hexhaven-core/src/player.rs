//! Player state and resource management.
//!
//! This module contains:
//! - Player struct with resources, piece counts and victory points
//! - ResourceHand for managing resource counts
//! - Building costs

use crate::board::Resource;
use crate::error::GameError;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Player identifier, stable for the lifetime of a connection
pub type PlayerId = Uuid;

/// Player color for UI rendering, assigned in join order.
/// Serialized as its hex code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlayerColor {
    #[serde(rename = "#e74c3c")]
    Red,
    #[serde(rename = "#3498db")]
    Blue,
    #[serde(rename = "#2ecc71")]
    Green,
    #[serde(rename = "#f39c12")]
    Orange,
    #[serde(rename = "#9b59b6")]
    Purple,
    #[serde(rename = "#34495e")]
    Slate,
}

impl PlayerColor {
    /// The palette in assignment order
    pub const ALL: [PlayerColor; 6] = [
        PlayerColor::Red,
        PlayerColor::Blue,
        PlayerColor::Green,
        PlayerColor::Orange,
        PlayerColor::Purple,
        PlayerColor::Slate,
    ];

    /// First palette color not in `taken`
    pub fn first_free(taken: impl IntoIterator<Item = PlayerColor>) -> Option<Self> {
        let taken: Vec<PlayerColor> = taken.into_iter().collect();
        Self::ALL.into_iter().find(|c| !taken.contains(c))
    }
}

/// A hand of resources
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceHand {
    pub wood: u32,
    pub brick: u32,
    pub wheat: u32,
    pub sheep: u32,
    pub ore: u32,
}

impl ResourceHand {
    /// Create an empty hand
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a hand with specific amounts
    pub fn with_amounts(wood: u32, brick: u32, wheat: u32, sheep: u32, ore: u32) -> Self {
        Self {
            wood,
            brick,
            wheat,
            sheep,
            ore,
        }
    }

    /// Create a hand with a single resource
    pub fn single(resource: Resource, amount: u32) -> Self {
        let mut hand = Self::new();
        hand.add(resource, amount);
        hand
    }

    /// Total number of resource cards
    pub fn total(&self) -> u32 {
        self.wood + self.brick + self.wheat + self.sheep + self.ore
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    /// Get count of a specific resource
    pub fn get(&self, resource: Resource) -> u32 {
        match resource {
            Resource::Wood => self.wood,
            Resource::Brick => self.brick,
            Resource::Wheat => self.wheat,
            Resource::Sheep => self.sheep,
            Resource::Ore => self.ore,
        }
    }

    /// Add resources to hand
    pub fn add(&mut self, resource: Resource, amount: u32) {
        match resource {
            Resource::Wood => self.wood += amount,
            Resource::Brick => self.brick += amount,
            Resource::Wheat => self.wheat += amount,
            Resource::Sheep => self.sheep += amount,
            Resource::Ore => self.ore += amount,
        }
    }

    /// Check if can afford a cost
    pub fn can_afford(&self, cost: &ResourceHand) -> bool {
        Resource::ALL
            .iter()
            .all(|r| self.get(*r) >= cost.get(*r))
    }

    /// Try to subtract, returning false (and leaving the hand untouched) if
    /// insufficient
    pub fn try_subtract(&mut self, cost: &ResourceHand) -> bool {
        if !self.can_afford(cost) {
            return false;
        }
        self.wood -= cost.wood;
        self.brick -= cost.brick;
        self.wheat -= cost.wheat;
        self.sheep -= cost.sheep;
        self.ore -= cost.ore;
        true
    }
}

/// Building costs
pub mod costs {
    use super::ResourceHand;

    /// Cost to build a road: 1 wood, 1 brick
    pub fn road() -> ResourceHand {
        ResourceHand::with_amounts(1, 1, 0, 0, 0)
    }

    /// Cost to build a settlement: 1 wood, 1 brick, 1 wheat, 1 sheep
    pub fn settlement() -> ResourceHand {
        ResourceHand::with_amounts(1, 1, 1, 1, 0)
    }

    /// Cost to upgrade to city: 2 wheat, 3 ore
    pub fn city() -> ResourceHand {
        ResourceHand::with_amounts(0, 0, 2, 0, 3)
    }
}

/// A single player's state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    pub id: PlayerId,
    /// Display name
    pub name: String,
    pub color: PlayerColor,
    pub resources: ResourceHand,
    /// Always equal to `resources.total()`
    pub total_cards: u32,
    pub victory_points: u32,
    /// Pieces on the board
    pub roads: u32,
    pub settlements: u32,
    pub cities: u32,
    /// Never changed by the engine; knights are not implemented
    pub knights: u32,
    /// Never set by the engine
    pub has_longest_road: bool,
    /// Never set by the engine
    pub has_largest_army: bool,
}

impl Player {
    /// Create a new player
    pub fn new(id: PlayerId, name: String, color: PlayerColor) -> Self {
        Self {
            id,
            name,
            color,
            resources: ResourceHand::new(),
            total_cards: 0,
            victory_points: 0,
            roads: 0,
            settlements: 0,
            cities: 0,
            knights: 0,
            has_longest_road: false,
            has_largest_army: false,
        }
    }

    /// Receive resources from the bank
    pub fn gain(&mut self, resource: Resource, amount: u32) {
        self.resources.add(resource, amount);
        self.total_cards = self.resources.total();
    }

    pub fn can_afford(&self, cost: &ResourceHand) -> bool {
        self.resources.can_afford(cost)
    }

    /// Pay a cost to the bank. A short hand is left untouched.
    pub fn pay(&mut self, cost: &ResourceHand) -> Result<(), GameError> {
        if !self.resources.try_subtract(cost) {
            return Err(GameError::InsufficientResources);
        }
        self.total_cards = self.resources.total();
        Ok(())
    }

    pub fn record_road(&mut self) {
        self.roads += 1;
    }

    pub fn record_settlement(&mut self) {
        self.settlements += 1;
        self.victory_points = self.building_points();
    }

    /// A settlement becomes a city: one more point on top of the settlement's
    pub fn record_city(&mut self) {
        self.settlements = self.settlements.saturating_sub(1);
        self.cities += 1;
        self.victory_points = self.building_points();
    }

    /// Victory points implied by the pieces on the board
    pub fn building_points(&self) -> u32 {
        self.settlements + 2 * self.cities
    }
}
