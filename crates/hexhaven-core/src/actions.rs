//! Game actions that players can take.
//!
//! This module defines the commands a seated player can send to a session
//! and the events that result from them.

use crate::board::{Resource, TileId};
use crate::placement::BuildingKind;
use crate::player::PlayerId;
use crate::topology::{EdgeId, VertexId};
use serde::{Deserialize, Serialize};

/// All possible in-game actions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameAction {
    /// Place a road on an edge, or a settlement or city on a vertex.
    /// `position` is a `tile-index` site id.
    PlaceBuilding {
        kind: BuildingKind,
        position: String,
    },
    /// Roll both dice (start of a main-game turn)
    RollDice,
    /// Move the robber after a 7
    MoveRobber { tile_id: TileId },
    /// End your turn
    EndTurn,
}

/// Events that occur as a result of actions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEvent {
    /// A settlement was built
    SettlementBuilt {
        player: PlayerId,
        location: VertexId,
    },

    /// A settlement was upgraded to a city
    CityBuilt {
        player: PlayerId,
        location: VertexId,
    },

    /// A road was built
    RoadBuilt {
        player: PlayerId,
        location: EdgeId,
    },

    /// Second-round settlement paid out its neighboring tiles
    StartingResources {
        player: PlayerId,
        resources: Vec<Resource>,
    },

    /// The opening draft is over
    InitialPlacementComplete,

    /// Dice were rolled
    DiceRolled {
        player: PlayerId,
        roll: (u8, u8),
        total: u8,
    },

    /// Resources were distributed after a dice roll
    ResourcesDistributed {
        distributions: Vec<(PlayerId, Resource, u32)>,
    },

    /// The robber was moved
    RobberMoved {
        player: PlayerId,
        from: TileId,
        to: TileId,
    },

    /// Turn ended
    TurnEnded {
        player: PlayerId,
        next_player: PlayerId,
    },

    /// A player won the game
    GameWon {
        player: PlayerId,
        victory_points: u32,
    },
}
