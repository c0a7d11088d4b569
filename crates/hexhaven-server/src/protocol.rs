//! WebSocket protocol messages for Hexhaven multiplayer.
//!
//! Every frame is a JSON object `{"type": ..., "payload": ...}`.

use hexhaven_core::{BuildingKind, ChatMessage, GameSnapshot, PlayerId, SessionSummary, TileId, ValidPlacements};
use serde::{Deserialize, Serialize};

/// Messages sent from client to server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "camelCase")]
pub enum ClientMessage {
    /// Open a new game and take the first seat
    #[serde(rename_all = "camelCase")]
    CreateGame { player_name: String },

    /// Take a seat in an existing game
    #[serde(rename_all = "camelCase")]
    JoinGame { game_id: String, player_name: String },

    /// Start the opening draft
    StartGame,

    /// Place a road, settlement or city
    PlaceBuilding {
        #[serde(rename = "type")]
        kind: BuildingKind,
        position: String,
    },

    RollDice,

    #[serde(rename_all = "camelCase")]
    MoveRobber { tile_id: TileId },

    EndTurn,

    /// Send chat message
    ChatMessage { message: String },

    /// Give up the seat
    LeaveGame,

    /// Request the list of open games
    ListGames,

    /// Ping for keepalive
    Ping,
}

/// Messages sent from server to client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "camelCase")]
pub enum ServerMessage {
    /// Welcome message with assigned player ID
    #[serde(rename_all = "camelCase")]
    Welcome { player_id: PlayerId },

    #[serde(rename_all = "camelCase")]
    GameCreated {
        game_id: String,
        game_state: GameSnapshot,
    },

    /// Sent to the player who joined
    #[serde(rename_all = "camelCase")]
    GameJoined { game_state: GameSnapshot },

    /// Sent to everyone else already seated
    #[serde(rename_all = "camelCase")]
    PlayerJoined { game_state: GameSnapshot },

    #[serde(rename_all = "camelCase")]
    PlayerLeft { game_state: GameSnapshot },

    #[serde(rename_all = "camelCase")]
    GameStarted { game_state: GameSnapshot },

    #[serde(rename_all = "camelCase")]
    GameStateUpdated { game_state: GameSnapshot },

    /// Legal sites, sent only to the player who must act next
    ValidPlacements(ValidPlacements),

    /// Chat message received
    ChatMessage(ChatMessage),

    /// Confirms `LeaveGame`
    LeftGame,

    GameList { games: Vec<SessionSummary> },

    /// Error occurred
    Error { message: String },

    /// Keepalive answer with the number of live games
    Pong { games: usize },
}
