//! Hexhaven - a multiplayer hex-board settlement game engine
//!
//! This crate provides the authoritative game logic for Hexhaven, including:
//! - Hex coordinate system and the fixed 37-tile board
//! - Vertex/edge topology and placement legality
//! - The turn and phase state machine, from the opening draft to victory
//! - Resource production from dice rolls
//!
//! # Architecture
//!
//! The engine performs no I/O. A [`Session`] receives commands, validates
//! them completely, mutates its own state and returns events. Callers
//! broadcast [`Session::snapshot`] and [`Session::pending_placements`].
//!
//! # Modules
//!
//! - [`hex`]: Axial coordinates for tiles, corners and sides
//! - [`board`]: Board generation
//! - [`topology`]: Site ids and adjacency
//! - [`placement`]: Buildings and placement rules
//! - [`turn`]: Turn and phase transitions
//! - [`distribution`]: Resource payouts
//! - [`victory`]: Win detection
//! - [`session`]: The session aggregate and its snapshot

pub mod actions;
pub mod board;
pub mod config;
pub mod distribution;
pub mod error;
pub mod hex;
pub mod placement;
pub mod player;
pub mod session;
pub mod topology;
pub mod turn;
pub mod victory;

// Re-export commonly used types
pub use actions::{GameAction, GameEvent};
pub use board::{Board, Resource, Tile, TileId, TileType};
pub use config::{ConfigError, RulesConfig};
pub use error::{ErrorKind, GameError};
pub use hex::{Direction, HexCoord};
pub use placement::{Building, BuildingKind, Buildings, ValidPlacements};
pub use player::{Player, PlayerColor, PlayerId, ResourceHand};
pub use session::{ChatMessage, GameSnapshot, Session, SessionId, SessionStatus, SessionSummary};
pub use topology::{Adjacency, EdgeId, Topology, VertexId};
pub use turn::{GamePhase, TurnPhase};
