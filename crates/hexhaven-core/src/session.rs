//! The session aggregate: one game's players, board, buildings and turn.
//!
//! Every command validates completely before it mutates anything, so a
//! rejected command leaves the session exactly as it was.

use crate::actions::{GameAction, GameEvent};
use crate::board::{Board, Tile, TileId};
use crate::config::RulesConfig;
use crate::distribution;
use crate::error::GameError;
use crate::placement::{Building, BuildingKind, Buildings, PlacementValidator, Regime, ValidPlacements};
use crate::player::{costs, Player, PlayerColor, PlayerId, ResourceHand};
use crate::topology::{EdgeId, Topology, VertexId};
use crate::turn::{DraftStep, GamePhase, TurnPhase, TurnState};
use crate::victory;
use chrono::Local;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};
use tracing::debug;

/// Six-character game code
pub type SessionId = String;

/// Lobby status, exposed as `gameState` in snapshots
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    Lobby,
    Playing,
}

fn clock() -> String {
    Local::now().format("%H:%M:%S").to_string()
}

/// Most recent game log lines, oldest first
#[derive(Debug, Clone, Default)]
pub struct GameLog {
    entries: VecDeque<String>,
    capacity: usize,
}

impl GameLog {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append a timestamped line, dropping the oldest past capacity
    pub fn push(&mut self, message: &str) {
        self.entries.push_back(format!("{}: {message}", clock()));
        while self.entries.len() > self.capacity {
            self.entries.pop_front();
        }
    }

    pub fn entries(&self) -> impl Iterator<Item = &String> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    /// Sequential within the session
    pub id: u64,
    pub player_id: PlayerId,
    pub player_name: String,
    pub message: String,
    /// Local wall-clock time, `HH:MM:SS`
    pub timestamp: String,
}

#[derive(Debug, Clone, Default)]
pub struct ChatLog {
    messages: VecDeque<ChatMessage>,
    next_id: u64,
    capacity: usize,
}

impl ChatLog {
    pub fn new(capacity: usize) -> Self {
        Self {
            messages: VecDeque::new(),
            next_id: 1,
            capacity,
        }
    }

    fn post(&mut self, player: &Player, message: String) -> ChatMessage {
        let entry = ChatMessage {
            id: self.next_id,
            player_id: player.id,
            player_name: player.name.clone(),
            message,
            timestamp: clock(),
        };
        self.next_id += 1;
        self.messages.push_back(entry.clone());
        while self.messages.len() > self.capacity {
            self.messages.pop_front();
        }
        entry
    }

    pub fn messages(&self) -> impl Iterator<Item = &ChatMessage> {
        self.messages.iter()
    }
}

/// The full state surface sent to clients
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameSnapshot {
    pub id: SessionId,
    pub players: Vec<Player>,
    pub current_player_index: usize,
    pub board: Vec<Tile>,
    pub dice: [u8; 2],
    pub robber_position: TileId,
    pub game_log: Vec<String>,
    pub turn_phase: TurnPhase,
    pub game_phase: GamePhase,
    pub game_state: SessionStatus,
    pub buildings: Buildings,
    pub initial_placement_round: u8,
    pub chat_messages: Vec<ChatMessage>,
}

/// One line of the open-games listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSummary {
    pub id: SessionId,
    pub players: usize,
    pub max_players: usize,
    pub state: SessionStatus,
    pub phase: GamePhase,
}

/// One game
#[derive(Debug, Clone)]
pub struct Session {
    pub id: SessionId,
    pub rules: RulesConfig,
    /// Seating order
    pub players: Vec<Player>,
    pub board: Board,
    pub topology: Topology,
    pub buildings: Buildings,
    pub turn: TurnState,
    /// Last roll, `(1, 1)` before the first
    pub dice: (u8, u8),
    pub robber_tile: TileId,
    pub status: SessionStatus,
    pub log: GameLog,
    pub chat: ChatLog,
    /// Most recent settlement of each player, for the draft road step
    last_settlement: HashMap<PlayerId, VertexId>,
}

impl Session {
    /// Create a session on a freshly shuffled board
    pub fn new(id: SessionId, rules: RulesConfig) -> Self {
        Self::with_board(id, rules, Board::standard())
    }

    /// Create a session on a given board
    pub fn with_board(id: SessionId, rules: RulesConfig, board: Board) -> Self {
        let topology = Topology::build(&board, rules.adjacency);
        Self {
            id,
            players: Vec::new(),
            topology,
            buildings: Buildings::new(),
            turn: TurnState::new(),
            dice: (1, 1),
            robber_tile: board.desert_id(),
            status: SessionStatus::Lobby,
            log: GameLog::new(rules.log_capacity),
            chat: ChatLog::new(rules.chat_capacity),
            last_settlement: HashMap::new(),
            board,
            rules,
        }
    }

    fn record(&mut self, message: &str) {
        debug!(session = %self.id, "{message}");
        self.log.push(message);
    }

    // ==================== Queries ====================

    pub fn player(&self, id: PlayerId) -> Option<&Player> {
        self.players.iter().find(|p| p.id == id)
    }

    fn player_index(&self, id: PlayerId) -> Result<usize, GameError> {
        self.players
            .iter()
            .position(|p| p.id == id)
            .ok_or(GameError::PlayerNotFound)
    }

    /// The player whose turn it is, if the game has players
    pub fn current_player(&self) -> Option<&Player> {
        self.players.get(self.turn.current_player_index)
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    pub fn is_finished(&self) -> bool {
        self.turn.is_finished()
    }

    pub fn last_settlement(&self, player: PlayerId) -> Option<VertexId> {
        self.last_settlement.get(&player).copied()
    }

    fn validator(&self) -> PlacementValidator<'_> {
        PlacementValidator::new(&self.board, &self.topology, &self.buildings)
    }

    fn regime_for(&self, player: PlayerId) -> Option<Regime> {
        if self.status == SessionStatus::Lobby {
            return None;
        }
        match (self.turn.game_phase, self.turn.turn_phase) {
            (GamePhase::InitialPlacement, TurnPhase::PlaceSettlement) => {
                Some(Regime::InitialSettlement)
            }
            (GamePhase::InitialPlacement, TurnPhase::PlaceRoad) => Some(Regime::InitialRoad {
                last_settlement: self.last_settlement(player),
            }),
            (GamePhase::InitialPlacement, _) => None,
            _ => Some(Regime::Main),
        }
    }

    /// Every legal site for `player` right now. Unknown players and lobby
    /// sessions get an empty set.
    pub fn valid_placements(&self, player: PlayerId) -> ValidPlacements {
        if self.player(player).is_none() {
            return ValidPlacements::default();
        }
        match self.regime_for(player) {
            Some(regime) => self.validator().valid_placements(player, regime),
            None => ValidPlacements::default(),
        }
    }

    /// The player expected to place something next, with their options
    pub fn pending_placements(&self) -> Option<(PlayerId, ValidPlacements)> {
        if self.status != SessionStatus::Playing {
            return None;
        }
        match self.turn.turn_phase {
            TurnPhase::PlaceSettlement | TurnPhase::PlaceRoad | TurnPhase::Build => {
                let player = self.current_player()?.id;
                Some((player, self.valid_placements(player)))
            }
            _ => None,
        }
    }

    pub fn snapshot(&self) -> GameSnapshot {
        GameSnapshot {
            id: self.id.clone(),
            players: self.players.clone(),
            current_player_index: self.turn.current_player_index,
            board: self.board.tiles().to_vec(),
            dice: [self.dice.0, self.dice.1],
            robber_position: self.robber_tile,
            game_log: self.log.entries().cloned().collect(),
            turn_phase: self.turn.turn_phase,
            game_phase: self.turn.game_phase,
            game_state: self.status,
            buildings: self.buildings.clone(),
            initial_placement_round: self.turn.initial_placement_round,
            chat_messages: self.chat.messages().cloned().collect(),
        }
    }

    pub fn summary(&self) -> SessionSummary {
        SessionSummary {
            id: self.id.clone(),
            players: self.players.len(),
            max_players: self.rules.max_players,
            state: self.status,
            phase: self.turn.game_phase,
        }
    }

    // ==================== Lobby ====================

    /// Seat a new player with the first free color
    pub fn add_player(&mut self, id: PlayerId, name: String) -> Result<&Player, GameError> {
        if self.status == SessionStatus::Playing {
            return Err(GameError::GameAlreadyStarted);
        }
        if self.players.len() >= self.rules.max_players {
            return Err(GameError::GameFull);
        }
        let color = PlayerColor::first_free(self.players.iter().map(|p| p.color))
            .ok_or(GameError::GameFull)?;

        self.record(&format!("{name} joined the game"));
        self.players.push(Player::new(id, name, color));
        let index = self.players.len() - 1;
        Ok(&self.players[index])
    }

    /// Unseat a player. Their buildings stay on the board.
    pub fn remove_player(&mut self, id: PlayerId) -> Result<Player, GameError> {
        let index = self.player_index(id)?;
        let player = self.players.remove(index);
        self.last_settlement.remove(&id);
        self.turn.player_removed(self.players.len());
        self.record(&format!("{} left the game", player.name));
        Ok(player)
    }

    /// Start the opening draft. Any seated player may start.
    pub fn start(&mut self, by: PlayerId) -> Result<(), GameError> {
        self.player_index(by)?;
        if self.status == SessionStatus::Playing {
            return Err(GameError::GameAlreadyStarted);
        }
        if self.players.len() < self.rules.min_players {
            return Err(GameError::NotEnoughPlayers(self.rules.min_players));
        }

        self.status = SessionStatus::Playing;
        self.turn.begin();
        let first = self.players[0].name.clone();
        self.record(&format!("Game started! {first} places first settlement."));
        Ok(())
    }

    pub fn post_chat(&mut self, player: PlayerId, message: String) -> Result<ChatMessage, GameError> {
        let index = self.player_index(player)?;
        Ok(self.chat.post(&self.players[index], message))
    }

    // ==================== Game Commands ====================

    /// Apply an action for a seated player
    pub fn apply_action(
        &mut self,
        player: PlayerId,
        action: GameAction,
    ) -> Result<Vec<GameEvent>, GameError> {
        match action {
            GameAction::PlaceBuilding { kind, position } => {
                self.place_building(player, kind, &position)
            }
            GameAction::RollDice => self.roll_dice(player),
            GameAction::MoveRobber { tile_id } => self.move_robber(player, tile_id),
            GameAction::EndTurn => self.end_turn(player),
        }
    }

    /// Seated, game running, and this player's turn
    fn ensure_current(&self, player: PlayerId) -> Result<usize, GameError> {
        let index = self.player_index(player)?;
        if self.status == SessionStatus::Lobby {
            return Err(GameError::InvalidPhase);
        }
        if self.rules.lock_after_victory && self.is_finished() {
            return Err(GameError::GameOver);
        }
        if index != self.turn.current_player_index {
            return Err(GameError::NotYourTurn);
        }
        Ok(index)
    }

    /// Place a road, settlement or city at a `tile-index` site
    pub fn place_building(
        &mut self,
        player: PlayerId,
        kind: BuildingKind,
        position: &str,
    ) -> Result<Vec<GameEvent>, GameError> {
        let index = self.ensure_current(player)?;
        let mut events = match self.turn.game_phase {
            GamePhase::InitialPlacement => self.place_initial(index, kind, position)?,
            GamePhase::MainGame | GamePhase::Finished => self.place_main(index, kind, position)?,
        };
        events.extend(self.check_victory());
        Ok(events)
    }

    fn parse_vertex(kind: BuildingKind, position: &str) -> Result<VertexId, GameError> {
        position
            .parse()
            .map_err(|_| GameError::InvalidPlacement(kind.name().into()))
    }

    fn parse_edge(position: &str) -> Result<EdgeId, GameError> {
        position
            .parse()
            .map_err(|_| GameError::InvalidPlacement(BuildingKind::Road.name().into()))
    }

    fn building_for(&self, index: usize, kind: BuildingKind) -> Building {
        let owner = &self.players[index];
        Building {
            kind,
            owner_id: owner.id,
            owner_color: owner.color,
        }
    }

    fn place_initial(
        &mut self,
        index: usize,
        kind: BuildingKind,
        position: &str,
    ) -> Result<Vec<GameEvent>, GameError> {
        let player = self.players[index].id;
        let name = self.players[index].name.clone();
        let mut events = Vec::new();

        match (self.turn.turn_phase, kind) {
            (TurnPhase::PlaceSettlement, BuildingKind::Settlement) => {
                let requested = Self::parse_vertex(kind, position)?;
                let vertex = self
                    .validator()
                    .settlement_site(player, &requested, Regime::InitialSettlement)
                    .ok_or_else(|| GameError::InvalidPlacement(kind.name().into()))?;

                let building = self.building_for(index, kind);
                self.buildings.set_vertex(vertex, building);
                self.players[index].record_settlement();
                self.last_settlement.insert(player, vertex);
                events.push(GameEvent::SettlementBuilt {
                    player,
                    location: vertex,
                });

                if self.turn.initial_placement_round == 2 {
                    let resources =
                        distribution::starting_resources(&self.board, &self.topology, &vertex);
                    for resource in &resources {
                        self.players[index].gain(*resource, 1);
                    }
                    self.record(&format!("{name} received initial resources"));
                    events.push(GameEvent::StartingResources { player, resources });
                }

                self.turn.settlement_placed();
                self.record(&format!("{name} placed a settlement"));
            }
            (TurnPhase::PlaceRoad, BuildingKind::Road) => {
                let requested = Self::parse_edge(position)?;
                let regime = Regime::InitialRoad {
                    last_settlement: self.last_settlement(player),
                };
                let edge = self
                    .validator()
                    .road_site(player, &requested, regime)
                    .ok_or_else(|| GameError::InvalidPlacement(kind.name().into()))?;

                let building = self.building_for(index, kind);
                self.buildings.set_edge(edge, building);
                self.players[index].record_road();
                events.push(GameEvent::RoadBuilt {
                    player,
                    location: edge,
                });
                self.record(&format!("{name} placed a road"));

                match self.turn.road_placed(self.players.len()) {
                    DraftStep::MainGame => {
                        self.record("Initial placement complete! Main game begins.");
                        events.push(GameEvent::InitialPlacementComplete);
                    }
                    DraftStep::NextPlayer | DraftStep::SecondRound => {
                        let next = self.current_player().map(|p| p.name.clone()).unwrap_or_default();
                        let round = self.turn.initial_placement_round;
                        self.record(&format!(
                            "{next}'s turn to place settlement (Round {round})"
                        ));
                    }
                }
            }
            _ => return Err(GameError::InvalidPhase),
        }

        Ok(events)
    }

    fn place_main(
        &mut self,
        index: usize,
        kind: BuildingKind,
        position: &str,
    ) -> Result<Vec<GameEvent>, GameError> {
        self.turn.expect(TurnPhase::Build)?;
        let player = self.players[index].id;

        let cost: ResourceHand = match kind {
            BuildingKind::Road => costs::road(),
            BuildingKind::Settlement => costs::settlement(),
            BuildingKind::City => costs::city(),
        };
        if !self.players[index].can_afford(&cost) {
            return Err(GameError::InsufficientResources);
        }

        let event = match kind {
            BuildingKind::Road => {
                let requested = Self::parse_edge(position)?;
                let edge = self
                    .validator()
                    .road_site(player, &requested, Regime::Main)
                    .ok_or_else(|| GameError::InvalidPlacement(kind.name().into()))?;
                self.players[index].pay(&cost)?;
                let building = self.building_for(index, kind);
                self.buildings.set_edge(edge, building);
                self.players[index].record_road();
                GameEvent::RoadBuilt {
                    player,
                    location: edge,
                }
            }
            BuildingKind::Settlement => {
                let requested = Self::parse_vertex(kind, position)?;
                let vertex = self
                    .validator()
                    .settlement_site(player, &requested, Regime::Main)
                    .ok_or_else(|| GameError::InvalidPlacement(kind.name().into()))?;
                self.players[index].pay(&cost)?;
                let building = self.building_for(index, kind);
                self.buildings.set_vertex(vertex, building);
                self.players[index].record_settlement();
                self.last_settlement.insert(player, vertex);
                GameEvent::SettlementBuilt {
                    player,
                    location: vertex,
                }
            }
            BuildingKind::City => {
                let requested =
                    Self::parse_vertex(kind, position).map_err(|_| GameError::NotYourSettlement)?;
                let vertex = self
                    .validator()
                    .city_site(player, &requested)
                    .ok_or(GameError::NotYourSettlement)?;
                self.players[index].pay(&cost)?;
                let building = self.building_for(index, kind);
                self.buildings.set_vertex(vertex, building);
                self.players[index].record_city();
                GameEvent::CityBuilt {
                    player,
                    location: vertex,
                }
            }
        };

        let name = self.players[index].name.clone();
        self.record(&format!("{name} built a {}", kind.name()));
        Ok(vec![event])
    }

    /// Declare the first player at the target score the winner, once
    fn check_victory(&mut self) -> Option<GameEvent> {
        if self.is_finished() {
            return None;
        }
        let winner = victory::find_winner(&self.players, self.rules.victory_points_to_win)?;
        let (player, name, victory_points) = (winner.id, winner.name.clone(), winner.victory_points);

        self.turn.finish();
        self.record(&format!("{name} wins with {victory_points} victory points!"));
        Some(GameEvent::GameWon {
            player,
            victory_points,
        })
    }

    /// Roll two fair dice
    pub fn roll_dice(&mut self, player: PlayerId) -> Result<Vec<GameEvent>, GameError> {
        let mut rng = rand::thread_rng();
        let roll = (rng.gen_range(1..=6), rng.gen_range(1..=6));
        self.resolve_roll(player, roll)
    }

    /// Apply a known roll: a 7 wakes the robber, anything else pays out
    pub fn resolve_roll(
        &mut self,
        player: PlayerId,
        roll: (u8, u8),
    ) -> Result<Vec<GameEvent>, GameError> {
        let index = self.ensure_current(player)?;
        self.turn.expect(TurnPhase::Roll)?;
        if !(1..=6).contains(&roll.0) || !(1..=6).contains(&roll.1) {
            return Err(GameError::InvalidDice);
        }

        let total = roll.0 + roll.1;
        let name = self.players[index].name.clone();
        self.dice = roll;
        self.record(&format!("{name} rolled {total} ({}, {})", roll.0, roll.1));

        let mut events = vec![GameEvent::DiceRolled {
            player,
            roll,
            total,
        }];

        if total == 7 {
            self.record("Robber activated! Move the robber.");
        } else {
            let distributions = distribution::roll_payouts(
                &self.board,
                &self.topology,
                &self.buildings,
                self.robber_tile,
                total,
            );
            for (owner, resource, amount) in &distributions {
                if let Some(p) = self.players.iter_mut().find(|p| p.id == *owner) {
                    p.gain(*resource, *amount);
                }
            }
            self.record(&format!("Resources distributed for roll {total}"));
            events.push(GameEvent::ResourcesDistributed { distributions });
        }

        self.turn.dice_rolled(total);
        debug!(session = %self.id, phase = ?self.turn.turn_phase, "roll resolved");
        Ok(events)
    }

    /// Move the robber to any land tile
    pub fn move_robber(
        &mut self,
        player: PlayerId,
        tile_id: TileId,
    ) -> Result<Vec<GameEvent>, GameError> {
        let index = self.ensure_current(player)?;
        self.turn.expect(TurnPhase::Robber)?;
        if !self.board.is_land(tile_id) {
            return Err(GameError::InvalidLocation(format!("tile {tile_id}")));
        }

        let from = self.robber_tile;
        self.robber_tile = tile_id;
        self.turn.robber_moved();
        let name = self.players[index].name.clone();
        self.record(&format!("{name} moved the robber"));
        Ok(vec![GameEvent::RobberMoved {
            player,
            from,
            to: tile_id,
        }])
    }

    /// Pass the turn to the next player
    pub fn end_turn(&mut self, player: PlayerId) -> Result<Vec<GameEvent>, GameError> {
        let index = self.ensure_current(player)?;
        self.turn.expect(TurnPhase::Build)?;

        let name = self.players[index].name.clone();
        self.record(&format!("{name}'s turn ended"));
        self.turn.end_turn(self.players.len());
        let next_player = self.players[self.turn.current_player_index].id;
        Ok(vec![GameEvent::TurnEnded {
            player,
            next_player,
        }])
    }
}
