//! Turn and phase bookkeeping.
//!
//! `TurnState` only knows indices and phases. Ownership checks against the
//! player list and all board effects live in the session.

use crate::error::GameError;
use serde::{Deserialize, Serialize};

/// Overall stage of the game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GamePhase {
    /// Opening snake draft
    InitialPlacement,
    MainGame,
    /// A player reached the target score
    Finished,
}

/// What the current player is expected to do next
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnPhase {
    /// Lobby, before the game starts
    Waiting,
    PlaceSettlement,
    PlaceRoad,
    Roll,
    Build,
    /// A 7 was rolled and the robber must move
    Robber,
}

/// Outcome of finishing one draft visit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DraftStep {
    /// Another player places next in the same round
    NextPlayer,
    /// Round 1 is done; the last player places again to open round 2
    SecondRound,
    /// Round 2 is done; regular play begins with player 0
    MainGame,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnState {
    pub game_phase: GamePhase,
    pub turn_phase: TurnPhase,
    pub current_player_index: usize,
    /// 1 or 2 during the draft
    pub initial_placement_round: u8,
}

impl Default for TurnState {
    fn default() -> Self {
        Self::new()
    }
}

impl TurnState {
    pub fn new() -> Self {
        Self {
            game_phase: GamePhase::InitialPlacement,
            turn_phase: TurnPhase::Waiting,
            current_player_index: 0,
            initial_placement_round: 1,
        }
    }

    /// Open the draft with player 0
    pub fn begin(&mut self) {
        self.game_phase = GamePhase::InitialPlacement;
        self.turn_phase = TurnPhase::PlaceSettlement;
        self.current_player_index = 0;
        self.initial_placement_round = 1;
    }

    pub fn is_finished(&self) -> bool {
        self.game_phase == GamePhase::Finished
    }

    pub fn expect(&self, phase: TurnPhase) -> Result<(), GameError> {
        if self.turn_phase == phase {
            Ok(())
        } else {
            Err(GameError::InvalidPhase)
        }
    }

    pub fn settlement_placed(&mut self) {
        self.turn_phase = TurnPhase::PlaceRoad;
    }

    /// Advance the snake draft after a road: forward in round 1, backward
    /// in round 2
    pub fn road_placed(&mut self, player_count: usize) -> DraftStep {
        let step = if self.initial_placement_round == 1 {
            if self.current_player_index + 1 >= player_count {
                self.initial_placement_round = 2;
                self.current_player_index = player_count.saturating_sub(1);
                DraftStep::SecondRound
            } else {
                self.current_player_index += 1;
                DraftStep::NextPlayer
            }
        } else if self.current_player_index == 0 {
            self.game_phase = GamePhase::MainGame;
            self.current_player_index = 0;
            DraftStep::MainGame
        } else {
            self.current_player_index -= 1;
            DraftStep::NextPlayer
        };

        self.turn_phase = match step {
            DraftStep::MainGame => TurnPhase::Roll,
            _ => TurnPhase::PlaceSettlement,
        };
        step
    }

    /// A 7 sends the player to the robber, anything else to building
    pub fn dice_rolled(&mut self, total: u8) {
        self.turn_phase = if total == 7 {
            TurnPhase::Robber
        } else {
            TurnPhase::Build
        };
    }

    pub fn robber_moved(&mut self) {
        self.turn_phase = TurnPhase::Build;
    }

    /// Pass the turn to the next player in order
    pub fn end_turn(&mut self, player_count: usize) {
        if player_count > 0 {
            self.current_player_index = (self.current_player_index + 1) % player_count;
        }
        self.turn_phase = TurnPhase::Roll;
    }

    pub fn finish(&mut self) {
        self.game_phase = GamePhase::Finished;
    }

    /// Keep the index valid after a player leaves
    pub fn player_removed(&mut self, player_count: usize) {
        if self.current_player_index >= player_count {
            self.current_player_index = 0;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_new_is_waiting() {
        let turn = TurnState::new();
        assert_eq!(turn.turn_phase, TurnPhase::Waiting);
        assert_eq!(turn.game_phase, GamePhase::InitialPlacement);
    }

    #[test]
    fn test_snake_draft_order() {
        let mut turn = TurnState::new();
        turn.begin();

        let mut visits = Vec::new();
        let mut steps = Vec::new();
        loop {
            visits.push((turn.initial_placement_round, turn.current_player_index));
            turn.settlement_placed();
            assert_eq!(turn.turn_phase, TurnPhase::PlaceRoad);
            let step = turn.road_placed(4);
            steps.push(step);
            if step == DraftStep::MainGame {
                break;
            }
            assert_eq!(turn.turn_phase, TurnPhase::PlaceSettlement);
        }

        assert_eq!(
            visits,
            vec![(1, 0), (1, 1), (1, 2), (1, 3), (2, 3), (2, 2), (2, 1), (2, 0)]
        );
        assert_eq!(steps[3], DraftStep::SecondRound);
        assert_eq!(turn.game_phase, GamePhase::MainGame);
        assert_eq!(turn.turn_phase, TurnPhase::Roll);
        assert_eq!(turn.current_player_index, 0);
    }

    #[test]
    fn test_roll_outcomes() {
        let mut turn = TurnState::new();
        turn.dice_rolled(7);
        assert_eq!(turn.turn_phase, TurnPhase::Robber);
        turn.robber_moved();
        assert_eq!(turn.turn_phase, TurnPhase::Build);

        for total in [2, 3, 6, 8, 12] {
            turn.turn_phase = TurnPhase::Roll;
            turn.dice_rolled(total);
            assert_eq!(turn.turn_phase, TurnPhase::Build);
        }
    }

    #[test]
    fn test_end_turn_wraps() {
        let mut turn = TurnState::new();
        turn.current_player_index = 2;
        turn.turn_phase = TurnPhase::Build;
        turn.end_turn(3);
        assert_eq!(turn.current_player_index, 0);
        assert_eq!(turn.turn_phase, TurnPhase::Roll);
    }

    #[test]
    fn test_expect_phase() {
        let mut turn = TurnState::new();
        turn.begin();
        assert_eq!(turn.expect(TurnPhase::PlaceSettlement), Ok(()));
        assert_eq!(turn.expect(TurnPhase::Roll), Err(GameError::InvalidPhase));
    }

    #[test]
    fn test_player_removed_resets_index() {
        let mut turn = TurnState::new();
        turn.current_player_index = 2;
        turn.player_removed(3);
        assert_eq!(turn.current_player_index, 2);
        turn.player_removed(2);
        assert_eq!(turn.current_player_index, 0);
    }
}
