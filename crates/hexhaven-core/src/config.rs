//! Rules configuration for a session.

use crate::player::PlayerColor;
use crate::topology::Adjacency;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse rules: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid rules: {0}")]
    Invalid(String),
}

/// Tunable rules. Every field has a default, so `{}` is a valid config.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RulesConfig {
    /// Players needed before the game can start
    pub min_players: usize,
    /// Seats in a session
    pub max_players: usize,
    pub victory_points_to_win: u32,
    /// Entries kept in the game log
    pub log_capacity: usize,
    /// Messages kept in the chat history
    pub chat_capacity: usize,
    pub adjacency: Adjacency,
    /// Reject every game command once a winner is declared
    pub lock_after_victory: bool,
}

impl Default for RulesConfig {
    fn default() -> Self {
        Self {
            min_players: 3,
            max_players: 6,
            victory_points_to_win: 10,
            log_capacity: 20,
            chat_capacity: 100,
            adjacency: Adjacency::TileLocal,
            lock_after_victory: false,
        }
    }
}

impl RulesConfig {
    /// Parse and validate a JSON rules document
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let rules: RulesConfig = serde_json::from_str(json)?;
        rules.validate()?;
        Ok(rules)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let seats = PlayerColor::ALL.len();
        if self.min_players < 2 || self.min_players > self.max_players {
            return Err(ConfigError::Invalid(format!(
                "min_players must be between 2 and max_players, got {}",
                self.min_players
            )));
        }
        if self.max_players > seats {
            return Err(ConfigError::Invalid(format!(
                "max_players must be at most {seats}, got {}",
                self.max_players
            )));
        }
        // The opening draft alone hands out two points each
        if self.victory_points_to_win <= 2 {
            return Err(ConfigError::Invalid(format!(
                "victory_points_to_win must be at least 3, got {}",
                self.victory_points_to_win
            )));
        }
        if self.log_capacity == 0 || self.chat_capacity == 0 {
            return Err(ConfigError::Invalid("capacities must be positive".into()));
        }
        Ok(())
    }
}
