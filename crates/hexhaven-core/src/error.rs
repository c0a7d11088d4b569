//! Rejections returned by engine operations.
//!
//! A rejected command never mutates the session, so callers may simply
//! report the message and wait for a corrected command.

use thiserror::Error;

/// Errors that can occur during game actions
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GameError {
    #[error("Not your turn")]
    NotYourTurn,

    #[error("Invalid action for current phase")]
    InvalidPhase,

    #[error("Invalid {0} placement")]
    InvalidPlacement(String),

    #[error("Can only upgrade your own settlements to cities")]
    NotYourSettlement,

    #[error("Invalid robber placement: {0}")]
    InvalidLocation(String),

    #[error("Not enough resources")]
    InsufficientResources,

    #[error("Game is full")]
    GameFull,

    #[error("Need at least {0} players to start")]
    NotEnoughPlayers(usize),

    #[error("Game already started")]
    GameAlreadyStarted,

    #[error("Dice values must be between 1 and 6")]
    InvalidDice,

    #[error("Game is over")]
    GameOver,

    #[error("Player not found")]
    PlayerNotFound,
}

/// Broad class of a rejection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The command is not legal right now
    Validation,
    /// The command refers to something that does not exist
    Structural,
}

impl GameError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            GameError::PlayerNotFound => ErrorKind::Structural,
            _ => ErrorKind::Validation,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_match_client_expectations() {
        assert_eq!(GameError::NotYourTurn.to_string(), "Not your turn");
        assert_eq!(
            GameError::InvalidPlacement("settlement".into()).to_string(),
            "Invalid settlement placement"
        );
        assert_eq!(
            GameError::NotEnoughPlayers(3).to_string(),
            "Need at least 3 players to start"
        );
        assert_eq!(GameError::InsufficientResources.to_string(), "Not enough resources");
    }

    #[test]
    fn test_error_kinds() {
        assert_eq!(GameError::PlayerNotFound.kind(), ErrorKind::Structural);
        assert_eq!(GameError::GameFull.kind(), ErrorKind::Validation);
        assert_eq!(GameError::InvalidPhase.kind(), ErrorKind::Validation);
    }
}
