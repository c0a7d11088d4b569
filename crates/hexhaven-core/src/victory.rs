//! Win detection.

use crate::player::Player;

/// The first player, in seating order, at or above `target` points
pub fn find_winner(players: &[Player], target: u32) -> Option<&Player> {
    players.iter().find(|p| p.victory_points >= target)
}
