//! Player data structures and cumulative scoring stats.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a player (used in live scores and lookups).
pub type PlayerId = Uuid;

/// A player on a team. Cumulative stats are only touched during match finalization.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    /// Total points across finalized matches: coins + 3 per queen.
    pub score: u32,
    pub coins: u32,
    pub queens: u32,
    pub matches_played: u32,
}

impl Player {
    /// Create a new player with the given id and name. Stats start at zero.
    pub fn new(id: PlayerId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            score: 0,
            coins: 0,
            queens: 0,
            matches_played: 0,
        }
    }

    /// Fold one match's live tally into the cumulative stats.
    pub fn add_match_tally(&mut self, coins: u32, queens: u32) {
        self.score += coins + queens * 3;
        self.coins += coins;
        self.queens += queens;
        self.matches_played += 1;
    }

    /// Subtract a previously folded tally (match deletion revert).
    pub fn remove_match_tally(&mut self, coins: u32, queens: u32) {
        self.score = self.score.saturating_sub(coins + queens * 3);
        self.coins = self.coins.saturating_sub(coins);
        self.queens = self.queens.saturating_sub(queens);
        self.matches_played = self.matches_played.saturating_sub(1);
    }
}
