//! Team and Group data structures, including league table aggregates.

use crate::models::player::{Player, PlayerId};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a team.
pub type TeamId = Uuid;

/// Unique identifier for a group.
pub type GroupId = Uuid;

/// One entry in a team's recent-form sequence.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum FormEntry {
    W,
    L,
}

/// A label partitioning teams. Deleting a group never deletes its teams.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Group {
    pub id: GroupId,
    pub name: String,
}

/// A team: roster of players plus league-stage aggregates.
///
/// League aggregates (`matches_played` through `recent_form`) are updated only
/// when a league match is finalized; playoff matches leave them alone, so
/// `wins + losses == matches_played` holds throughout.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Team {
    pub id: TeamId,
    pub name: String,
    pub color: String,
    pub logo: Option<String>,
    pub group_id: Option<GroupId>,
    pub players: Vec<Player>,
    pub matches_played: u32,
    pub wins: u32,
    pub losses: u32,
    /// 2 per win, 0 per loss. No draws in carrom.
    pub points: u32,
    pub points_scored: u32,
    pub points_conceded: u32,
    /// Append-only; callers show the last 5.
    pub recent_form: Vec<FormEntry>,
}

impl Team {
    /// Create a team with zeroed aggregates and the given roster.
    pub fn new(
        id: TeamId,
        name: impl Into<String>,
        color: impl Into<String>,
        group_id: Option<GroupId>,
        players: Vec<Player>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            color: color.into(),
            logo: None,
            group_id,
            players,
            matches_played: 0,
            wins: 0,
            losses: 0,
            points: 0,
            points_scored: 0,
            points_conceded: 0,
            recent_form: Vec::new(),
        }
    }

    /// Net score margin: points scored minus points conceded.
    pub fn nsm(&self) -> i64 {
        self.points_scored as i64 - self.points_conceded as i64
    }

    /// Mutable player lookup within this team's roster.
    pub fn get_player_mut(&mut self, id: PlayerId) -> Option<&mut Player> {
        self.players.iter_mut().find(|p| p.id == id)
    }

    /// Record a finalized league match from this team's perspective.
    pub fn record_league_result(&mut self, won: bool, scored: u32, conceded: u32) {
        self.matches_played += 1;
        self.points_scored += scored;
        self.points_conceded += conceded;
        if won {
            self.wins += 1;
            self.points += 2;
            self.recent_form.push(FormEntry::W);
        } else {
            self.losses += 1;
            self.recent_form.push(FormEntry::L);
        }
    }

    /// Undo a previously recorded league result (match deletion revert).
    pub fn revert_league_result(&mut self, won: bool, scored: u32, conceded: u32) {
        self.matches_played = self.matches_played.saturating_sub(1);
        self.points_scored = self.points_scored.saturating_sub(scored);
        self.points_conceded = self.points_conceded.saturating_sub(conceded);
        if won {
            self.wins = self.wins.saturating_sub(1);
            self.points = self.points.saturating_sub(2);
        } else {
            self.losses = self.losses.saturating_sub(1);
        }
        // Form is append-only; dropping the newest entry is the closest exact undo
        // when the deleted match was the most recent one.
        self.recent_form.pop();
    }
}
