//! Match data structures: stages, playoff rounds, team slots, live scores.

use crate::models::player::PlayerId;
use crate::models::team::TeamId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// Unique identifier for a match.
pub type MatchId = Uuid;

/// Phase a single match belongs to (distinct from the tournament-wide stage).
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    League,
    Playoff,
}

/// Which round of the fixed 4-match playoff bracket a match is.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlayoffType {
    Qualifier1,
    Eliminator,
    Qualifier2,
    Final,
}

/// Match lifecycle. One-directional: no regression from Completed.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStatus {
    #[default]
    Upcoming,
    InProgress,
    Completed,
}

/// A team slot in a fixture. Playoff matches hold `Tbd` until a feeder
/// match resolves; a match may not start while either slot is `Tbd`.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TeamSlot {
    Tbd,
    Team(TeamId),
}

impl TeamSlot {
    pub fn team_id(&self) -> Option<TeamId> {
        match self {
            TeamSlot::Team(id) => Some(*id),
            TeamSlot::Tbd => None,
        }
    }

    pub fn is_tbd(&self) -> bool {
        matches!(self, TeamSlot::Tbd)
    }
}

/// A player's running tally while a match is in progress.
/// `queens` is a binary flag captured as 0/1, not a counter.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct LiveScore {
    pub coins: u32,
    pub queens: u32,
}

impl LiveScore {
    /// Live point value: coins plus 3 per queen.
    pub fn points(&self) -> u32 {
        self.coins + self.queens * 3
    }
}

/// League-table changes one finalization applied to a team.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct TeamDelta {
    pub team_id: TeamId,
    pub won: bool,
    pub scored: u32,
    pub conceded: u32,
}

/// Exactly what finalizing this match added, kept so deletion can subtract
/// it back without re-deriving the reversal.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct StatDelta {
    /// Empty for playoff matches (playoffs do not touch league aggregates).
    pub teams: Vec<TeamDelta>,
    /// Per-player folded tallies: (player, coins, queens).
    pub players: Vec<(PlayerId, u32, u32)>,
}

/// A single fixture between two teams.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct GameMatch {
    pub id: MatchId,
    /// Playoff round label, e.g. "Qualifier 1". None for league matches.
    pub name: Option<String>,
    pub stage: Stage,
    pub playoff_type: Option<PlayoffType>,
    pub team1: TeamSlot,
    pub team2: TeamSlot,
    /// Scheduled instant.
    pub date: DateTime<Utc>,
    pub status: MatchStatus,
    pub winner_id: Option<TeamId>,
    pub team1_score: Option<u32>,
    pub team2_score: Option<u32>,
    /// Accumulated only while in progress; folded into player stats at finalization.
    pub live_scores: HashMap<PlayerId, LiveScore>,
    /// At most one player per match may claim the queen.
    pub queen_pocketed_by: Option<PlayerId>,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    /// Set once at finalization; consumed by delete-with-revert.
    pub applied_stats: Option<StatDelta>,
}

impl GameMatch {
    /// Create an upcoming league fixture between two concrete teams.
    pub fn league(id: MatchId, team1: TeamId, team2: TeamId, date: DateTime<Utc>) -> Self {
        Self {
            id,
            name: None,
            stage: Stage::League,
            playoff_type: None,
            team1: TeamSlot::Team(team1),
            team2: TeamSlot::Team(team2),
            date,
            status: MatchStatus::Upcoming,
            winner_id: None,
            team1_score: None,
            team2_score: None,
            live_scores: HashMap::new(),
            queen_pocketed_by: None,
            start_time: None,
            end_time: None,
            applied_stats: None,
        }
    }

    /// Create an upcoming playoff fixture; slots may still be `Tbd`.
    pub fn playoff(
        id: MatchId,
        name: impl Into<String>,
        playoff_type: PlayoffType,
        team1: TeamSlot,
        team2: TeamSlot,
        date: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            name: Some(name.into()),
            stage: Stage::Playoff,
            playoff_type: Some(playoff_type),
            team1,
            team2,
            date,
            status: MatchStatus::Upcoming,
            winner_id: None,
            team1_score: None,
            team2_score: None,
            live_scores: HashMap::new(),
            queen_pocketed_by: None,
            start_time: None,
            end_time: None,
            applied_stats: None,
        }
    }

    /// True if the given team occupies one of this fixture's slots.
    pub fn involves(&self, team_id: TeamId) -> bool {
        self.team1.team_id() == Some(team_id) || self.team2.team_id() == Some(team_id)
    }

    /// True if either slot is still an unresolved placeholder.
    pub fn has_unresolved_slot(&self) -> bool {
        self.team1.is_tbd() || self.team2.is_tbd()
    }
}
