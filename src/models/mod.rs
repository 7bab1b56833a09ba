//! Data structures for the carrom league: players, teams, matches, tournaments.

mod game;
mod player;
mod team;
mod tournament;

pub use game::{
    GameMatch, LiveScore, MatchId, MatchStatus, PlayoffType, Stage, StatDelta, TeamDelta, TeamSlot,
};
pub use player::{Player, PlayerId};
pub use team::{FormEntry, Group, GroupId, Team, TeamId};
pub use tournament::{
    Action, Collaborator, ErrorKind, Role, Tournament, TournamentError, TournamentId,
    TournamentStage, UserId,
};
