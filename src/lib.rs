//! Carrom league manager: library with models and business logic.

pub mod logic;
pub mod models;

pub use logic::{
    apply, champion, commit, delete_match, end_league_stage, finalize_result, live_team_scores,
    new_invite_code, points_table, points_table_csv, start_match, top_scorers, update_live_score,
    CommitError, Fixture, IdGen, Intent, PersistError, Persister, RandomIds, ScorerRow,
    SequentialIds, TableRow,
};
pub use models::{
    Action, Collaborator, ErrorKind, FormEntry, GameMatch, Group, GroupId, LiveScore, MatchId,
    MatchStatus, Player, PlayerId, PlayoffType, Role, Stage, StatDelta, Team, TeamDelta, TeamId,
    TeamSlot, Tournament, TournamentError, TournamentId, TournamentStage, UserId,
};
