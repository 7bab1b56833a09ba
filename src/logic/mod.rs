//! Tournament business logic: standings, live scoring, results, playoffs,
//! and the mutation gateway everything is invoked through.

mod export;
pub mod gateway;
mod live;
mod playoffs;
mod results;
mod standings;

pub use export::points_table_csv;
pub use gateway::{
    apply, commit, new_invite_code, CommitError, Fixture, IdGen, Intent, PersistError, Persister,
    RandomIds, SequentialIds,
};
pub use live::{live_team_scores, start_match, update_live_score};
pub use playoffs::{champion, end_league_stage, propagate};
pub use results::{delete_match, finalize_result};
pub use standings::{points_table, top_four, top_scorers, ScorerRow, TableRow};
