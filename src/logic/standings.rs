//! Points table and top-scorer leaderboard, derived purely from the team list.

use crate::models::{FormEntry, PlayerId, Team, TeamId};
use serde::Serialize;

/// One row of the ranked points table.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct TableRow {
    pub rank: usize,
    pub team_id: TeamId,
    pub team_name: String,
    pub matches_played: u32,
    pub wins: u32,
    pub losses: u32,
    pub points: u32,
    /// Net score margin: points scored minus points conceded.
    pub nsm: i64,
    pub points_scored: u32,
    pub points_conceded: u32,
    /// Most recent results, newest last, capped at 5.
    pub recent_form: Vec<FormEntry>,
}

/// One row of the player leaderboard.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct ScorerRow {
    pub rank: usize,
    pub player_id: PlayerId,
    pub player_name: String,
    pub team_name: String,
    pub score: u32,
    pub coins: u32,
    pub queens: u32,
    pub matches_played: u32,
}

/// Rank teams by points (desc), tie-broken by NSM (desc). Equal entries keep
/// their input order; no further tie-break is defined. Pure, callable at any
/// stage, and happily returns an empty table for an empty league.
pub fn points_table(teams: &[Team]) -> Vec<TableRow> {
    let mut ordered: Vec<&Team> = teams.iter().collect();
    // sort_by is stable, which is what keeps full ties in array order.
    ordered.sort_by(|a, b| b.points.cmp(&a.points).then(b.nsm().cmp(&a.nsm())));
    ordered
        .into_iter()
        .enumerate()
        .map(|(i, team)| TableRow {
            rank: i + 1,
            team_id: team.id,
            team_name: team.name.clone(),
            matches_played: team.matches_played,
            wins: team.wins,
            losses: team.losses,
            points: team.points,
            nsm: team.nsm(),
            points_scored: team.points_scored,
            points_conceded: team.points_conceded,
            recent_form: last_five(&team.recent_form),
        })
        .collect()
}

/// The top 4 team ids from the points table, if at least 4 teams exist.
pub fn top_four(teams: &[Team]) -> Option<[TeamId; 4]> {
    let table = points_table(teams);
    if table.len() < 4 {
        return None;
    }
    Some([
        table[0].team_id,
        table[1].team_id,
        table[2].team_id,
        table[3].team_id,
    ])
}

/// Rank every player across all teams by cumulative score (desc), stable for
/// ties. The first row, if any, is the "Super Striker".
pub fn top_scorers(teams: &[Team]) -> Vec<ScorerRow> {
    let mut players: Vec<(&Team, &crate::models::Player)> = teams
        .iter()
        .flat_map(|t| t.players.iter().map(move |p| (t, p)))
        .collect();
    players.sort_by(|a, b| b.1.score.cmp(&a.1.score));
    players
        .into_iter()
        .enumerate()
        .map(|(i, (team, player))| ScorerRow {
            rank: i + 1,
            player_id: player.id,
            player_name: player.name.clone(),
            team_name: team.name.clone(),
            score: player.score,
            coins: player.coins,
            queens: player.queens,
            matches_played: player.matches_played,
        })
        .collect()
}

fn last_five(form: &[FormEntry]) -> Vec<FormEntry> {
    let start = form.len().saturating_sub(5);
    form[start..].to_vec()
}
