//! Live scoring: the per-match state machine while a match is in progress.

use crate::models::{
    GameMatch, LiveScore, MatchId, MatchStatus, PlayerId, TeamId, Tournament, TournamentError,
};
use chrono::{DateTime, Utc};

/// Start a match: `Upcoming -> InProgress`.
///
/// Records the start time and resets the live tally and queen claim. Fails if
/// the match already started or completed, or if either slot is still TBD.
pub fn start_match(
    tournament: &mut Tournament,
    match_id: MatchId,
    now: DateTime<Utc>,
) -> Result<(), TournamentError> {
    let m = tournament
        .get_match_mut(match_id)
        .ok_or(TournamentError::MatchNotFound(match_id))?;
    if m.status != MatchStatus::Upcoming {
        return Err(TournamentError::AlreadyStarted);
    }
    if m.has_unresolved_slot() {
        return Err(TournamentError::UnresolvedSlot);
    }
    m.status = MatchStatus::InProgress;
    m.start_time = Some(now);
    m.live_scores.clear();
    m.queen_pocketed_by = None;
    Ok(())
}

/// Record a live scoring event for a player in an in-progress match.
///
/// Coin events (`is_queen == false`) add `delta` (+1 pocketed, -1 foul) to the
/// player's live coin count, floored at zero. Queen events set the player's
/// live queen flag, at most once per match across all players.
pub fn update_live_score(
    tournament: &mut Tournament,
    match_id: MatchId,
    player_id: PlayerId,
    delta: i32,
    is_queen: bool,
) -> Result<(), TournamentError> {
    let contestants = {
        let m = tournament
            .get_match(match_id)
            .ok_or(TournamentError::MatchNotFound(match_id))?;
        if m.status != MatchStatus::InProgress {
            return Err(TournamentError::MatchNotInProgress);
        }
        (m.team1.team_id(), m.team2.team_id())
    };
    if !player_in_teams(tournament, player_id, contestants) {
        return Err(TournamentError::PlayerNotFound(player_id));
    }

    let m = tournament
        .get_match_mut(match_id)
        .ok_or(TournamentError::MatchNotFound(match_id))?;
    if is_queen {
        if m.queen_pocketed_by.is_some() {
            return Err(TournamentError::QueenAlreadyClaimed);
        }
        m.live_scores.entry(player_id).or_default().queens = 1;
        m.queen_pocketed_by = Some(player_id);
    } else {
        let score = m.live_scores.entry(player_id).or_default();
        // Fouls cannot drive the live coin count negative.
        score.coins = score.coins.saturating_add_signed(delta);
    }
    Ok(())
}

/// Live score snapshot for an in-progress (or completed) match: each team's
/// running total as the sum of its players' live points.
pub fn live_team_scores(tournament: &Tournament, m: &GameMatch) -> (u32, u32) {
    (
        team_live_total(tournament, m, m.team1.team_id()),
        team_live_total(tournament, m, m.team2.team_id()),
    )
}

fn team_live_total(tournament: &Tournament, m: &GameMatch, team_id: Option<TeamId>) -> u32 {
    let Some(team) = team_id.and_then(|id| tournament.get_team(id)) else {
        return 0;
    };
    team.players
        .iter()
        .filter_map(|p| m.live_scores.get(&p.id))
        .map(LiveScore::points)
        .sum()
}

fn player_in_teams(
    tournament: &Tournament,
    player_id: PlayerId,
    (team1, team2): (Option<TeamId>, Option<TeamId>),
) -> bool {
    [team1, team2]
        .into_iter()
        .flatten()
        .filter_map(|id| tournament.get_team(id))
        .any(|t| t.players.iter().any(|p| p.id == player_id))
}
