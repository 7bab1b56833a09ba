//! Result finalization: committing a final score, folding live stats into
//! player and team aggregates, and exact stat reversal on match deletion.

use crate::logic::playoffs;
use crate::models::{
    MatchId, MatchStatus, Stage, StatDelta, TeamDelta, TeamId, Tournament, TournamentError,
};
use chrono::{DateTime, Utc};

/// Finalize a match: commit the winner and score, update aggregates, and for
/// playoff matches propagate the result through the bracket.
///
/// The loser's score is recorded as 0; see DESIGN.md for this decision. A
/// completed match rejects a second finalization so stats are never folded
/// twice.
pub fn finalize_result(
    tournament: &mut Tournament,
    match_id: MatchId,
    winner_id: TeamId,
    winner_score: u32,
    now: DateTime<Utc>,
) -> Result<(), TournamentError> {
    let (team1_id, team2_id, stage, playoff_type) = {
        let m = tournament
            .get_match(match_id)
            .ok_or(TournamentError::MatchNotFound(match_id))?;
        if m.status == MatchStatus::Completed {
            return Err(TournamentError::AlreadyCompleted);
        }
        let (Some(t1), Some(t2)) = (m.team1.team_id(), m.team2.team_id()) else {
            return Err(TournamentError::UnresolvedSlot);
        };
        if winner_id != t1 && winner_id != t2 {
            return Err(TournamentError::WinnerNotInMatch);
        }
        (t1, t2, m.stage, m.playoff_type)
    };
    let loser_id = if winner_id == team1_id { team2_id } else { team1_id };
    let (team1_score, team2_score) = if winner_id == team1_id {
        (winner_score, 0)
    } else {
        (0, winner_score)
    };

    let mut delta = StatDelta {
        teams: Vec::new(),
        players: Vec::new(),
    };

    // Playoff matches do not count toward the league table.
    if stage == Stage::League {
        let winner = tournament
            .get_team_mut(winner_id)
            .ok_or(TournamentError::TeamNotFound(winner_id))?;
        winner.record_league_result(true, winner_score, 0);
        delta.teams.push(TeamDelta {
            team_id: winner_id,
            won: true,
            scored: winner_score,
            conceded: 0,
        });
        let loser = tournament
            .get_team_mut(loser_id)
            .ok_or(TournamentError::TeamNotFound(loser_id))?;
        loser.record_league_result(false, 0, winner_score);
        delta.teams.push(TeamDelta {
            team_id: loser_id,
            won: false,
            scored: 0,
            conceded: winner_score,
        });
    }

    // Fold the live tally into each named player's cumulative stats, once.
    let live: Vec<_> = tournament
        .get_match(match_id)
        .map(|m| m.live_scores.iter().map(|(id, s)| (*id, *s)).collect())
        .unwrap_or_default();
    for (player_id, score) in live {
        for team_id in [team1_id, team2_id] {
            let player = tournament
                .get_team_mut(team_id)
                .and_then(|t| t.get_player_mut(player_id));
            if let Some(p) = player {
                p.add_match_tally(score.coins, score.queens);
                delta.players.push((player_id, score.coins, score.queens));
                break;
            }
        }
    }

    let m = tournament
        .get_match_mut(match_id)
        .ok_or(TournamentError::MatchNotFound(match_id))?;
    m.status = MatchStatus::Completed;
    m.winner_id = Some(winner_id);
    m.team1_score = Some(team1_score);
    m.team2_score = Some(team2_score);
    m.end_time = Some(now);
    m.applied_stats = Some(delta);

    if stage == Stage::Playoff {
        if let Some(playoff_type) = playoff_type {
            playoffs::propagate(tournament, playoff_type, winner_id, loser_id);
        }
    }

    Ok(())
}

/// Delete a match. A completed match's recorded stat delta is subtracted back
/// from team and player aggregates before removal.
pub fn delete_match(tournament: &mut Tournament, match_id: MatchId) -> Result<(), TournamentError> {
    let idx = tournament
        .matches
        .iter()
        .position(|m| m.id == match_id)
        .ok_or(TournamentError::MatchNotFound(match_id))?;

    if let Some(delta) = tournament.matches[idx].applied_stats.clone() {
        for td in &delta.teams {
            if let Some(team) = tournament.get_team_mut(td.team_id) {
                team.revert_league_result(td.won, td.scored, td.conceded);
            }
        }
        for &(player_id, coins, queens) in &delta.players {
            for team in tournament.teams.iter_mut() {
                if let Some(p) = team.get_player_mut(player_id) {
                    p.remove_match_tally(coins, queens);
                    break;
                }
            }
        }
    }

    tournament.matches.remove(idx);
    Ok(())
}
