//! Playoff bracket engine: generation from final league standings and
//! winner/loser propagation through the fixed 4-match bracket.

use crate::logic::gateway::IdGen;
use crate::logic::standings;
use crate::models::{
    GameMatch, MatchStatus, PlayoffType, Stage, TeamId, TeamSlot, Tournament, TournamentError,
    TournamentStage,
};
use chrono::{DateTime, Duration, Utc};

/// Fixed start time for scheduled playoff matches.
const PLAYOFF_START_HOUR: u32 = 18;

/// End the league stage: seed the top four teams from the points table into
/// the fixed bracket and move the tournament into playoffs.
///
/// Qualifier 1 pits rank 1 vs rank 2, the Eliminator rank 3 vs rank 4;
/// Qualifier 2 and the Final start with both slots TBD. Matches are scheduled
/// on consecutive days after the last completed league match (or now, if no
/// league match was played).
pub fn end_league_stage(
    tournament: &mut Tournament,
    ids: &mut dyn IdGen,
    now: DateTime<Utc>,
) -> Result<(), TournamentError> {
    if tournament.stage != TournamentStage::League
        || tournament.matches.iter().any(|m| m.stage == Stage::Playoff)
    {
        return Err(TournamentError::PlayoffsAlreadyGenerated);
    }
    let Some([rank1, rank2, rank3, rank4]) = standings::top_four(&tournament.teams) else {
        return Err(TournamentError::NotEnoughTeams {
            required: 4,
            available: tournament.teams.len(),
        });
    };

    let base = tournament
        .matches
        .iter()
        .filter(|m| m.status == MatchStatus::Completed)
        .map(|m| m.date)
        .max()
        .unwrap_or(now);

    let rounds = [
        ("Qualifier 1", PlayoffType::Qualifier1, TeamSlot::Team(rank1), TeamSlot::Team(rank2)),
        ("Eliminator", PlayoffType::Eliminator, TeamSlot::Team(rank3), TeamSlot::Team(rank4)),
        ("Qualifier 2", PlayoffType::Qualifier2, TeamSlot::Tbd, TeamSlot::Tbd),
        ("Final", PlayoffType::Final, TeamSlot::Tbd, TeamSlot::Tbd),
    ];
    for (offset, (name, playoff_type, team1, team2)) in rounds.into_iter().enumerate() {
        let date = scheduled_date(base, offset as i64 + 1);
        tournament.matches.push(GameMatch::playoff(
            ids.id(),
            name,
            playoff_type,
            team1,
            team2,
            date,
        ));
    }

    tournament.stage = TournamentStage::Playoffs;
    Ok(())
}

/// Propagate a finalized playoff result into its dependent matches.
///
/// Qualifier 1: winner to the Final, loser to Qualifier 2. Eliminator: winner
/// to Qualifier 2. Qualifier 2: winner to the Final. Final: the tournament is
/// over.
pub fn propagate(
    tournament: &mut Tournament,
    completed: PlayoffType,
    winner_id: TeamId,
    loser_id: TeamId,
) {
    match completed {
        PlayoffType::Qualifier1 => {
            set_slot(tournament, PlayoffType::Final, Side::Team1, winner_id);
            set_slot(tournament, PlayoffType::Qualifier2, Side::Team1, loser_id);
        }
        PlayoffType::Eliminator => {
            set_slot(tournament, PlayoffType::Qualifier2, Side::Team2, winner_id);
        }
        PlayoffType::Qualifier2 => {
            set_slot(tournament, PlayoffType::Final, Side::Team2, winner_id);
        }
        PlayoffType::Final => {
            tournament.stage = TournamentStage::Completed;
        }
    }
}

/// The tournament champion: winner of the Final, once it is decided.
pub fn champion(tournament: &Tournament) -> Option<TeamId> {
    if tournament.stage != TournamentStage::Completed {
        return None;
    }
    tournament
        .matches
        .iter()
        .find(|m| m.playoff_type == Some(PlayoffType::Final))
        .and_then(|m| m.winner_id)
}

enum Side {
    Team1,
    Team2,
}

fn set_slot(tournament: &mut Tournament, round: PlayoffType, side: Side, team_id: TeamId) {
    let fixture = tournament
        .matches
        .iter_mut()
        .find(|m| m.playoff_type == Some(round));
    if let Some(m) = fixture {
        match side {
            Side::Team1 => m.team1 = TeamSlot::Team(team_id),
            Side::Team2 => m.team2 = TeamSlot::Team(team_id),
        }
    }
}

fn scheduled_date(base: DateTime<Utc>, days: i64) -> DateTime<Utc> {
    (base + Duration::days(days))
        .date_naive()
        .and_hms_opt(PLAYOFF_START_HOUR, 0, 0)
        .map(|naive| naive.and_utc())
        .unwrap_or(base + Duration::days(days))
}
