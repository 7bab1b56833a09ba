//! Integration tests for match result finalization and stat reversal.

use carrom_league_web::{
    delete_match, finalize_result, start_match, update_live_score, FormEntry, GameMatch, MatchId,
    MatchStatus, Player, PlayerId, Team, TeamId, Tournament, TournamentError, TournamentId, UserId,
};
use chrono::{TimeZone, Utc};

fn date() -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, 18, 0, 0).unwrap()
}

fn pid(n: u128) -> PlayerId {
    PlayerId::from_u128(n)
}

fn tid(n: u128) -> TeamId {
    TeamId::from_u128(n)
}

fn mid() -> MatchId {
    MatchId::from_u128(100)
}

fn fixture() -> Tournament {
    let mut t = Tournament::new(
        TournamentId::from_u128(1),
        "Test League",
        UserId::from_u128(0xA0),
        "AB12CD34",
    );
    t.teams.push(Team::new(
        tid(10),
        "Alpha",
        "#ef4444",
        None,
        vec![Player::new(pid(11), "Asha"), Player::new(pid(12), "Arun")],
    ));
    t.teams.push(Team::new(
        tid(20),
        "Bravo",
        "#3b82f6",
        None,
        vec![Player::new(pid(21), "Bala")],
    ));
    t.matches.push(GameMatch::league(mid(), tid(10), tid(20), date()));
    t
}

#[test]
fn finalize_updates_match_and_team_aggregates() {
    let mut t = fixture();
    finalize_result(&mut t, mid(), tid(10), 15, date()).unwrap();

    let m = t.get_match(mid()).unwrap();
    assert_eq!(m.status, MatchStatus::Completed);
    assert_eq!(m.winner_id, Some(tid(10)));
    assert_eq!((m.team1_score, m.team2_score), (Some(15), Some(0)));
    assert_eq!(m.end_time, Some(date()));

    let winner = t.get_team(tid(10)).unwrap();
    assert_eq!(winner.points, 2);
    assert_eq!((winner.wins, winner.losses, winner.matches_played), (1, 0, 1));
    assert_eq!((winner.points_scored, winner.points_conceded), (15, 0));
    assert_eq!(winner.recent_form, [FormEntry::W]);

    let loser = t.get_team(tid(20)).unwrap();
    assert_eq!(loser.points, 0);
    assert_eq!((loser.wins, loser.losses, loser.matches_played), (0, 1, 1));
    assert_eq!((loser.points_scored, loser.points_conceded), (0, 15));
    assert_eq!(loser.recent_form, [FormEntry::L]);
}

#[test]
fn wins_plus_losses_equals_matches_played() {
    let mut t = fixture();
    t.matches
        .push(GameMatch::league(MatchId::from_u128(101), tid(20), tid(10), date()));
    finalize_result(&mut t, mid(), tid(10), 9, date()).unwrap();
    finalize_result(&mut t, MatchId::from_u128(101), tid(20), 7, date()).unwrap();
    for team in &t.teams {
        assert_eq!(team.wins + team.losses, team.matches_played);
    }
}

#[test]
fn finalize_folds_live_tally_into_player_stats() {
    let mut t = fixture();
    start_match(&mut t, mid(), date()).unwrap();
    update_live_score(&mut t, mid(), pid(11), 1, false).unwrap();
    update_live_score(&mut t, mid(), pid(11), 1, false).unwrap();
    update_live_score(&mut t, mid(), pid(11), 0, true).unwrap();
    update_live_score(&mut t, mid(), pid(21), 1, false).unwrap();

    finalize_result(&mut t, mid(), tid(10), 5, date()).unwrap();

    let asha = &t.get_team(tid(10)).unwrap().players[0];
    assert_eq!((asha.coins, asha.queens), (2, 1));
    assert_eq!(asha.score, 5); // 2 coins + 3 for the queen
    assert_eq!(asha.matches_played, 1);

    let bala = &t.get_team(tid(20)).unwrap().players[0];
    assert_eq!((bala.coins, bala.queens, bala.score), (1, 0, 1));

    // Arun never scored and never played.
    let arun = &t.get_team(tid(10)).unwrap().players[1];
    assert_eq!((arun.score, arun.matches_played), (0, 0));
}

#[test]
fn double_finalize_is_a_conflict_and_counts_once() {
    let mut t = fixture();
    start_match(&mut t, mid(), date()).unwrap();
    update_live_score(&mut t, mid(), pid(11), 1, false).unwrap();
    finalize_result(&mut t, mid(), tid(10), 8, date()).unwrap();
    assert_eq!(
        finalize_result(&mut t, mid(), tid(10), 8, date()),
        Err(TournamentError::AlreadyCompleted)
    );
    let winner = t.get_team(tid(10)).unwrap();
    assert_eq!(winner.points, 2);
    assert_eq!(winner.matches_played, 1);
    assert_eq!(winner.players[0].coins, 1);
}

#[test]
fn winner_must_be_a_contestant() {
    let mut t = fixture();
    let outsider = tid(999);
    assert_eq!(
        finalize_result(&mut t, mid(), outsider, 5, date()),
        Err(TournamentError::WinnerNotInMatch)
    );
    assert_eq!(t.get_match(mid()).unwrap().status, MatchStatus::Upcoming);
}

#[test]
fn unknown_match_is_not_found() {
    let mut t = fixture();
    let missing = MatchId::from_u128(404);
    assert_eq!(
        finalize_result(&mut t, missing, tid(10), 5, date()),
        Err(TournamentError::MatchNotFound(missing))
    );
}

#[test]
fn deleting_a_completed_match_reverts_exactly_what_was_added() {
    let mut t = fixture();
    start_match(&mut t, mid(), date()).unwrap();
    update_live_score(&mut t, mid(), pid(11), 1, false).unwrap();
    update_live_score(&mut t, mid(), pid(11), 0, true).unwrap();
    finalize_result(&mut t, mid(), tid(10), 12, date()).unwrap();

    delete_match(&mut t, mid()).unwrap();

    assert!(t.get_match(mid()).is_none());
    for team in &t.teams {
        assert_eq!(team.points, 0);
        assert_eq!((team.wins, team.losses, team.matches_played), (0, 0, 0));
        assert_eq!((team.points_scored, team.points_conceded), (0, 0));
        assert!(team.recent_form.is_empty());
    }
    let asha = &t.get_team(tid(10)).unwrap().players[0];
    assert_eq!((asha.score, asha.coins, asha.queens, asha.matches_played), (0, 0, 0, 0));
}

#[test]
fn deleting_an_upcoming_match_touches_no_stats() {
    let mut t = fixture();
    delete_match(&mut t, mid()).unwrap();
    assert!(t.matches.is_empty());
    assert_eq!(t.get_team(tid(10)).unwrap().matches_played, 0);
}
