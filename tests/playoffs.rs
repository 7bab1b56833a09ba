//! Integration tests for playoff bracket generation and propagation.

use carrom_league_web::{
    champion, end_league_stage, finalize_result, start_match, ErrorKind, MatchStatus, PlayoffType,
    SequentialIds, Team, TeamId, TeamSlot, Tournament, TournamentError, TournamentId,
    TournamentStage, UserId,
};
use chrono::{TimeZone, Timelike, Utc};

fn date() -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
}

fn tid(n: u128) -> TeamId {
    TeamId::from_u128(n)
}

fn seeded_team(n: u128, name: &str, points: u32) -> Team {
    let mut t = Team::new(tid(n), name, "#22c55e", None, Vec::new());
    t.points = points;
    t
}

/// Four teams whose league points rank them A, B, C, D.
fn league_done() -> Tournament {
    let mut t = Tournament::new(
        TournamentId::from_u128(1),
        "Test League",
        UserId::from_u128(0xA0),
        "AB12CD34",
    );
    t.teams.push(seeded_team(10, "A", 8));
    t.teams.push(seeded_team(20, "B", 6));
    t.teams.push(seeded_team(30, "C", 4));
    t.teams.push(seeded_team(40, "D", 2));
    t
}

fn bracket_match(t: &Tournament, round: PlayoffType) -> &carrom_league_web::GameMatch {
    t.matches
        .iter()
        .find(|m| m.playoff_type == Some(round))
        .expect("bracket round missing")
}

#[test]
fn end_league_requires_four_teams() {
    let mut t = league_done();
    t.teams.pop();
    let err = end_league_stage(&mut t, &mut SequentialIds::new(), date()).unwrap_err();
    assert_eq!(err, TournamentError::NotEnoughTeams { required: 4, available: 3 });
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    assert!(t.matches.is_empty());
    assert_eq!(t.stage, TournamentStage::League);
}

#[test]
fn bracket_has_four_matches_with_documented_wiring() {
    let mut t = league_done();
    end_league_stage(&mut t, &mut SequentialIds::new(), date()).unwrap();

    assert_eq!(t.matches.len(), 4);
    assert_eq!(t.stage, TournamentStage::Playoffs);

    let q1 = bracket_match(&t, PlayoffType::Qualifier1);
    assert_eq!(q1.name.as_deref(), Some("Qualifier 1"));
    assert_eq!((q1.team1, q1.team2), (TeamSlot::Team(tid(10)), TeamSlot::Team(tid(20))));

    let e = bracket_match(&t, PlayoffType::Eliminator);
    assert_eq!((e.team1, e.team2), (TeamSlot::Team(tid(30)), TeamSlot::Team(tid(40))));

    let q2 = bracket_match(&t, PlayoffType::Qualifier2);
    assert!(q2.has_unresolved_slot());
    let fin = bracket_match(&t, PlayoffType::Final);
    assert!(fin.has_unresolved_slot());
}

#[test]
fn bracket_matches_are_scheduled_on_consecutive_evenings() {
    let mut t = league_done();
    end_league_stage(&mut t, &mut SequentialIds::new(), date()).unwrap();
    let q1 = bracket_match(&t, PlayoffType::Qualifier1);
    let e = bracket_match(&t, PlayoffType::Eliminator);
    let q2 = bracket_match(&t, PlayoffType::Qualifier2);
    let fin = bracket_match(&t, PlayoffType::Final);
    for m in [q1, e, q2, fin] {
        assert_eq!(m.date.hour(), 18);
        assert!(m.date > date());
    }
    assert!(q1.date < e.date && e.date < q2.date && q2.date < fin.date);
}

#[test]
fn double_generation_is_rejected() {
    let mut t = league_done();
    let mut ids = SequentialIds::new();
    end_league_stage(&mut t, &mut ids, date()).unwrap();
    assert_eq!(
        end_league_stage(&mut t, &mut ids, date()),
        Err(TournamentError::PlayoffsAlreadyGenerated)
    );
    assert_eq!(t.matches.len(), 4);
}

#[test]
fn cannot_start_a_match_with_a_tbd_slot() {
    let mut t = league_done();
    end_league_stage(&mut t, &mut SequentialIds::new(), date()).unwrap();
    let q2_id = bracket_match(&t, PlayoffType::Qualifier2).id;
    assert_eq!(
        start_match(&mut t, q2_id, date()),
        Err(TournamentError::UnresolvedSlot)
    );
}

#[test]
fn full_bracket_propagation_crowns_the_champion() {
    let mut t = league_done();
    end_league_stage(&mut t, &mut SequentialIds::new(), date()).unwrap();

    // Qualifier 1: A beats B. A goes to the Final, B drops to Qualifier 2.
    let q1_id = bracket_match(&t, PlayoffType::Qualifier1).id;
    finalize_result(&mut t, q1_id, tid(10), 14, date()).unwrap();
    assert_eq!(bracket_match(&t, PlayoffType::Final).team1, TeamSlot::Team(tid(10)));
    assert_eq!(bracket_match(&t, PlayoffType::Qualifier2).team1, TeamSlot::Team(tid(20)));

    // Eliminator: C beats D. C advances to Qualifier 2.
    let e_id = bracket_match(&t, PlayoffType::Eliminator).id;
    finalize_result(&mut t, e_id, tid(30), 11, date()).unwrap();
    assert_eq!(bracket_match(&t, PlayoffType::Qualifier2).team2, TeamSlot::Team(tid(30)));

    // Qualifier 2: C beats B. C takes the second Final slot.
    let q2_id = bracket_match(&t, PlayoffType::Qualifier2).id;
    finalize_result(&mut t, q2_id, tid(30), 9, date()).unwrap();
    assert_eq!(bracket_match(&t, PlayoffType::Final).team2, TeamSlot::Team(tid(30)));
    assert_eq!(t.stage, TournamentStage::Playoffs);
    assert_eq!(champion(&t), None);

    // Final: A beats C. Tournament over, A is champion.
    let fin_id = bracket_match(&t, PlayoffType::Final).id;
    finalize_result(&mut t, fin_id, tid(10), 17, date()).unwrap();
    assert_eq!(t.stage, TournamentStage::Completed);
    assert_eq!(champion(&t), Some(tid(10)));
    assert_eq!(bracket_match(&t, PlayoffType::Final).status, MatchStatus::Completed);
}

#[test]
fn playoff_results_leave_league_aggregates_alone() {
    let mut t = league_done();
    end_league_stage(&mut t, &mut SequentialIds::new(), date()).unwrap();
    let q1_id = bracket_match(&t, PlayoffType::Qualifier1).id;
    finalize_result(&mut t, q1_id, tid(10), 14, date()).unwrap();

    let a = t.get_team(tid(10)).unwrap();
    assert_eq!((a.wins, a.losses, a.matches_played), (0, 0, 0));
    assert_eq!(a.points, 8); // unchanged seeding points
    let b = t.get_team(tid(20)).unwrap();
    assert_eq!((b.wins, b.losses, b.matches_played), (0, 0, 0));
    assert!(b.recent_form.is_empty());
}
