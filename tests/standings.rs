//! Integration tests for the points table and top-scorer leaderboard.

use carrom_league_web::{points_table, top_scorers, Player, PlayerId, Team, TeamId};

fn team(n: u128, name: &str, points: u32, scored: u32, conceded: u32) -> Team {
    let mut t = Team::new(TeamId::from_u128(n), name, "#ff0000", None, Vec::new());
    t.points = points;
    t.points_scored = scored;
    t.points_conceded = conceded;
    t
}

#[test]
fn empty_league_yields_empty_table() {
    assert!(points_table(&[]).is_empty());
    assert!(top_scorers(&[]).is_empty());
}

#[test]
fn ranks_by_points_descending() {
    let teams = vec![
        team(1, "Alpha", 2, 10, 5),
        team(2, "Bravo", 6, 20, 3),
        team(3, "Charlie", 4, 15, 8),
    ];
    let table = points_table(&teams);
    let names: Vec<_> = table.iter().map(|r| r.team_name.as_str()).collect();
    assert_eq!(names, ["Bravo", "Charlie", "Alpha"]);
    assert_eq!(table[0].rank, 1);
    assert_eq!(table[2].rank, 3);
}

#[test]
fn equal_points_break_ties_by_nsm() {
    let teams = vec![
        team(1, "Alpha", 4, 10, 8),  // NSM +2
        team(2, "Bravo", 4, 20, 5),  // NSM +15
        team(3, "Charlie", 4, 6, 9), // NSM -3
    ];
    let table = points_table(&teams);
    let names: Vec<_> = table.iter().map(|r| r.team_name.as_str()).collect();
    assert_eq!(names, ["Bravo", "Alpha", "Charlie"]);
    assert_eq!(table[0].nsm, 15);
    assert_eq!(table[2].nsm, -3);
}

#[test]
fn full_ties_keep_input_order() {
    let teams = vec![
        team(1, "Alpha", 2, 10, 5),
        team(2, "Bravo", 2, 10, 5),
        team(3, "Charlie", 2, 10, 5),
    ];
    let table = points_table(&teams);
    let names: Vec<_> = table.iter().map(|r| r.team_name.as_str()).collect();
    assert_eq!(names, ["Alpha", "Bravo", "Charlie"]);
}

#[test]
fn adjacent_rows_never_out_of_order() {
    let teams = vec![
        team(1, "A", 4, 12, 2),
        team(2, "B", 6, 5, 9),
        team(3, "C", 4, 3, 3),
        team(4, "D", 0, 1, 20),
        team(5, "E", 6, 14, 1),
    ];
    let table = points_table(&teams);
    for pair in table.windows(2) {
        let (a, b) = (&pair[0], &pair[1]);
        assert!(a.points > b.points || (a.points == b.points && a.nsm >= b.nsm));
    }
}

#[test]
fn recent_form_is_capped_at_last_five() {
    use carrom_league_web::FormEntry;
    let mut t = team(1, "Alpha", 0, 0, 0);
    for won in [true, false, true, true, false, false, true] {
        t.record_league_result(won, 5, 3);
    }
    let table = points_table(&[t]);
    assert_eq!(table[0].recent_form.len(), 5);
    // Newest last: the last five of W L W W L L W.
    assert_eq!(
        table[0].recent_form,
        [FormEntry::W, FormEntry::W, FormEntry::L, FormEntry::L, FormEntry::W]
    );
}

#[test]
fn top_scorers_ranks_players_across_teams() {
    let mut alpha = team(1, "Alpha", 0, 0, 0);
    let mut a1 = Player::new(PlayerId::from_u128(11), "Asha");
    a1.score = 9;
    let mut a2 = Player::new(PlayerId::from_u128(12), "Arun");
    a2.score = 4;
    alpha.players = vec![a1, a2];

    let mut bravo = team(2, "Bravo", 0, 0, 0);
    let mut b1 = Player::new(PlayerId::from_u128(21), "Bala");
    b1.score = 12;
    bravo.players = vec![b1];

    let rows = top_scorers(&[alpha, bravo]);
    let names: Vec<_> = rows.iter().map(|r| r.player_name.as_str()).collect();
    assert_eq!(names, ["Bala", "Asha", "Arun"]);
    // The leaderboard head is the Super Striker.
    assert_eq!(rows[0].team_name, "Bravo");
    assert_eq!(rows[0].rank, 1);
}
