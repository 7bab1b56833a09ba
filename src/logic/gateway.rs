//! The tournament mutation gateway: every change to a tournament goes through
//! [`apply`], which checks the actor's permission, runs the mutation as a pure
//! transform on a cloned snapshot, and hands back the next snapshot.

use crate::logic::{live, playoffs, results};
use crate::models::{
    Action, GameMatch, GroupId, MatchId, Player, PlayerId, Role, Team, TeamId, Tournament,
    TournamentError, UserId,
};
use chrono::{DateTime, Utc};
use rand::distributions::Alphanumeric;
use rand::Rng;
use uuid::Uuid;

/// Id generation as an injected capability, so tests can run deterministically.
pub trait IdGen {
    fn id(&mut self) -> Uuid;
}

/// Production id generator: random v4 UUIDs.
#[derive(Clone, Copy, Debug, Default)]
pub struct RandomIds;

impl IdGen for RandomIds {
    fn id(&mut self) -> Uuid {
        Uuid::new_v4()
    }
}

/// Deterministic generator handing out 1, 2, 3, ... as UUIDs.
#[derive(Clone, Copy, Debug, Default)]
pub struct SequentialIds {
    next: u128,
}

impl SequentialIds {
    pub fn new() -> Self {
        Self::default()
    }
}

impl IdGen for SequentialIds {
    fn id(&mut self) -> Uuid {
        self.next += 1;
        Uuid::from_u128(self.next)
    }
}

/// Generate a short opaque invite code (8 uppercase alphanumerics).
pub fn new_invite_code() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(8)
        .map(|c| (c as char).to_ascii_uppercase())
        .collect()
}

/// A fixture to schedule, used by [`Intent::AddMatch`] and the batch variant.
#[derive(Clone, Debug)]
pub struct Fixture {
    pub team1_id: TeamId,
    pub team2_id: TeamId,
    pub date: DateTime<Utc>,
}

/// Every mutation the core supports, as data.
#[derive(Clone, Debug)]
pub enum Intent {
    AddTeam {
        name: String,
        color: String,
        logo: Option<String>,
        group_id: Option<GroupId>,
        player_names: Vec<String>,
    },
    EditTeam {
        team_id: TeamId,
        name: String,
        color: String,
        logo: Option<String>,
        group_id: Option<GroupId>,
    },
    DeleteTeam {
        team_id: TeamId,
    },
    AddPlayer {
        team_id: TeamId,
        name: String,
    },
    DeletePlayer {
        team_id: TeamId,
        player_id: PlayerId,
    },
    AddGroup {
        name: String,
    },
    EditGroup {
        group_id: GroupId,
        name: String,
    },
    DeleteGroup {
        group_id: GroupId,
    },
    AddMatch(Fixture),
    AddMatchesBatch(Vec<Fixture>),
    EditMatch {
        match_id: MatchId,
        date: DateTime<Utc>,
    },
    DeleteMatch {
        match_id: MatchId,
    },
    StartMatch {
        match_id: MatchId,
    },
    UpdateLiveScore {
        match_id: MatchId,
        player_id: PlayerId,
        delta: i32,
        is_queen: bool,
    },
    UpdateMatchResult {
        match_id: MatchId,
        winner_id: TeamId,
        winner_score: u32,
    },
    EndLeagueStage,
    UpdateCollaboratorRole {
        user_id: UserId,
        role: Role,
    },
    RemoveCollaborator {
        user_id: UserId,
    },
}

impl Intent {
    /// The operation class this intent needs authorization for.
    pub fn action(&self) -> Action {
        use Intent::*;
        match self {
            AddTeam { .. } | EditTeam { .. } | DeleteTeam { .. } | AddPlayer { .. }
            | DeletePlayer { .. } | AddGroup { .. } | EditGroup { .. } | DeleteGroup { .. } => {
                Action::EditTeams
            }
            AddMatch(_) | AddMatchesBatch(_) | EditMatch { .. } | DeleteMatch { .. }
            | StartMatch { .. } | UpdateLiveScore { .. } | EndLeagueStage => Action::EditMatches,
            UpdateMatchResult { .. } => Action::FinalizeResults,
            UpdateCollaboratorRole { .. } | RemoveCollaborator { .. } => Action::ManageAccess,
        }
    }
}

/// Apply one intent to a tournament snapshot as the given actor.
///
/// Pure from the caller's perspective: the input snapshot is never mutated,
/// and on error no new snapshot is produced. `now` and `ids` are injected so
/// timestamps and generated ids are deterministic under test.
pub fn apply(
    tournament: &Tournament,
    actor: UserId,
    intent: Intent,
    ids: &mut dyn IdGen,
    now: DateTime<Utc>,
) -> Result<Tournament, TournamentError> {
    if !tournament.can_perform(actor, intent.action()) {
        return Err(TournamentError::PermissionDenied);
    }
    let mut next = tournament.clone();
    dispatch(&mut next, intent, ids, now)?;
    Ok(next)
}

fn dispatch(
    t: &mut Tournament,
    intent: Intent,
    ids: &mut dyn IdGen,
    now: DateTime<Utc>,
) -> Result<(), TournamentError> {
    match intent {
        Intent::AddTeam {
            name,
            color,
            logo,
            group_id,
            player_names,
        } => add_team(t, ids, name, color, logo, group_id, player_names),
        Intent::EditTeam {
            team_id,
            name,
            color,
            logo,
            group_id,
        } => edit_team(t, team_id, name, color, logo, group_id),
        Intent::DeleteTeam { team_id } => delete_team(t, team_id),
        Intent::AddPlayer { team_id, name } => add_player(t, ids, team_id, name),
        Intent::DeletePlayer { team_id, player_id } => delete_player(t, team_id, player_id),
        Intent::AddGroup { name } => add_group(t, ids, name),
        Intent::EditGroup { group_id, name } => edit_group(t, group_id, name),
        Intent::DeleteGroup { group_id } => delete_group(t, group_id),
        Intent::AddMatch(fixture) => add_match(t, ids, fixture),
        Intent::AddMatchesBatch(fixtures) => {
            for fixture in fixtures {
                add_match(t, ids, fixture)?;
            }
            Ok(())
        }
        Intent::EditMatch { match_id, date } => edit_match(t, match_id, date),
        Intent::DeleteMatch { match_id } => results::delete_match(t, match_id),
        Intent::StartMatch { match_id } => live::start_match(t, match_id, now),
        Intent::UpdateLiveScore {
            match_id,
            player_id,
            delta,
            is_queen,
        } => live::update_live_score(t, match_id, player_id, delta, is_queen),
        Intent::UpdateMatchResult {
            match_id,
            winner_id,
            winner_score,
        } => results::finalize_result(t, match_id, winner_id, winner_score, now),
        Intent::EndLeagueStage => playoffs::end_league_stage(t, ids, now),
        Intent::UpdateCollaboratorRole { user_id, role } => {
            let c = t
                .collaborators
                .iter_mut()
                .find(|c| c.user_id == user_id)
                .ok_or(TournamentError::CollaboratorNotFound(user_id))?;
            c.role = role;
            Ok(())
        }
        Intent::RemoveCollaborator { user_id } => {
            if !t.collaborators.iter().any(|c| c.user_id == user_id) {
                return Err(TournamentError::CollaboratorNotFound(user_id));
            }
            t.collaborators.retain(|c| c.user_id != user_id);
            Ok(())
        }
    }
}

fn required_name(name: &str) -> Result<&str, TournamentError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(TournamentError::InvalidArgument("name must not be empty"));
    }
    Ok(trimmed)
}

fn check_group(t: &Tournament, group_id: Option<GroupId>) -> Result<(), TournamentError> {
    if let Some(gid) = group_id {
        if !t.groups.iter().any(|g| g.id == gid) {
            return Err(TournamentError::GroupNotFound(gid));
        }
    }
    Ok(())
}

fn add_team(
    t: &mut Tournament,
    ids: &mut dyn IdGen,
    name: String,
    color: String,
    logo: Option<String>,
    group_id: Option<GroupId>,
    player_names: Vec<String>,
) -> Result<(), TournamentError> {
    let name = required_name(&name)?.to_string();
    check_group(t, group_id)?;
    let players = player_names
        .iter()
        .map(|n| Ok(Player::new(ids.id(), required_name(n)?)))
        .collect::<Result<Vec<_>, TournamentError>>()?;
    let mut team = Team::new(ids.id(), name, color, group_id, players);
    team.logo = logo;
    t.teams.push(team);
    Ok(())
}

fn edit_team(
    t: &mut Tournament,
    team_id: TeamId,
    name: String,
    color: String,
    logo: Option<String>,
    group_id: Option<GroupId>,
) -> Result<(), TournamentError> {
    let name = required_name(&name)?.to_string();
    check_group(t, group_id)?;
    let team = t
        .get_team_mut(team_id)
        .ok_or(TournamentError::TeamNotFound(team_id))?;
    team.name = name;
    team.color = color;
    team.logo = logo;
    team.group_id = group_id;
    Ok(())
}

/// Deleting a team cascades to delete every match it appears in.
fn delete_team(t: &mut Tournament, team_id: TeamId) -> Result<(), TournamentError> {
    if t.get_team(team_id).is_none() {
        return Err(TournamentError::TeamNotFound(team_id));
    }
    t.teams.retain(|team| team.id != team_id);
    t.matches.retain(|m| !m.involves(team_id));
    Ok(())
}

fn add_player(
    t: &mut Tournament,
    ids: &mut dyn IdGen,
    team_id: TeamId,
    name: String,
) -> Result<(), TournamentError> {
    let name = required_name(&name)?.to_string();
    let id = ids.id();
    let team = t
        .get_team_mut(team_id)
        .ok_or(TournamentError::TeamNotFound(team_id))?;
    team.players.push(Player::new(id, name));
    Ok(())
}

fn delete_player(
    t: &mut Tournament,
    team_id: TeamId,
    player_id: PlayerId,
) -> Result<(), TournamentError> {
    let team = t
        .get_team_mut(team_id)
        .ok_or(TournamentError::TeamNotFound(team_id))?;
    if !team.players.iter().any(|p| p.id == player_id) {
        return Err(TournamentError::PlayerNotFound(player_id));
    }
    team.players.retain(|p| p.id != player_id);
    Ok(())
}

fn add_group(t: &mut Tournament, ids: &mut dyn IdGen, name: String) -> Result<(), TournamentError> {
    let name = required_name(&name)?.to_string();
    t.groups.push(crate::models::Group { id: ids.id(), name });
    Ok(())
}

fn edit_group(t: &mut Tournament, group_id: GroupId, name: String) -> Result<(), TournamentError> {
    let name = required_name(&name)?.to_string();
    let group = t
        .get_group_mut(group_id)
        .ok_or(TournamentError::GroupNotFound(group_id))?;
    group.name = name;
    Ok(())
}

/// Deleting a group unassigns its teams; it never deletes them.
fn delete_group(t: &mut Tournament, group_id: GroupId) -> Result<(), TournamentError> {
    if !t.groups.iter().any(|g| g.id == group_id) {
        return Err(TournamentError::GroupNotFound(group_id));
    }
    t.groups.retain(|g| g.id != group_id);
    for team in t.teams.iter_mut() {
        if team.group_id == Some(group_id) {
            team.group_id = None;
        }
    }
    Ok(())
}

fn add_match(t: &mut Tournament, ids: &mut dyn IdGen, fixture: Fixture) -> Result<(), TournamentError> {
    if fixture.team1_id == fixture.team2_id {
        return Err(TournamentError::DuplicateTeamInFixture);
    }
    for team_id in [fixture.team1_id, fixture.team2_id] {
        if t.get_team(team_id).is_none() {
            return Err(TournamentError::TeamNotFound(team_id));
        }
    }
    t.matches.push(GameMatch::league(
        ids.id(),
        fixture.team1_id,
        fixture.team2_id,
        fixture.date,
    ));
    Ok(())
}

fn edit_match(
    t: &mut Tournament,
    match_id: MatchId,
    date: DateTime<Utc>,
) -> Result<(), TournamentError> {
    let m = t
        .get_match_mut(match_id)
        .ok_or(TournamentError::MatchNotFound(match_id))?;
    m.date = date;
    Ok(())
}

/// Failure reported by the external persistence adapter.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PersistError(pub String);

impl std::fmt::Display for PersistError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "persistence failed: {}", self.0)
    }
}

impl std::error::Error for PersistError {}

/// The external durable store, modeled at its interface: one write per
/// snapshot, success or failure.
pub trait Persister {
    fn save(&self, tournament: &Tournament) -> Result<(), PersistError>;
}

/// Why a [`commit`] did not produce a new snapshot.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum CommitError {
    /// The mutation itself was rejected; nothing was applied.
    Rejected(TournamentError),
    /// The mutation applied locally but the write failed; the caller keeps
    /// the prior snapshot, so the optimistic update is reverted exactly.
    PersistFailed(PersistError),
}

impl std::fmt::Display for CommitError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CommitError::Rejected(e) => e.fmt(f),
            CommitError::PersistFailed(e) => e.fmt(f),
        }
    }
}

impl std::error::Error for CommitError {}

/// Optimistic apply-then-persist: run the mutation, ask the store to save the
/// result, and only hand the new snapshot out once the write is acknowledged.
/// The prior snapshot is borrowed, never consumed, so a failed write leaves
/// the caller's state exactly as it was.
pub fn commit(
    tournament: &Tournament,
    actor: UserId,
    intent: Intent,
    ids: &mut dyn IdGen,
    now: DateTime<Utc>,
    store: &dyn Persister,
) -> Result<Tournament, CommitError> {
    let next = apply(tournament, actor, intent, ids, now).map_err(CommitError::Rejected)?;
    store.save(&next).map_err(CommitError::PersistFailed)?;
    Ok(next)
}
