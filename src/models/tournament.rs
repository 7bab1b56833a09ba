//! Tournament, access control, and the shared error type.

use crate::models::game::{GameMatch, MatchId};
use crate::models::player::PlayerId;
use crate::models::team::{Group, GroupId, Team, TeamId};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a tournament.
pub type TournamentId = Uuid;

/// Stable identity from the external session provider.
pub type UserId = Uuid;

/// Broad classification of a [`TournamentError`], used by the web layer to
/// pick an HTTP status.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorKind {
    NotFound,
    InvalidArgument,
    Conflict,
    PermissionDenied,
}

/// Errors that can occur during tournament operations.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum TournamentError {
    /// Referenced match does not exist.
    MatchNotFound(MatchId),
    /// Referenced team does not exist.
    TeamNotFound(TeamId),
    /// Referenced player does not exist on either contesting team.
    PlayerNotFound(PlayerId),
    /// Referenced group does not exist.
    GroupNotFound(GroupId),
    /// Referenced collaborator is not on the tournament.
    CollaboratorNotFound(UserId),
    /// A required field was empty or malformed.
    InvalidArgument(&'static str),
    /// The same team on both sides of a fixture.
    DuplicateTeamInFixture,
    /// Declared winner is not one of the match's two teams.
    WinnerNotInMatch,
    /// Fewer than 4 teams when generating the playoff bracket.
    NotEnoughTeams { required: usize, available: usize },
    /// Match already finalized; replaying would double-count stats.
    AlreadyCompleted,
    /// Live update for a match that is not in progress.
    MatchNotInProgress,
    /// Match start attempted from a non-upcoming status.
    AlreadyStarted,
    /// The queen has already been claimed in this match.
    QueenAlreadyClaimed,
    /// Playoff bracket already generated for this tournament.
    PlayoffsAlreadyGenerated,
    /// Match start attempted while a feeder slot is still TBD.
    UnresolvedSlot,
    /// Actor lacks the role required for this operation.
    PermissionDenied,
}

impl TournamentError {
    /// Error classification for callers that only care about the category.
    pub fn kind(&self) -> ErrorKind {
        use TournamentError::*;
        match self {
            MatchNotFound(_) | TeamNotFound(_) | PlayerNotFound(_) | GroupNotFound(_)
            | CollaboratorNotFound(_) => ErrorKind::NotFound,
            InvalidArgument(_) | DuplicateTeamInFixture | WinnerNotInMatch
            | NotEnoughTeams { .. } => ErrorKind::InvalidArgument,
            AlreadyCompleted | MatchNotInProgress | AlreadyStarted | QueenAlreadyClaimed
            | PlayoffsAlreadyGenerated | UnresolvedSlot => ErrorKind::Conflict,
            PermissionDenied => ErrorKind::PermissionDenied,
        }
    }
}

impl std::fmt::Display for TournamentError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use TournamentError::*;
        match self {
            MatchNotFound(_) => write!(f, "Match not found"),
            TeamNotFound(_) => write!(f, "Team not found"),
            PlayerNotFound(_) => write!(f, "Player not found"),
            GroupNotFound(_) => write!(f, "Group not found"),
            CollaboratorNotFound(_) => write!(f, "User is not a collaborator"),
            InvalidArgument(what) => write!(f, "Invalid argument: {}", what),
            DuplicateTeamInFixture => write!(f, "A team cannot play itself"),
            WinnerNotInMatch => write!(f, "Winner is not one of the match's teams"),
            NotEnoughTeams { required, available } => {
                write!(f, "Need at least {} teams for playoffs (have {})", required, available)
            }
            AlreadyCompleted => write!(f, "Match is already completed"),
            MatchNotInProgress => write!(f, "Match is not in progress"),
            AlreadyStarted => write!(f, "Match has already started"),
            QueenAlreadyClaimed => write!(f, "The queen has already been pocketed"),
            PlayoffsAlreadyGenerated => write!(f, "Playoff bracket already exists"),
            UnresolvedSlot => write!(f, "Both teams must be decided before starting"),
            PermissionDenied => write!(f, "You do not have permission for this action"),
        }
    }
}

impl std::error::Error for TournamentError {}

/// Tournament-wide phase (distinct from per-match [`crate::models::Stage`]).
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TournamentStage {
    #[default]
    League,
    Playoffs,
    Completed,
}

/// Role granted to a non-owner collaborator.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Editor,
    Viewer,
}

/// A user invited onto a tournament with a role.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Collaborator {
    pub user_id: UserId,
    pub role: Role,
}

/// Operation class an actor must be authorized for.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Action {
    View,
    EditTeams,
    EditMatches,
    FinalizeResults,
    ManageAccess,
}

/// Full tournament state: groups, teams, matches, and access control.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Tournament {
    pub id: TournamentId,
    pub name: String,
    pub stage: TournamentStage,
    pub owner_id: UserId,
    /// Short opaque token gating join-by-code.
    pub invite_code: String,
    pub collaborators: Vec<Collaborator>,
    pub groups: Vec<Group>,
    pub teams: Vec<Team>,
    pub matches: Vec<GameMatch>,
}

impl Tournament {
    /// Create an empty tournament in the league stage.
    pub fn new(
        id: TournamentId,
        name: impl Into<String>,
        owner_id: UserId,
        invite_code: impl Into<String>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            stage: TournamentStage::League,
            owner_id,
            invite_code: invite_code.into(),
            collaborators: Vec::new(),
            groups: Vec::new(),
            teams: Vec::new(),
            matches: Vec::new(),
        }
    }

    pub fn get_team(&self, id: TeamId) -> Option<&Team> {
        self.teams.iter().find(|t| t.id == id)
    }

    pub fn get_team_mut(&mut self, id: TeamId) -> Option<&mut Team> {
        self.teams.iter_mut().find(|t| t.id == id)
    }

    pub fn get_match(&self, id: MatchId) -> Option<&GameMatch> {
        self.matches.iter().find(|m| m.id == id)
    }

    pub fn get_match_mut(&mut self, id: MatchId) -> Option<&mut GameMatch> {
        self.matches.iter_mut().find(|m| m.id == id)
    }

    pub fn get_group_mut(&mut self, id: GroupId) -> Option<&mut Group> {
        self.groups.iter_mut().find(|g| g.id == id)
    }

    /// The actor's effective role, if they are a member at all.
    fn role_of(&self, user_id: UserId) -> Option<Role> {
        if self.owner_id == user_id {
            // Owner outranks every collaborator role.
            return Some(Role::Editor);
        }
        self.collaborators
            .iter()
            .find(|c| c.user_id == user_id)
            .map(|c| c.role)
    }

    /// Capability check: may `user_id` perform `action` on this tournament?
    ///
    /// Owner may do everything; editors everything except access management;
    /// viewers may only read.
    pub fn can_perform(&self, user_id: UserId, action: Action) -> bool {
        if action == Action::ManageAccess {
            return self.owner_id == user_id;
        }
        match self.role_of(user_id) {
            Some(Role::Editor) => true,
            Some(Role::Viewer) => action == Action::View,
            None => false,
        }
    }

    /// True if the user is the owner or already a collaborator.
    pub fn is_member(&self, user_id: UserId) -> bool {
        self.owner_id == user_id || self.collaborators.iter().any(|c| c.user_id == user_id)
    }
}
