//! Single binary web server: JSON REST API over in-memory tournaments.
//! Run with: cargo run --bin web
//! Listens on 0.0.0.0:8080 by default. Override with env: HOST, PORT.
//!
//! Identity comes from the external session layer and reaches us as an
//! `X-User-Id` header carrying the stable current-user id.

use actix_web::{
    delete, get, post, put,
    web::{Data, Json, Path},
    App, HttpRequest, HttpResponse, HttpServer, Responder,
};
use carrom_league_web::{
    champion, commit, live_team_scores, new_invite_code, points_table, points_table_csv,
    top_scorers, Action, CommitError, ErrorKind, Fixture, GroupId, IdGen, Intent, MatchId,
    PersistError, Persister, PlayerId, RandomIds, Role, Stage, TeamId, Tournament, TournamentId,
    UserId,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::RwLock;
use std::time::{Duration, Instant};

/// Per-tournament entry: tournament data + last activity time (for auto-cleanup).
struct TournamentEntry {
    tournament: Tournament,
    last_activity: Instant,
}

/// In-memory state: many tournaments by ID. Entries are removed after inactivity.
type AppState = Data<RwLock<HashMap<TournamentId, TournamentEntry>>>;

/// Inactivity threshold: tournaments not accessed for this long are removed.
const INACTIVITY_TIMEOUT: Duration = Duration::from_secs(12 * 3600);

/// Stand-in for the external durable store: accepts every write. A hosted
/// deployment would put its database adapter behind the same trait.
struct AcceptAllStore;

impl Persister for AcceptAllStore {
    fn save(&self, _tournament: &Tournament) -> Result<(), PersistError> {
        Ok(())
    }
}

#[derive(serde::Serialize)]
struct HealthResponse {
    ok: bool,
    service: &'static str,
}

#[derive(Deserialize)]
struct CreateTournamentBody {
    name: String,
}

#[derive(Deserialize)]
struct JoinBody {
    invite_code: String,
}

#[derive(Deserialize)]
struct AddTeamBody {
    name: String,
    color: String,
    #[serde(default)]
    logo: Option<String>,
    #[serde(default)]
    group_id: Option<GroupId>,
    #[serde(default)]
    player_names: Vec<String>,
}

#[derive(Deserialize)]
struct EditTeamBody {
    name: String,
    color: String,
    #[serde(default)]
    logo: Option<String>,
    #[serde(default)]
    group_id: Option<GroupId>,
}

#[derive(Deserialize)]
struct NameBody {
    name: String,
}

#[derive(Deserialize)]
struct AddMatchBody {
    team1_id: TeamId,
    team2_id: TeamId,
    date: DateTime<Utc>,
}

#[derive(Deserialize)]
struct AddMatchesBatchBody {
    fixtures: Vec<AddMatchBody>,
}

#[derive(Deserialize)]
struct EditMatchBody {
    date: DateTime<Utc>,
}

#[derive(Deserialize)]
struct LiveScoreBody {
    player_id: PlayerId,
    #[serde(default)]
    delta: i32,
    #[serde(default)]
    is_queen: bool,
}

#[derive(Deserialize)]
struct ResultBody {
    winner_id: TeamId,
    winner_score: u32,
}

#[derive(Deserialize)]
struct RoleBody {
    role: Role,
}

/// Path segment: tournament id (e.g. /api/tournaments/{id})
#[derive(Deserialize)]
struct TournamentPath {
    id: TournamentId,
}

#[derive(Deserialize)]
struct TeamPath {
    id: TournamentId,
    team_id: TeamId,
}

#[derive(Deserialize)]
struct PlayerPath {
    id: TournamentId,
    team_id: TeamId,
    player_id: PlayerId,
}

#[derive(Deserialize)]
struct GroupPath {
    id: TournamentId,
    group_id: GroupId,
}

#[derive(Deserialize)]
struct MatchPath {
    id: TournamentId,
    match_id: MatchId,
}

#[derive(Deserialize)]
struct CollaboratorPath {
    id: TournamentId,
    user_id: UserId,
}

/// Current user id from the `X-User-Id` header set by the session layer.
fn actor(req: &HttpRequest) -> Result<UserId, HttpResponse> {
    req.headers()
        .get("X-User-Id")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse().ok())
        .ok_or_else(|| {
            HttpResponse::Unauthorized().json(serde_json::json!({ "error": "Missing or invalid X-User-Id" }))
        })
}

fn error_response(e: &CommitError) -> HttpResponse {
    let body = serde_json::json!({ "error": e.to_string() });
    match e {
        CommitError::Rejected(err) => match err.kind() {
            ErrorKind::NotFound => HttpResponse::NotFound().json(body),
            ErrorKind::InvalidArgument => HttpResponse::BadRequest().json(body),
            ErrorKind::Conflict => HttpResponse::Conflict().json(body),
            ErrorKind::PermissionDenied => HttpResponse::Forbidden().json(body),
        },
        CommitError::PersistFailed(_) => HttpResponse::ServiceUnavailable().json(body),
    }
}

fn not_found() -> HttpResponse {
    HttpResponse::NotFound().json(serde_json::json!({ "error": "No tournament" }))
}

fn forbidden() -> HttpResponse {
    HttpResponse::Forbidden().json(serde_json::json!({ "error": "Not a member of this tournament" }))
}

fn lock_error() -> HttpResponse {
    HttpResponse::InternalServerError().body("lock error")
}

/// Run one intent through the gateway and swap in the new snapshot on success.
fn mutate(state: &AppState, req: &HttpRequest, id: TournamentId, intent: Intent) -> HttpResponse {
    let user = match actor(req) {
        Ok(u) => u,
        Err(resp) => return resp,
    };
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    let entry = match g.get_mut(&id) {
        Some(e) => e,
        None => return not_found(),
    };
    entry.last_activity = Instant::now();
    let mut ids = RandomIds;
    match commit(
        &entry.tournament,
        user,
        intent,
        &mut ids,
        Utc::now(),
        &AcceptAllStore,
    ) {
        Ok(next) => {
            entry.tournament = next;
            HttpResponse::Ok().json(&entry.tournament)
        }
        // Failed commits leave entry.tournament as the prior snapshot.
        Err(e) => error_response(&e),
    }
}

/// Read access: the tournament, if the user may view it.
fn read<T>(
    state: &AppState,
    req: &HttpRequest,
    id: TournamentId,
    f: impl FnOnce(&Tournament) -> T,
) -> Result<T, HttpResponse> {
    let user = actor(req)?;
    let mut g = state.write().map_err(|_| lock_error())?;
    let entry = g.get_mut(&id).ok_or_else(not_found)?;
    entry.last_activity = Instant::now();
    if !entry.tournament.can_perform(user, Action::View) {
        return Err(forbidden());
    }
    Ok(f(&entry.tournament))
}

#[get("/api/health")]
async fn api_health() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        ok: true,
        service: "carrom-league-web",
    })
}

/// Create a new tournament; the acting user becomes its owner.
#[post("/api/tournaments")]
async fn api_create_tournament(
    state: AppState,
    req: HttpRequest,
    body: Json<CreateTournamentBody>,
) -> HttpResponse {
    let user = match actor(&req) {
        Ok(u) => u,
        Err(resp) => return resp,
    };
    if body.name.trim().is_empty() {
        return HttpResponse::BadRequest().json(serde_json::json!({ "error": "Name must not be empty" }));
    }
    let mut ids = RandomIds;
    let tournament = Tournament::new(ids.id(), body.name.trim(), user, new_invite_code());
    let id = tournament.id;
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    g.insert(
        id,
        TournamentEntry {
            tournament,
            last_activity: Instant::now(),
        },
    );
    HttpResponse::Ok().json(&g[&id].tournament)
}

/// Tournaments the acting user owns or collaborates on.
#[get("/api/tournaments")]
async fn api_list_tournaments(state: AppState, req: HttpRequest) -> HttpResponse {
    let user = match actor(&req) {
        Ok(u) => u,
        Err(resp) => return resp,
    };
    let g = match state.read() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    let mine: Vec<&Tournament> = g
        .values()
        .map(|e| &e.tournament)
        .filter(|t| t.is_member(user))
        .collect();
    HttpResponse::Ok().json(mine)
}

/// Get a tournament by id. Touching it refreshes last_activity.
#[get("/api/tournaments/{id}")]
async fn api_get_tournament(state: AppState, req: HttpRequest, path: Path<TournamentPath>) -> HttpResponse {
    match read(&state, &req, path.id, |t| HttpResponse::Ok().json(t)) {
        Ok(resp) => resp,
        Err(resp) => resp,
    }
}

/// Delete a tournament (owner only).
#[delete("/api/tournaments/{id}")]
async fn api_delete_tournament(state: AppState, req: HttpRequest, path: Path<TournamentPath>) -> HttpResponse {
    let user = match actor(&req) {
        Ok(u) => u,
        Err(resp) => return resp,
    };
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    let entry = match g.get(&path.id) {
        Some(e) => e,
        None => return not_found(),
    };
    if entry.tournament.owner_id != user {
        return forbidden();
    }
    g.remove(&path.id);
    HttpResponse::NoContent().finish()
}

/// Join a tournament by invite code; the user becomes a viewer.
#[post("/api/tournaments/join")]
async fn api_join_tournament(state: AppState, req: HttpRequest, body: Json<JoinBody>) -> HttpResponse {
    let user = match actor(&req) {
        Ok(u) => u,
        Err(resp) => return resp,
    };
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    let entry = g
        .values_mut()
        .find(|e| e.tournament.invite_code == body.invite_code);
    let entry = match entry {
        Some(e) => e,
        None => return HttpResponse::NotFound().json(serde_json::json!({ "error": "Invalid invite code" })),
    };
    if entry.tournament.is_member(user) {
        return HttpResponse::Conflict()
            .json(serde_json::json!({ "error": "Already a member of this tournament" }));
    }
    entry.last_activity = Instant::now();
    entry.tournament.collaborators.push(carrom_league_web::Collaborator {
        user_id: user,
        role: Role::Viewer,
    });
    HttpResponse::Ok().json(&entry.tournament)
}

#[post("/api/tournaments/{id}/teams")]
async fn api_add_team(
    state: AppState,
    req: HttpRequest,
    path: Path<TournamentPath>,
    body: Json<AddTeamBody>,
) -> HttpResponse {
    let body = body.into_inner();
    mutate(
        &state,
        &req,
        path.id,
        Intent::AddTeam {
            name: body.name,
            color: body.color,
            logo: body.logo,
            group_id: body.group_id,
            player_names: body.player_names,
        },
    )
}

#[put("/api/tournaments/{id}/teams/{team_id}")]
async fn api_edit_team(
    state: AppState,
    req: HttpRequest,
    path: Path<TeamPath>,
    body: Json<EditTeamBody>,
) -> HttpResponse {
    let body = body.into_inner();
    mutate(
        &state,
        &req,
        path.id,
        Intent::EditTeam {
            team_id: path.team_id,
            name: body.name,
            color: body.color,
            logo: body.logo,
            group_id: body.group_id,
        },
    )
}

#[delete("/api/tournaments/{id}/teams/{team_id}")]
async fn api_delete_team(state: AppState, req: HttpRequest, path: Path<TeamPath>) -> HttpResponse {
    mutate(&state, &req, path.id, Intent::DeleteTeam { team_id: path.team_id })
}

#[post("/api/tournaments/{id}/teams/{team_id}/players")]
async fn api_add_player(
    state: AppState,
    req: HttpRequest,
    path: Path<TeamPath>,
    body: Json<NameBody>,
) -> HttpResponse {
    mutate(
        &state,
        &req,
        path.id,
        Intent::AddPlayer {
            team_id: path.team_id,
            name: body.into_inner().name,
        },
    )
}

#[delete("/api/tournaments/{id}/teams/{team_id}/players/{player_id}")]
async fn api_delete_player(state: AppState, req: HttpRequest, path: Path<PlayerPath>) -> HttpResponse {
    mutate(
        &state,
        &req,
        path.id,
        Intent::DeletePlayer {
            team_id: path.team_id,
            player_id: path.player_id,
        },
    )
}

#[post("/api/tournaments/{id}/groups")]
async fn api_add_group(
    state: AppState,
    req: HttpRequest,
    path: Path<TournamentPath>,
    body: Json<NameBody>,
) -> HttpResponse {
    mutate(&state, &req, path.id, Intent::AddGroup { name: body.into_inner().name })
}

#[put("/api/tournaments/{id}/groups/{group_id}")]
async fn api_edit_group(
    state: AppState,
    req: HttpRequest,
    path: Path<GroupPath>,
    body: Json<NameBody>,
) -> HttpResponse {
    mutate(
        &state,
        &req,
        path.id,
        Intent::EditGroup {
            group_id: path.group_id,
            name: body.into_inner().name,
        },
    )
}

#[delete("/api/tournaments/{id}/groups/{group_id}")]
async fn api_delete_group(state: AppState, req: HttpRequest, path: Path<GroupPath>) -> HttpResponse {
    mutate(&state, &req, path.id, Intent::DeleteGroup { group_id: path.group_id })
}

#[post("/api/tournaments/{id}/matches")]
async fn api_add_match(
    state: AppState,
    req: HttpRequest,
    path: Path<TournamentPath>,
    body: Json<AddMatchBody>,
) -> HttpResponse {
    let body = body.into_inner();
    mutate(
        &state,
        &req,
        path.id,
        Intent::AddMatch(Fixture {
            team1_id: body.team1_id,
            team2_id: body.team2_id,
            date: body.date,
        }),
    )
}

#[post("/api/tournaments/{id}/matches/batch")]
async fn api_add_matches_batch(
    state: AppState,
    req: HttpRequest,
    path: Path<TournamentPath>,
    body: Json<AddMatchesBatchBody>,
) -> HttpResponse {
    let fixtures = body
        .into_inner()
        .fixtures
        .into_iter()
        .map(|f| Fixture {
            team1_id: f.team1_id,
            team2_id: f.team2_id,
            date: f.date,
        })
        .collect();
    mutate(&state, &req, path.id, Intent::AddMatchesBatch(fixtures))
}

#[put("/api/tournaments/{id}/matches/{match_id}")]
async fn api_edit_match(
    state: AppState,
    req: HttpRequest,
    path: Path<MatchPath>,
    body: Json<EditMatchBody>,
) -> HttpResponse {
    mutate(
        &state,
        &req,
        path.id,
        Intent::EditMatch {
            match_id: path.match_id,
            date: body.date,
        },
    )
}

#[delete("/api/tournaments/{id}/matches/{match_id}")]
async fn api_delete_match(state: AppState, req: HttpRequest, path: Path<MatchPath>) -> HttpResponse {
    mutate(&state, &req, path.id, Intent::DeleteMatch { match_id: path.match_id })
}

#[post("/api/tournaments/{id}/matches/{match_id}/start")]
async fn api_start_match(state: AppState, req: HttpRequest, path: Path<MatchPath>) -> HttpResponse {
    mutate(&state, &req, path.id, Intent::StartMatch { match_id: path.match_id })
}

/// Record a live coin or queen event for a player in an in-progress match.
#[post("/api/tournaments/{id}/matches/{match_id}/live")]
async fn api_update_live_score(
    state: AppState,
    req: HttpRequest,
    path: Path<MatchPath>,
    body: Json<LiveScoreBody>,
) -> HttpResponse {
    mutate(
        &state,
        &req,
        path.id,
        Intent::UpdateLiveScore {
            match_id: path.match_id,
            player_id: body.player_id,
            delta: body.delta,
            is_queen: body.is_queen,
        },
    )
}

/// Running team totals for an in-progress match.
#[get("/api/tournaments/{id}/matches/{match_id}/live")]
async fn api_get_live_score(state: AppState, req: HttpRequest, path: Path<MatchPath>) -> HttpResponse {
    let result = read(&state, &req, path.id, |t| {
        t.get_match(path.match_id).map(|m| {
            let (team1, team2) = live_team_scores(t, m);
            serde_json::json!({
                "match_id": m.id,
                "status": m.status,
                "team1_score": team1,
                "team2_score": team2,
                "queen_pocketed_by": m.queen_pocketed_by,
            })
        })
    });
    match result {
        Ok(Some(body)) => HttpResponse::Ok().json(body),
        Ok(None) => HttpResponse::NotFound().json(serde_json::json!({ "error": "Match not found" })),
        Err(resp) => resp,
    }
}

/// Commit a final result (finalize-results permission required).
#[post("/api/tournaments/{id}/matches/{match_id}/result")]
async fn api_update_match_result(
    state: AppState,
    req: HttpRequest,
    path: Path<MatchPath>,
    body: Json<ResultBody>,
) -> HttpResponse {
    mutate(
        &state,
        &req,
        path.id,
        Intent::UpdateMatchResult {
            match_id: path.match_id,
            winner_id: body.winner_id,
            winner_score: body.winner_score,
        },
    )
}

/// End the league stage and generate the playoff bracket.
#[post("/api/tournaments/{id}/end-league")]
async fn api_end_league_stage(state: AppState, req: HttpRequest, path: Path<TournamentPath>) -> HttpResponse {
    let resp = mutate(&state, &req, path.id, Intent::EndLeagueStage);
    if resp.status().is_success() {
        log::info!("Playoff bracket generated for tournament {}", path.id);
    }
    resp
}

#[get("/api/tournaments/{id}/points-table")]
async fn api_points_table(state: AppState, req: HttpRequest, path: Path<TournamentPath>) -> HttpResponse {
    match read(&state, &req, path.id, |t| points_table(&t.teams)) {
        Ok(rows) => HttpResponse::Ok().json(rows),
        Err(resp) => resp,
    }
}

#[get("/api/tournaments/{id}/points-table.csv")]
async fn api_points_table_csv(state: AppState, req: HttpRequest, path: Path<TournamentPath>) -> HttpResponse {
    let rows = match read(&state, &req, path.id, |t| points_table(&t.teams)) {
        Ok(rows) => rows,
        Err(resp) => return resp,
    };
    match points_table_csv(&rows) {
        Ok(csv) => HttpResponse::Ok()
            .content_type("text/csv; charset=utf-8")
            .body(csv),
        Err(e) => {
            log::warn!("CSV export failed: {}", e);
            HttpResponse::InternalServerError().json(serde_json::json!({ "error": "CSV export failed" }))
        }
    }
}

/// The "Super Striker" leaderboard: players ranked by cumulative score.
#[get("/api/tournaments/{id}/top-scorers")]
async fn api_top_scorers(state: AppState, req: HttpRequest, path: Path<TournamentPath>) -> HttpResponse {
    match read(&state, &req, path.id, |t| top_scorers(&t.teams)) {
        Ok(rows) => HttpResponse::Ok().json(rows),
        Err(resp) => resp,
    }
}

/// Playoff bracket view: the four playoff matches plus the champion, if decided.
#[get("/api/tournaments/{id}/playoffs")]
async fn api_playoffs(state: AppState, req: HttpRequest, path: Path<TournamentPath>) -> HttpResponse {
    let result = read(&state, &req, path.id, |t| {
        let bracket: Vec<_> = t
            .matches
            .iter()
            .filter(|m| m.stage == Stage::Playoff)
            .collect();
        serde_json::json!({
            "stage": t.stage,
            "matches": bracket,
            "champion": champion(t),
        })
    });
    match result {
        Ok(body) => HttpResponse::Ok().json(body),
        Err(resp) => resp,
    }
}

#[put("/api/tournaments/{id}/collaborators/{user_id}")]
async fn api_update_collaborator_role(
    state: AppState,
    req: HttpRequest,
    path: Path<CollaboratorPath>,
    body: Json<RoleBody>,
) -> HttpResponse {
    mutate(
        &state,
        &req,
        path.id,
        Intent::UpdateCollaboratorRole {
            user_id: path.user_id,
            role: body.role,
        },
    )
}

#[delete("/api/tournaments/{id}/collaborators/{user_id}")]
async fn api_remove_collaborator(state: AppState, req: HttpRequest, path: Path<CollaboratorPath>) -> HttpResponse {
    mutate(
        &state,
        &req,
        path.id,
        Intent::RemoveCollaborator { user_id: path.user_id },
    )
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let host = std::env::var("HOST").unwrap_or_else(|_| default_host());
    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or_else(default_port);
    let bind = (host.as_str(), port);
    log::info!("Starting server at http://{}:{}", bind.0, bind.1);

    let state: AppState = Data::new(RwLock::new(HashMap::new()));

    // Background task: every 30 minutes, remove tournaments inactive for 12+ hours
    let state_cleanup = state.clone();
    actix_web::rt::spawn(async move {
        let mut interval = actix_web::rt::time::interval(Duration::from_secs(30 * 60));
        loop {
            interval.tick().await;
            let mut g = match state_cleanup.write() {
                Ok(guard) => guard,
                Err(_) => continue,
            };
            let before = g.len();
            g.retain(|_, entry| entry.last_activity.elapsed() < INACTIVITY_TIMEOUT);
            let removed = before - g.len();
            if removed > 0 {
                log::info!("Cleaned up {} inactive tournament(s) (no activity for 12h)", removed);
            }
        }
    });

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .service(api_health)
            .service(api_create_tournament)
            .service(api_list_tournaments)
            .service(api_join_tournament)
            .service(api_get_tournament)
            .service(api_delete_tournament)
            .service(api_add_team)
            .service(api_edit_team)
            .service(api_delete_team)
            .service(api_add_player)
            .service(api_delete_player)
            .service(api_add_group)
            .service(api_edit_group)
            .service(api_delete_group)
            .service(api_add_match)
            .service(api_add_matches_batch)
            .service(api_edit_match)
            .service(api_delete_match)
            .service(api_start_match)
            .service(api_update_live_score)
            .service(api_get_live_score)
            .service(api_update_match_result)
            .service(api_end_league_stage)
            .service(api_points_table)
            .service(api_points_table_csv)
            .service(api_top_scorers)
            .service(api_playoffs)
            .service(api_update_collaborator_role)
            .service(api_remove_collaborator)
    })
    .bind(bind)?
    .run()
    .await
}
