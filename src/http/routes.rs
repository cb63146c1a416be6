//! HTTP route definitions
//!
//! Everything under `/api/` is the command surface; any other path is served
//! from the static webroot. All API responses, successes and errors alike,
//! carry `Cache-Control: no-cache`.

use std::collections::BTreeMap;
use std::path::PathBuf;

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, Request, State,
    },
    handler::HandlerWithoutStateExt,
    http::{header, HeaderMap, HeaderValue},
    middleware::{self, Next},
    response::{Json, Response},
    routing::{any, get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tower_http::{services::ServeDir, trace::TraceLayer};

use crate::app::AppState;
use crate::game::session::BagItem;
use crate::game::{Direction, MapId, Vec2};
use crate::http::auth::bearer_token;
use crate::http::errors::ApiError;
use crate::store::{persist_retirements, Record, RecordsError};

/// Build the application router
pub fn build_router(state: AppState, www_root: PathBuf) -> Router {
    let api = Router::new()
        .route("/api/v1/maps", get(list_maps).fallback(read_only))
        .route("/api/v1/maps/:id", get(map_by_id).fallback(read_only))
        .route("/api/v1/game/join", post(join_game).fallback(post_only))
        .route("/api/v1/game/players", get(list_players).fallback(read_only))
        .route("/api/v1/game/state", get(game_state).fallback(read_only))
        .route(
            "/api/v1/game/player/action",
            post(player_action).fallback(post_only),
        )
        .route("/api/v1/game/tick", post(external_tick).fallback(post_only))
        .route("/api/v1/game/records", get(records_page).fallback(read_only))
        .route("/api/*rest", any(unknown_api))
        .layer(middleware::from_fn(set_no_cache));

    let static_files = ServeDir::new(www_root)
        .append_index_html_on_directories(true)
        .not_found_service(page_not_found.into_service());

    Router::new()
        .merge(api)
        .fallback_service(static_files)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Stamp `Cache-Control: no-cache` on every API response.
async fn set_no_cache(request: Request, next: Next) -> Response {
    let mut response = next.run(request).await;
    response
        .headers_mut()
        .insert(header::CACHE_CONTROL, HeaderValue::from_static("no-cache"));
    response
}

async fn read_only() -> ApiError {
    ApiError::InvalidMethod { allow: "GET, HEAD" }
}

async fn post_only() -> ApiError {
    ApiError::InvalidMethod { allow: "POST" }
}

async fn unknown_api() -> ApiError {
    ApiError::BadRequest("Invalid API endpoint".to_owned())
}

async fn page_not_found() -> ApiError {
    ApiError::PageNotFound
}

// ============================================================================
// Maps
// ============================================================================

#[derive(Serialize)]
struct MapSummary {
    id: MapId,
    name: String,
}

async fn list_maps(State(state): State<AppState>) -> Json<Vec<MapSummary>> {
    let game = state.game.lock().await;
    let maps = game
        .maps()
        .iter()
        .map(|map| MapSummary {
            id: map.id().clone(),
            name: map.name().to_owned(),
        })
        .collect();
    Json(maps)
}

async fn map_by_id(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let game = state.game.lock().await;
    let map = game.find_map(&id).ok_or(ApiError::MapNotFound)?;
    let body = serde_json::to_value(map.as_ref())
        .map_err(|error| ApiError::Internal(error.to_string()))?;
    Ok(Json(body))
}

// ============================================================================
// Join
// ============================================================================

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct JoinRequest {
    user_name: String,
    map_id: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JoinResponse {
    auth_token: String,
    player_id: u64,
}

async fn join_game(
    State(state): State<AppState>,
    body: Result<Json<JoinRequest>, JsonRejection>,
) -> Result<Json<JoinResponse>, ApiError> {
    let Json(request) =
        body.map_err(|_| ApiError::InvalidArgument("Join game request parse error".to_owned()))?;
    if request.user_name.is_empty() {
        return Err(ApiError::InvalidArgument("Invalid name".to_owned()));
    }

    let mut game = state.game.lock().await;
    let outcome = game
        .join(&request.map_id, &request.user_name)
        .ok_or(ApiError::MapNotFound)?;

    Ok(Json(JoinResponse {
        auth_token: outcome.token.into_string(),
        player_id: outcome.player_id,
    }))
}

// ============================================================================
// Players and game state
// ============================================================================

#[derive(Serialize)]
struct PlayerName {
    name: String,
}

async fn list_players(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<BTreeMap<u64, PlayerName>>, ApiError> {
    let token = bearer_token(&headers)?;
    let game = state.game.lock().await;
    let entry = game.player_by_token(token).ok_or(ApiError::UnknownToken)?;
    let session = game
        .session(&entry.map_id)
        .ok_or_else(|| ApiError::Internal("session missing for live player".to_owned()))?;

    let players = session
        .dogs()
        .iter()
        .map(|dog| {
            (
                dog.id,
                PlayerName {
                    name: dog.name.clone(),
                },
            )
        })
        .collect();
    Ok(Json(players))
}

#[derive(Serialize)]
struct PlayerStateView {
    pos: Vec2,
    speed: Vec2,
    dir: Direction,
    bag: Vec<BagItem>,
    score: u32,
}

#[derive(Serialize)]
struct LootView {
    #[serde(rename = "type")]
    loot_type: usize,
    pos: Vec2,
}

#[derive(Serialize)]
struct GameStateResponse {
    players: BTreeMap<u64, PlayerStateView>,
    #[serde(rename = "lostObjects")]
    lost_objects: BTreeMap<u64, LootView>,
}

async fn game_state(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<GameStateResponse>, ApiError> {
    let token = bearer_token(&headers)?;
    let game = state.game.lock().await;
    let entry = game.player_by_token(token).ok_or(ApiError::UnknownToken)?;
    let session = game
        .session(&entry.map_id)
        .ok_or_else(|| ApiError::Internal("session missing for live player".to_owned()))?;

    let players = session
        .dogs()
        .iter()
        .map(|dog| {
            (
                dog.id,
                PlayerStateView {
                    pos: dog.pos,
                    speed: dog.speed,
                    dir: dog.dir,
                    bag: dog.bag.items().to_vec(),
                    score: dog.score,
                },
            )
        })
        .collect();

    let lost_objects = session
        .loot()
        .iter()
        .map(|item| {
            (
                item.id,
                LootView {
                    loot_type: item.loot_type,
                    pos: item.pos,
                },
            )
        })
        .collect();

    Ok(Json(GameStateResponse {
        players,
        lost_objects,
    }))
}

// ============================================================================
// Player action
// ============================================================================

#[derive(Deserialize)]
struct ActionRequest {
    #[serde(rename = "move")]
    movement: String,
}

async fn player_action(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Result<Json<ActionRequest>, JsonRejection>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let token = bearer_token(&headers)?;
    let Json(request) =
        body.map_err(|_| ApiError::InvalidArgument("Failed to parse action".to_owned()))?;

    let direction = match request.movement.as_str() {
        "" => None,
        key => Some(
            Direction::parse(key)
                .ok_or_else(|| ApiError::InvalidArgument("Failed to parse action".to_owned()))?,
        ),
    };

    let mut game = state.game.lock().await;
    let entry = game.player_by_token(token).ok_or(ApiError::UnknownToken)?;
    let (map_id, player_id) = (entry.map_id.clone(), entry.player_id);
    game.set_velocity(&map_id, player_id, direction);

    Ok(Json(json!({})))
}

// ============================================================================
// External tick
// ============================================================================

#[derive(Deserialize)]
struct TickRequest {
    #[serde(rename = "timeDelta")]
    time_delta: u64,
}

async fn external_tick(
    State(state): State<AppState>,
    body: Result<Json<TickRequest>, JsonRejection>,
) -> Result<Json<serde_json::Value>, ApiError> {
    if state.auto_tick {
        return Err(ApiError::BadRequest("Invalid endpoint".to_owned()));
    }
    let Json(request) = body
        .map_err(|_| ApiError::InvalidArgument("Failed to parse tick request JSON".to_owned()))?;

    let retired = {
        let mut game = state.game.lock().await;
        game.tick(request.time_delta)
    };
    if !retired.is_empty() {
        persist_retirements(&state.records, retired).await;
    }

    Ok(Json(json!({})))
}

// ============================================================================
// Records
// ============================================================================

fn default_max_items() -> u64 {
    100
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RecordsQuery {
    #[serde(default)]
    start: u64,
    #[serde(default = "default_max_items")]
    max_items: u64,
}

async fn records_page(
    State(state): State<AppState>,
    query: Result<Query<RecordsQuery>, QueryRejection>,
) -> Result<Json<Vec<Record>>, ApiError> {
    let Query(query) =
        query.map_err(|_| ApiError::InvalidArgument("Invalid records query".to_owned()))?;

    let page = state
        .records
        .load(query.start, query.max_items)
        .await
        .map_err(|error| match error {
            RecordsError::PageTooLarge => ApiError::InvalidArgument(error.to_string()),
            RecordsError::Db(error) => ApiError::Internal(error.to_string()),
        })?;

    Ok(Json(page))
}
