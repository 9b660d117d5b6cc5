//! HTTP route handlers

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Json},
};
use serde::{Deserialize, Serialize};

use super::{ApiError, SharedState};
use crate::curation::{failing_gates, ActivationDecision, Gate};
use crate::db::curation_log::{self, CurationLogEntry};
use crate::db::games::{self, GamePatch, GameRecord, NewGame};
use crate::db::listing::{list_active_games, GamePage, ListingFilter, ListingParams};
use crate::discovery::{self, AgeGroupInfo, CategoryInfo, GameDetail, DEFAULT_FEATURED_COUNT};
use crate::enhance::Enhancement;
use crate::error::CatalogError;
use crate::links::LinkCheckSummary;

const MAX_FEATURED_COUNT: usize = 12;
const DEFAULT_LOG_LIMIT: u32 = 50;
const MAX_LOG_LIMIT: u32 = 500;

/// Health check endpoint
pub async fn health() -> impl IntoResponse {
    "OK"
}

// === Public catalog ===

/// GET /api/games
pub async fn list_games(
    State(state): State<SharedState>,
    Query(params): Query<ListingParams>,
) -> Result<Json<GamePage>, ApiError> {
    let filter = ListingFilter::from(&params);
    let page = state.db.with_conn(|conn| list_active_games(conn, &filter))?;
    Ok(Json(page))
}

/// GET /api/games/:slug
pub async fn game_detail(
    State(state): State<SharedState>,
    Path(slug): Path<String>,
) -> Result<Json<GameDetail>, ApiError> {
    let detail = state.db.with_conn(|conn| discovery::game_detail(conn, &slug))?;
    detail
        .map(Json)
        .ok_or_else(|| CatalogError::NotFound(slug).into())
}

#[derive(Debug, Deserialize)]
pub struct FeaturedParams {
    pub count: Option<String>,
}

/// GET /api/featured
pub async fn featured(
    State(state): State<SharedState>,
    Query(params): Query<FeaturedParams>,
) -> Result<Json<Vec<GameRecord>>, ApiError> {
    let count = params
        .count
        .as_deref()
        .and_then(|c| c.trim().parse::<usize>().ok())
        .map(|c| c.clamp(1, MAX_FEATURED_COUNT))
        .unwrap_or(DEFAULT_FEATURED_COUNT);

    let games = state
        .db
        .with_conn(|conn| discovery::featured_games(conn, count, &mut rand::thread_rng()))?;
    Ok(Json(games))
}

/// GET /api/age-groups
pub async fn age_groups() -> Json<Vec<AgeGroupInfo>> {
    Json(discovery::age_groups())
}

/// GET /api/categories
pub async fn categories() -> Json<Vec<CategoryInfo>> {
    Json(discovery::categories())
}

// === Scheduler trigger ===

/// POST /api/cron/validate-links
pub async fn validate_links(
    State(state): State<SharedState>,
    headers: HeaderMap,
) -> Result<Json<LinkCheckSummary>, ApiError> {
    if !state.secrets.allows_cron(&headers) {
        return Err(ApiError::Unauthorized);
    }
    let summary = state.monitor.run().await?;
    Ok(Json(summary))
}

// === Curation ===

fn require_admin(state: &SharedState, headers: &HeaderMap) -> Result<(), ApiError> {
    if state.secrets.allows_admin(headers) {
        Ok(())
    } else {
        Err(ApiError::Unauthorized)
    }
}

/// Full record plus the policy's view of it
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminGameView {
    #[serde(flatten)]
    pub game: GameRecord,
    pub failing_gates: Vec<Gate>,
    pub activation: ActivationDecision,
}

impl AdminGameView {
    fn new(game: GameRecord, state: &SharedState) -> Self {
        Self {
            failing_gates: failing_gates(&game.safety),
            activation: game.activation(state.mode),
            game,
        }
    }
}

/// POST /api/admin/games
pub async fn admin_create_game(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Json(input): Json<NewGame>,
) -> Result<(StatusCode, Json<AdminGameView>), ApiError> {
    require_admin(&state, &headers)?;
    let game = state
        .db
        .with_conn_mut(|conn| games::create_game(conn, input, state.mode))?;
    Ok((StatusCode::CREATED, Json(AdminGameView::new(game, &state))))
}

/// GET /api/admin/games/:id
pub async fn admin_get_game(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<AdminGameView>, ApiError> {
    require_admin(&state, &headers)?;
    let game = state
        .db
        .with_conn(|conn| games::get_game(conn, &id))?
        .ok_or(CatalogError::NotFound(id))?;
    Ok(Json(AdminGameView::new(game, &state)))
}

/// PUT /api/admin/games/:id
pub async fn admin_update_game(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(patch): Json<GamePatch>,
) -> Result<Json<AdminGameView>, ApiError> {
    require_admin(&state, &headers)?;
    let game = state
        .db
        .with_conn_mut(|conn| games::update_game(conn, &id, patch, state.mode))?;
    Ok(Json(AdminGameView::new(game, &state)))
}

/// POST /api/admin/games/:id/approve
pub async fn admin_approve_game(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<AdminGameView>, ApiError> {
    require_admin(&state, &headers)?;
    let game = state
        .db
        .with_conn_mut(|conn| games::approve_game(conn, &id, state.mode))?;
    Ok(Json(AdminGameView::new(game, &state)))
}

/// POST /api/admin/games/:id/enhancement
pub async fn admin_apply_enhancement(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(enhancement): Json<Enhancement>,
) -> Result<Json<AdminGameView>, ApiError> {
    require_admin(&state, &headers)?;
    let game = state
        .db
        .with_conn_mut(|conn| games::apply_enhancement(conn, &id, &enhancement))?;
    Ok(Json(AdminGameView::new(game, &state)))
}

#[derive(Debug, Deserialize)]
pub struct LogParams {
    pub limit: Option<String>,
}

/// GET /api/admin/curation-log
pub async fn admin_curation_log(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Query(params): Query<LogParams>,
) -> Result<Json<Vec<CurationLogEntry>>, ApiError> {
    require_admin(&state, &headers)?;
    let limit = params
        .limit
        .as_deref()
        .and_then(|l| l.trim().parse::<u32>().ok())
        .map(|l| l.clamp(1, MAX_LOG_LIMIT))
        .unwrap_or(DEFAULT_LOG_LIMIT);
    let entries = state.db.with_conn(|conn| curation_log::recent(conn, limit))?;
    Ok(Json(entries))
}
