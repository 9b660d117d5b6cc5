//! HTTP API
//!
//! Public read routes for the site, the cron trigger for link checks, and
//! curator routes behind the admin key.

pub mod auth;
pub mod routes;

use std::sync::Arc;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;
use tracing::error;

use crate::curation::SystemMode;
use crate::db::CatalogDb;
use crate::error::CatalogError;
use crate::links::{LinkCheckError, LinkMonitor};
use auth::SecretValidator;

/// State shared across handlers
pub struct AppState {
    pub db: Arc<CatalogDb>,
    pub mode: SystemMode,
    pub secrets: SecretValidator,
    pub monitor: Arc<LinkMonitor>,
}

pub type SharedState = Arc<AppState>;

pub fn create_router(state: SharedState) -> Router {
    Router::new()
        // Public catalog
        .route("/api/games", get(routes::list_games))
        .route("/api/games/:slug", get(routes::game_detail))
        .route("/api/featured", get(routes::featured))
        .route("/api/age-groups", get(routes::age_groups))
        .route("/api/categories", get(routes::categories))
        // Scheduler trigger
        .route("/api/cron/validate-links", post(routes::validate_links))
        // Curation
        .route("/api/admin/games", post(routes::admin_create_game))
        .route(
            "/api/admin/games/:id",
            get(routes::admin_get_game).put(routes::admin_update_game),
        )
        .route("/api/admin/games/:id/approve", post(routes::admin_approve_game))
        .route("/api/admin/games/:id/enhancement", post(routes::admin_apply_enhancement))
        .route("/api/admin/curation-log", get(routes::admin_curation_log))
        // Health check
        .route("/health", get(routes::health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[derive(Debug)]
pub enum ApiError {
    Unauthorized,
    Catalog(CatalogError),
    LinkCheck(LinkCheckError),
}

impl From<CatalogError> for ApiError {
    fn from(e: CatalogError) -> Self {
        ApiError::Catalog(e)
    }
}

impl From<LinkCheckError> for ApiError {
    fn from(e: LinkCheckError) -> Self {
        ApiError::LinkCheck(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::Unauthorized => (StatusCode::UNAUTHORIZED, "Unauthorized".to_string()),
            ApiError::Catalog(CatalogError::NotFound(what)) => {
                (StatusCode::NOT_FOUND, format!("Not found: {}", what))
            }
            ApiError::Catalog(CatalogError::InvalidInput(msg)) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Catalog(CatalogError::Conflict(msg)) => (StatusCode::CONFLICT, msg),
            ApiError::Catalog(e) => {
                error!(error = %e, "Request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal error".to_string())
            }
            ApiError::LinkCheck(e) => {
                error!(error = %e, "Link validation failed");
                (StatusCode::INTERNAL_SERVER_ERROR, "Link validation failed".to_string())
            }
        };

        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}
