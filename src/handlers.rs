use crate::cache::ProfileCache;
use crate::errors::{AppError, ResultExt};
use crate::models::{CacheStatus, SearchParams, SearchResponse};
use crate::search::search_profiles;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use serde_json::json;
use std::sync::Arc;

/// Longest accepted search query, in characters.
pub const MAX_QUERY_CHARS: usize = 200;

/// Shared application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    /// Snapshot of resolved client profiles.
    pub profile_cache: Arc<ProfileCache>,
}

/// Health check endpoint.
///
/// Returns the service status and version.
pub async fn health() -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::OK,
        Json(json!({
            "status": "healthy",
            "service": "shop-clients-api",
            "version": env!("CARGO_PKG_VERSION")
        })),
    )
}

/// GET /api/v1/clients/search?q=...
///
/// Searches resolved client profiles by name, phone or plates. An empty query
/// returns an empty result without touching the record store. When the
/// snapshot is expired and the record store cannot be read, the request fails
/// rather than serving stale data.
///
/// # Arguments
///
/// * `state` - The application state.
/// * `params` - Query parameters containing the free-text query.
///
/// # Returns
///
/// * `Result<Json<SearchResponse>, AppError>` - Up to 50 profiles, newest first, plus the full match count.
pub async fn search_clients(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchParams>,
) -> Result<Json<SearchResponse>, AppError> {
    let query = params.q.unwrap_or_default();
    let query = query.trim();

    if query.is_empty() {
        return Ok(Json(SearchResponse::default()));
    }
    if query.chars().count() > MAX_QUERY_CHARS {
        return Err(AppError::BadRequest(format!(
            "Query must be at most {} characters",
            MAX_QUERY_CHARS
        )));
    }

    tracing::info!("GET /clients/search - q: {}", query);

    let snapshot = state
        .profile_cache
        .get()
        .await
        .context("Failed to load client profiles")?;
    let response = search_profiles(&snapshot.profiles, query);

    tracing::debug!(
        "Search '{}' matched {} profile(s), returning {}",
        query,
        response.total,
        response.results.len()
    );

    Ok(Json(response))
}

/// POST /api/v1/clients/cache/invalidate
///
/// Drops the profile snapshot so the next search recomputes it.
pub async fn invalidate_cache(
    State(state): State<Arc<AppState>>,
) -> (StatusCode, Json<serde_json::Value>) {
    state.profile_cache.invalidate().await;
    (
        StatusCode::OK,
        Json(json!({
            "success": true,
            "message": "Client profile cache invalidated"
        })),
    )
}

/// GET /api/v1/clients/cache
pub async fn cache_status(State(state): State<Arc<AppState>>) -> Json<CacheStatus> {
    Json(state.profile_cache.status().await)
}
