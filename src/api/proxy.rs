//! Proxy Handlers
//!
//! Forward `/api/mas/*` and `/api/mindex/*` to the configured backends.
//! GETs fall back to the real-data cache; POSTs pass straight through.

use axum::{
    extract::{rejection::JsonRejection, Path, RawQuery, State},
    response::Response,
    Json,
};
use serde_json::Value;

use crate::error::Result;
use crate::state::AppState;
use crate::upstream::{get_with_fallback, post_passthrough, UpstreamService};

/// Handler for GET /api/mas/*path
pub async fn mas_get_handler(
    State(state): State<AppState>,
    Path(path): Path<String>,
    RawQuery(query): RawQuery,
) -> Result<Response> {
    get_with_fallback(&state, UpstreamService::Mas, &path, query.as_deref()).await
}

/// Handler for POST /api/mas/*path
pub async fn mas_post_handler(
    State(state): State<AppState>,
    Path(path): Path<String>,
    RawQuery(query): RawQuery,
    payload: std::result::Result<Json<Value>, JsonRejection>,
) -> Result<Response> {
    let Json(body) = payload?;
    post_passthrough(&state, UpstreamService::Mas, &path, query.as_deref(), &body).await
}

/// Handler for GET /api/mindex/*path
pub async fn mindex_get_handler(
    State(state): State<AppState>,
    Path(path): Path<String>,
    RawQuery(query): RawQuery,
) -> Result<Response> {
    get_with_fallback(&state, UpstreamService::Mindex, &path, query.as_deref()).await
}

/// Handler for POST /api/mindex/*path
pub async fn mindex_post_handler(
    State(state): State<AppState>,
    Path(path): Path<String>,
    RawQuery(query): RawQuery,
    payload: std::result::Result<Json<Value>, JsonRejection>,
) -> Result<Response> {
    let Json(body) = payload?;
    post_passthrough(&state, UpstreamService::Mindex, &path, query.as_deref(), &body).await
}
