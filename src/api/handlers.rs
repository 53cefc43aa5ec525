//! API Handlers
//!
//! HTTP request handlers for the memory, health and stats endpoints.

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query, State,
    },
    response::{IntoResponse, Response},
    Json,
};
use tracing::{info, warn};

use crate::error::{GatewayError, Result};
use crate::memory::{full_key, summarize, CLEAR_ALL_CONFIRMATION, DEFAULT_LIMIT};
use crate::models::{
    ClearAllResponse, ConfirmationPrompt, ContextResponse, DeleteKeyResponse,
    DeleteMemoryQuery, DeleteNamespaceResponse, HealthResponse, MemoryAction,
    MemoryActionRequest, MemoryQuery, MemoryStatsResponse, StatsResponse, SummaryResponse,
    WriteMemoryRequest, WriteMemoryResponse,
};
use crate::state::AppState;

/// Handler for GET /api/memory
///
/// Lookup mode depends on which parameters are present, in priority order:
/// 1. `scope` + `namespace_id` + `key`: exact entry, 404 if missing
/// 2. `key` without `scope`: every entry with that key, across the store
/// 3. `scope` + `namespace_id`: namespace listing
/// 4. anything else: global listing, narrowed by `scope`/`type` if given
pub async fn get_memory_handler(
    State(state): State<AppState>,
    query: std::result::Result<Query<MemoryQuery>, QueryRejection>,
) -> Result<Response> {
    let Query(query) = query?;
    let scope = query.parsed_scope()?;
    let entry_type = query.entry_type.as_deref();
    let limit = query.limit.unwrap_or(DEFAULT_LIMIT);

    let memory = state.memory.read().await;
    let response = match (scope, query.namespace_id.as_deref(), query.key.as_deref()) {
        (Some(scope), Some(namespace_id), Some(key)) => {
            let entry = memory.get(scope, namespace_id, key).ok_or_else(|| {
                GatewayError::NotFound(format!(
                    "Memory not found: {}",
                    full_key(scope, namespace_id, key)
                ))
            })?;
            Json(entry).into_response()
        }
        (None, _, Some(key)) => Json(memory.find_by_key(key)).into_response(),
        (Some(scope), Some(namespace_id), None) => {
            Json(memory.list_namespace(scope, namespace_id, entry_type, limit)).into_response()
        }
        (scope, _, _) => Json(memory.list_all(scope, entry_type, limit)).into_response(),
    };

    Ok(response)
}

/// Handler for POST /api/memory
///
/// Upserts one entry and records it in the namespace's short-term ring.
pub async fn post_memory_handler(
    State(state): State<AppState>,
    payload: std::result::Result<Json<WriteMemoryRequest>, JsonRejection>,
) -> Result<Json<WriteMemoryResponse>> {
    let Json(req) = payload?;
    let new = req.into_new_memory()?;

    let outcome = state.memory.write().await.write(new);

    Ok(Json(WriteMemoryResponse::new(outcome)))
}

/// Handler for DELETE /api/memory
///
/// Without `clear_all`, a deletion never reaches past one scope + namespace.
/// Whole-namespace deletion answers with a dry-run count until `confirm=true`.
pub async fn delete_memory_handler(
    State(state): State<AppState>,
    query: std::result::Result<Query<DeleteMemoryQuery>, QueryRejection>,
) -> Result<Response> {
    let Query(query) = query?;

    if query.wants_clear_all() {
        if query.confirm.as_deref() != Some(CLEAR_ALL_CONFIRMATION) {
            return Err(GatewayError::invalid_with_hint(
                "clear_all requires explicit confirmation",
                format!("Add confirm={} to wipe all memory", CLEAR_ALL_CONFIRMATION),
            ));
        }

        let outcome = state.memory.write().await.clear_all();
        warn!(
            entries = outcome.entries_deleted,
            rings = outcome.short_term_cleared,
            "Cleared all memory"
        );
        return Ok(Json(ClearAllResponse {
            success: true,
            message: "All memory cleared".to_string(),
            deleted_count: outcome.entries_deleted,
            short_term_cleared: outcome.short_term_cleared,
        })
        .into_response());
    }

    let (scope, namespace_id) = query.target()?;
    let mut memory = state.memory.write().await;

    if let Some(key) = query.key.as_deref() {
        let deleted = memory.delete(scope, namespace_id, key);
        let response = DeleteKeyResponse::new(full_key(scope, namespace_id, key), deleted);
        return Ok(Json(response).into_response());
    }

    if !query.confirmed() {
        let count = memory.count_namespace(scope, namespace_id);
        return Err(GatewayError::ConfirmationRequired(
            ConfirmationPrompt::for_namespace(scope, namespace_id, count),
        ));
    }

    let deleted_count = memory.delete_namespace(scope, namespace_id);
    info!(%scope, namespace_id, deleted_count, "Deleted memory namespace");

    Ok(Json(DeleteNamespaceResponse {
        success: true,
        scope,
        namespace_id: namespace_id.to_string(),
        deleted_count,
    })
    .into_response())
}

/// Handler for PUT /api/memory
///
/// Read-only derived views over the short-term rings; never mutates.
pub async fn put_memory_handler(
    State(state): State<AppState>,
    payload: std::result::Result<Json<MemoryActionRequest>, JsonRejection>,
) -> Result<Response> {
    let Json(req) = payload?;
    let action = req.action()?;
    let scope = req.scope()?;
    let limit = req.limit.unwrap_or(DEFAULT_LIMIT);

    let context = state
        .memory
        .read()
        .await
        .context(scope, req.namespace_id.as_deref(), limit);

    let response = match action {
        MemoryAction::GetContext => Json(ContextResponse {
            count: context.len(),
            context,
            scope,
            namespace_id: req.namespace_id,
        })
        .into_response(),
        MemoryAction::Summarize => Json(SummaryResponse {
            summary: summarize(&context),
            item_count: context.len(),
            scope,
            namespace_id: req.namespace_id,
        })
        .into_response(),
    };

    Ok(response)
}

/// Handler for GET /stats
///
/// Returns real-data cache statistics and memory store counts.
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    let real_cache = state.real_cache.read().await.stats().into();
    let memory = {
        let memory = state.memory.read().await;
        MemoryStatsResponse {
            total_entries: memory.len(),
            short_term_namespaces: memory.short_term_namespaces(),
        }
    };

    Json(StatsResponse { real_cache, memory })
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
