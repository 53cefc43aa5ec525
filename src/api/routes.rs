//! API Routes
//!
//! Configures the Axum router with all gateway endpoints.

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    delete_memory_handler, get_memory_handler, health_handler, post_memory_handler,
    put_memory_handler, stats_handler,
};
use super::proxy::{mas_get_handler, mas_post_handler, mindex_get_handler, mindex_post_handler};
use crate::state::AppState;

/// Creates the main router with all endpoints configured.
///
/// # Middleware
/// - CORS: Allows any origin (the dashboard is served from another host)
/// - Tracing: Logs all requests
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route(
            "/api/memory",
            get(get_memory_handler)
                .post(post_memory_handler)
                .put(put_memory_handler)
                .delete(delete_memory_handler),
        )
        .route("/api/mas/*path", get(mas_get_handler).post(mas_post_handler))
        .route(
            "/api/mindex/*path",
            get(mindex_get_handler).post(mindex_post_handler),
        )
        .route("/stats", get(stats_handler))
        .route("/health", get(health_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
