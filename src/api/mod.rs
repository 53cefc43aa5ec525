//! API Module
//!
//! HTTP handlers and routing for the gateway REST API.
//!
//! # Endpoints
//! - `GET|POST|PUT|DELETE /api/memory` - Scoped memory store
//! - `GET|POST /api/mas/*path` - MAS backend proxy
//! - `GET|POST /api/mindex/*path` - MINDEX proxy
//! - `GET /stats` - Cache and memory statistics
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod proxy;
pub mod routes;

pub use handlers::*;
pub use proxy::*;
pub use routes::create_router;
