//! Real-Data Fallback
//!
//! Fetch-then-fallback flow used by every proxied GET: a live upstream
//! response is cached and returned tagged `source: "mas"`; on failure the last
//! cached copy is replayed tagged `source: "cached_real"`; with nothing cached
//! the caller gets a 503 tagged `source: "none"`.

use axum::{
    body::Body,
    http::{header, HeaderMap, HeaderName, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use base64::{engine::general_purpose::STANDARD, Engine};
use chrono::{TimeZone, Utc};
use serde::Serialize;
use serde_json::{json, Map, Value};
use tracing::{info, warn};

use crate::cache::{CacheEntry, CacheOptions, CachedBody};
use crate::error::{normalize_error, GatewayError, Result};
use crate::state::AppState;
use crate::upstream::{UpstreamBody, UpstreamError, UpstreamResponse, UpstreamService};

/// Header carrying the source tag on non-JSON responses
pub const DATA_SOURCE_HEADER: &str = "x-data-source";

// == Data Source ==
/// Where a proxied response came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DataSource {
    /// Live upstream response
    Mas,
    /// Replayed last-known-good response
    CachedReal,
    /// Nothing available
    None,
}

impl DataSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            DataSource::Mas => "mas",
            DataSource::CachedReal => "cached_real",
            DataSource::None => "none",
        }
    }
}

/// Cache key for a proxied GET: `<service>:<path>[?<query>]`.
pub fn cache_key(service: UpstreamService, path: &str, query: Option<&str>) -> String {
    let path = path.trim_start_matches('/');
    match query.filter(|q| !q.is_empty()) {
        Some(query) => format!("{}:{}?{}", service.name(), path, query),
        None => format!("{}:{}", service.name(), path),
    }
}

// == GET With Fallback ==
/// Fetches from upstream, writing through the real-data cache, and falls back
/// to the cached copy when the fetch fails.
pub async fn get_with_fallback(
    state: &AppState,
    service: UpstreamService,
    path: &str,
    query: Option<&str>,
) -> Result<Response> {
    let key = cache_key(service, path, query);

    match state.upstream.get(service, path, query).await {
        Ok(upstream) => {
            let mut options = CacheOptions::default()
                .with_ttl_ms(state.real_cache_ttl_ms)
                .with_status(upstream.status);
            if let Some(content_type) = &upstream.content_type {
                options = options.with_header(header::CONTENT_TYPE.as_str(), content_type.clone());
            }
            state
                .real_cache
                .write()
                .await
                .set(key, cached_body(&upstream), options);

            Ok(live_response(upstream))
        }
        Err(UpstreamError::InvalidPath { path }) => Err(invalid_path(&path)),
        Err(err) => {
            let message = normalize_error(&err);
            warn!(service = service.name(), path, error = %message, "Upstream fetch failed");

            let cached = state.real_cache.write().await.get(&key);
            match cached {
                Some(entry) => {
                    info!(key = %key, "Serving cached real data");
                    replay_cached(entry)
                }
                None => Err(GatewayError::UpstreamUnavailable(message)),
            }
        }
    }
}

// == POST Passthrough ==
/// Forwards a JSON body upstream. POST responses are never cached.
pub async fn post_passthrough(
    state: &AppState,
    service: UpstreamService,
    path: &str,
    query: Option<&str>,
    body: &Value,
) -> Result<Response> {
    match state.upstream.post_json(service, path, query, body).await {
        Ok(upstream) => Ok(live_response(upstream)),
        Err(UpstreamError::InvalidPath { path }) => Err(invalid_path(&path)),
        Err(err) => {
            let message = normalize_error(&err);
            warn!(service = service.name(), path, error = %message, "Upstream POST failed");
            Err(GatewayError::UpstreamUnavailable(message))
        }
    }
}

// == Response Shaping ==
/// Adds `source` (and `cached` fields on replay) to a JSON payload. Objects
/// get the fields merged in; anything else is wrapped as `{data, ...}`.
pub fn tag_json(value: Value, source: DataSource, cached_at: Option<String>) -> Value {
    let mut object = match value {
        Value::Object(map) => map,
        other => {
            let mut map = Map::new();
            map.insert("data".to_string(), other);
            map
        }
    };

    object.insert("source".to_string(), json!(source));
    if let Some(cached_at) = cached_at {
        object.insert("cached".to_string(), Value::Bool(true));
        object.insert("cached_at".to_string(), Value::String(cached_at));
    }
    Value::Object(object)
}

fn invalid_path(path: &str) -> GatewayError {
    GatewayError::invalid_with_hint(
        format!("Invalid upstream path: {}", path),
        "Path segments must not be '.' or '..'",
    )
}

fn cached_body(upstream: &UpstreamResponse) -> CachedBody {
    match &upstream.body {
        UpstreamBody::Json(value) => CachedBody::Json(value.clone()),
        UpstreamBody::Binary(bytes) => CachedBody::Binary {
            body_base64: STANDARD.encode(bytes),
            content_type: upstream
                .content_type
                .clone()
                .unwrap_or_else(|| "application/octet-stream".to_string()),
        },
    }
}

fn status_or_ok(status: u16) -> StatusCode {
    StatusCode::from_u16(status).unwrap_or(StatusCode::OK)
}

fn binary_response(
    status: StatusCode,
    mut headers: HeaderMap,
    content_type: &str,
    bytes: Vec<u8>,
    source: DataSource,
) -> Response {
    if let Ok(value) = HeaderValue::from_str(content_type) {
        headers.insert(header::CONTENT_TYPE, value);
    }
    headers.insert(
        HeaderName::from_static(DATA_SOURCE_HEADER),
        HeaderValue::from_static(source.as_str()),
    );
    (status, headers, Body::from(bytes)).into_response()
}

fn live_response(upstream: UpstreamResponse) -> Response {
    let status = status_or_ok(upstream.status);
    match upstream.body {
        UpstreamBody::Json(value) => {
            (status, Json(tag_json(value, DataSource::Mas, None))).into_response()
        }
        UpstreamBody::Binary(bytes) => {
            let content_type = upstream
                .content_type
                .unwrap_or_else(|| "application/octet-stream".to_string());
            binary_response(status, HeaderMap::new(), &content_type, bytes, DataSource::Mas)
        }
    }
}

/// Rebuilds a response from a cache entry, replaying status and headers.
fn replay_cached(entry: CacheEntry) -> Result<Response> {
    let status = status_or_ok(entry.status);
    let cached_at = Utc
        .timestamp_millis_opt(entry.stored_at as i64)
        .single()
        .map(|t| t.to_rfc3339())
        .unwrap_or_default();

    let mut headers = HeaderMap::new();
    for (name, value) in &entry.headers {
        // Content type is set by the body below
        if name.eq_ignore_ascii_case(header::CONTENT_TYPE.as_str()) {
            continue;
        }
        if let (Ok(name), Ok(value)) = (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(value),
        ) {
            headers.insert(name, value);
        }
    }

    match entry.body {
        CachedBody::Json(value) => {
            let body = tag_json(value, DataSource::CachedReal, Some(cached_at));
            Ok((status, headers, Json(body)).into_response())
        }
        CachedBody::Binary {
            body_base64,
            content_type,
        } => {
            let bytes = STANDARD.decode(body_base64.as_bytes()).map_err(|e| {
                GatewayError::Internal(format!("Corrupt cached binary body: {}", e))
            })?;
            Ok(binary_response(
                status,
                headers,
                &content_type,
                bytes,
                DataSource::CachedReal,
            ))
        }
    }
}
