//! Cache Entry Module
//!
//! Defines a last-known-good upstream response with its replay metadata.

use std::collections::HashMap;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::Serialize;
use serde_json::Value;

// == Cached Body ==
/// Payload of a cached upstream response.
///
/// Binary bodies (map tiles, images) are held base64-encoded together with
/// their content type so they can be replayed byte-for-byte.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CachedBody {
    /// Binary payload
    #[serde(rename_all = "camelCase")]
    Binary {
        body_base64: String,
        content_type: String,
    },
    /// JSON payload
    Json(Value),
}

impl From<Value> for CachedBody {
    fn from(value: Value) -> Self {
        CachedBody::Json(value)
    }
}

// == Cache Entry ==
/// A cached upstream response.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry {
    /// The stored body
    pub body: CachedBody,
    /// HTTP status to replay
    pub status: u16,
    /// Headers to replay (e.g. `content-type`)
    pub headers: HashMap<String, String>,
    /// Creation timestamp (Unix milliseconds)
    pub stored_at: u64,
    /// Expiration timestamp (Unix milliseconds)
    pub expires_at: u64,
}

impl CacheEntry {
    // == Constructor ==
    /// Creates a new entry expiring `ttl_ms` milliseconds from now.
    pub fn new(
        body: CachedBody,
        status: u16,
        headers: HashMap<String, String>,
        ttl_ms: u64,
    ) -> Self {
        let now = current_timestamp_ms();
        Self {
            body,
            status,
            headers,
            stored_at: now,
            expires_at: now.saturating_add(ttl_ms),
        }
    }

    // == Is Expired ==
    /// Checks if the entry has expired.
    ///
    /// An entry is expired once the current time reaches `expires_at`, so an
    /// entry written with a TTL of `t` is gone for any elapsed time `>= t`.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(current_timestamp_ms())
    }

    /// Expiry check against an explicit clock reading.
    pub fn is_expired_at(&self, now_ms: u64) -> bool {
        now_ms >= self.expires_at
    }

    // == Time To Live ==
    /// Returns remaining TTL in milliseconds, 0 once expired.
    pub fn ttl_remaining_ms(&self) -> u64 {
        self.expires_at.saturating_sub(current_timestamp_ms())
    }
}

// == Utility Functions ==
/// Returns current Unix timestamp in milliseconds.
pub fn current_timestamp_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
