//! Real-Data Cache Store Module
//!
//! Keeps the last successful upstream response per key so proxy routes can
//! serve it when the upstream is failing. Entries expire lazily on read; there
//! is no sweeper and no capacity bound.

use std::collections::HashMap;

use tracing::debug;

use crate::cache::{CacheEntry, CacheStats, CachedBody, DEFAULT_TTL_MS};

// == Cache Options ==
/// Write options for [`RealDataCache::set`].
#[derive(Debug, Clone)]
pub struct CacheOptions {
    /// Time to live in milliseconds
    pub ttl_ms: u64,
    /// HTTP status replayed on fallback
    pub status: u16,
    /// Headers replayed on fallback
    pub headers: HashMap<String, String>,
}

impl Default for CacheOptions {
    fn default() -> Self {
        Self {
            ttl_ms: DEFAULT_TTL_MS,
            status: 200,
            headers: HashMap::new(),
        }
    }
}

impl CacheOptions {
    pub fn with_ttl_ms(mut self, ttl_ms: u64) -> Self {
        self.ttl_ms = ttl_ms;
        self
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = status;
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }
}

// == Real Data Cache ==
/// Last-known-good upstream responses keyed by caller-composed cache key.
#[derive(Debug, Default)]
pub struct RealDataCache {
    /// Key-value storage
    entries: HashMap<String, CacheEntry>,
    /// Usage statistics
    stats: CacheStats,
}

impl RealDataCache {
    // == Constructor ==
    pub fn new() -> Self {
        Self::default()
    }

    // == Set ==
    /// Stores a response under `key`, replacing any previous entry entirely.
    pub fn set(
        &mut self,
        key: impl Into<String>,
        body: impl Into<CachedBody>,
        options: CacheOptions,
    ) {
        let key = key.into();
        let ttl_ms = options.ttl_ms;
        let entry = CacheEntry::new(body.into(), options.status, options.headers, ttl_ms);
        debug!(key = %key, ttl_ms, "Caching real upstream response");

        self.entries.insert(key, entry);
        self.stats.record_write();
        self.stats.set_total_entries(self.entries.len());
    }

    // == Get ==
    /// Returns the entry for `key` if present and not expired.
    ///
    /// Expired entries are removed as a side effect, so a second lookup after
    /// expiry finds nothing either way.
    pub fn get(&mut self, key: &str) -> Option<CacheEntry> {
        let expired = match self.entries.get(key) {
            Some(entry) if entry.is_expired() => true,
            Some(entry) => {
                let entry = entry.clone();
                self.stats.record_hit();
                return Some(entry);
            }
            None => false,
        };

        if expired {
            self.entries.remove(key);
            self.stats.record_expiration();
            self.stats.set_total_entries(self.entries.len());
            debug!(key = %key, "Cached real response expired");
        } else {
            self.stats.record_miss();
        }
        None
    }

    // == Contains ==
    /// Returns true if an entry is stored under `key`, expired or not.
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    // == Stats ==
    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        let mut stats = self.stats.clone();
        stats.set_total_entries(self.entries.len());
        stats
    }

    // == Length ==
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::thread::sleep;
    use std::time::Duration;

    #[test]
    fn test_cache_new() {
        let cache = RealDataCache::new();
        assert_eq!(cache.len(), 0);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_set_and_get_defaults() {
        let mut cache = RealDataCache::new();

        cache.set(
            "earth2:layers:wind:forecast",
            json!({"layers": []}),
            CacheOptions::default(),
        );
        let entry = cache.get("earth2:layers:wind:forecast").unwrap();

        assert_eq!(entry.body, CachedBody::Json(json!({"layers": []})));
        assert_eq!(entry.status, 200);
        assert!(entry.headers.is_empty());
        assert_eq!(entry.expires_at - entry.stored_at, DEFAULT_TTL_MS);
    }

    #[test]
    fn test_get_missing_returns_none() {
        let mut cache = RealDataCache::new();
        assert!(cache.get("missing").is_none());
        assert_eq!(cache.stats().misses, 1);
    }

    #[test]
    fn test_overwrite_replaces_everything() {
        let mut cache = RealDataCache::new();

        cache.set(
            "k",
            json!({"a": 1, "b": 2}),
            CacheOptions::default()
                .with_status(203)
                .with_header("content-type", "application/json")
                .with_ttl_ms(60_000),
        );
        cache.set("k", json!({"c": 3}), CacheOptions::default().with_ttl_ms(1_000));

        let entry = cache.get("k").unwrap();
        assert_eq!(entry.body, CachedBody::Json(json!({"c": 3})));
        assert_eq!(entry.status, 200);
        assert!(entry.headers.is_empty());
        assert_eq!(entry.expires_at - entry.stored_at, 1_000);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_ttl_expiration_removes_entry() {
        let mut cache = RealDataCache::new();

        cache.set("x", json!({"a": 1}), CacheOptions::default().with_ttl_ms(100));
        assert_eq!(cache.get("x").unwrap().body, CachedBody::Json(json!({"a": 1})));

        sleep(Duration::from_millis(150));

        assert!(cache.get("x").is_none());
        assert!(!cache.contains_key("x"));
        // Idempotent: still gone, counted as a plain miss now
        assert!(cache.get("x").is_none());

        let stats = cache.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.expirations, 1);
        assert_eq!(stats.misses, 2);
        assert_eq!(stats.total_entries, 0);
    }

    #[test]
    fn test_zero_ttl_is_immediately_expired() {
        let mut cache = RealDataCache::new();
        cache.set("k", json!(1), CacheOptions::default().with_ttl_ms(0));
        assert!(cache.get("k").is_none());
    }

    #[test]
    fn test_binary_body_kept_encoded() {
        let mut cache = RealDataCache::new();
        let body = CachedBody::Binary {
            body_base64: "iVBORw0K".to_string(),
            content_type: "image/png".to_string(),
        };

        cache.set("tiles:3:2:1", body.clone(), CacheOptions::default());
        assert_eq!(cache.get("tiles:3:2:1").unwrap().body, body);
    }

    #[test]
    fn test_stats_track_writes() {
        let mut cache = RealDataCache::new();
        cache.set("a", json!(1), CacheOptions::default());
        cache.set("a", json!(2), CacheOptions::default());
        cache.set("b", json!(3), CacheOptions::default());

        let stats = cache.stats();
        assert_eq!(stats.writes, 3);
        assert_eq!(stats.total_entries, 2);
    }
}
