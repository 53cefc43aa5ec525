//! Application State
//!
//! Stores and clients shared by every handler. Each test builds its own
//! state, so no data leaks between tests.

use std::sync::Arc;

use tokio::sync::RwLock;

use crate::cache::{RealDataCache, DEFAULT_TTL_MS};
use crate::config::Config;
use crate::memory::MemoryStore;
use crate::upstream::UpstreamClient;

/// Application state shared across all handlers.
///
/// Both stores are wrapped in Arc<RwLock<>> for thread-safe access.
#[derive(Clone)]
pub struct AppState {
    /// Last-known-good upstream responses
    pub real_cache: Arc<RwLock<RealDataCache>>,
    /// Scoped conversational memory
    pub memory: Arc<RwLock<MemoryStore>>,
    /// Client for the proxied backends
    pub upstream: UpstreamClient,
    /// TTL applied to cached upstream responses
    pub real_cache_ttl_ms: u64,
}

impl AppState {
    /// Creates a new AppState with empty stores.
    pub fn new(upstream: UpstreamClient) -> Self {
        Self {
            real_cache: Arc::new(RwLock::new(RealDataCache::new())),
            memory: Arc::new(RwLock::new(MemoryStore::new())),
            upstream,
            real_cache_ttl_ms: DEFAULT_TTL_MS,
        }
    }

    /// Creates a new AppState from configuration.
    pub fn from_config(config: &Config) -> Result<Self, reqwest::Error> {
        let upstream = UpstreamClient::from_config(config)?;
        Ok(Self::new(upstream).with_real_cache_ttl_ms(config.real_cache_ttl_ms))
    }

    pub fn with_real_cache_ttl_ms(mut self, ttl_ms: u64) -> Self {
        self.real_cache_ttl_ms = ttl_ms;
        self
    }
}
