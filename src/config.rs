//! Configuration Module
//!
//! Handles loading and managing gateway configuration from environment variables.

use std::env;
use std::str::FromStr;

use crate::cache::DEFAULT_TTL_MS;

/// Gateway configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port
    pub server_port: u16,
    /// Base URL of the MAS / NatureOS backend
    pub mas_api_url: String,
    /// Base URL of the MINDEX species/telemetry API
    pub mindex_api_url: String,
    /// Timeout in seconds for each upstream request
    pub upstream_timeout_secs: u64,
    /// TTL in milliseconds for cached upstream responses
    pub real_cache_ttl_ms: u64,
}

fn env_or<T: FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

/// Base URLs are joined with request paths, so a trailing slash is dropped.
fn url_or(name: &str, default: &str) -> String {
    env::var(name)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
        .trim()
        .trim_end_matches('/')
        .to_string()
}

impl Config {
    pub const DEFAULT_MAS_API_URL: &'static str = "http://localhost:8001";
    pub const DEFAULT_MINDEX_API_URL: &'static str = "http://localhost:8000";

    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `MAS_API_URL` - MAS backend base URL (default: http://localhost:8001)
    /// - `MINDEX_API_URL` - MINDEX base URL (default: http://localhost:8000)
    /// - `UPSTREAM_TIMEOUT_SECS` - Upstream request timeout (default: 15)
    /// - `REAL_CACHE_TTL_MS` - Fallback cache TTL (default: 300000)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            server_port: env_or("SERVER_PORT", defaults.server_port),
            mas_api_url: url_or("MAS_API_URL", Self::DEFAULT_MAS_API_URL),
            mindex_api_url: url_or("MINDEX_API_URL", Self::DEFAULT_MINDEX_API_URL),
            upstream_timeout_secs: env_or("UPSTREAM_TIMEOUT_SECS", defaults.upstream_timeout_secs),
            real_cache_ttl_ms: env_or("REAL_CACHE_TTL_MS", defaults.real_cache_ttl_ms),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_port: 3000,
            mas_api_url: Self::DEFAULT_MAS_API_URL.to_string(),
            mindex_api_url: Self::DEFAULT_MINDEX_API_URL.to_string(),
            upstream_timeout_secs: 15,
            real_cache_ttl_ms: DEFAULT_TTL_MS,
        }
    }
}
