//! Real-Data Cache Module
//!
//! Last-known-good upstream responses with per-entry TTL, served by the proxy
//! routes when an upstream is unreachable.

mod entry;
mod stats;
mod store;


// Re-export public types
pub use entry::{current_timestamp_ms, CacheEntry, CachedBody};
pub use stats::CacheStats;
pub use store::{CacheOptions, RealDataCache};

// == Public Constants ==
/// Default time to live for cached responses (5 minutes)
pub const DEFAULT_TTL_MS: u64 = 300_000;
