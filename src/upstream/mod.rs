//! Upstream Proxy Module
//!
//! Forwards dashboard requests to the MAS and MINDEX backends, writing
//! successful GET responses through the real-data cache.

mod client;
mod fallback;

pub use client::{UpstreamBody, UpstreamClient, UpstreamError, UpstreamResponse, UpstreamService};
pub use fallback::{
    cache_key, get_with_fallback, post_passthrough, tag_json, DataSource, DATA_SOURCE_HEADER,
};
