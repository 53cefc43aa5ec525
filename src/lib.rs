//! NatureOS Gateway
//!
//! Scoped agent memory and a real-data fallback cache behind the dashboard's
//! upstream proxy routes.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod memory;
pub mod models;
pub mod state;
pub mod upstream;

pub use config::Config;
pub use error::{GatewayError, Result};
pub use state::AppState;
