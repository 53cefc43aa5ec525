//! Response DTOs for the gateway API
//!
//! Defines the structure of outgoing HTTP response bodies.

use serde::Serialize;

use crate::cache::CacheStats;
use crate::memory::{MemoryEntry, MemoryScope, WriteOutcome};

/// Response body for `POST /api/memory`
#[derive(Debug, Clone, Serialize)]
pub struct WriteMemoryResponse {
    pub success: bool,
    #[serde(flatten)]
    pub outcome: WriteOutcome,
}

impl WriteMemoryResponse {
    pub fn new(outcome: WriteOutcome) -> Self {
        Self {
            success: true,
            outcome,
        }
    }
}

/// Response body for a single-key `DELETE /api/memory`
///
/// `success` is false when the key was already absent.
#[derive(Debug, Clone, Serialize)]
pub struct DeleteKeyResponse {
    pub success: bool,
    pub full_key: String,
    pub message: String,
}

impl DeleteKeyResponse {
    pub fn new(full_key: String, deleted: bool) -> Self {
        let message = if deleted {
            format!("Deleted '{}'", full_key)
        } else {
            format!("'{}' not found, nothing deleted", full_key)
        };
        Self {
            success: deleted,
            full_key,
            message,
        }
    }
}

/// Response body for a confirmed namespace `DELETE /api/memory`
#[derive(Debug, Clone, Serialize)]
pub struct DeleteNamespaceResponse {
    pub success: bool,
    pub scope: MemoryScope,
    pub namespace_id: String,
    pub deleted_count: usize,
}

/// Response body for `DELETE /api/memory?clear_all=true`
#[derive(Debug, Clone, Serialize)]
pub struct ClearAllResponse {
    pub success: bool,
    pub message: String,
    pub deleted_count: usize,
    pub short_term_cleared: usize,
}

/// Dry-run body returned (as a 400) when a namespace deletion lacks
/// `confirm=true`.
#[derive(Debug, Clone, Serialize)]
pub struct ConfirmationPrompt {
    pub error: String,
    pub hint: String,
    pub entries_to_delete: usize,
    pub scope: MemoryScope,
    pub namespace_id: String,
}

impl ConfirmationPrompt {
    pub fn for_namespace(scope: MemoryScope, namespace_id: &str, entries_to_delete: usize) -> Self {
        Self {
            error: "Confirmation required to delete a namespace".to_string(),
            hint: format!(
                "Add confirm=true to delete {} entries in {}:{}",
                entries_to_delete, scope, namespace_id
            ),
            entries_to_delete,
            scope,
            namespace_id: namespace_id.to_string(),
        }
    }
}

/// Response body for `PUT /api/memory` with `action=get_context`
#[derive(Debug, Clone, Serialize)]
pub struct ContextResponse {
    pub context: Vec<MemoryEntry>,
    pub count: usize,
    pub scope: MemoryScope,
    pub namespace_id: Option<String>,
}

/// Response body for `PUT /api/memory` with `action=summarize`
#[derive(Debug, Clone, Serialize)]
pub struct SummaryResponse {
    pub summary: String,
    pub item_count: usize,
    pub scope: MemoryScope,
    pub namespace_id: Option<String>,
}

/// Real-data cache section of `GET /stats`
#[derive(Debug, Clone, Serialize)]
pub struct CacheStatsResponse {
    #[serde(flatten)]
    pub stats: CacheStats,
    pub hit_rate: f64,
}

impl From<CacheStats> for CacheStatsResponse {
    fn from(stats: CacheStats) -> Self {
        Self {
            hit_rate: stats.hit_rate(),
            stats,
        }
    }
}

/// Memory store section of `GET /stats`
#[derive(Debug, Clone, Serialize)]
pub struct MemoryStatsResponse {
    pub total_entries: usize,
    pub short_term_namespaces: usize,
}

/// Response body for the stats endpoint (GET /stats)
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    pub real_cache: CacheStatsResponse,
    pub memory: MemoryStatsResponse,
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_write_response_flattens_outcome() {
        let resp = WriteMemoryResponse::new(WriteOutcome {
            full_key: "agent:myca_brain:pref1".to_string(),
            scope: MemoryScope::Agent,
            namespace_id: "myca_brain".to_string(),
            key: "pref1".to_string(),
            created_at: Utc::now(),
            short_term_count: 1,
            total_count: 1,
        });
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["full_key"], "agent:myca_brain:pref1");
        assert_eq!(json["scope"], "agent");
        assert_eq!(json["short_term_count"], 1);
    }

    #[test]
    fn test_delete_key_response_not_found() {
        let resp = DeleteKeyResponse::new("user:u1:missing".to_string(), false);
        assert!(!resp.success);
        assert!(resp.message.contains("not found"));
    }

    #[test]
    fn test_confirmation_prompt_serialize() {
        let prompt = ConfirmationPrompt::for_namespace(MemoryScope::Agent, "myca_brain", 3);
        let json = serde_json::to_value(&prompt).unwrap();
        assert_eq!(json["entries_to_delete"], 3);
        assert_eq!(json["namespace_id"], "myca_brain");
        assert!(json["hint"].as_str().unwrap().contains("confirm=true"));
    }

    #[test]
    fn test_cache_stats_response_hit_rate() {
        let mut stats = CacheStats::new();
        stats.record_hit();
        stats.record_hit();
        stats.record_hit();
        stats.record_miss();
        let resp = CacheStatsResponse::from(stats);
        assert!((resp.hit_rate - 0.75).abs() < 0.001);
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["hits"], 3);
    }

    #[test]
    fn test_health_response_serialize() {
        let resp = HealthResponse::healthy();
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("healthy"));
        assert!(json.contains("timestamp"));
    }
}
