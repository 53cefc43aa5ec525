//! Memory Entry Module
//!
//! A single stored memory and the full-key scheme that identifies it.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

use crate::memory::MemoryScope;

// == Memory Entry ==
/// One entry of the scoped memory store.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MemoryEntry {
    pub scope: MemoryScope,
    pub namespace_id: String,
    pub key: String,
    pub value: Value,
    /// Free-text classifier, e.g. `voice_session` or `preference`
    #[serde(rename = "type")]
    pub entry_type: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Advisory TTL marker, stored verbatim and never enforced
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,
    /// Write sequence, bumped on every write including overwrites
    #[serde(skip)]
    pub(crate) seq: u64,
}

impl MemoryEntry {
    /// The `scope:namespace_id:key` identity of this entry.
    pub fn full_key(&self) -> String {
        full_key(self.scope, &self.namespace_id, &self.key)
    }

    /// Newest-first ordering used by every listing and context read.
    ///
    /// Orders by last write, so a rewritten entry sorts the same way in
    /// listings as its copy at the front of the short-term ring.
    pub(crate) fn newest_first(a: &MemoryEntry, b: &MemoryEntry) -> std::cmp::Ordering {
        b.seq.cmp(&a.seq)
    }
}

// == Memory Key ==
/// Structured identity of an entry. Two entries are the same only when scope,
/// namespace and key all match, whatever characters the ids contain.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MemoryKey {
    pub scope: MemoryScope,
    pub namespace_id: String,
    pub key: String,
}

impl MemoryKey {
    pub fn new(scope: MemoryScope, namespace_id: &str, key: &str) -> Self {
        Self {
            scope,
            namespace_id: namespace_id.to_string(),
            key: key.to_string(),
        }
    }

    pub fn in_namespace(&self, scope: MemoryScope, namespace_id: &str) -> bool {
        self.scope == scope && self.namespace_id == namespace_id
    }
}

/// Short-term rings are kept per (scope, namespace_id).
pub(crate) type NamespaceKey = (MemoryScope, String);

// == Key Helpers ==
/// The display form `scope:namespace_id:key`.
pub fn full_key(scope: MemoryScope, namespace_id: &str, key: &str) -> String {
    format!("{}:{}:{}", scope, namespace_id, key)
}
