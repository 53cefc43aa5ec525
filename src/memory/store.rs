//! Memory Store Module
//!
//! Namespaced key-value store for conversational context. The primary map is
//! keyed by (scope, namespace_id, key); each namespace additionally keeps a
//! short-term ring of its latest writes.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::memory::entry::{full_key, MemoryKey, NamespaceKey};
use crate::memory::{MemoryEntry, MemoryScope, ShortTermRing, DEFAULT_ENTRY_TYPE};

// == New Memory ==
/// Input of [`MemoryStore::write`]. Missing ids are filled with
/// timestamp-derived defaults.
#[derive(Debug, Clone)]
pub struct NewMemory {
    pub scope: MemoryScope,
    pub namespace_id: Option<String>,
    pub key: Option<String>,
    pub value: Value,
    pub entry_type: Option<String>,
    pub expires_at: Option<String>,
    pub metadata: Option<Value>,
}

impl NewMemory {
    pub fn new(scope: MemoryScope, value: Value) -> Self {
        Self {
            scope,
            namespace_id: None,
            key: None,
            value,
            entry_type: None,
            expires_at: None,
            metadata: None,
        }
    }

    pub fn namespace(mut self, namespace_id: impl Into<String>) -> Self {
        self.namespace_id = Some(namespace_id.into());
        self
    }

    pub fn key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    pub fn entry_type(mut self, entry_type: impl Into<String>) -> Self {
        self.entry_type = Some(entry_type.into());
        self
    }
}

// == Write Outcome ==
/// Result of a write, echoed back to the caller.
#[derive(Debug, Clone, Serialize)]
pub struct WriteOutcome {
    pub full_key: String,
    pub scope: MemoryScope,
    pub namespace_id: String,
    pub key: String,
    pub created_at: DateTime<Utc>,
    pub short_term_count: usize,
    pub total_count: usize,
}

// == Listing ==
/// A sorted, possibly truncated set of entries and the untruncated match count.
#[derive(Debug, Clone, Serialize)]
pub struct MemoryListing {
    pub items: Vec<MemoryEntry>,
    pub total: usize,
}

// == Clear Outcome ==
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClearOutcome {
    pub entries_deleted: usize,
    pub short_term_cleared: usize,
}

// == Memory Store ==
#[derive(Debug, Default)]
pub struct MemoryStore {
    /// Primary storage
    entries: HashMap<MemoryKey, MemoryEntry>,
    /// Short-term rings per namespace
    short_term: HashMap<NamespaceKey, ShortTermRing>,
    /// Last write sequence number handed out
    next_seq: u64,
}

impl MemoryStore {
    // == Constructor ==
    pub fn new() -> Self {
        Self::default()
    }

    // == Write ==
    /// Upserts an entry and records a copy in its namespace's short-term ring.
    ///
    /// Overwriting an existing entry keeps its original `created_at` but moves
    /// it to the front of every newest-first view.
    pub fn write(&mut self, new: NewMemory) -> WriteOutcome {
        let now = Utc::now();
        let millis = now.timestamp_millis();
        let namespace_id = new
            .namespace_id
            .unwrap_or_else(|| format!("legacy_{}", millis));
        let key = new.key.unwrap_or_else(|| format!("entry_{}", millis));
        let memory_key = MemoryKey::new(new.scope, &namespace_id, &key);
        let full_key = full_key(new.scope, &namespace_id, &key);

        let created_at = self
            .entries
            .get(&memory_key)
            .map_or(now, |existing| existing.created_at);
        self.next_seq += 1;
        let seq = self.next_seq;

        let entry = MemoryEntry {
            scope: new.scope,
            namespace_id: namespace_id.clone(),
            key: key.clone(),
            value: new.value,
            entry_type: new
                .entry_type
                .unwrap_or_else(|| DEFAULT_ENTRY_TYPE.to_string()),
            created_at,
            updated_at: now,
            expires_at: new.expires_at,
            metadata: new.metadata,
            seq,
        };

        let ring = self
            .short_term
            .entry((new.scope, namespace_id.clone()))
            .or_default();
        ring.push(entry.clone());
        let short_term_count = ring.len();

        self.entries.insert(memory_key, entry);
        debug!(full_key = %full_key, "Stored memory entry");

        WriteOutcome {
            full_key,
            scope: new.scope,
            namespace_id,
            key,
            created_at,
            short_term_count,
            total_count: self.entries.len(),
        }
    }

    // == Exact Lookup ==
    pub fn get(&self, scope: MemoryScope, namespace_id: &str, key: &str) -> Option<&MemoryEntry> {
        self.entries.get(&MemoryKey::new(scope, namespace_id, key))
    }

    // == Legacy Key Search ==
    /// Every entry whose `key` matches, across all scopes and namespaces.
    pub fn find_by_key(&self, key: &str) -> MemoryListing {
        let items = sorted(self.entries.values().filter(|e| e.key == key));
        MemoryListing {
            total: items.len(),
            items,
        }
    }

    // == Namespace Listing ==
    pub fn list_namespace(
        &self,
        scope: MemoryScope,
        namespace_id: &str,
        entry_type: Option<&str>,
        limit: usize,
    ) -> MemoryListing {
        let matches = self
            .entries
            .iter()
            .filter(|(memory_key, _)| memory_key.in_namespace(scope, namespace_id))
            .map(|(_, entry)| entry)
            .filter(|e| type_matches(e, entry_type));
        truncated(sorted(matches), limit)
    }

    // == Global Listing ==
    /// Whole-store listing, optionally narrowed to one scope and/or type.
    pub fn list_all(
        &self,
        scope: Option<MemoryScope>,
        entry_type: Option<&str>,
        limit: usize,
    ) -> MemoryListing {
        let matches = self
            .entries
            .values()
            .filter(|e| scope.map_or(true, |s| e.scope == s))
            .filter(|e| type_matches(e, entry_type));
        truncated(sorted(matches), limit)
    }

    // == Delete ==
    /// Removes one entry. Returns false if it was already absent.
    pub fn delete(&mut self, scope: MemoryScope, namespace_id: &str, key: &str) -> bool {
        let removed = self
            .entries
            .remove(&MemoryKey::new(scope, namespace_id, key))
            .is_some();
        debug!(%scope, namespace_id, key, removed, "Deleted memory entry");
        removed
    }

    // == Namespace Count ==
    /// Number of entries a namespace deletion would remove.
    pub fn count_namespace(&self, scope: MemoryScope, namespace_id: &str) -> usize {
        self.entries
            .keys()
            .filter(|k| k.in_namespace(scope, namespace_id))
            .count()
    }

    // == Namespace Delete ==
    /// Removes every entry of a namespace and clears its short-term ring.
    pub fn delete_namespace(&mut self, scope: MemoryScope, namespace_id: &str) -> usize {
        let before = self.entries.len();
        self.entries
            .retain(|memory_key, _| !memory_key.in_namespace(scope, namespace_id));
        self.short_term.remove(&(scope, namespace_id.to_string()));

        let deleted = before - self.entries.len();
        debug!(%scope, namespace_id, deleted, "Deleted memory namespace");
        deleted
    }

    // == Clear All ==
    /// Wipes the primary store and every short-term ring.
    pub fn clear_all(&mut self) -> ClearOutcome {
        let outcome = ClearOutcome {
            entries_deleted: self.entries.len(),
            short_term_cleared: self.short_term.len(),
        };
        self.entries.clear();
        self.short_term.clear();
        outcome
    }

    // == Context ==
    /// Recent entries for one namespace, or for every namespace of a scope.
    pub fn context(
        &self,
        scope: MemoryScope,
        namespace_id: Option<&str>,
        limit: usize,
    ) -> Vec<MemoryEntry> {
        match namespace_id {
            Some(namespace_id) => self
                .short_term
                .get(&(scope, namespace_id.to_string()))
                .map(|ring| ring.iter().take(limit).cloned().collect())
                .unwrap_or_default(),
            None => {
                let candidates = self
                    .short_term
                    .iter()
                    .filter(|((ring_scope, _), _)| *ring_scope == scope)
                    .flat_map(|(_, ring)| ring.iter());
                let mut items = sorted(candidates);
                items.truncate(limit);
                items
            }
        }
    }

    // == Counts ==
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Ring length for one namespace (0 if it has none).
    pub fn short_term_len(&self, scope: MemoryScope, namespace_id: &str) -> usize {
        self.short_term
            .get(&(scope, namespace_id.to_string()))
            .map_or(0, ShortTermRing::len)
    }

    /// Number of namespaces currently holding a short-term ring.
    pub fn short_term_namespaces(&self) -> usize {
        self.short_term.len()
    }
}

fn type_matches(entry: &MemoryEntry, entry_type: Option<&str>) -> bool {
    entry_type.map_or(true, |t| entry.entry_type == t)
}

fn sorted<'a>(entries: impl Iterator<Item = &'a MemoryEntry>) -> Vec<MemoryEntry> {
    let mut items: Vec<MemoryEntry> = entries.cloned().collect();
    items.sort_by(MemoryEntry::newest_first);
    items
}

fn truncated(mut items: Vec<MemoryEntry>, limit: usize) -> MemoryListing {
    let total = items.len();
    items.truncate(limit);
    MemoryListing { items, total }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn agent_pref(key: &str, value: Value) -> NewMemory {
        NewMemory::new(MemoryScope::Agent, value)
            .namespace("myca_brain")
            .key(key)
            .entry_type("preference")
    }

    #[test]
    fn test_write_and_get_exact() {
        let mut store = MemoryStore::new();

        let outcome = store.write(agent_pref("pref1", json!({"volume": 5})));
        assert_eq!(outcome.full_key, "agent:myca_brain:pref1");
        assert_eq!(outcome.short_term_count, 1);
        assert_eq!(outcome.total_count, 1);

        let entry = store.get(MemoryScope::Agent, "myca_brain", "pref1").unwrap();
        assert_eq!(entry.value, json!({"volume": 5}));
        assert_eq!(entry.entry_type, "preference");
    }

    #[test]
    fn test_write_defaults() {
        let mut store = MemoryStore::new();

        let outcome = store.write(NewMemory::new(MemoryScope::Conversation, json!("hi")));
        assert!(outcome.namespace_id.starts_with("legacy_"));
        assert!(outcome.key.starts_with("entry_"));

        let entry = store
            .get(MemoryScope::Conversation, &outcome.namespace_id, &outcome.key)
            .unwrap();
        assert_eq!(entry.entry_type, DEFAULT_ENTRY_TYPE);
    }

    #[test]
    fn test_overwrite_keeps_single_entry_and_created_at() {
        let mut store = MemoryStore::new();

        let first = store.write(agent_pref("pref1", json!(1)));
        let second = store.write(agent_pref("pref1", json!(2)));

        assert_eq!(store.len(), 1);
        assert_eq!(first.created_at, second.created_at);
        let entry = store.get(MemoryScope::Agent, "myca_brain", "pref1").unwrap();
        assert_eq!(entry.value, json!(2));
        assert!(entry.updated_at >= entry.created_at);
        // Both writes are recorded in the ring
        assert_eq!(store.short_term_len(MemoryScope::Agent, "myca_brain"), 2);
    }

    #[test]
    fn test_find_by_key_spans_scopes() {
        let mut store = MemoryStore::new();
        store.write(NewMemory::new(MemoryScope::Agent, json!(1)).namespace("a").key("shared"));
        store.write(NewMemory::new(MemoryScope::User, json!(2)).namespace("u").key("shared"));
        store.write(NewMemory::new(MemoryScope::User, json!(3)).namespace("u").key("other"));

        let listing = store.find_by_key("shared");
        assert_eq!(listing.total, 2);
        assert!(listing.items.iter().all(|e| e.key == "shared"));
    }

    #[test]
    fn test_list_namespace_filters_sorts_and_limits() {
        let mut store = MemoryStore::new();
        for n in 0..5 {
            store.write(agent_pref(&format!("p{}", n), json!(n)));
        }
        store.write(
            NewMemory::new(MemoryScope::Agent, json!("x"))
                .namespace("myca_brain")
                .key("session")
                .entry_type("voice_session"),
        );
        store.write(agent_pref("elsewhere", json!(0)).namespace("other_agent"));

        let listing = store.list_namespace(MemoryScope::Agent, "myca_brain", None, 10);
        assert_eq!(listing.total, 6);

        let prefs = store.list_namespace(MemoryScope::Agent, "myca_brain", Some("preference"), 3);
        assert_eq!(prefs.total, 5);
        let keys: Vec<_> = prefs.items.iter().map(|e| e.key.as_str()).collect();
        assert_eq!(keys, vec!["p4", "p3", "p2"]);
    }

    #[test]
    fn test_namespace_prefix_does_not_match_longer_ids() {
        let mut store = MemoryStore::new();
        store.write(NewMemory::new(MemoryScope::User, json!(1)).namespace("u1").key("a"));
        store.write(NewMemory::new(MemoryScope::User, json!(2)).namespace("u10").key("a"));

        assert_eq!(store.count_namespace(MemoryScope::User, "u1"), 1);
        assert_eq!(store.list_namespace(MemoryScope::User, "u1", None, 10).total, 1);
    }

    #[test]
    fn test_colon_ids_stay_distinct() {
        let mut store = MemoryStore::new();
        store.write(NewMemory::new(MemoryScope::Agent, json!("ns_a")).namespace("a").key("b:c"));
        store.write(NewMemory::new(MemoryScope::Agent, json!("ns_ab")).namespace("a:b").key("c"));
        store.write(NewMemory::new(MemoryScope::Agent, json!("ns_az")).namespace("a:z").key("k"));

        assert_eq!(store.len(), 3);
        let entry = store.get(MemoryScope::Agent, "a", "b:c").unwrap();
        assert_eq!(entry.namespace_id, "a");
        assert_eq!(entry.value, json!("ns_a"));

        assert_eq!(store.count_namespace(MemoryScope::Agent, "a"), 1);
        assert_eq!(store.list_namespace(MemoryScope::Agent, "a", None, 10).total, 1);
        assert_eq!(store.delete_namespace(MemoryScope::Agent, "a"), 1);

        assert_eq!(store.len(), 2);
        assert!(store.get(MemoryScope::Agent, "a:b", "c").is_some());
        assert!(store.get(MemoryScope::Agent, "a:z", "k").is_some());
        assert_eq!(store.short_term_len(MemoryScope::Agent, "a:b"), 1);
    }

    #[test]
    fn test_rewrite_is_newest_in_every_view() {
        let mut store = MemoryStore::new();
        let write = |store: &mut MemoryStore, key: &str, value: i32| {
            store.write(
                NewMemory::new(MemoryScope::Conversation, json!(value))
                    .namespace("c1")
                    .key(key),
            )
        };
        write(&mut store, "a", 1);
        write(&mut store, "b", 2);
        write(&mut store, "a", 3);

        let values = |entries: Vec<MemoryEntry>| -> Vec<Value> {
            entries.into_iter().map(|e| e.value).collect()
        };

        let ring = values(store.context(MemoryScope::Conversation, Some("c1"), 10));
        let scoped = values(store.context(MemoryScope::Conversation, None, 10));
        let listing = values(
            store
                .list_namespace(MemoryScope::Conversation, "c1", None, 10)
                .items,
        );

        assert_eq!(ring, vec![json!(3), json!(2), json!(1)]);
        assert_eq!(scoped, ring);
        assert_eq!(listing, vec![json!(3), json!(2)]);
        assert_eq!(values(store.list_all(None, None, 10).items), listing);
    }

    #[test]
    fn test_list_all_with_scope_and_type() {
        let mut store = MemoryStore::new();
        store.write(agent_pref("p", json!(1)));
        store.write(NewMemory::new(MemoryScope::System, json!(2)).namespace("global").key("cfg"));

        assert_eq!(store.list_all(None, None, 10).total, 2);
        assert_eq!(store.list_all(Some(MemoryScope::System), None, 10).total, 1);
        assert_eq!(store.list_all(None, Some("preference"), 10).total, 1);
        assert_eq!(store.list_all(None, None, 1).items.len(), 1);
    }

    #[test]
    fn test_delete_is_idempotent() {
        let mut store = MemoryStore::new();
        store.write(agent_pref("pref1", json!(1)));

        assert!(store.delete(MemoryScope::Agent, "myca_brain", "pref1"));
        assert!(!store.delete(MemoryScope::Agent, "myca_brain", "pref1"));
        assert!(store.is_empty());
    }

    #[test]
    fn test_delete_namespace_clears_ring_only_for_that_namespace() {
        let mut store = MemoryStore::new();
        store.write(agent_pref("a", json!(1)));
        store.write(agent_pref("b", json!(2)));
        store.write(agent_pref("c", json!(3)).namespace("other"));

        assert_eq!(store.count_namespace(MemoryScope::Agent, "myca_brain"), 2);
        assert_eq!(store.delete_namespace(MemoryScope::Agent, "myca_brain"), 2);

        assert_eq!(store.len(), 1);
        assert_eq!(store.short_term_len(MemoryScope::Agent, "myca_brain"), 0);
        assert_eq!(store.short_term_len(MemoryScope::Agent, "other"), 1);
    }

    #[test]
    fn test_clear_all() {
        let mut store = MemoryStore::new();
        store.write(agent_pref("a", json!(1)));
        store.write(NewMemory::new(MemoryScope::User, json!(2)).namespace("u").key("b"));

        let outcome = store.clear_all();
        assert_eq!(outcome.entries_deleted, 2);
        assert_eq!(outcome.short_term_cleared, 2);
        assert!(store.is_empty());
        assert_eq!(store.short_term_namespaces(), 0);
    }

    #[test]
    fn test_context_for_namespace_and_scope() {
        let mut store = MemoryStore::new();
        store.write(NewMemory::new(MemoryScope::Conversation, json!(1)).namespace("c1").key("a"));
        store.write(NewMemory::new(MemoryScope::Conversation, json!(2)).namespace("c2").key("b"));
        store.write(NewMemory::new(MemoryScope::Conversation, json!(3)).namespace("c1").key("c"));
        store.write(NewMemory::new(MemoryScope::User, json!(4)).namespace("c1").key("d"));

        let ns: Vec<_> = store
            .context(MemoryScope::Conversation, Some("c1"), 10)
            .into_iter()
            .map(|e| e.key)
            .collect();
        assert_eq!(ns, vec!["c", "a"]);

        let scoped: Vec<_> = store
            .context(MemoryScope::Conversation, None, 10)
            .into_iter()
            .map(|e| e.key)
            .collect();
        assert_eq!(scoped, vec!["c", "b", "a"]);

        assert_eq!(store.context(MemoryScope::Conversation, None, 2).len(), 2);
        assert!(store.context(MemoryScope::System, Some("none"), 10).is_empty());
    }
}
