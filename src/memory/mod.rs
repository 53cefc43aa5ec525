//! Scoped Memory Module
//!
//! Namespaced key-value store with per-namespace short-term rings, backing
//! the `/api/memory` endpoints.

mod entry;
mod ring;
mod scope;
mod store;
mod summary;


// Re-export public types
pub use entry::{full_key, MemoryEntry, MemoryKey};
pub use ring::ShortTermRing;
pub use scope::MemoryScope;
pub use store::{ClearOutcome, MemoryListing, MemoryStore, NewMemory, WriteOutcome};
pub use summary::summarize;

// == Public Constants ==
/// Maximum entries kept per short-term ring
pub const SHORT_TERM_CAPACITY: usize = 10;

/// Default page size for listings and context reads
pub const DEFAULT_LIMIT: usize = 10;

/// Entry type used when a write does not name one
pub const DEFAULT_ENTRY_TYPE: &str = "general";

/// Confirmation token required to wipe the whole store
pub const CLEAR_ALL_CONFIRMATION: &str = "DELETE_ALL_MEMORY";
