//! Short-Term Ring Module
//!
//! Bounded, newest-first record of the latest writes to one namespace.

use std::collections::VecDeque;

use crate::memory::{MemoryEntry, SHORT_TERM_CAPACITY};

// == Short Term Ring ==
/// Front = newest, back = oldest. Never longer than its capacity.
#[derive(Debug, Clone)]
pub struct ShortTermRing {
    items: VecDeque<MemoryEntry>,
    capacity: usize,
}

impl Default for ShortTermRing {
    fn default() -> Self {
        Self::with_capacity(SHORT_TERM_CAPACITY)
    }
}

impl ShortTermRing {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            items: VecDeque::with_capacity(capacity + 1),
            capacity,
        }
    }

    // == Push ==
    /// Prepends an entry, dropping the oldest once over capacity.
    pub fn push(&mut self, entry: MemoryEntry) {
        self.items.push_front(entry);
        self.items.truncate(self.capacity);
    }

    /// Entries newest first.
    pub fn iter(&self) -> impl Iterator<Item = &MemoryEntry> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
