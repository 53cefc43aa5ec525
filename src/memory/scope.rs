//! Memory Scope Module
//!
//! The fixed set of top-level partitions of the memory store.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::GatewayError;

// == Memory Scope ==
/// Top-level partition of the memory store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MemoryScope {
    Conversation,
    Agent,
    System,
    User,
}

impl MemoryScope {
    /// Every valid scope, in declaration order.
    pub const ALL: [MemoryScope; 4] = [
        MemoryScope::Conversation,
        MemoryScope::Agent,
        MemoryScope::System,
        MemoryScope::User,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MemoryScope::Conversation => "conversation",
            MemoryScope::Agent => "agent",
            MemoryScope::System => "system",
            MemoryScope::User => "user",
        }
    }

    /// Comma-separated list of valid scope names, for error hints.
    pub fn valid_names() -> String {
        Self::ALL
            .iter()
            .map(|s| s.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for MemoryScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MemoryScope {
    type Err = GatewayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|scope| scope.as_str() == s)
            .ok_or_else(|| {
                GatewayError::invalid_with_hint(
                    format!("Invalid scope: {}", s),
                    format!("scope must be one of: {}", Self::valid_names()),
                )
            })
    }
}
