//! Request DTOs for the gateway API
//!
//! Defines the query strings and bodies accepted by `/api/memory`. Empty
//! strings are treated as absent, matching how the dashboard builds its
//! query strings.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::error::{GatewayError, Result};
use crate::memory::{MemoryScope, NewMemory};

/// Deserializes `Some("")` as `None`.
fn empty_as_none<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.is_empty()))
}

/// Rejects ids containing the `:` full-key separator.
fn check_id(field: &str, value: Option<&str>) -> Result<()> {
    match value {
        Some(id) if id.contains(':') => Err(GatewayError::invalid_with_hint(
            format!("Invalid {}: {}", field, id),
            format!("{} must not contain ':'", field),
        )),
        _ => Ok(()),
    }
}

/// Parses an optional scope, rejecting values outside the fixed set.
fn parse_scope(scope: Option<&str>) -> Result<Option<MemoryScope>> {
    scope.map(str::parse).transpose()
}

/// Query string for `GET /api/memory`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MemoryQuery {
    #[serde(default, deserialize_with = "empty_as_none")]
    pub scope: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub namespace_id: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub key: Option<String>,
    #[serde(default, rename = "type", deserialize_with = "empty_as_none")]
    pub entry_type: Option<String>,
    #[serde(default)]
    pub limit: Option<usize>,
}

impl MemoryQuery {
    pub fn parsed_scope(&self) -> Result<Option<MemoryScope>> {
        parse_scope(self.scope.as_deref())
    }
}

/// Body of `POST /api/memory`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WriteMemoryRequest {
    #[serde(default, deserialize_with = "empty_as_none")]
    pub key: Option<String>,
    #[serde(default)]
    pub value: Option<Value>,
    #[serde(default, rename = "type", deserialize_with = "empty_as_none")]
    pub entry_type: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub scope: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub namespace_id: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub expires_at: Option<String>,
    #[serde(default)]
    pub metadata: Option<Value>,
}

impl WriteMemoryRequest {
    /// Scope used when a legacy caller omits it
    pub const DEFAULT_SCOPE: MemoryScope = MemoryScope::Conversation;

    /// Validates the request and converts it into a store write.
    pub fn into_new_memory(self) -> Result<NewMemory> {
        let scope = parse_scope(self.scope.as_deref())?.unwrap_or(Self::DEFAULT_SCOPE);
        check_id("namespace_id", self.namespace_id.as_deref())?;
        check_id("key", self.key.as_deref())?;

        let value = match self.value {
            Some(Value::Null) | None => {
                return Err(GatewayError::invalid_with_hint(
                    "value is required",
                    "Send a JSON body with a non-null \"value\" field",
                ))
            }
            Some(value) => value,
        };

        Ok(NewMemory {
            scope,
            namespace_id: self.namespace_id,
            key: self.key,
            value,
            entry_type: self.entry_type,
            expires_at: self.expires_at,
            metadata: self.metadata,
        })
    }
}

/// Query string for `DELETE /api/memory`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DeleteMemoryQuery {
    #[serde(default, deserialize_with = "empty_as_none")]
    pub scope: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub namespace_id: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub key: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub confirm: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub clear_all: Option<String>,
}

impl DeleteMemoryQuery {
    pub fn wants_clear_all(&self) -> bool {
        self.clear_all.as_deref() == Some("true")
    }

    pub fn confirmed(&self) -> bool {
        self.confirm.as_deref() == Some("true")
    }

    /// Scope and namespace every non-admin deletion must name.
    pub fn target(&self) -> Result<(MemoryScope, &str)> {
        let scope = parse_scope(self.scope.as_deref())?.ok_or_else(|| {
            GatewayError::invalid_with_hint(
                "scope is required for deletion",
                format!(
                    "Pass scope (one of: {}) and namespace_id, or clear_all=true&confirm=DELETE_ALL_MEMORY",
                    MemoryScope::valid_names()
                ),
            )
        })?;
        let namespace_id = self.namespace_id.as_deref().ok_or_else(|| {
            GatewayError::invalid_with_hint(
                "namespace_id is required for deletion",
                "Deletion is limited to a single scope and namespace",
            )
        })?;
        Ok((scope, namespace_id))
    }
}

/// Derived-read actions of `PUT /api/memory`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemoryAction {
    GetContext,
    Summarize,
}

/// Body of `PUT /api/memory`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MemoryActionRequest {
    #[serde(default, deserialize_with = "empty_as_none")]
    pub action: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub scope: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub namespace_id: Option<String>,
    #[serde(default)]
    pub limit: Option<usize>,
}

impl MemoryActionRequest {
    pub fn action(&self) -> Result<MemoryAction> {
        match self.action.as_deref() {
            Some("get_context") => Ok(MemoryAction::GetContext),
            Some("summarize") => Ok(MemoryAction::Summarize),
            other => Err(GatewayError::invalid_with_hint(
                format!("Invalid action: {}", other.unwrap_or("<missing>")),
                "action must be one of: get_context, summarize",
            )),
        }
    }

    pub fn scope(&self) -> Result<MemoryScope> {
        parse_scope(self.scope.as_deref())?.ok_or_else(|| {
            GatewayError::invalid_with_hint(
                "scope is required",
                format!("scope must be one of: {}", MemoryScope::valid_names()),
            )
        })
    }
}
