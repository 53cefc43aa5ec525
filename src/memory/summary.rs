//! Naive Summaries
//!
//! Text digest of recent memory entries. Stands in for a model-backed
//! summarizer: values are stringified and truncated, with a dedicated template
//! for conversational turns that carry `input` and `output`.

use serde_json::Value;

use crate::memory::MemoryEntry;

/// Characters kept from each stringified value
pub const SNIPPET_CHARS: usize = 100;

/// Summarizes entries in the order given (callers pass newest first).
pub fn summarize(entries: &[MemoryEntry]) -> String {
    if entries.is_empty() {
        return "No memories to summarize.".to_string();
    }

    let lines: Vec<String> = entries
        .iter()
        .map(|entry| format!("- {}", describe(entry)))
        .collect();

    format!(
        "Summary of {} memory item(s):\n{}",
        entries.len(),
        lines.join("\n")
    )
}

fn describe(entry: &MemoryEntry) -> String {
    match (entry.value.get("input"), entry.value.get("output")) {
        (Some(input), Some(output)) => format!(
            "User: {} -> Response: {}",
            snippet(input),
            snippet(output)
        ),
        _ => format!("[{}] {}", entry.entry_type, snippet(&entry.value)),
    }
}

/// Strings render bare, everything else as compact JSON; both truncated on a
/// char boundary.
fn snippet(value: &Value) -> String {
    let text = match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };

    if text.chars().count() <= SNIPPET_CHARS {
        text
    } else {
        let mut cut: String = text.chars().take(SNIPPET_CHARS).collect();
        cut.push_str("...");
        cut
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryScope;
    use chrono::Utc;
    use serde_json::json;

    fn entry(value: Value, entry_type: &str) -> MemoryEntry {
        let now = Utc::now();
        MemoryEntry {
            scope: MemoryScope::Conversation,
            namespace_id: "c1".to_string(),
            key: "k".to_string(),
            value,
            entry_type: entry_type.to_string(),
            created_at: now,
            updated_at: now,
            expires_at: None,
            metadata: None,
            seq: 0,
        }
    }

    #[test]
    fn test_empty() {
        assert_eq!(summarize(&[]), "No memories to summarize.");
    }

    #[test]
    fn test_conversation_turn_template() {
        let summary = summarize(&[entry(
            json!({"input": "what's the spore count?", "output": "Low today."}),
            "voice_session",
        )]);

        assert!(summary.starts_with("Summary of 1 memory item(s):"));
        assert!(summary.contains("User: what's the spore count? -> Response: Low today."));
    }

    #[test]
    fn test_generic_value_uses_type_and_json() {
        let summary = summarize(&[entry(json!({"volume": 5}), "preference")]);
        assert!(summary.contains(r#"[preference] {"volume":5}"#));
    }

    #[test]
    fn test_long_values_truncated() {
        let long = "é".repeat(SNIPPET_CHARS + 20);
        let summary = summarize(&[entry(json!(long), "note")]);

        let expected = format!("[note] {}...", "é".repeat(SNIPPET_CHARS));
        assert!(summary.ends_with(&expected));
    }

    #[test]
    fn test_only_input_is_not_a_turn() {
        let summary = summarize(&[entry(json!({"input": "hi"}), "general")]);
        assert!(summary.contains(r#"[general] {"input":"hi"}"#));
    }
}
