//! Parser for the decision model's textual action grammar.
//!
//! Two line forms are recognized:
//!
//! ```text
//! FUNCTION_CALL: tool_name|key=value|nested.key=value
//! FINAL_ANSWER: the user-facing answer
//! ```
//!
//! Values are parsed as JSON literals (number, boolean, string, list,
//! mapping) when syntactically valid, else kept as trimmed strings. Dotted
//! keys denote nested mappings; repeated dotted prefixes merge. Model
//! output is never evaluated, only parsed.

use serde_json::{Map, Value};

use crate::error::{RecallError, RecallResult};
use crate::types::ToolCallDirective;

/// Prefix signaling a tool-call directive.
pub const FUNCTION_CALL_MARKER: &str = "FUNCTION_CALL:";
/// Prefix signaling loop termination with a user-facing answer.
pub const FINAL_ANSWER_MARKER: &str = "FINAL_ANSWER:";

/// Parse one `FUNCTION_CALL:` line into a directive.
pub fn parse_directive(text: &str) -> RecallResult<ToolCallDirective> {
    let rest = text
        .trim()
        .strip_prefix(FUNCTION_CALL_MARKER)
        .ok_or_else(|| RecallError::Parse {
            message: format!("expected line starting with '{FUNCTION_CALL_MARKER}'"),
        })?;

    let mut parts = rest.split('|').map(str::trim);
    let tool_name = parts.next().unwrap_or_default();
    if tool_name.is_empty() {
        return Err(RecallError::Parse {
            message: "missing tool name after marker".into(),
        });
    }

    let mut arguments = Map::new();
    for part in parts {
        // Segments without '=' carry no argument; ignore them
        let Some((key, value)) = part.split_once('=') else {
            continue;
        };
        insert_nested(&mut arguments, key.trim(), parse_literal(value));
    }

    Ok(ToolCallDirective {
        tool_name: tool_name.to_string(),
        arguments: Value::Object(arguments),
    })
}

/// Parse a value as a JSON literal when valid, else keep the trimmed string.
fn parse_literal(raw: &str) -> Value {
    let trimmed = raw.trim();
    serde_json::from_str(trimmed).unwrap_or_else(|_| Value::String(trimmed.to_string()))
}

/// Insert `value` at the dotted `key` path, creating nested objects along
/// the way. A non-object intermediate is replaced by an object.
fn insert_nested(map: &mut Map<String, Value>, key: &str, value: Value) {
    let mut segments = key.split('.').peekable();
    let mut current = map;

    while let Some(segment) = segments.next() {
        if segments.peek().is_none() {
            current.insert(segment.to_string(), value);
            return;
        }

        let entry = current
            .entry(segment.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        if !entry.is_object() {
            *entry = Value::Object(Map::new());
        }
        let Value::Object(inner) = entry else { return };
        current = inner;
    }
}
