//! Result formatting.
//!
//! Tool output becomes a conversation-history string via a fixed set of
//! rules. The absent/`null` distinction is deliberate: `None` (no output)
//! formats as an empty string, while an explicit JSON `null` formats as the
//! literal `"null"`.

use serde_json::Value;

/// Stringify a tool's output for the tool-result message.
///
/// Strings pass through unchanged; numbers and booleans use their display
/// form; anything else is JSON-serialized, falling back to the value's
/// `Display` form if serialization fails.
#[must_use]
pub fn format_result(output: Option<&Value>) -> String {
    match output {
        None => String::new(),
        Some(Value::Null) => "null".to_owned(),
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        Some(value) => serde_json::to_string(value).unwrap_or_else(|_| value.to_string()),
    }
}
