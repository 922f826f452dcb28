//! Pre-execution validation of pending tool calls.
//!
//! Two tiers: transport-flagged invalid calls are surfaced as-is, then
//! string-typed inputs are parsed as JSON (a successful parse replaces the
//! input in place). Schema conformance is left to the tools themselves.

use serde_json::Value;
use tracing::warn;

use crate::types::{PendingToolCall, ValidationError};

/// Maximum number of characters of an offending input quoted in an error.
const QUOTE_LIMIT: usize = 50;

/// Validate every pending call, repairing string inputs in place.
///
/// Every call is inspected; a failure never short-circuits the rest. The
/// returned errors are paired with the index of the failing call.
pub fn validate_pending(pending: &mut [PendingToolCall]) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    for (index, p) in pending.iter_mut().enumerate() {
        if let Some(reason) = p.call.invalid.as_deref() {
            warn!(
                tool_name = p.tool_name,
                tool_call_id = p.call.id,
                "tool call flagged invalid by transport"
            );
            errors.push(ValidationError {
                index,
                message: reason.to_owned(),
            });
            continue;
        }

        match p.call.input.as_ref() {
            None | Some(Value::Null) => {
                errors.push(null_input_error(index, &p.tool_name));
            }
            Some(Value::String(raw)) => match serde_json::from_str::<Value>(raw) {
                // a string carrying "null" is still not an object
                Ok(Value::Null) => {
                    errors.push(null_input_error(index, &p.tool_name));
                }
                Ok(parsed) => {
                    p.call.input = Some(parsed);
                }
                Err(_) => {
                    errors.push(ValidationError {
                        index,
                        message: format!(
                            "Invalid input for tool {}: malformed JSON: {}",
                            p.tool_name,
                            quote_input(raw)
                        ),
                    });
                }
            },
            Some(_) => {}
        }
    }

    errors
}

fn null_input_error(index: usize, tool_name: &str) -> ValidationError {
    ValidationError {
        index,
        message: format!(
            "Invalid input for tool {tool_name}: a JSON object was expected but got null"
        ),
    }
}

/// Quote up to [`QUOTE_LIMIT`] characters of the offending input.
fn quote_input(raw: &str) -> String {
    if raw.chars().count() <= QUOTE_LIMIT {
        format!("\"{raw}\"")
    } else {
        let prefix: String = raw.chars().take(QUOTE_LIMIT).collect();
        format!("\"{prefix}...\"")
    }
}
