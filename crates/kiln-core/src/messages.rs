//! Message types for the Kiln conversation model.
//!
//! Messages form the conversation history passed to the model client.
//! Three roles: user, assistant, and tool result. Tool calls carry their
//! raw input unparsed — validation happens in the runtime, not here.

use serde::{Deserialize, Serialize};
use serde_json::Value;

// ─────────────────────────────────────────────────────────────────────────────
// Tool call
// ─────────────────────────────────────────────────────────────────────────────

/// A tool call emitted by the model.
///
/// `input` is kept as a raw JSON value: transports may deliver it as a parsed
/// object, as an unparsed string, or omit it entirely. The runtime's validator
/// decides what is acceptable before execution.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolCall {
    /// Unique tool call ID.
    pub id: String,
    /// Tool name as named by the model.
    pub name: String,
    /// Raw tool input. `None` when the transport delivered no input at all.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input: Option<Value>,
    /// Transport-level validation error, set when the transport already
    /// rejected this call (e.g. schema mismatch during argument assembly).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invalid: Option<String>,
}

impl ToolCall {
    /// Create a valid tool call with a parsed input object.
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>, input: Value) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            input: Some(input),
            invalid: None,
        }
    }

    /// Whether the transport flagged this call invalid.
    #[must_use]
    pub fn is_invalid(&self) -> bool {
        self.invalid.is_some()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Finish reason
// ─────────────────────────────────────────────────────────────────────────────

/// Why a streaming round ended.
///
/// The loop only branches on [`FinishReason::ToolCalls`]; every other value
/// is a terminal stop for the run.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FinishReason {
    /// The model requested more tool calls.
    ToolCalls,
    /// Natural end of response.
    Stop,
    /// Hit the max output token limit.
    Length,
    /// Response blocked by a content filter.
    ContentFilter,
    /// Transport-reported error.
    Error,
    /// Any other transport-specific reason.
    Other,
}

impl FinishReason {
    /// Whether the model asked for another tool-execution round.
    #[must_use]
    pub fn is_tool_calls(&self) -> bool {
        matches!(self, Self::ToolCalls)
    }
}

impl std::fmt::Display for FinishReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ToolCalls => write!(f, "tool-calls"),
            Self::Stop => write!(f, "stop"),
            Self::Length => write!(f, "length"),
            Self::ContentFilter => write!(f, "content-filter"),
            Self::Error => write!(f, "error"),
            Self::Other => write!(f, "other"),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Messages
// ─────────────────────────────────────────────────────────────────────────────

/// A conversation message (discriminated by `role`).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "role")]
pub enum Message {
    /// User message.
    #[serde(rename = "user")]
    User {
        /// Message content.
        content: String,
    },
    /// Assistant message.
    #[serde(rename = "assistant")]
    Assistant {
        /// Text content.
        content: String,
        /// Reasoning content, when the model exposed it.
        #[serde(skip_serializing_if = "Option::is_none")]
        reasoning: Option<String>,
        /// Tool calls made in this message.
        #[serde(rename = "toolCalls", default, skip_serializing_if = "Vec::is_empty")]
        tool_calls: Vec<ToolCall>,
    },
    /// Tool result message.
    #[serde(rename = "tool")]
    ToolResult {
        /// ID of the tool call this result answers.
        #[serde(rename = "toolCallId")]
        tool_call_id: String,
        /// Tool name.
        #[serde(rename = "toolName")]
        tool_name: String,
        /// Formatted result content.
        content: String,
        /// Whether the tool execution failed.
        #[serde(rename = "isError", default, skip_serializing_if = "std::ops::Not::not")]
        is_error: bool,
    },
}

impl Message {
    /// Create a user message.
    #[must_use]
    pub fn user(text: impl Into<String>) -> Self {
        Self::User {
            content: text.into(),
        }
    }

    /// Create a plain assistant message.
    #[must_use]
    pub fn assistant(text: impl Into<String>) -> Self {
        Self::Assistant {
            content: text.into(),
            reasoning: None,
            tool_calls: Vec::new(),
        }
    }

    /// Create a tool result message.
    #[must_use]
    pub fn tool_result(
        tool_call_id: impl Into<String>,
        tool_name: impl Into<String>,
        content: impl Into<String>,
        is_error: bool,
    ) -> Self {
        Self::ToolResult {
            tool_call_id: tool_call_id.into(),
            tool_name: tool_name.into(),
            content: content.into(),
            is_error,
        }
    }

    /// Returns `true` if this is an assistant message.
    #[must_use]
    pub fn is_assistant(&self) -> bool {
        matches!(self, Self::Assistant { .. })
    }

    /// Returns `true` if this is a tool result message.
    #[must_use]
    pub fn is_tool_result(&self) -> bool {
        matches!(self, Self::ToolResult { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn tool_call_new_is_valid() {
        let tc = ToolCall::new("tc-1", "grep", json!({"pattern": "foo"}));
        assert!(!tc.is_invalid());
        assert_eq!(tc.name, "grep");
    }

    #[test]
    fn tool_call_serde_roundtrip() {
        let tc = ToolCall {
            id: "tc-1".into(),
            name: "read".into(),
            input: Some(json!({"path": "/tmp"})),
            invalid: None,
        };
        let json = serde_json::to_value(&tc).unwrap();
        assert!(json.get("invalid").is_none());
        let back: ToolCall = serde_json::from_value(json).unwrap();
        assert_eq!(tc, back);
    }

    #[test]
    fn tool_call_transport_invalid() {
        let tc = ToolCall {
            id: "tc-1".into(),
            name: "edit".into(),
            input: None,
            invalid: Some("schema mismatch".into()),
        };
        assert!(tc.is_invalid());
    }

    #[test]
    fn finish_reason_serde() {
        assert_eq!(
            serde_json::to_string(&FinishReason::ToolCalls).unwrap(),
            "\"tool-calls\""
        );
        assert_eq!(
            serde_json::to_string(&FinishReason::ContentFilter).unwrap(),
            "\"content-filter\""
        );
    }

    #[test]
    fn finish_reason_is_tool_calls() {
        assert!(FinishReason::ToolCalls.is_tool_calls());
        assert!(!FinishReason::Stop.is_tool_calls());
        assert!(!FinishReason::Length.is_tool_calls());
    }

    #[test]
    fn finish_reason_display() {
        assert_eq!(FinishReason::ToolCalls.to_string(), "tool-calls");
        assert_eq!(FinishReason::Stop.to_string(), "stop");
    }

    #[test]
    fn message_user_serde() {
        let msg = Message::user("hello");
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["role"], "user");
        assert_eq!(json["content"], "hello");
    }

    #[test]
    fn message_assistant_skips_empty_tool_calls() {
        let msg = Message::assistant("hi");
        assert!(msg.is_assistant());
        let json = serde_json::to_value(&msg).unwrap();
        assert!(json.get("toolCalls").is_none());
        assert!(json.get("reasoning").is_none());
    }

    #[test]
    fn message_assistant_with_tool_calls() {
        let msg = Message::Assistant {
            content: String::new(),
            reasoning: None,
            tool_calls: vec![ToolCall::new("tc-1", "bash", json!({"cmd": "ls"}))],
        };
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["toolCalls"][0]["name"], "bash");
    }

    #[test]
    fn message_tool_result_serde() {
        let msg = Message::tool_result("tc-1", "bash", "ok", false);
        assert!(msg.is_tool_result());
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["role"], "tool");
        assert_eq!(json["toolCallId"], "tc-1");
        // false error flag is omitted from the wire form
        assert!(json.get("isError").is_none());
    }

    #[test]
    fn message_tool_result_error_flag() {
        let msg = Message::tool_result("tc-1", "bash", "Tool error: boom", true);
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["isError"], true);
    }

    #[test]
    fn message_serde_roundtrip() {
        let msg = Message::tool_result("tc-9", "grep", "3 matches", false);
        let json = serde_json::to_string(&msg).unwrap();
        let back: Message = serde_json::from_str(&json).unwrap();
        assert_eq!(msg, back);
    }
}
