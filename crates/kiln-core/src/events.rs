//! Event types for agent operation.
//!
//! Two event families:
//!
//! - **[`StreamChunk`]**: Low-level streaming chunks from a model client
//!   (reasoning deltas, text deltas, tool calls, done).
//! - **[`AgentEvent`]**: Canonical events the orchestrator emits to its
//!   caller (agent/step boundaries, thinking/message content, tool-call
//!   lifecycles, errors).
//!
//! `StreamChunk` is purely in-memory and never persisted. `AgentEvent` is
//! broadcast to subscribers (UI, telemetry) while a run is in progress.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::messages::{FinishReason, Message, ToolCall};
use crate::usage::ModelUsage;

// ─────────────────────────────────────────────────────────────────────────────
// StreamChunk — model client streaming chunks
// ─────────────────────────────────────────────────────────────────────────────

/// Chunks yielded by a model client while streaming a response.
///
/// The orchestrator only surfaces the reasoning, text, and tool-call chunks;
/// everything else is silently ignored so that new transport chunk types do
/// not break the loop.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum StreamChunk {
    /// Stream opened.
    StreamStart,

    /// Reasoning block started.
    ReasoningStart,

    /// Incremental reasoning content.
    ReasoningDelta {
        /// Reasoning text fragment.
        delta: String,
    },

    /// Reasoning block completed.
    ReasoningEnd,

    /// Text block started.
    TextStart,

    /// Incremental text content.
    TextDelta {
        /// Text fragment.
        delta: String,
    },

    /// Text block completed.
    TextEnd,

    /// A fully assembled tool call.
    ToolCall {
        /// The call, possibly carrying a transport-side `invalid` error.
        call: ToolCall,
    },

    /// Stream completed: final response messages, usage, and finish reason.
    Done {
        /// Response messages to append to conversation history.
        messages: Vec<Message>,
        /// Token usage for this round.
        usage: ModelUsage,
        /// Why the round ended.
        #[serde(rename = "finishReason")]
        finish_reason: FinishReason,
    },

    /// Stream closed.
    StreamEnd,
}

// ─────────────────────────────────────────────────────────────────────────────
// ToolEvent — per-call lifecycle events
// ─────────────────────────────────────────────────────────────────────────────

/// Kind of a tool lifecycle event.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolEventKind {
    /// Call registered, not yet executed.
    Start,
    /// Progress update during execution.
    Update,
    /// Execution completed.
    End,
    /// Validation or execution failed.
    Error,
}

/// One event in a tool call's lifecycle.
///
/// For a given `tool_call_id`, a `start` precedes any `update`, and exactly
/// one terminal event (`end` or `error`) follows every `start` that reaches
/// execution.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolEvent {
    /// Event kind.
    pub kind: ToolEventKind,
    /// Tool name.
    pub tool_name: String,
    /// Tool call ID.
    pub tool_call_id: String,
    /// Human-readable message (display string, progress text, result, or error).
    pub message: String,
    /// Tool arguments as seen at event time.
    pub args: Value,
}

impl ToolEvent {
    /// Create an event of the given kind.
    #[must_use]
    pub fn new(
        kind: ToolEventKind,
        tool_name: impl Into<String>,
        tool_call_id: impl Into<String>,
        message: impl Into<String>,
        args: Value,
    ) -> Self {
        Self {
            kind,
            tool_name: tool_name.into(),
            tool_call_id: tool_call_id.into(),
            message: message.into(),
            args,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// AgentEvent — events emitted to the caller
// ─────────────────────────────────────────────────────────────────────────────

/// Canonical event stream emitted by the orchestrator during a run.
///
/// Subscribers re-render tool lifecycles from the full event list carried by
/// each `tool-call-lifecycle` event, so lifecycle updates are self-contained.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum AgentEvent {
    /// Run started.
    AgentStart,

    /// Run finished. Always the last event of a run.
    AgentStop {
        /// Stop reason string.
        reason: String,
    },

    /// Iteration-level error (recoverable or final).
    AgentError {
        /// Error description, truncated for display.
        message: String,
    },

    /// Inference round started.
    StepStart {
        /// Zero-based step index.
        step: u32,
    },

    /// Inference round finished.
    StepStop {
        /// Zero-based step index.
        step: u32,
    },

    /// Reasoning block started.
    ThinkingStart,

    /// Reasoning content so far.
    Thinking {
        /// Accumulated reasoning text.
        content: String,
    },

    /// Reasoning block finished.
    ThinkingEnd {
        /// Final accumulated reasoning text.
        content: String,
    },

    /// Assistant text block started.
    MessageStart {
        /// Message role (always `assistant` for streamed content).
        role: String,
    },

    /// Assistant text so far.
    Message {
        /// Message role.
        role: String,
        /// Accumulated text.
        content: String,
    },

    /// Assistant text block finished.
    MessageEnd {
        /// Message role.
        role: String,
        /// Final accumulated text.
        content: String,
    },

    /// A tool call's lifecycle changed; carries the full event list so far.
    ToolCallLifecycle {
        /// Tool call ID.
        #[serde(rename = "toolCallId")]
        tool_call_id: String,
        /// All lifecycle events for this call, in arrival order.
        events: Vec<ToolEvent>,
    },
}

impl AgentEvent {
    /// Event type string, for subscribers that discriminate on type.
    #[must_use]
    pub fn event_type(&self) -> &str {
        match self {
            Self::AgentStart => "agent-start",
            Self::AgentStop { .. } => "agent-stop",
            Self::AgentError { .. } => "agent-error",
            Self::StepStart { .. } => "step-start",
            Self::StepStop { .. } => "step-stop",
            Self::ThinkingStart => "thinking-start",
            Self::Thinking { .. } => "thinking",
            Self::ThinkingEnd { .. } => "thinking-end",
            Self::MessageStart { .. } => "message-start",
            Self::Message { .. } => "message",
            Self::MessageEnd { .. } => "message-end",
            Self::ToolCallLifecycle { .. } => "tool-call-lifecycle",
        }
    }
}
