//! Runtime error types.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur during agent runtime execution.
#[derive(Debug, thiserror::Error)]
pub enum RuntimeError {
    /// Model client error (streaming, invalid tool input, no output).
    #[error("Model error: {0}")]
    Model(#[from] kiln_llm::ModelError),

    /// Tool execution error surfaced at the loop level.
    #[error("Tool error: {tool_name}: {message}")]
    Tool {
        /// Tool name.
        tool_name: String,
        /// Error description.
        message: String,
    },

    /// Another run is already in progress on this agent.
    #[error("Agent busy: a run is already in progress")]
    Busy,

    /// Operation was cancelled via the cancellation token.
    #[error("Operation cancelled")]
    Cancelled,

    /// Internal / unexpected error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl RuntimeError {
    /// Whether the error is recoverable (the loop may retry).
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::Model(e) => !e.is_no_output(),
            Self::Busy | Self::Cancelled => true,
            Self::Tool { .. } | Self::Internal(_) => false,
        }
    }

    /// Error category string for event emission.
    pub fn category(&self) -> &str {
        match self {
            Self::Model(e) => e.category(),
            Self::Tool { .. } => "tool",
            Self::Busy => "busy",
            Self::Cancelled => "cancelled",
            Self::Internal(_) => "internal",
        }
    }
}

/// Reason the agent stopped running.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// The model finished without requesting more tool calls.
    Completed,
    /// Iteration cap reached.
    MaxIterations,
    /// Consecutive-error budget exhausted.
    ErrorBudget,
    /// Fatal error (no output generated).
    Error,
    /// Caller cancelled.
    Aborted,
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Completed => write!(f, "completed"),
            Self::MaxIterations => write!(f, "max_iterations"),
            Self::ErrorBudget => write!(f, "error_budget"),
            Self::Error => write!(f, "error"),
            Self::Aborted => write!(f, "aborted"),
        }
    }
}
