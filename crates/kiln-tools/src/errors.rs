//! Tool error types.

use thiserror::Error;

/// Errors that can occur during tool execution.
///
/// The executor converts any of these into a `"Tool error: ..."` result
/// string; they never propagate past the call that produced them.
#[derive(Debug, Error)]
pub enum ToolError {
    /// Input failed the tool's own validation.
    #[error("validation error: {message}")]
    Validation {
        /// Description of the validation failure.
        message: String,
    },

    /// Operation was cancelled.
    #[error("cancelled")]
    Cancelled,

    /// Operation timed out.
    #[error("timeout after {timeout_ms}ms")]
    Timeout {
        /// The timeout duration in milliseconds.
        timeout_ms: u64,
    },

    /// JSON serialization/deserialization error.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// Internal error (catch-all).
    #[error("{message}")]
    Internal {
        /// Description of the internal error.
        message: String,
    },
}
