//! Model client error taxonomy.
//!
//! The runtime's retry policy branches on exactly three classes: invalid
//! tool input (recoverable, the model may self-correct), no output
//! (fatal), and everything else (recoverable up to the retry ceiling).

/// Result type alias for model client operations.
pub type ModelResult<T> = Result<T, ModelError>;

/// Errors that can occur during model client operations.
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    /// The model produced tool arguments that failed transport-side
    /// schema validation.
    #[error("Invalid tool input: {message}")]
    InvalidToolInput {
        /// Description of the validation failure.
        message: String,
    },

    /// The stream ended without producing any output.
    #[error("No output generated")]
    NoOutput,

    /// The transport returned an API error.
    #[error("API error ({status}): {message}")]
    Api {
        /// HTTP-like status code.
        status: u16,
        /// Error description.
        message: String,
        /// Whether this error can be retried.
        retryable: bool,
    },

    /// Chunk parsing failed.
    #[error("Parse error: {message}")]
    Parse {
        /// Error description.
        message: String,
    },

    /// Stream was cancelled.
    #[error("Stream cancelled")]
    Cancelled,

    /// Transport-specific error.
    #[error("{message}")]
    Other {
        /// Error description.
        message: String,
    },
}

impl ModelError {
    /// Whether this is the invalid-tool-input class the loop retries on.
    pub fn is_invalid_tool_input(&self) -> bool {
        matches!(self, Self::InvalidToolInput { .. })
    }

    /// Whether this is the fatal no-output class.
    pub fn is_no_output(&self) -> bool {
        matches!(self, Self::NoOutput)
    }

    /// Whether this error is worth retrying at all.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::InvalidToolInput { .. } => true,
            Self::Api { retryable, .. } => *retryable,
            Self::NoOutput | Self::Parse { .. } | Self::Cancelled | Self::Other { .. } => false,
        }
    }

    /// Error category string for event emission.
    pub fn category(&self) -> &str {
        match self {
            Self::InvalidToolInput { .. } => "invalid_tool_input",
            Self::NoOutput => "no_output",
            Self::Api { .. } => "api",
            Self::Parse { .. } => "parse",
            Self::Cancelled => "cancelled",
            Self::Other { .. } => "unknown",
        }
    }
}
