//! The tool contract.
//!
//! A tool is a named capability with a schema, a display formatter for UI
//! summaries, and an async `execute`. Execution returns `Option<Value>`:
//! `None` means the tool produced no output (formatted as an empty string),
//! which is distinct from an explicit JSON `null`.

use std::sync::Arc;

use async_trait::async_trait;
use kiln_core::history::ConversationHistory;
use kiln_core::tools::ToolDefinition;
use serde_json::Value;
use tokio_util::sync::CancellationToken;

use crate::errors::ToolError;

/// Context passed to every tool execution.
#[derive(Clone)]
pub struct ToolContext {
    /// The tool call ID this execution answers.
    pub tool_call_id: String,
    /// Conversation history, for tools that read prior messages.
    pub history: Arc<dyn ConversationHistory>,
    /// Cancellation signal; long-running tools should observe it.
    pub cancellation: CancellationToken,
}

/// A callable tool.
///
/// Implementors must be `Send + Sync`; executions for different calls may
/// run concurrently within one step.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Tool name (the key the model calls it by).
    fn name(&self) -> &str;

    /// Schema advertised to the model.
    fn definition(&self) -> ToolDefinition;

    /// Short human-readable summary of a call, e.g. `grep "foo" src/`.
    fn display(&self, input: &Value) -> String;

    /// Execute the tool.
    ///
    /// `Ok(None)` means success with no output.
    async fn execute(&self, input: Value, ctx: &ToolContext) -> Result<Option<Value>, ToolError>;
}
