//! Tool-call repair contract.
//!
//! When the transport flags a tool call invalid (argument assembly failed
//! schema validation), an injected collaborator may regenerate corrected
//! arguments via a secondary model call. The collaborator never errors: it
//! returns `None` when it declines or fails, and the orchestrator proceeds
//! with the original (invalid) call.

use async_trait::async_trait;
use kiln_core::messages::ToolCall;
use kiln_core::tools::ToolDefinition;

use crate::error::ModelError;

/// Collaborator that attempts to repair an invalid tool call.
#[async_trait]
pub trait ToolCallRepair: Send + Sync {
    /// Attempt to produce a corrected call.
    ///
    /// Returns `None` to decline; must not error.
    async fn repair(
        &self,
        call: &ToolCall,
        tools: &[ToolDefinition],
        error: &ModelError,
    ) -> Option<ToolCall>;
}

/// Run a repair attempt with the standing exclusions applied.
///
/// Unknown tool names are never repairable — regenerating arguments cannot
/// fix a call to a tool that does not exist — so those are declined here
/// before the collaborator is consulted.
pub async fn attempt_repair(
    repair: &dyn ToolCallRepair,
    call: &ToolCall,
    tools: &[ToolDefinition],
    error: &ModelError,
) -> Option<ToolCall> {
    if !tools.iter().any(|t| t.name == call.name) {
        return None;
    }
    repair.repair(call, tools, error).await
}
