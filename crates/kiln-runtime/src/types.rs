//! Runtime configuration, state, and result types.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use kiln_core::messages::ToolCall;
use kiln_core::usage::ModelUsage;
use kiln_llm::ModelMetadata;
use kiln_tools::Tool;
use serde::{Deserialize, Serialize};

use crate::errors::StopReason;

// ─────────────────────────────────────────────────────────────────────────────
// Agent configuration
// ─────────────────────────────────────────────────────────────────────────────

/// Configuration for creating an [`Agent`](crate::agent::Agent).
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentConfig {
    /// Model metadata; sampling options per round derive from this.
    pub model: ModelMetadata,
    /// System prompt.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_prompt: Option<String>,
    /// Maximum inference rounds per run.
    #[serde(default = "default_max_iterations")]
    pub max_iterations: u32,
    /// Additional attempts allowed after consecutive iteration errors.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    /// Restrict the run to this subset of registered tools.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active_tools: Option<Vec<String>>,
}

const fn default_max_iterations() -> u32 {
    25
}

const fn default_max_retries() -> u32 {
    2
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            model: ModelMetadata::new("unknown", 128_000),
            system_prompt: None,
            max_iterations: default_max_iterations(),
            max_retries: default_max_retries(),
            active_tools: None,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Run state
// ─────────────────────────────────────────────────────────────────────────────

/// One inference round's outcome: the tool names invoked and the tool names
/// whose results were produced. Parallel arrays kept for counting, not
/// correlated by index.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Step {
    /// Names of tools the model called this round.
    pub tool_calls: Vec<String>,
    /// Names of tools whose results were produced this round.
    pub tool_results: Vec<String>,
}

/// Mutable record of one turn run. Reset at the start of every `run`.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentState {
    /// Unique id for this run.
    pub run_id: String,
    /// Model identifier the run is using.
    pub model: String,
    /// Completed steps, in order.
    pub steps: Vec<Step>,
    /// Usage for the most recent round (overwritten each round).
    pub step_usage: ModelUsage,
    /// Cumulative usage across all rounds (only grows).
    pub total_usage: ModelUsage,
    /// When the run started.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,
    /// When the loop last stopped; updated after every iteration.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stopped_at: Option<DateTime<Utc>>,
}

impl AgentState {
    /// Fresh state for a new run.
    #[must_use]
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            run_id: uuid::Uuid::now_v7().to_string(),
            model: model.into(),
            steps: Vec::new(),
            step_usage: ModelUsage::default(),
            total_usage: ModelUsage::default(),
            started_at: None,
            stopped_at: None,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Per-step working types
// ─────────────────────────────────────────────────────────────────────────────

/// A tool call extracted from the stream, not yet executed.
#[derive(Clone)]
pub struct PendingToolCall {
    /// The raw call from the transport.
    pub call: ToolCall,
    /// Resolved tool name.
    pub tool_name: String,
    /// Resolved executable tool; `None` when the model named an unknown tool.
    pub tool: Option<Arc<dyn Tool>>,
}

impl std::fmt::Debug for PendingToolCall {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PendingToolCall")
            .field("call", &self.call)
            .field("tool_name", &self.tool_name)
            .field("resolved", &self.tool.is_some())
            .finish()
    }
}

/// Why a pending call's input failed validation, paired with its position.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationError {
    /// Index into the pending-call list.
    pub index: usize,
    /// Validation failure description.
    pub message: String,
}

/// The outcome of one tool call's execution, slotted by original index.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionResult {
    /// Tool call ID.
    pub tool_call_id: String,
    /// Tool name.
    pub tool_name: String,
    /// Formatted result string (or failure description).
    pub output: String,
    /// Whether execution succeeded.
    pub success: bool,
}

// ─────────────────────────────────────────────────────────────────────────────
// Run result
// ─────────────────────────────────────────────────────────────────────────────

/// Summary of a completed run.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunResult {
    /// Number of inference rounds executed.
    pub steps_executed: u32,
    /// Cumulative token usage.
    pub total_usage: ModelUsage,
    /// Why the run stopped.
    pub stop_reason: StopReason,
    /// Whether the run was cancelled.
    pub interrupted: bool,
    /// Final error message if the run stopped on an error.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}
