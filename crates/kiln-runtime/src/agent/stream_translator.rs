//! Stream chunk translation.
//!
//! Normalizes transport chunks into the canonical [`AgentEvent`] sequence
//! while accumulating text/reasoning and collecting pending tool calls into
//! the per-step context. At most one event is produced per chunk; chunk
//! types the orchestrator does not surface translate to `None`, so unknown
//! transport chunk types never fail the loop.

use kiln_core::events::{AgentEvent, StreamChunk, ToolEvent, ToolEventKind};
use kiln_core::messages::ToolCall;
use kiln_tools::ToolRegistry;
use serde_json::Value;
use tracing::debug;

use crate::agent::lifecycle::LifecycleTracker;
use crate::types::PendingToolCall;

const ASSISTANT_ROLE: &str = "assistant";

/// Mutable per-iteration context shared by the translator and executor.
///
/// Scoped to one step: created before the streaming call, discarded after
/// the step's tool messages are appended to history.
#[derive(Default)]
pub struct StepContext {
    /// Tool calls extracted from the stream, in arrival order.
    pub pending: Vec<PendingToolCall>,
    /// Lifecycle accumulator for this step's calls.
    pub lifecycle: LifecycleTracker,
}

impl StepContext {
    /// Fresh context for a new step.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

/// Chunk-to-event translator with running text/reasoning accumulation.
#[derive(Debug, Default)]
pub struct StreamTranslator {
    text: String,
    reasoning: String,
}

impl StreamTranslator {
    /// Fresh translator for a new step.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Accumulated assistant text so far.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Accumulated reasoning so far.
    #[must_use]
    pub fn reasoning(&self) -> &str {
        &self.reasoning
    }

    /// Translate one chunk into at most one [`AgentEvent`].
    ///
    /// `tool-call` chunks are registered into `step` (lifecycle start event
    /// plus a pending-call record) as a side effect.
    pub fn translate(
        &mut self,
        chunk: &StreamChunk,
        registry: &ToolRegistry,
        step: &mut StepContext,
    ) -> Option<AgentEvent> {
        match chunk {
            StreamChunk::ReasoningStart => Some(AgentEvent::ThinkingStart),
            StreamChunk::ReasoningDelta { delta } => {
                self.reasoning.push_str(delta);
                Some(AgentEvent::Thinking {
                    content: self.reasoning.clone(),
                })
            }
            StreamChunk::ReasoningEnd => Some(AgentEvent::ThinkingEnd {
                content: self.reasoning.clone(),
            }),
            StreamChunk::TextStart => Some(AgentEvent::MessageStart {
                role: ASSISTANT_ROLE.to_owned(),
            }),
            StreamChunk::TextDelta { delta } => {
                self.text.push_str(delta);
                Some(AgentEvent::Message {
                    role: ASSISTANT_ROLE.to_owned(),
                    content: self.text.clone(),
                })
            }
            StreamChunk::TextEnd => Some(AgentEvent::MessageEnd {
                role: ASSISTANT_ROLE.to_owned(),
                content: self.text.clone(),
            }),
            StreamChunk::ToolCall { call } => Some(register_tool_call(call, registry, step)),
            // done/stream framing chunks are consumed by the step runner
            _ => None,
        }
    }
}

/// Resolve a tool call against the registry and record its lifecycle start.
fn register_tool_call(
    call: &ToolCall,
    registry: &ToolRegistry,
    step: &mut StepContext,
) -> AgentEvent {
    let tool = registry.get(&call.name);
    let args = call.input.clone().unwrap_or(Value::Null);
    let display = tool
        .as_ref()
        .map(|t| t.display(&args))
        .unwrap_or_default();

    if tool.is_none() {
        debug!(tool_name = call.name, "tool call names unknown tool");
    }

    let events = step.lifecycle.process(
        &call.id,
        ToolEvent::new(
            ToolEventKind::Start,
            call.name.clone(),
            call.id.clone(),
            display,
            args,
        ),
    );
    step.pending.push(PendingToolCall {
        call: call.clone(),
        tool_name: call.name.clone(),
        tool,
    });

    AgentEvent::ToolCallLifecycle {
        tool_call_id: call.id.clone(),
        events,
    }
}
