//! Parallel tool execution with partial-failure isolation.
//!
//! Valid calls fan out concurrently; each call settles into a result string
//! regardless of outcome, so one failing tool never poisons its siblings.
//! Results are slotted by the call's original position while lifecycle
//! events are collected in completion order.

use std::sync::Arc;
use std::time::Instant;

use futures::StreamExt;
use futures::stream::FuturesUnordered;
use kiln_core::events::{ToolEvent, ToolEventKind};
use kiln_core::history::ConversationHistory;
use kiln_tools::{ToolContext, format_result};
use metrics::{counter, histogram};
use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::types::{ExecutionResult, PendingToolCall, ValidationError};

/// The settled outcome of one step's tool executions.
#[derive(Debug, Default)]
pub struct ExecutionOutcome {
    /// One result per pending call, in the calls' original order.
    pub results: Vec<ExecutionResult>,
    /// Terminal lifecycle events, in completion order.
    pub lifecycle_events: Vec<(String, ToolEvent)>,
}

/// Execute every pending call, settling all of them.
///
/// Calls named in `validation_errors` are failed without executing. Valid
/// calls run concurrently; cancellation is checked before each execution so
/// an aborted run still settles every slot.
pub async fn execute_pending(
    pending: &[PendingToolCall],
    validation_errors: &[ValidationError],
    history: Arc<dyn ConversationHistory>,
    cancel: &CancellationToken,
) -> ExecutionOutcome {
    let mut outcome = ExecutionOutcome {
        results: pending
            .iter()
            .map(|p| ExecutionResult {
                tool_call_id: p.call.id.clone(),
                tool_name: p.tool_name.clone(),
                output: String::new(),
                success: false,
            })
            .collect(),
        lifecycle_events: Vec::new(),
    };

    // Fail validation casualties up front, in call order.
    for err in validation_errors {
        let Some(p) = pending.get(err.index) else {
            continue;
        };
        let message = format!("Tool error: {}", err.message);
        outcome.results[err.index].output = message.clone();
        outcome
            .lifecycle_events
            .push((p.call.id.clone(), error_event(p, message)));
        counter!("tool_executions_total", "tool" => p.tool_name.clone(), "outcome" => "invalid")
            .increment(1);
    }

    let mut in_flight = FuturesUnordered::new();
    for (index, p) in pending.iter().enumerate() {
        if validation_errors.iter().any(|e| e.index == index) {
            continue;
        }
        in_flight.push(run_one(index, p, Arc::clone(&history), cancel.clone()));
    }

    while let Some((index, result, event)) = in_flight.next().await {
        outcome
            .lifecycle_events
            .push((result.tool_call_id.clone(), event));
        outcome.results[index] = result;
    }

    outcome
}

/// Run one call to completion, converting every failure mode into a result.
async fn run_one(
    index: usize,
    p: &PendingToolCall,
    history: Arc<dyn ConversationHistory>,
    cancel: CancellationToken,
) -> (usize, ExecutionResult, ToolEvent) {
    let started = Instant::now();
    let (output, success) = dispatch(p, history, &cancel).await;

    let outcome_label = if success { "ok" } else { "error" };
    counter!("tool_executions_total", "tool" => p.tool_name.clone(), "outcome" => outcome_label)
        .increment(1);
    histogram!("tool_execution_duration_seconds", "tool" => p.tool_name.clone())
        .record(started.elapsed().as_secs_f64());
    debug!(
        tool_name = p.tool_name,
        tool_call_id = p.call.id,
        success,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "tool execution settled"
    );

    let event = if success {
        ToolEvent::new(
            ToolEventKind::End,
            p.tool_name.clone(),
            p.call.id.clone(),
            output.clone(),
            p.call.input.clone().unwrap_or(Value::Null),
        )
    } else {
        error_event(p, output.clone())
    };

    let result = ExecutionResult {
        tool_call_id: p.call.id.clone(),
        tool_name: p.tool_name.clone(),
        output,
        success,
    };
    (index, result, event)
}

/// Resolve and invoke the tool, producing the result string.
async fn dispatch(
    p: &PendingToolCall,
    history: Arc<dyn ConversationHistory>,
    cancel: &CancellationToken,
) -> (String, bool) {
    let Some(tool) = p.tool.as_ref().map(Arc::clone) else {
        return (
            format!("Tool error: No executor found for tool {}", p.tool_name),
            false,
        );
    };

    if cancel.is_cancelled() {
        return ("Tool error: cancelled".to_owned(), false);
    }

    let ctx = ToolContext {
        tool_call_id: p.call.id.clone(),
        history,
        cancellation: cancel.clone(),
    };
    let input = p.call.input.clone().unwrap_or(Value::Null);
    match tool.execute(input, &ctx).await {
        Ok(output) => (format_result(output.as_ref()), true),
        Err(e) => (format!("Tool error: {e}"), false),
    }
}

fn error_event(p: &PendingToolCall, message: String) -> ToolEvent {
    ToolEvent::new(
        ToolEventKind::Error,
        p.tool_name.clone(),
        p.call.id.clone(),
        message,
        p.call.input.clone().unwrap_or(Value::Null),
    )
}
