//! The top-level agent loop.
//!
//! `Agent` drives repeated rounds of inference and tool execution until the
//! model stops requesting tools, the consecutive-error budget is exhausted,
//! a fatal error occurs, or the caller aborts. Exactly one `agent-stop`
//! event is emitted per run, whatever the exit path.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use chrono::Utc;
use kiln_core::events::AgentEvent;
use kiln_core::history::ConversationHistory;
use kiln_core::messages::Message;
use kiln_llm::{ModelClient, ToolCallRepair};
use kiln_tools::ToolRegistry;
use parking_lot::Mutex;
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::agent::event_emitter::EventEmitter;
use crate::agent::step_runner::run_step;
use crate::agent::usage::{ContextWindowTracker, UsageAggregator};
use crate::errors::{RuntimeError, StopReason};
use crate::types::{AgentConfig, AgentState, RunResult};

/// Maximum characters of an error message surfaced in an `agent-error` event.
const ERROR_MESSAGE_LIMIT: usize = 100;

/// Autonomous turn orchestrator.
///
/// One run at a time: a second `run` while one is in flight is rejected
/// with [`RuntimeError::Busy`]. The conversation history is owned by the
/// caller and shared with concurrently executing tools.
pub struct Agent {
    config: AgentConfig,
    client: Arc<dyn ModelClient>,
    registry: Arc<ToolRegistry>,
    history: Arc<dyn ConversationHistory>,
    repair: Option<Arc<dyn ToolCallRepair>>,
    emitter: EventEmitter,
    aggregator: UsageAggregator,
    state: Mutex<AgentState>,
    running: AtomicBool,
    cancel: Mutex<CancellationToken>,
}

impl Agent {
    /// Create an agent over a model client, tool registry, and history.
    #[must_use]
    pub fn new(
        config: AgentConfig,
        client: Arc<dyn ModelClient>,
        registry: Arc<ToolRegistry>,
        history: Arc<dyn ConversationHistory>,
    ) -> Self {
        let state = AgentState::new(config.model.id.clone());
        Self {
            config,
            client,
            registry,
            history,
            repair: None,
            emitter: EventEmitter::new(),
            aggregator: UsageAggregator::new(),
            state: Mutex::new(state),
            running: AtomicBool::new(false),
            cancel: Mutex::new(CancellationToken::new()),
        }
    }

    /// Attach a tool-call repair collaborator.
    #[must_use]
    pub fn with_repair(mut self, repair: Arc<dyn ToolCallRepair>) -> Self {
        self.repair = Some(repair);
        self
    }

    /// Attach a context-window tracker receiving per-step token totals.
    #[must_use]
    pub fn with_tracker(mut self, tracker: Arc<dyn ContextWindowTracker>) -> Self {
        self.aggregator = UsageAggregator::with_tracker(tracker);
        self
    }

    /// Subscribe to the agent's event stream.
    pub fn subscribe(&self) -> broadcast::Receiver<AgentEvent> {
        self.emitter.subscribe()
    }

    /// Whether a run is currently in flight.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Number of completed steps in the current (or last) run.
    pub fn current_step(&self) -> u32 {
        self.state.lock().steps.len() as u32
    }

    /// Snapshot of the current run state.
    #[must_use]
    pub fn state(&self) -> AgentState {
        self.state.lock().clone()
    }

    /// Cancel the in-flight run, if any.
    ///
    /// The run settles in-flight tool calls before stopping; it does not
    /// tear down mid-execution.
    pub fn abort(&self) {
        self.cancel.lock().cancel();
    }

    /// Inject an externally-owned cancellation token for the next run.
    ///
    /// Lets a caller wire the run into a wider cancellation tree. A token
    /// that is already cancelled is replaced with a fresh one when the next
    /// run starts.
    pub fn set_abort_token(&self, token: CancellationToken) {
        *self.cancel.lock() = token;
    }

    /// Run one turn: append the user message and loop until a stop.
    ///
    /// Always emits a terminal `agent-stop`. Returns a summary of the run;
    /// `Err` is reserved for refusing to start (another run in progress).
    pub async fn run(&self, input: impl Into<String>) -> Result<RunResult, RuntimeError> {
        let _guard = RunGuard::acquire(&self.running)?;
        let cancel = {
            let mut guard = self.cancel.lock();
            if guard.is_cancelled() {
                *guard = CancellationToken::new();
            }
            guard.clone()
        };

        let run_id = {
            let mut state = self.state.lock();
            *state = AgentState::new(self.config.model.id.clone());
            state.started_at = Some(Utc::now());
            state.run_id.clone()
        };
        self.history.append(Message::user(input));
        let _ = self.emitter.emit(AgentEvent::AgentStart);
        info!(run_id, model = self.config.model.id, "run started");

        let registry = self.registry.subset(self.config.active_tools.as_deref());

        let mut consecutive_errors: u32 = 0;
        let mut stop_reason = StopReason::MaxIterations;
        let mut interrupted = false;
        let mut last_error = None;

        for step_index in 0..self.config.max_iterations {
            if cancel.is_cancelled() {
                stop_reason = StopReason::Aborted;
                interrupted = true;
                break;
            }

            let result = run_step(
                step_index,
                &self.config,
                self.client.as_ref(),
                &registry,
                &self.history,
                self.repair.as_deref(),
                &self.emitter,
                &self.aggregator,
                &self.state,
                &cancel,
            )
            .await;

            // stopped_at reflects the last completed iteration even when
            // the loop keeps going.
            self.state.lock().stopped_at = Some(Utc::now());

            match result {
                Ok(outcome) => {
                    consecutive_errors = 0;
                    if outcome.interrupted {
                        stop_reason = StopReason::Aborted;
                        interrupted = true;
                        break;
                    }
                    if !outcome.finish_reason.is_tool_calls() {
                        stop_reason = StopReason::Completed;
                        break;
                    }
                }
                Err(err) => {
                    let message = truncate_message(&err.to_string(), ERROR_MESSAGE_LIMIT);
                    warn!(
                        category = err.category(),
                        step = step_index,
                        "iteration failed"
                    );
                    let _ = self.emitter.emit(AgentEvent::AgentError {
                        message: message.clone(),
                    });
                    last_error = Some(message);

                    if !err.is_recoverable() {
                        stop_reason = StopReason::Error;
                        break;
                    }
                    consecutive_errors += 1;
                    if consecutive_errors > self.config.max_retries {
                        stop_reason = StopReason::ErrorBudget;
                        break;
                    }
                }
            }
        }

        let _ = self.emitter.emit(AgentEvent::AgentStop {
            reason: stop_reason.to_string(),
        });
        info!(run_id, reason = %stop_reason, "run stopped");

        let state = self.state.lock();
        Ok(RunResult {
            steps_executed: state.steps.len() as u32,
            total_usage: state.total_usage.clone(),
            stop_reason,
            interrupted,
            error: match stop_reason {
                StopReason::Error | StopReason::ErrorBudget => last_error,
                _ => None,
            },
        })
    }
}

/// RAII claim on the agent's single run slot.
struct RunGuard<'a> {
    running: &'a AtomicBool,
}

impl<'a> RunGuard<'a> {
    fn acquire(running: &'a AtomicBool) -> Result<Self, RuntimeError> {
        if running
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(RuntimeError::Busy);
        }
        Ok(Self { running })
    }
}

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
    }
}

/// Truncate to `max_chars` characters, appending an ellipsis when cut.
fn truncate_message(message: &str, max_chars: usize) -> String {
    if message.chars().count() <= max_chars {
        message.to_owned()
    } else {
        let truncated: String = message.chars().take(max_chars).collect();
        format!("{truncated}...")
    }
}
