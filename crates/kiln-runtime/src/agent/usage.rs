//! Per-step token usage accounting.

use std::sync::Arc;

use kiln_core::usage::ModelUsage;
use tracing::debug;

use crate::types::AgentState;

/// Sink for per-step total token counts, usually a context-window budgeter.
pub trait ContextWindowTracker: Send + Sync {
    /// Record the total token count of one completed step.
    fn record_step_tokens(&self, total_tokens: u64);
}

/// Folds per-step usage into run state and forwards totals to a tracker.
#[derive(Default)]
pub struct UsageAggregator {
    tracker: Option<Arc<dyn ContextWindowTracker>>,
}

impl UsageAggregator {
    /// Aggregator with no external tracker.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Aggregator forwarding step totals to `tracker`.
    #[must_use]
    pub fn with_tracker(tracker: Arc<dyn ContextWindowTracker>) -> Self {
        Self {
            tracker: Some(tracker),
        }
    }

    /// Record one step's usage: overwrite the step slot, grow the total.
    pub fn record(&self, state: &mut AgentState, step_usage: ModelUsage) {
        state.total_usage.add(&step_usage);
        if let Some(tracker) = self.tracker.as_deref() {
            tracker.record_step_tokens(step_usage.total_tokens);
        }
        debug!(
            step_tokens = step_usage.total_tokens,
            total_tokens = state.total_usage.total_tokens,
            "step usage recorded"
        );
        state.step_usage = step_usage;
    }
}
