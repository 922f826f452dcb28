//! Agent loop internals: event emission, stream translation, tool-call
//! lifecycle tracking, validation, parallel execution, and usage accounting.

#[allow(clippy::module_inception)]
mod agent;
mod event_emitter;
mod lifecycle;
mod step_runner;
mod stream_translator;
mod tool_executor;
mod usage;
mod validation;

pub use agent::Agent;
pub use event_emitter::EventEmitter;
pub use lifecycle::LifecycleTracker;
pub use stream_translator::{StepContext, StreamTranslator};
pub use tool_executor::{ExecutionOutcome, execute_pending};
pub use usage::{ContextWindowTracker, UsageAggregator};
pub use validation::validate_pending;
