//! # kiln-runtime
//!
//! The agent turn orchestrator: drives repeated rounds of (model inference →
//! tool execution → result injection) until the model stops requesting
//! tools, the error budget is exhausted, or the caller cancels.
//!
//! The [`agent::Agent`] is the top-level driver. Within each step it runs
//! the stream translator, tool-call lifecycle tracker, input validator,
//! parallel tool executor, and usage aggregator, emitting a typed
//! [`AgentEvent`] stream to subscribers along the way.
//!
//! [`AgentEvent`]: kiln_core::events::AgentEvent

#![deny(unsafe_code)]

pub mod agent;
pub mod errors;
pub mod types;

pub use agent::{Agent, ContextWindowTracker, EventEmitter};
pub use errors::{RuntimeError, StopReason};
pub use types::{AgentConfig, AgentState, RunResult};
