//! # kiln-core
//!
//! Foundation types for the Kiln agent orchestrator.
//!
//! This crate provides the shared vocabulary that all other Kiln crates
//! depend on:
//!
//! - **Stream chunks**: `StreamChunk` enum for the model-client streaming protocol
//! - **Agent events**: `AgentEvent` / `ToolEvent` emitted to callers during a run
//! - **Messages**: `Message` enum with `User`, `Assistant`, `ToolResult` variants
//! - **Usage**: `ModelUsage` token accounting with detail breakdowns
//! - **History**: `ConversationHistory` trait plus an in-memory implementation
//! - **Tool schemas**: `ToolDefinition` passed to the model

#![deny(unsafe_code)]

pub mod events;
pub mod history;
pub mod logging;
pub mod messages;
pub mod tools;
pub mod usage;
