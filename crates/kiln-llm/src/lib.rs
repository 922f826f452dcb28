//! # kiln-llm
//!
//! Model-client abstraction for the Kiln orchestrator.
//!
//! The inference transport is a black box behind [`ModelClient`]: it yields
//! an ordered stream of [`StreamChunk`]s and eventually a `done` chunk with
//! response messages, usage, and a finish reason. This crate also carries
//! the error taxonomy the runtime's retry policy branches on, model
//! metadata for deriving sampling options, and the tool-call-repair
//! collaborator contract.
//!
//! [`StreamChunk`]: kiln_core::events::StreamChunk

#![deny(unsafe_code)]

pub mod client;
pub mod error;
pub mod metadata;
pub mod repair;

pub use client::{ChunkStream, ModelClient, ModelRequest, StreamOptions};
pub use error::{ModelError, ModelResult};
pub use metadata::ModelMetadata;
pub use repair::{ToolCallRepair, attempt_repair};
