//! # Model Client Trait
//!
//! Core abstraction for inference backends. Every transport implements
//! [`ModelClient`] to expose a unified streaming interface.
//!
//! The trait returns a boxed [`Stream`] of [`StreamChunk`]s, allowing the
//! runtime to process chunks incrementally regardless of the underlying
//! API format. The stream's final `done` chunk carries the response
//! messages, per-round usage, and finish reason.

use std::pin::Pin;

use async_trait::async_trait;
use futures::Stream;
use kiln_core::events::StreamChunk;
use kiln_core::messages::Message;
use kiln_core::tools::ToolDefinition;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use crate::error::{ModelError, ModelResult};

/// Boxed stream of [`StreamChunk`]s returned by [`ModelClient::stream`].
pub type ChunkStream = Pin<Box<dyn Stream<Item = Result<StreamChunk, ModelError>> + Send>>;

/// One inference request: system prompt, history snapshot, and tool schemas.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelRequest {
    /// System prompt.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_prompt: Option<String>,
    /// Conversation messages.
    pub messages: Vec<Message>,
    /// Tools the model may call.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tools: Vec<ToolDefinition>,
}

/// Sampling options for a stream request.
///
/// All fields are optional — transports use their own defaults when a field
/// is not specified.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreamOptions {
    /// Maximum tokens to generate.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,

    /// Sampling temperature.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,

    /// Top-p sampling.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f64>,

    /// Reasoning budget in tokens, for transports with extended reasoning.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reasoning_budget: Option<u32>,
}

/// Core model client trait.
///
/// Implementors must be `Send + Sync` for use across async tasks. The
/// cancellation token is threaded into the transport so an in-flight
/// stream can be aborted mid-round.
#[async_trait]
pub trait ModelClient: Send + Sync {
    /// Model identifier this client talks to.
    fn model(&self) -> &str;

    /// Stream a response from the model.
    ///
    /// The caller consumes chunks until [`StreamChunk::Done`] or an error.
    /// A stream that ends without a `done` chunk produced no output.
    async fn stream(
        &self,
        request: &ModelRequest,
        options: &StreamOptions,
        cancel: &CancellationToken,
    ) -> ModelResult<ChunkStream>;
}
