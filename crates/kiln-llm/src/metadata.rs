//! Model metadata.
//!
//! Sampling parameters for a round are derived from the model's metadata
//! rather than hard-coded in the loop, so switching models changes
//! temperature/top-p/reasoning budget without touching orchestration code.

use serde::{Deserialize, Serialize};

use crate::client::StreamOptions;

/// Static metadata about a model.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelMetadata {
    /// Model identifier.
    pub id: String,
    /// Context window size in tokens.
    pub context_window: u64,
    /// Maximum output tokens per round.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_output_tokens: Option<u32>,
    /// Default sampling temperature.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    /// Default top-p.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f64>,
    /// Reasoning budget in tokens, for models with extended reasoning.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reasoning_budget: Option<u32>,
}

impl ModelMetadata {
    /// Metadata with just an id and context window.
    #[must_use]
    pub fn new(id: impl Into<String>, context_window: u64) -> Self {
        Self {
            id: id.into(),
            context_window,
            max_output_tokens: None,
            temperature: None,
            top_p: None,
            reasoning_budget: None,
        }
    }

    /// Derive per-round sampling options from this metadata.
    #[must_use]
    pub fn stream_options(&self) -> StreamOptions {
        StreamOptions {
            max_tokens: self.max_output_tokens,
            temperature: self.temperature,
            top_p: self.top_p,
            reasoning_budget: self.reasoning_budget,
        }
    }
}
