//! Token usage accounting.
//!
//! [`ModelUsage`] exists in two scopes during a run: a per-step snapshot
//! overwritten every inference round, and a cumulative total that only grows.
//! Accumulation treats absent optional fields as zero.

use serde::{Deserialize, Serialize};

/// Input token breakdown.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InputTokenDetails {
    /// Tokens processed without any cache involvement.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub no_cache: Option<u64>,
    /// Tokens read from the prompt cache.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache_read: Option<u64>,
    /// Tokens written to the prompt cache.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache_write: Option<u64>,
}

/// Output token breakdown.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutputTokenDetails {
    /// Visible text tokens.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<u64>,
    /// Reasoning tokens.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reasoning: Option<u64>,
}

/// Token usage reported by the model for one inference round.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelUsage {
    /// Input tokens.
    pub input_tokens: u64,
    /// Output tokens.
    pub output_tokens: u64,
    /// Total tokens (input + output as reported by the transport).
    pub total_tokens: u64,
    /// Cached input tokens.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cached_tokens: Option<u64>,
    /// Reasoning output tokens.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reasoning_tokens: Option<u64>,
    /// Input sub-counts.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input_details: Option<InputTokenDetails>,
    /// Output sub-counts.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_details: Option<OutputTokenDetails>,
}

/// Add `rhs` into `lhs`, treating a missing side as zero.
fn add_opt(lhs: &mut Option<u64>, rhs: Option<u64>) {
    if let Some(v) = rhs {
        let current = lhs.get_or_insert(0);
        *current = current.saturating_add(v);
    }
}

impl ModelUsage {
    /// Accumulate another usage record into this one.
    ///
    /// Scalar counts saturate instead of wrapping; optional fields absent on
    /// either side are treated as zero, so totals never go backwards.
    pub fn add(&mut self, other: &Self) {
        self.input_tokens = self.input_tokens.saturating_add(other.input_tokens);
        self.output_tokens = self.output_tokens.saturating_add(other.output_tokens);
        self.total_tokens = self.total_tokens.saturating_add(other.total_tokens);
        add_opt(&mut self.cached_tokens, other.cached_tokens);
        add_opt(&mut self.reasoning_tokens, other.reasoning_tokens);

        if let Some(details) = &other.input_details {
            let mine = self.input_details.get_or_insert_with(Default::default);
            add_opt(&mut mine.no_cache, details.no_cache);
            add_opt(&mut mine.cache_read, details.cache_read);
            add_opt(&mut mine.cache_write, details.cache_write);
        }
        if let Some(details) = &other.output_details {
            let mine = self.output_details.get_or_insert_with(Default::default);
            add_opt(&mut mine.text, details.text);
            add_opt(&mut mine.reasoning, details.reasoning);
        }
    }
}
