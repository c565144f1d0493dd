//! Token counting for chunk budgets
//!
//! Counts come from tiktoken. When a count cannot be produced the counter
//! degrades to a character-length estimate so chunking can still proceed.

use crate::error::{Error, Result};
use std::sync::Arc;

/// Token counter trait for measuring text against a chunk budget.
pub trait TokenCounter: Send + Sync {
    /// Name of the encoding or strategy behind this counter.
    fn name(&self) -> &str;

    /// Count tokens, or `None` when the tokenizer cannot handle `text`.
    fn try_count(&self, text: &str) -> Option<usize>;

    /// Count tokens, falling back to [`estimate_tokens`] on tokenizer failure.
    fn count_tokens(&self, text: &str) -> usize {
        match self.try_count(text) {
            Some(count) => count,
            None => {
                tracing::warn!(
                    tokenizer = self.name(),
                    chars = text.len(),
                    "Token counting failed, using length estimate"
                );
                estimate_tokens(text)
            }
        }
    }
}

/// Shared, immutable token counter handle
pub type SharedTokenCounter = Arc<dyn TokenCounter>;

/// Rough token estimate: one token per four characters.
pub fn estimate_tokens(text: &str) -> usize {
    text.chars().count() / 4
}

/// tiktoken-backed counter
pub struct TiktokenCounter {
    encoding: String,
    bpe: tiktoken_rs::CoreBPE,
}

impl TiktokenCounter {
    /// Load a counter for a named tiktoken encoding.
    pub fn new(encoding: &str) -> Result<Self> {
        let loaded = match encoding {
            "cl100k_base" => tiktoken_rs::cl100k_base(),
            "p50k_base" => tiktoken_rs::p50k_base(),
            "p50k_edit" => tiktoken_rs::p50k_edit(),
            "r50k_base" => tiktoken_rs::r50k_base(),
            other => {
                return Err(Error::Config {
                    reason: format!("Unknown tokenizer encoding: {}", other),
                })
            }
        };
        let bpe = loaded.map_err(|e| Error::Config {
            reason: format!("Failed to load {} encoding: {}", encoding, e),
        })?;

        Ok(Self {
            encoding: encoding.to_string(),
            bpe,
        })
    }

    /// Counter for `cl100k_base` (GPT-4 / ChatGPT family)
    pub fn cl100k() -> Result<Self> {
        Self::new("cl100k_base")
    }
}

impl TokenCounter for TiktokenCounter {
    fn name(&self) -> &str {
        &self.encoding
    }

    fn try_count(&self, text: &str) -> Option<usize> {
        Some(self.bpe.encode_ordinary(text).len())
    }
}

/// Length-based counter used when no tiktoken encoding is available
#[derive(Debug, Default, Clone, Copy)]
pub struct HeuristicCounter;

impl TokenCounter for HeuristicCounter {
    fn name(&self) -> &str {
        "chars/4"
    }

    fn try_count(&self, text: &str) -> Option<usize> {
        Some(estimate_tokens(text))
    }
}

/// Build the process-wide token counter for `encoding`.
///
/// Falls back to [`HeuristicCounter`] if the encoding cannot be loaded.
pub fn load_token_counter(encoding: &str) -> SharedTokenCounter {
    match TiktokenCounter::new(encoding) {
        Ok(counter) => {
            tracing::debug!(encoding, "Loaded tiktoken encoding");
            Arc::new(counter)
        }
        Err(e) => {
            tracing::warn!(error = %e, "Tokenizer unavailable, estimating tokens from length");
            Arc::new(HeuristicCounter)
        }
    }
}
