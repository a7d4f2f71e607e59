//! Token counting
//!
//! Counts with the model's BPE encoding from `tiktoken-rs`: `o200k_base`
//! for the gpt-4o, gpt-4.1 and o-series families, `cl100k_base` for the
//! rest. If an encoding cannot be loaded the counter falls back to the
//! character heuristic of one token per four characters, rounded up.

use once_cell::sync::Lazy;
use tiktoken_rs::{cl100k_base, o200k_base, CoreBPE};

use crate::llm::ChatMessage;

/// Tokens charged per chat message for role and framing
const MESSAGE_OVERHEAD: usize = 4;

static CL100K: Lazy<Option<CoreBPE>> = Lazy::new(|| match cl100k_base() {
    Ok(bpe) => Some(bpe),
    Err(e) => {
        tracing::warn!("cl100k_base unavailable, using character estimate: {}", e);
        None
    }
});

static O200K: Lazy<Option<CoreBPE>> = Lazy::new(|| match o200k_base() {
    Ok(bpe) => Some(bpe),
    Err(e) => {
        tracing::warn!("o200k_base unavailable, using character estimate: {}", e);
        None
    }
});

/// Model families tokenized with `o200k_base`
const O200K_PREFIXES: &[&str] = &["gpt-4o", "gpt-4.1", "gpt-5", "o1", "o3", "o4"];

/// Token counter bound to one encoding
#[derive(Clone, Copy)]
pub struct TokenCounter {
    bpe: Option<&'static CoreBPE>,
}

impl std::fmt::Debug for TokenCounter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenCounter")
            .field("exact", &self.bpe.is_some())
            .finish()
    }
}

impl Default for TokenCounter {
    fn default() -> Self {
        Self::new()
    }
}

impl TokenCounter {
    /// `cl100k_base` counter
    pub fn new() -> Self {
        Self { bpe: CL100K.as_ref() }
    }

    /// Counter for the encoding a deployment or model name uses
    pub fn for_model(model: &str) -> Self {
        let name = model.to_lowercase();
        if O200K_PREFIXES.iter().any(|prefix| name.starts_with(prefix)) {
            Self { bpe: O200K.as_ref() }
        } else {
            Self::new()
        }
    }

    /// Character-only counter, no tokenizer
    pub fn heuristic() -> Self {
        Self { bpe: None }
    }

    /// Whether counts come from a real tokenizer
    pub fn is_exact(&self) -> bool {
        self.bpe.is_some()
    }

    pub fn estimate(&self, text: &str) -> usize {
        match self.bpe {
            Some(bpe) => bpe.encode_with_special_tokens(text).len(),
            None => (text.chars().count() + 3) / 4,
        }
    }

    /// Estimate for a full request, including per-message overhead
    pub fn estimate_messages(&self, messages: &[ChatMessage]) -> usize {
        messages
            .iter()
            .map(|m| self.estimate(m.text()) + MESSAGE_OVERHEAD)
            .sum()
    }

    /// Sum of estimates for independent text segments
    pub fn estimate_pages(&self, pages: &[String]) -> usize {
        pages.iter().map(|page| self.estimate(page)).sum()
    }

    /// Whether `text` fits under `budget` tokens
    pub fn fits(&self, text: &str, budget: usize) -> bool {
        self.estimate(text) <= budget
    }
}
