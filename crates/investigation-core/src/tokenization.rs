//! Token counting
//!
//! `TokenCounter` is the token-encoder seam used by the prompt budgeter.
//! `ApproxTokenCounter` needs no vocabulary; `TiktokenTokenCounter` (feature
//! `tokenizer-tiktoken`) uses the `o200k_base` BPE.

/// Default characters per token for approximate counting
pub const DEFAULT_CHARS_PER_TOKEN: f32 = 4.0;

pub trait TokenCounter: Send + Sync {
    fn count_text(&self, text: &str) -> usize;
}

#[derive(Debug, Clone)]
pub struct ApproxTokenCounter {
    pub chars_per_token: f32,
}

impl ApproxTokenCounter {
    pub fn new(chars_per_token: f32) -> Self {
        Self { chars_per_token }
    }
}

impl Default for ApproxTokenCounter {
    fn default() -> Self {
        Self {
            chars_per_token: DEFAULT_CHARS_PER_TOKEN,
        }
    }
}

impl TokenCounter for ApproxTokenCounter {
    fn count_text(&self, text: &str) -> usize {
        (text.chars().count() as f32 / self.chars_per_token).ceil() as usize
    }
}

#[cfg(feature = "tokenizer-tiktoken")]
#[derive(Clone)]
pub struct TiktokenTokenCounter {
    encoder: tiktoken_rs::CoreBPE,
}

#[cfg(feature = "tokenizer-tiktoken")]
impl TiktokenTokenCounter {
    pub fn new(encoder: tiktoken_rs::CoreBPE) -> Self {
        Self { encoder }
    }

    pub fn o200k_base() -> Result<Self, crate::error::InvestigationError> {
        let encoder = tiktoken_rs::o200k_base().map_err(|e| {
            crate::error::InvestigationError::Config(format!("failed to load o200k_base: {}", e))
        })?;
        Ok(Self { encoder })
    }
}

#[cfg(feature = "tokenizer-tiktoken")]
impl TokenCounter for TiktokenTokenCounter {
    fn count_text(&self, text: &str) -> usize {
        self.encoder.encode_with_special_tokens(text).len()
    }
}
