//! Provider implementations for the estimation strategies

pub mod chars;
pub mod openai;
pub mod words;

/// Trait for token counting backends
pub trait Provider: Send + Sync {
    /// Count tokens in the given text
    fn count_tokens(&self, text: &str) -> usize;
}
