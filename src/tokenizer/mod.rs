//! Token estimation for LLM context budgeting
//!
//! The default strategy is a deterministic character-density estimate that
//! needs no external tokenizer. A word-boundary count and an exact cl100k BPE
//! count are available behind the same interface.

mod error;
mod provider;
mod strategy;

pub use error::{TokenizerError, TokenizerResult};
pub use strategy::Strategy;

use provider::chars::CharProvider;
use provider::openai::OpenAIProvider;
use provider::words::WordProvider;
use provider::Provider;

/// Trait defining the interface for tokenizers
pub trait Tokenizer: Send + Sync {
    /// Count tokens in the given text
    fn count_tokens(&self, text: &str) -> usize;

    /// Strategy this tokenizer implements
    fn strategy(&self) -> Strategy;
}

/// Tokenizer backed by one provider
pub struct StrategyTokenizer {
    provider: Box<dyn Provider>,
    strategy: Strategy,
}

impl Tokenizer for StrategyTokenizer {
    fn count_tokens(&self, text: &str) -> usize {
        if text.is_empty() {
            return 0;
        }
        self.provider.count_tokens(text)
    }

    fn strategy(&self) -> Strategy {
        self.strategy
    }
}

/// Create a tokenizer for the given strategy
///
/// Fails only when the cl100k encoding cannot be loaded.
pub fn create_tokenizer(strategy: Strategy) -> TokenizerResult<Box<dyn Tokenizer>> {
    let provider: Box<dyn Provider> = match strategy {
        Strategy::Chars => Box::new(CharProvider),
        Strategy::Words => Box::new(WordProvider),
        Strategy::Cl100k => Box::new(OpenAIProvider::new()?),
    };

    Ok(Box::new(StrategyTokenizer { provider, strategy }))
}

/// Create a tokenizer, falling back to the character estimate on failure
pub fn tokenizer_for(strategy: Strategy) -> Box<dyn Tokenizer> {
    match create_tokenizer(strategy) {
        Ok(tokenizer) => tokenizer,
        Err(e) => {
            log::warn!("{}; falling back to {}", e, Strategy::Chars);
            Box::new(StrategyTokenizer {
                provider: Box::new(CharProvider),
                strategy: Strategy::Chars,
            })
        }
    }
}

/// Estimate the token count of `text` using the strategy named by `key`
///
/// Unknown keys use the character estimate. Never fails.
pub fn estimate(text: &str, key: &str) -> usize {
    if text.is_empty() {
        return 0;
    }
    tokenizer_for(Strategy::from_key(key)).count_tokens(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedTokenizer;

    impl Tokenizer for FixedTokenizer {
        fn count_tokens(&self, _text: &str) -> usize {
            42
        }

        fn strategy(&self) -> Strategy {
            Strategy::Chars
        }
    }

    #[test]
    fn test_default_estimates() {
        assert_eq!(estimate("", "chars"), 0);
        assert_eq!(estimate("abcd", "chars"), 1);
        assert_eq!(estimate(&"a".repeat(400), "chars"), 100);
        assert_eq!(estimate(&"a".repeat(400), "unknown"), 100);
        assert_eq!(estimate(&"a".repeat(400), "gpt-4o"), 100);
    }

    #[test]
    fn test_words_strategy() {
        assert_eq!(estimate("hello world", "words"), 3);
        assert_eq!(estimate("", "words"), 0);
    }

    #[test]
    fn test_tokenizer_reports_strategy() {
        let tokenizer = create_tokenizer(Strategy::Words).unwrap();
        assert_eq!(tokenizer.strategy(), Strategy::Words);
        assert_eq!(tokenizer.count_tokens("a b"), 3);
    }

    #[test]
    fn test_custom_tokenizer_is_pluggable() {
        let tokenizer: Box<dyn Tokenizer> = Box::new(FixedTokenizer);
        assert_eq!(tokenizer.count_tokens("anything"), 42);
    }

    #[test]
    #[ignore] // Loads the cl100k tables, slow in debug builds
    fn test_cl100k_strategy() {
        let tokenizer = create_tokenizer(Strategy::Cl100k).unwrap();
        assert!(tokenizer.count_tokens("Hello, world!") > 0);
    }
}
