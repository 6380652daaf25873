//! Character density estimate

use super::Provider;

/// Average characters per token in English text
pub const CHARS_PER_TOKEN: usize = 4;

/// Estimates one token per four characters
///
/// Characters are Unicode scalar values, so an emoji counts once rather than
/// as a UTF-16 surrogate pair.
#[derive(Debug, Default, Clone, Copy)]
pub struct CharProvider;

impl Provider for CharProvider {
    fn count_tokens(&self, text: &str) -> usize {
        text.chars().count().div_ceil(CHARS_PER_TOKEN)
    }
}
