//! Word boundary segment count

use once_cell::sync::Lazy;
use regex::Regex;

use super::Provider;

// Runs of word and non-word characters are exactly the non-empty segments
// between ASCII word boundaries.
static SEGMENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[0-9A-Za-z_]+|[^0-9A-Za-z_]+").expect("valid segment regex"));

/// Counts the non-empty segments between word boundaries
#[derive(Debug, Default, Clone, Copy)]
pub struct WordProvider;

impl Provider for WordProvider {
    fn count_tokens(&self, text: &str) -> usize {
        SEGMENT.find_iter(text).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_segments() {
        let p = WordProvider;
        assert_eq!(p.count_tokens(""), 0);
        assert_eq!(p.count_tokens("hello"), 1);
        assert_eq!(p.count_tokens("hello world"), 3);
        assert_eq!(p.count_tokens("fn main() {}"), 4);
        assert_eq!(p.count_tokens("  "), 1);
    }
}
