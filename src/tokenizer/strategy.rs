//! Estimation strategy definitions

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// Supported token estimation strategies
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Default,
    EnumIter,
    EnumString,
    Display,
    ValueEnum,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    /// One token per four characters, rounded up
    #[default]
    Chars,
    /// One token per word-boundary segment
    Words,
    /// Exact cl100k_base BPE count
    Cl100k,
}

impl Strategy {
    /// Resolve a strategy from a string key
    ///
    /// Model names starting with `gpt` use the character estimate; unknown
    /// keys fall back to the default.
    pub fn from_key(key: &str) -> Self {
        let key = key.trim();
        if key.get(..3).is_some_and(|p| p.eq_ignore_ascii_case("gpt")) {
            return Strategy::Chars;
        }
        key.parse::<Strategy>().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_from_key() {
        assert_eq!(Strategy::from_key("words"), Strategy::Words);
        assert_eq!(Strategy::from_key("WORDS"), Strategy::Words);
        assert_eq!(Strategy::from_key("cl100k"), Strategy::Cl100k);
        assert_eq!(Strategy::from_key("gpt-3.5-turbo"), Strategy::Chars);
        assert_eq!(Strategy::from_key("no-such-model"), Strategy::Chars);
        assert_eq!(Strategy::from_key(""), Strategy::Chars);
    }

    #[test]
    fn test_display_round_trips_key() {
        assert_eq!(Strategy::Cl100k.to_string(), "cl100k");
        for strategy in Strategy::iter() {
            assert_eq!(Strategy::from_key(&strategy.to_string()), strategy);
        }
    }
}
