//! Input normalization and tokenization.
//!
//! [`normalize`] lowercases a raw query and splits it into word tokens on
//! whitespace and common punctuation.  Single-character tokens and stop-words
//! (articles, auxiliaries, common prepositions) are dropped.  Hyphens are
//! kept so compound terms such as `over-exploited` survive as one token.

/// Punctuation that separates tokens in addition to whitespace.
const PUNCTUATION: &[char] = &[',', '.', '!', '?', ';', ':', '"', '\'', '(', ')'];

fn is_separator(c: char) -> bool {
    c.is_whitespace() || PUNCTUATION.contains(&c)
}

/// Words carrying no intent signal on their own.
pub const STOP_WORDS: &[&str] = &[
    "the", "a", "an", "and", "or", "but", "in", "on", "at", "to", "for", "of", "with", "by", "is",
    "are", "was", "were", "be", "been", "being", "have", "has", "had", "do", "does", "did", "will",
    "would", "could", "should", "may", "might", "must", "can", "shall",
];

/// A lowercased query together with its filtered token sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedText {
    /// The full lowercased input.  Substring signals operate on this.
    pub lower: String,
    /// Filtered tokens in input order.
    pub tokens: Vec<String>,
}

impl NormalizedText {
    /// `true` when the input had no non-whitespace content.
    pub fn is_blank(&self) -> bool {
        self.lower.trim().is_empty()
    }

    /// Adjacent token pairs joined by a single space.
    pub fn bigrams(&self) -> impl Iterator<Item = String> + '_ {
        self.tokens
            .windows(2)
            .map(|pair| format!("{} {}", pair[0], pair[1]))
    }
}

/// Whether `word` is in the fixed stop-word set.
pub fn is_stop_word(word: &str) -> bool {
    STOP_WORDS.contains(&word)
}

/// Lowercase `raw` and tokenize it.
///
/// Deterministic and side-effect free.  Blank input yields an empty token
/// sequence; deciding whether that is an error is left to the caller.
pub fn normalize(raw: &str) -> NormalizedText {
    let lower = raw.to_lowercase();
    let tokens = lower
        .split(is_separator)
        .filter(|token| token.chars().count() > 1 && !is_stop_word(token))
        .map(str::to_owned)
        .collect();

    NormalizedText { lower, tokens }
}
