//! String similarity metrics.
//!
//! All metrics operate on Unicode scalar values (not bytes) and return a
//! score in `[0.0, 1.0]` where `1.0` means identical.

use std::collections::HashSet;

/// Weight of the normalized edit-distance term in [`combined_similarity`].
const LEVENSHTEIN_WEIGHT: f64 = 0.6;
/// Weight of the character-set overlap term.
const JACCARD_WEIGHT: f64 = 0.3;
/// Weight of the length-ratio term.
const LENGTH_WEIGHT: f64 = 0.1;

/// Classic edit distance (insert, delete, substitute; unit costs).
pub fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();

    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    // Two-row dynamic programme.
    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0usize; b.len() + 1];

    for (i, ca) in a.iter().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let substitution = prev[j] + usize::from(ca != cb);
            curr[j + 1] = (prev[j + 1] + 1).min(curr[j] + 1).min(substitution);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b.len()]
}

/// Edit distance normalized by the longer length.
///
/// Two empty strings are identical (`1.0`); exactly one empty string scores
/// `0.0`.
pub fn levenshtein_similarity(a: &str, b: &str) -> f64 {
    let len_a = a.chars().count();
    let len_b = b.chars().count();

    match (len_a, len_b) {
        (0, 0) => 1.0,
        (0, _) | (_, 0) => 0.0,
        _ => {
            let longest = len_a.max(len_b) as f64;
            1.0 - levenshtein(a, b) as f64 / longest
        }
    }
}

/// Jaccard index over the sets of distinct characters.
///
/// Returns `0.0` when both inputs are empty.
pub fn jaccard_char_similarity(a: &str, b: &str) -> f64 {
    let set_a: HashSet<char> = a.chars().collect();
    let set_b: HashSet<char> = b.chars().collect();

    let union = set_a.union(&set_b).count();
    if union == 0 {
        return 0.0;
    }
    let intersection = set_a.intersection(&set_b).count();
    intersection as f64 / union as f64
}

/// `1 - |len(a) - len(b)| / max(len(a), len(b))`, or `1.0` for two empty
/// strings.
pub fn length_ratio_similarity(a: &str, b: &str) -> f64 {
    let len_a = a.chars().count();
    let len_b = b.chars().count();
    let longest = len_a.max(len_b);
    if longest == 0 {
        return 1.0;
    }
    1.0 - len_a.abs_diff(len_b) as f64 / longest as f64
}

/// Weighted blend used for fuzzy keyword/token matching:
/// `0.6 * levenshtein + 0.3 * jaccard + 0.1 * length ratio`.
pub fn combined_similarity(a: &str, b: &str) -> f64 {
    LEVENSHTEIN_WEIGHT * levenshtein_similarity(a, b)
        + JACCARD_WEIGHT * jaccard_char_similarity(a, b)
        + LENGTH_WEIGHT * length_ratio_similarity(a, b)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
