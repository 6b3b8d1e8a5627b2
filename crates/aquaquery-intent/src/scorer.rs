//! Intent scoring.
//!
//! [`PatternScorer`] evaluates every [`IntentPattern`] in table order against
//! a normalized query and picks the best one that clears its own gate.
//!
//! Per pattern the score is built from these signals:
//!
//! | Signal | Contribution |
//! |--------|--------------|
//! | Exact keyword substring | +1.2 per keyword |
//! | Synonym substring | +0.9 per synonym |
//! | Fuzzy token | +0.7 × similarity for each keyword/token pair above 0.75 |
//! | Bigram | +0.8 per keyword contained in an adjacent token pair |
//! | Context | +0.6 for a context keyword, +0.4 for a related previous intent |
//!
//! The sum is then scaled by the `require_all` penalty, keyword coverage,
//! priority and an exact-match boost, and finally normalized by the number of
//! phrases in the pattern.

use crate::intent::Intent;
use crate::patterns::{IntentPattern, PATTERNS};
use crate::similarity::combined_similarity;
use crate::text::{NormalizedText, normalize};

/// The chosen pattern's score must exceed this for its intent to be emitted.
pub const GLOBAL_CONFIDENCE_FLOOR: f64 = 0.35;

// -- Signal weights ---------------------------------------------------------

const EXACT_WEIGHT: f64 = 1.2;
const SYNONYM_WEIGHT: f64 = 0.9;
const FUZZY_WEIGHT: f64 = 0.7;
const FUZZY_THRESHOLD: f64 = 0.75;
const BIGRAM_WEIGHT: f64 = 0.8;
const CONTEXT_KEYWORD_BONUS: f64 = 0.6;
const RELATED_INTENT_BONUS: f64 = 0.4;
const REQUIRE_ALL_PENALTY: f64 = 0.6;
const COVERAGE_BASE: f64 = 0.8;
const COVERAGE_WEIGHT: f64 = 0.2;
const EXACT_MATCH_BOOST: f64 = 1.2;
const EXACT_AND_FUZZY_BOOST: f64 = 1.1;

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

/// Read-only view of conversation state consulted while scoring.
#[derive(Debug, Clone, Copy, Default)]
pub struct ContextSignals<'a> {
    /// The most recent location mentioned in the session, lowercased.
    pub last_location: Option<&'a str>,
    /// The intent of the previous turn.
    pub last_intent: Option<Intent>,
}

/// The outcome of classifying one query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoredResult {
    pub intent: Intent,
    /// Heuristic score, not a probability.  May exceed `1.0`.
    pub confidence: f64,
}

impl ScoredResult {
    fn error() -> Self {
        Self {
            intent: Intent::Error,
            confidence: 0.0,
        }
    }
}

// ---------------------------------------------------------------------------
// PatternScorer
// ---------------------------------------------------------------------------

/// Scores queries against a fixed pattern table.
///
/// The scorer holds no mutable state; one instance can be shared freely.
#[derive(Debug, Clone, Copy)]
pub struct PatternScorer {
    patterns: &'static [IntentPattern],
}

impl PatternScorer {
    /// Scorer over the built-in [`PATTERNS`] table.
    #[must_use]
    pub fn new() -> Self {
        Self::with_patterns(PATTERNS)
    }

    /// Scorer over a caller-supplied table, evaluated in slice order.
    #[must_use]
    pub fn with_patterns(patterns: &'static [IntentPattern]) -> Self {
        Self { patterns }
    }

    /// The table this scorer evaluates.
    pub fn patterns(&self) -> &'static [IntentPattern] {
        self.patterns
    }

    /// Classify `raw`, optionally taking conversation context into account.
    ///
    /// Empty or whitespace-only input yields [`Intent::Error`] with
    /// confidence `0.0`.  When no pattern clears its gate the result is
    /// [`Intent::Unknown`] carrying the best raw score seen.
    pub fn classify(&self, raw: &str, context: Option<&ContextSignals<'_>>) -> ScoredResult {
        let text = normalize(raw);
        if text.is_blank() {
            return ScoredResult::error();
        }
        self.classify_normalized(&text, context)
    }

    /// Classify an already normalized query.
    pub fn classify_normalized(
        &self,
        text: &NormalizedText,
        context: Option<&ContextSignals<'_>>,
    ) -> ScoredResult {
        if text.is_blank() {
            return ScoredResult::error();
        }

        let mut best: Option<(usize, f64)> = None;
        let mut best_raw = 0.0_f64;

        for (index, pattern) in self.patterns.iter().enumerate() {
            let score = self.score_pattern(pattern, text, context);
            best_raw = best_raw.max(score);

            // Strictly greater: earlier patterns keep ties.
            if score >= pattern.min_confidence && best.is_none_or(|(_, top)| score > top) {
                best = Some((index, score));
            }
        }

        let result = match best {
            Some((index, score)) if score > GLOBAL_CONFIDENCE_FLOOR => ScoredResult {
                intent: self.patterns[index].intent,
                confidence: score,
            },
            Some((_, score)) => ScoredResult {
                intent: Intent::Unknown,
                confidence: score,
            },
            None => ScoredResult {
                intent: Intent::Unknown,
                confidence: best_raw,
            },
        };

        tracing::debug!(
            intent = %result.intent,
            confidence = result.confidence,
            tokens = text.tokens.len(),
            has_context = context.is_some(),
            "query classified"
        );

        result
    }

    /// Score a single pattern against `text`.
    pub fn score_pattern(
        &self,
        pattern: &IntentPattern,
        text: &NormalizedText,
        context: Option<&ContextSignals<'_>>,
    ) -> f64 {
        let lower = text.lower.as_str();
        let mut score = 0.0;

        // Exact keywords.
        let exact_hits = pattern.keywords.iter().filter(|k| lower.contains(*k)).count();
        score += exact_hits as f64 * EXACT_WEIGHT;

        // Synonyms.
        let synonym_hits = pattern.synonyms.iter().filter(|s| lower.contains(*s)).count();
        score += synonym_hits as f64 * SYNONYM_WEIGHT;

        // Fuzzy tokens.
        let mut fuzzy_hits = 0usize;
        for keyword in pattern.keywords {
            for token in &text.tokens {
                let similarity = combined_similarity(keyword, token);
                if similarity > FUZZY_THRESHOLD {
                    fuzzy_hits += 1;
                    score += similarity * FUZZY_WEIGHT;
                }
            }
        }

        // Bigrams.
        for bigram in text.bigrams() {
            let hits = pattern.keywords.iter().filter(|k| bigram.contains(*k)).count();
            score += hits as f64 * BIGRAM_WEIGHT;
        }

        if pattern.context_dependent {
            if let Some(ctx) = context {
                score += context_bonus(pattern, lower, ctx);
            }
        }

        if pattern.require_all && exact_hits < pattern.keywords.len() {
            score *= REQUIRE_ALL_PENALTY;
        }

        score *= COVERAGE_BASE + COVERAGE_WEIGHT * coverage_ratio(lower, pattern.keywords);

        let mut multiplier = pattern.priority / 10.0;
        if exact_hits > 0 {
            multiplier *= EXACT_MATCH_BOOST;
        }
        score *= multiplier;

        let mut normalized = score / (pattern.phrase_count() as f64 + 1.0);
        if exact_hits > 0 && fuzzy_hits > 0 {
            normalized *= EXACT_AND_FUZZY_BOOST;
        }
        normalized
    }
}

impl Default for PatternScorer {
    fn default() -> Self {
        Self::new()
    }
}

// -- Private helpers --------------------------------------------------------

fn context_bonus(pattern: &IntentPattern, lower: &str, ctx: &ContextSignals<'_>) -> f64 {
    let mut bonus = 0.0;

    let keyword_present = pattern.context_keywords.iter().any(|k| {
        lower.contains(k) || ctx.last_location.is_some_and(|loc| loc.contains(k))
    });
    if keyword_present {
        bonus += CONTEXT_KEYWORD_BONUS;
    }

    if ctx
        .last_intent
        .is_some_and(|last| last.is_related(pattern.intent))
    {
        bonus += RELATED_INTENT_BONUS;
    }

    bonus
}

/// Fraction of the input's characters spanned by keyword occurrences.
///
/// Occurrences of each keyword are counted non-overlapping; spans of
/// different keywords may overlap, so the sum is clamped to `1.0`.
fn coverage_ratio(lower: &str, keywords: &[&str]) -> f64 {
    let total = lower.chars().count();
    if total == 0 {
        return 0.0;
    }
    let covered: usize = keywords
        .iter()
        .map(|k| lower.matches(k).count() * k.chars().count())
        .sum();
    (covered as f64 / total as f64).min(1.0)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_is_error() {
        let scorer = PatternScorer::new();
        let result = scorer.classify("", None);
        assert_eq!(result.intent, Intent::Error);
        assert_eq!(result.confidence, 0.0);

        let blank = scorer.classify("  \n\t ", None);
        assert_eq!(blank.intent, Intent::Error);
        assert_eq!(blank.confidence, 0.0);
    }

    #[test]
    fn coverage_is_clamped() {
        // "hi" and "hello" overlap inside "hello".
        let ratio = coverage_ratio("hello", &["hello", "hi", "hell"]);
        assert_eq!(ratio, 1.0);
        assert_eq!(coverage_ratio("", &["a"]), 0.0);
    }

    #[test]
    fn coverage_counts_repeated_occurrences() {
        // Two "ab" occurrences cover 4 of 5 characters.
        let ratio = coverage_ratio("ab ab", &["ab"]);
        assert!((ratio - 0.8).abs() < 1e-12);
    }

    #[test]
    fn greeting_scores_by_formula() {
        // "hello": exact {hello}; fuzzy hello/hello = 1.0; no bigrams.
        // raw = 1.2 + 0.7 = 1.9, full coverage, multiplier 2.0 * 1.2,
        // divided by 4 keywords + 1 synonym + 1, then the 1.1 boost.
        let scorer = PatternScorer::new();
        let greeting = crate::patterns::pattern_for(Intent::Greeting).unwrap();
        let score = scorer.score_pattern(greeting, &normalize("Hello"), None);
        let expected = 1.9 * 1.0 * 2.4 / 6.0 * 1.1;
        assert!((score - expected).abs() < 1e-9, "got {score}, want {expected}");
    }

    fn assert_close(got: f64, want: f64) {
        assert!((got - want).abs() < 1e-9, "got {got}, want {want}");
    }

    fn score_one(pattern: &IntentPattern, raw: &str, ctx: Option<&ContextSignals<'_>>) -> f64 {
        PatternScorer::new().score_pattern(pattern, &normalize(raw), ctx)
    }

    const AQUIFER: IntentPattern = IntentPattern {
        intent: Intent::Glossary,
        keywords: &["aquifer"],
        synonyms: &["recharge"],
        ..IntentPattern::EMPTY
    };

    #[test]
    fn synonym_hit_scores_by_formula() {
        // 0.9 for the synonym; no keyword occurs so coverage scales by 0.8;
        // 1 keyword + 1 synonym + 1.
        assert_close(score_one(&AQUIFER, "recharge", None), 0.9 * 0.8 / 3.0);
    }

    const WATER_TABLE: IntentPattern = IntentPattern {
        intent: Intent::WaterLevel,
        keywords: &["water table"],
        ..IntentPattern::EMPTY
    };

    #[test]
    fn bigram_hit_scores_by_formula() {
        // Exact 1.2 plus bigram 0.8; neither token is close enough to the
        // two-word keyword for a fuzzy hit.  Full coverage, exact boost 1.2,
        // divided by 1 keyword + 1.
        assert_close(score_one(&WATER_TABLE, "water table", None), 2.0 * 1.2 / 2.0);
    }

    const BOTH_REQUIRED: IntentPattern = IntentPattern {
        intent: Intent::Glossary,
        keywords: &["aquifer", "recharge"],
        require_all: true,
        ..IntentPattern::EMPTY
    };

    #[test]
    fn missing_required_keyword_is_penalized() {
        // Exact 1.2 + fuzzy 0.7, times 0.6 for the missing "recharge".
        let expected = 1.9 * 0.6 * 1.2 / 3.0 * 1.1;
        assert_close(score_one(&BOTH_REQUIRED, "aquifer", None), expected);

        let lenient = IntentPattern {
            require_all: false,
            ..BOTH_REQUIRED
        };
        assert_close(score_one(&lenient, "aquifer", None), 1.9 * 1.2 / 3.0 * 1.1);
    }

    const POLICY: IntentPattern = IntentPattern {
        intent: Intent::PolicySuggestion,
        keywords: &["policy"],
        context_keywords: &["punjab"],
        context_dependent: true,
        ..IntentPattern::EMPTY
    };

    #[test]
    fn context_keyword_in_input_adds_bonus() {
        let ctx = ContextSignals::default();
        // Only the 0.6 bonus contributes; zero coverage scales by 0.8.
        assert_close(score_one(&POLICY, "punjab", Some(&ctx)), 0.6 * 0.8 / 2.0);
        assert_close(score_one(&POLICY, "punjab", None), 0.0);
    }

    #[test]
    fn context_keyword_in_last_location_adds_bonus() {
        let ctx = ContextSignals {
            last_location: Some("punjab"),
            last_intent: None,
        };
        // Exact 1.2 + fuzzy 0.7 + context 0.6.
        assert_close(score_one(&POLICY, "policy", Some(&ctx)), 2.5 * 1.2 / 2.0 * 1.1);
        assert_close(score_one(&POLICY, "policy", None), 1.9 * 1.2 / 2.0 * 1.1);
    }

    #[test]
    fn related_previous_intent_adds_bonus() {
        let related = ContextSignals {
            last_location: None,
            last_intent: Some(Intent::CriticalAreas),
        };
        assert_close(score_one(&POLICY, "policy", Some(&related)), 2.3 * 1.2 / 2.0 * 1.1);

        let unrelated = ContextSignals {
            last_location: None,
            last_intent: Some(Intent::Greeting),
        };
        assert_close(score_one(&POLICY, "policy", Some(&unrelated)), 1.9 * 1.2 / 2.0 * 1.1);

        let both = ContextSignals {
            last_location: Some("punjab"),
            last_intent: Some(Intent::CriticalAreas),
        };
        assert_close(score_one(&POLICY, "policy", Some(&both)), 2.9 * 1.2 / 2.0 * 1.1);
    }

    #[test]
    fn context_is_ignored_for_context_free_patterns() {
        let scorer = PatternScorer::new();
        let help = crate::patterns::pattern_for(Intent::Help).unwrap();
        let text = normalize("help me");
        let ctx = ContextSignals {
            last_location: Some("punjab"),
            last_intent: Some(Intent::CriticalAreas),
        };
        let with = scorer.score_pattern(help, &text, Some(&ctx));
        let without = scorer.score_pattern(help, &text, None);
        assert_eq!(with, without);
    }

    static TIED: &[IntentPattern] = &[
        IntentPattern {
            intent: Intent::SafeAreas,
            keywords: &["aquifer"],
            min_confidence: 0.1,
            ..IntentPattern::EMPTY
        },
        IntentPattern {
            intent: Intent::WaterLevel,
            keywords: &["aquifer"],
            min_confidence: 0.1,
            ..IntentPattern::EMPTY
        },
    ];

    #[test]
    fn ties_go_to_the_earlier_pattern() {
        let scorer = PatternScorer::with_patterns(TIED);
        let result = scorer.classify("aquifer", None);
        assert_eq!(result.intent, Intent::SafeAreas);
    }

    static HIGH_GATE: &[IntentPattern] = &[IntentPattern {
        intent: Intent::Glossary,
        keywords: &["aquifer"],
        min_confidence: 2.0,
        ..IntentPattern::EMPTY
    }];

    #[test]
    fn unknown_reports_best_raw_score() {
        let scorer = PatternScorer::with_patterns(HIGH_GATE);
        let result = scorer.classify("aquifer", None);
        assert_eq!(result.intent, Intent::Unknown);
        assert!(result.confidence > 0.0);
        assert!(result.confidence < 2.0);
    }

    static LOW_GATE: &[IntentPattern] = &[IntentPattern {
        intent: Intent::Glossary,
        keywords: &["aquifer", "zone", "layer"],
        synonyms: &["stratum", "bed", "unit", "horizon"],
        min_confidence: 0.1,
        ..IntentPattern::EMPTY
    }];

    #[test]
    fn global_floor_applies_to_chosen_score() {
        // Cleared the pattern gate (0.1) but not the global floor.
        let scorer = PatternScorer::with_patterns(LOW_GATE);
        let result = scorer.classify("zone", None);
        assert!(result.confidence >= 0.1);
        assert!(result.confidence <= GLOBAL_CONFIDENCE_FLOOR);
        assert_eq!(result.intent, Intent::Unknown);
    }
}
