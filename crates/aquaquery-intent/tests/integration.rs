//! Integration tests for the aquaquery-intent crate.
//!
//! These exercise normalization, scoring and location extraction together
//! through the public API only.

use aquaquery_intent::{
    ContextSignals, GLOBAL_CONFIDENCE_FLOOR, Intent, LocationExtractor, PATTERNS, PatternScorer,
    normalize,
};

// ═══════════════════════════════════════════════════════════════════════
//  End-to-end classification
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn hello_is_a_confident_greeting() {
    let result = PatternScorer::new().classify("Hello", None);
    assert_eq!(result.intent, Intent::Greeting);
    assert!(result.confidence >= 0.8, "confidence {}", result.confidence);
}

#[test]
fn empty_query_is_an_error() {
    let result = PatternScorer::new().classify("", None);
    assert_eq!(result.intent, Intent::Error);
    assert_eq!(result.confidence, 0.0);
}

#[test]
fn compare_two_states() {
    let result = PatternScorer::new().classify("Compare Punjab and Haryana", None);
    assert_eq!(result.intent, Intent::CompareLocations);
    assert!(result.confidence >= 0.7, "confidence {}", result.confidence);
}

#[test]
fn single_letter_misspelling_keeps_the_intent() {
    let scorer = PatternScorer::new();
    let correct = scorer.classify("Show me Punjab data", None);
    let misspelt = scorer.classify("Show me Panjab data", None);

    assert_eq!(correct.intent, Intent::QueryLocation);
    assert_eq!(misspelt.intent, correct.intent);
    assert!(misspelt.confidence > 0.3);
}

#[test]
fn gibberish_is_unknown() {
    let result = PatternScorer::new().classify("asdf qwerty", None);
    assert_eq!(result.intent, Intent::Unknown);
    assert!(result.confidence < GLOBAL_CONFIDENCE_FLOOR);
}

#[test]
fn every_pattern_example_classifies_to_its_intent() {
    let scorer = PatternScorer::new();
    let mut checked = 0;
    for pattern in PATTERNS {
        for example in pattern.examples {
            let result = scorer.classify(example, None);
            assert_eq!(
                result.intent, pattern.intent,
                "{example:?} scored {:.3}",
                result.confidence
            );
            checked += 1;
        }
    }
    assert!(checked >= PATTERNS.len());
}

#[test]
fn confidence_stays_in_expected_range() {
    let scorer = PatternScorer::new();
    let queries = [
        "Hello",
        "Which areas are critical?",
        "Show over-exploited regions",
        "Explain stage of extraction",
        "What are the policy recommendations?",
        "Compare 2022 and 2023 year data",
        "how are you",
    ];
    for query in queries {
        let result = scorer.classify(query, None);
        assert!(result.confidence >= 0.0);
        assert!(result.confidence.is_finite());
        assert!(!matches!(result.intent, Intent::Error), "{query}");
    }
}

// ═══════════════════════════════════════════════════════════════════════
//  Context
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn classification_is_idempotent() {
    let scorer = PatternScorer::new();
    let ctx = ContextSignals {
        last_location: Some("punjab"),
        last_intent: Some(Intent::QueryLocation),
    };

    let first = scorer.classify("Compare Punjab and Haryana", Some(&ctx));
    let second = scorer.classify("Compare Punjab and Haryana", Some(&ctx));
    assert_eq!(first.intent, second.intent);
    assert_eq!(first.confidence.to_bits(), second.confidence.to_bits());
}

#[test]
fn related_previous_intent_never_lowers_the_score() {
    let scorer = PatternScorer::new();
    let query = "Any policy measures?";

    let plain = scorer.classify(query, None);
    let ctx = ContextSignals {
        last_location: None,
        last_intent: Some(Intent::CriticalAreas),
    };
    let with_context = scorer.classify(query, Some(&ctx));

    assert_eq!(plain.intent, Intent::PolicySuggestion);
    assert_eq!(with_context.intent, Intent::PolicySuggestion);
    assert!(with_context.confidence > plain.confidence);
}

#[test]
fn last_location_feeds_the_context_bonus() {
    let scorer = PatternScorer::new();
    let query = "Compare Punjab and Haryana";
    let plain = scorer.classify(query, None);
    let ctx = ContextSignals {
        last_location: Some("gujarat"),
        last_intent: None,
    };
    let with_location = scorer.classify(query, Some(&ctx));
    assert!(with_location.confidence > plain.confidence);
}

// ═══════════════════════════════════════════════════════════════════════
//  Locations
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn classification_and_extraction_share_normalization() {
    let scorer = PatternScorer::new();
    let extractor = LocationExtractor::new().unwrap();

    let text = normalize("Tell me about Amritsar");
    let scored = scorer.classify_normalized(&text, None);
    let location = extractor.extract(&text);

    assert_eq!(scored.intent, Intent::QueryDistrict);
    assert_eq!(location.district.as_deref(), Some("amritsar"));
    assert_eq!(location.state, None);
}

#[test]
fn misspelt_state_is_recovered() {
    let extractor = LocationExtractor::new().unwrap();
    let location = extractor.extract_raw("Groundwater in Maharashtr");
    assert_eq!(location.state.as_deref(), Some("maharashtra"));
    assert_eq!(location.found(), 1);
}
