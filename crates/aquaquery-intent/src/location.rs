//! Location extraction.
//!
//! Locations are recognized against three static gazetteers (states, major
//! cities / districts and assessment blocks), each compiled into an
//! [`AhoCorasick`] automaton.  Matching is **first in gazetteer order**, not
//! longest or earliest in the text: "compare punjab and haryana" yields
//! `haryana` because it precedes `punjab` in [`STATES`].
//!
//! When neither a state nor a district is found, single tokens are compared
//! to state names by normalized edit distance to tolerate misspellings such
//! as "panjab".

use aho_corasick::AhoCorasick;
use serde::{Deserialize, Serialize};

use crate::error::{IntentError, Result};
use crate::similarity::levenshtein_similarity;
use crate::text::{NormalizedText, normalize};

/// Minimum edit-distance similarity for a misspelled state name.
pub const FUZZY_STATE_THRESHOLD: f64 = 0.8;

// ---------------------------------------------------------------------------
// Gazetteers
// ---------------------------------------------------------------------------

/// Indian states and union territories, in match-priority order.
pub const STATES: &[&str] = &[
    "andhra pradesh",
    "arunachal pradesh",
    "assam",
    "bihar",
    "chhattisgarh",
    "goa",
    "gujarat",
    "haryana",
    "himachal pradesh",
    "jharkhand",
    "karnataka",
    "kerala",
    "madhya pradesh",
    "maharashtra",
    "manipur",
    "meghalaya",
    "mizoram",
    "nagaland",
    "odisha",
    "punjab",
    "rajasthan",
    "sikkim",
    "tamil nadu",
    "telangana",
    "tripura",
    "uttar pradesh",
    "uttarakhand",
    "west bengal",
    "delhi",
    "jammu and kashmir",
    "ladakh",
];

/// Major cities, treated as districts.
pub const DISTRICTS: &[&str] = &[
    "mumbai",
    "delhi",
    "bangalore",
    "hyderabad",
    "ahmedabad",
    "chennai",
    "kolkata",
    "surat",
    "pune",
    "jaipur",
    "lucknow",
    "kanpur",
    "nagpur",
    "indore",
    "thane",
    "bhopal",
    "visakhapatnam",
    "pimpri",
    "patna",
    "vadodara",
    "ghaziabad",
    "ludhiana",
    "agra",
    "nashik",
    "faridabad",
    "meerut",
    "rajkot",
    "kalyan",
    "vasai",
    "varanasi",
    "srinagar",
    "aurangabad",
    "dhanbad",
    "amritsar",
    "navi mumbai",
    "allahabad",
    "ranchi",
    "howrah",
    "coimbatore",
    "jabalpur",
    "gwalior",
    "vijayawada",
    "jodhpur",
    "madurai",
    "raipur",
    "kota",
    "chandigarh",
    "guwahati",
    "solapur",
    "hubli",
];

/// Assessment blocks whose names differ from their district.  Longer
/// variants precede their prefixes ("ludhiana-ii" before "ludhiana-i").
pub const BLOCKS: &[&str] = &[
    "ajnala",
    "amritsar-i",
    "ludhiana-ii",
    "ludhiana-i",
    "hisar-i",
    "jaipur-ii",
    "jaipur-i",
    "ahmedabad city",
    "pune city",
    "andheri",
    "bangalore north",
    "bangalore south",
    "barasat",
    "itanagar",
    "bomdila",
    "panaji",
    "margao",
    "dharamshala",
    "shillong",
    "bhubaneswar",
    "gangtok",
    "geyzing",
    "agartala",
];

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

/// Locations recognized in one query.  All names are lowercase gazetteer
/// entries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedLocation {
    pub state: Option<String>,
    pub district: Option<String>,
    pub block: Option<String>,
}

impl ExtractedLocation {
    /// Number of populated fields.
    pub fn found(&self) -> usize {
        [&self.state, &self.district, &self.block]
            .iter()
            .filter(|f| f.is_some())
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.found() == 0
    }

    /// The most specific-to-least-specific preference used for display:
    /// state, then district, then block.
    pub fn primary(&self) -> Option<&str> {
        self.state
            .as_deref()
            .or(self.district.as_deref())
            .or(self.block.as_deref())
    }
}

/// A fixed list of names compiled for substring search.
pub struct Gazetteer {
    kind: &'static str,
    names: &'static [&'static str],
    automaton: AhoCorasick,
}

impl Gazetteer {
    /// Compile `names` into a search automaton.
    pub fn new(kind: &'static str, names: &'static [&'static str]) -> Result<Self> {
        let automaton = AhoCorasick::new(names).map_err(|e| IntentError::GazetteerBuild {
            kind,
            reason: e.to_string(),
        })?;
        tracing::trace!(kind, count = names.len(), "gazetteer compiled");
        Ok(Self {
            kind,
            names,
            automaton,
        })
    }

    pub fn kind(&self) -> &'static str {
        self.kind
    }

    pub fn names(&self) -> &'static [&'static str] {
        self.names
    }

    /// The entry with the lowest gazetteer index occurring anywhere in
    /// `text`.
    pub fn first_match(&self, text: &str) -> Option<&'static str> {
        self.automaton
            .find_overlapping_iter(text)
            .map(|m| m.pattern().as_usize())
            .min()
            .map(|idx| self.names[idx])
    }

    /// Like [`Gazetteer::first_match`], but an occurrence only counts when it
    /// is not embedded in a longer word.
    pub fn first_whole_word_match(&self, text: &str) -> Option<&'static str> {
        self.automaton
            .find_overlapping_iter(text)
            .filter(|m| is_word_bounded(text, m.start(), m.end()))
            .map(|m| m.pattern().as_usize())
            .min()
            .map(|idx| self.names[idx])
    }

    /// The first entry (in gazetteer order) whose edit-distance similarity to
    /// `token` exceeds `threshold`.
    pub fn closest_above(&self, token: &str, threshold: f64) -> Option<&'static str> {
        self.names
            .iter()
            .copied()
            .find(|name| levenshtein_similarity(token, name) > threshold)
    }
}

impl std::fmt::Debug for Gazetteer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Gazetteer")
            .field("kind", &self.kind)
            .field("entries", &self.names.len())
            .finish()
    }
}

fn is_word_bounded(text: &str, start: usize, end: usize) -> bool {
    let before = text[..start].chars().next_back();
    let after = text[end..].chars().next();
    !before.is_some_and(char::is_alphanumeric) && !after.is_some_and(char::is_alphanumeric)
}

// ---------------------------------------------------------------------------
// LocationExtractor
// ---------------------------------------------------------------------------

/// Recognizes states, districts and blocks in normalized queries.
#[derive(Debug)]
pub struct LocationExtractor {
    states: Gazetteer,
    districts: Gazetteer,
    blocks: Gazetteer,
}

impl LocationExtractor {
    /// Build an extractor over the built-in gazetteers.
    pub fn new() -> Result<Self> {
        Ok(Self {
            states: Gazetteer::new("state", STATES)?,
            districts: Gazetteer::new("district", DISTRICTS)?,
            blocks: Gazetteer::new("block", BLOCKS)?,
        })
    }

    /// Extract locations from a raw query.
    pub fn extract_raw(&self, raw: &str) -> ExtractedLocation {
        self.extract(&normalize(raw))
    }

    /// Extract locations from an already normalized query.
    pub fn extract(&self, text: &NormalizedText) -> ExtractedLocation {
        let lower = text.lower.as_str();

        let mut location = ExtractedLocation {
            state: self.states.first_match(lower).map(str::to_owned),
            district: self.districts.first_match(lower).map(str::to_owned),
            block: self.blocks.first_whole_word_match(lower).map(str::to_owned),
        };

        if location.state.is_none() && location.district.is_none() {
            location.state = text
                .tokens
                .iter()
                .find_map(|token| self.states.closest_above(token, FUZZY_STATE_THRESHOLD))
                .map(str::to_owned);

            if let Some(state) = &location.state {
                tracing::debug!(state = %state, "state matched by edit distance");
            }
        }

        tracing::trace!(
            state = ?location.state,
            district = ?location.district,
            block = ?location.block,
            "locations extracted"
        );

        location
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn extractor() -> LocationExtractor {
        LocationExtractor::new().unwrap()
    }

    #[test]
    fn exact_state() {
        let loc = extractor().extract_raw("Show me Punjab data");
        assert_eq!(loc.state.as_deref(), Some("punjab"));
        assert_eq!(loc.district, None);
        assert_eq!(loc.found(), 1);
    }

    #[test]
    fn gazetteer_order_beats_text_order() {
        let loc = extractor().extract_raw("Compare Punjab and Haryana");
        assert_eq!(loc.state.as_deref(), Some("haryana"));
    }

    #[test]
    fn state_and_district_together() {
        let loc = extractor().extract_raw("Groundwater in Pune, Maharashtra");
        assert_eq!(loc.state.as_deref(), Some("maharashtra"));
        assert_eq!(loc.district.as_deref(), Some("pune"));
        assert_eq!(loc.found(), 2);
        assert_eq!(loc.primary(), Some("maharashtra"));
    }

    #[test]
    fn delhi_is_both_state_and_city() {
        let loc = extractor().extract_raw("water level in delhi");
        assert_eq!(loc.state.as_deref(), Some("delhi"));
        assert_eq!(loc.district.as_deref(), Some("delhi"));
    }

    #[test]
    fn fuzzy_state_fallback() {
        let ex = extractor();
        assert_eq!(
            ex.extract_raw("Show me Panjab data").state.as_deref(),
            Some("punjab")
        );
        assert_eq!(
            ex.extract_raw("Groundwater in Maharashtr").state.as_deref(),
            Some("maharashtra")
        );
    }

    #[test]
    fn fuzzy_fallback_skipped_when_district_found() {
        // "panjab" would fuzzy-match, but a district was found exactly.
        let loc = extractor().extract_raw("panjab amritsar");
        assert_eq!(loc.state, None);
        assert_eq!(loc.district.as_deref(), Some("amritsar"));
    }

    #[test]
    fn blocks_require_word_boundaries() {
        let ex = extractor();
        let loc = ex.extract_raw("Ajnala block status");
        assert_eq!(loc.block.as_deref(), Some("ajnala"));

        let loc = ex.extract_raw("status of ludhiana-ii");
        assert_eq!(loc.block.as_deref(), Some("ludhiana-ii"));
        assert_eq!(loc.district.as_deref(), Some("ludhiana"));

        let loc = ex.extract_raw("the margaon road");
        assert_eq!(loc.block, None);
    }

    #[test]
    fn nothing_found() {
        let loc = extractor().extract_raw("asdf qwerty");
        assert!(loc.is_empty());
        assert_eq!(loc.primary(), None);
    }
}
