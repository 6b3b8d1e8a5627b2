//! Groundwater assessment dataset.
//!
//! An in-memory table of block-level assessment records in the style of the
//! CGWB dynamic groundwater resource reports.  Every record carries the
//! annual extraction and recharge volumes (million cubic metres), the stage
//! of extraction (extraction as a percentage of recharge availability) and
//! the resulting [`Category`].
//!
//! Location lookups are memoized in a [`moka`] cache; the table itself is
//! immutable after construction.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use moka::sync::Cache;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::StoreError;

/// Number of distinct lookups kept memoized.
const LOOKUP_MEMO_CAPACITY: u64 = 512;

// ═══════════════════════════════════════════════════════════════════════
//  Types
// ═══════════════════════════════════════════════════════════════════════

/// CGWB assessment category, ordered from least to most stressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Category {
    Safe,
    #[serde(rename = "Semi-Critical")]
    SemiCritical,
    Critical,
    #[serde(rename = "Over-Exploited")]
    OverExploited,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Safe,
        Category::SemiCritical,
        Category::Critical,
        Category::OverExploited,
    ];

    /// The label used in assessment reports.
    pub fn label(self) -> &'static str {
        match self {
            Category::Safe => "Safe",
            Category::SemiCritical => "Semi-Critical",
            Category::Critical => "Critical",
            Category::OverExploited => "Over-Exploited",
        }
    }

    /// Critical or over-exploited.
    pub fn is_stressed(self) -> bool {
        matches!(self, Category::Critical | Category::OverExploited)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Category {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace([' ', '_'], "-");
        match normalized.as_str() {
            "safe" => Ok(Category::Safe),
            "semi-critical" => Ok(Category::SemiCritical),
            "critical" => Ok(Category::Critical),
            "over-exploited" => Ok(Category::OverExploited),
            _ => Err(StoreError::InvalidArgument(format!("unknown category: {s}"))),
        }
    }
}

/// One block-level assessment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroundwaterRecord {
    pub state: String,
    pub district: String,
    pub block: String,
    pub category: Category,
    pub annual_extraction: f64,
    pub annual_recharge: f64,
    /// Extraction as a percentage of annual extractable resource.
    pub stage_of_extraction: f64,
    pub year: u16,
}

/// The location-data lookup the engine consumes.
pub trait LocationLookup: Send + Sync {
    /// Records matching every supplied field, in table order.  Matching is
    /// case-insensitive.  With no field supplied the result is empty.
    fn lookup(
        &self,
        state: Option<&str>,
        district: Option<&str>,
        block: Option<&str>,
    ) -> Vec<GroundwaterRecord>;
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct LookupKey {
    state: Option<String>,
    district: Option<String>,
    block: Option<String>,
}

impl LookupKey {
    fn new(state: Option<&str>, district: Option<&str>, block: Option<&str>) -> Self {
        let norm = |v: Option<&str>| {
            v.map(|s| s.trim().to_lowercase())
                .filter(|s| !s.is_empty())
        };
        Self {
            state: norm(state),
            district: norm(district),
            block: norm(block),
        }
    }

    fn is_empty(&self) -> bool {
        self.state.is_none() && self.district.is_none() && self.block.is_none()
    }
}

// ═══════════════════════════════════════════════════════════════════════
//  GroundwaterDataset
// ═══════════════════════════════════════════════════════════════════════

/// Immutable assessment table with memoized location lookups.
pub struct GroundwaterDataset {
    records: Vec<GroundwaterRecord>,
    memo: Cache<LookupKey, Arc<Vec<GroundwaterRecord>>>,
}

impl GroundwaterDataset {
    /// Wrap an arbitrary record table.
    pub fn new(records: Vec<GroundwaterRecord>) -> Self {
        debug!(records = records.len(), "groundwater dataset loaded");
        Self {
            records,
            memo: Cache::new(LOOKUP_MEMO_CAPACITY),
        }
    }

    /// The bundled sample assessments (2021–2023).
    pub fn sample() -> Self {
        Self::new(SAMPLE_ROWS.iter().map(SampleRow::to_record).collect())
    }

    pub fn records(&self) -> &[GroundwaterRecord] {
        &self.records
    }

    /// All records in `category`, in table order.
    pub fn by_category(&self, category: Category) -> Vec<GroundwaterRecord> {
        self.records
            .iter()
            .filter(|r| r.category == category)
            .cloned()
            .collect()
    }

    /// The most recent assessment year in the table.
    pub fn latest_year(&self) -> Option<u16> {
        self.records.iter().map(|r| r.year).max()
    }

    /// Critical and over-exploited records of the latest assessment year,
    /// most stressed first.
    pub fn critical_areas(&self) -> Vec<GroundwaterRecord> {
        let Some(latest) = self.latest_year() else {
            return Vec::new();
        };
        let mut areas: Vec<GroundwaterRecord> = self
            .records
            .iter()
            .filter(|r| r.year == latest && r.category.is_stressed())
            .cloned()
            .collect();
        areas.sort_by(|a, b| b.stage_of_extraction.total_cmp(&a.stage_of_extraction));
        areas
    }

    /// Records for one location across all years, oldest first.
    pub fn historical_trend(
        &self,
        state: &str,
        district: Option<&str>,
        block: Option<&str>,
    ) -> Vec<GroundwaterRecord> {
        let mut records = self.lookup(Some(state), district, block);
        records.sort_by_key(|r| r.year);
        records
    }

    /// Number of distinct states.
    pub fn total_states(&self) -> usize {
        let mut states: Vec<String> = self.records.iter().map(|r| r.state.to_lowercase()).collect();
        states.sort();
        states.dedup();
        states.len()
    }

    /// Number of assessment records.
    pub fn total_assessments(&self) -> usize {
        self.records.len()
    }

    /// Number of stressed blocks in the latest assessment year.
    pub fn critical_block_count(&self) -> usize {
        self.critical_areas().len()
    }

    fn scan(&self, key: &LookupKey) -> Vec<GroundwaterRecord> {
        self.records
            .iter()
            .filter(|r| {
                field_matches(&r.state, key.state.as_deref())
                    && district_matches(&r.district, key.district.as_deref())
                    && field_matches(&r.block, key.block.as_deref())
            })
            .cloned()
            .collect()
    }
}

impl LocationLookup for GroundwaterDataset {
    fn lookup(
        &self,
        state: Option<&str>,
        district: Option<&str>,
        block: Option<&str>,
    ) -> Vec<GroundwaterRecord> {
        let key = LookupKey::new(state, district, block);
        if key.is_empty() {
            return Vec::new();
        }

        if let Some(hit) = self.memo.get(&key) {
            debug!(?key, "dataset lookup memo hit");
            return hit.as_ref().clone();
        }

        let found = Arc::new(self.scan(&key));
        debug!(?key, records = found.len(), "dataset lookup");
        self.memo.insert(key, Arc::clone(&found));
        found.as_ref().clone()
    }
}

impl fmt::Debug for GroundwaterDataset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GroundwaterDataset")
            .field("records", &self.records.len())
            .finish_non_exhaustive()
    }
}

fn field_matches(value: &str, wanted: Option<&str>) -> bool {
    wanted.is_none_or(|w| value.eq_ignore_ascii_case(w))
}

/// Districts also match by leading word, so "bangalore" finds
/// "Bangalore Urban" and "kanpur" finds "Kanpur Nagar".
fn district_matches(value: &str, wanted: Option<&str>) -> bool {
    wanted.is_none_or(|w| {
        let value = value.to_lowercase();
        value == w
            || value
                .strip_prefix(w)
                .is_some_and(|rest| rest.starts_with(' '))
    })
}

// ═══════════════════════════════════════════════════════════════════════
//  Sample data
// ═══════════════════════════════════════════════════════════════════════

struct SampleRow {
    state: &'static str,
    district: &'static str,
    block: &'static str,
    category: Category,
    extraction: f64,
    recharge: f64,
    stage: f64,
    year: u16,
}

impl SampleRow {
    fn to_record(&self) -> GroundwaterRecord {
        GroundwaterRecord {
            state: self.state.to_string(),
            district: self.district.to_string(),
            block: self.block.to_string(),
            category: self.category,
            annual_extraction: self.extraction,
            annual_recharge: self.recharge,
            stage_of_extraction: self.stage,
            year: self.year,
        }
    }
}

#[allow(clippy::too_many_arguments)]
const fn row(
    state: &'static str,
    district: &'static str,
    block: &'static str,
    category: Category,
    extraction: f64,
    recharge: f64,
    stage: f64,
    year: u16,
) -> SampleRow {
    SampleRow {
        state,
        district,
        block,
        category,
        extraction,
        recharge,
        stage,
        year,
    }
}

use Category::{Critical, OverExploited, Safe, SemiCritical};

static SAMPLE_ROWS: &[SampleRow] = &[
    row("Punjab", "Amritsar", "Ajnala", OverExploited, 156.8, 89.2, 178.5, 2023),
    row("Punjab", "Amritsar", "Amritsar-I", OverExploited, 145.2, 82.1, 165.8, 2023),
    row("Punjab", "Ludhiana", "Ludhiana-I", OverExploited, 198.7, 112.3, 225.4, 2023),
    row("Punjab", "Ludhiana", "Ludhiana-II", Critical, 134.5, 98.7, 142.1, 2023),
    row("Punjab", "Bathinda", "Bathinda", OverExploited, 167.9, 95.4, 189.2, 2023),
    row("Haryana", "Kurukshetra", "Kurukshetra", SemiCritical, 89.4, 67.8, 95.2, 2023),
    row("Haryana", "Karnal", "Karnal", Safe, 78.5, 89.4, 67.8, 2023),
    row("Haryana", "Hisar", "Hisar-I", Critical, 145.7, 89.2, 156.8, 2023),
    row("Haryana", "Sirsa", "Sirsa", OverExploited, 178.9, 98.7, 198.4, 2023),
    row("Rajasthan", "Jaipur", "Jaipur-I", Safe, 67.8, 78.9, 56.7, 2023),
    row("Rajasthan", "Jaipur", "Jaipur-II", Safe, 72.4, 82.1, 61.3, 2023),
    row("Rajasthan", "Jodhpur", "Jodhpur", SemiCritical, 89.7, 67.4, 98.2, 2023),
    row("Rajasthan", "Bikaner", "Bikaner", Safe, 45.6, 56.8, 34.2, 2023),
    row("Rajasthan", "Alwar", "Alwar", Critical, 134.8, 89.7, 145.6, 2023),
    row("Gujarat", "Ahmedabad", "Ahmedabad City", Critical, 156.7, 112.4, 167.8, 2023),
    row("Gujarat", "Surat", "Surat", SemiCritical, 98.4, 78.9, 105.6, 2023),
    row("Gujarat", "Vadodara", "Vadodara", Safe, 78.9, 89.4, 67.2, 2023),
    row("Gujarat", "Rajkot", "Rajkot", SemiCritical, 89.7, 67.8, 98.4, 2023),
    row("Maharashtra", "Pune", "Pune City", Critical, 145.6, 98.7, 156.8, 2023),
    row("Maharashtra", "Mumbai Suburban", "Andheri", Safe, 56.7, 67.8, 45.6, 2023),
    row("Maharashtra", "Nashik", "Nashik", SemiCritical, 89.4, 78.9, 95.7, 2023),
    row("Maharashtra", "Aurangabad", "Aurangabad", Critical, 134.7, 89.2, 145.8, 2023),
    row("Tamil Nadu", "Chennai", "Chennai", Critical, 167.8, 112.4, 178.9, 2023),
    row("Tamil Nadu", "Coimbatore", "Coimbatore", SemiCritical, 98.7, 78.4, 105.8, 2023),
    row("Tamil Nadu", "Madurai", "Madurai", Safe, 67.8, 78.9, 56.4, 2023),
    row("Tamil Nadu", "Salem", "Salem", SemiCritical, 89.7, 67.2, 98.5, 2023),
    row("Karnataka", "Bangalore Urban", "Bangalore North", Critical, 156.8, 112.7, 167.9, 2023),
    row("Karnataka", "Bangalore Urban", "Bangalore South", Critical, 145.7, 98.4, 156.2, 2023),
    row("Karnataka", "Mysore", "Mysore", Safe, 78.4, 89.7, 67.8, 2023),
    row("Karnataka", "Hubli", "Hubli", SemiCritical, 89.2, 67.8, 95.4, 2023),
    row("Uttar Pradesh", "Lucknow", "Lucknow", SemiCritical, 98.7, 78.9, 105.6, 2023),
    row("Uttar Pradesh", "Kanpur Nagar", "Kanpur", Critical, 134.8, 89.4, 145.7, 2023),
    row("Uttar Pradesh", "Agra", "Agra", SemiCritical, 89.7, 67.8, 98.2, 2023),
    row("Uttar Pradesh", "Varanasi", "Varanasi", Safe, 67.4, 78.2, 56.8, 2023),
    row("West Bengal", "Kolkata", "Kolkata", Safe, 56.8, 67.4, 45.2, 2023),
    row("West Bengal", "Howrah", "Howrah", Safe, 67.2, 78.4, 56.7, 2023),
    row("West Bengal", "North 24 Parganas", "Barasat", Safe, 78.4, 89.2, 67.8, 2023),
    row("Andhra Pradesh", "Visakhapatnam", "Visakhapatnam", Safe, 78.9, 89.4, 67.2, 2023),
    row("Andhra Pradesh", "Vijayawada", "Vijayawada", SemiCritical, 89.7, 67.8, 98.4, 2023),
    row("Andhra Pradesh", "Guntur", "Guntur", Critical, 134.5, 89.7, 145.2, 2023),
    row("Punjab", "Amritsar", "Ajnala", OverExploited, 152.4, 87.8, 174.2, 2022),
    row("Punjab", "Ludhiana", "Ludhiana-I", OverExploited, 194.3, 108.9, 221.7, 2022),
    row("Haryana", "Karnal", "Karnal", Safe, 76.2, 87.1, 65.4, 2022),
    row("Rajasthan", "Jaipur", "Jaipur-I", Safe, 65.4, 76.5, 54.3, 2022),
    row("Gujarat", "Ahmedabad", "Ahmedabad City", Critical, 152.3, 108.7, 163.4, 2022),
    row("Punjab", "Amritsar", "Ajnala", OverExploited, 148.7, 85.4, 169.8, 2021),
    row("Punjab", "Ludhiana", "Ludhiana-I", OverExploited, 189.6, 105.2, 217.3, 2021),
    row("Haryana", "Karnal", "Karnal", Safe, 74.8, 84.7, 63.2, 2021),
    row("Rajasthan", "Jaipur", "Jaipur-I", Safe, 63.2, 74.1, 52.7, 2021),
    row("Arunachal Pradesh", "Papum Pare", "Itanagar", Safe, 45.6, 34.2, 56.8, 2023),
    row("Arunachal Pradesh", "West Kameng", "Bomdila", Safe, 42.3, 31.8, 53.7, 2023),
    row("Assam", "Kamrup", "Guwahati", SemiCritical, 78.9, 89.2, 67.4, 2023),
    row("Assam", "Jorhat", "Jorhat", Safe, 67.8, 56.4, 78.9, 2023),
    row("Bihar", "Patna", "Patna", Critical, 134.5, 145.6, 123.4, 2023),
    row("Bihar", "Gaya", "Gaya", SemiCritical, 89.7, 98.4, 78.9, 2023),
    row("Chhattisgarh", "Raipur", "Raipur", Safe, 67.8, 56.7, 78.9, 2023),
    row("Chhattisgarh", "Bilaspur", "Bilaspur", SemiCritical, 89.4, 78.9, 95.7, 2023),
    row("Goa", "North Goa", "Panaji", Safe, 45.6, 34.2, 56.8, 2023),
    row("Goa", "South Goa", "Margao", Safe, 42.3, 31.8, 53.7, 2023),
    row("Himachal Pradesh", "Shimla", "Shimla", Safe, 56.7, 45.6, 67.8, 2023),
    row("Himachal Pradesh", "Kangra", "Dharamshala", SemiCritical, 78.9, 89.4, 67.2, 2023),
    row("Jharkhand", "Ranchi", "Ranchi", Critical, 145.6, 156.7, 134.5, 2023),
    row("Jharkhand", "Jamshedpur", "Jamshedpur", SemiCritical, 98.7, 89.4, 105.6, 2023),
    row("Kerala", "Thiruvananthapuram", "Thiruvananthapuram", Safe, 67.8, 56.4, 78.9, 2023),
    row("Kerala", "Kochi", "Kochi", SemiCritical, 89.7, 78.9, 95.4, 2023),
    row("Madhya Pradesh", "Bhopal", "Bhopal", Critical, 156.7, 167.8, 145.6, 2023),
    row("Madhya Pradesh", "Indore", "Indore", SemiCritical, 98.4, 89.7, 105.6, 2023),
    row("Manipur", "Imphal West", "Imphal", Safe, 45.6, 34.2, 56.8, 2023),
    row("Manipur", "Imphal East", "Imphal", Safe, 42.3, 31.8, 53.7, 2023),
    row("Meghalaya", "East Khasi Hills", "Shillong", Safe, 56.7, 45.6, 67.8, 2023),
    row("Meghalaya", "West Garo Hills", "Tura", SemiCritical, 78.9, 89.4, 67.2, 2023),
    row("Mizoram", "Aizawl", "Aizawl", Safe, 45.6, 34.2, 56.8, 2023),
    row("Mizoram", "Lunglei", "Lunglei", Safe, 42.3, 31.8, 53.7, 2023),
    row("Nagaland", "Kohima", "Kohima", Safe, 56.7, 45.6, 67.8, 2023),
    row("Nagaland", "Dimapur", "Dimapur", SemiCritical, 78.9, 89.4, 67.2, 2023),
    row("Odisha", "Khordha", "Bhubaneswar", Safe, 67.8, 56.4, 78.9, 2023),
    row("Odisha", "Cuttack", "Cuttack", SemiCritical, 89.7, 78.9, 95.4, 2023),
    row("Sikkim", "East Sikkim", "Gangtok", Safe, 45.6, 34.2, 56.8, 2023),
    row("Sikkim", "West Sikkim", "Geyzing", Safe, 42.3, 31.8, 53.7, 2023),
    row("Telangana", "Hyderabad", "Hyderabad", Critical, 156.7, 167.8, 145.6, 2023),
    row("Telangana", "Warangal", "Warangal", SemiCritical, 98.4, 89.7, 105.6, 2023),
    row("Tripura", "West Tripura", "Agartala", Safe, 56.7, 45.6, 67.8, 2023),
    row("Tripura", "South Tripura", "Udaipur", SemiCritical, 78.9, 89.4, 67.2, 2023),
    row("Uttarakhand", "Dehradun", "Dehradun", Safe, 67.8, 56.4, 78.9, 2023),
    row("Uttarakhand", "Haridwar", "Haridwar", SemiCritical, 89.7, 78.9, 95.4, 2023),
];

// ═══════════════════════════════════════════════════════════════════════
//  Tests
// ═══════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_is_case_insensitive_and_ordered() {
        let data = GroundwaterDataset::sample();
        let punjab = data.lookup(Some("PUNJAB"), None, None);
        assert!(!punjab.is_empty());
        assert!(punjab.iter().all(|r| r.state == "Punjab"));
        assert_eq!(punjab[0].block, "Ajnala");
        assert_eq!(punjab[0].year, 2023);
    }

    #[test]
    fn lookup_narrows_by_district_and_block() {
        let data = GroundwaterDataset::sample();
        let amritsar = data.lookup(Some("punjab"), Some("amritsar"), None);
        assert!(amritsar.iter().all(|r| r.district == "Amritsar"));

        let ajnala = data.lookup(None, None, Some("ajnala"));
        assert_eq!(ajnala.len(), 3);
    }

    #[test]
    fn district_matches_leading_word() {
        let data = GroundwaterDataset::sample();
        let bangalore = data.lookup(None, Some("bangalore"), None);
        assert_eq!(bangalore.len(), 2);
        assert!(data.lookup(None, Some("bang"), None).is_empty());
    }

    #[test]
    fn empty_lookup_returns_nothing() {
        let data = GroundwaterDataset::sample();
        assert!(data.lookup(None, None, None).is_empty());
        assert!(data.lookup(Some("  "), None, None).is_empty());
        assert!(data.lookup(Some("atlantis"), None, None).is_empty());
    }

    #[test]
    fn memoized_lookup_matches_scan() {
        let data = GroundwaterDataset::sample();
        let first = data.lookup(Some("haryana"), None, None);
        let second = data.lookup(Some("Haryana"), None, None);
        assert_eq!(first, second);
    }

    #[test]
    fn historical_trend_is_sorted_by_year() {
        let data = GroundwaterDataset::sample();
        let trend = data.historical_trend("punjab", Some("amritsar"), Some("ajnala"));
        let years: Vec<u16> = trend.iter().map(|r| r.year).collect();
        assert_eq!(years, vec![2021, 2022, 2023]);
    }

    #[test]
    fn critical_areas_are_stressed_and_latest() {
        let data = GroundwaterDataset::sample();
        let areas = data.critical_areas();
        assert!(!areas.is_empty());
        assert!(areas.iter().all(|r| r.category.is_stressed() && r.year == 2023));
        assert!(
            areas
                .windows(2)
                .all(|w| w[0].stage_of_extraction >= w[1].stage_of_extraction)
        );
        assert_eq!(data.critical_block_count(), areas.len());
    }

    #[test]
    fn totals() {
        let data = GroundwaterDataset::sample();
        assert_eq!(data.total_assessments(), data.records().len());
        assert!(data.total_states() >= 25);
        assert_eq!(data.latest_year(), Some(2023));
    }

    #[test]
    fn by_category_filters() {
        let data = GroundwaterDataset::sample();
        let safe = data.by_category(Category::Safe);
        assert!(!safe.is_empty());
        assert!(safe.iter().all(|r| r.category == Category::Safe));
    }

    #[test]
    fn category_parsing_and_serde() {
        assert_eq!("Over-Exploited".parse::<Category>().unwrap(), Category::OverExploited);
        assert_eq!("semi critical".parse::<Category>().unwrap(), Category::SemiCritical);
        assert!("fine".parse::<Category>().is_err());

        let json = serde_json::to_string(&Category::SemiCritical).unwrap();
        assert_eq!(json, "\"Semi-Critical\"");
        assert!(Category::OverExploited > Category::Safe);
    }
}
