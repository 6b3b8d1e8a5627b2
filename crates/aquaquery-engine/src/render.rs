//! Response rendering.
//!
//! The engine hands the classified intent, the primary location and any
//! matching assessment records to a [`ResponseRenderer`].  The default
//! [`TemplateRenderer`] combines canned texts with summaries computed from
//! the [`GroundwaterDataset`].

use std::fmt::Write as _;
use std::sync::Arc;

use aquaquery_intent::Intent;
use aquaquery_store::{Category, GroundwaterDataset, GroundwaterRecord};

/// Fixed reply for rejected (empty) queries.
pub const REJECTION_MESSAGE: &str = "Please provide a valid query.";

/// Reply attached to low-confidence results.
pub const CLARIFICATION_TEXT: &str = "I'm not entirely sure I understood your query correctly. \
Could you please rephrase or provide more specific details?";

/// Reply for queries that failed internally.
pub const FAILURE_MESSAGE: &str =
    "Sorry, something went wrong while processing your query. Please try again.";

/// Turns a classification into display text.
pub trait ResponseRenderer: Send + Sync {
    fn render(
        &self,
        intent: Intent,
        location: Option<&str>,
        details: &[GroundwaterRecord],
    ) -> String;
}

// ---------------------------------------------------------------------------
// Canned texts
// ---------------------------------------------------------------------------

const GREETING: &str = "Namaste! I'm your INGRES groundwater assistant. I can help you with:\n\
* Groundwater data for any location\n\
* Critical and over-exploited areas\n\
* Historical trends and comparisons\n\
* Policy recommendations\n\n\
Try asking: 'Show me Punjab groundwater data' or 'Which areas are critical?'";

const GOODBYE: &str =
    "Thank you for using INGRES ChatBot! Stay informed about groundwater resources.";

const THANKS: &str = "You're welcome! Ask me anything else about groundwater resources.";

const HELP: &str = "INGRES ChatBot Help:\n\n\
[LOC] Location Queries: 'Show me [state/district] data'\n\
[CRIT] Critical Areas: 'Show critical areas' or 'Over-exploited regions'\n\
[COMP] Comparisons: 'Compare Punjab and Haryana'\n\
[TREND] Trends: 'Historical trend for Maharashtra'\n\
[CRISIS] Water Crisis: 'Areas facing water shortage'\n\
[RAIN] Rainfall Impact: 'How does rainfall affect groundwater?'\n\
[POLICY] Policy Help: 'Policy suggestions for [location]'\n\n\
Example: 'What is the groundwater status of Amritsar?'";

const LOCATION_PROMPT: &str = "Please specify a location. Example:\n\
* 'Show me Punjab groundwater data'\n\
* 'Groundwater status of Amritsar'\n\
* 'Data for Maharashtra'";

const CATEGORY_GUIDE: &str = "[CATEGORY] GROUNDWATER CLASSIFICATION SYSTEM:\n\n\
CGWB CATEGORIES (Based on Stage of Extraction):\n\n\
[SAFE] <70% extraction:\n\
* Sustainable groundwater usage\n\
* No restrictions on new bore wells\n\n\
[SEMI-CRITICAL] 70-90% extraction:\n\
* Moderate stress on groundwater\n\
* Regulated development needed\n\n\
[CRITICAL] 90-100% extraction:\n\
* High stress, immediate action needed\n\
* Strict regulations required\n\n\
[OVER-EXPLOITED] >100% extraction:\n\
* Groundwater mining occurring\n\
* Ban on new extractions";

const WATER_CRISIS: &str = "[CRISIS] WATER CRISIS ALERT AREAS:\n\n\
IMMEDIATE ATTENTION NEEDED:\n\
* Punjab (Central): 78% blocks over-exploited\n\
* Haryana (Southwest): Rapid depletion rate\n\
* Tamil Nadu (Chennai): Urban water stress\n\
* Karnataka (Bangalore): IT sector impact\n\n\
CRISIS INDICATORS:\n\
* Declining water table: 0.5-2m annually\n\
* Industrial over-extraction\n\
* Intensive agriculture in arid regions\n\n\
URGENT ACTIONS: Rainwater harvesting, drip irrigation, policy enforcement";

const RAINFALL: &str = "[RAINFALL] RAINFALL-GROUNDWATER CORRELATION:\n\n\
MONSOON IMPACT:\n\
* Good Monsoon (>110% normal): +15-25% recharge\n\
* Normal Monsoon (90-110%): Stable recharge\n\
* Poor Monsoon (<90%): -20-40% recharge\n\n\
REGIONAL PATTERNS:\n\
* Western Ghats: High recharge efficiency (60-80%)\n\
* Gangetic Plains: Moderate efficiency (40-60%)\n\
* Arid Regions: Low efficiency (10-30%)\n\n\
NOTE: Climate change is affecting traditional recharge patterns!";

const POLICY_GENERAL: &str = "[POLICY] GENERAL GROUNDWATER POLICY FRAMEWORK:\n\n\
NATIONAL LEVEL:\n\
* National Water Policy implementation\n\
* CGWB guidelines enforcement\n\
* Inter-state water sharing agreements\n\n\
STATE LEVEL:\n\
* Groundwater regulation acts\n\
* Water conservation incentives\n\
* Agricultural policy reforms\n\n\
Specify a location for targeted recommendations!";

const POLICY_LOCAL_BODY: &str = "IMMEDIATE MEASURES:\n\
* Mandatory rainwater harvesting for buildings >300 sq.m\n\
* Groundwater extraction permits with annual limits\n\
* Subsidies for drip irrigation systems\n\n\
MEDIUM-TERM STRATEGIES:\n\
* Crop diversification from water-intensive crops\n\
* Industrial water recycling mandates\n\
* Community-based water management\n\n\
MONITORING:\n\
* Real-time groundwater level monitoring\n\
* Annual assessment updates\n\
* Public awareness campaigns";

const CONSERVATION: &str = "[CONSERVE] WATER CONSERVATION METHODS:\n\n\
* Rooftop rainwater harvesting and recharge pits\n\
* Drip and sprinkler irrigation\n\
* Check dams and percolation tanks\n\
* Crop diversification away from paddy in stressed blocks\n\
* Wastewater recycling for industry";

const UNKNOWN: &str = "[HELP] I didn't quite understand that. I can help with:\n\n\
* 'Show me [location] groundwater data'\n\
* 'Which areas are critical?'\n\
* 'Compare [state1] and [state2]'\n\
* 'Policy suggestions for [location]'\n\
* 'Areas facing water crisis'\n\n\
Try rephrasing your question or type 'help' for more options.";

// ---------------------------------------------------------------------------
// TemplateRenderer
// ---------------------------------------------------------------------------

/// Canned texts plus data-driven summaries over a [`GroundwaterDataset`].
pub struct TemplateRenderer {
    dataset: Arc<GroundwaterDataset>,
}

impl TemplateRenderer {
    pub fn new(dataset: Arc<GroundwaterDataset>) -> Self {
        Self { dataset }
    }

    fn location_report(&self, location: Option<&str>, details: &[GroundwaterRecord]) -> String {
        let Some(loc) = location else {
            return LOCATION_PROMPT.to_string();
        };
        if details.is_empty() {
            return format!(
                "[SEARCH] No assessment data found for {}.\n\n{LOCATION_PROMPT}",
                title_case(loc)
            );
        }
        summarize(&title_case(loc), details)
    }

    fn category_list(&self, title: &str, categories: &[Category]) -> String {
        let latest = self.dataset.latest_year();
        let mut records: Vec<GroundwaterRecord> = self
            .dataset
            .records()
            .iter()
            .filter(|r| Some(r.year) == latest && categories.contains(&r.category))
            .cloned()
            .collect();
        records.sort_by(|a, b| b.stage_of_extraction.total_cmp(&a.stage_of_extraction));

        let mut out = format!("{title} (Assessment {}):\n\n", latest.unwrap_or_default());
        if records.is_empty() {
            out.push_str("No matching assessment units in the current dataset.");
            return out;
        }
        for category in categories {
            let group: Vec<&GroundwaterRecord> =
                records.iter().filter(|r| r.category == *category).collect();
            if group.is_empty() {
                continue;
            }
            let _ = writeln!(out, "[{}]:", category.label().to_uppercase());
            for r in group {
                let _ = writeln!(
                    out,
                    "* {}: {} ({:.1}% extraction)",
                    r.state, r.district, r.stage_of_extraction
                );
            }
            out.push('\n');
        }
        out.truncate(out.trim_end().len());
        out
    }

    fn critical_areas(&self) -> String {
        let mut out = self.category_list(
            "[ALERT] CRITICAL GROUNDWATER AREAS",
            &[Category::OverExploited, Category::Critical],
        );
        out.push_str("\n\nNOTE: These areas need immediate water conservation measures!");
        out
    }

    fn trend(&self, location: Option<&str>, details: &[GroundwaterRecord]) -> String {
        let Some(loc) = location.filter(|_| !details.is_empty()) else {
            return "[TREND] HISTORICAL GROUNDWATER TRENDS:\n\n\
                    Specify a location for detailed trend analysis, e.g. \
                    'Historical trend for Maharashtra'."
                .to_string();
        };
        let mut by_year: Vec<(u16, f64, usize)> = Vec::new();
        let mut sorted: Vec<&GroundwaterRecord> = details.iter().collect();
        sorted.sort_by_key(|r| r.year);
        for r in sorted {
            match by_year.last_mut() {
                Some(last) if last.0 == r.year => {
                    last.1 += r.stage_of_extraction;
                    last.2 += 1;
                }
                _ => by_year.push((r.year, r.stage_of_extraction, 1)),
            }
        }

        let mut out = format!("[TREND] HISTORICAL TREND FOR {}:\n\n", loc.to_uppercase());
        for (year, sum, n) in &by_year {
            let _ = writeln!(out, "* {year}: average stage of extraction {:.1}%", sum / *n as f64);
        }
        if let (Some(first), Some(last)) = (by_year.first(), by_year.last()) {
            let delta = last.1 / last.2 as f64 - first.1 / first.2 as f64;
            let direction = if delta > 0.0 { "worsened" } else { "improved" };
            if by_year.len() > 1 && delta != 0.0 {
                let _ = write!(
                    out,
                    "\nExtraction stress {direction} by {:.1} points since {}.",
                    delta.abs(),
                    first.0
                );
            }
        }
        out.truncate(out.trim_end().len());
        out
    }

    fn compare(&self, location: Option<&str>, details: &[GroundwaterRecord]) -> String {
        let mut out = String::from("[COMPARE] GROUNDWATER COMPARISON:\n\n");
        match location.filter(|_| !details.is_empty()) {
            Some(loc) => {
                out.push_str(&summarize(&title_case(loc), details));
                out.push_str("\n\nName a second location to compare against.");
            }
            None => out.push_str(
                "Specify two locations, e.g. 'Compare Punjab and Haryana'.",
            ),
        }
        out
    }

    fn statistics(&self) -> String {
        format!(
            "[STATS] DATASET OVERVIEW:\n\n\
             * States covered: {}\n\
             * Assessment records: {}\n\
             * Critical or over-exploited units (latest year): {}",
            self.dataset.total_states(),
            self.dataset.total_assessments(),
            self.dataset.critical_block_count()
        )
    }

    fn status(&self) -> String {
        format!(
            "[STATUS] INGRES CHATBOT STATUS:\n\n\
             [OK] System: Online and operational\n\
             [OK] Database: {} assessment records across {} states\n\
             [OK] Last Update: {} CGWB Assessment\n\n\
             CAPABILITIES:\n\
             * Query processing with fuzzy matching\n\
             * Historical trend analysis\n\
             * Policy recommendation engine",
            self.dataset.total_assessments(),
            self.dataset.total_states(),
            self.dataset.latest_year().unwrap_or_default()
        )
    }
}

impl ResponseRenderer for TemplateRenderer {
    fn render(
        &self,
        intent: Intent,
        location: Option<&str>,
        details: &[GroundwaterRecord],
    ) -> String {
        match intent {
            Intent::Greeting => GREETING.to_string(),
            Intent::Goodbye => GOODBYE.to_string(),
            Intent::Thanks => THANKS.to_string(),
            Intent::Help | Intent::Capabilities => HELP.to_string(),
            Intent::QueryLocation
            | Intent::QueryState
            | Intent::QueryDistrict
            | Intent::QueryBlock
            | Intent::StageOfExtraction => self.location_report(location, details),
            Intent::CriticalAreas | Intent::TopCritical => self.critical_areas(),
            Intent::OverExploitedAreas => self.category_list(
                "[OVER-EXPLOITED] OVER-EXPLOITED AREAS (>100% extraction)",
                &[Category::OverExploited],
            ),
            Intent::SemiCriticalAreas => self.category_list(
                "[SEMI-CRITICAL] SEMI-CRITICAL AREAS (70-90% extraction)",
                &[Category::SemiCritical],
            ),
            Intent::SafeAreas => self.category_list(
                "[SAFE] SAFE GROUNDWATER AREAS (<70% extraction)",
                &[Category::Safe],
            ),
            Intent::QueryCategory | Intent::CategorySummary => CATEGORY_GUIDE.to_string(),
            Intent::WaterCrisis | Intent::DroughtRisk => WATER_CRISIS.to_string(),
            Intent::RainfallCorrelation => RAINFALL.to_string(),
            Intent::PolicySuggestion => match location {
                Some(loc) => format!(
                    "[POLICY] POLICY RECOMMENDATIONS FOR {}:\n\n{POLICY_LOCAL_BODY}",
                    loc.to_uppercase()
                ),
                None => POLICY_GENERAL.to_string(),
            },
            Intent::ConservationMethods
            | Intent::RainwaterHarvesting
            | Intent::ArtificialRecharge => CONSERVATION.to_string(),
            Intent::CompareLocations => self.compare(location, details),
            Intent::HistoricalTrend => self.trend(location, details),
            Intent::Status => self.status(),
            Intent::Statistics => self.statistics(),
            Intent::Unknown => UNKNOWN.to_string(),
            Intent::Error => FAILURE_MESSAGE.to_string(),
            other => match location {
                Some(loc) if !details.is_empty() => format!(
                    "[INFO] {}\n\n{}",
                    other.label(),
                    summarize(&title_case(loc), details)
                ),
                _ => format!(
                    "[INFO] {}: detailed answers for this topic are not available yet. \
                     Try 'help' to see what I can answer.",
                    other.label()
                ),
            },
        }
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Latest-year summary of `records` for `name`.
fn summarize(name: &str, records: &[GroundwaterRecord]) -> String {
    let Some(latest) = records.iter().map(|r| r.year).max() else {
        return format!("No assessment data found for {name}.");
    };
    let current: Vec<&GroundwaterRecord> = records.iter().filter(|r| r.year == latest).collect();
    let average =
        current.iter().map(|r| r.stage_of_extraction).sum::<f64>() / current.len() as f64;

    let mut out = format!(
        "[DATA] {name} (Assessment {latest}):\n\
         * Assessment units: {}\n\
         * Average stage of extraction: {average:.1}%\n",
        current.len()
    );
    for category in Category::ALL {
        let n = current.iter().filter(|r| r.category == category).count();
        if n > 0 {
            let _ = writeln!(out, "* {}: {n}", category.label());
        }
    }
    if let Some(worst) = current
        .iter()
        .max_by(|a, b| a.stage_of_extraction.total_cmp(&b.stage_of_extraction))
    {
        let _ = write!(
            out,
            "* Most stressed: {} / {} ({:.1}%, {})",
            worst.district, worst.block, worst.stage_of_extraction, worst.category
        );
    }
    out
}

/// `"tamil nadu"` → `"Tamil Nadu"`.
pub fn title_case(s: &str) -> String {
    s.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
