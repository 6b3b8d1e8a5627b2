//! The intent catalogue.
//!
//! [`Intent`] is the closed set of labels a query can be classified into.
//! Only a subset has scoring patterns (see [`crate::patterns`]); the rest are
//! valid labels that collaborators such as the response renderer may still
//! receive.

use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! intents {
    ($( $(#[$meta:meta])* $variant:ident => ($name:literal, $label:literal), )+) => {
        /// Classified purpose of a user utterance.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(rename_all = "snake_case")]
        pub enum Intent {
            $( $(#[$meta])* $variant, )+
        }

        impl Intent {
            /// Every intent, in declaration order.
            pub const ALL: &'static [Intent] = &[ $( Intent::$variant, )+ ];

            /// Stable snake_case identifier, identical to the serde form.
            pub fn name(self) -> &'static str {
                match self {
                    $( Intent::$variant => $name, )+
                }
            }

            /// Short human-readable label.
            pub fn label(self) -> &'static str {
                match self {
                    $( Intent::$variant => $label, )+
                }
            }
        }
    };
}

intents! {
    // -- Conversation ---------------------------------------------------------
    Greeting => ("greeting", "Greeting"),
    Goodbye => ("goodbye", "Goodbye"),
    Thanks => ("thanks", "Thanks"),
    Help => ("help", "Help"),
    Capabilities => ("capabilities", "Capabilities"),
    Affirmation => ("affirmation", "Affirmation"),
    Negation => ("negation", "Negation"),
    SmallTalk => ("small_talk", "Small talk"),
    FollowUpQuestion => ("follow_up_question", "Follow-up question"),
    Clarification => ("clarification", "Clarification"),
    Feedback => ("feedback", "Feedback"),

    // -- Location -------------------------------------------------------------
    QueryLocation => ("query_location", "Location query"),
    QueryState => ("query_state", "State query"),
    QueryDistrict => ("query_district", "District query"),
    QueryBlock => ("query_block", "Block query"),
    NearbyAreas => ("nearby_areas", "Nearby areas"),

    // -- Category -------------------------------------------------------------
    Status => ("status", "Groundwater status"),
    QueryCategory => ("query_category", "Category explanation"),
    CriticalAreas => ("critical_areas", "Critical areas"),
    OverExploitedAreas => ("over_exploited_areas", "Over-exploited areas"),
    SemiCriticalAreas => ("semi_critical_areas", "Semi-critical areas"),
    SafeAreas => ("safe_areas", "Safe areas"),
    SalineAreas => ("saline_areas", "Saline areas"),
    CategorySummary => ("category_summary", "Category summary"),

    // -- Metrics --------------------------------------------------------------
    StageOfExtraction => ("stage_of_extraction", "Stage of extraction"),
    RechargeRate => ("recharge_rate", "Recharge rate"),
    ExtractionVolume => ("extraction_volume", "Extraction volume"),
    WaterLevel => ("water_level", "Water level"),
    WaterTableDepth => ("water_table_depth", "Water table depth"),
    AnnualAvailability => ("annual_availability", "Annual availability"),
    NetAvailability => ("net_availability", "Net availability"),

    // -- Comparison and trend -------------------------------------------------
    CompareLocations => ("compare_locations", "Location comparison"),
    CompareYears => ("compare_years", "Year comparison"),
    RankingRequest => ("ranking_request", "Ranking"),
    TopCritical => ("top_critical", "Most critical areas"),
    HistoricalTrend => ("historical_trend", "Historical trend"),
    FutureProjection => ("future_projection", "Future projection"),
    SeasonalVariation => ("seasonal_variation", "Seasonal variation"),

    // -- Environment ----------------------------------------------------------
    RainfallCorrelation => ("rainfall_correlation", "Rainfall correlation"),
    DroughtRisk => ("drought_risk", "Drought risk"),
    ClimateImpact => ("climate_impact", "Climate impact"),
    FloodRecharge => ("flood_recharge", "Flood recharge"),

    // -- Quality --------------------------------------------------------------
    WaterQuality => ("water_quality", "Water quality"),
    ArsenicContamination => ("arsenic_contamination", "Arsenic contamination"),
    FluorideContamination => ("fluoride_contamination", "Fluoride contamination"),
    NitrateContamination => ("nitrate_contamination", "Nitrate contamination"),
    Salinity => ("salinity", "Salinity"),

    // -- Usage ----------------------------------------------------------------
    AgricultureImpact => ("agriculture_impact", "Agriculture impact"),
    IrrigationUsage => ("irrigation_usage", "Irrigation usage"),
    IndustrialUsage => ("industrial_usage", "Industrial usage"),
    DomesticUsage => ("domestic_usage", "Domestic usage"),
    UrbanDemand => ("urban_demand", "Urban demand"),

    // -- Policy and management ------------------------------------------------
    PolicySuggestion => ("policy_suggestion", "Policy suggestions"),
    ConservationMethods => ("conservation_methods", "Conservation methods"),
    RainwaterHarvesting => ("rainwater_harvesting", "Rainwater harvesting"),
    ArtificialRecharge => ("artificial_recharge", "Artificial recharge"),
    RegulationInfo => ("regulation_info", "Regulation"),
    GovernmentSchemes => ("government_schemes", "Government schemes"),
    WellPermits => ("well_permits", "Well permits"),

    // -- Crisis and impact ----------------------------------------------------
    WaterCrisis => ("water_crisis", "Water crisis"),
    EconomicImpact => ("economic_impact", "Economic impact"),
    SocialImpact => ("social_impact", "Social impact"),
    HealthImpact => ("health_impact", "Health impact"),

    // -- Technical ------------------------------------------------------------
    TechnicalExplanation => ("technical_explanation", "Technical explanation"),
    MethodologyInfo => ("methodology_info", "Assessment methodology"),
    DataSource => ("data_source", "Data source"),
    AssessmentYear => ("assessment_year", "Assessment year"),
    Glossary => ("glossary", "Glossary"),

    // -- Data and reports -----------------------------------------------------
    DownloadData => ("download_data", "Data download"),
    ReportGeneration => ("report_generation", "Report generation"),
    Statistics => ("statistics", "Statistics"),

    // -- Fallback -------------------------------------------------------------
    /// No pattern cleared its threshold, or the best score fell under the
    /// global floor.
    Unknown => ("unknown", "Unknown"),
    /// The query was rejected or processing failed.
    Error => ("error", "Error"),
}

/// Symmetric relation between intents that commonly follow each other in a
/// conversation.  A prior turn with a related intent earns the context bonus.
const RELATED_INTENTS: &[(Intent, Intent)] = &[
    (Intent::QueryLocation, Intent::CompareLocations),
    (Intent::CriticalAreas, Intent::PolicySuggestion),
    (Intent::HistoricalTrend, Intent::CompareLocations),
    (Intent::WaterCrisis, Intent::ConservationMethods),
];

impl Intent {
    /// Whether `self` and `other` are related under the fixed relation table.
    ///
    /// The relation is symmetric and closed: an intent is not related to
    /// itself unless listed.
    pub fn is_related(self, other: Intent) -> bool {
        RELATED_INTENTS
            .iter()
            .any(|&(a, b)| (a == self && b == other) || (a == other && b == self))
    }

    /// Whether this label is one of the two fallback outcomes.
    pub fn is_fallback(self) -> bool {
        matches!(self, Intent::Unknown | Intent::Error)
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
