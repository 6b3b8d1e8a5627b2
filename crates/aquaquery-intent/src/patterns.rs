//! The static intent pattern table.
//!
//! Each [`IntentPattern`] describes how one intent is recognized: literal
//! keyword and synonym phrases, optional context keywords, a priority weight
//! and a per-pattern confidence gate.  The table is evaluated in full for
//! every query and **order matters**: on equal scores the earlier pattern
//! wins.

use crate::intent::Intent;

/// Scoring rule for a single intent.
#[derive(Debug, Clone, Copy)]
pub struct IntentPattern {
    /// The intent this pattern votes for.
    pub intent: Intent,
    /// Lowercase phrases matched as substrings of the query.
    pub keywords: &'static [&'static str],
    /// Lowercase alternative phrasings, weighted lower than keywords.
    pub synonyms: &'static [&'static str],
    /// Phrases that, found in the query or the last location, earn the
    /// context bonus.
    pub context_keywords: &'static [&'static str],
    /// Relative weight; `10.0` is neutral.
    pub priority: f64,
    /// The pattern is only eligible when its score reaches this value.
    pub min_confidence: f64,
    /// Penalize the score unless every keyword matched literally.
    pub require_all: bool,
    /// Whether conversation context contributes to the score.
    pub context_dependent: bool,
    /// Sample utterances this pattern classifies, used for help output.
    pub examples: &'static [&'static str],
}

impl IntentPattern {
    /// Baseline used with struct-update syntax in the table below.
    pub const EMPTY: IntentPattern = IntentPattern {
        intent: Intent::Unknown,
        keywords: &[],
        synonyms: &[],
        context_keywords: &[],
        priority: 10.0,
        min_confidence: 0.5,
        require_all: false,
        context_dependent: false,
        examples: &[],
    };

    /// Number of literal phrases (keywords plus synonyms) the pattern carries.
    pub fn phrase_count(&self) -> usize {
        self.keywords.len() + self.synonyms.len()
    }
}

/// Look up the pattern for `intent`, if it has one.
pub fn pattern_for(intent: Intent) -> Option<&'static IntentPattern> {
    PATTERNS.iter().find(|p| p.intent == intent)
}

const MAJOR_STATES: &[&str] = &[
    "punjab",
    "haryana",
    "gujarat",
    "maharashtra",
    "rajasthan",
    "tamil nadu",
    "karnataka",
    "uttar pradesh",
    "west bengal",
    "andhra pradesh",
];

const COMPARISON_CONTEXT: &[&str] = &[
    "punjab",
    "haryana",
    "gujarat",
    "maharashtra",
    "rajasthan",
    "tamil nadu",
    "karnataka",
    "uttar pradesh",
    "west bengal",
    "andhra pradesh",
    "states",
    "regions",
];

/// Every scoring pattern, in evaluation order.
pub static PATTERNS: &[IntentPattern] = &[
    IntentPattern {
        intent: Intent::Greeting,
        keywords: &["hello", "hi", "hey", "namaste"],
        synonyms: &["good morning"],
        priority: 20.0,
        min_confidence: 0.6,
        examples: &["Hello", "Hi there", "Namaste"],
        ..IntentPattern::EMPTY
    },
    IntentPattern {
        intent: Intent::Goodbye,
        keywords: &["bye", "goodbye"],
        synonyms: &["see you", "farewell"],
        priority: 18.0,
        min_confidence: 0.8,
        examples: &["Bye", "Goodbye for now"],
        ..IntentPattern::EMPTY
    },
    IntentPattern {
        intent: Intent::Thanks,
        keywords: &["thank", "thanks"],
        synonyms: &["grateful", "appreciate"],
        priority: 16.0,
        min_confidence: 0.75,
        examples: &["Thank you", "Thanks a lot"],
        ..IntentPattern::EMPTY
    },
    IntentPattern {
        intent: Intent::Help,
        keywords: &["help", "guide", "commands"],
        synonyms: &["assist", "instructions", "tutorial"],
        priority: 18.0,
        min_confidence: 0.8,
        examples: &["Help me"],
        ..IntentPattern::EMPTY
    },
    IntentPattern {
        intent: Intent::Capabilities,
        keywords: &["what can you do", "capabilities", "features"],
        synonyms: &["abilities"],
        priority: 14.0,
        min_confidence: 0.7,
        examples: &["List your features"],
        ..IntentPattern::EMPTY
    },
    IntentPattern {
        intent: Intent::QueryLocation,
        keywords: &["show", "data", "groundwater"],
        synonyms: &["display", "information", "statistics"],
        context_keywords: MAJOR_STATES,
        priority: 16.0,
        min_confidence: 0.6,
        context_dependent: true,
        examples: &["Show me Punjab data", "Groundwater in Maharashtra"],
        ..IntentPattern::EMPTY
    },
    IntentPattern {
        intent: Intent::QueryDistrict,
        keywords: &["district", "tell me about"],
        synonyms: &[],
        context_keywords: &["amritsar", "ludhiana", "pune", "ahmedabad", "jaipur"],
        priority: 15.0,
        min_confidence: 0.6,
        context_dependent: true,
        examples: &["Tell me about Amritsar", "Ludhiana district"],
        ..IntentPattern::EMPTY
    },
    IntentPattern {
        intent: Intent::QueryBlock,
        keywords: &["block", "tehsil", "taluk"],
        synonyms: &["mandal"],
        priority: 13.0,
        min_confidence: 0.7,
        examples: &["Ajnala block", "Which tehsil is worst"],
        ..IntentPattern::EMPTY
    },
    IntentPattern {
        intent: Intent::CriticalAreas,
        keywords: &["critical", "critical areas"],
        synonyms: &["dangerous", "alarming", "severe"],
        context_keywords: &["crisis", "emergency", "urgent"],
        priority: 16.0,
        min_confidence: 0.7,
        examples: &["Which areas are critical?", "Show critical areas"],
        ..IntentPattern::EMPTY
    },
    IntentPattern {
        intent: Intent::OverExploitedAreas,
        keywords: &["over-exploited", "overexploited", "exploited"],
        synonyms: &["overused", "depleted"],
        priority: 17.0,
        min_confidence: 0.75,
        examples: &["Show over-exploited regions", "Overexploited districts"],
        ..IntentPattern::EMPTY
    },
    IntentPattern {
        intent: Intent::SafeAreas,
        keywords: &["safe", "sustainable"],
        synonyms: &["healthy", "secure"],
        priority: 13.0,
        min_confidence: 0.7,
        examples: &["Which areas are safe?", "Sustainable regions"],
        ..IntentPattern::EMPTY
    },
    IntentPattern {
        intent: Intent::QueryCategory,
        keywords: &["category", "categories", "classification"],
        synonyms: &["classify", "grade"],
        priority: 13.0,
        min_confidence: 0.7,
        examples: &["What category is Punjab?", "Explain the classification"],
        ..IntentPattern::EMPTY
    },
    IntentPattern {
        intent: Intent::CompareLocations,
        keywords: &["compare", "versus", "difference", "between"],
        synonyms: &["contrast", "vs"],
        context_keywords: COMPARISON_CONTEXT,
        priority: 18.0,
        min_confidence: 0.6,
        context_dependent: true,
        examples: &["Compare Punjab and Haryana", "Punjab versus Gujarat"],
        ..IntentPattern::EMPTY
    },
    IntentPattern {
        intent: Intent::HistoricalTrend,
        keywords: &["trend", "historical", "over time"],
        synonyms: &["pattern", "evolution", "progression"],
        context_keywords: &["years", "decade", "annual"],
        priority: 15.0,
        min_confidence: 0.65,
        examples: &["Historical trend for Punjab"],
        ..IntentPattern::EMPTY
    },
    IntentPattern {
        intent: Intent::PolicySuggestion,
        keywords: &["policy", "recommendations", "suggestions"],
        synonyms: &["advice", "measures", "strategies"],
        context_keywords: &["government", "conservation", "regulation"],
        priority: 15.0,
        min_confidence: 0.6,
        context_dependent: true,
        examples: &["What are the policy recommendations?", "Any policy measures?"],
        ..IntentPattern::EMPTY
    },
    IntentPattern {
        intent: Intent::ConservationMethods,
        keywords: &["conservation", "conserve", "save water"],
        synonyms: &["preservation", "protection"],
        context_keywords: &["methods", "techniques"],
        priority: 14.0,
        min_confidence: 0.65,
        context_dependent: true,
        examples: &["Conservation methods", "How to conserve groundwater"],
        ..IntentPattern::EMPTY
    },
    IntentPattern {
        intent: Intent::RainfallCorrelation,
        keywords: &["rainfall", "monsoon", "rain"],
        synonyms: &["precipitation", "weather"],
        priority: 14.0,
        min_confidence: 0.65,
        examples: &["How does rainfall affect groundwater?", "Monsoon impact"],
        ..IntentPattern::EMPTY
    },
    IntentPattern {
        intent: Intent::AgricultureImpact,
        keywords: &["agriculture", "farming", "irrigation", "crops"],
        synonyms: &["cultivation", "farm"],
        context_keywords: &["rice", "wheat", "sugarcane"],
        priority: 13.0,
        min_confidence: 0.6,
        examples: &["Irrigation and crops"],
        ..IntentPattern::EMPTY
    },
    IntentPattern {
        intent: Intent::TechnicalExplanation,
        keywords: &["explain", "stage of extraction", "what is"],
        synonyms: &["define", "meaning", "describe"],
        context_keywords: &["calculation", "methodology", "formula"],
        priority: 15.0,
        min_confidence: 0.6,
        examples: &["Explain stage of extraction"],
        ..IntentPattern::EMPTY
    },
    IntentPattern {
        intent: Intent::WaterCrisis,
        keywords: &["crisis", "shortage", "scarcity"],
        synonyms: &["drought", "deficit", "depletion"],
        context_keywords: &["urgent", "immediate", "severe"],
        priority: 15.0,
        min_confidence: 0.65,
        context_dependent: true,
        examples: &["Water crisis areas", "Is there a water shortage?"],
        ..IntentPattern::EMPTY
    },
    IntentPattern {
        intent: Intent::EconomicImpact,
        keywords: &["economic", "cost", "financial"],
        synonyms: &["monetary", "budget", "expense"],
        priority: 12.0,
        min_confidence: 0.6,
        examples: &["Economic cost of depletion"],
        ..IntentPattern::EMPTY
    },
    IntentPattern {
        intent: Intent::FollowUpQuestion,
        keywords: &["tell me more", "elaborate", "more details"],
        synonyms: &[],
        priority: 12.0,
        min_confidence: 0.4,
        context_dependent: true,
        examples: &["Tell me more", "Please elaborate"],
        ..IntentPattern::EMPTY
    },
    IntentPattern {
        intent: Intent::WaterQuality,
        keywords: &["quality", "contamination", "pollution"],
        synonyms: &["arsenic", "fluoride", "nitrate"],
        priority: 13.0,
        min_confidence: 0.65,
        examples: &["Water quality in Punjab"],
        ..IntentPattern::EMPTY
    },
    IntentPattern {
        intent: Intent::Status,
        keywords: &["status", "situation", "condition"],
        synonyms: &["state of"],
        context_keywords: MAJOR_STATES,
        priority: 13.0,
        min_confidence: 0.65,
        context_dependent: true,
        examples: &["What is the status?", "Current situation"],
        ..IntentPattern::EMPTY
    },
    IntentPattern {
        intent: Intent::SemiCriticalAreas,
        keywords: &["semi-critical", "semi critical"],
        synonyms: &["moderate stress"],
        priority: 17.0,
        min_confidence: 0.7,
        examples: &["Semi-critical blocks"],
        ..IntentPattern::EMPTY
    },
    IntentPattern {
        intent: Intent::RainwaterHarvesting,
        keywords: &["rainwater harvesting", "harvesting"],
        synonyms: &["rooftop", "check dam"],
        priority: 15.0,
        min_confidence: 0.65,
        examples: &["Rainwater harvesting tips", "Rooftop harvesting"],
        ..IntentPattern::EMPTY
    },
    IntentPattern {
        intent: Intent::ArtificialRecharge,
        keywords: &["artificial recharge", "recharge structures"],
        synonyms: &["recharge pits", "percolation tank"],
        priority: 15.0,
        min_confidence: 0.65,
        examples: &[],
        ..IntentPattern::EMPTY
    },
    IntentPattern {
        intent: Intent::RechargeRate,
        keywords: &["recharge", "replenish"],
        synonyms: &["infiltration", "refill"],
        priority: 13.0,
        min_confidence: 0.65,
        examples: &["Recharge in Punjab", "How fast do aquifers replenish?"],
        ..IntentPattern::EMPTY
    },
    IntentPattern {
        intent: Intent::WaterLevel,
        keywords: &["water level", "water table", "depth"],
        synonyms: &["aquifer level"],
        priority: 14.0,
        min_confidence: 0.6,
        examples: &["Water table depth"],
        ..IntentPattern::EMPTY
    },
    IntentPattern {
        intent: Intent::DroughtRisk,
        keywords: &["drought risk", "dry spell"],
        synonyms: &["arid"],
        priority: 13.0,
        min_confidence: 0.65,
        examples: &["Drought risk in Rajasthan", "Dry spell impact"],
        ..IntentPattern::EMPTY
    },
    IntentPattern {
        intent: Intent::IndustrialUsage,
        keywords: &["industrial", "industry", "factories"],
        synonyms: &["manufacturing"],
        priority: 12.0,
        min_confidence: 0.6,
        examples: &["Industrial usage", "Industry water demand"],
        ..IntentPattern::EMPTY
    },
    IntentPattern {
        intent: Intent::DataSource,
        keywords: &["source", "cgwb", "where does"],
        synonyms: &["dataset", "provenance"],
        priority: 12.0,
        min_confidence: 0.6,
        examples: &["Where does this come from, CGWB?"],
        ..IntentPattern::EMPTY
    },
    IntentPattern {
        intent: Intent::RankingRequest,
        keywords: &["top", "worst", "best", "rank"],
        synonyms: &["highest", "lowest"],
        priority: 17.0,
        min_confidence: 0.65,
        examples: &["Top 5 worst districts", "Rank states"],
        ..IntentPattern::EMPTY
    },
    IntentPattern {
        intent: Intent::FutureProjection,
        keywords: &["future", "projection", "predict", "forecast"],
        synonyms: &["next year", "2030"],
        priority: 13.0,
        min_confidence: 0.65,
        examples: &["Future projection"],
        ..IntentPattern::EMPTY
    },
    IntentPattern {
        intent: Intent::GovernmentSchemes,
        keywords: &["scheme", "atal bhujal", "jal shakti"],
        synonyms: &["yojana", "programme"],
        priority: 13.0,
        min_confidence: 0.65,
        examples: &["Atal Bhujal scheme", "Jal Shakti programme"],
        ..IntentPattern::EMPTY
    },
    IntentPattern {
        intent: Intent::DownloadData,
        keywords: &["download", "export", "csv"],
        synonyms: &["spreadsheet"],
        priority: 12.0,
        min_confidence: 0.65,
        examples: &["Download the data as csv", "Export data"],
        ..IntentPattern::EMPTY
    },
    IntentPattern {
        intent: Intent::CompareYears,
        keywords: &["compare", "year"],
        synonyms: &["year-on-year"],
        priority: 16.0,
        min_confidence: 0.7,
        require_all: true,
        examples: &["Compare 2022 and 2023 year data", "Compare this year with last year"],
        ..IntentPattern::EMPTY
    },
];
