//! Fund scheme records as they move through the pipeline.
//!
//! The raw record mirrors one row of the input table. Each later stage wraps
//! the previous stage's record instead of mutating it, so a `RankedFund`
//! still carries the cleaned `Fund` it was scored from.
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt::Display;

/// Input column names, in the order the processed table writes them.
pub const SCHEME_NAME: &str = "Scheme Name";
pub const AMC_NAME: &str = "AMC Name";
pub const FUND_TYPE: &str = "Fund Type";
pub const CATEGORY: &str = "Category";
pub const SUB_CATEGORY: &str = "Sub Category";
pub const RISK_LEVEL: &str = "Risk Level";
pub const FUND_RATING: &str = "Fund Rating";
pub const RETURN_1Y: &str = "Return 1Y (%)";
pub const RETURN_3Y: &str = "Return 3Y (%)";
pub const RETURN_5Y: &str = "Return 5Y (%)";
pub const EXPENSE_RATIO: &str = "Expense Ratio (%)";
pub const NAV: &str = "NAV (₹)";
pub const AUM: &str = "AUM (Cr)";
pub const FUND_AGE: &str = "Fund Age (Years)";
pub const MIN_SIP: &str = "Min SIP (₹)";
pub const MIN_LUMPSUM: &str = "Min Lumpsum (₹)";
pub const FUND_MANAGER: &str = "Fund Manager";
pub const INVESTMENT_STRATEGY: &str = "Investment Strategy";

/// Inclusive bounds of the fund rating scale.
pub const MIN_RATING: u8 = 1;
pub const MAX_RATING: u8 = 5;

pub const REQUIRED_COLUMNS: [&str; 18] = [
    SCHEME_NAME,
    AMC_NAME,
    FUND_TYPE,
    CATEGORY,
    SUB_CATEGORY,
    RISK_LEVEL,
    FUND_RATING,
    RETURN_1Y,
    RETURN_3Y,
    RETURN_5Y,
    EXPENSE_RATIO,
    NAV,
    AUM,
    FUND_AGE,
    MIN_SIP,
    MIN_LUMPSUM,
    FUND_MANAGER,
    INVESTMENT_STRATEGY,
];

/// SEBI riskometer level of a scheme.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RiskLevel {
    Low,
    LowToModerate,
    Moderate,
    ModeratelyHigh,
    High,
    VeryHigh,
    Other(String),
}

impl RiskLevel {
    /// Canonical levels in increasing order of severity.
    pub const CANONICAL: [RiskLevel; 6] = [
        RiskLevel::Low,
        RiskLevel::LowToModerate,
        RiskLevel::Moderate,
        RiskLevel::ModeratelyHigh,
        RiskLevel::High,
        RiskLevel::VeryHigh,
    ];

    pub fn as_str(&self) -> &str {
        match self {
            RiskLevel::Low => "Low",
            RiskLevel::LowToModerate => "Low to Moderate",
            RiskLevel::Moderate => "Moderate",
            RiskLevel::ModeratelyHigh => "Moderately High",
            RiskLevel::High => "High",
            RiskLevel::VeryHigh => "Very High",
            RiskLevel::Other(s) => s,
        }
    }

    /// Score adjustment applied on top of the weighted composite.
    /// Unmapped levels are neutral.
    pub fn bonus(&self) -> f64 {
        match self {
            RiskLevel::Low => 0.05,
            RiskLevel::LowToModerate => 0.03,
            RiskLevel::Moderate => 0.01,
            RiskLevel::ModeratelyHigh => 0.0,
            RiskLevel::High => -0.02,
            RiskLevel::VeryHigh => -0.05,
            RiskLevel::Other(_) => 0.0,
        }
    }
}

impl From<&str> for RiskLevel {
    fn from(s: &str) -> Self {
        match s.trim() {
            "Low" => RiskLevel::Low,
            "Low to Moderate" => RiskLevel::LowToModerate,
            "Moderate" => RiskLevel::Moderate,
            "Moderately High" => RiskLevel::ModeratelyHigh,
            "High" => RiskLevel::High,
            "Very High" => RiskLevel::VeryHigh,
            other => RiskLevel::Other(other.to_string()),
        }
    }
}

impl From<String> for RiskLevel {
    fn from(s: String) -> Self {
        RiskLevel::from(s.as_str())
    }
}

impl From<RiskLevel> for String {
    fn from(level: RiskLevel) -> Self {
        level.as_str().to_string()
    }
}

impl Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Cell values read as missing in the optional return columns.
pub const MISSING_MARKERS: [&str; 8] = ["", "NA", "N/A", "NaN", "nan", "null", "NULL", "None"];

/// Parses an optional numeric cell. Missing markers and non-finite numbers are `None`.
fn missing_or_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(cell) = Option::<String>::deserialize(deserializer)? else {
        return Ok(None);
    };
    let cell = cell.trim();
    if MISSING_MARKERS.contains(&cell) {
        return Ok(None);
    }
    let value: f64 = cell.parse().map_err(serde::de::Error::custom)?;
    Ok(value.is_finite().then_some(value))
}

/// One row of the raw input table. Only the return columns may be empty.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RawFund {
    #[serde(rename = "Scheme Name")]
    pub scheme_name: String,
    #[serde(rename = "AMC Name")]
    pub amc_name: String,
    #[serde(rename = "Fund Type")]
    pub fund_type: String,
    #[serde(rename = "Category")]
    pub category: String,
    #[serde(rename = "Sub Category")]
    pub sub_category: String,
    #[serde(rename = "Risk Level")]
    pub risk_level: RiskLevel,
    #[serde(rename = "Fund Rating")]
    pub fund_rating: u8,
    #[serde(rename = "Return 1Y (%)", deserialize_with = "missing_or_number")]
    pub return_1y: Option<f64>,
    #[serde(rename = "Return 3Y (%)", deserialize_with = "missing_or_number")]
    pub return_3y: Option<f64>,
    #[serde(rename = "Return 5Y (%)", deserialize_with = "missing_or_number")]
    pub return_5y: Option<f64>,
    #[serde(rename = "Expense Ratio (%)")]
    pub expense_ratio: f64,
    #[serde(rename = "NAV (₹)")]
    pub nav: f64,
    #[serde(rename = "AUM (Cr)")]
    pub aum: f64,
    #[serde(rename = "Fund Age (Years)")]
    pub fund_age: f64,
    #[serde(rename = "Min SIP (₹)")]
    pub min_sip: f64,
    #[serde(rename = "Min Lumpsum (₹)")]
    pub min_lumpsum: f64,
    #[serde(rename = "Fund Manager")]
    pub fund_manager: String,
    #[serde(rename = "Investment Strategy")]
    pub investment_strategy: String,
}

/// A cleaned fund record: every numeric field is present and within bounds.
#[derive(Debug, Clone, PartialEq)]
pub struct Fund {
    pub scheme_name: String,
    pub amc_name: String,
    pub fund_type: String,
    pub category: String,
    pub sub_category: String,
    pub risk_level: RiskLevel,
    pub fund_rating: u8,
    pub return_1y: f64,
    pub return_3y: f64,
    pub return_5y: f64,
    pub expense_ratio: f64,
    pub nav: f64,
    pub aum: f64,
    pub fund_age: f64,
    pub min_sip: f64,
    pub min_lumpsum: f64,
    pub fund_manager: String,
    pub investment_strategy: String,
}

/// Min-max scaled counterparts of the scored metrics, each in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct NormalizedMetrics {
    pub return_1y: f64,
    pub return_3y: f64,
    pub return_5y: f64,
    pub expense_ratio: f64,
    pub fund_age: f64,
    pub aum: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedFund {
    pub fund: Fund,
    pub norm: NormalizedMetrics,
}

/// A fund with its final 0-100 score and 1-based rank.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedFund {
    pub fund: Fund,
    pub norm: NormalizedMetrics,
    pub score: f64,
    pub rank: usize,
}
