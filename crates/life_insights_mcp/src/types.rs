use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::domains::balance::BalanceDimension;
use crate::domains::correlation::{CorrelationResult, Direction, ImpactFactor, Strength};
use crate::domains::experiment::SleepExperiment;

#[derive(Debug, Default, Deserialize, Serialize, JsonSchema)]
pub struct InsightsParams {
    /// User to analyse (default: the configured user)
    pub user_id: Option<String>,
    /// Trailing window length in days (default: configured window, max 365)
    pub days_back: Option<u32>,
}

#[derive(Debug, Default, Deserialize, Serialize, JsonSchema)]
pub struct DailyMetricsParams {
    pub user_id: Option<String>,
    pub days_back: Option<u32>,
    /// Metric fields to return per day, e.g. ["sleepHours", "mood"]. `date` is always included.
    pub fields: Option<Vec<String>>,
}

#[derive(Debug, Default, Deserialize, Serialize, JsonSchema)]
pub struct CorrelationsParams {
    pub user_id: Option<String>,
    pub days_back: Option<u32>,
    /// Also return the stress, calories, pain and relations pairs (default: true)
    pub include_extended: Option<bool>,
}

#[derive(Debug, Deserialize, Serialize, JsonSchema)]
pub struct UserIdParam {
    pub user_id: String,
}

#[derive(Debug, Deserialize, Serialize, JsonSchema)]
pub struct ObjectResult {
    pub value: serde_json::Value,
}

#[derive(Debug, Serialize, JsonSchema)]
pub struct DailyMetricsResult {
    pub user_id: String,
    pub using_demo_data: bool,
    pub days: serde_json::Value,
}

/// A correlation with its presentation reading.
#[derive(Debug, Serialize, JsonSchema)]
pub struct CorrelationEntry {
    pub label: String,
    pub description: String,
    /// Pearson r, or null when there is not enough data
    pub value: Option<f64>,
    pub strength: Option<Strength>,
    pub direction: Option<Direction>,
}

impl From<&CorrelationResult> for CorrelationEntry {
    fn from(c: &CorrelationResult) -> Self {
        Self {
            label: c.label.clone(),
            description: c.description.clone(),
            value: c.value,
            strength: c.strength(),
            direction: c.direction(),
        }
    }
}

#[derive(Debug, Serialize, JsonSchema)]
pub struct CorrelationsResult {
    pub using_demo_data: bool,
    pub correlations: Vec<CorrelationEntry>,
}

#[derive(Debug, Serialize, JsonSchema)]
pub struct ImpactRankingResult {
    pub using_demo_data: bool,
    pub factors: Vec<ImpactFactor>,
}

#[derive(Debug, Serialize, JsonSchema)]
pub struct SystemBalanceResult {
    pub using_demo_data: bool,
    pub dimensions: Vec<BalanceDimension>,
}

#[derive(Debug, Serialize, JsonSchema)]
pub struct SleepExperimentResult {
    pub using_demo_data: bool,
    /// Null when either sleep group is empty or fewer than 4 nights have both values
    pub experiment: Option<SleepExperiment>,
}

#[derive(Debug, Serialize, JsonSchema)]
pub struct CacheInvalidationResult {
    pub ok: bool,
    pub removed: usize,
}

#[derive(Debug, Deserialize, Serialize, JsonSchema)]
pub struct WeeklyInsightsReviewParams {
    pub user_id: Option<String>,
    /// Days to review (default: 7)
    pub days_back: Option<u32>,
}

#[derive(Debug, Deserialize, Serialize, JsonSchema)]
pub struct SleepMoodCheckParams {
    pub user_id: Option<String>,
    /// Days to review (default: 30)
    pub days_back: Option<u32>,
}
