//! Read-only `LifeStoreClient` trait over the life-dashboard row tables and a
//! reqwest-based PostgREST implementation.

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

pub mod config;
pub mod http_client;
pub mod observability;
pub mod utils;
pub mod webhook;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("unauthorized: {0}")]
    Auth(String),
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("store returned {status}: {body}")]
    Api { status: u16, body: String },
    #[error("decode error: {0}")]
    Decode(String),
    #[error("configuration error: {0}")]
    Config(String),
}

impl StoreError {
    pub fn from_status(status: u16, body: String) -> Self {
        StoreError::Api { status, body }
    }
}

/// The row tables the insights engine reads from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Source {
    Sleep,
    MentalHealth,
    Steps,
    Food,
    WomensHealth,
    RelationsScore,
    WealthScore,
}

impl Source {
    pub const ALL: [Source; 7] = [
        Source::Sleep,
        Source::MentalHealth,
        Source::Steps,
        Source::Food,
        Source::WomensHealth,
        Source::RelationsScore,
        Source::WealthScore,
    ];

    pub fn table(self) -> &'static str {
        match self {
            Source::Sleep => "sleep_records",
            Source::MentalHealth => "mental_health_logs",
            Source::Steps => "step_records",
            Source::Food => "food_entries",
            Source::WomensHealth => "womens_health_logs",
            Source::RelationsScore => "relations_daily_scores",
            Source::WealthScore => "wealth_daily_scores",
        }
    }

    /// PostgREST `select` list for the source.
    pub fn columns(self) -> &'static str {
        match self {
            Source::Sleep => "sleep_duration_hours,created_at",
            Source::MentalHealth => "mood_rating,stress_level,energy_level,logged_at",
            Source::Steps => "steps,date",
            Source::Food => "total_calories,consumed_at",
            Source::WomensHealth => "pain_level,date",
            Source::RelationsScore | Source::WealthScore => "score,date",
        }
    }

    pub fn date_column(self) -> &'static str {
        match self {
            Source::Sleep => "created_at",
            Source::MentalHealth => "logged_at",
            Source::Food => "consumed_at",
            Source::Steps | Source::WomensHealth | Source::RelationsScore | Source::WealthScore => {
                "date"
            }
        }
    }

    pub fn from_table(table: &str) -> Option<Source> {
        Source::ALL.into_iter().find(|s| s.table() == table)
    }
}

impl std::fmt::Display for Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.table())
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct SleepRecord {
    #[serde(default, deserialize_with = "deserialize_opt_f64")]
    pub sleep_duration_hours: Option<f64>,
    pub created_at: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct MentalHealthLog {
    #[serde(default, deserialize_with = "deserialize_opt_f64")]
    pub mood_rating: Option<f64>,
    #[serde(default, deserialize_with = "deserialize_opt_f64")]
    pub stress_level: Option<f64>,
    #[serde(default, deserialize_with = "deserialize_opt_f64")]
    pub energy_level: Option<f64>,
    pub logged_at: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct StepRecord {
    #[serde(default, deserialize_with = "deserialize_opt_f64")]
    pub steps: Option<f64>,
    pub date: String, // YYYY-MM-DD
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct FoodEntry {
    #[serde(default, deserialize_with = "deserialize_opt_f64")]
    pub total_calories: Option<f64>,
    pub consumed_at: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct WomensHealthLog {
    #[serde(default, deserialize_with = "deserialize_opt_f64")]
    pub pain_level: Option<f64>,
    pub date: String,
}

/// One row of `relations_daily_scores` or `wealth_daily_scores`.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct DailyScore {
    #[serde(default, deserialize_with = "deserialize_opt_f64")]
    pub score: Option<f64>,
    pub date: String,
}

/// Numeric columns come back as numbers, but `numeric` columns are serialised
/// as strings by PostgREST.
fn deserialize_opt_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;
    let value: Option<serde_json::Value> = Option::deserialize(deserializer)?;
    match value {
        None | Some(serde_json::Value::Null) => Ok(None),
        Some(serde_json::Value::Number(n)) => Ok(n.as_f64()),
        Some(serde_json::Value::String(s)) => s
            .trim()
            .parse::<f64>()
            .map(Some)
            .map_err(|_| D::Error::custom(format!("expected numeric string, got {s:?}"))),
        Some(other) => Err(D::Error::custom(format!(
            "expected number or numeric string, got {other}"
        ))),
    }
}

/// Per-user, per-table reads over a trailing window starting at `since`
/// (inclusive). Rows come back in ascending order of the table's date column.
#[async_trait]
pub trait LifeStoreClient: Send + Sync + 'static {
    async fn get_sleep_records(
        &self,
        user_id: &str,
        since: NaiveDate,
    ) -> Result<Vec<SleepRecord>, StoreError>;

    async fn get_mental_health_logs(
        &self,
        user_id: &str,
        since: NaiveDate,
    ) -> Result<Vec<MentalHealthLog>, StoreError>;

    async fn get_step_records(
        &self,
        user_id: &str,
        since: NaiveDate,
    ) -> Result<Vec<StepRecord>, StoreError>;

    async fn get_food_entries(
        &self,
        user_id: &str,
        since: NaiveDate,
    ) -> Result<Vec<FoodEntry>, StoreError>;

    async fn get_womens_health_logs(
        &self,
        user_id: &str,
        since: NaiveDate,
    ) -> Result<Vec<WomensHealthLog>, StoreError>;

    /// Relations pillar daily scores (at most one row per date).
    async fn get_relations_scores(
        &self,
        user_id: &str,
        since: NaiveDate,
    ) -> Result<Vec<DailyScore>, StoreError>;

    /// Wealth pillar daily scores (at most one row per date).
    async fn get_wealth_scores(
        &self,
        user_id: &str,
        since: NaiveDate,
    ) -> Result<Vec<DailyScore>, StoreError>;
}
