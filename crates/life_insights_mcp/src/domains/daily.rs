//! Domain module for merging raw store rows into one record per calendar day.
//!
//! Each source contributes to its own fields with its own merge rule:
//! - count-like fields (`steps`, `calories`) are summed
//! - rating-like fields (`sleep_hours`, `mood`, `pain_level`, `stress`, `energy`)
//!   use the running average `new = (old + x) / 2`, applied in arrival order
//! - pillar scores (`relations_score`, `wealth_score`) are last-write-wins
//!
//! The running average is order-dependent and is not the arithmetic mean of
//! the day's values; it is kept that way so numbers match what users already
//! see on the dashboard.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use life_store_client::utils::day_key;
use life_store_client::{
    DailyScore, FoodEntry, MentalHealthLog, SleepRecord, Source, StepRecord, WomensHealthLog,
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Everything observed for one user on one calendar date.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct DayMetrics {
    #[schemars(with = "String")]
    pub date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sleep_hours: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mood: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub steps: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub calories: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pain_level: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stress: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub energy: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relations_score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wealth_score: Option<f64>,
}

impl DayMetrics {
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            sleep_hours: None,
            mood: None,
            steps: None,
            calories: None,
            pain_level: None,
            stress: None,
            energy: None,
            relations_score: None,
            wealth_score: None,
        }
    }
}

/// Raw rows for one user and window, one set per source. A source whose fetch
/// failed is simply left empty.
#[derive(Clone, Debug, Default)]
pub struct SourceRows {
    pub sleep: Vec<SleepRecord>,
    pub mental_health: Vec<MentalHealthLog>,
    pub steps: Vec<StepRecord>,
    pub food: Vec<FoodEntry>,
    pub womens_health: Vec<WomensHealthLog>,
    pub relations: Vec<DailyScore>,
    pub wealth: Vec<DailyScore>,
}

impl SourceRows {
    pub fn total_rows(&self) -> usize {
        self.sleep.len()
            + self.mental_health.len()
            + self.steps.len()
            + self.food.len()
            + self.womens_health.len()
            + self.relations.len()
            + self.wealth.len()
    }
}

fn running_average(slot: &mut Option<f64>, value: f64) {
    *slot = Some(match *slot {
        Some(prev) => (prev + value) / 2.0,
        None => value,
    });
}

fn accumulate(slot: &mut Option<f64>, value: f64) {
    *slot = Some(slot.unwrap_or(0.0) + value);
}

struct DayMap(BTreeMap<NaiveDate, DayMetrics>);

impl DayMap {
    /// Day for a row's date column, or `None` (and a debug line) if the date
    /// cannot be read.
    fn day(&mut self, source: Source, raw_date: &str) -> Option<&mut DayMetrics> {
        let Some(date) = day_key(raw_date) else {
            tracing::debug!(%source, raw_date, "skipping row with unreadable date");
            return None;
        };
        Some(self.0.entry(date).or_insert_with(|| DayMetrics::new(date)))
    }

    fn apply(
        &mut self,
        source: Source,
        raw_date: &str,
        value: Option<f64>,
        merge: fn(&mut Option<f64>, f64),
        field: fn(&mut DayMetrics) -> &mut Option<f64>,
    ) {
        let Some(v) = value.filter(|v| v.is_finite()) else {
            return;
        };
        if let Some(day) = self.day(source, raw_date) {
            merge(field(day), v);
        }
    }
}

fn overwrite(slot: &mut Option<f64>, value: f64) {
    *slot = Some(value);
}

/// Merge all sources into a chronologically sorted series with one entry per
/// date that has at least one observation. Dates are never zero-filled.
pub fn aggregate_days(rows: &SourceRows) -> Vec<DayMetrics> {
    let mut days = DayMap(BTreeMap::new());

    for r in &rows.sleep {
        days.apply(
            Source::Sleep,
            &r.created_at,
            r.sleep_duration_hours,
            running_average,
            |d| &mut d.sleep_hours,
        );
    }
    for r in &rows.mental_health {
        days.apply(
            Source::MentalHealth,
            &r.logged_at,
            r.mood_rating,
            running_average,
            |d| &mut d.mood,
        );
        days.apply(
            Source::MentalHealth,
            &r.logged_at,
            r.stress_level,
            running_average,
            |d| &mut d.stress,
        );
        days.apply(
            Source::MentalHealth,
            &r.logged_at,
            r.energy_level,
            running_average,
            |d| &mut d.energy,
        );
    }
    for r in &rows.steps {
        days.apply(Source::Steps, &r.date, r.steps, accumulate, |d| {
            &mut d.steps
        });
    }
    for r in &rows.food {
        days.apply(
            Source::Food,
            &r.consumed_at,
            r.total_calories,
            accumulate,
            |d| &mut d.calories,
        );
    }
    for r in &rows.womens_health {
        days.apply(
            Source::WomensHealth,
            &r.date,
            r.pain_level,
            running_average,
            |d| &mut d.pain_level,
        );
    }
    for r in &rows.relations {
        days.apply(Source::RelationsScore, &r.date, r.score, overwrite, |d| {
            &mut d.relations_score
        });
    }
    for r in &rows.wealth {
        days.apply(Source::WealthScore, &r.date, r.score, overwrite, |d| {
            &mut d.wealth_score
        });
    }

    days.0.into_values().collect()
}
