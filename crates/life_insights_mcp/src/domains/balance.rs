//! Six-axis "system balance" projection of window averages onto 0..=100.

use schemars::JsonSchema;
use serde::Serialize;

use super::correlation::Metric;
use super::daily::DayMetrics;

#[derive(Clone, Debug, PartialEq, Serialize, JsonSchema)]
pub struct BalanceDimension {
    pub dimension: String,
    pub score: f64,
}

/// Mean of a metric over the days that observed it.
fn average(days: &[DayMetrics], metric: Metric) -> Option<f64> {
    let (sum, n) = days
        .iter()
        .filter_map(|d| metric.value(d))
        .fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
    (n > 0).then(|| sum / n as f64)
}

fn linear(v: f64, lo: f64, hi: f64) -> f64 {
    (v.clamp(lo, hi) - lo) / (hi - lo) * 100.0
}

fn sleep_score(avg: f64) -> f64 {
    linear(avg, 4.5, 9.0)
}

fn movement_score(avg: f64) -> f64 {
    linear(avg, 0.0, 12_000.0)
}

/// Peaks at 2000 kcal and loses 50 points per 1000 kcal either side.
fn nutrition_score(avg: f64) -> f64 {
    100.0 - ((avg - 2000.0).abs() / 1000.0 * 50.0).min(100.0)
}

fn stress_load_score(avg: f64) -> f64 {
    100.0 - avg.clamp(1.0, 10.0) / 10.0 * 100.0
}

fn bounded(avg: f64) -> f64 {
    avg.clamp(0.0, 100.0)
}

const DIMENSIONS: [(&str, Metric, fn(f64) -> f64); 6] = [
    ("Sleep", Metric::SleepHours, sleep_score),
    ("Movement", Metric::Steps, movement_score),
    ("Nutrition", Metric::Calories, nutrition_score),
    ("Stress load", Metric::Stress, stress_load_score),
    ("Wealth", Metric::WealthScore, bounded),
    ("Relations", Metric::RelationsScore, bounded),
];

/// Radar vertices for the window. Dimensions with no observations are left
/// out rather than reported as zero.
pub fn system_balance(days: &[DayMetrics]) -> Vec<BalanceDimension> {
    DIMENSIONS
        .iter()
        .filter_map(|(name, metric, score)| {
            let avg = average(days, *metric)?;
            Some(BalanceDimension {
                dimension: (*name).to_string(),
                score: score(avg),
            })
        })
        .collect()
}
