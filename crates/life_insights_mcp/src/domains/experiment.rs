use schemars::JsonSchema;
use serde::Serialize;

use super::correlation::{Metric, paired_values};
use super::daily::DayMetrics;

pub const SLEEP_THRESHOLD_HOURS: f64 = 7.0;
pub const MIN_EXPERIMENT_PAIRS: usize = 4;

/// Mood on well-slept nights versus short nights.
#[derive(Clone, Debug, PartialEq, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SleepExperiment {
    pub threshold: f64,
    pub avg_mood_good: f64,
    pub avg_mood_short: f64,
    pub diff: f64,
}

fn mean(values: &[f64]) -> Option<f64> {
    (!values.is_empty()).then(|| values.iter().sum::<f64>() / values.len() as f64)
}

fn round1(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}

/// Split days with both sleep and mood at [`SLEEP_THRESHOLD_HOURS`] and compare
/// mean mood. `None` with fewer than [`MIN_EXPERIMENT_PAIRS`] pairs or when
/// either side is empty.
pub fn sleep_mood_experiment(days: &[DayMetrics]) -> Option<SleepExperiment> {
    let (sleep, mood) = paired_values(days, Metric::SleepHours, Metric::Mood);
    if sleep.len() < MIN_EXPERIMENT_PAIRS {
        return None;
    }

    let (good, short): (Vec<(f64, f64)>, Vec<(f64, f64)>) = sleep
        .into_iter()
        .zip(mood)
        .partition(|(hours, _)| *hours >= SLEEP_THRESHOLD_HOURS);
    let good: Vec<f64> = good.into_iter().map(|(_, m)| m).collect();
    let short: Vec<f64> = short.into_iter().map(|(_, m)| m).collect();

    let avg_good = mean(&good)?;
    let avg_short = mean(&short)?;
    Some(SleepExperiment {
        threshold: SLEEP_THRESHOLD_HOURS,
        avg_mood_good: round1(avg_good),
        avg_mood_short: round1(avg_short),
        diff: round1(avg_good - avg_short),
    })
}
