//! Synthetic fallback series for users without enough history.
//!
//! The curves are coupled (sleep drives steps, mood, calories, stress and
//! energy; pain follows a 14-day cycle) so correlations over demo data come
//! out non-degenerate and tell a coherent story.

use std::f64::consts::PI;

use chrono::{Duration, NaiveDate};
use rand::Rng;

use super::daily::DayMetrics;

/// Real series shorter than this are replaced by demo data.
pub const DEMO_TRIGGER_MIN_DAYS: usize = 7;
pub const DEMO_DAYS: usize = 14;

pub fn needs_demo_data(days: &[DayMetrics]) -> bool {
    days.len() < DEMO_TRIGGER_MIN_DAYS
}

fn jitter<R: Rng>(rng: &mut R, r: f64) -> f64 {
    rng.random_range(-r..=r)
}

fn round1(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}

/// Generate [`DEMO_DAYS`] consecutive days ending at `today`, oldest first.
pub fn synthesize_demo_days<R: Rng>(today: NaiveDate, rng: &mut R) -> Vec<DayMetrics> {
    (0..DEMO_DAYS)
        .map(|index| {
            let days_from_end = (DEMO_DAYS - 1 - index) as f64;
            let date = today - Duration::days(days_from_end as i64);

            let phase = days_from_end / 3.0;
            let sleep = (6.3 + phase.sin() * 1.1 + jitter(rng, 0.15)).clamp(4.5, 9.0);
            let steps = (5000.0 + (sleep - 6.5) * 1200.0 + jitter(rng, 500.0)).round();
            let mood = (6.0 + (sleep - 7.0) * 0.9 + jitter(rng, 0.4)).clamp(2.0, 10.0);
            let calories =
                (1900.0 + (sleep - 7.0) * 120.0 + (steps - 6000.0) * 0.1 + jitter(rng, 100.0))
                    .round();

            let pain_phase = index as f64 / DEMO_DAYS as f64 * 2.0 * PI;
            let pain = (3.0 + pain_phase.sin() * 3.0 + jitter(rng, 0.5))
                .round()
                .clamp(0.0, 10.0);
            let relations = (65.0 + (mood - 6.0) * 4.0 + jitter(rng, 5.0))
                .round()
                .clamp(40.0, 100.0);
            let stress = round1((6.0 - (sleep - 7.0) - (mood - 6.0) * 0.5) + jitter(rng, 0.5))
                .clamp(1.0, 10.0);
            let energy = round1((5.0 + (sleep - 7.0) * 0.8) + jitter(rng, 0.5)).clamp(1.0, 10.0);

            DayMetrics {
                sleep_hours: Some(sleep),
                mood: Some(mood),
                steps: Some(steps),
                calories: Some(calories),
                pain_level: Some(pain),
                stress: Some(stress),
                energy: Some(energy),
                relations_score: Some(relations),
                ..DayMetrics::new(date)
            }
        })
        .collect()
}
