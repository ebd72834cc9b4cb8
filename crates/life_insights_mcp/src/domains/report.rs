//! One complete insights computation over an aggregated window.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use rand::Rng;
use schemars::JsonSchema;
use serde::Serialize;

use super::balance::{BalanceDimension, system_balance};
use super::correlation::{
    CorrelationResult, ImpactFactor, core_correlations, extended_correlations, impact_ranking,
};
use super::daily::DayMetrics;
use super::demo::{needs_demo_data, synthesize_demo_days};
use super::experiment::{SleepExperiment, sleep_mood_experiment};

/// Inclusive date range `[start, end]` a report covers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct DateWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateWindow {
    /// The `days_back` days before `end` plus `end` itself.
    pub fn trailing(end: NaiveDate, days_back: u32) -> Self {
        Self {
            start: end - Duration::days(i64::from(days_back)),
            end,
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

#[derive(Clone, Debug, Serialize, JsonSchema)]
pub struct InsightsReport {
    pub user_id: String,
    #[schemars(with = "String")]
    pub window_start: NaiveDate,
    #[schemars(with = "String")]
    pub window_end: NaiveDate,
    pub days: Vec<DayMetrics>,
    pub using_demo_data: bool,
    pub correlations: Vec<CorrelationResult>,
    pub extended_correlations: Vec<CorrelationResult>,
    pub impact: Vec<ImpactFactor>,
    pub balance: Vec<BalanceDimension>,
    pub experiment: Option<SleepExperiment>,
    #[schemars(with = "String")]
    pub generated_at: DateTime<Utc>,
}

impl InsightsReport {
    pub fn all_correlations(&self) -> impl Iterator<Item = &CorrelationResult> {
        self.correlations.iter().chain(&self.extended_correlations)
    }
}

/// Run every analysis over `real_days`, swapping in synthetic days first when
/// the real history is too short.
pub fn build_report<R: Rng>(
    user_id: &str,
    window: DateWindow,
    real_days: Vec<DayMetrics>,
    rng: &mut R,
) -> InsightsReport {
    let using_demo_data = needs_demo_data(&real_days);
    let days = if using_demo_data {
        tracing::debug!(
            user_id,
            real_days = real_days.len(),
            "history too short, using demo data"
        );
        synthesize_demo_days(window.end, rng)
    } else {
        real_days
    };

    let correlations = core_correlations(&days);
    let extended = extended_correlations(&days);
    let all: Vec<CorrelationResult> = correlations.iter().chain(&extended).cloned().collect();

    InsightsReport {
        user_id: user_id.to_string(),
        window_start: window.start,
        window_end: window.end,
        impact: impact_ranking(&all),
        balance: system_balance(&days),
        experiment: sleep_mood_experiment(&days),
        correlations,
        extended_correlations: extended,
        days,
        using_demo_data,
        generated_at: Utc::now(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn window() -> DateWindow {
        DateWindow::trailing(NaiveDate::from_ymd_opt(2024, 6, 30).unwrap(), 30)
    }

    fn real_days(n: u32) -> Vec<DayMetrics> {
        (0..n)
            .map(|i| DayMetrics {
                sleep_hours: Some(5.0 + f64::from(i % 5)),
                mood: Some(3.0 + f64::from(i % 5) * 1.2),
                steps: Some(4000.0 + f64::from(i) * 100.0),
                ..DayMetrics::new(NaiveDate::from_ymd_opt(2024, 6, 1 + i).unwrap())
            })
            .collect()
    }

    #[test]
    fn trailing_window_is_inclusive() {
        let w = window();
        assert_eq!(w.start, NaiveDate::from_ymd_opt(2024, 5, 31).unwrap());
        assert!(w.contains(w.start));
        assert!(w.contains(w.end));
        assert!(!w.contains(w.end + Duration::days(1)));
    }

    #[test]
    fn six_real_days_switch_to_demo() {
        let mut rng = StdRng::seed_from_u64(1);
        let report = build_report("u-1", window(), real_days(6), &mut rng);
        assert!(report.using_demo_data);
        assert_eq!(report.days.len(), 14);
        assert_eq!(report.days.last().unwrap().date, window().end);
        assert_eq!(report.correlations.len(), 3);
        assert_eq!(report.extended_correlations.len(), 4);
    }

    #[test]
    fn seven_real_days_are_kept() {
        let mut rng = StdRng::seed_from_u64(1);
        let days = real_days(7);
        let report = build_report("u-1", window(), days.clone(), &mut rng);
        assert!(!report.using_demo_data);
        assert_eq!(report.days, days);

        let sleep_mood = &report.correlations[0];
        assert_eq!(sleep_mood.label, "Sleep ↔ Mood");
        assert!((sleep_mood.value.unwrap() - 1.0).abs() < 1e-9);
        assert_eq!(report.impact[0].factor, "Sleep");

        // Only sleep and steps are recorded, so only those axes appear.
        let dims: Vec<&str> = report
            .balance
            .iter()
            .map(|b| b.dimension.as_str())
            .collect();
        assert_eq!(dims, ["Sleep", "Movement"]);
        assert!(report.experiment.is_some());
        assert_eq!(report.all_correlations().count(), 7);
    }
}
