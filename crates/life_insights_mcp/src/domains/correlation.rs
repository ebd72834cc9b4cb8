//! Pairwise Pearson correlations over the daily series and the mood-impact
//! ranking derived from them.

use schemars::JsonSchema;
use serde::Serialize;

use super::daily::DayMetrics;

/// Fewest paired observations a coefficient is reported for.
pub const MIN_PAIRS: usize = 3;

/// Pearson correlation coefficient of two equally long series.
///
/// Returns `None` when the lengths differ, there are fewer than [`MIN_PAIRS`]
/// points, or either series has no variance. Never returns NaN or infinity.
pub fn pearson(x: &[f64], y: &[f64]) -> Option<f64> {
    if x.len() != y.len() || x.len() < MIN_PAIRS {
        return None;
    }
    let n = x.len() as f64;
    let mean_x = x.iter().sum::<f64>() / n;
    let mean_y = y.iter().sum::<f64>() / n;

    let mut cov = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for (xi, yi) in x.iter().zip(y) {
        let dx = xi - mean_x;
        let dy = yi - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }
    if var_x == 0.0 || var_y == 0.0 {
        return None;
    }
    let r = cov / (var_x * var_y).sqrt();
    r.is_finite().then_some(r.clamp(-1.0, 1.0))
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub enum Metric {
    SleepHours,
    Mood,
    Steps,
    Calories,
    PainLevel,
    Stress,
    Energy,
    RelationsScore,
    WealthScore,
}

impl Metric {
    pub fn value(self, day: &DayMetrics) -> Option<f64> {
        match self {
            Metric::SleepHours => day.sleep_hours,
            Metric::Mood => day.mood,
            Metric::Steps => day.steps,
            Metric::Calories => day.calories,
            Metric::PainLevel => day.pain_level,
            Metric::Stress => day.stress,
            Metric::Energy => day.energy,
            Metric::RelationsScore => day.relations_score,
            Metric::WealthScore => day.wealth_score,
        }
    }
}

/// Values of two metrics on the days where both were observed.
pub fn paired_values(days: &[DayMetrics], x: Metric, y: Metric) -> (Vec<f64>, Vec<f64>) {
    days.iter()
        .filter_map(|d| Some((x.value(d)?, y.value(d)?)))
        .unzip()
}

pub fn pearson_for(days: &[DayMetrics], x: Metric, y: Metric) -> Option<f64> {
    let (xs, ys) = paired_values(days, x, y);
    pearson(&xs, &ys)
}

pub struct CorrelationPair {
    pub x: Metric,
    pub y: Metric,
    pub label: &'static str,
    pub description: &'static str,
}

/// Pairs shown on the main insights card.
pub const CORE_PAIRS: [CorrelationPair; 3] = [
    CorrelationPair {
        x: Metric::SleepHours,
        y: Metric::Mood,
        label: "Sleep ↔ Mood",
        description: "Do nights with more sleep come before better-mood days?",
    },
    CorrelationPair {
        x: Metric::SleepHours,
        y: Metric::Steps,
        label: "Sleep ↔ Steps",
        description: "Are you more active on days after longer sleep?",
    },
    CorrelationPair {
        x: Metric::Steps,
        y: Metric::Mood,
        label: "Steps ↔ Mood",
        description: "Does moving more go together with a better mood?",
    },
];

pub const EXTENDED_PAIRS: [CorrelationPair; 4] = [
    CorrelationPair {
        x: Metric::Stress,
        y: Metric::Mood,
        label: "Stress ↔ Mood",
        description: "How strongly does daily stress track your mood?",
    },
    CorrelationPair {
        x: Metric::Calories,
        y: Metric::Mood,
        label: "Calories ↔ Mood",
        description: "Does how much you eat relate to how you feel?",
    },
    CorrelationPair {
        x: Metric::PainLevel,
        y: Metric::Mood,
        label: "Pain ↔ Mood",
        description: "Do higher-pain cycle days pull your mood down?",
    },
    CorrelationPair {
        x: Metric::RelationsScore,
        y: Metric::Mood,
        label: "Relations ↔ Mood",
        description: "Do better relationship days line up with better moods?",
    },
];

#[derive(Clone, Debug, PartialEq, Serialize, JsonSchema)]
pub struct CorrelationResult {
    pub label: String,
    pub description: String,
    /// `None` means not enough data, not "no relationship".
    pub value: Option<f64>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Strength {
    Strong,
    Moderate,
    Weak,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Positive,
    Negative,
}

impl CorrelationResult {
    pub fn strength(&self) -> Option<Strength> {
        let r = self.value?.abs();
        Some(if r >= 0.7 {
            Strength::Strong
        } else if r >= 0.4 {
            Strength::Moderate
        } else {
            Strength::Weak
        })
    }

    pub fn direction(&self) -> Option<Direction> {
        self.value.map(|r| {
            if r < 0.0 {
                Direction::Negative
            } else {
                Direction::Positive
            }
        })
    }

    /// One-line reading such as "strong positive" or "not enough data".
    pub fn summary(&self) -> String {
        match (self.strength(), self.direction()) {
            (Some(s), Some(d)) => format!(
                "{} {}",
                format!("{s:?}").to_lowercase(),
                format!("{d:?}").to_lowercase()
            ),
            _ => "not enough data".to_string(),
        }
    }
}

pub fn correlate(days: &[DayMetrics], pair: &CorrelationPair) -> CorrelationResult {
    CorrelationResult {
        label: pair.label.to_string(),
        description: pair.description.to_string(),
        value: pearson_for(days, pair.x, pair.y),
    }
}

pub fn core_correlations(days: &[DayMetrics]) -> Vec<CorrelationResult> {
    CORE_PAIRS.iter().map(|p| correlate(days, p)).collect()
}

pub fn extended_correlations(days: &[DayMetrics]) -> Vec<CorrelationResult> {
    EXTENDED_PAIRS.iter().map(|p| correlate(days, p)).collect()
}

#[derive(Clone, Debug, PartialEq, Serialize, JsonSchema)]
pub struct ImpactFactor {
    pub factor: String,
    pub impact: f64,
}

const MOOD: &str = "Mood";
const PAIR_SEPARATOR: &str = " ↔ ";

/// Rank the factors correlated with mood by `|r|`, strongest first. Results
/// without a coefficient are left out.
pub fn impact_ranking(results: &[CorrelationResult]) -> Vec<ImpactFactor> {
    let mut ranked: Vec<ImpactFactor> = results
        .iter()
        .filter(|r| r.label.contains(MOOD))
        .filter_map(|r| {
            let value = r.value.filter(|v| v.is_finite())?;
            let factor = r
                .label
                .split(PAIR_SEPARATOR)
                .find(|part| *part != MOOD)
                .unwrap_or(&r.label);
            Some(ImpactFactor {
                factor: factor.to_string(),
                impact: value.abs(),
            })
        })
        .collect();
    ranked.sort_by(|a, b| b.impact.total_cmp(&a.impact));
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn pearson_null_safety() {
        assert_eq!(pearson(&[1.0, 1.0, 1.0], &[2.0, 3.0, 4.0]), None);
        assert_eq!(pearson(&[1.0, 2.0, 3.0], &[5.0, 5.0, 5.0]), None);
        assert_eq!(pearson(&[1.0, 2.0], &[3.0, 4.0]), None);
        assert_eq!(pearson(&[], &[]), None);
        assert_eq!(pearson(&[1.0, 2.0, 3.0], &[1.0, 2.0]), None);
    }

    #[test]
    fn pearson_sign_and_magnitude() {
        let x = [1.0, 2.0, 3.0, 4.0, 5.0];
        let up = pearson(&x, &[2.0, 4.0, 6.0, 8.0, 10.0]).unwrap();
        let down = pearson(&x, &[10.0, 8.0, 6.0, 4.0, 2.0]).unwrap();
        assert!(close(up, 1.0));
        assert!(close(down, -1.0));

        let partial = pearson(&[1.0, 2.0, 3.0, 4.0], &[1.0, 3.0, 2.0, 4.0]).unwrap();
        assert!(close(partial, 0.8));
    }

    fn day(d: u32, sleep: Option<f64>, mood: Option<f64>) -> DayMetrics {
        DayMetrics {
            sleep_hours: sleep,
            mood,
            ..DayMetrics::new(NaiveDate::from_ymd_opt(2024, 1, d).unwrap())
        }
    }

    #[test]
    fn pairs_use_listwise_deletion() {
        let days = vec![
            day(1, Some(8.0), Some(8.0)),
            day(2, Some(5.0), None),
            day(3, None, Some(2.0)),
            day(4, Some(6.0), Some(5.0)),
            day(5, Some(7.0), Some(7.0)),
        ];
        let (xs, ys) = paired_values(&days, Metric::SleepHours, Metric::Mood);
        assert_eq!(xs, vec![8.0, 6.0, 7.0]);
        assert_eq!(ys, vec![8.0, 5.0, 7.0]);
    }

    #[test]
    fn two_days_are_not_enough_even_when_obvious() {
        let days = vec![day(1, Some(8.0), Some(8.0)), day(2, Some(5.0), Some(4.0))];
        let results = core_correlations(&days);
        assert_eq!(results[0].label, "Sleep ↔ Mood");
        assert_eq!(results[0].value, None);
        assert_eq!(results[0].summary(), "not enough data");
    }

    #[test]
    fn strength_tiers_and_direction() {
        let r = |v: f64| CorrelationResult {
            label: "x".into(),
            description: String::new(),
            value: Some(v),
        };
        assert_eq!(r(0.7).strength(), Some(Strength::Strong));
        assert_eq!(r(-0.45).strength(), Some(Strength::Moderate));
        assert_eq!(r(0.39).strength(), Some(Strength::Weak));
        assert_eq!(r(-0.2).direction(), Some(Direction::Negative));
        assert_eq!(r(0.0).direction(), Some(Direction::Positive));
        assert_eq!(r(-0.8).summary(), "strong negative");
    }

    #[test]
    fn seven_pairs_are_computed() {
        assert_eq!(CORE_PAIRS.len() + EXTENDED_PAIRS.len(), 7);
        let days: Vec<DayMetrics> = Vec::new();
        assert!(core_correlations(&days).iter().all(|r| r.value.is_none()));
        assert!(
            extended_correlations(&days)
                .iter()
                .all(|r| r.value.is_none())
        );
    }

    #[test]
    fn impact_ranking_keeps_mood_pairs_sorted_by_abs() {
        let mk = |label: &str, value: Option<f64>| CorrelationResult {
            label: label.into(),
            description: String::new(),
            value,
        };
        let results = vec![
            mk("Sleep ↔ Mood", Some(0.42)),
            mk("Sleep ↔ Steps", Some(0.99)),
            mk("Steps ↔ Mood", Some(0.1)),
            mk("Stress ↔ Mood", Some(-0.8)),
            mk("Pain ↔ Mood", None),
            mk("Calories ↔ Mood", Some(f64::NAN)),
        ];
        let ranked = impact_ranking(&results);
        let factors: Vec<&str> = ranked.iter().map(|f| f.factor.as_str()).collect();
        assert_eq!(factors, ["Stress", "Sleep", "Steps"]);
        assert!(close(ranked[0].impact, 0.8));
    }
}
