//! Shared test utilities and a canned `LifeStoreClient` used by unit tests.
#![cfg(test)]

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::NaiveDate;
use life_store_client::{
    DailyScore, FoodEntry, LifeStoreClient, MentalHealthLog, SleepRecord, Source, StepRecord,
    StoreError, WomensHealthLog,
};
use tokio::sync::Notify;

use crate::domains::SourceRows;

/// Serves fixed rows per table, optionally failing selected tables with a 503,
/// and counts every call.
#[derive(Default)]
pub struct MockStoreClient {
    rows: SourceRows,
    failing: HashSet<Source>,
    calls: AtomicUsize,
    sleep_gate: Mutex<Option<(Arc<Notify>, Arc<Notify>)>>,
}

impl MockStoreClient {
    pub fn with_rows(rows: SourceRows) -> Self {
        Self {
            rows,
            ..Default::default()
        }
    }

    pub fn with_sleep(mut self, sleep: Vec<SleepRecord>) -> Self {
        self.rows.sleep = sleep;
        self
    }

    pub fn failing(mut self, source: Source) -> Self {
        self.failing.insert(source);
        self
    }

    /// Hold the next sleep fetch: `entered` is notified once it starts, and it
    /// completes after `release` is notified. Later fetches are not held.
    pub fn with_sleep_gate(self, entered: Arc<Notify>, release: Arc<Notify>) -> Self {
        *self.sleep_gate.lock().unwrap() = Some((entered, release));
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn serve<T: Clone>(&self, source: Source, rows: &[T]) -> Result<Vec<T>, StoreError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing.contains(&source) {
            return Err(StoreError::Api {
                status: 503,
                body: format!("{source} unavailable"),
            });
        }
        Ok(rows.to_vec())
    }
}

#[async_trait]
impl LifeStoreClient for MockStoreClient {
    async fn get_sleep_records(
        &self,
        _user_id: &str,
        _since: NaiveDate,
    ) -> Result<Vec<SleepRecord>, StoreError> {
        let gate = self.sleep_gate.lock().unwrap().take();
        if let Some((entered, release)) = gate {
            entered.notify_one();
            release.notified().await;
        }
        self.serve(Source::Sleep, &self.rows.sleep)
    }

    async fn get_mental_health_logs(
        &self,
        _user_id: &str,
        _since: NaiveDate,
    ) -> Result<Vec<MentalHealthLog>, StoreError> {
        self.serve(Source::MentalHealth, &self.rows.mental_health)
    }

    async fn get_step_records(
        &self,
        _user_id: &str,
        _since: NaiveDate,
    ) -> Result<Vec<StepRecord>, StoreError> {
        self.serve(Source::Steps, &self.rows.steps)
    }

    async fn get_food_entries(
        &self,
        _user_id: &str,
        _since: NaiveDate,
    ) -> Result<Vec<FoodEntry>, StoreError> {
        self.serve(Source::Food, &self.rows.food)
    }

    async fn get_womens_health_logs(
        &self,
        _user_id: &str,
        _since: NaiveDate,
    ) -> Result<Vec<WomensHealthLog>, StoreError> {
        self.serve(Source::WomensHealth, &self.rows.womens_health)
    }

    async fn get_relations_scores(
        &self,
        _user_id: &str,
        _since: NaiveDate,
    ) -> Result<Vec<DailyScore>, StoreError> {
        self.serve(Source::RelationsScore, &self.rows.relations)
    }

    async fn get_wealth_scores(
        &self,
        _user_id: &str,
        _since: NaiveDate,
    ) -> Result<Vec<DailyScore>, StoreError> {
        self.serve(Source::WealthScore, &self.rows.wealth)
    }
}

/// Ten consecutive days of sleep, mood and steps ending at `end`, with mood
/// tracking sleep exactly.
pub fn ten_day_rows(end: NaiveDate) -> SourceRows {
    let mut rows = SourceRows::default();
    for i in 0..10u32 {
        let date = end - chrono::Duration::days(i64::from(9 - i));
        let hours = 5.0 + f64::from(i % 4);
        rows.sleep.push(SleepRecord {
            sleep_duration_hours: Some(hours),
            created_at: format!("{date}T07:00:00Z"),
        });
        rows.mental_health.push(MentalHealthLog {
            mood_rating: Some(hours - 1.0),
            stress_level: Some(10.0 - hours),
            energy_level: None,
            logged_at: format!("{date}T20:00:00Z"),
        });
        rows.steps.push(StepRecord {
            steps: Some(3000.0 + f64::from(i) * 250.0),
            date: date.to_string(),
        });
    }
    rows
}
