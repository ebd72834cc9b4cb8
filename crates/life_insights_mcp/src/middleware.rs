//! Middleware layer for cross-cutting concerns.
//!
//! Sits between the insights service and the store client so every table read
//! is timed and logged in one place.

use std::sync::Arc;
use std::time::Instant;

use chrono::NaiveDate;
use life_store_client::{
    DailyScore, FoodEntry, LifeStoreClient, MentalHealthLog, SleepRecord, StepRecord, StoreError,
    WomensHealthLog,
};
use tracing::debug;

/// Wraps a `LifeStoreClient` and logs the name, outcome and latency of each
/// call at debug level.
pub struct LoggingMiddleware<C: LifeStoreClient> {
    inner: Arc<C>,
}

impl<C: LifeStoreClient> Clone for LoggingMiddleware<C> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<C: LifeStoreClient> LoggingMiddleware<C> {
    /// Create a new logging middleware wrapper.
    pub fn new(client: C) -> Self {
        Self {
            inner: Arc::new(client),
        }
    }

    /// Execute a fallible operation with logging.
    async fn with_logging<F, Fut, T>(&self, operation: F, name: &str) -> Result<T, StoreError>
    where
        F: FnOnce(Arc<C>) -> Fut,
        Fut: std::future::Future<Output = Result<T, StoreError>>,
    {
        let start = Instant::now();
        debug!("Starting operation: {}", name);

        let result = operation(self.inner.clone()).await;

        let duration = start.elapsed();
        match &result {
            Ok(_) => {
                debug!(
                    "Operation completed successfully: {} in {:?}",
                    name, duration
                );
            }
            Err(e) => {
                debug!(
                    "Operation failed: {} in {:?} - error: {}",
                    name, duration, e
                );
            }
        }

        result
    }
}

#[async_trait::async_trait]
impl<C: LifeStoreClient + 'static> LifeStoreClient for LoggingMiddleware<C> {
    async fn get_sleep_records(
        &self,
        user_id: &str,
        since: NaiveDate,
    ) -> Result<Vec<SleepRecord>, StoreError> {
        self.with_logging(
            |client| async move { client.get_sleep_records(user_id, since).await },
            "get_sleep_records",
        )
        .await
    }

    async fn get_mental_health_logs(
        &self,
        user_id: &str,
        since: NaiveDate,
    ) -> Result<Vec<MentalHealthLog>, StoreError> {
        self.with_logging(
            |client| async move { client.get_mental_health_logs(user_id, since).await },
            "get_mental_health_logs",
        )
        .await
    }

    async fn get_step_records(
        &self,
        user_id: &str,
        since: NaiveDate,
    ) -> Result<Vec<StepRecord>, StoreError> {
        self.with_logging(
            |client| async move { client.get_step_records(user_id, since).await },
            "get_step_records",
        )
        .await
    }

    async fn get_food_entries(
        &self,
        user_id: &str,
        since: NaiveDate,
    ) -> Result<Vec<FoodEntry>, StoreError> {
        self.with_logging(
            |client| async move { client.get_food_entries(user_id, since).await },
            "get_food_entries",
        )
        .await
    }

    async fn get_womens_health_logs(
        &self,
        user_id: &str,
        since: NaiveDate,
    ) -> Result<Vec<WomensHealthLog>, StoreError> {
        self.with_logging(
            |client| async move { client.get_womens_health_logs(user_id, since).await },
            "get_womens_health_logs",
        )
        .await
    }

    async fn get_relations_scores(
        &self,
        user_id: &str,
        since: NaiveDate,
    ) -> Result<Vec<DailyScore>, StoreError> {
        self.with_logging(
            |client| async move { client.get_relations_scores(user_id, since).await },
            "get_relations_scores",
        )
        .await
    }

    async fn get_wealth_scores(
        &self,
        user_id: &str,
        since: NaiveDate,
    ) -> Result<Vec<DailyScore>, StoreError> {
        self.with_logging(
            |client| async move { client.get_wealth_scores(user_id, since).await },
            "get_wealth_scores",
        )
        .await
    }
}
