//! HTTP client implementation for the life-dashboard store.
//!
//! This module provides a reqwest-based implementation of the
//! [`LifeStoreClient`](crate::LifeStoreClient) trait that talks to the store's
//! PostgREST endpoint (`/rest/v1/<table>`).

use crate::config::Config;
use crate::{
    DailyScore, FoodEntry, LifeStoreClient, MentalHealthLog, SleepRecord, Source, StepRecord,
    StoreError, WomensHealthLog,
};
use async_trait::async_trait;
use chrono::NaiveDate;
use secrecy::{ExposeSecret, SecretString};

/// Client for the store's REST API using reqwest.
#[derive(Clone, Debug)]
pub struct ReqwestLifeStoreClient {
    base_url: String,
    api_key: SecretString,
    access_token: Option<SecretString>,
    client: reqwest::Client,
}

impl ReqwestLifeStoreClient {
    /// Create a new client instance.
    ///
    /// # Arguments
    /// * `base_url` - The project URL (e.g., "https://xyz.supabase.co")
    /// * `api_key` - The project api key, sent as `apikey` and, unless an
    ///   access token is set, as the bearer token
    pub fn new(base_url: &str, api_key: SecretString) -> Self {
        let client = reqwest::Client::builder()
            .user_agent(concat!("life_store_client/", env!("CARGO_PKG_VERSION")))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            access_token: None,
            client,
        }
    }

    /// Authenticate row reads as a signed-in user instead of the anonymous role.
    pub fn with_access_token(mut self, token: SecretString) -> Self {
        self.access_token = Some(token);
        self
    }

    pub fn from_config(cfg: &Config) -> Self {
        let client = Self::new(&cfg.base_url, cfg.api_key.clone());
        match &cfg.access_token {
            Some(token) => client.with_access_token(token.clone()),
            None => client,
        }
    }

    /// Build an authenticated GET request.
    fn get_request(&self, url: &str) -> reqwest::RequestBuilder {
        let bearer = self.access_token.as_ref().unwrap_or(&self.api_key);
        self.client
            .get(url)
            .header("apikey", self.api_key.expose_secret())
            .bearer_auth(bearer.expose_secret())
            .header(reqwest::header::ACCEPT, "application/json")
    }

    /// Select one user's rows of `source` dated on or after `since`.
    async fn select_rows<T: serde::de::DeserializeOwned>(
        &self,
        source: Source,
        user_id: &str,
        since: NaiveDate,
    ) -> Result<Vec<T>, StoreError> {
        if user_id.trim().is_empty() {
            return Err(StoreError::InvalidInput("user_id is empty".into()));
        }
        let url = format!("{}/rest/v1/{}", self.base_url, source.table());
        let date_col = source.date_column();
        let pairs: Vec<(&str, String)> = vec![
            ("select", source.columns().to_string()),
            ("user_id", format!("eq.{user_id}")),
            (date_col, format!("gte.{since}")),
            ("order", format!("{date_col}.asc")),
        ];
        let qp: Vec<(&str, &str)> = pairs.iter().map(|(k, v)| (*k, v.as_str())).collect();

        metrics::counter!("store_requests_total", "table" => source.table()).increment(1);
        let rows: Vec<T> = self.execute_json(self.get_request(&url).query(&qp)).await?;
        tracing::debug!(table = source.table(), rows = rows.len(), "store rows fetched");
        Ok(rows)
    }

    /// Execute a request and expect a JSON response.
    async fn execute_json<T: serde::de::DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, StoreError> {
        let resp = request.send().await?;
        self.handle_response(resp).await
    }

    /// Handle a response, converting status codes to appropriate errors.
    async fn handle_response<T: serde::de::DeserializeOwned>(
        &self,
        resp: reqwest::Response,
    ) -> Result<T, StoreError> {
        let status = resp.status();
        if !status.is_success() {
            return Err(self.error_from_response(resp).await);
        }
        // Read body as text first so a shape mismatch reports what came back.
        let text = resp.text().await?;
        serde_json::from_str::<T>(&text).map_err(|e| {
            let body_snippet: String = text.chars().take(512).collect();
            StoreError::Decode(format!("{e} - body: {body_snippet}"))
        })
    }

    /// Extract error information from a failed response.
    async fn error_from_response(&self, resp: reqwest::Response) -> StoreError {
        let status = resp.status().as_u16();
        let body = resp.text().await.unwrap_or_default();
        let body_snippet: String = body.chars().take(256).collect();

        match status {
            404 => StoreError::NotFound(body_snippet),
            401 | 403 => StoreError::Auth(body_snippet),
            400 | 422 => StoreError::InvalidInput(body_snippet),
            _ => StoreError::from_status(status, body_snippet),
        }
    }
}

#[async_trait]
impl LifeStoreClient for ReqwestLifeStoreClient {
    async fn get_sleep_records(
        &self,
        user_id: &str,
        since: NaiveDate,
    ) -> Result<Vec<SleepRecord>, StoreError> {
        self.select_rows(Source::Sleep, user_id, since).await
    }

    async fn get_mental_health_logs(
        &self,
        user_id: &str,
        since: NaiveDate,
    ) -> Result<Vec<MentalHealthLog>, StoreError> {
        self.select_rows(Source::MentalHealth, user_id, since).await
    }

    async fn get_step_records(
        &self,
        user_id: &str,
        since: NaiveDate,
    ) -> Result<Vec<StepRecord>, StoreError> {
        self.select_rows(Source::Steps, user_id, since).await
    }

    async fn get_food_entries(
        &self,
        user_id: &str,
        since: NaiveDate,
    ) -> Result<Vec<FoodEntry>, StoreError> {
        self.select_rows(Source::Food, user_id, since).await
    }

    async fn get_womens_health_logs(
        &self,
        user_id: &str,
        since: NaiveDate,
    ) -> Result<Vec<WomensHealthLog>, StoreError> {
        self.select_rows(Source::WomensHealth, user_id, since).await
    }

    async fn get_relations_scores(
        &self,
        user_id: &str,
        since: NaiveDate,
    ) -> Result<Vec<DailyScore>, StoreError> {
        self.select_rows(Source::RelationsScore, user_id, since)
            .await
    }

    async fn get_wealth_scores(
        &self,
        user_id: &str,
        since: NaiveDate,
    ) -> Result<Vec<DailyScore>, StoreError> {
        self.select_rows(Source::WealthScore, user_id, since).await
    }
}

#[cfg(test)]
mod tests {
    use crate::http_client::ReqwestLifeStoreClient;
    use secrecy::SecretString;

    #[tokio::test]
    async fn client_new_trims_trailing_slash() {
        let client =
            ReqwestLifeStoreClient::new("http://localhost/", SecretString::new("key".into()));
        assert_eq!(client.base_url, "http://localhost");
        assert!(client.access_token.is_none());
    }

    #[tokio::test]
    async fn empty_user_id_is_rejected_before_sending() {
        let client =
            ReqwestLifeStoreClient::new("http://127.0.0.1:9", SecretString::new("key".into()));
        let since = chrono::NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        let res = client
            .select_rows::<crate::SleepRecord>(crate::Source::Sleep, " ", since)
            .await;
        assert!(matches!(res, Err(crate::StoreError::InvalidInput(_))));
    }
}
