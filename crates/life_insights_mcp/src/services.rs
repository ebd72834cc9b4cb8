use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::NaiveDate;
use secrecy::SecretString;
use tokio::sync::Mutex;

use life_store_client::config::MAX_WINDOW_DAYS;
use life_store_client::webhook::{Deduper, RawWriteEvent, verify_hmac};
use life_store_client::{LifeStoreClient, Source, StoreError};

use crate::ObjectResult;
use crate::domains::{DateWindow, InsightsReport, SourceRows, aggregate_days, build_report};
use crate::error::{McpError, McpResult};

/// Longest trailing window a caller may ask for.
pub const MAX_DAYS_BACK: u32 = MAX_WINDOW_DAYS;

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
struct CacheKey {
    user_id: String,
    window: DateWindow,
}

struct CacheEntry {
    report: Arc<InsightsReport>,
    stored_at: Instant,
}

#[derive(Default)]
struct CacheState {
    entries: HashMap<CacheKey, CacheEntry>,
    /// Bumped on every invalidation of a user.
    generations: HashMap<String, u64>,
}

impl CacheState {
    fn generation(&self, user_id: &str) -> u64 {
        self.generations.get(user_id).copied().unwrap_or(0)
    }
}

/// Finished reports per (user, window) with a fixed time-to-live.
///
/// A report is only stored if its user was not invalidated between the cache
/// miss and the insert.
#[derive(Clone)]
pub struct InsightsCache {
    ttl: Duration,
    state: Arc<Mutex<CacheState>>,
}

impl InsightsCache {
    /// A `ttl_secs` of `0` disables caching.
    pub fn new(ttl_secs: u64) -> Self {
        Self {
            ttl: Duration::from_secs(ttl_secs),
            state: Arc::new(Mutex::new(CacheState::default())),
        }
    }

    pub fn is_enabled(&self) -> bool {
        !self.ttl.is_zero()
    }

    async fn get(&self, key: &CacheKey) -> Option<Arc<InsightsReport>> {
        self.lookup(key, Instant::now()).await
    }

    async fn lookup(&self, key: &CacheKey, now: Instant) -> Option<Arc<InsightsReport>> {
        if !self.is_enabled() {
            return None;
        }
        let mut state = self.state.lock().await;
        let map = &mut state.entries;
        let fresh = match map.get(key) {
            Some(entry) if now.duration_since(entry.stored_at) < self.ttl => {
                Some(entry.report.clone())
            }
            Some(_) => {
                map.remove(key);
                None
            }
            None => None,
        };
        if fresh.is_some() {
            metrics::counter!("insights_cache_hits_total").increment(1);
        } else {
            metrics::counter!("insights_cache_misses_total").increment(1);
        }
        fresh
    }

    /// Invalidation generation of `user_id`, taken before fetching rows.
    async fn generation(&self, user_id: &str) -> u64 {
        self.state.lock().await.generation(user_id)
    }

    /// Store `report` unless `user_id` was invalidated after `generation` was
    /// read. Returns whether the report was stored.
    async fn insert(&self, key: CacheKey, report: Arc<InsightsReport>, generation: u64) -> bool {
        if !self.is_enabled() {
            return false;
        }
        let mut state = self.state.lock().await;
        if state.generation(&key.user_id) != generation {
            tracing::debug!(
                user_id = %key.user_id,
                "user invalidated during fetch, report not cached"
            );
            return false;
        }
        state.entries.insert(
            key,
            CacheEntry {
                report,
                stored_at: Instant::now(),
            },
        );
        true
    }

    /// Drop every window cached for `user_id`; returns how many were removed.
    /// Reports still being computed for the user will not be cached.
    pub async fn invalidate_user(&self, user_id: &str) -> usize {
        let mut state = self.state.lock().await;
        *state.generations.entry(user_id.to_string()).or_default() += 1;
        let before = state.entries.len();
        state.entries.retain(|k, _| k.user_id != user_id);
        before - state.entries.len()
    }

    pub async fn len(&self) -> usize {
        self.state.lock().await.entries.len()
    }
}

#[derive(Clone)]
pub struct InsightsService {
    client: Arc<dyn LifeStoreClient>,
    cache: InsightsCache,
    window_days: u32,
}

impl InsightsService {
    pub fn new(client: Arc<dyn LifeStoreClient>, cache: InsightsCache, window_days: u32) -> Self {
        Self {
            client,
            cache,
            window_days,
        }
    }

    pub fn window_days(&self) -> u32 {
        self.window_days
    }

    pub fn cache(&self) -> &InsightsCache {
        &self.cache
    }

    /// Report for the trailing `days_back` window (or the configured default)
    /// ending today. "Today" is the UTC date, the same calendar row timestamps
    /// are keyed by.
    pub async fn report(
        &self,
        user_id: &str,
        days_back: Option<u32>,
    ) -> McpResult<Arc<InsightsReport>> {
        self.report_as_of(user_id, days_back, chrono::Utc::now().date_naive())
            .await
    }

    pub async fn report_as_of(
        &self,
        user_id: &str,
        days_back: Option<u32>,
        today: NaiveDate,
    ) -> McpResult<Arc<InsightsReport>> {
        let days_back = days_back.unwrap_or(self.window_days);
        if days_back == 0 || days_back > MAX_DAYS_BACK {
            return Err(McpError::Validation(format!(
                "days_back must be between 1 and {MAX_DAYS_BACK}, got {days_back}"
            )));
        }
        self.report_for_window(user_id, DateWindow::trailing(today, days_back))
            .await
    }

    pub async fn report_for_window(
        &self,
        user_id: &str,
        window: DateWindow,
    ) -> McpResult<Arc<InsightsReport>> {
        let user_id = user_id.trim();
        if user_id.is_empty() {
            return Err(McpError::Validation("user_id must not be empty".into()));
        }

        let key = CacheKey {
            user_id: user_id.to_string(),
            window,
        };
        let generation = self.cache.generation(user_id).await;
        if let Some(hit) = self.cache.get(&key).await {
            tracing::debug!(user_id, "insights served from cache");
            return Ok(hit);
        }

        let rows = self.load_rows(user_id, window.start).await;
        let report = Arc::new(compute_report(user_id, window, &rows));
        tracing::info!(
            user_id,
            rows = rows.total_rows(),
            days = report.days.len(),
            demo = report.using_demo_data,
            "insights computed"
        );
        self.cache.insert(key, report.clone(), generation).await;
        Ok(report)
    }

    /// Fetch every source concurrently. A failed source is logged, counted and
    /// treated as empty.
    pub async fn load_rows(&self, user_id: &str, since: NaiveDate) -> SourceRows {
        let c = &self.client;
        let (sleep, mental, steps, food, womens, relations, wealth) = tokio::join!(
            c.get_sleep_records(user_id, since),
            c.get_mental_health_logs(user_id, since),
            c.get_step_records(user_id, since),
            c.get_food_entries(user_id, since),
            c.get_womens_health_logs(user_id, since),
            c.get_relations_scores(user_id, since),
            c.get_wealth_scores(user_id, since),
        );

        SourceRows {
            sleep: rows_or_empty(Source::Sleep, user_id, sleep),
            mental_health: rows_or_empty(Source::MentalHealth, user_id, mental),
            steps: rows_or_empty(Source::Steps, user_id, steps),
            food: rows_or_empty(Source::Food, user_id, food),
            womens_health: rows_or_empty(Source::WomensHealth, user_id, womens),
            relations: rows_or_empty(Source::RelationsScore, user_id, relations),
            wealth: rows_or_empty(Source::WealthScore, user_id, wealth),
        }
    }

    pub async fn invalidate_user(&self, user_id: &str) -> usize {
        let removed = self.cache.invalidate_user(user_id).await;
        tracing::debug!(user_id, removed, "insights cache invalidated");
        removed
    }
}

fn rows_or_empty<T>(source: Source, user_id: &str, result: Result<Vec<T>, StoreError>) -> Vec<T> {
    match result {
        Ok(rows) => rows,
        Err(e) => {
            tracing::warn!(
                %source,
                user_id,
                error = %e,
                "source fetch failed, continuing without it"
            );
            metrics::counter!("insights_source_failures_total", "source" => source.table())
                .increment(1);
            Vec::new()
        }
    }
}

/// Aggregation and analysis; sync so the thread-local RNG never crosses an await.
fn compute_report(user_id: &str, window: DateWindow, rows: &SourceRows) -> InsightsReport {
    let days = aggregate_days(rows)
        .into_iter()
        .filter(|d| window.contains(d.date))
        .collect();
    build_report(user_id, window, days, &mut rand::rng())
}

#[derive(Clone)]
pub struct WebhookService {
    secret: Option<SecretString>,
    deduper: Arc<Deduper>,
    insights: InsightsService,
}

impl WebhookService {
    pub fn new(secret: Option<SecretString>, insights: InsightsService) -> Self {
        Self {
            secret,
            deduper: Arc::new(Deduper::new()),
            insights,
        }
    }

    pub fn is_configured(&self) -> bool {
        self.secret.is_some()
    }

    /// Verify, dedupe and apply one raw-write notification. `signature` is the
    /// `x-signature` header value (`sha256=<hex>`) over `body`.
    pub async fn process_webhook(
        &self,
        signature: Option<&str>,
        body: &[u8],
    ) -> McpResult<ObjectResult> {
        let secret = self
            .secret
            .as_ref()
            .ok_or_else(|| McpError::Webhook("webhook secret not configured".into()))?;
        let signature = signature.ok_or_else(|| McpError::Webhook("missing signature".into()))?;
        if !verify_hmac(secret, body, signature) {
            metrics::counter!("insights_webhook_rejected_total").increment(1);
            return Err(McpError::Webhook("signature mismatch".into()));
        }

        let event: RawWriteEvent = serde_json::from_slice(body)?;
        let id = event.dedupe_key();
        if self.deduper.is_duplicate(&id).await {
            return Ok(ObjectResult {
                value: serde_json::json!({ "duplicate": true, "id": id }),
            });
        }

        if event.source().is_none() {
            tracing::debug!(table = %event.table, "webhook for unrelated table ignored");
            return Ok(ObjectResult {
                value: serde_json::json!({ "ok": true, "id": id, "ignored": true }),
            });
        }

        let Some(user_id) = event.user_id() else {
            tracing::warn!(
                table = %event.table,
                id = %id,
                "webhook without user_id, nothing to invalidate"
            );
            return Ok(ObjectResult {
                value: serde_json::json!({ "ok": true, "id": id, "invalidated": 0 }),
            });
        };

        let invalidated = self.insights.invalidate_user(user_id).await;
        metrics::counter!("insights_webhook_events_total", "table" => event.table.clone())
            .increment(1);
        Ok(ObjectResult {
            value: serde_json::json!({
                "ok": true,
                "id": id,
                "user_id": user_id,
                "invalidated": invalidated,
            }),
        })
    }
}
