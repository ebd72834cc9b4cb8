use axum::{
    Json, Router,
    body::Bytes,
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    routing::{get, post},
};
use chrono::NaiveDate;
use hmac::{Hmac, Mac};
use reqwest::Client;
use sha2::Sha256;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use life_insights_mcp::InsightsMcpHandler;
use life_store_client::config::Config;
use life_store_client::{
    DailyScore, FoodEntry, LifeStoreClient, MentalHealthLog, SleepRecord, StepRecord, StoreError,
    WomensHealthLog,
};

#[derive(Default)]
struct CountingClient {
    calls: AtomicUsize,
}

impl CountingClient {
    fn hit(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait::async_trait]
impl LifeStoreClient for CountingClient {
    async fn get_sleep_records(
        &self,
        _user_id: &str,
        _since: NaiveDate,
    ) -> Result<Vec<SleepRecord>, StoreError> {
        self.hit();
        Ok(vec![])
    }
    async fn get_mental_health_logs(
        &self,
        _user_id: &str,
        _since: NaiveDate,
    ) -> Result<Vec<MentalHealthLog>, StoreError> {
        self.hit();
        Ok(vec![])
    }
    async fn get_step_records(
        &self,
        _user_id: &str,
        _since: NaiveDate,
    ) -> Result<Vec<StepRecord>, StoreError> {
        self.hit();
        Ok(vec![])
    }
    async fn get_food_entries(
        &self,
        _user_id: &str,
        _since: NaiveDate,
    ) -> Result<Vec<FoodEntry>, StoreError> {
        self.hit();
        Ok(vec![])
    }
    async fn get_womens_health_logs(
        &self,
        _user_id: &str,
        _since: NaiveDate,
    ) -> Result<Vec<WomensHealthLog>, StoreError> {
        self.hit();
        Ok(vec![])
    }
    async fn get_relations_scores(
        &self,
        _user_id: &str,
        _since: NaiveDate,
    ) -> Result<Vec<DailyScore>, StoreError> {
        self.hit();
        Ok(vec![])
    }
    async fn get_wealth_scores(
        &self,
        _user_id: &str,
        _since: NaiveDate,
    ) -> Result<Vec<DailyScore>, StoreError> {
        self.hit();
        Ok(vec![])
    }
}

fn sign(secret: &str, payload: &[u8]) -> String {
    let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes()).unwrap();
    mac.update(payload);
    format!("sha256={}", hex::encode(mac.finalize().into_bytes()))
}

async fn insights(
    State(h): State<Arc<InsightsMcpHandler>>,
    Path(user_id): Path<String>,
) -> Result<Json<serde_json::Value>, (StatusCode, String)> {
    match h.report(Some(user_id), Some(14)).await {
        Ok(r) => Ok(Json(serde_json::to_value(r.as_ref()).unwrap())),
        Err(e) => Err((StatusCode::BAD_REQUEST, e.to_string())),
    }
}

async fn webhook(
    State(h): State<Arc<InsightsMcpHandler>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<serde_json::Value>, (StatusCode, String)> {
    let sig = headers.get("x-signature").and_then(|v| v.to_str().ok());
    match h.webhooks().process_webhook(sig, &body).await {
        Ok(out) => Ok(Json(out.value)),
        Err(e) => Err((StatusCode::BAD_REQUEST, e.to_string())),
    }
}

#[tokio::test]
async fn e2e_webhook_invalidates_cached_insights() {
    let cfg = Config::from_env_with(|k| match k {
        "SUPABASE_URL" => Some("http://localhost:54321".into()),
        "SUPABASE_ANON_KEY" => Some("anon".into()),
        "LIFE_DASHBOARD_WEBHOOK_SECRET" => Some("s3cr3t".into()),
        _ => None,
    })
    .unwrap();
    let client = Arc::new(CountingClient::default());
    let handler = Arc::new(InsightsMcpHandler::from_config(client.clone(), &cfg));
    assert!(handler.webhooks().is_configured());

    let app = Router::new()
        .route("/insights/{user_id}", get(insights))
        .route("/webhook", post(webhook))
        .with_state(handler.clone());

    // bind to ephemeral port
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let _sv = tokio::spawn(async move {
        axum::serve(listener, app.into_make_service())
            .await
            .unwrap();
    });

    let http = Client::new();
    let url = format!("http://{addr}/insights/u-1");

    let res = http.get(&url).send().await.unwrap();
    assert!(res.status().is_success());
    let report: serde_json::Value = res.json().await.unwrap();
    assert_eq!(report["user_id"], "u-1");
    assert_eq!(report["using_demo_data"], true);
    assert_eq!(client.calls.load(Ordering::SeqCst), 7);

    // Second read is served from the cache.
    let res = http.get(&url).send().await.unwrap();
    assert!(res.status().is_success());
    assert_eq!(client.calls.load(Ordering::SeqCst), 7);

    let body = serde_json::to_vec(&serde_json::json!({
        "id": "evt-1",
        "type": "INSERT",
        "table": "sleep_records",
        "record": { "id": 9, "user_id": "u-1", "sleep_duration_hours": 7.5 },
    }))
    .unwrap();

    let res = http
        .post(format!("http://{addr}/webhook"))
        .header("x-signature", "sha256=deadbeef")
        .body(body.clone())
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), reqwest::StatusCode::BAD_REQUEST);

    let res = http
        .post(format!("http://{addr}/webhook"))
        .header("x-signature", sign("s3cr3t", &body))
        .body(body)
        .send()
        .await
        .unwrap();
    assert!(res.status().is_success());
    let out: serde_json::Value = res.json().await.unwrap();
    assert_eq!(out["user_id"], "u-1");
    assert_eq!(out["invalidated"], 1);

    // The next read goes back to the store.
    let res = http.get(&url).send().await.unwrap();
    assert!(res.status().is_success());
    assert_eq!(client.calls.load(Ordering::SeqCst), 14);
}
