use chrono::NaiveDate;
use life_store_client::http_client::ReqwestLifeStoreClient;
use life_store_client::{LifeStoreClient, StoreError};
use secrecy::SecretString;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn since() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 1, 1).unwrap()
}

fn client_for(server: &MockServer) -> ReqwestLifeStoreClient {
    ReqwestLifeStoreClient::new(&server.uri(), SecretString::new("anon".into()))
}

#[tokio::test]
async fn sleep_records_send_apikey_bearer_and_filters() {
    let server = MockServer::start().await;
    let body = serde_json::json!([
        {"sleep_duration_hours": 7.5, "created_at": "2025-01-02T06:30:00+00:00"},
        {"sleep_duration_hours": "6.25", "created_at": "2025-01-03T07:00:00+00:00"}
    ]);

    Mock::given(method("GET"))
        .and(path("/rest/v1/sleep_records"))
        .and(header("apikey", "anon"))
        .and(query_param("select", "sleep_duration_hours,created_at"))
        .and(query_param("user_id", "eq.u-1"))
        .and(query_param("created_at", "gte.2025-01-01"))
        .and(query_param("order", "created_at.asc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let rows = client
        .get_sleep_records("u-1", since())
        .await
        .expect("sleep rows");
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].sleep_duration_hours, Some(7.5));
    assert_eq!(rows[1].sleep_duration_hours, Some(6.25));

    // Without an access token the api key doubles as the bearer token.
    let received = server.received_requests().await.unwrap();
    assert!(!received.is_empty());
    let auth = received[0]
        .headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string());
    assert_eq!(auth.as_deref(), Some("Bearer anon"));
}

#[tokio::test]
async fn access_token_replaces_bearer() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/step_records"))
        .and(header("apikey", "anon"))
        .and(header("authorization", "Bearer user-jwt"))
        .and(query_param("date", "gte.2025-01-01"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!([{"steps": 5400, "date": "2025-01-02"}])),
        )
        .mount(&server)
        .await;

    let client = client_for(&server).with_access_token(SecretString::new("user-jwt".into()));
    let rows = client
        .get_step_records("u-1", since())
        .await
        .expect("steps");
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].steps, Some(5400.0));
    assert_eq!(rows[0].date, "2025-01-02");
}

#[tokio::test]
async fn each_source_reads_its_own_table() {
    let server = MockServer::start().await;
    let tables = [
        (
            "mental_health_logs",
            serde_json::json!([{
                "mood_rating": 7,
                "stress_level": 3,
                "energy_level": null,
                "logged_at": "2025-01-02T09:00:00Z",
            }]),
        ),
        (
            "food_entries",
            serde_json::json!([{"total_calories": 640.5, "consumed_at": "2025-01-02T12:00:00Z"}]),
        ),
        ("womens_health_logs", serde_json::json!([{"pain_level": 4, "date": "2025-01-02"}])),
        ("relations_daily_scores", serde_json::json!([{"score": 72, "date": "2025-01-02"}])),
        ("wealth_daily_scores", serde_json::json!([{"score": "55.5", "date": "2025-01-02"}])),
    ];
    for (table, body) in tables {
        Mock::given(method("GET"))
            .and(path(format!("/rest/v1/{table}")))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&server)
            .await;
    }

    let client = client_for(&server);
    let mental = client.get_mental_health_logs("u-1", since()).await.expect("mental");
    assert_eq!(mental[0].mood_rating, Some(7.0));
    assert_eq!(mental[0].energy_level, None);

    let food = client.get_food_entries("u-1", since()).await.expect("food");
    assert_eq!(food[0].total_calories, Some(640.5));

    let pain = client.get_womens_health_logs("u-1", since()).await.expect("pain");
    assert_eq!(pain[0].pain_level, Some(4.0));

    let relations = client.get_relations_scores("u-1", since()).await.expect("relations");
    assert_eq!(relations[0].score, Some(72.0));

    let wealth = client.get_wealth_scores("u-1", since()).await.expect("wealth");
    assert_eq!(wealth[0].score, Some(55.5));
}

#[tokio::test]
async fn error_statuses_map_to_variants() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/sleep_records"))
        .respond_with(ResponseTemplate::new(401).set_body_string("JWT expired"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/food_entries"))
        .respond_with(ResponseTemplate::new(404).set_body_string("relation does not exist"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/step_records"))
        .respond_with(ResponseTemplate::new(503).set_body_string("upstream down"))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let err = client.get_sleep_records("u-1", since()).await.unwrap_err();
    assert!(matches!(err, StoreError::Auth(ref b) if b.contains("JWT")));

    let err = client.get_food_entries("u-1", since()).await.unwrap_err();
    assert!(matches!(err, StoreError::NotFound(_)));

    let err = client.get_step_records("u-1", since()).await.unwrap_err();
    assert!(matches!(err, StoreError::Api { status: 503, .. }));
}

#[tokio::test]
async fn unexpected_shape_is_a_decode_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/sleep_records"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({"message": "not a list"})),
        )
        .mount(&server)
        .await;

    let client = client_for(&server);
    let err = client.get_sleep_records("u-1", since()).await.unwrap_err();
    match err {
        StoreError::Decode(msg) => assert!(msg.contains("not a list")),
        other => panic!("unexpected error: {other:?}"),
    }
}
