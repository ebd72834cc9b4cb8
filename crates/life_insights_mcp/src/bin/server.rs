use axum::debug_handler;
use axum::{
    Json, Router,
    body::Bytes,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::{get, post},
};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use serde::Deserialize;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;
use tracing::info;

use life_insights_mcp::middleware::LoggingMiddleware;
use life_insights_mcp::{InsightsMcpHandler, InsightsReport, McpError};
use life_store_client::StoreError;
use life_store_client::config::Config;
use life_store_client::http_client::ReqwestLifeStoreClient;
use life_store_client::observability::Health;

struct AppState {
    config: Config,
    metrics: PrometheusHandle,
    handler: InsightsMcpHandler,
}

#[derive(Debug, Deserialize)]
struct InsightsQuery {
    days_back: Option<u32>,
}

#[debug_handler]
async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(Health::readiness(&state.config))
}

#[debug_handler]
async fn metrics_endpoint(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let body = state.metrics.render();
    ([("content-type", "text/plain; version=0.0.4")], body)
}

#[debug_handler]
async fn get_insights(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
    Query(query): Query<InsightsQuery>,
) -> Result<Json<InsightsReport>, (StatusCode, String)> {
    let report = state
        .handler
        .report(Some(user_id), query.days_back)
        .await
        .map_err(map_err)?;
    Ok(Json(report.as_ref().clone()))
}

#[debug_handler]
async fn webhook(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<serde_json::Value>, (StatusCode, String)> {
    let hooks = state.handler.webhooks();
    if !hooks.is_configured() {
        return Err((
            StatusCode::SERVICE_UNAVAILABLE,
            "webhook secret not configured".to_string(),
        ));
    }
    let sig = headers.get("x-signature").and_then(|v| v.to_str().ok());

    match hooks.process_webhook(sig, &body).await {
        Ok(out) => Ok(Json(out.value)),
        Err(e) => Err((StatusCode::BAD_REQUEST, e.to_string())),
    }
}

fn map_err(e: McpError) -> (StatusCode, String) {
    let status = match &e {
        McpError::Validation(_) | McpError::Serialization(_) | McpError::Webhook(_) => {
            StatusCode::BAD_REQUEST
        }
        McpError::Store(StoreError::NotFound(_)) => StatusCode::NOT_FOUND,
        McpError::Store(_) => StatusCode::BAD_GATEWAY,
        McpError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, e.to_string())
}

fn max_body_size_from(raw: Option<String>) -> usize {
    raw.and_then(|s| s.parse::<usize>().ok())
        .unwrap_or(1024 * 1024)
}

fn address_from(raw: Option<String>) -> SocketAddr {
    raw.and_then(|s| s.parse().ok())
        .unwrap_or_else(|| SocketAddr::from(([127, 0, 0, 1], 3000)))
}


#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    let log_env = life_insights_mcp::logging::init();
    tracing::info!(%log_env, "life_insights_mcp:http: log filter");

    let builder = PrometheusBuilder::new();
    let handle = builder.install_recorder()?;

    let config = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            tracing::error!(error = %e, "invalid configuration; aborting startup");
            std::process::exit(1);
        }
    };

    let client = LoggingMiddleware::new(ReqwestLifeStoreClient::from_config(&config));
    let handler = InsightsMcpHandler::from_config(Arc::new(client), &config);
    if !handler.webhooks().is_configured() {
        tracing::warn!("LIFE_DASHBOARD_WEBHOOK_SECRET not set; /webhook will answer 503");
    }
    let state = Arc::new(AppState {
        config,
        metrics: handle.clone(),
        handler: handler.clone(),
    });

    let max_body_size = max_body_size_from(std::env::var("MAX_HTTP_BODY_SIZE").ok());

    // Build rmcp StreamableHttpService mounted at /mcp; sessions share the cache.
    let factory = move || -> Result<_, std::io::Error> { Ok(handler.clone()) };
    let session = std::sync::Arc::new(
        rmcp::transport::streamable_http_server::session::local::LocalSessionManager::default(),
    );
    let mcp_service = rmcp::transport::streamable_http_server::tower::StreamableHttpService::new(
        factory,
        session,
        rmcp::transport::streamable_http_server::tower::StreamableHttpServerConfig::default(),
    );

    let app = Router::new()
        .route("/health", get(health))
        .route("/metrics", get(metrics_endpoint))
        .route("/insights/{user_id}", get(get_insights))
        .route("/webhook", post(webhook))
        .nest_service("/mcp", mcp_service)
        .layer(axum::extract::DefaultBodyLimit::max(max_body_size))
        .with_state(state.clone());

    let addr = address_from(std::env::var("ADDRESS").ok());
    info!(%addr, max_body_bytes = max_body_size, "starting HTTP server");

    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(l) => l,
        Err(e) => {
            tracing::error!("Failed to bind to address {addr}: {e}");
            std::process::exit(1);
        }
    };

    let server = axum::serve(listener, app.into_make_service());
    if let Err(e) = server
        .with_graceful_shutdown(async {
            if let Err(e) = signal::ctrl_c().await {
                tracing::error!("failed to install ctrl+c handler: {e}");
            }
        })
        .await
    {
        tracing::error!("Server error: {e}");
        std::process::exit(1);
    }

    Ok(())
}
