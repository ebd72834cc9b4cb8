use std::sync::Arc;

use life_insights_mcp::InsightsMcpHandler;
use life_insights_mcp::middleware::LoggingMiddleware;
use life_store_client::config::Config;
use life_store_client::http_client::ReqwestLifeStoreClient;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let log_env = life_insights_mcp::logging::init();
    tracing::info!("life_insights_mcp: log filter: {}", log_env);

    let cfg = Config::from_env()?;
    let client = LoggingMiddleware::new(ReqwestLifeStoreClient::from_config(&cfg));
    let handler = InsightsMcpHandler::from_config(Arc::new(client), &cfg);

    tracing::info!(
        "life_insights_mcp: registered {} tools and {} prompts",
        handler.tool_count(),
        handler.prompt_count()
    );
    if cfg.default_user_id.is_none() {
        tracing::info!("life_insights_mcp: no default user configured; tools require user_id");
    }

    // Start RMCP server over stdio transport so it's immediately usable with MCP clients
    tracing::info!("life_insights_mcp: starting stdio MCP server...");

    use rmcp::serve_server;
    let transport = (tokio::io::stdin(), tokio::io::stdout());
    let server = serve_server(handler, transport).await?;

    tracing::info!("life_insights_mcp: service initialized as server");

    server.waiting().await?;

    Ok(())
}
