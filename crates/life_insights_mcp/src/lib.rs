use std::sync::Arc;

use rmcp::Json;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::{
    AnnotateAble, GetPromptRequestParams, GetPromptResult, ListPromptsResult, ListResourcesResult,
    PaginatedRequestParams, ReadResourceRequestParams, ReadResourceResult, ResourceContents,
};
use rmcp::service::RequestContext;
use rmcp::{ErrorData, RoleServer};
use rmcp::{prompt, prompt_handler, prompt_router, tool, tool_handler, tool_router};

use life_store_client::LifeStoreClient;
use life_store_client::config::{Config, DEFAULT_CACHE_TTL_SECS, DEFAULT_WINDOW_DAYS};

pub mod compact;
pub mod domains;
pub mod error;
pub mod logging;
pub mod middleware;
mod prompts;
pub mod services;
mod test_utils;
pub mod types;

pub use domains::InsightsReport;
pub use error::{McpError, McpResult};
pub use services::{InsightsCache, InsightsService, WebhookService};
pub use types::ObjectResult;

use domains::resources::{INSIGHTS_SUMMARY_URI, build_summary_text, insights_summary_resource};
use types::{
    CacheInvalidationResult, CorrelationEntry, CorrelationsParams, CorrelationsResult,
    DailyMetricsParams, DailyMetricsResult, ImpactRankingResult, InsightsParams,
    SleepExperimentResult, SleepMoodCheckParams, SystemBalanceResult, UserIdParam,
    WeeklyInsightsReviewParams,
};

#[derive(Clone)]
pub struct InsightsMcpHandler {
    insights: InsightsService,
    webhooks: WebhookService,
    default_user_id: Option<String>,
    tool_router: rmcp::handler::server::tool::ToolRouter<InsightsMcpHandler>,
    prompt_router: rmcp::handler::server::router::prompt::PromptRouter<InsightsMcpHandler>,
}

#[tool_router]
#[prompt_router]
impl InsightsMcpHandler {
    /// Handler with default window and cache settings, no default user and no
    /// webhook secret.
    pub fn new(client: Arc<dyn LifeStoreClient>) -> Self {
        let insights = InsightsService::new(
            client,
            InsightsCache::new(DEFAULT_CACHE_TTL_SECS),
            DEFAULT_WINDOW_DAYS,
        );
        Self {
            webhooks: WebhookService::new(None, insights.clone()),
            insights,
            default_user_id: None,
            tool_router: Self::tool_router(),
            prompt_router: Self::prompt_router(),
        }
    }

    pub fn from_config(client: Arc<dyn LifeStoreClient>, cfg: &Config) -> Self {
        let insights = InsightsService::new(
            client,
            InsightsCache::new(cfg.cache_ttl_secs),
            cfg.window_days,
        );
        Self {
            webhooks: WebhookService::new(cfg.webhook_secret.clone(), insights.clone()),
            insights,
            default_user_id: cfg.default_user_id.clone(),
            tool_router: Self::tool_router(),
            prompt_router: Self::prompt_router(),
        }
    }

    pub fn with_default_user(mut self, user_id: impl Into<String>) -> Self {
        self.default_user_id = Some(user_id.into());
        self
    }

    pub fn tool_count(&self) -> usize {
        self.tool_router.list_all().len()
    }

    pub fn prompt_count(&self) -> usize {
        self.prompt_router.list_all().len()
    }

    pub fn insights(&self) -> &InsightsService {
        &self.insights
    }

    pub fn webhooks(&self) -> &WebhookService {
        &self.webhooks
    }

    fn resolve_user(&self, user_id: Option<String>) -> McpResult<String> {
        user_id
            .filter(|u| !u.trim().is_empty())
            .or_else(|| self.default_user_id.clone())
            .ok_or_else(|| {
                McpError::Validation(
                    "user_id is required (no LIFE_DASHBOARD_USER_ID configured)".into(),
                )
            })
    }

    /// Report for `user_id` (or the default user); shared by tools, the
    /// resource and the HTTP route.
    pub async fn report(
        &self,
        user_id: Option<String>,
        days_back: Option<u32>,
    ) -> McpResult<Arc<InsightsReport>> {
        let user_id = self.resolve_user(user_id)?;
        self.insights.report(&user_id, days_back).await
    }

    #[tool(
        name = "get_insights",
        description = "Full insights report: daily series, correlations, mood impact ranking, system balance and sleep experiment"
    )]
    async fn get_insights(
        &self,
        params: Parameters<InsightsParams>,
    ) -> Result<Json<InsightsReport>, String> {
        let p = params.0;
        let report = self.report(p.user_id, p.days_back).await?;
        Ok(Json(report.as_ref().clone()))
    }

    #[tool(
        name = "get_daily_metrics",
        description = "Merged per-day metrics (sleepHours, mood, steps, calories, painLevel, stress, energy, relationsScore, wealthScore)"
    )]
    async fn get_daily_metrics(
        &self,
        params: Parameters<DailyMetricsParams>,
    ) -> Result<Json<DailyMetricsResult>, String> {
        let p = params.0;
        if let Some(fields) = &p.fields {
            let unknown = compact::unknown_day_fields(fields);
            if !unknown.is_empty() {
                return Err(McpError::Validation(format!(
                    "unknown fields: {}",
                    unknown.join(", ")
                ))
                .into());
            }
        }

        let report = self.report(p.user_id, p.days_back).await?;
        let days = serde_json::to_value(&report.days).map_err(McpError::from)?;
        let days = match p.fields.as_deref() {
            Some(fields) => compact::filter_array_fields(&days, fields),
            None => days,
        };
        Ok(Json(DailyMetricsResult {
            user_id: report.user_id.clone(),
            using_demo_data: report.using_demo_data,
            days,
        }))
    }

    #[tool(
        name = "get_correlations",
        description = "Pearson correlations between daily metrics with strength and direction; null means not enough data"
    )]
    async fn get_correlations(
        &self,
        params: Parameters<CorrelationsParams>,
    ) -> Result<Json<CorrelationsResult>, String> {
        let p = params.0;
        let report = self.report(p.user_id, p.days_back).await?;
        let correlations = if p.include_extended.unwrap_or(true) {
            report
                .all_correlations()
                .map(CorrelationEntry::from)
                .collect()
        } else {
            report
                .correlations
                .iter()
                .map(CorrelationEntry::from)
                .collect()
        };
        Ok(Json(CorrelationsResult {
            using_demo_data: report.using_demo_data,
            correlations,
        }))
    }

    #[tool(
        name = "get_impact_ranking",
        description = "Factors ranked by how strongly they correlate with mood"
    )]
    async fn get_impact_ranking(
        &self,
        params: Parameters<InsightsParams>,
    ) -> Result<Json<ImpactRankingResult>, String> {
        let p = params.0;
        let report = self.report(p.user_id, p.days_back).await?;
        Ok(Json(ImpactRankingResult {
            using_demo_data: report.using_demo_data,
            factors: report.impact.clone(),
        }))
    }

    #[tool(
        name = "get_system_balance",
        description = "Six-axis 0-100 balance scores (Sleep, Movement, Nutrition, Stress load, Wealth, Relations)"
    )]
    async fn get_system_balance(
        &self,
        params: Parameters<InsightsParams>,
    ) -> Result<Json<SystemBalanceResult>, String> {
        let p = params.0;
        let report = self.report(p.user_id, p.days_back).await?;
        Ok(Json(SystemBalanceResult {
            using_demo_data: report.using_demo_data,
            dimensions: report.balance.clone(),
        }))
    }

    #[tool(
        name = "get_sleep_experiment",
        description = "Average mood after nights of at least 7 hours versus shorter nights"
    )]
    async fn get_sleep_experiment(
        &self,
        params: Parameters<InsightsParams>,
    ) -> Result<Json<SleepExperimentResult>, String> {
        let p = params.0;
        let report = self.report(p.user_id, p.days_back).await?;
        Ok(Json(SleepExperimentResult {
            using_demo_data: report.using_demo_data,
            experiment: report.experiment.clone(),
        }))
    }

    #[tool(
        name = "invalidate_insights_cache",
        description = "Drop cached insights for a user so the next request refetches"
    )]
    async fn invalidate_insights_cache(
        &self,
        params: Parameters<UserIdParam>,
    ) -> Result<Json<CacheInvalidationResult>, String> {
        let user_id = self.resolve_user(Some(params.0.user_id))?;
        let removed = self.insights.invalidate_user(&user_id).await;
        Ok(Json(CacheInvalidationResult { ok: true, removed }))
    }

    // === MCP Prompts ===

    /// Review of the whole dashboard over a recent window
    #[prompt(
        name = "weekly-insights-review",
        description = "Review mood drivers, correlations and system balance for the past week"
    )]
    async fn weekly_insights_review(
        &self,
        params: Parameters<WeeklyInsightsReviewParams>,
    ) -> GetPromptResult {
        let days_back = params.0.days_back.unwrap_or(7);

        prompts::weekly_insights_review_prompt(params.0.user_id.as_deref(), days_back)
    }

    /// Sleep versus mood check built on the threshold experiment
    #[prompt(
        name = "sleep-mood-check",
        description = "Check how sleep duration relates to mood"
    )]
    async fn sleep_mood_check(&self, params: Parameters<SleepMoodCheckParams>) -> GetPromptResult {
        let days_back = params.0.days_back.unwrap_or(30);

        prompts::sleep_mood_check_prompt(params.0.user_id.as_deref(), days_back)
    }
}

#[tool_handler]
#[prompt_handler(router = self.prompt_router)]
impl rmcp::ServerHandler for InsightsMcpHandler {
    // === Server Info & Capabilities ===
    fn get_info(&self) -> rmcp::model::ServerInfo {
        rmcp::model::ServerInfo::new(
            rmcp::model::ServerCapabilities::builder()
                .enable_tools()
                .enable_prompts()
                .enable_resources()
                .build(),
        )
        .with_instructions(
            "Life dashboard insights server - correlates sleep, mood, steps, nutrition, \
             pain, stress and pillar scores and summarises the user's system balance.",
        )
    }

    // === MCP Resource Implementation ===

    async fn list_resources(
        &self,
        _request: Option<PaginatedRequestParams>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListResourcesResult, ErrorData> {
        Ok(ListResourcesResult {
            resources: vec![insights_summary_resource().no_annotation()],
            next_cursor: None,
            meta: None,
        })
    }

    async fn read_resource(
        &self,
        request: ReadResourceRequestParams,
        _context: RequestContext<RoleServer>,
    ) -> Result<ReadResourceResult, ErrorData> {
        if request.uri != INSIGHTS_SUMMARY_URI {
            return Err(ErrorData::invalid_params(
                format!("Unknown resource URI: {}", request.uri),
                None,
            ));
        }

        let report = self.report(None, None).await.map_err(|e| match e {
            McpError::Validation(msg) => ErrorData::invalid_params(msg, None),
            other => ErrorData::internal_error(other.to_string(), None),
        })?;

        Ok(ReadResourceResult::new(vec![
            ResourceContents::TextResourceContents {
                uri: request.uri.clone(),
                mime_type: Some("application/json".to_string()),
                text: build_summary_text(&report),
                meta: None,
            },
        ]))
    }
}
