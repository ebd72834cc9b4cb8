use rmcp::model::RawResource;
use serde_json::json;

use super::report::InsightsReport;

pub const INSIGHTS_SUMMARY_URI: &str = "life-dashboard://insights/summary";

/// Descriptor for the default user's insights summary.
pub fn insights_summary_resource() -> RawResource {
    let mut resource = RawResource::new(INSIGHTS_SUMMARY_URI, "Insights Summary");
    resource.description = Some(
        "Correlations, mood-impact ranking, system balance and sleep experiment \
         for the default user"
            .to_string(),
    );
    resource.mime_type = Some("application/json".to_string());
    resource
}

/// Compact JSON text for the resource: everything except the per-day series.
pub fn build_summary_text(report: &InsightsReport) -> String {
    let correlations: Vec<_> = report
        .all_correlations()
        .map(|c| {
            json!({
                "label": c.label,
                "value": c.value,
                "reading": c.summary(),
            })
        })
        .collect();
    let summary = json!({
        "user_id": report.user_id,
        "window": {
            "start": report.window_start.to_string(),
            "end": report.window_end.to_string(),
            "days_with_data": report.days.len(),
        },
        "using_demo_data": report.using_demo_data,
        "correlations": correlations,
        "impact": report.impact,
        "balance": report.balance,
        "experiment": report.experiment,
        "timestamp": report.generated_at.to_rfc3339(),
    });
    serde_json::to_string_pretty(&summary).unwrap_or_else(|_| "{}".to_string())
}
