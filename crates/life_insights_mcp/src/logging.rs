//! Subscriber setup shared by the stdio and HTTP binaries.

use tracing_subscriber::EnvFilter;

pub const LOG_LEVEL_ENV: &str = "LIFE_DASHBOARD_LOG_LEVEL";

/// `LIFE_DASHBOARD_LOG_LEVEL`, then `RUST_LOG`, then `info`.
pub fn log_level_from<F>(mut get: F) -> String
where
    F: FnMut(&str) -> Option<String>,
{
    get(LOG_LEVEL_ENV)
        .or_else(|| get("RUST_LOG"))
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| "info".to_string())
}

/// Append per-target overrides to keep rmcp internals quiet by default.
pub fn combined_filter(log_env: &str) -> String {
    format!("{},rmcp=warn,serve_inner=warn", log_env)
}

pub fn env_filter(log_env: &str) -> EnvFilter {
    EnvFilter::try_new(combined_filter(log_env))
        .unwrap_or_else(|_| EnvFilter::new("info,rmcp=warn,serve_inner=warn"))
}

/// Install the global compact subscriber on stderr (stdout carries the MCP
/// stream in stdio mode). Returns the level string in effect.
pub fn init() -> String {
    let log_env = log_level_from(|k| std::env::var(k).ok());
    tracing_subscriber::fmt()
        .compact()
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .with_target(false)
        .with_env_filter(env_filter(&log_env))
        .init();
    log_env
}
