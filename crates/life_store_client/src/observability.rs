use serde::Serialize;

use crate::config::Config;

#[derive(Debug, Serialize)]
pub struct Health {
    pub ready: bool,
    pub default_user: bool,
    pub webhook_verification: bool,
}

impl Health {
    pub fn readiness(cfg: &Config) -> Self {
        Self {
            ready: !cfg.base_url.trim().is_empty(),
            default_user: cfg.default_user_id.is_some(),
            webhook_verification: cfg.webhook_secret.is_some(),
        }
    }
}
