use crate::StoreError;
use secrecy::SecretString;

pub const DEFAULT_WINDOW_DAYS: u32 = 30;
/// Longest trailing window the insights engine accepts.
pub const MAX_WINDOW_DAYS: u32 = 365;
pub const DEFAULT_CACHE_TTL_SECS: u64 = 300;

#[derive(Clone, Debug)]
pub struct Config {
    pub base_url: String,
    pub api_key: SecretString,
    /// User session token; requests fall back to the api key when absent.
    pub access_token: Option<SecretString>,
    pub default_user_id: Option<String>,
    pub window_days: u32,
    /// `0` disables the insights cache.
    pub cache_ttl_secs: u64,
    pub webhook_secret: Option<SecretString>,
}

impl Config {
    pub fn from_env() -> Result<Self, StoreError> {
        Self::from_env_with(|k| std::env::var(k).ok())
    }

    /// Testable helper that reads configuration values using the provided
    /// function. This avoids mutating global environment in tests and keeps
    /// `from_env()` small and safe.
    pub fn from_env_with<F>(mut get: F) -> Result<Self, StoreError>
    where
        F: FnMut(&str) -> Option<String>,
    {
        let base_url = get("SUPABASE_URL")
            .filter(|s| !s.trim().is_empty())
            .ok_or_else(|| StoreError::Config("SUPABASE_URL missing".into()))?;
        let api_key = get("SUPABASE_ANON_KEY")
            .filter(|s| !s.trim().is_empty())
            .ok_or_else(|| StoreError::Config("SUPABASE_ANON_KEY missing".into()))?;
        let access_token = get("SUPABASE_ACCESS_TOKEN")
            .filter(|s| !s.trim().is_empty())
            .map(|t| SecretString::new(t.into()));
        let default_user_id = get("LIFE_DASHBOARD_USER_ID").filter(|s| !s.trim().is_empty());
        let window_days = parse_or(
            get("LIFE_DASHBOARD_WINDOW_DAYS"),
            "LIFE_DASHBOARD_WINDOW_DAYS",
            DEFAULT_WINDOW_DAYS,
        )?;
        if !(1..=MAX_WINDOW_DAYS).contains(&window_days) {
            return Err(StoreError::Config(format!(
                "LIFE_DASHBOARD_WINDOW_DAYS must be in 1..={MAX_WINDOW_DAYS}, got {window_days}"
            )));
        }
        let cache_ttl_secs = parse_or(
            get("LIFE_DASHBOARD_CACHE_TTL_SECS"),
            "LIFE_DASHBOARD_CACHE_TTL_SECS",
            DEFAULT_CACHE_TTL_SECS,
        )?;
        let webhook_secret = get("LIFE_DASHBOARD_WEBHOOK_SECRET")
            .filter(|s| !s.is_empty())
            .map(|s| SecretString::new(s.into()));

        Ok(Self {
            base_url,
            api_key: SecretString::new(api_key.into()),
            access_token,
            default_user_id,
            window_days,
            cache_ttl_secs,
            webhook_secret,
        })
    }
}

fn parse_or<T: std::str::FromStr>(
    raw: Option<String>,
    key: &str,
    default: T,
) -> Result<T, StoreError> {
    match raw {
        None => Ok(default),
        Some(s) => s
            .trim()
            .parse()
            .map_err(|_| StoreError::Config(format!("{key} is not a valid number: {s}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_env_missing_url() {
        let get = |k: &str| match k {
            "SUPABASE_ANON_KEY" => Some("anon".into()),
            _ => None,
        };
        let res = Config::from_env_with(get);
        assert!(res.is_err());
    }

    #[test]
    fn from_env_reads_values_and_defaults() {
        let get = |k: &str| match k {
            "SUPABASE_URL" => Some("http://localhost:54321".into()),
            "SUPABASE_ANON_KEY" => Some("anon".into()),
            "LIFE_DASHBOARD_USER_ID" => Some("u-1".into()),
            _ => None,
        };
        let cfg = Config::from_env_with(get).expect("cfg");
        assert_eq!(cfg.base_url, "http://localhost:54321");
        assert_eq!(cfg.default_user_id.as_deref(), Some("u-1"));
        assert_eq!(cfg.window_days, DEFAULT_WINDOW_DAYS);
        assert_eq!(cfg.cache_ttl_secs, DEFAULT_CACHE_TTL_SECS);
        assert!(cfg.access_token.is_none());
        assert!(cfg.webhook_secret.is_none());
    }

    #[test]
    fn from_env_rejects_bad_numbers() {
        let get = |k: &str| match k {
            "SUPABASE_URL" => Some("http://localhost".into()),
            "SUPABASE_ANON_KEY" => Some("anon".into()),
            "LIFE_DASHBOARD_WINDOW_DAYS" => Some("thirty".into()),
            _ => None,
        };
        assert!(Config::from_env_with(get).is_err());

        let zero = |k: &str| match k {
            "SUPABASE_URL" => Some("http://localhost".into()),
            "SUPABASE_ANON_KEY" => Some("anon".into()),
            "LIFE_DASHBOARD_WINDOW_DAYS" => Some("0".into()),
            _ => None,
        };
        assert!(Config::from_env_with(zero).is_err());
    }

    #[test]
    fn from_env_bounds_window_days() {
        let with_window = |days: &'static str| {
            move |k: &str| match k {
                "SUPABASE_URL" => Some("http://localhost".into()),
                "SUPABASE_ANON_KEY" => Some("anon".into()),
                "LIFE_DASHBOARD_WINDOW_DAYS" => Some(days.into()),
                _ => None,
            }
        };
        let cfg = Config::from_env_with(with_window("365")).expect("cfg");
        assert_eq!(cfg.window_days, MAX_WINDOW_DAYS);
        assert!(matches!(
            Config::from_env_with(with_window("366")),
            Err(StoreError::Config(_))
        ));
    }
}
