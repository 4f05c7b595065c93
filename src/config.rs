use std::env;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result, anyhow};

use crate::attendance::clock::LocalZone;
use crate::auth::auth::RoleGrants;
use crate::backend::ws_base_from_http;
use crate::live::state::RetryPolicy;
use crate::print::Branding;

#[derive(Clone, Debug)]
pub struct Config {
    pub server_addr: String,
    pub backend_url: String,
    pub backend_ws_url: String,
    pub jwt_secret: String,
    /// Backend tokens carry no role; HR/Admin ids are configured here.
    pub role_grants: RoleGrants,
    pub api_prefix: String,

    // Rate limiting
    pub rate_protected_per_min: u32,

    pub zone: LocalZone,
    pub history_limit: u32,
    pub history_cache_ttl: Duration,
    pub backend_timeout: Duration,
    pub live: RetryPolicy,
    pub branding: Branding,
    pub log_dir: String,
}

fn parsed<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T>
where
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| anyhow!("{key} has an invalid value {raw:?}: {e}")),
        None => Ok(default),
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok().filter(|v| !v.trim().is_empty()))
    }

    /// Build from any key/value source; `from_env` passes the process env.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let text = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let backend_url = text("BACKEND_URL", "http://localhost:8080");
        let backend_ws_url = lookup("BACKEND_WS_URL").unwrap_or_else(|| ws_base_from_http(&backend_url));

        let offset_hours: i32 = parsed(&lookup, "ZONE_OFFSET_HOURS", 7)?;
        let zone = LocalZone::new(offset_hours, text("ZONE_LABEL", "WIB"))
            .ok_or_else(|| anyhow!("ZONE_OFFSET_HOURS must be within -23..=23, got {offset_hours}"))?;

        let defaults = RetryPolicy::default();
        let live = RetryPolicy {
            open_timeout: Duration::from_millis(parsed(&lookup, "LIVE_OPEN_TIMEOUT_MS", 8_000)?),
            base_delay: Duration::from_millis(parsed(&lookup, "LIVE_BASE_DELAY_MS", 800)?),
            max_delay: Duration::from_millis(parsed(&lookup, "LIVE_MAX_DELAY_MS", 12_000)?),
            max_attempts: parsed(&lookup, "LIVE_MAX_ATTEMPTS", defaults.max_attempts)?.max(1),
        };

        let branding = Branding::default();

        Ok(Self {
            server_addr: text("SERVER_ADDR", "0.0.0.0:8090"),
            backend_url,
            backend_ws_url,
            jwt_secret: lookup("JWT_SECRET").context("JWT_SECRET must be set")?,
            role_grants: RoleGrants::from_lists(&text("ADMIN_USER_IDS", ""), &text("HR_USER_IDS", "")),
            api_prefix: text("API_PREFIX", "/api"),
            rate_protected_per_min: parsed(&lookup, "RATE_PROTECTED_PER_MIN", 600)?,
            zone,
            history_limit: parsed(&lookup, "HISTORY_LIMIT", 500)?,
            history_cache_ttl: Duration::from_secs(parsed(&lookup, "HISTORY_CACHE_TTL_SECS", 30)?),
            backend_timeout: Duration::from_secs(parsed(&lookup, "BACKEND_TIMEOUT_SECS", 15)?),
            live,
            branding: Branding {
                company_name: text("COMPANY_NAME", &branding.company_name),
                company_address: text("COMPANY_ADDRESS", &branding.company_address),
                company_logo: text("COMPANY_LOGO", &branding.company_logo),
            },
            log_dir: text("LOG_DIR", "logs"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn from(pairs: &[(&str, &str)]) -> Result<Config> {
        let map: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        Config::from_lookup(move |key| map.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_only_secret_is_set() {
        let cfg = from(&[("JWT_SECRET", "s3cret")]).unwrap();
        assert_eq!(cfg.server_addr, "0.0.0.0:8090");
        assert_eq!(cfg.backend_url, "http://localhost:8080");
        assert_eq!(cfg.backend_ws_url, "ws://localhost:8080");
        assert_eq!(cfg.api_prefix, "/api");
        assert_eq!(cfg.rate_protected_per_min, 600);
        assert_eq!(cfg.zone, LocalZone::wib());
        assert_eq!(cfg.history_limit, 500);
        assert_eq!(cfg.live, RetryPolicy::default());
        assert_eq!(cfg.branding, Branding::default());
        assert_eq!(cfg.role_grants, RoleGrants::default());
    }

    #[test]
    fn role_grants_come_from_id_lists() {
        let cfg = from(&[
            ("JWT_SECRET", "x"),
            ("ADMIN_USER_IDS", "a1"),
            ("HR_USER_IDS", "h1, h2"),
        ])
        .unwrap();
        assert_eq!(cfg.role_grants.admins, ["a1"]);
        assert_eq!(cfg.role_grants.hr, ["h1", "h2"]);
    }

    #[test]
    fn secret_is_required() {
        let err = from(&[]).unwrap_err();
        assert!(err.to_string().contains("JWT_SECRET"));
    }

    #[test]
    fn invalid_numbers_name_the_variable() {
        let err = from(&[("JWT_SECRET", "x"), ("HISTORY_LIMIT", "lots")]).unwrap_err();
        assert!(err.to_string().contains("HISTORY_LIMIT"));
    }

    #[test]
    fn ws_url_follows_https_backend() {
        let cfg = from(&[("JWT_SECRET", "x"), ("BACKEND_URL", "https://sbp.example/api/")]).unwrap();
        assert_eq!(cfg.backend_ws_url, "wss://sbp.example");
    }

    #[test]
    fn explicit_ws_url_wins() {
        let cfg = from(&[
            ("JWT_SECRET", "x"),
            ("BACKEND_URL", "http://10.0.0.5:8080"),
            ("BACKEND_WS_URL", "ws://10.0.0.6:9000"),
        ])
        .unwrap();
        assert_eq!(cfg.backend_ws_url, "ws://10.0.0.6:9000");
    }

    #[test]
    fn rejects_impossible_zone() {
        let err = from(&[("JWT_SECRET", "x"), ("ZONE_OFFSET_HOURS", "30")]).unwrap_err();
        assert!(err.to_string().contains("ZONE_OFFSET_HOURS"));
    }
}
