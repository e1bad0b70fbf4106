//! Process configuration, read from the environment at startup.
//!
//! Secrets (session key, AI provider key) are wrapped in
//! [`SecretString`](crate::SecretString) so they never appear in logs.

use std::env;

use chrono::Duration;

use crate::SecretString;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    /// sqlx connection URL, e.g. `sqlite:atrium.db?mode=rwc` or `sqlite::memory:`.
    pub database_url: String,
    pub session_secret: SecretString,
    pub session_lifetime: Duration,
    pub cookie_secure: bool,
    pub rate_limit: RateLimitConfig,
    pub report_cache: ReportCacheConfig,
    pub assist: AssistConfig,
}

/// Failed-login lockout settings.
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    pub max_failed_attempts: u32,
    pub lockout_window: Duration,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_failed_attempts: 5,
            lockout_window: Duration::minutes(15),
        }
    }
}

/// Per-report TTLs for the report cache.
#[derive(Debug, Clone)]
pub struct ReportCacheConfig {
    pub customers_ttl: Duration,
    pub sales_ttl: Duration,
    pub products_ttl: Duration,
}

impl Default for ReportCacheConfig {
    fn default() -> Self {
        Self {
            customers_ttl: Duration::minutes(60),
            sales_ttl: Duration::minutes(60),
            products_ttl: Duration::minutes(60),
        }
    }
}

/// AI completion provider settings.
#[derive(Debug, Clone)]
pub struct AssistConfig {
    pub api_key: SecretString,
    pub base_url: String,
    pub model: String,
}

impl Default for AssistConfig {
    fn default() -> Self {
        Self {
            api_key: SecretString::new(""),
            base_url: "https://api.openai.com/v1".to_owned(),
            model: "gpt-4o-mini".to_owned(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_owned(),
            port: 8080,
            database_url: "sqlite:atrium.db?mode=rwc".to_owned(),
            session_secret: SecretString::new(""),
            session_lifetime: Duration::hours(8),
            cookie_secure: true,
            rate_limit: RateLimitConfig::default(),
            report_cache: ReportCacheConfig::default(),
            assist: AssistConfig::default(),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(host) = env::var("HOST") {
            config.host = host;
        }
        if let Ok(port) = env::var("PORT") {
            if let Ok(port_num) = port.parse::<u16>() {
                config.port = port_num;
            }
        }
        if let Ok(url) = env::var("DATABASE_URL") {
            config.database_url = url;
        }
        if let Ok(secret) = env::var("SESSION_SECRET") {
            config.session_secret = SecretString::new(secret);
        }
        if let Ok(hours) = env::var("SESSION_LIFETIME_HOURS") {
            if let Ok(h) = hours.parse::<i64>() {
                config.session_lifetime = Duration::hours(h);
            }
        }
        if let Ok(secure) = env::var("COOKIE_SECURE") {
            config.cookie_secure = secure != "0" && secure != "false";
        }
        if let Ok(max) = env::var("LOGIN_MAX_FAILED_ATTEMPTS") {
            if let Ok(n) = max.parse::<u32>() {
                config.rate_limit.max_failed_attempts = n;
            }
        }
        if let Ok(minutes) = env::var("LOGIN_LOCKOUT_MINUTES") {
            if let Ok(m) = minutes.parse::<i64>() {
                config.rate_limit.lockout_window = Duration::minutes(m);
            }
        }
        if let Ok(minutes) = env::var("REPORT_CACHE_TTL_MINUTES") {
            if let Ok(m) = minutes.parse::<i64>() {
                let ttl = Duration::minutes(m);
                config.report_cache.customers_ttl = ttl;
                config.report_cache.sales_ttl = ttl;
                config.report_cache.products_ttl = ttl;
            }
        }
        if let Ok(key) = env::var("ASSIST_API_KEY") {
            config.assist.api_key = SecretString::new(key);
        }
        if let Ok(url) = env::var("ASSIST_BASE_URL") {
            config.assist.base_url = url;
        }
        if let Ok(model) = env::var("ASSIST_MODEL") {
            config.assist.model = model;
        }

        config
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
