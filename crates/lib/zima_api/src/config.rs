//! API server configuration.

use chrono::{Duration, Utc};
use thiserror::Error;
use zima_core::auth::guard::{Ranking, RankingError};
use zima_core::auth::jwt::{DEFAULT_ACCESS_TOKEN_TTL_MINUTES, resolve_jwt_secret_with};
use zima_core::licenses::{DEFAULT_LICENSE_TTL_DAYS, LicensePolicy};
use zima_core::models::account::{Plan, Role};

/// Origins allowed by CORS when `CORS_ORIGINS` is unset.
pub const DEFAULT_CORS_ORIGINS: [&str; 3] = [
    "http://localhost:3000",
    "https://zima-frontend.vercel.app",
    "https://zima.ia",
];

/// A configuration variable held a value that could not be used.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {var}: {reason}")]
    Invalid { var: &'static str, reason: String },
}

impl ConfigError {
    fn invalid(var: &'static str, reason: impl ToString) -> Self {
        ConfigError::Invalid {
            var,
            reason: reason.to_string(),
        }
    }
}

impl From<(&'static str, RankingError)> for ConfigError {
    fn from((var, e): (&'static str, RankingError)) -> Self {
        ConfigError::invalid(var, e)
    }
}

/// Configuration for the API server.
#[derive(Clone, Debug)]
pub struct ApiConfig {
    /// Address to bind the HTTP listener (e.g. "127.0.0.1:8000").
    pub bind_addr: String,
    /// PostgreSQL connection URL.
    pub pg_connection_url: String,
    /// JWT signing secret.
    pub jwt_secret: String,
    /// Bearer token lifetime.
    pub access_token_ttl: Duration,
    pub role_order: Ranking<Role>,
    pub plan_order: Ranking<Plan>,
    pub license_policy: LicensePolicy,
    /// Origins allowed by CORS.
    pub cors_origins: Vec<String>,
}

impl ApiConfig {
    /// Reads configuration from environment variables with sensible defaults.
    ///
    /// | Variable                       | Default                                |
    /// |--------------------------------|----------------------------------------|
    /// | `BIND_ADDR`                    | `127.0.0.1:8000`                       |
    /// | `DATABASE_URL`                 | `postgres://localhost:5432/zima`       |
    /// | `JWT_SECRET` / `AUTH_SECRET`   | generated & persisted to file          |
    /// | `ACCESS_TOKEN_EXPIRE_MINUTES`  | `1440`                                 |
    /// | `ROLE_ORDER`                   | `user,institutional,admin`             |
    /// | `PLAN_ORDER`                   | `freemium,basic,pro,institutional,lifetime` |
    /// | `LICENSE_DEFAULT_TTL_DAYS`     | `30` (`0` = no expiry)                 |
    /// | `LICENSE_ONE_ACTIVE_PER_OWNER` | `false`                                |
    /// | `LICENSE_CACHE_TTL_MS`         | `0` (cache disabled)                   |
    /// | `CORS_ORIGINS`                 | local dev + production frontends       |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Build the configuration from an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |var: &str| lookup(var).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let ttl_minutes = parse_int(
            "ACCESS_TOKEN_EXPIRE_MINUTES",
            get("ACCESS_TOKEN_EXPIRE_MINUTES"),
            DEFAULT_ACCESS_TOKEN_TTL_MINUTES,
        )?;
        if ttl_minutes <= 0 {
            return Err(ConfigError::invalid(
                "ACCESS_TOKEN_EXPIRE_MINUTES",
                "must be positive",
            ));
        }
        let access_token_ttl =
            within_calendar("ACCESS_TOKEN_EXPIRE_MINUTES", Duration::try_minutes(ttl_minutes))?;

        let role_order: Ranking<Role> = match get("ROLE_ORDER") {
            Some(order) => Ranking::parse(&order).map_err(|e| ("ROLE_ORDER", e))?,
            None => Ranking::default(),
        };
        let plan_order: Ranking<Plan> = match get("PLAN_ORDER") {
            Some(order) => Ranking::parse(&order).map_err(|e| ("PLAN_ORDER", e))?,
            None => Ranking::default(),
        };

        let ttl_days = parse_int(
            "LICENSE_DEFAULT_TTL_DAYS",
            get("LICENSE_DEFAULT_TTL_DAYS"),
            DEFAULT_LICENSE_TTL_DAYS,
        )?;
        if ttl_days < 0 {
            return Err(ConfigError::invalid(
                "LICENSE_DEFAULT_TTL_DAYS",
                "must not be negative",
            ));
        }
        let cache_ms = parse_int("LICENSE_CACHE_TTL_MS", get("LICENSE_CACHE_TTL_MS"), 0)?;
        if cache_ms < 0 {
            return Err(ConfigError::invalid(
                "LICENSE_CACHE_TTL_MS",
                "must not be negative",
            ));
        }
        let cache_ttl =
            within_calendar("LICENSE_CACHE_TTL_MS", Duration::try_milliseconds(cache_ms))?;
        let license_policy = LicensePolicy {
            one_active_per_owner: parse_bool(
                "LICENSE_ONE_ACTIVE_PER_OWNER",
                get("LICENSE_ONE_ACTIVE_PER_OWNER"),
            )?,
            default_ttl_days: (ttl_days > 0).then_some(ttl_days),
            cache_ttl,
        };

        let cors_origins = match get("CORS_ORIGINS") {
            Some(list) => list
                .split(',')
                .map(str::trim)
                .filter(|o| !o.is_empty())
                .map(String::from)
                .collect(),
            None => DEFAULT_CORS_ORIGINS.iter().map(|o| o.to_string()).collect(),
        };

        Ok(Self {
            bind_addr: get("BIND_ADDR").unwrap_or_else(|| "127.0.0.1:8000".into()),
            pg_connection_url: get("DATABASE_URL")
                .unwrap_or_else(|| "postgres://localhost:5432/zima".into()),
            jwt_secret: resolve_jwt_secret_with(&lookup),
            access_token_ttl,
            role_order,
            plan_order,
            license_policy,
            cors_origins,
        })
    }
}

fn parse_int(var: &'static str, value: Option<String>, default: i64) -> Result<i64, ConfigError> {
    match value {
        Some(v) => v
            .parse::<i64>()
            .map_err(|e| ConfigError::invalid(var, format!("'{v}': {e}"))),
        None => Ok(default),
    }
}

/// Reject durations that cannot be added to the current time.
fn within_calendar(var: &'static str, ttl: Option<Duration>) -> Result<Duration, ConfigError> {
    ttl.filter(|ttl| Utc::now().checked_add_signed(*ttl).is_some())
        .ok_or_else(|| ConfigError::invalid(var, "too large"))
}

fn parse_bool(var: &'static str, value: Option<String>) -> Result<bool, ConfigError> {
    match value.as_deref().map(str::to_ascii_lowercase).as_deref() {
        None => Ok(false),
        Some("1" | "true" | "yes" | "on") => Ok(true),
        Some("0" | "false" | "no" | "off") => Ok(false),
        Some(other) => Err(ConfigError::invalid(var, format!("'{other}' is not a boolean"))),
    }
}
