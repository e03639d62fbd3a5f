use std::str::FromStr;

use chrono::Duration;
use heatvote_core::decay::{validate_cutoff, validate_half_life};
use heatvote_core::error::CoreError;
use heatvote_core::rate_limit::{AddressThrottle, RateLimiter};

/// Longest vote-listing window accepted from configuration or a query, in hours.
pub const MAX_RECENT_VOTE_HOURS: i64 = 24 * 365;

/// Server configuration loaded from environment variables.
///
/// All fields have sensible defaults suitable for local development.
/// In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Graceful shutdown drain timeout in seconds (default: `30`).
    pub shutdown_timeout_secs: u64,
    /// Minimum minutes between two accepted votes from one visitor (default: `10`).
    pub vote_cooldown_minutes: i64,
    /// Whether the cooldown and per-address throttle are enforced (default: `true`).
    pub rate_limit_enabled: bool,
    /// Votes allowed per origin address inside one throttle window (default: `30`).
    pub ip_throttle_limit: usize,
    /// Per-address throttle window in seconds (default: `3600`).
    pub ip_throttle_window_secs: i64,
    /// Default decay half-life for cluster queries (default: `30`).
    pub half_life_minutes: f64,
    /// Default cutoff age for cluster queries (default: `120`).
    pub cutoff_minutes: f64,
    /// How far back vote listings reach, in hours (default: `24`).
    pub recent_vote_hours: i64,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                   | Default                 |
    /// |---------------------------|-------------------------|
    /// | `HOST`                    | `0.0.0.0`               |
    /// | `PORT`                    | `3000`                  |
    /// | `CORS_ORIGINS`            | `http://localhost:5173` |
    /// | `REQUEST_TIMEOUT_SECS`    | `30`                    |
    /// | `SHUTDOWN_TIMEOUT_SECS`   | `30`                    |
    /// | `VOTE_COOLDOWN_MINUTES`   | `10`                    |
    /// | `RATE_LIMIT_ENABLED`      | `true`                  |
    /// | `IP_THROTTLE_LIMIT`       | `30`                    |
    /// | `IP_THROTTLE_WINDOW_SECS` | `3600`                  |
    /// | `HALF_LIFE_MINUTES`       | `30`                    |
    /// | `CUTOFF_MINUTES`          | `120`                   |
    /// | `RECENT_VOTE_HOURS`       | `24`                    |
    ///
    /// Panics on unparseable values or on decay parameters that would be
    /// rejected by every cluster query; misconfiguration should fail fast.
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let config = Self {
            host,
            port: env_or("PORT", 3000),
            cors_origins,
            request_timeout_secs: env_or("REQUEST_TIMEOUT_SECS", 30),
            shutdown_timeout_secs: env_or("SHUTDOWN_TIMEOUT_SECS", 30),
            vote_cooldown_minutes: env_or("VOTE_COOLDOWN_MINUTES", 10),
            rate_limit_enabled: env_or("RATE_LIMIT_ENABLED", true),
            ip_throttle_limit: env_or("IP_THROTTLE_LIMIT", 30),
            ip_throttle_window_secs: env_or("IP_THROTTLE_WINDOW_SECS", 3600),
            half_life_minutes: env_or("HALF_LIFE_MINUTES", 30.0),
            cutoff_minutes: env_or("CUTOFF_MINUTES", 120.0),
            recent_vote_hours: env_or("RECENT_VOTE_HOURS", 24),
        };

        if let Err(e) = config.validate() {
            panic!("Invalid configuration: {e}");
        }
        config
    }

    /// Reject settings no request could ever succeed with.
    pub fn validate(&self) -> Result<(), CoreError> {
        validate_half_life(self.half_life_minutes)?;
        validate_cutoff(self.cutoff_minutes)?;
        if self.vote_cooldown_minutes < 0 {
            return Err(CoreError::Validation(
                "VOTE_COOLDOWN_MINUTES must not be negative".into(),
            ));
        }
        if self.ip_throttle_limit == 0 || self.ip_throttle_window_secs <= 0 {
            return Err(CoreError::Validation(
                "IP throttle limit and window must be positive".into(),
            ));
        }
        if !(1..=MAX_RECENT_VOTE_HOURS).contains(&self.recent_vote_hours) {
            return Err(CoreError::Validation(format!(
                "RECENT_VOTE_HOURS must be between 1 and {MAX_RECENT_VOTE_HOURS}"
            )));
        }
        Ok(())
    }

    /// Build the vote rate limiter described by this configuration.
    pub fn rate_limiter(&self) -> RateLimiter {
        let addresses = AddressThrottle::new(
            self.ip_throttle_limit,
            Duration::seconds(self.ip_throttle_window_secs),
        );
        RateLimiter::new(
            self.rate_limit_enabled,
            Duration::minutes(self.vote_cooldown_minutes),
            addresses,
        )
    }
}

/// Read and parse an env var, falling back to `default` when unset.
fn env_or<T>(key: &str, default: T) -> T
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .unwrap_or_else(|e| panic!("{key} is not a valid value ('{raw}'): {e}")),
        Err(_) => default,
    }
}
