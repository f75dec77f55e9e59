//! Server configuration read from the environment.

use std::env;
use std::time::Duration;

pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3000";
pub const DEFAULT_ENVIRONMENT: &str = "development";
pub const DEFAULT_LOG_FILTER: &str = "fleet_estimator=info";

#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    /// `FLEET_BIND_ADDR`
    pub bind_addr: String,
    /// `FLEET_ENV`, reported by the health endpoint.
    pub environment: String,
    /// `FLEET_ESTIMATE_DELAY_MS`.  The funnel shows a "calculating"
    /// animation; a non-zero delay keeps it on screen.  Never applied
    /// inside the estimator.
    pub estimate_delay: Duration,
    /// `FLEET_LOG`, a `tracing_subscriber::EnvFilter` directive.
    pub log_filter: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            environment: DEFAULT_ENVIRONMENT.to_string(),
            estimate_delay: Duration::ZERO,
            log_filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds a config from an arbitrary variable lookup.  Blank or
    /// unparseable values fall back to the defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let non_blank = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        Self {
            bind_addr: non_blank("FLEET_BIND_ADDR").unwrap_or(defaults.bind_addr),
            environment: non_blank("FLEET_ENV").unwrap_or(defaults.environment),
            estimate_delay: non_blank("FLEET_ESTIMATE_DELAY_MS")
                .and_then(|v| v.trim().parse::<u64>().ok())
                .map(Duration::from_millis)
                .unwrap_or(defaults.estimate_delay),
            log_filter: non_blank("FLEET_LOG").unwrap_or(defaults.log_filter),
        }
    }
}
