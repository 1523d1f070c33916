//! services/dashboard/src/config.rs
//!
//! Defines the dashboard's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The `.env`
//! file is used for local development.

use std::str::FromStr;
use std::time::Duration;

use agri_core::SeasonStatus;
use tracing::Level;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing the environment variable {0}")]
    MissingVar(String),
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Where reference data (soil types, plot statuses) comes from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReferenceSource {
    /// Locally defined records, validated like any server payload.
    Static,
    /// The backend's reference endpoints.
    Network,
}

impl FromStr for ReferenceSource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "static" => Ok(ReferenceSource::Static),
            "network" => Ok(ReferenceSource::Network),
            other => Err(format!("'{}' is neither 'static' nor 'network'", other)),
        }
    }
}

/// Tunables of the query cache.
#[derive(Clone, Debug)]
pub struct CacheConfig {
    /// Retries after the first failed read.
    pub retry_attempts: u32,
    /// Delay before the first retry; doubles on each further attempt.
    pub retry_base_delay: Duration,
    pub retry_max_delay: Duration,
    /// How long an entry survives after its last observer detaches.
    pub gc_time: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            retry_attempts: 3,
            retry_base_delay: Duration::from_millis(1000),
            retry_max_delay: Duration::from_secs(30),
            gc_time: Duration::from_secs(300),
        }
    }
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub api_base_url: String,
    pub api_token: Option<String>,
    pub log_level: Level,
    pub http_timeout: Duration,
    pub cache: CacheConfig,
    pub reference_source: ReferenceSource,
    pub season_status_filter: SeasonStatus,
}

fn parse_var<T: FromStr>(name: &str, default: &str) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    let raw = std::env::var(name).unwrap_or_else(|_| default.to_string());
    raw.parse::<T>()
        .map_err(|e| ConfigError::InvalidValue(name.to_string(), e.to_string()))
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// It will look for a `.env` file in the current directory for development,
    /// but this is skipped in test environments to ensure tests are hermetic.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Only load from .env in non-test mode to avoid contamination.
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }

        // --- Backend Settings ---
        let api_base_url = std::env::var("API_BASE_URL")
            .unwrap_or_else(|_| "http://localhost:8080".to_string())
            .trim_end_matches('/')
            .to_string();
        if !(api_base_url.starts_with("http://") || api_base_url.starts_with("https://")) {
            return Err(ConfigError::InvalidValue(
                "API_BASE_URL".to_string(),
                format!("'{}' is not an http(s) URL", api_base_url),
            ));
        }
        let api_token = std::env::var("API_TOKEN").ok().filter(|t| !t.is_empty());

        let log_level_str = std::env::var("RUST_LOG").unwrap_or_else(|_| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        let http_timeout = Duration::from_secs(parse_var("HTTP_TIMEOUT_SECS", "30")?);

        // --- Query Cache Settings ---
        let cache = CacheConfig {
            retry_attempts: parse_var("QUERY_RETRY_ATTEMPTS", "3")?,
            retry_base_delay: Duration::from_millis(parse_var("QUERY_RETRY_BASE_MS", "1000")?),
            retry_max_delay: Duration::from_secs(30),
            gc_time: Duration::from_secs(parse_var("QUERY_GC_SECS", "300")?),
        };

        // --- Data Source Settings ---
        let reference_source = parse_var("REFERENCE_DATA_SOURCE", "static")?;
        let season_status_filter = parse_var("SEASON_STATUS_FILTER", "ACTIVE")?;

        Ok(Self {
            api_base_url,
            api_token,
            log_level,
            http_timeout,
            cache,
            reference_source,
            season_status_filter,
        })
    }
}
