//! Configuration management for the ServiceHub client.
//!
//! Values come from environment variables, optionally seeded from a `.env`
//! file in the working directory.

use crate::error::{ConfigError, ConfigResult};
use std::env;
use std::time::Duration;

/// Configuration for the ServiceHub client.
#[derive(Debug, Clone)]
pub struct Config {
    /// Backend project base URL
    pub backend_url: String,

    /// Anonymous (publishable) API key
    pub anon_key: String,

    /// Storage bucket for listing images (default: "service-images")
    pub image_bucket: String,

    /// HTTP request timeout in seconds (default: 10)
    pub request_timeout: u64,

    /// Number of listings on the landing feed (default: 6)
    pub feed_limit: usize,

    /// Seconds a cached query stays fresh; 0 keeps it until invalidated (default: 300)
    pub query_stale_seconds: u64,

    /// Log level (default: "error")
    pub log_level: String,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Required environment variables:
    /// - `BACKEND_URL`: Base URL of the backend project
    /// - `BACKEND_ANON_KEY`: Anonymous API key
    ///
    /// Optional environment variables:
    /// - `IMAGE_BUCKET`: Storage bucket for images (default: service-images)
    /// - `REQUEST_TIMEOUT`: HTTP timeout in seconds (default: 10)
    /// - `FEED_LIMIT`: Landing feed size (default: 6)
    /// - `QUERY_STALE_SECONDS`: Cache freshness window (default: 300)
    /// - `LOG_LEVEL`: Logging level (default: "error")
    pub fn from_env() -> ConfigResult<Self> {
        // dotenvy doesn't print to stdout, and a missing file is fine
        let _ = dotenvy::dotenv();

        let backend_url = env::var("BACKEND_URL")
            .map_err(|_| ConfigError::MissingVar("BACKEND_URL".to_string()))?;

        let anon_key = env::var("BACKEND_ANON_KEY")
            .map_err(|_| ConfigError::MissingVar("BACKEND_ANON_KEY".to_string()))?;

        if !backend_url.starts_with("http://") && !backend_url.starts_with("https://") {
            return Err(ConfigError::InvalidValue {
                var: "BACKEND_URL".to_string(),
                reason: "Must start with http:// or https://".to_string(),
            });
        }

        if anon_key.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                var: "BACKEND_ANON_KEY".to_string(),
                reason: "Cannot be empty".to_string(),
            });
        }

        let image_bucket =
            env::var("IMAGE_BUCKET").unwrap_or_else(|_| "service-images".to_string());
        if image_bucket.trim().is_empty() || image_bucket.contains('/') {
            return Err(ConfigError::InvalidValue {
                var: "IMAGE_BUCKET".to_string(),
                reason: "Must be a non-empty bucket name without '/'".to_string(),
            });
        }

        let request_timeout = Self::parse_env_u64("REQUEST_TIMEOUT", 10)?;
        let feed_limit = Self::parse_env_usize("FEED_LIMIT", 6)?;
        if feed_limit == 0 {
            return Err(ConfigError::InvalidValue {
                var: "FEED_LIMIT".to_string(),
                reason: "Must be at least 1".to_string(),
            });
        }
        let query_stale_seconds = Self::parse_env_u64("QUERY_STALE_SECONDS", 300)?;

        let log_level = env::var("LOG_LEVEL").unwrap_or_else(|_| "error".to_string());

        Ok(Config {
            backend_url,
            anon_key,
            image_bucket,
            request_timeout,
            feed_limit,
            query_stale_seconds,
            log_level,
        })
    }

    /// Freshness window for the query cache.
    pub fn query_stale_after(&self) -> Option<Duration> {
        match self.query_stale_seconds {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        }
    }

    /// Parse an environment variable as u64 with a default value.
    fn parse_env_u64(var_name: &str, default: u64) -> ConfigResult<u64> {
        match env::var(var_name) {
            Ok(val) => val.parse::<u64>().map_err(|_| ConfigError::InvalidValue {
                var: var_name.to_string(),
                reason: format!("Must be a positive number, got: {}", val),
            }),
            Err(_) => Ok(default),
        }
    }

    /// Parse an environment variable as usize with a default value.
    fn parse_env_usize(var_name: &str, default: usize) -> ConfigResult<usize> {
        match env::var(var_name) {
            Ok(val) => val.parse::<usize>().map_err(|_| ConfigError::InvalidValue {
                var: var_name.to_string(),
                reason: format!("Must be a positive number, got: {}", val),
            }),
            Err(_) => Ok(default),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            backend_url: String::new(),
            anon_key: String::new(),
            image_bucket: "service-images".to_string(),
            request_timeout: 10,
            feed_limit: 6,
            query_stale_seconds: 300,
            log_level: "error".to_string(),
        }
    }
}
