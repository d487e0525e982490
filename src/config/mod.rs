//! Configuration for ubuntu-l10n

mod cache;
mod logging;
mod scraping;

pub use cache::CacheConfig;
pub use logging::{LogFormat, LogLevel, LoggingConfig};
pub use scraping::ScrapingConfig;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;
use url::Url;

use crate::stats::BucketThresholds;

/// Default user agent for all HTTP requests
pub const DEFAULT_USER_AGENT: &str = concat!("ubuntu-l10n/", env!("CARGO_PKG_VERSION"));

/// Main configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Fetching and pagination
    #[serde(default)]
    pub scraping: ScrapingConfig,
    /// Result cache
    #[serde(default)]
    pub cache: CacheConfig,
    /// Colour bucket thresholds
    #[serde(default)]
    pub buckets: BucketThresholds,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file and validate it
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Failed to read config file '{}': {}", path.display(), e))?;
        let config: Config = toml::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Failed to parse config file '{}': {}", path.display(), e))?;
        config.validate()?;
        Ok(config)
    }

    /// Load `path` if it exists, otherwise use defaults
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            tracing::debug!("No config file at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }

    /// Validate all configuration fields.
    ///
    /// All problems are reported together in one error.
    pub fn validate(&self) -> Result<()> {
        let mut errors: Vec<String> = Vec::new();

        // Scraping
        let scraping = &self.scraping;
        if scraping.user_agent.trim().is_empty() {
            errors.push("user_agent must not be empty".to_string());
        }
        if scraping.timeout_secs == 0 {
            errors.push("timeout_secs must be positive".to_string());
        }
        if scraping.connect_timeout_secs == 0 {
            errors.push("connect_timeout_secs must be positive".to_string());
        }
        if scraping.max_retries > 10 {
            errors.push("max_retries must be <= 10".to_string());
        }
        if scraping.retry_base_delay_ms > scraping.max_retry_delay_ms {
            errors.push(format!(
                "retry_base_delay_ms ({}) must not exceed max_retry_delay_ms ({})",
                scraping.retry_base_delay_ms, scraping.max_retry_delay_ms
            ));
        }
        if scraping.batch_size == 0 {
            errors.push("batch_size must be positive".to_string());
        }
        if scraping.batch_size > 300 {
            errors.push("batch_size must be <= 300".to_string());
        }
        if scraping.allowed_hosts.is_empty() {
            errors.push("allowed_hosts must not be empty".to_string());
        }
        match Url::parse(&scraping.base_url) {
            Ok(url) => match url.host_str() {
                Some(host) if !scraping.allowed_hosts.iter().any(|h| h.eq_ignore_ascii_case(host)) => {
                    errors.push(format!("base_url host {} is not in allowed_hosts", host));
                }
                Some(_) => {}
                None => errors.push("base_url must have a host".to_string()),
            },
            Err(e) => errors.push(format!("base_url is not a valid URL: {}", e)),
        }

        // Cache
        if self.cache.ttl_secs == 0 {
            errors.push("cache ttl_secs must be positive".to_string());
        }
        if self.cache.max_entries == 0 {
            errors.push("cache max_entries must be positive".to_string());
        }

        // Buckets
        let buckets = &self.buckets;
        if !(0.0..=100.0).contains(&buckets.green) || !(0.0..=100.0).contains(&buckets.yellow) {
            errors.push("bucket thresholds must be between 0 and 100".to_string());
        } else if buckets.yellow > buckets.green {
            errors.push(format!(
                "yellow threshold ({}) must not exceed green threshold ({})",
                buckets.yellow, buckets.green
            ));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            anyhow::bail!(
                "Configuration validation failed:\n  - {}",
                errors.join("\n  - ")
            );
        }
    }
}
