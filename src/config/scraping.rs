//! Fetching and pagination configuration

use serde::{Deserialize, Serialize};

use super::DEFAULT_USER_AGENT;
use crate::catalog::{LAUNCHPAD_BASE_URL, LAUNCHPAD_HOST};

/// How status pages are requested from Launchpad
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScrapingConfig {
    /// User agent string
    pub user_agent: String,
    /// Request timeout (seconds)
    pub timeout_secs: u64,
    /// Connection timeout (seconds)
    pub connect_timeout_secs: u64,
    /// Extra attempts after a failed request
    pub max_retries: u32,
    /// First retry delay, doubled per attempt (milliseconds)
    pub retry_base_delay_ms: u64,
    /// Cap on a single retry delay (milliseconds)
    pub max_retry_delay_ms: u64,
    /// Rows requested per page
    pub batch_size: usize,
    /// Pause between consecutive page requests (milliseconds)
    pub request_delay_ms: u64,
    /// Hosts the fetcher may contact
    pub allowed_hosts: Vec<String>,
    /// Root of the translation pages
    pub base_url: String,
}

impl Default for ScrapingConfig {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout_secs: 30,
            connect_timeout_secs: 10,
            max_retries: 3,
            retry_base_delay_ms: 2000,
            max_retry_delay_ms: 16_000,
            batch_size: 300,
            request_delay_ms: 800,
            allowed_hosts: vec![LAUNCHPAD_HOST.to_string()],
            base_url: LAUNCHPAD_BASE_URL.to_string(),
        }
    }
}
