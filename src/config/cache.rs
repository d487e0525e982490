//! Result cache configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// In-memory result cache
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Age after which an entry is refreshed (seconds)
    pub ttl_secs: u64,
    /// Maximum cached (release, language) pairs
    pub max_entries: usize,
}

impl CacheConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_secs: 3600,
            max_entries: 64,
        }
    }
}
