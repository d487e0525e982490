//! Query façade types

use std::fmt;
use std::time::Duration;
use thiserror::Error;

use crate::scraping::extractor::ParseError;
use crate::scraping::fetcher::FetchError;
use crate::stats::{ResultSet, SortOrder};

/// Pipeline stage an [`EngineError`] originated in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Query,
    Fetch,
    Extract,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Query => "query",
            Self::Fetch => "fetch",
            Self::Extract => "extract",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineCause {
    #[error("{0}")]
    Invalid(String),
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error(transparent)]
    Parse(#[from] ParseError),
}

/// Failure of a status query.
///
/// Cloneable so one failed refresh can be handed to every caller waiting on it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{stage} failed: {cause}")]
pub struct EngineError {
    pub stage: Stage,
    #[source]
    pub cause: EngineCause,
}

impl EngineError {
    pub fn invalid(message: impl Into<String>) -> Self {
        Self {
            stage: Stage::Query,
            cause: EngineCause::Invalid(message.into()),
        }
    }

    pub fn fetch(error: FetchError) -> Self {
        Self {
            stage: Stage::Fetch,
            cause: EngineCause::Fetch(error),
        }
    }

    pub fn parse(error: ParseError) -> Self {
        Self {
            stage: Stage::Extract,
            cause: EngineCause::Parse(error),
        }
    }
}

/// Per-call options for [`StatusEngine::get_status`](super::StatusEngine::get_status)
#[derive(Debug, Clone, Default)]
pub struct QueryOptions {
    /// Bypass a fresh cache entry
    pub force_refresh: bool,
    /// Case-insensitive package name filter; empty keeps all
    pub filter_text: String,
    pub sort_order: SortOrder,
}

impl QueryOptions {
    pub fn refresh() -> Self {
        Self {
            force_refresh: true,
            ..Default::default()
        }
    }
}

/// Where the data in a [`StatusView`] came from
#[derive(Debug, Clone, PartialEq)]
pub enum Freshness {
    /// Fetched by this call or by a concurrent call it joined
    Fetched,
    /// Served from a cache entry within its TTL
    Cached { age: Duration },
    /// Refresh failed; this is the last good data
    Stale { age: Duration, error: EngineError },
}

impl Freshness {
    pub fn is_stale(&self) -> bool {
        matches!(self, Freshness::Stale { .. })
    }
}

/// Answer to a status query: the filtered and sorted result plus its origin
#[derive(Debug, Clone)]
pub struct StatusView {
    pub result: ResultSet,
    pub freshness: Freshness,
}

/// Cache and single-flight key
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub distribution: String,
    pub language: String,
}

impl CacheKey {
    pub fn new(distribution: impl Into<String>, language: impl Into<String>) -> Self {
        Self {
            distribution: distribution.into(),
            language: language.into(),
        }
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.distribution, self.language)
    }
}
