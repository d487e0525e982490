//! ubuntu-l10n: translation status for Ubuntu releases
//!
//! Collects per-package translation statistics for a release and language
//! from Launchpad's translation pages and serves them as sortable, filterable
//! summaries:
//! - Polite HTTP fetching with retries and a host allow-list
//! - Tolerant HTML extraction that survives markup drift and bad rows
//! - Normalized per-package percentages, color buckets and language totals
//! - A TTL result cache with single-flight refresh and stale fallback

pub mod catalog;
pub mod config;
pub mod query;
pub mod scraping;
pub mod stats;
pub mod util;

pub use config::Config;
pub use query::{EngineError, Freshness, QueryOptions, StatusEngine, StatusView};
pub use stats::{PackageStatus, ResultSet, SortOrder, Summary};
