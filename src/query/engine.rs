//! Status engine: validation, caching, single-flight refresh and views

use chrono::Utc;
use std::sync::Arc;
use tokio::time::Instant;

use super::cache::{CacheEntry, StatusCache};
use super::pipeline::{fetch_all, Paging};
use super::single_flight::{Joined, Outcome, PendingRegistry};
use super::types::{CacheKey, EngineError, Freshness, QueryOptions, StatusView};
use crate::catalog::{self, UrlBuilder};
use crate::config::Config;
use crate::scraping::fetcher::{FetchConfig, FetchEngine, PageSource};
use crate::stats::{self, LanguageReport, Normalizer, ResultSet, SortOrder};

/// Answers translation status queries for (release, language) pairs.
///
/// Owns the result cache. Concurrent queries for the same pair share a single
/// refresh, and a failed refresh never replaces good cached data.
pub struct StatusEngine<S> {
    source: S,
    urls: UrlBuilder,
    paging: Paging,
    normalizer: Normalizer,
    cache: StatusCache,
    pending: PendingRegistry,
}

impl StatusEngine<FetchEngine> {
    /// Engine backed by HTTP fetching from Launchpad
    pub fn launchpad(config: &Config) -> Result<Self, reqwest::Error> {
        let fetcher = FetchEngine::new(FetchConfig::from_config(&config.scraping))?;
        Ok(Self::new(fetcher, config))
    }
}

impl<S: PageSource> StatusEngine<S> {
    pub fn new(source: S, config: &Config) -> Self {
        let urls = UrlBuilder::new(config.scraping.base_url.clone());
        Self {
            source,
            normalizer: Normalizer::new(config.buckets, urls.clone()),
            urls,
            paging: Paging::from_config(&config.scraping),
            cache: StatusCache::from_config(&config.cache),
            pending: PendingRegistry::new(),
        }
    }

    /// Translation status for one release and language.
    ///
    /// A fresh cached result is served unless `force_refresh` is set. When a
    /// refresh fails, an unforced call falls back to the cached result marked
    /// [`Freshness::Stale`]; otherwise the error is returned.
    pub async fn get_status(
        &self,
        distribution: &str,
        language: &str,
        options: &QueryOptions,
    ) -> Result<StatusView, EngineError> {
        let key = validate(distribution, language)?;

        if !options.force_refresh {
            if let Some(entry) = self.cache.get_fresh(&key) {
                tracing::debug!("Serving {} from cache", key);
                let age = entry.age(Instant::now());
                return Ok(view(&entry.result, options, Freshness::Cached { age }));
            }
        }

        match self.refresh(&key, options.force_refresh).await {
            Ok(result) => Ok(view(&result, options, Freshness::Fetched)),
            Err(error) if !options.force_refresh => match self.cache.get(&key) {
                Some(entry) => Ok(self.fallback(&key, entry, options, error)),
                None => Err(error),
            },
            Err(error) => Err(error),
        }
    }

    fn fallback(
        &self,
        key: &CacheKey,
        entry: CacheEntry,
        options: &QueryOptions,
        error: EngineError,
    ) -> StatusView {
        let age = entry.age(Instant::now());
        let freshness = if self.cache.is_fresh(&entry) {
            // Another caller refreshed while this one failed
            Freshness::Cached { age }
        } else {
            tracing::warn!("Refresh of {} failed ({}), serving data {:?} old", key, error, age);
            Freshness::Stale { age, error }
        };
        view(&entry.result, options, freshness)
    }

    /// Run the pipeline for `key`, or wait for the run already in flight
    async fn refresh(&self, key: &CacheKey, forced: bool) -> Outcome {
        loop {
            match self.pending.join(key) {
                Joined::Leader(guard) => {
                    if !forced {
                        if let Some(entry) = self.cache.get_fresh(key) {
                            let result = entry.result;
                            guard.complete(Ok(result.clone()));
                            return Ok(result);
                        }
                    }

                    let outcome = self.run_pipeline(key).await.map(Arc::new);
                    if let Ok(result) = &outcome {
                        self.cache.put(key.clone(), result.clone());
                    }
                    guard.complete(outcome.clone());
                    return outcome;
                }
                Joined::Follower(follower) => {
                    tracing::debug!("Waiting for in-flight refresh of {}", key);
                    match follower.wait().await {
                        Some(outcome) => return outcome,
                        None => tracing::debug!("Refresh of {} was abandoned, retrying", key),
                    }
                }
            }
        }
    }

    async fn run_pipeline(&self, key: &CacheKey) -> Result<ResultSet, EngineError> {
        let started = std::time::Instant::now();
        let extraction = fetch_all(&self.source, &self.urls, &self.paging, key).await?;
        let result = self.normalizer.normalize(
            &key.distribution,
            &key.language,
            extraction,
            Utc::now(),
        );
        tracing::info!(
            "Refreshed {}: {} packages, {:.1}% translated, {} dropped, {} skipped rows in {:?}",
            key,
            result.len(),
            result.summary.percent,
            result.dropped,
            result.warnings,
            started.elapsed()
        );
        Ok(result)
    }

    /// Drop the cached result for one pair
    pub fn invalidate(&self, distribution: &str, language: &str) -> bool {
        self.cache.remove(&CacheKey::new(distribution, language))
    }

    pub fn clear_cache(&self) {
        self.cache.clear();
    }

    pub fn cached_entries(&self) -> usize {
        self.cache.len()
    }

    pub fn refreshes_in_flight(&self) -> usize {
        self.pending.in_flight()
    }

    /// Overview with the `len` most and least translated packages
    pub async fn language_report(
        &self,
        distribution: &str,
        language: &str,
        len: usize,
    ) -> Result<(LanguageReport, Freshness), EngineError> {
        let view = self
            .get_status(distribution, language, &QueryOptions::default())
            .await?;
        Ok((stats::language_report(&view.result, len), view.freshness))
    }

    pub fn filter(&self, result: &ResultSet, text: &str) -> ResultSet {
        stats::filter(result, text)
    }

    pub fn sort(&self, result: &ResultSet, order: SortOrder) -> ResultSet {
        stats::sort(result, order)
    }

    /// Launchpad translate page for one package
    pub fn package_detail_url(&self, distribution: &str, language: &str, package: &str) -> String {
        self.urls.package_detail(distribution, language, package)
    }

    pub fn source(&self) -> &S {
        &self.source
    }
}

fn validate(distribution: &str, language: &str) -> Result<CacheKey, EngineError> {
    if catalog::find_release(distribution).is_none() {
        return Err(EngineError::invalid(format!("unknown release {:?}", distribution)));
    }
    if !catalog::is_valid_language_code(language) {
        return Err(EngineError::invalid(format!("invalid language code {:?}", language)));
    }
    Ok(CacheKey::new(distribution, language))
}

fn view(result: &ResultSet, options: &QueryOptions, freshness: Freshness) -> StatusView {
    StatusView {
        result: stats::apply(result, &options.filter_text, options.sort_order),
        freshness,
    }
}
