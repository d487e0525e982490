//! Fetch every page of a language index and extract its rows

use std::time::Duration;

use super::types::{CacheKey, EngineError};
use crate::catalog::UrlBuilder;
use crate::config::ScrapingConfig;
use crate::scraping::extractor::{self, Extraction};
use crate::scraping::fetcher::{FetchError, PageSource};

/// Pagination settings
#[derive(Debug, Clone)]
pub struct Paging {
    pub batch_size: usize,
    /// Pause between consecutive page requests
    pub request_delay: Duration,
}

impl Default for Paging {
    fn default() -> Self {
        Self::from_config(&ScrapingConfig::default())
    }
}

impl Paging {
    pub fn from_config(config: &ScrapingConfig) -> Self {
        Self {
            batch_size: config.batch_size.max(1),
            request_delay: Duration::from_millis(config.request_delay_ms),
        }
    }
}

/// Download and extract all rows for `key`.
///
/// The first page must yield rows. Further pages are requested while the
/// batch navigation announces more templates; a later page without rows ends
/// pagination early.
pub async fn fetch_all<S: PageSource + ?Sized>(
    source: &S,
    urls: &UrlBuilder,
    paging: &Paging,
    key: &CacheKey,
) -> Result<Extraction, EngineError> {
    let batch = paging.batch_size;

    let body = fetch_page(source, urls, key, batch, 0).await?;
    let mut extraction = extractor::extract(&body).map_err(EngineError::parse)?;
    let total = extraction.total_available.unwrap_or(0);

    let mut start = batch;
    while start < total {
        tokio::time::sleep(paging.request_delay).await;
        let body = fetch_page(source, urls, key, batch, start).await?;
        let page = extractor::extract_rows(&body);
        if page.records.is_empty() {
            tracing::warn!(
                "Page at start={} for {} has no rows ({} of {} read), stopping",
                start,
                key,
                extraction.records.len(),
                total
            );
            break;
        }
        extraction.merge(page);
        start += batch;
    }

    Ok(extraction)
}

async fn fetch_page<S: PageSource + ?Sized>(
    source: &S,
    urls: &UrlBuilder,
    key: &CacheKey,
    batch: usize,
    start: usize,
) -> Result<String, EngineError> {
    let url = urls
        .index_page(&key.distribution, &key.language, batch, start)
        .map_err(|e| EngineError::fetch(FetchError::InvalidUrl(e.to_string())))?;
    let page = source.fetch(&url).await.map_err(EngineError::fetch)?;
    tracing::debug!(
        "Fetched {} ({} bytes in {:?})",
        page.url,
        page.body.len(),
        page.fetch_duration
    );
    Ok(page.body)
}
