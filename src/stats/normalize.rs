//! Raw record validation and aggregation

use chrono::{DateTime, Utc};
use std::collections::HashSet;

use crate::catalog::UrlBuilder;
use crate::scraping::extractor::{Extraction, RawRecord};

use super::types::{percent_of, BucketThresholds, PackageStatus, ResultSet, Summary};

/// Turns extracted rows into a [`ResultSet`]
#[derive(Debug, Clone, Default)]
pub struct Normalizer {
    thresholds: BucketThresholds,
    urls: UrlBuilder,
}

impl Normalizer {
    pub fn new(thresholds: BucketThresholds, urls: UrlBuilder) -> Self {
        Self { thresholds, urls }
    }

    /// Build the canonical result set for one query.
    ///
    /// Page order is preserved. Invalid records and zero-total records are
    /// excluded and counted.
    pub fn normalize(
        &self,
        distribution: &str,
        language: &str,
        extraction: Extraction,
        fetched_at: DateTime<Utc>,
    ) -> ResultSet {
        let mut packages = Vec::with_capacity(extraction.records.len());
        let mut seen = HashSet::new();
        let mut dropped = 0;
        let mut empty = 0;

        for record in extraction.records {
            let Some(counts) = validate(&record) else {
                tracing::debug!("Dropping invalid record {:?}", record.name);
                dropped += 1;
                continue;
            };

            let name = record.name.trim().to_string();
            if !seen.insert(name.clone()) {
                tracing::debug!("Dropping duplicate record for {}", name);
                dropped += 1;
                continue;
            }

            let (translated, untranslated, fuzzy) = counts;
            let Some(total) = translated
                .checked_add(untranslated)
                .and_then(|sum| sum.checked_add(fuzzy))
            else {
                tracing::debug!("Dropping record {} with overflowing counts", name);
                dropped += 1;
                continue;
            };
            if total == 0 {
                empty += 1;
                continue;
            }

            let percent = percent_of(translated, total);
            packages.push(PackageStatus {
                detail_url: self.urls.package_detail(distribution, language, &name),
                name,
                translated_count: translated,
                untranslated_count: untranslated,
                fuzzy_count: fuzzy,
                changed_count: record.changed.and_then(|c| u64::try_from(c).ok()).unwrap_or(0),
                percent_translated: percent,
                color_bucket: self.thresholds.classify(percent),
                source_link: record.link,
                last_edited: record.last_edited,
                last_editor: record.last_editor,
            });
        }

        if dropped > 0 {
            tracing::warn!(
                "Dropped {} invalid records for {}/{}",
                dropped,
                distribution,
                language
            );
        }

        let summary = Summary::from_packages(&packages);
        ResultSet {
            distribution: distribution.to_string(),
            language: language.to_string(),
            fetched_at,
            packages,
            summary,
            dropped,
            empty,
            warnings: extraction.warnings,
        }
    }
}

/// Non-empty name and non-negative counts
fn validate(record: &RawRecord) -> Option<(u64, u64, u64)> {
    if record.name.trim().is_empty() {
        return None;
    }
    let translated = u64::try_from(record.translated).ok()?;
    let untranslated = u64::try_from(record.untranslated).ok()?;
    let fuzzy = u64::try_from(record.fuzzy).ok()?;
    Some((translated, untranslated, fuzzy))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::ColorBucket;

    fn record(name: &str, translated: i64, untranslated: i64, fuzzy: i64) -> RawRecord {
        RawRecord {
            name: name.to_string(),
            translated,
            untranslated,
            fuzzy,
            ..Default::default()
        }
    }

    fn extraction(records: Vec<RawRecord>) -> Extraction {
        Extraction {
            rows_seen: records.len(),
            records,
            warnings: 0,
            total_available: None,
        }
    }

    #[test]
    fn test_firefox_thunderbird_vlc() {
        let normalizer = Normalizer::default();
        let result = normalizer.normalize(
            "noble",
            "sv",
            extraction(vec![
                record("firefox", 80, 15, 5),
                record("thunderbird", 0, 0, 0),
                record("vlc", 50, 50, 0),
            ]),
            Utc::now(),
        );

        assert_eq!(result.len(), 2);
        assert!(result.get("thunderbird").is_none());
        assert_eq!(result.empty, 1);
        assert_eq!(result.dropped, 0);

        let firefox = result.get("firefox").unwrap();
        assert_eq!(firefox.total(), 100);
        assert_eq!(firefox.percent_translated, 80.0);
        assert_eq!(firefox.color_bucket, ColorBucket::Green);

        let vlc = result.get("vlc").unwrap();
        assert_eq!(vlc.total(), 100);
        assert_eq!(vlc.percent_translated, 50.0);
        assert_eq!(vlc.color_bucket, ColorBucket::Yellow);

        assert_eq!(result.summary.total, 200);
        assert_eq!(result.summary.percent, 65.0);
        assert_eq!(result.summary.package_count, 2);
    }

    #[test]
    fn test_summary_uses_sums_not_average() {
        let normalizer = Normalizer::default();
        let result = normalizer.normalize(
            "noble",
            "sv",
            extraction(vec![record("small", 1, 0, 0), record("large", 0, 99, 0)]),
            Utc::now(),
        );

        // Average of percents would be 50.0
        assert_eq!(result.summary.percent, 1.0);
        assert_eq!(result.summary.fully_translated, 1);
        assert_eq!(result.summary.untouched, 1);
    }

    #[test]
    fn test_invalid_records_are_counted() {
        let normalizer = Normalizer::default();
        let result = normalizer.normalize(
            "noble",
            "sv",
            extraction(vec![
                record("", 1, 1, 1),
                record("   ", 1, 1, 1),
                record("negative", -1, 5, 0),
                record("gedit", 3, 1, 0),
                record("gedit", 4, 0, 0),
            ]),
            Utc::now(),
        );

        assert_eq!(result.dropped, 4);
        assert_eq!(result.len(), 1);
        assert_eq!(result.get("gedit").unwrap().translated_count, 3);
    }

    #[test]
    fn test_overflowing_counts_are_dropped() {
        let normalizer = Normalizer::default();
        let result = normalizer.normalize(
            "noble",
            "sv",
            extraction(vec![
                record("huge", i64::MAX, i64::MAX, i64::MAX),
                record("vlc", 50, 50, 0),
            ]),
            Utc::now(),
        );

        assert_eq!(result.dropped, 1);
        assert_eq!(result.len(), 1);
        assert!(result.get("huge").is_none());
        assert_eq!(result.summary.total, 100);
    }

    #[test]
    fn test_summary_percent_is_unrounded() {
        let normalizer = Normalizer::default();
        let result = normalizer.normalize(
            "noble",
            "sv",
            extraction(vec![record("a", 1, 2, 0)]),
            Utc::now(),
        );

        assert_eq!(result.get("a").unwrap().percent_translated, 33.3);
        assert_eq!(result.summary.percent, 100.0 * 1.0 / 3.0);
    }

    #[test]
    fn test_percent_bounds_and_rounding() {
        let normalizer = Normalizer::default();
        let result = normalizer.normalize(
            "noble",
            "sv",
            extraction(vec![record("a", 1, 2, 0), record("b", 2, 1, 0)]),
            Utc::now(),
        );

        assert_eq!(result.get("a").unwrap().percent_translated, 33.3);
        assert_eq!(result.get("b").unwrap().percent_translated, 66.7);
        for package in &result.packages {
            assert!(package.total() > 0);
            assert!((0.0..=100.0).contains(&package.percent_translated));
        }
    }

    #[test]
    fn test_custom_thresholds_and_detail_url() {
        let normalizer = Normalizer::new(
            BucketThresholds {
                green: 100.0,
                yellow: 75.0,
            },
            UrlBuilder::default(),
        );
        let result = normalizer.normalize(
            "focal",
            "fi",
            extraction(vec![record("nautilus", 90, 10, 0)]),
            Utc::now(),
        );

        let nautilus = result.get("nautilus").unwrap();
        assert_eq!(nautilus.color_bucket, ColorBucket::Yellow);
        assert_eq!(
            nautilus.detail_url,
            "https://translations.launchpad.net/ubuntu/focal/+source/nautilus/+pots/nautilus/fi/+translate"
        );
    }
}
