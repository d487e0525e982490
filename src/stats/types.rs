//! Translation statistics model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Completion color for one package
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorBucket {
    Green,
    Yellow,
    Red,
}

impl ColorBucket {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Green => "green",
            Self::Yellow => "yellow",
            Self::Red => "red",
        }
    }
}

impl fmt::Display for ColorBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Percent cutoffs mapping completion onto a [`ColorBucket`]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BucketThresholds {
    /// Minimum percent for green
    #[serde(default = "default_green")]
    pub green: f64,
    /// Minimum percent for yellow
    #[serde(default = "default_yellow")]
    pub yellow: f64,
}

fn default_green() -> f64 {
    80.0
}

fn default_yellow() -> f64 {
    40.0
}

impl Default for BucketThresholds {
    fn default() -> Self {
        Self {
            green: default_green(),
            yellow: default_yellow(),
        }
    }
}

impl BucketThresholds {
    pub fn classify(&self, percent: f64) -> ColorBucket {
        if percent >= self.green {
            ColorBucket::Green
        } else if percent >= self.yellow {
            ColorBucket::Yellow
        } else {
            ColorBucket::Red
        }
    }
}

/// Translation status of one package template
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PackageStatus {
    pub name: String,
    pub translated_count: u64,
    pub untranslated_count: u64,
    pub fuzzy_count: u64,
    /// Strings changed in Ubuntu compared to upstream
    pub changed_count: u64,
    pub percent_translated: f64,
    pub color_bucket: ColorBucket,
    pub detail_url: String,
    /// Link found on the status page, if any
    pub source_link: Option<String>,
    pub last_edited: Option<String>,
    pub last_editor: Option<String>,
}

impl PackageStatus {
    pub fn total(&self) -> u64 {
        self.translated_count
            .saturating_add(self.untranslated_count)
            .saturating_add(self.fuzzy_count)
    }
}

/// Aggregate over all packages of a result set
///
/// `percent` is computed from the summed counts, not from per-package percents,
/// and is not rounded.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub package_count: usize,
    pub translated: u64,
    pub untranslated: u64,
    pub fuzzy: u64,
    pub total: u64,
    pub percent: f64,
    /// Packages at 100%
    pub fully_translated: usize,
    /// Packages at 0%
    pub untouched: usize,
}

impl Summary {
    pub fn from_packages(packages: &[PackageStatus]) -> Self {
        let mut summary = Summary {
            package_count: packages.len(),
            ..Default::default()
        };

        for package in packages {
            summary.translated = summary.translated.saturating_add(package.translated_count);
            summary.untranslated = summary.untranslated.saturating_add(package.untranslated_count);
            summary.fuzzy = summary.fuzzy.saturating_add(package.fuzzy_count);
            if package.translated_count == package.total() {
                summary.fully_translated += 1;
            }
            if package.translated_count == 0 {
                summary.untouched += 1;
            }
        }

        summary.total = summary
            .translated
            .saturating_add(summary.untranslated)
            .saturating_add(summary.fuzzy);
        summary.percent = ratio(summary.translated, summary.total);
        summary
    }
}

/// `100 * part / whole` rounded to one decimal, 0 for an empty whole
pub fn percent_of(part: u64, whole: u64) -> f64 {
    let raw = ratio(part, whole);
    ((raw * 10.0).round() / 10.0).clamp(0.0, 100.0)
}

fn ratio(part: u64, whole: u64) -> f64 {
    if whole == 0 {
        return 0.0;
    }
    (100.0 * part as f64 / whole as f64).clamp(0.0, 100.0)
}

/// Statistics for one (distribution, language) query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultSet {
    pub distribution: String,
    pub language: String,
    pub fetched_at: DateTime<Utc>,
    pub packages: Vec<PackageStatus>,
    pub summary: Summary,
    /// Records rejected as invalid (empty name, negative count, duplicate)
    pub dropped: usize,
    /// Records excluded because all their counts were zero
    pub empty: usize,
    /// Malformed rows skipped during extraction
    pub warnings: usize,
}

impl ResultSet {
    pub fn len(&self) -> usize {
        self.packages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&PackageStatus> {
        self.packages.iter().find(|p| p.name == name)
    }
}

/// Ordering applied to a result set
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    /// Page order
    #[default]
    None,
    /// Least translated first
    Ascending,
    /// Most translated first
    Descending,
    /// Name A-Z, case-insensitive
    Name,
    /// Largest templates first
    MostStrings,
    /// Most recently edited first
    RecentlyEdited,
}
