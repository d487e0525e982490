//! Extraction types

use thiserror::Error;

/// Errors during status page extraction
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// No package rows could be read from the page
    #[error("No package rows found on the status page")]
    EmptyResult,
    /// One row could not be read; recovered locally and counted
    #[error("Malformed row {row}: {reason}")]
    MalformedRow { row: usize, reason: String },
}

/// One package row as read from the page, before validation.
///
/// Counts are signed so that negative values survive extraction and are
/// rejected by the normalizer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawRecord {
    pub name: String,
    /// href of the row's template link
    pub link: Option<String>,
    pub translated: i64,
    pub untranslated: i64,
    /// "Need review" on Launchpad
    pub fuzzy: i64,
    pub changed: Option<i64>,
    pub last_edited: Option<String>,
    pub last_editor: Option<String>,
}

/// Rows extracted from one or more status pages
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Extraction {
    pub records: Vec<RawRecord>,
    /// Data rows skipped as malformed
    pub warnings: usize,
    /// Data rows looked at; always `records.len() + warnings`
    pub rows_seen: usize,
    /// Total number of templates announced by the batch navigation
    pub total_available: Option<usize>,
}

impl Extraction {
    /// Append the rows of a following page
    pub fn merge(&mut self, next: Extraction) {
        self.records.extend(next.records);
        self.warnings += next.warnings;
        self.rows_seen += next.rows_seen;
        if self.total_available.is_none() {
            self.total_available = next.total_available;
        }
    }
}
