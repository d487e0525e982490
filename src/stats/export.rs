//! Flat per-package rows for spreadsheet export

use serde::Serialize;
use std::io::Write;

use super::types::{PackageStatus, ResultSet};

/// One CSV line per package
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportRow<'a> {
    pub name: &'a str,
    pub translated_pct: f64,
    pub untranslated: u64,
    pub need_review: u64,
    pub changed: u64,
    pub total: u64,
    pub last_edited: Option<&'a str>,
    pub last_editor: Option<&'a str>,
}

impl<'a> From<&'a PackageStatus> for ExportRow<'a> {
    fn from(package: &'a PackageStatus) -> Self {
        Self {
            name: &package.name,
            translated_pct: package.percent_translated,
            untranslated: package.untranslated_count,
            need_review: package.fuzzy_count,
            changed: package.changed_count,
            total: package.total(),
            last_edited: package.last_edited.as_deref(),
            last_editor: package.last_editor.as_deref(),
        }
    }
}

/// Write the packages of `result` as CSV with a header line
pub fn write_csv<W: Write>(result: &ResultSet, sink: W) -> Result<(), csv::Error> {
    let mut writer = csv::Writer::from_writer(sink);
    if result.is_empty() {
        // serde only emits the header with the first record
        writer.write_record(HEADER)?;
    }
    for package in &result.packages {
        writer.serialize(ExportRow::from(package))?;
    }
    writer.flush()?;
    Ok(())
}

const HEADER: [&str; 8] = [
    "name",
    "translated_pct",
    "untranslated",
    "need_review",
    "changed",
    "total",
    "last_edited",
    "last_editor",
];
