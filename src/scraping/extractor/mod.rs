//! Package rows from Launchpad translation status pages
//!
//! - Locates the statistics table, by class or by its header text
//! - Maps columns by header label rather than position
//! - Reads counts from the hidden sort keys when present, else the cell text
//! - Skips malformed rows with a warning instead of failing the page

mod columns;
mod cursor;
mod types;

pub use columns::{Column, ColumnMap};
pub use cursor::{DocumentCursor, NodeCursor, Role};
pub use types::*;

use regex_lite::Regex;
use std::sync::OnceLock;

/// Extract package rows from a status page.
///
/// Returns [`ParseError::EmptyResult`] when no row could be read.
pub fn extract(raw_html: &str) -> Result<Extraction, ParseError> {
    let extraction = extract_rows(raw_html);
    if extraction.records.is_empty() {
        return Err(ParseError::EmptyResult);
    }
    Ok(extraction)
}

/// Like [`extract`] but an empty page is not an error
pub fn extract_rows(raw_html: &str) -> Extraction {
    let document = DocumentCursor::parse(raw_html);
    let total_available = total_count(&document);

    let Some(table) = find_stats_table(&document) else {
        tracing::debug!("No translation statistics table on page");
        return Extraction {
            total_available,
            ..Default::default()
        };
    };

    let columns = ColumnMap::resolve(&table);
    let mut rows: Vec<NodeCursor<'_>> = table.find_by_role(Role::DataRow).collect();
    if rows.is_empty() {
        rows = table.find_by_role(Role::BodyRow).collect();
    }

    let mut extraction = Extraction {
        total_available,
        ..Default::default()
    };

    for (index, row) in rows.iter().enumerate() {
        let cells: Vec<NodeCursor<'_>> = row.find_by_role(Role::Cell).collect();
        if cells.is_empty() {
            // Header or spacer row
            continue;
        }
        extraction.rows_seen += 1;

        match read_row(index, &cells, &columns) {
            Ok(record) => extraction.records.push(record),
            Err(e) => {
                tracing::warn!("Skipping row: {}", e);
                extraction.warnings += 1;
            }
        }
    }

    extraction
}

/// Number of templates announced by the batch navigation ("1 → 300 of 1,234 results")
fn total_count(document: &DocumentCursor) -> Option<usize> {
    static OF_TOTAL: OnceLock<Regex> = OnceLock::new();
    let pattern =
        OF_TOTAL.get_or_init(|| Regex::new(r"of\s+([\d,]+)").expect("total count pattern is valid"));

    let text = document.find_by_role(Role::BatchNavigation).next()?.text();
    let digits = pattern.captures(&text)?.get(1)?.as_str().replace(',', "");
    digits.parse().ok()
}

fn find_stats_table<'a>(document: &'a DocumentCursor) -> Option<NodeCursor<'a>> {
    if let Some(table) = document.find_by_role(Role::StatsTable).next() {
        return Some(table);
    }
    document
        .find_by_text(Role::HeaderCell, "untranslated")
        .and_then(|header| header.closest(Role::Table))
}

fn read_row(index: usize, cells: &[NodeCursor<'_>], columns: &ColumnMap) -> Result<RawRecord, ParseError> {
    let malformed = |reason: String| ParseError::MalformedRow { row: index, reason };

    let name_cell = columns
        .name
        .and_then(|i| cells.get(i))
        .ok_or_else(|| malformed("missing name cell".to_string()))?;
    let link = name_cell.first_by_role(Role::Link);
    let name = link.map(|l| l.text()).unwrap_or_else(|| name_cell.text());
    if name.is_empty() {
        return Err(malformed("empty package name".to_string()));
    }

    let required = |column: Option<usize>, label: &str| -> Result<i64, ParseError> {
        let cell = column
            .and_then(|i| cells.get(i))
            .ok_or_else(|| malformed(format!("{}: missing {} cell", name, label)))?;
        read_count(cell).ok_or_else(|| malformed(format!("{}: non-numeric {} {:?}", name, label, cell.text())))
    };

    let untranslated = required(columns.untranslated, "untranslated")?;
    let fuzzy = required(columns.need_review, "need review")?;
    let translated = match columns.translated {
        Some(_) => required(columns.translated, "translated")?,
        None => {
            let total = required(columns.total, "total")?;
            total
                .checked_sub(untranslated)
                .and_then(|rest| rest.checked_sub(fuzzy))
                .ok_or_else(|| malformed(format!("{}: count overflow", name)))?
                .max(0)
        }
    };

    let optional = |column: Option<usize>| column.and_then(|i| cells.get(i));

    let changed = optional(columns.changed).and_then(read_count);
    let last_edited = optional(columns.last_edited)
        .map(|cell| match cell.first_by_role(Role::Time) {
            Some(time) => time.attr("datetime").map(str::to_string).unwrap_or_else(|| time.text()),
            None => cell.text(),
        })
        .filter(|s| !s.is_empty());
    let last_editor = optional(columns.last_editor)
        .map(|cell| cell.first_by_role(Role::Link).map(|l| l.text()).unwrap_or_else(|| cell.text()))
        .filter(|s| !s.is_empty());

    Ok(RawRecord {
        name,
        link: link.and_then(|l| l.attr("href")).map(str::to_string),
        translated,
        untranslated,
        fuzzy,
        changed,
        last_edited,
        last_editor,
    })
}

/// Sort key when present, else the visible text
fn read_count(cell: &NodeCursor<'_>) -> Option<i64> {
    let text = cell
        .first_by_role(Role::SortKey)
        .map(|s| s.text())
        .unwrap_or_else(|| cell.text());
    parse_count(&text)
}

/// Parse "1,234", " 12 " or "1 234" into a number
pub(crate) fn parse_count(text: &str) -> Option<i64> {
    let cleaned: String = text
        .chars()
        .filter(|c| !c.is_whitespace() && *c != ',')
        .collect();
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse().ok()
}
