//! Filtering and sorting over an already built result set
//!
//! Both operations are pure: they return a new result set and never touch the
//! network or the cache.

use std::cmp::Ordering;

use super::types::{PackageStatus, ResultSet, SortOrder, Summary};

/// Keep packages whose name contains `text`, ignoring case.
///
/// An empty or whitespace-only `text` keeps everything. The summary is
/// recomputed over the remaining packages.
pub fn filter(result: &ResultSet, text: &str) -> ResultSet {
    let needle = text.trim().to_lowercase();
    if needle.is_empty() {
        return result.clone();
    }

    let packages: Vec<PackageStatus> = result
        .packages
        .iter()
        .filter(|p| p.name.to_lowercase().contains(&needle))
        .cloned()
        .collect();

    ResultSet {
        summary: Summary::from_packages(&packages),
        packages,
        distribution: result.distribution.clone(),
        language: result.language.clone(),
        fetched_at: result.fetched_at,
        dropped: result.dropped,
        empty: result.empty,
        warnings: result.warnings,
    }
}

/// Reorder packages; the summary is unaffected.
pub fn sort(result: &ResultSet, order: SortOrder) -> ResultSet {
    let mut sorted = result.clone();
    sort_packages(&mut sorted.packages, order);
    sorted
}

pub(crate) fn sort_packages(packages: &mut [PackageStatus], order: SortOrder) {
    match order {
        SortOrder::None => {}
        SortOrder::Ascending => packages.sort_by(|a, b| {
            compare_percent(a, b).then_with(|| a.name.cmp(&b.name))
        }),
        SortOrder::Descending => packages.sort_by(|a, b| {
            compare_percent(b, a).then_with(|| a.name.cmp(&b.name))
        }),
        SortOrder::Name => packages.sort_by(|a, b| {
            a.name
                .to_lowercase()
                .cmp(&b.name.to_lowercase())
                .then_with(|| a.name.cmp(&b.name))
        }),
        SortOrder::MostStrings => {
            packages.sort_by(|a, b| b.total().cmp(&a.total()).then_with(|| a.name.cmp(&b.name)))
        }
        // ISO timestamps compare lexically; packages never edited go last
        SortOrder::RecentlyEdited => packages.sort_by(|a, b| {
            let a_edit = a.last_edited.as_deref().unwrap_or("");
            let b_edit = b.last_edited.as_deref().unwrap_or("");
            b_edit.cmp(a_edit).then_with(|| a.name.cmp(&b.name))
        }),
    }
}

fn compare_percent(a: &PackageStatus, b: &PackageStatus) -> Ordering {
    a.percent_translated.total_cmp(&b.percent_translated)
}

/// Filter then sort, the order the query façade applies them in
pub fn apply(result: &ResultSet, filter_text: &str, order: SortOrder) -> ResultSet {
    let mut view = filter(result, filter_text);
    sort_packages(&mut view.packages, order);
    view
}
