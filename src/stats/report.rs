//! Language-level overview: totals plus best and worst packages

use serde::Serialize;

use crate::catalog;

use super::types::{PackageStatus, ResultSet, SortOrder, Summary};
use super::view::sort_packages;

/// Default length of the top and bottom lists
pub const DEFAULT_REPORT_LEN: usize = 10;

#[derive(Debug, Clone, Serialize)]
pub struct LanguageReport {
    pub distribution: String,
    pub language: String,
    pub summary: Summary,
    pub most_translated: Vec<PackageStatus>,
    /// Least translated packages that have at least one translated string
    pub least_translated: Vec<PackageStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weblate_url: Option<String>,
}

impl LanguageReport {
    /// Attach the Weblate page of `project` for this language
    pub fn with_weblate(mut self, project: &str) -> Self {
        self.weblate_url = Some(catalog::weblate_project_url(project, &self.language));
        self
    }
}

pub fn language_report(result: &ResultSet, len: usize) -> LanguageReport {
    let mut most = result.packages.clone();
    sort_packages(&mut most, SortOrder::Descending);
    most.truncate(len);

    let mut least: Vec<PackageStatus> = result
        .packages
        .iter()
        .filter(|p| p.translated_count > 0)
        .cloned()
        .collect();
    sort_packages(&mut least, SortOrder::Ascending);
    least.truncate(len);

    LanguageReport {
        distribution: result.distribution.clone(),
        language: result.language.clone(),
        summary: result.summary.clone(),
        most_translated: most,
        least_translated: least,
        weblate_url: None,
    }
}
