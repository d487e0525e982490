mod catalog;
mod report;
mod status;

pub use catalog::{list_languages, list_releases};
pub use report::show_report;
pub use status::{show_status, StatusArgs};

use ubuntu_l10n::{catalog as releases, util::format_age, Freshness};

/// Output format for query commands
#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
    /// One line per package, status command only
    Csv,
}

/// "Noble (24.04 LTS) - Swedish (sv)"
fn heading(release: &str, language: &str) -> String {
    let release = releases::find_release(release)
        .map(|r| r.label())
        .unwrap_or_else(|| release.to_string());
    match releases::language_name(language) {
        Some(name) => format!("{} - {} ({})", release, name, language),
        None => format!("{} - {}", release, language),
    }
}

fn describe_freshness(freshness: &Freshness) -> String {
    match freshness {
        Freshness::Fetched => "fetched just now".to_string(),
        Freshness::Cached { age } => format!("cached {} ago", format_age(*age)),
        Freshness::Stale { age, error } => format!(
            "STALE: refresh failed ({}); showing data from {} ago",
            error,
            format_age(*age)
        ),
    }
}
