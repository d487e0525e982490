use anyhow::{Context, Result};
use serde::Serialize;
use std::fmt::Write as _;
use std::path::PathBuf;
use tracing::info;
use ubuntu_l10n::{
    config::Config,
    stats::write_csv,
    util::truncate_str,
    Freshness, QueryOptions, ResultSet, SortOrder, StatusEngine, StatusView,
};

use super::{describe_freshness, heading, OutputFormat};

const NAME_WIDTH: usize = 32;

pub struct StatusArgs {
    pub release: String,
    pub language: String,
    pub filter: String,
    pub sort: SortOrder,
    pub refresh: bool,
    pub format: OutputFormat,
    pub output: Option<PathBuf>,
}

/// JSON export of a status view
#[derive(Serialize)]
struct StatusExport<'a> {
    #[serde(flatten)]
    result: &'a ResultSet,
    stale: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    age_secs: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    refresh_error: Option<String>,
}

impl<'a> StatusExport<'a> {
    fn new(view: &'a StatusView) -> Self {
        let (age_secs, refresh_error) = match &view.freshness {
            Freshness::Fetched => (None, None),
            Freshness::Cached { age } => (Some(age.as_secs()), None),
            Freshness::Stale { age, error } => (Some(age.as_secs()), Some(error.to_string())),
        };
        Self {
            result: &view.result,
            stale: view.freshness.is_stale(),
            age_secs,
            refresh_error,
        }
    }
}

pub async fn show_status(config: Config, args: StatusArgs) -> Result<()> {
    let engine = StatusEngine::launchpad(&config).context("Failed to create HTTP client")?;

    info!("Loading {} / {}", args.release, args.language);
    let options = QueryOptions {
        force_refresh: args.refresh,
        filter_text: args.filter,
        sort_order: args.sort,
    };
    let view = engine
        .get_status(&args.release, &args.language, &options)
        .await?;

    let rendered = match args.format {
        OutputFormat::Json => serde_json::to_string_pretty(&StatusExport::new(&view))?,
        OutputFormat::Text => render_text(&view),
        OutputFormat::Csv => {
            let mut buffer = Vec::new();
            write_csv(&view.result, &mut buffer)?;
            String::from_utf8(buffer)?
        }
    };

    match args.output {
        Some(path) => {
            std::fs::write(&path, rendered)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            println!(
                "Wrote {} packages to {}",
                view.result.len(),
                path.display()
            );
        }
        None => println!("{}", rendered.trim_end()),
    }

    Ok(())
}

fn render_text(view: &StatusView) -> String {
    let result = &view.result;
    let mut out = String::new();

    let _ = writeln!(out, "{}", heading(&result.distribution, &result.language));
    let _ = writeln!(out, "{}", describe_freshness(&view.freshness));
    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "{:<width$} {:>10} {:>12} {:>8} {:>8} {:>7}  {}",
        "Package",
        "Translated",
        "Untranslated",
        "Review",
        "Total",
        "%",
        "Status",
        width = NAME_WIDTH
    );
    for package in &result.packages {
        let _ = writeln!(
            out,
            "{:<width$} {:>10} {:>12} {:>8} {:>8} {:>6.1}%  {}",
            truncate_str(&package.name, NAME_WIDTH),
            package.translated_count,
            package.untranslated_count,
            package.fuzzy_count,
            package.total(),
            package.percent_translated,
            package.color_bucket,
            width = NAME_WIDTH
        );
    }

    let summary = &result.summary;
    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "{} packages, {} of {} strings translated ({:.1}%), {} need review",
        summary.package_count, summary.translated, summary.total, summary.percent, summary.fuzzy
    );
    let _ = write!(
        out,
        "{} fully translated, {} untranslated",
        summary.fully_translated, summary.untouched
    );
    if result.dropped + result.warnings > 0 {
        let _ = write!(
            out,
            "\n{} rows skipped as malformed, {} records dropped",
            result.warnings, result.dropped
        );
    }
    out
}
