use anyhow::{Context, Result};
use ubuntu_l10n::{config::Config, stats::PackageStatus, StatusEngine};

use super::{describe_freshness, heading, OutputFormat};

pub async fn show_report(
    config: Config,
    release: String,
    language: String,
    top: usize,
    weblate: Option<String>,
    format: OutputFormat,
) -> Result<()> {
    if format == OutputFormat::Csv {
        anyhow::bail!("CSV output is only available for the status command");
    }

    let engine = StatusEngine::launchpad(&config).context("Failed to create HTTP client")?;
    let (mut report, freshness) = engine.language_report(&release, &language, top).await?;
    if let Some(project) = &weblate {
        report = report.with_weblate(project);
    }

    if format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    let summary = &report.summary;
    println!("{}", heading(&report.distribution, &report.language));
    println!("{}", describe_freshness(&freshness));
    println!();
    println!("Packages:          {}", summary.package_count);
    println!("Strings:           {}", summary.total);
    println!("Translated:        {} ({:.1}%)", summary.translated, summary.percent);
    println!("Need review:       {}", summary.fuzzy);
    println!("Untranslated:      {}", summary.untranslated);
    println!("Fully translated:  {}", summary.fully_translated);
    println!("Not started:       {}", summary.untouched);
    if let Some(url) = &report.weblate_url {
        println!("Weblate:           {}", url);
    }

    print_list(&format!("Top {} most translated", top), &report.most_translated);
    print_list(
        &format!("Top {} least translated (started)", top),
        &report.least_translated,
    );

    Ok(())
}

fn print_list(title: &str, packages: &[PackageStatus]) {
    println!();
    println!("{}:", title);
    if packages.is_empty() {
        println!("  (none)");
    }
    for (rank, package) in packages.iter().enumerate() {
        println!(
            "  {:>2}. {:<32} {:>6.1}%  ({}/{})",
            rank + 1,
            package.name,
            package.percent_translated,
            package.translated_count,
            package.total()
        );
    }
}
