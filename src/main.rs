//! ubuntu-l10n: translation status of Ubuntu releases on Launchpad

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{OutputFormat, StatusArgs};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use ubuntu_l10n::{
    catalog,
    config::{Config, LogFormat, LoggingConfig},
    stats::DEFAULT_REPORT_LEN,
    SortOrder,
};

#[derive(Parser)]
#[command(name = "ubuntu-l10n")]
#[command(about = "Translation status of Ubuntu releases on Launchpad")]
#[command(version)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "ubuntu-l10n.toml")]
    config: PathBuf,

    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show per-package translation status
    Status {
        /// Release codename, e.g. noble
        release: String,

        /// Language code, e.g. sv or pt_BR [default: from the locale]
        language: Option<String>,

        /// Only packages whose name contains this text
        #[arg(short, long, default_value = "")]
        filter: String,

        /// Sort order
        #[arg(short, long, value_enum, default_value_t = CliSortOrder::Page)]
        sort: CliSortOrder,

        /// Ignore cached data
        #[arg(long)]
        refresh: bool,

        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,

        /// Write to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show language totals with the most and least translated packages
    Report {
        /// Release codename
        release: String,

        /// Language code [default: from the locale]
        language: Option<String>,

        /// Length of the top and bottom lists
        #[arg(long, default_value_t = DEFAULT_REPORT_LEN)]
        top: usize,

        /// Weblate project to link for this language
        #[arg(long)]
        weblate: Option<String>,

        /// Output format (text or json)
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// List known releases
    Releases,

    /// List known languages
    Languages,
}

/// CLI sort order (mirrors SortOrder but with clap support)
#[derive(Clone, Copy, Debug, clap::ValueEnum)]
enum CliSortOrder {
    /// Order of the Launchpad page
    Page,
    /// Most translated first
    MostTranslated,
    /// Least translated first
    LeastTranslated,
    /// Package name
    Name,
    /// Most strings first
    MostStrings,
    /// Most recently edited first
    LastUpdated,
}

impl From<CliSortOrder> for SortOrder {
    fn from(order: CliSortOrder) -> Self {
        match order {
            CliSortOrder::Page => SortOrder::None,
            CliSortOrder::MostTranslated => SortOrder::Descending,
            CliSortOrder::LeastTranslated => SortOrder::Ascending,
            CliSortOrder::Name => SortOrder::Name,
            CliSortOrder::MostStrings => SortOrder::MostStrings,
            CliSortOrder::LastUpdated => SortOrder::RecentlyEdited,
        }
    }
}

fn init_logging(config: &LoggingConfig, verbosity: u8) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.filter_directive(verbosity)));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);

    let installed = match config.format {
        LogFormat::Text => builder.try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
    installed.map_err(|e| anyhow::anyhow!("Failed to install logger: {}", e))
}

fn resolve_language(language: Option<String>) -> Result<String> {
    match language {
        Some(language) => Ok(language),
        None => match catalog::system_language() {
            Some(code) => Ok(code.to_string()),
            None => anyhow::bail!("No language given and none found in LC_ALL, LC_MESSAGES or LANG"),
        },
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = Config::load_or_default(&cli.config)?;
    init_logging(&config.logging, cli.verbose)?;

    match cli.command {
        Commands::Status {
            release,
            language,
            filter,
            sort,
            refresh,
            format,
            output,
        } => {
            let args = StatusArgs {
                release,
                language: resolve_language(language)?,
                filter,
                sort: sort.into(),
                refresh,
                format,
                output,
            };
            commands::show_status(config, args).await
        }
        Commands::Report {
            release,
            language,
            top,
            weblate,
            format,
        } => {
            let language = resolve_language(language)?;
            commands::show_report(config, release, language, top, weblate, format).await
        }
        Commands::Releases => {
            commands::list_releases();
            Ok(())
        }
        Commands::Languages => {
            commands::list_languages();
            Ok(())
        }
    }
}
