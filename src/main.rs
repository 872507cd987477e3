mod analysis;
mod config;
mod download;
mod error_handling;
mod fetcher;
mod github;
mod persistence;
mod report;
mod repository;
mod rules;

use clap::{Args as ClapArgs, Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use analysis::Analyzer;
use config::{DownloadConfig, OutputLayout, PAGE_COUNT};
use download::Downloader;
use error_handling::{ErrorReporter, Result};
use fetcher::GitCliFetcher;
use github::GitHubClient;
use persistence::ResultsPersistence;
use rules::RuleClassifier;

#[derive(Parser, Debug)]
#[command(author, version, about = "ESLint Plugin Survey - Classifies rule authoring styles across eslint-plugin repositories on GitHub", long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Search GitHub and clone every "eslint-plugin" repository found
    Download(DownloadArgs),
    /// Classify the rules of cloned repositories and print the report
    Analyze(AnalyzeArgs),
    /// Download, then analyze
    Run {
        #[command(flatten)]
        download: DownloadArgs,
        #[command(flatten)]
        report: ReportArgs,
    },
}

#[derive(ClapArgs, Debug)]
struct DownloadArgs {
    /// Output directory for search results and clones
    #[arg(short, long, default_value = "output")]
    output: PathBuf,

    /// Number of search result pages to retrieve (100 repositories each)
    #[arg(
        short,
        long,
        default_value_t = PAGE_COUNT as u16,
        value_parser = clap::value_parser!(u16).range(1..=PAGE_COUNT as i64)
    )]
    pages: u16,

    /// Pause after each clone, in milliseconds
    #[arg(long, default_value_t = 1000)]
    clone_delay_ms: u64,
}

#[derive(ClapArgs, Debug)]
struct AnalyzeArgs {
    /// Output directory holding search results and clones
    #[arg(short, long, default_value = "output")]
    output: PathBuf,

    #[command(flatten)]
    report: ReportArgs,
}

#[derive(ClapArgs, Debug)]
struct ReportArgs {
    /// Extra literal marker identifying a function-style rule (repeatable)
    #[arg(long = "function-marker", value_name = "TEXT")]
    function_markers: Vec<String>,

    /// Extra literal marker identifying an object-style rule (repeatable)
    #[arg(long = "object-marker", value_name = "TEXT")]
    object_markers: Vec<String>,

    /// Also write the dataset counters as JSON
    #[arg(long)]
    summary_json: Option<PathBuf>,

    /// Also write the dataset counters as CSV
    #[arg(long)]
    csv: Option<PathBuf>,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();
    setup_logging(args.verbose);

    if let Err(e) = execute(args.command).await {
        ErrorReporter::report_error(&e);
        std::process::exit(1);
    }
}

fn setup_logging(verbose: bool) {
    let filter = if verbose { "debug" } else { "info" };

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .init();
}

async fn execute(command: Command) -> Result<()> {
    match command {
        Command::Download(args) => download(&args).await,
        Command::Analyze(args) => analyze(&OutputLayout::new(&args.output), &args.report).await,
        Command::Run { download: args, report } => {
            download(&args).await?;
            analyze(&OutputLayout::new(&args.output), &report).await
        }
    }
}

async fn download(args: &DownloadArgs) -> Result<()> {
    let token = config::access_token()?;

    info!("Starting ESLint plugin survey - download");
    info!(
        "Configuration: pages={}, clone_delay={}ms, output_dir={:?}",
        args.pages, args.clone_delay_ms, args.output
    );

    let layout = OutputLayout::new(&args.output);
    let download_config = DownloadConfig {
        page_count: usize::from(args.pages),
        clone_delay: Duration::from_millis(args.clone_delay_ms),
        ..Default::default()
    };

    let downloader = Downloader::new(
        GitHubClient::new(token)?,
        GitCliFetcher::new(),
        layout,
        download_config,
    );
    let stats = downloader.run().await?;

    ErrorReporter::report_success(&format!(
        "Download complete: {} pages searched ({} cached), {} repositories cloned ({} already present)",
        stats.pages_searched,
        stats.pages_skipped,
        stats.repositories_cloned,
        stats.repositories_skipped
    ));
    Ok(())
}

async fn analyze(layout: &OutputLayout, args: &ReportArgs) -> Result<()> {
    info!("Starting ESLint plugin survey - analysis of {}", layout.root().display());

    let classifier = RuleClassifier::extended(&args.function_markers, &args.object_markers);
    let analyzer = Analyzer::new(layout.clone(), classifier);
    let datasets = analyzer.standard_datasets(chrono::Utc::now())?;

    if datasets.iter().all(|d| d.total_plugins == 0) {
        ErrorReporter::report_warning("No cloned repositories found - run the download step first");
    }

    report::print_report(&datasets);

    if let Some(path) = &args.summary_json {
        ResultsPersistence::save_summary(&datasets, path).await?;
        ErrorReporter::report_info(&format!("Summary saved to {}", path.display()));
    }
    if let Some(path) = &args.csv {
        ResultsPersistence::save_to_csv(&datasets, path).await?;
        ErrorReporter::report_info(&format!("CSV saved to {}", path.display()));
    }

    Ok(())
}
