use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use get_papers_list::config::{find_config_file, load_config, Config};
use get_papers_list::models::{SearchQuery, SortBy};
use get_papers_list::output::OutputFormat;
use get_papers_list::pipeline::{get_papers_by_query, PaperFetcher};
use get_papers_list::sources::PubMedSource;
use get_papers_list::ui::stderr_is_terminal;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Fetch research papers from PubMed with pharmaceutical/biotech company affiliations
#[derive(Parser, Debug)]
#[command(name = "get-papers-list")]
#[command(version = get_papers_list::VERSION)]
#[command(author = "hongkongkiwi")]
#[command(about = "Fetch PubMed papers with at least one pharmaceutical/biotech-affiliated author", long_about = None)]
struct Cli {
    /// PubMed search query (full PubMed syntax supported)
    query: String,

    /// Write results to this file instead of stdout
    #[arg(long, short)]
    file: Option<PathBuf>,

    /// Print debug information during execution
    #[arg(long, short)]
    debug: bool,

    /// Enable verbose logging (-v debug, -vv trace)
    #[arg(long, short, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(long, short)]
    quiet: bool,

    /// Maximum number of papers to search for
    #[arg(long, short = 'n')]
    max_results: Option<usize>,

    /// Publication year filter (e.g. 2020, 2018-2022, 2010-, -2015)
    #[arg(long)]
    year: Option<String>,

    /// Result ordering
    #[arg(long, value_enum, default_value_t = SortField::Relevance)]
    sort: SortField,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Csv)]
    format: OutputFormat,

    /// Number of concurrent detail fetches
    #[arg(long)]
    concurrency: Option<usize>,

    /// Configuration file path
    #[arg(long)]
    config: Option<PathBuf>,
}

/// Sort field for results
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum SortField {
    /// Best match first
    Relevance,
    /// Most recent first
    Date,
}

impl From<SortField> for SortBy {
    fn from(field: SortField) -> Self {
        match field {
            SortField::Relevance => SortBy::Relevance,
            SortField::Date => SortBy::PublicationDate,
        }
    }
}

impl Cli {
    /// Log level from flags, falling back to the configured default
    fn log_level<'a>(&self, configured: &'a str) -> &'a str {
        if self.quiet {
            "error"
        } else if self.verbose >= 2 {
            "trace"
        } else if self.debug || self.verbose == 1 {
            "debug"
        } else {
            configured
        }
    }
}

fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("get_papers_list={}", level)));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn resolve_config(cli: &Cli) -> Result<(Config, Option<PathBuf>)> {
    let path = cli.config.clone().or_else(find_config_file);
    let config = load_config(path.as_deref()).context("Failed to load configuration")?;
    Ok((config, path))
}

async fn run(cli: Cli, config: Config) -> Result<()> {
    let source = PubMedSource::from_config(&config).context("Failed to create PubMed client")?;

    let mut query = SearchQuery::new(&cli.query)
        .max_results(cli.max_results.unwrap_or(config.fetch.max_results))
        .sort_by(cli.sort.into());
    if let Some(year) = &cli.year {
        query = query.year(year);
    }

    let show_progress = !cli.quiet && !cli.debug && cli.verbose == 0 && stderr_is_terminal();
    let fetcher = PaperFetcher::new(Arc::new(source))
        .max_concurrent(
            cli.concurrency
                .unwrap_or(config.fetch.max_concurrent_requests),
        )
        .show_progress(show_progress);

    tracing::debug!(query = %query.query, max_results = query.max_results, "Starting search");

    let rendered = get_papers_by_query(&fetcher, &query, cli.format, cli.file.as_deref()).await?;

    if cli.file.is_none() {
        print!("{}", rendered);
    }

    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let resolved = resolve_config(&cli);
    let default_level = resolved
        .as_ref()
        .map(|(config, _)| config.logging.level.clone())
        .unwrap_or_else(|_| "info".to_string());
    init_logging(cli.log_level(&default_level));

    let result = match resolved {
        Ok((config, path)) => {
            if let Some(path) = path {
                tracing::debug!("Using config file: {}", path.display());
            }
            run(cli, config).await
        }
        Err(e) => Err(e),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
