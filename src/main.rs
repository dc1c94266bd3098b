use anyhow::{Context, Result};
use clap::Parser;
use pubmed_industry::config::{find_config_file, get_config, load_config, Config};
use pubmed_industry::models::SearchQuery;
use pubmed_industry::pipeline::Pipeline;
use pubmed_industry::report::{render, write_csv, OutputFormat, ReportLayout};
use pubmed_industry::sources::PubMedSource;
use pubmed_industry::utils::HttpClient;
use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// PubMed Industry - Find PubMed papers with authors from pharmaceutical or biotech companies
#[derive(Parser, Debug)]
#[command(name = "pubmed-industry")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Find PubMed papers with at least one pharmaceutical or biotech author", long_about = None)]
struct Cli {
    /// PubMed search query (full PubMed query syntax is supported)
    query: String,

    /// Write results to this CSV file instead of printing them
    #[arg(long, short)]
    file: Option<PathBuf>,

    /// Print debug information during execution
    #[arg(long, short)]
    debug: bool,

    /// Suppress non-error logging
    #[arg(long, short, conflicts_with = "debug")]
    quiet: bool,

    /// Console output format
    #[arg(long, short, value_enum, default_value_t = OutputFormat::Auto)]
    output: OutputFormat,

    /// Include journal, DOI and industry author emails
    #[arg(long)]
    detailed: bool,

    /// Maximum number of search results
    #[arg(long)]
    max_results: Option<usize>,

    /// Maximum concurrent detail fetches
    #[arg(long)]
    concurrency: Option<usize>,

    /// Attempts per paper, including the first
    #[arg(long)]
    retries: Option<u32>,

    /// Configuration file path
    #[arg(long)]
    config: Option<PathBuf>,
}

impl Cli {
    fn log_level(&self) -> &'static str {
        if self.debug {
            "debug"
        } else if self.quiet {
            "error"
        } else {
            "warn"
        }
    }

    fn layout(&self) -> ReportLayout {
        if self.detailed {
            ReportLayout::Detailed
        } else {
            ReportLayout::Standard
        }
    }

    /// Command-line values take precedence over file and environment settings
    fn apply_overrides(&self, config: &mut Config) {
        if let Some(max_results) = self.max_results {
            config.search.max_results = max_results;
        }
        if let Some(concurrency) = self.concurrency {
            config.fetch.max_concurrent_requests = concurrency;
        }
        if let Some(retries) = self.retries {
            config.fetch.max_attempts = retries;
        }
    }
}

/// Load configuration from file if specified or found in default locations
fn load_settings(path: Option<&Path>) -> Result<Config> {
    if let Some(config_path) = path {
        return load_config(config_path)
            .with_context(|| format!("Failed to load config from {}", config_path.display()));
    }

    if let Some(config_path) = find_config_file() {
        tracing::info!("Using config file: {}", config_path.display());
        return load_config(&config_path)
            .with_context(|| format!("Failed to load config from {}", config_path.display()));
    }

    Ok(get_config()?)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| format!("pubmed_industry={}", cli.log_level())),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let mut config = load_settings(cli.config.as_deref())?;
    cli.apply_overrides(&mut config);
    tracing::debug!("Effective configuration: {:?}", config);

    let client = Arc::new(HttpClient::with_timeout(config.fetch.request_timeout())?);
    let source = PubMedSource::with_client(client).with_search_retry(config.fetch.retry_config());
    let pipeline = Pipeline::from_config(Arc::new(source), &config);

    let query = SearchQuery::new(&cli.query).max_results(config.search.max_results);
    let outcome = pipeline.run(&query).await;

    if let Some(message) = outcome.message() {
        println!("{}", message);
        return Ok(());
    }

    let papers = outcome.papers();
    match &cli.file {
        Some(path) => {
            write_csv(path, papers, cli.layout())?;
            println!("Saved {} papers to {}", papers.len(), path.display());
        }
        None => {
            let format = cli.output.resolve(std::io::stdout().is_terminal());
            println!("{}", render(papers, format, cli.layout())?);
        }
    }

    Ok(())
}
