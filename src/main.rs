//! Medref-Scraper main entry point
//!
//! This is the command-line interface for the Medref-Scraper article harvester.

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use medref_scraper::article::{select_articles, ArticleAssembler};
use medref_scraper::config::{compute_config_hash, load_config, validate, Config};
use medref_scraper::output::{
    print_article_summary, print_batch_report, print_statistics, write_article_json,
    FetchStatistics,
};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Medref-Scraper: a resilient medical-reference article harvester
///
/// Medref-Scraper fetches multi-section reference articles with rotating
/// identities and adaptive pacing, extracts their structured content and
/// writes one JSON record per article.
#[derive(Parser, Debug)]
#[command(name = "medref-scraper")]
#[command(version = "1.0.0")]
#[command(about = "A resilient medical-reference article harvester", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Path to TOML configuration file
    #[arg(short, long, global = true, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Base delay between requests in seconds (1-10)
    #[arg(long, global = true, value_name = "SECONDS")]
    delay: Option<f64>,

    /// Attempts per URL (1-10)
    #[arg(long, global = true, value_name = "N")]
    retries: Option<u32>,

    /// Apply a new identity every N requests (1-10)
    #[arg(long, global = true, value_name = "N")]
    rotation: Option<u32>,

    /// Directory receiving the JSON records
    #[arg(short, long, global = true, value_name = "DIR")]
    output: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show what would be scraped without scraping
    #[arg(long, global = true)]
    dry_run: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Scrape a single article from its overview URL
    Article {
        #[arg(value_name = "URL")]
        url: String,
    },

    /// List the articles linked from a listing page
    Discover {
        #[arg(value_name = "LISTING_URL")]
        listing_url: String,
    },

    /// Discover articles on a listing page and scrape them one by one
    Batch {
        #[arg(value_name = "LISTING_URL")]
        listing_url: String,

        /// Scrape at most this many articles
        #[arg(long, value_name = "N")]
        limit: Option<usize>,

        /// Only scrape articles whose category contains this text
        #[arg(long, value_name = "CATEGORY")]
        category: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let config = build_config(&cli)?;

    if cli.dry_run {
        return handle_dry_run(&config, &cli.command);
    }

    let output_dir = PathBuf::from(&config.output.directory);
    let verbose = cli.verbose > 0;
    let mut assembler = ArticleAssembler::new(config)?;

    match cli.command {
        Command::Article { url } => {
            handle_article(&mut assembler, &url, &output_dir).await?;
        }
        Command::Discover { listing_url } => {
            handle_discover(&mut assembler, &listing_url).await?;
        }
        Command::Batch {
            listing_url,
            limit,
            category,
        } => {
            handle_batch(
                &mut assembler,
                &listing_url,
                limit,
                category.as_deref(),
                &output_dir,
            )
            .await?;
        }
    }

    if verbose {
        print_statistics(&FetchStatistics::from_fetcher(assembler.fetcher()));
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("medref_scraper=info,warn"),
            1 => EnvFilter::new("medref_scraper=debug,info"),
            2 => EnvFilter::new("medref_scraper=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Loads the optional config file and applies command-line overrides
fn build_config(cli: &Cli) -> anyhow::Result<Config> {
    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let config = load_config(path)
                .with_context(|| format!("failed to load {}", path.display()))?;
            let hash = compute_config_hash(path)
                .with_context(|| format!("failed to hash {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            config
        }
        None => Config::default(),
    };

    if let Some(delay) = cli.delay {
        config.fetch.base_delay = delay;
    }
    if let Some(retries) = cli.retries {
        config.fetch.max_retries = retries;
    }
    if let Some(rotation) = cli.rotation {
        config.fetch.rotation_frequency = rotation;
    }
    if let Some(output) = &cli.output {
        config.output.directory = output.display().to_string();
    }

    validate(&config).context("invalid settings")?;
    Ok(config)
}

/// Handles --dry-run: shows the effective settings and the planned run
fn handle_dry_run(config: &Config, command: &Command) -> anyhow::Result<()> {
    println!("=== Medref-Scraper Dry Run ===\n");

    println!("Fetch Configuration:");
    println!("  Base delay: {}s", config.fetch.base_delay);
    println!("  Max retries: {}", config.fetch.max_retries);
    println!(
        "  Rotation frequency: every {} requests",
        config.fetch.rotation_frequency
    );
    println!("  Timeout: {}s", config.fetch.timeout);
    println!(
        "  Jitter: {}s - {}s",
        config.fetch.jitter_min, config.fetch.jitter_max
    );
    println!(
        "  Section / article delay: {}s / {}s",
        config.fetch.section_delay, config.fetch.article_delay
    );

    println!("\nContent Checks:");
    println!(
        "  Blocking patterns: {}",
        config.content.blocking_patterns.len()
    );
    println!(
        "  Validity keywords: {} (min {} occurrences)",
        config.content.validity_keywords.len(),
        config.content.min_validity_keywords
    );

    println!("\nIdentities: {}", config.identity.user_agents.len());
    println!("Output directory: {}", config.output.directory);

    println!("\n✓ Configuration is valid");
    match command {
        Command::Article { url } => println!("✓ Would scrape article {}", url),
        Command::Discover { listing_url } => {
            println!("✓ Would discover articles on {}", listing_url)
        }
        Command::Batch {
            listing_url,
            limit,
            category,
        } => println!(
            "✓ Would scrape {} articles{} from {}",
            limit.map_or_else(|| "all".to_string(), |n| format!("up to {}", n)),
            category
                .as_deref()
                .map_or_else(String::new, |c| format!(" in category '{}'", c)),
            listing_url
        ),
    }

    Ok(())
}

/// Handles `article`: scrape, write and summarize one article
async fn handle_article(
    assembler: &mut ArticleAssembler,
    url: &str,
    output_dir: &Path,
) -> anyhow::Result<()> {
    if !assembler.is_article_url(url) {
        bail!(medref_scraper::ScrapeError::NotAnArticle(url.to_string()));
    }

    let record = assembler.assemble(url).await?;
    if record.sections.is_empty() {
        bail!("no content could be extracted from {}", url);
    }

    let path = write_article_json(&record, output_dir)?;
    print_article_summary(&record);
    println!(
        "✓ Saved to {} ({} requests made)",
        path.display(),
        assembler.fetcher().request_count()
    );

    Ok(())
}

/// Handles `discover`: list the articles of a listing page
async fn handle_discover(assembler: &mut ArticleAssembler, listing_url: &str) -> anyhow::Result<()> {
    let articles = assembler.discover(listing_url).await?;

    println!("=== Discovered Articles ({}) ===\n", articles.len());
    for article in &articles {
        println!("  {}", article.title);
        println!("    Category: {}", article.category);
        println!("    URL: {}", article.url);
    }

    Ok(())
}

/// Handles `batch`: discover, select and scrape articles until done or interrupted
async fn handle_batch(
    assembler: &mut ArticleAssembler,
    listing_url: &str,
    limit: Option<usize>,
    category: Option<&str>,
    output_dir: &Path,
) -> anyhow::Result<()> {
    let discovered = assembler.discover(listing_url).await?;
    let found = discovered.len();
    let articles = select_articles(discovered, category, limit);

    if articles.is_empty() {
        bail!("no articles selected out of {} discovered", found);
    }
    tracing::info!("Selected {} of {} discovered articles", articles.len(), found);

    // First Ctrl-C stops the batch before the next article starts, a second
    // one exits at once
    let interrupted = Arc::new(AtomicBool::new(false));
    {
        let interrupted = Arc::clone(&interrupted);
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_err() {
                return;
            }
            tracing::warn!("Interrupt received, finishing current article");
            interrupted.store(true, Ordering::SeqCst);

            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::warn!("Second interrupt received, exiting");
                std::process::exit(130);
            }
        });
    }

    let report = assembler
        .assemble_batch(
            articles,
            |_, _| !interrupted.load(Ordering::SeqCst),
            |record| write_article_json(record, output_dir).map(|_| ()),
        )
        .await;

    print_batch_report(&report);
    Ok(())
}
