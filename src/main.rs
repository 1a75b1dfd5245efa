use anyhow::{bail, Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use std::collections::BTreeMap;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use franchise_feeds::config::Config;
use franchise_feeds::http::build_client;
use franchise_feeds::market::{run_history, HistoryOutcome};
use franchise_feeds::news::pipeline;
use franchise_feeds::sink::{write_csv_atomic, write_json_atomic};

#[derive(Parser, Debug)]
#[command(
    name = "franchise-feeds",
    about = "Franchise news and stock data snapshots for the website widgets"
)]
struct Args {
    /// Configuration file (TOML); defaults apply when it does not exist
    #[arg(long, value_name = "FILE", default_value = "franchise-feeds.toml")]
    config: PathBuf,

    #[command(subcommand)]
    job: Job,
}

#[derive(Subcommand, Debug)]
enum Job {
    /// Fetch news feeds and write the article snapshot
    News {
        #[arg(long, value_name = "FILE")]
        output: Option<PathBuf>,
    },
    /// Fetch live quotes and write the ticker snapshot
    Quotes {
        #[arg(long, value_name = "FILE")]
        output: Option<PathBuf>,
    },
    /// Bring the daily price history CSV up to date
    History {
        #[arg(long, value_name = "FILE")]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let config = Config::load(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;
    tracing::debug!(?config, "Effective configuration");

    match args.job {
        Job::News { output } => {
            run_news(&config, output.unwrap_or_else(|| config.news_output.clone())).await
        }
        Job::Quotes { output } => {
            run_quotes(&config, output.unwrap_or_else(|| config.quotes_output.clone())).await
        }
        Job::History { output } => {
            run_prices(&config, output.unwrap_or_else(|| config.history_output.clone())).await
        }
    }
}

async fn run_news(config: &Config, output: PathBuf) -> Result<()> {
    let client = build_client(config.request_timeout()).context("Failed to build HTTP client")?;
    let run = pipeline::run(config, &client).await;

    write_json_atomic(&output, &run.articles)
        .with_context(|| format!("Failed to write news snapshot to {}", output.display()))?;

    if run.placeholder {
        tracing::warn!(path = %output.display(), "Wrote placeholder news snapshot");
        return Ok(());
    }

    let mut by_category: BTreeMap<&str, usize> = BTreeMap::new();
    for article in &run.articles {
        *by_category.entry(article.category.as_str()).or_default() += 1;
    }
    for (category, count) in &by_category {
        tracing::info!(category = %category, articles = count, "Category summary");
    }
    tracing::info!(
        path = %output.display(),
        articles = run.articles.len(),
        feeds_ok = run.stats.feeds_ok,
        feeds_failed = run.stats.feeds_failed,
        skipped = run.stats.entries_skipped,
        "Wrote news snapshot"
    );
    Ok(())
}

async fn run_quotes(config: &Config, output: PathBuf) -> Result<()> {
    let api_key = config.require_api_key()?;
    let client = build_client(config.request_timeout()).context("Failed to build HTTP client")?;

    let snapshot = config
        .quote_client(&client, api_key)
        .fetch_all(&config.symbols)
        .await;
    if snapshot.quotes.is_empty() {
        bail!(
            "No quotes fetched for {} symbols; leaving {} untouched",
            config.symbols.len(),
            output.display()
        );
    }

    write_json_atomic(&output, &snapshot)
        .with_context(|| format!("Failed to write quote snapshot to {}", output.display()))?;
    tracing::info!(
        path = %output.display(),
        quotes = snapshot.count,
        symbols = config.symbols.len(),
        "Wrote quote snapshot"
    );
    Ok(())
}

async fn run_prices(config: &Config, output: PathBuf) -> Result<()> {
    let client = build_client(config.request_timeout()).context("Failed to build HTTP client")?;
    let today = Utc::now().date_naive();

    let outcome = run_history(
        &config.chart_client(&client),
        &config.symbols,
        &output,
        today,
        config.history_backfill_days,
    )
    .await
    .with_context(|| format!("Failed to update price history at {}", output.display()))?;

    match outcome {
        HistoryOutcome::UpToDate { latest } => {
            tracing::info!(path = %output.display(), latest = %latest, "Nothing to fetch");
            Ok(())
        }
        HistoryOutcome::NoData { window } => {
            bail!(
                "No daily bars fetched for {}..={}; leaving {} untouched",
                window.start,
                window.end,
                output.display()
            )
        }
        HistoryOutcome::Updated {
            window,
            fetched,
            rows,
        } => {
            write_csv_atomic(&output, &rows)
                .with_context(|| format!("Failed to write price history to {}", output.display()))?;
            tracing::info!(
                path = %output.display(),
                start = %window.start,
                end = %window.end,
                fetched = fetched,
                total_rows = rows.len(),
                "Wrote price history"
            );
            Ok(())
        }
    }
}
