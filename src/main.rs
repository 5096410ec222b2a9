use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use std::fs::{self, File};
use polars::prelude::DataFrame;
use std::path::Path;
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use magic_screener::api::QuoteSummaryClient;
use magic_screener::blacklist::BlacklistManager;
use magic_screener::enrichment::{append_metrics, EnrichmentStep, LiveMetricsEnricher};
use magic_screener::models::frame::{self, tickers};
use magic_screener::models::{ScreenerConfig, ScreenerParams};
use magic_screener::statements::JsonStatementStore;
use magic_screener::utils::{score_chart, search_tickers};
use magic_screener::Screener;

#[derive(Parser)]
#[command(author, version, about = "Cash flow trend stock screener", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Score tickers on cash flow trends
    Screen(ScreenArgs),
    /// Manage the blacklist of low-scoring tickers
    Blacklist {
        #[command(subcommand)]
        action: BlacklistAction,
    },
    /// Fuzzy search the ticker universe
    Search {
        query: String,

        #[arg(long, default_value = "10")]
        limit: usize,
    },
    /// Show eligible and blacklisted ticker counts
    Universe,
}

#[derive(Subcommand)]
enum BlacklistAction {
    /// Screen every eligible ticker and blacklist those below the threshold
    Save {
        #[arg(long, default_value = "1")]
        threshold: i64,

        #[command(flatten)]
        windows: WindowArgs,
    },
    /// Print the saved blacklist
    Show,
}

#[derive(Args)]
struct WindowArgs {
    /// Years of free cash flow to check
    #[arg(long, default_value = "3", value_parser = clap::value_parser!(u64).range(1..=4))]
    fcf_years: u64,

    /// Years of operating cash flow to check
    #[arg(long, default_value = "3", value_parser = clap::value_parser!(u64).range(1..=4))]
    ocf_years: u64,
}

impl WindowArgs {
    fn params(&self) -> ScreenerParams {
        ScreenerParams { fcf_years: self.fcf_years as usize, ocf_years: self.ocf_years as usize }
    }
}

#[derive(Args)]
struct ScreenArgs {
    /// Comma-separated ticker symbols
    #[arg(long, value_delimiter = ',')]
    tickers: Vec<String>,

    /// Screen every ticker that is not blacklisted
    #[arg(long, conflicts_with = "tickers")]
    all: bool,

    #[command(flatten)]
    windows: WindowArgs,

    /// Fetch live market metrics for the results
    #[arg(long)]
    live: bool,

    /// Write scores.csv and features.csv here
    #[arg(long)]
    export_dir: Option<std::path::PathBuf>,
}

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("magic_screener=info"));
    let subscriber = FmtSubscriber::builder().with_env_filter(filter).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let cli = Cli::parse();

    let config = match ScreenerConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            eprintln!("❌ Configuration Error: {}", e);
            std::process::exit(1);
        }
    };

    match cli.command {
        Commands::Screen(args) => run_screen(&config, args),
        Commands::Blacklist { action: BlacklistAction::Save { threshold, windows } } => {
            run_blacklist_save(&config, threshold, &windows.params())
        }
        Commands::Blacklist { action: BlacklistAction::Show } => run_blacklist_show(&config),
        Commands::Search { query, limit } => run_search(&config, &query, limit),
        Commands::Universe => run_universe(&config),
    }
}

/// Ticker directories not on the blacklist
fn eligible_tickers(config: &ScreenerConfig) -> Result<(Vec<String>, Vec<String>)> {
    let store = JsonStatementStore::new(config);
    let universe = store
        .available_tickers()
        .with_context(|| format!("Failed to list {}", config.statements_dir.display()))?;
    Ok(BlacklistManager::new(config).partition(&universe))
}

fn run_screen(config: &ScreenerConfig, args: ScreenArgs) -> Result<()> {
    let tickers = if args.all {
        eligible_tickers(config)?.0
    } else if !args.tickers.is_empty() {
        args.tickers.iter().map(|t| t.trim().to_uppercase()).collect()
    } else {
        bail!("Pass --tickers or --all");
    };

    info!("🚀 Screening {} tickers", tickers.len());
    let screener = Screener::new(JsonStatementStore::new(config), config);
    let result = screener.screen(&tickers, &args.windows.params())?;

    for (ticker, reason) in &result.skipped {
        warn!("Skipped {}: {}", ticker, reason);
    }

    let scores = if args.live && result.scores.height() > 0 {
        fetch_live_metrics(config, &result.scores)?
    } else {
        result.scores
    };

    println!("{}", scores);
    println!("{}", result.features);
    print!("{}", score_chart(&scores, 40));

    if let Some(dir) = args.export_dir {
        export(&dir, &scores, &result.features)?;
    }
    Ok(())
}

fn fetch_live_metrics(config: &ScreenerConfig, scores: &DataFrame) -> Result<DataFrame> {
    let enricher = LiveMetricsEnricher::new(QuoteSummaryClient::new(config)?);

    let pb = ProgressBar::new(scores.height() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos:>7}/{len:7} {msg}")?
            .progress_chars("#>-"),
    );

    let mut steps: Vec<EnrichmentStep> = Vec::with_capacity(scores.height());
    for step in enricher.iter(tickers(scores)?) {
        pb.set_message(step.ticker.clone());
        pb.inc(1);
        steps.push(step);
    }
    pb.finish_with_message("Live metrics fetched");

    Ok(append_metrics(scores, &steps)?)
}

fn export(dir: &Path, scores: &DataFrame, features: &DataFrame) -> Result<()> {
    fs::create_dir_all(dir)?;
    frame::write_csv(scores, File::create(dir.join("scores.csv"))?)?;
    frame::write_csv(features, File::create(dir.join("features.csv"))?)?;
    info!("💾 Exported results to {}", dir.display());
    Ok(())
}

fn run_blacklist_save(config: &ScreenerConfig, threshold: i64, params: &ScreenerParams) -> Result<()> {
    let (eligible, _) = eligible_tickers(config)?;
    let screener = Screener::new(JsonStatementStore::new(config), config);
    let (scores, _) = screener.process(&eligible, params)?;

    let entry = BlacklistManager::new(config).save(&scores, threshold)?;
    println!(
        "Blacklisted {} tickers with score below {} ({})",
        entry.tickers.len(),
        entry.threshold_score,
        entry.date
    );
    Ok(())
}

fn run_blacklist_show(config: &ScreenerConfig) -> Result<()> {
    match BlacklistManager::new(config).load() {
        Some(entry) => {
            println!("Saved {} with threshold {}", entry.date, entry.threshold_score);
            println!("{}", entry.tickers.join(", "));
        }
        None => println!("No blacklist saved"),
    }
    Ok(())
}

fn run_search(config: &ScreenerConfig, query: &str, limit: usize) -> Result<()> {
    let (eligible, _) = eligible_tickers(config)?;
    for ticker in search_tickers(&eligible, query, limit) {
        println!("{}", ticker);
    }
    Ok(())
}

fn run_universe(config: &ScreenerConfig) -> Result<()> {
    let (eligible, blacklisted) = eligible_tickers(config)?;
    println!("📊 {} eligible tickers, {} blacklisted", eligible.len(), blacklisted.len());
    Ok(())
}
