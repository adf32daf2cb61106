//! QuantTerm CLI — fetch, engineer, train, infer, backtest, status.
//!
//! Commands:
//! - `fetch` — pull OHLC history through the provider fallback chain into SQLite
//! - `engineer` — compute features for a symbol (optionally archive them)
//! - `train` — train the per-symbol direction classifier
//! - `infer` — produce a signal with its explanation
//! - `backtest` — toy cumulative-return check of the current signal
//! - `status` — report stored symbols and row counts

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use quantterm_core::config::AppConfig;
use quantterm_core::data::{FallbackChain, RetryPolicy, SymbolTable};
use quantterm_core::features::FeaturePipeline;
use quantterm_core::model::train_model;
use quantterm_core::signal::{quick_backtest, SignalEngine};
use quantterm_core::storage::BarStore;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "quantterm",
    about = "QuantTerm CLI — market data acquisition and signal inference"
)]
struct Cli {
    /// Path to the TOML config file.
    #[arg(long, default_value = "config.toml", global = true)]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch OHLC history through the fallback chain and store it.
    Fetch {
        /// Symbols to fetch. Defaults to the configured asset list.
        symbols: Vec<String>,

        /// Number of daily bars to request.
        #[arg(long)]
        days: Option<usize>,
    },
    /// Compute features for a symbol.
    Engineer {
        #[arg(long)]
        symbol: String,

        /// Also archive the rows into the features table.
        #[arg(long, default_value_t = false)]
        archive: bool,
    },
    /// Train the direction classifier for a symbol.
    Train {
        #[arg(long)]
        symbol: String,
    },
    /// Infer a signal for a symbol.
    Infer {
        #[arg(long)]
        symbol: String,
    },
    /// Toy backtest of the current signal against stored history.
    Backtest {
        #[arg(long)]
        symbol: String,
    },
    /// Report stored symbols and row counts.
    Status,
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = AppConfig::load(&cli.config)?;

    match cli.command {
        Commands::Fetch { symbols, days } => run_fetch(&config, symbols, days),
        Commands::Engineer { symbol, archive } => run_engineer(&config, &symbol, archive),
        Commands::Train { symbol } => run_train(&config, &symbol),
        Commands::Infer { symbol } => run_infer(&config, &symbol),
        Commands::Backtest { symbol } => run_backtest(&config, &symbol),
        Commands::Status => run_status(&config),
    }
}

fn pipeline_from(config: &AppConfig) -> FeaturePipeline {
    FeaturePipeline::new(
        config.reference_symbol.clone(),
        config.macro_metric.clone(),
        config.feature.clone(),
    )
}

fn run_fetch(config: &AppConfig, symbols: Vec<String>, days: Option<usize>) -> Result<()> {
    let symbols = if symbols.is_empty() {
        config.assets.clone()
    } else {
        symbols
    };
    let days = days.unwrap_or(config.requested_days);

    let chain = FallbackChain::standard(
        SymbolTable::default(),
        config.alpha_vantage_key.clone(),
        config.polygon_key.clone(),
        RetryPolicy::from_config(&config.retry),
    );
    let mut store = BarStore::open(&config.db_path)?;

    let total = symbols.len();
    let mut failed = 0;
    for (i, symbol) in symbols.iter().enumerate() {
        println!("[{}/{}] Fetching {symbol}...", i + 1, total);
        match chain.fetch_ohlc(symbol, days) {
            Ok(bars) => {
                let stored = store.upsert_bars(&bars)?;
                println!("  OK: {symbol} ({stored} bars)");
            }
            Err(err) => {
                eprintln!("  FAIL: {symbol}: {err}");
                failed += 1;
            }
        }
    }

    println!("\nFetch complete: {}/{total} succeeded, {failed} failed", total - failed);
    if failed > 0 {
        std::process::exit(1);
    }
    Ok(())
}

fn run_engineer(config: &AppConfig, symbol: &str, archive: bool) -> Result<()> {
    let mut store = BarStore::open(&config.db_path)?;
    let rows = pipeline_from(config).engineer(&store, symbol);

    if rows.is_empty() {
        println!("No features for {symbol} — fetch data first.");
        return Ok(());
    }

    println!("Engineered {} feature rows for {symbol}", rows.len());
    if let Some(last) = rows.last() {
        println!(
            "Latest ({}): returns={:+.4} volatility={:.4} momentum_5d={:+.4} corr_dxy={:+.3} macro_rate={:.2}",
            last.date, last.returns, last.volatility, last.momentum_5d, last.corr_dxy, last.macro_rate
        );
    }

    if archive {
        // Archiving is telemetry — a failure must not discard the computation.
        match store.archive_features(&rows) {
            Ok(n) => println!("Archived {n} rows."),
            Err(err) => eprintln!("Archive failed (features still computed): {err}"),
        }
    }
    Ok(())
}

fn run_train(config: &AppConfig, symbol: &str) -> Result<()> {
    let mut store = BarStore::open(&config.db_path)?;
    let pipeline = pipeline_from(config);

    let report = match train_model(
        &mut store,
        &pipeline,
        &config.model_dir,
        symbol,
        config.signal.min_feature_rows,
    ) {
        Ok(report) => report,
        Err(err) => bail!("training failed for {symbol}: {err}"),
    };

    println!("=== Training Report ===");
    println!("Symbol:       {symbol}");
    println!("CV Accuracy:  {:.2}%", report.cv_accuracy * 100.0);
    println!("Features:     {}", report.n_features);
    println!("Samples:      {}", report.n_samples);
    Ok(())
}

fn run_infer(config: &AppConfig, symbol: &str) -> Result<()> {
    let mut store = BarStore::open(&config.db_path)?;
    let engine = SignalEngine::new(
        pipeline_from(config),
        config.model_dir.clone(),
        config.signal.clone(),
    );

    let signal = engine.infer(&mut store, symbol);

    println!("=== Signal ===");
    println!("Symbol:  {symbol}");
    println!("Score:   {:+.3}", signal.score);
    match signal.fallback {
        Some(reason) => println!("Path:    momentum proxy ({reason})"),
        None => println!("Path:    trained model"),
    }
    println!("\nTop features:");
    for (name, weight) in signal.explanation.iter().take(5) {
        println!("  {name:<12} {weight:.3}");
    }
    Ok(())
}

fn run_backtest(config: &AppConfig, symbol: &str) -> Result<()> {
    let mut store = BarStore::open(&config.db_path)?;
    let pipeline = pipeline_from(config);
    let engine = SignalEngine::new(
        pipeline_from(config),
        config.model_dir.clone(),
        config.signal.clone(),
    );

    let rows = pipeline.engineer(&store, symbol);
    if rows.len() < 2 {
        bail!("not enough history to backtest {symbol}");
    }

    let signal = engine.infer(&mut store, symbol);
    let pnl = quick_backtest(&rows, signal.score);

    println!("Quick backtest for {symbol} (signal {:+.3}): {:+.2}%", signal.score, pnl * 100.0);
    println!("NOTE: toy cumulative sum — no fills, slippage, or sizing.");
    Ok(())
}

fn run_status(config: &AppConfig) -> Result<()> {
    let store = BarStore::open(&config.db_path)?;
    let symbols = store.symbols_with_bars();

    if symbols.is_empty() {
        println!("Store is empty: {}", config.db_path.display());
        return Ok(());
    }

    println!("Store: {}", config.db_path.display());
    println!("{:<10} {:>8} {:>10}", "Symbol", "Bars", "Features");
    println!("{}", "-".repeat(30));
    for symbol in &symbols {
        println!(
            "{:<10} {:>8} {:>10}",
            symbol,
            store.bar_count(symbol),
            store.feature_count(symbol)
        );
    }
    Ok(())
}
