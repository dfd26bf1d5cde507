use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use tick_engine::clock::ManualClock;
use tick_engine::config::Config;
use tick_engine::decision::BiasMode;
use tick_engine::engine::TickEngine;
use tick_engine::params_store::{JsonParamsStore, ParamsStore};
use tick_engine::priming::{prime_from_source, CsvBarSource};
use tick_engine::replay::{read_ticks_csv, run_replay};
use tick_engine::sink::{CsvTradeLogger, SqliteTickRecorder};

/// Replay a recorded tick stream through the decision engine.
#[derive(Debug, Parser)]
#[command(name = "tick-engine", version, about)]
struct Cli {
    /// CSV of `timestamp_ms,price,volume` rows.
    #[arg(long)]
    ticks: PathBuf,
    /// CSV of historical bars used to prime a fixed market bias.
    #[arg(long)]
    bars: Option<PathBuf>,
    /// TOML configuration; defaults to $TICK_ENGINE_CONFIG or config/default.toml.
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => Config::load_from_path(path)?,
        None => Config::load()?,
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.logging.level)),
        )
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .json()
        .init();

    tracing::info!(
        ticks = %cli.ticks.display(),
        market_bias = ?config.engine.market_bias,
        lock_profit = config.extensions.lock_profit,
        add_to_position = config.extensions.add_to_position,
        "Starting tick-engine replay"
    );

    if let Some(bars) = &cli.bars {
        let bias = prime_from_source(&mut CsvBarSource::new(bars))
            .with_context(|| format!("failed to prime bias from {}", bars.display()))?;
        config.engine.market_bias = BiasMode::Fixed(bias);
    }

    let clock = ManualClock::new(0);
    let logger = CsvTradeLogger::open(&config.output.trade_log_path).with_context(|| {
        format!(
            "failed to open trade log {}",
            config.output.trade_log_path.display()
        )
    })?;
    let recorder = SqliteTickRecorder::open(&config.output.tick_db_path).with_context(|| {
        format!(
            "failed to open tick database {}",
            config.output.tick_db_path.display()
        )
    })?;
    let mut engine = TickEngine::new(&config, Box::new(clock.clone()))
        .with_trade_logger(Box::new(logger))
        .with_tick_recorder(Box::new(recorder));

    if let Some(params_path) = &config.output.params_path {
        let store = JsonParamsStore::open(params_path)
            .with_context(|| format!("failed to open params {}", params_path.display()))?;
        tracing::info!(version = %store.version(), "Applying calibrated decision params");
        engine = engine.with_params(&store);
    }

    let ticks = read_ticks_csv(&cli.ticks)?;
    let stats = run_replay(&mut engine, &ticks, &clock);

    println!("ticks processed : {}", stats.ticks);
    println!("entries         : {}", stats.entries);
    println!("adds            : {}", stats.adds);
    println!("trades closed   : {}", stats.trades);
    println!("wins / losses   : {} / {}", stats.wins, stats.losses);
    println!("win rate        : {:.1}%", stats.win_rate_percent());
    println!("realized pnl    : {:.2}", stats.realized_pnl);
    println!("suspensions     : {}", stats.suspensions);
    Ok(())
}
