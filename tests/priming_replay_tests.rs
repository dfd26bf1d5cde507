use std::fmt::Write as _;
use std::path::PathBuf;

use anyhow::Result;
use tick_engine::clock::ManualClock;
use tick_engine::config::Config;
use tick_engine::decision::BiasMode;
use tick_engine::engine::TickEngine;
use tick_engine::model::candle::Candle;
use tick_engine::model::signal::Bias;
use tick_engine::priming::{prime_from_source, prime_market_bias, BarSource, CsvBarSource};
use tick_engine::replay::{read_ticks_csv, run_replay};

fn temp_file(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("tick_engine_replay_{}", uuid::Uuid::new_v4().simple()));
    std::fs::create_dir_all(&dir).unwrap();
    dir.join(name)
}

fn bars(closes: impl IntoIterator<Item = f64>) -> Vec<Candle> {
    closes
        .into_iter()
        .enumerate()
        .map(|(i, close)| Candle {
            open: close,
            high: close + 1.0,
            low: close - 1.0,
            close,
            volume: 10.0,
            open_time: i as u64 * 60_000,
        })
        .collect()
}

#[test]
fn too_few_bars_prime_neutral() {
    assert_eq!(prime_market_bias(&[]), Bias::Neutral);
    assert_eq!(prime_market_bias(&bars((0..30).map(|i| 100.0 + i as f64))), Bias::Neutral);
}

#[test]
fn rising_bars_prime_bullish() {
    let closes = (0..60).map(|i| 100.0 + i as f64);
    assert_eq!(prime_market_bias(&bars(closes)), Bias::Bullish);
}

#[test]
fn falling_bars_prime_bearish() {
    let closes = (0..60).map(|i| 200.0 - i as f64);
    assert_eq!(prime_market_bias(&bars(closes)), Bias::Bearish);
}

#[test]
fn csv_bar_source_sorts_by_open_time() {
    let path = temp_file("bars.csv");
    let mut csv = String::from("open,high,low,close,volume,open_time\n");
    // Written newest first; a falling tape once sorted.
    for i in 0..60u64 {
        let close = 140.0 + i as f64;
        writeln!(csv, "{close},{},{},{close},5,{}", close + 1.0, close - 1.0, (59 - i) * 60_000).unwrap();
    }
    std::fs::write(&path, csv).unwrap();

    let mut source = CsvBarSource::new(&path);
    let loaded = source.fetch_bars().unwrap();
    assert_eq!(loaded.len(), 60);
    assert_eq!(loaded[0].open_time, 0);
    assert_eq!(loaded[0].close, 199.0);
    assert_eq!(prime_from_source(&mut source).unwrap(), Bias::Bearish);
    let _ = std::fs::remove_file(&path);
}

struct BrokenSource;

impl BarSource for BrokenSource {
    fn fetch_bars(&mut self) -> Result<Vec<Candle>> {
        anyhow::bail!("exchange unavailable")
    }
}

#[test]
fn priming_surfaces_source_errors() {
    assert!(prime_from_source(&mut BrokenSource).is_err());
}

#[test]
fn read_ticks_defaults_missing_volume() {
    let path = temp_file("ticks.csv");
    std::fs::write(&path, "timestamp_ms,price\n1000,100.5\n2000,101\n").unwrap();
    let ticks = read_ticks_csv(&path).unwrap();
    assert_eq!(ticks.len(), 2);
    assert_eq!(ticks[1].timestamp_ms, 2_000);
    assert_eq!(ticks[0].price, 100.5);
    assert_eq!(ticks[0].volume, 0.0);
    let _ = std::fs::remove_file(&path);
}

#[test]
fn read_ticks_rejects_bad_rows() {
    let path = temp_file("ticks.csv");
    std::fs::write(&path, "timestamp_ms,price,volume\n1000,abc,1\n").unwrap();
    let err = read_ticks_csv(&path).unwrap_err();
    assert!(format!("{:#}", err).contains("row 1"));
    let _ = std::fs::remove_file(&path);
}

#[test]
fn replay_drives_clock_from_tick_timestamps() {
    let path = temp_file("ticks.csv");
    let t0 = 1_700_000_000_000u64;
    let mut csv = String::from("timestamp_ms,price,volume\n");
    for i in 0..30u64 {
        writeln!(csv, "{},{},5", t0 + i * 1_000, 100 + i).unwrap();
    }
    writeln!(csv, "{},134,5", t0 + 30_000).unwrap();
    writeln!(csv, "{},93,5", t0 + 33_000).unwrap();
    std::fs::write(&path, csv).unwrap();

    let mut config = Config::default();
    config.engine.market_bias = BiasMode::Fixed(Bias::Neutral);
    let clock = ManualClock::new(0);
    let mut engine = TickEngine::new(&config, Box::new(clock.clone()));
    let ticks = read_ticks_csv(&path).unwrap();
    let stats = run_replay(&mut engine, &ticks, &clock);

    assert_eq!(stats.ticks, 32);
    assert_eq!(stats.entries, 1);
    assert_eq!(stats.trades, 1);
    assert_eq!(stats.losses, 1);
    assert_eq!(stats.realized_pnl, -41.0);
    assert_eq!(engine.state().last_entry_time_ms(), Some(t0 + 30_000));
    let _ = std::fs::remove_file(&path);
}
