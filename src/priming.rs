use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::indicator::ema::EmaTracker;
use crate::indicator::{MACD_FAST, MACD_SIGNAL, MACD_SLOW};
use crate::model::candle::Candle;
use crate::model::signal::Bias;

/// Supplies chronologically ordered historical bars before the tick stream starts.
pub trait BarSource {
    fn fetch_bars(&mut self) -> Result<Vec<Candle>>;
}

/// Reads `open,high,low,close,volume,open_time` rows from a CSV file.
#[derive(Debug, Clone)]
pub struct CsvBarSource {
    path: PathBuf,
}

impl CsvBarSource {
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
        }
    }
}

impl BarSource for CsvBarSource {
    fn fetch_bars(&mut self) -> Result<Vec<Candle>> {
        let mut reader = csv::Reader::from_path(&self.path)
            .with_context(|| format!("failed to open {}", self.path.display()))?;
        let mut bars = Vec::new();
        for row in reader.deserialize() {
            let bar: Candle =
                row.with_context(|| format!("invalid bar row in {}", self.path.display()))?;
            bars.push(bar);
        }
        bars.sort_by_key(|b| b.open_time);
        Ok(bars)
    }
}

/// Classify the pre-stream bias from a rolling MACD over bar closes.
///
/// Neutral until the signal line has seen enough MACD values, then bullish
/// when MACD is above its signal line and bearish otherwise.
pub fn prime_market_bias(bars: &[Candle]) -> Bias {
    let mut fast = EmaTracker::new(MACD_FAST);
    let mut slow = EmaTracker::new(MACD_SLOW);
    let mut signal = EmaTracker::new(MACD_SIGNAL);
    let mut last = None;
    for bar in bars {
        let fast_v = fast.push(bar.close);
        let slow_v = slow.push(bar.close);
        if !slow.is_ready() {
            continue;
        }
        let macd = fast_v - slow_v;
        let signal_v = signal.push(macd);
        last = Some((macd, signal_v));
    }
    match last {
        Some((macd, signal_v)) if signal.is_ready() => {
            if macd > signal_v {
                Bias::Bullish
            } else {
                Bias::Bearish
            }
        }
        _ => Bias::Neutral,
    }
}

/// Fetch bars from `source` and classify them, logging the result.
pub fn prime_from_source(source: &mut dyn BarSource) -> Result<Bias> {
    let bars = source.fetch_bars()?;
    let bias = prime_market_bias(&bars);
    tracing::info!(bars = bars.len(), bias = %bias, "Primed market bias from historical bars");
    Ok(bias)
}
