use std::fs::OpenOptions;
use std::path::{Path, PathBuf};

use chrono::{TimeZone, Utc};
use serde::Serialize;

use crate::error::AppError;
use crate::lifecycle::PositionStatus;
use crate::model::signal::TradeAction;
use crate::model::snapshot::EnrichedTick;
use crate::sink::TradeLogger;

/// One fixed-width trade log row.
#[derive(Debug, Serialize)]
struct TradeRecord<'a> {
    timestamp: String,
    action: &'a str,
    direction: &'a str,
    price: f64,
    max_profit: f64,
    max_loss: f64,
    tick_since_entry: u32,
    rsi: f64,
    macd: f64,
    macd_signal: f64,
    kd_k: f64,
    kd_d: f64,
    volume: f64,
    bband_signal: &'a str,
    ema5: f64,
    ema20: f64,
    adx: f64,
    vwap: f64,
    entry_score: i32,
    bias: &'a str,
    momentum: f64,
    direction_score: i32,
}

fn round1(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

fn format_timestamp(timestamp_ms: u64) -> String {
    Utc.timestamp_millis_opt(timestamp_ms as i64)
        .single()
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_default()
}

/// Appends trade actions to a CSV file, writing the header once on creation.
#[derive(Debug, Clone)]
pub struct CsvTradeLogger {
    path: PathBuf,
}

impl CsvTradeLogger {
    pub fn open(path: &Path) -> Result<Self, AppError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        Ok(Self {
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TradeLogger for CsvTradeLogger {
    fn log(
        &mut self,
        action: TradeAction,
        status: &PositionStatus,
        price: f64,
        tick: &EnrichedTick,
    ) -> Result<(), AppError> {
        let write_header = !self.path.exists();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        let mut writer = csv::WriterBuilder::new()
            .has_headers(write_header)
            .from_writer(file);

        let ind = &tick.indicators;
        writer.serialize(TradeRecord {
            timestamp: format_timestamp(tick.tick.timestamp_ms),
            action: action.as_str(),
            direction: status.direction.map(|d| d.as_str()).unwrap_or(""),
            price,
            max_profit: round2(status.max_profit),
            max_loss: round2(status.max_loss),
            tick_since_entry: status.tick_since_entry,
            rsi: ind.rsi,
            macd: ind.macd,
            macd_signal: ind.macd_signal,
            kd_k: ind.kd_k,
            kd_d: ind.kd_d,
            volume: tick.tick.volume,
            bband_signal: ind.bband_signal.as_str(),
            ema5: ind.ema5,
            ema20: ind.ema20,
            adx: round1(ind.adx),
            vwap: ind.vwap,
            entry_score: tick.entry_score,
            bias: tick.bias.as_str(),
            momentum: round2(tick.patterns.momentum),
            direction_score: tick.patterns.direction_score,
        })?;
        writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timestamp_formats_as_utc() {
        assert_eq!(format_timestamp(0), "1970-01-01 00:00:00");
        assert_eq!(format_timestamp(86_400_000 + 61_000), "1970-01-02 00:01:01");
    }

    #[test]
    fn adx_is_logged_with_one_decimal() {
        assert_eq!(round1(23.46), 23.5);
        assert_eq!(round1(19.94), 19.9);
    }
}
