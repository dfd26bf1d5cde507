//! Side-effect sinks notified by the tick engine.
//!
//! Sinks report failures through `Result`; the engine logs them and keeps
//! processing ticks.

pub mod csv_trade_logger;
pub mod sqlite_tick_recorder;

pub use csv_trade_logger::CsvTradeLogger;
pub use sqlite_tick_recorder::{RecordedTick, SqliteTickRecorder};

use crate::error::AppError;
use crate::lifecycle::PositionStatus;
use crate::model::signal::TradeAction;
use crate::model::snapshot::EnrichedTick;

pub trait TradeLogger {
    fn log(
        &mut self,
        action: TradeAction,
        status: &PositionStatus,
        price: f64,
        tick: &EnrichedTick,
    ) -> Result<(), AppError>;
}

/// Buffers the ticks of one open trade.
pub trait TickRecorder {
    fn start_trade(&mut self, trade_id: &str) -> Result<(), AppError>;
    fn record_tick(&mut self, tick: &EnrichedTick) -> Result<(), AppError>;
    /// Persist and clear the current trade's buffer.
    fn force_flush(&mut self) -> Result<(), AppError>;
}

/// Discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl TradeLogger for NullSink {
    fn log(
        &mut self,
        _action: TradeAction,
        _status: &PositionStatus,
        _price: f64,
        _tick: &EnrichedTick,
    ) -> Result<(), AppError> {
        Ok(())
    }
}

impl TickRecorder for NullSink {
    fn start_trade(&mut self, _trade_id: &str) -> Result<(), AppError> {
        Ok(())
    }

    fn record_tick(&mut self, _tick: &EnrichedTick) -> Result<(), AppError> {
        Ok(())
    }

    fn force_flush(&mut self) -> Result<(), AppError> {
        Ok(())
    }
}
