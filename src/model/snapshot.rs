//! Immutable per-stage outputs threaded through the tick pipeline.
//!
//! Each stage produces its own value type; later stages receive only the
//! values they read, so there is no shared mutable tick record.

use crate::indicator::IndicatorSnapshot;
use crate::model::signal::Bias;
use crate::model::tick::Tick;

/// Indicators derived from the 5-tick and 15-tick aggregate series.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeframeSnapshot {
    pub rsi_5m: f64,
    pub rsi_15m: f64,
    pub ema_5m: f64,
    pub ema_15m: f64,
    pub is_ready_5m: bool,
    pub is_ready_15m: bool,
    /// Full-resolution history is long enough to trade on.
    pub is_ready: bool,
}

impl Default for TimeframeSnapshot {
    fn default() -> Self {
        Self {
            rsi_5m: 50.0,
            rsi_15m: 50.0,
            ema_5m: 0.0,
            ema_15m: 0.0,
            is_ready_5m: false,
            is_ready_15m: false,
            is_ready: false,
        }
    }
}

/// Short-window price pattern signals from the tick pattern tracker.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PatternSignals {
    pub momentum: f64,
    pub direction_score: i32,
    pub three_up: bool,
    pub sharp_drop_rebound: bool,
}

/// Everything the decision layer reads for one tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarketView {
    pub tick: Tick,
    pub indicators: IndicatorSnapshot,
    pub timeframes: TimeframeSnapshot,
    /// `None` when no pattern tracker feeds the decision layer.
    pub patterns: Option<PatternSignals>,
}

impl MarketView {
    pub fn momentum(&self) -> f64 {
        self.patterns.map(|p| p.momentum).unwrap_or(0.0)
    }

    pub fn direction_score(&self) -> i32 {
        self.patterns.map(|p| p.direction_score).unwrap_or(0)
    }
}

/// Open-position accumulators captured after the profit/loss update.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PositionMetrics {
    pub max_profit: f64,
    pub max_loss: f64,
    pub tick_since_entry: u32,
    pub unrealized_profit: f64,
    pub recent_high: f64,
}

/// Fully processed tick handed to the trade logger and tick recorder.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnrichedTick {
    pub tick: Tick,
    pub indicators: IndicatorSnapshot,
    pub timeframes: TimeframeSnapshot,
    pub patterns: PatternSignals,
    pub position: PositionMetrics,
    pub bias: Bias,
    pub entry_score: i32,
}
