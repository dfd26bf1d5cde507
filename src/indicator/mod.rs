//! Indicator engine: pure functions over rolling price/volume history.
//!
//! Every indicator has a minimum-history guard and returns a neutral default
//! instead of failing. Outputs are rounded to one or two decimals.

pub mod adx;
pub mod atr;
pub mod bollinger;
pub mod ema;
pub mod macd;
pub mod rsi;
pub mod stochastic;
pub mod vwap;

pub use bollinger::BandSignal;

pub const RSI_PERIOD: usize = 14;
pub const MACD_FAST: usize = 12;
pub const MACD_SLOW: usize = 26;
pub const MACD_SIGNAL: usize = 9;
pub const KD_PERIOD: usize = 9;
pub const BOLLINGER_PERIOD: usize = 20;
pub const BOLLINGER_STD_FACTOR: f64 = 2.0;
pub const ATR_PERIOD: usize = 14;
pub const ADX_PERIOD: usize = 14;
pub const EMA_FAST: usize = 5;
pub const EMA_SLOW: usize = 20;
/// Neutral K/D used when no previous value is carried forward.
pub const KD_NEUTRAL: f64 = 50.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndicatorSnapshot {
    pub rsi: f64,
    pub macd: f64,
    pub macd_signal: f64,
    pub macd_hist: f64,
    pub kd_k: f64,
    pub kd_d: f64,
    pub bband_upper: f64,
    pub bband_middle: f64,
    pub bband_lower: f64,
    pub bband_signal: BandSignal,
    pub atr: f64,
    pub ema5: f64,
    pub ema20: f64,
    pub adx: f64,
    pub vwap: f64,
    /// Latest close, 0 when the history is empty.
    pub close: f64,
}

impl Default for IndicatorSnapshot {
    fn default() -> Self {
        Self {
            rsi: 50.0,
            macd: 0.0,
            macd_signal: 0.0,
            macd_hist: 0.0,
            kd_k: KD_NEUTRAL,
            kd_d: KD_NEUTRAL,
            bband_upper: 0.0,
            bband_middle: 0.0,
            bband_lower: 0.0,
            bband_signal: BandSignal::Neutral,
            atr: 0.0,
            ema5: 0.0,
            ema20: 0.0,
            adx: 0.0,
            vwap: 0.0,
            close: 0.0,
        }
    }
}

/// Compute the full indicator set with neutral K/D seeds.
pub fn compute_all(closes: &[f64], highs: &[f64], lows: &[f64], volumes: &[f64]) -> IndicatorSnapshot {
    compute_all_with_prev_kd(closes, highs, lows, volumes, KD_NEUTRAL, KD_NEUTRAL)
}

/// Compute the full indicator set, smoothing K/D from the caller's previous values.
pub fn compute_all_with_prev_kd(
    closes: &[f64],
    highs: &[f64],
    lows: &[f64],
    volumes: &[f64],
    prev_k: f64,
    prev_d: f64,
) -> IndicatorSnapshot {
    let macd = macd::macd(closes, MACD_FAST, MACD_SLOW, MACD_SIGNAL);
    let kd = stochastic::kd(closes, highs, lows, KD_PERIOD, prev_k, prev_d);
    let bands = bollinger::bollinger(closes, BOLLINGER_PERIOD, BOLLINGER_STD_FACTOR);
    IndicatorSnapshot {
        rsi: rsi::rsi(closes, RSI_PERIOD),
        macd: macd.line,
        macd_signal: macd.signal,
        macd_hist: macd.histogram,
        kd_k: kd.k,
        kd_d: kd.d,
        bband_upper: bands.upper,
        bband_middle: bands.middle,
        bband_lower: bands.lower,
        bband_signal: bands.signal,
        atr: atr::atr(highs, lows, closes, ATR_PERIOD),
        ema5: ema::ema(closes, EMA_FAST),
        ema20: ema::ema(closes, EMA_SLOW),
        adx: adx::adx(highs, lows, closes, ADX_PERIOD),
        vwap: vwap::vwap(closes, volumes),
        close: closes.last().copied().unwrap_or(0.0),
    }
}

pub(crate) fn round_to(value: f64, digits: i32) -> f64 {
    let factor = 10f64.powi(digits);
    (value * factor).round() / factor
}
