use std::collections::HashMap;
use std::str::FromStr;

use serde::Deserialize;

use crate::model::signal::Bias;
use crate::model::snapshot::MarketView;
use crate::params_store::ParamsStore;

/// Score returned when the market is judged to be consolidating.
pub const CONSOLIDATION_VETO: i32 = -99;
/// Histogram needed for the trend-confirmation vote.
pub const TREND_HIST_MIN: f64 = 0.8;
/// Histogram magnitude that counts as a bias vote.
pub const BIAS_HIST_BAND: f64 = 0.3;
pub const BIAS_RSI_UPPER: f64 = 65.0;
pub const BIAS_RSI_LOWER: f64 = 35.0;
/// 5-tick RSI needed for the multi-timeframe vote.
pub const MTF_RSI_MIN: f64 = 55.0;

/// Entry thresholds. Field names double as parameter-store weight keys.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct DecisionConfig {
    pub adx_consolidation: f64,
    pub macd_consolidation_gap: f64,
    pub momentum_abs_min: f64,
    pub bull_score_min: i32,
    pub bear_score_max: i32,
    pub neutral_score_abs: i32,
    pub rsi_overbought: f64,
    pub rsi_bullish_min: f64,
    pub atr_high: f64,
    pub atr_low: f64,
    pub volume_min: f64,
}

impl Default for DecisionConfig {
    fn default() -> Self {
        Self {
            adx_consolidation: 20.0,
            macd_consolidation_gap: 0.3,
            momentum_abs_min: 3.0,
            bull_score_min: 3,
            bear_score_max: -2,
            neutral_score_abs: 3,
            rsi_overbought: 70.0,
            rsi_bullish_min: 55.0,
            atr_high: 20.0,
            atr_low: 5.0,
            volume_min: 5.0,
        }
    }
}

impl DecisionConfig {
    /// Override thresholds whose names match `weights` keys.
    /// Returns how many keys were applied; unknown keys are skipped.
    pub fn apply_weights(&mut self, weights: &HashMap<String, f64>) -> usize {
        let mut applied = 0;
        for (key, value) in weights {
            let value = *value;
            let slot = match key.as_str() {
                "adx_consolidation" => &mut self.adx_consolidation,
                "macd_consolidation_gap" => &mut self.macd_consolidation_gap,
                "momentum_abs_min" => &mut self.momentum_abs_min,
                "rsi_overbought" => &mut self.rsi_overbought,
                "rsi_bullish_min" => &mut self.rsi_bullish_min,
                "atr_high" => &mut self.atr_high,
                "atr_low" => &mut self.atr_low,
                "volume_min" => &mut self.volume_min,
                "bull_score_min" => {
                    self.bull_score_min = value.round() as i32;
                    applied += 1;
                    continue;
                }
                "bear_score_max" => {
                    self.bear_score_max = value.round() as i32;
                    applied += 1;
                    continue;
                }
                "neutral_score_abs" => {
                    self.neutral_score_abs = value.round() as i32;
                    applied += 1;
                    continue;
                }
                other => {
                    tracing::debug!(key = other, "Ignoring unknown decision weight");
                    continue;
                }
            };
            *slot = value;
            applied += 1;
        }
        applied
    }
}

/// Where the session bias comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(try_from = "String")]
pub enum BiasMode {
    /// Classify every tick with [`DecisionEngine::detect_bias`].
    #[default]
    Auto,
    Fixed(Bias),
}

impl FromStr for BiasMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("auto") {
            return Ok(Self::Auto);
        }
        s.parse::<Bias>().map(Self::Fixed)
    }
}

impl TryFrom<String> for BiasMode {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Outcome of scoring one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntryDecision {
    pub bias: Bias,
    pub score: i32,
    pub enter: bool,
}

#[derive(Debug, Clone)]
pub struct DecisionEngine {
    config: DecisionConfig,
    bias_mode: BiasMode,
}

impl DecisionEngine {
    pub fn new(config: DecisionConfig, bias_mode: BiasMode) -> Self {
        Self { config, bias_mode }
    }

    /// Apply externally calibrated thresholds from a parameter store.
    pub fn apply_params(&mut self, store: &dyn ParamsStore) {
        let applied = self.config.apply_weights(&store.weights());
        tracing::info!(
            version = %store.version(),
            applied,
            "Loaded decision parameters"
        );
    }

    pub fn config(&self) -> &DecisionConfig {
        &self.config
    }

    pub fn bias_mode(&self) -> BiasMode {
        self.bias_mode
    }

    /// Vote-based regime classification; non-trending markets are neutral.
    pub fn detect_bias(&self, view: &MarketView) -> Bias {
        let ind = &view.indicators;
        if ind.adx < self.config.adx_consolidation {
            return Bias::Neutral;
        }
        let mut votes = 0;
        votes += if ind.ema5 > ind.ema20 { 1 } else { -1 };
        votes += if ind.macd > ind.macd_signal { 1 } else { -1 };
        if ind.macd_hist > BIAS_HIST_BAND {
            votes += 1;
        } else if ind.macd_hist < -BIAS_HIST_BAND {
            votes -= 1;
        }
        if ind.rsi > BIAS_RSI_UPPER {
            votes += 1;
        } else if ind.rsi < BIAS_RSI_LOWER {
            votes -= 1;
        }
        match votes {
            v if v > 0 => Bias::Bullish,
            v if v < 0 => Bias::Bearish,
            _ => Bias::Neutral,
        }
    }

    /// Configured bias, or the auto-detected one.
    pub fn resolve_bias(&self, view: &MarketView) -> Bias {
        match self.bias_mode {
            BiasMode::Fixed(bias) => bias,
            BiasMode::Auto => self.detect_bias(view),
        }
    }

    /// Integer entry strength, or [`CONSOLIDATION_VETO`] in a consolidating market.
    pub fn score(&self, view: &MarketView) -> i32 {
        let cfg = &self.config;
        let ind = &view.indicators;
        if ind.adx < cfg.adx_consolidation
            && (ind.macd - ind.macd_signal).abs() < cfg.macd_consolidation_gap
        {
            return CONSOLIDATION_VETO;
        }

        let mut score = 0;
        if ind.macd > ind.macd_signal && ind.macd_hist > TREND_HIST_MIN {
            score += 1;
        }
        if ind.close > ind.vwap && ind.ema5 > ind.ema20 && ind.rsi > cfg.rsi_bullish_min {
            score += 1;
        }

        let tf = &view.timeframes;
        if tf.is_ready_5m && tf.is_ready_15m && tf.rsi_5m > MTF_RSI_MIN && tf.ema_15m > tf.ema_5m
        {
            score += 1;
        }

        if ind.close > ind.vwap && view.tick.volume >= cfg.volume_min {
            score += 1;
        }

        if ind.adx > cfg.adx_consolidation && ind.atr >= cfg.atr_high {
            score += 1;
        } else if ind.atr <= cfg.atr_low {
            score -= 1;
        }

        if let Some(patterns) = view.patterns {
            if patterns.three_up {
                score += 1;
            }
            if patterns.sharp_drop_rebound {
                score += 1;
            }
            if patterns.momentum.abs() >= cfg.momentum_abs_min {
                score += 1;
            }
            score += patterns.direction_score;
        }
        score
    }

    pub fn should_enter(&self, view: &MarketView) -> bool {
        self.evaluate(view).enter
    }

    /// Score, resolve bias, and apply the entry gates in one pass.
    pub fn evaluate(&self, view: &MarketView) -> EntryDecision {
        let score = self.score(view);
        let bias = self.resolve_bias(view);
        let enter = score != CONSOLIDATION_VETO && self.passes_gates(view, bias, score);
        EntryDecision { bias, score, enter }
    }

    fn passes_gates(&self, view: &MarketView, bias: Bias, score: i32) -> bool {
        let cfg = &self.config;
        if view.momentum().abs() < cfg.momentum_abs_min {
            return false;
        }
        if view.direction_score() == 0 {
            return false;
        }
        if !view.timeframes.is_ready {
            return false;
        }
        let ind = &view.indicators;
        match bias {
            Bias::Bullish => {
                score >= cfg.bull_score_min
                    && ind.close > ind.vwap
                    && ind.ema5 > ind.ema20
                    && ind.rsi < cfg.rsi_overbought
            }
            Bias::Bearish => score <= cfg.bear_score_max && ind.ema5 < ind.ema20,
            Bias::Neutral => score.abs() >= cfg.neutral_score_abs,
        }
    }
}
