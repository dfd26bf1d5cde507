use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::decision::{BiasMode, DecisionConfig};
use crate::error::AppError;

pub const DEFAULT_CONFIG_PATH: &str = "config/default.toml";
pub const CONFIG_PATH_ENV: &str = "TICK_ENGINE_CONFIG";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub risk: RiskConfig,
    pub decision: DecisionConfig,
    pub engine: EngineConfig,
    pub extensions: ExtensionFlags,
    pub logging: LoggingConfig,
    pub output: OutputConfig,
}

/// Session risk thresholds. Fixed for the lifetime of a StrategyState.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct RiskConfig {
    /// Minimum seconds between two entries.
    pub cooldown_seconds: u64,
    /// Unrealized loss magnitude that always closes the position.
    pub hard_stoploss: f64,
    pub hard_time_seconds: u64,
    pub max_ticks_hold: u32,
    pub max_consecutive_losses: u32,
    pub suspension_minutes: u64,
    /// New positions are exempt from exit checks for this long.
    pub just_entered_seconds: u64,
    pub dynamic_stop_min_ticks: u32,
    pub dynamic_stop_multiplier: f64,
    pub dynamic_stop_fallback: f64,
    pub take_profit_multiplier: f64,
    pub take_profit_cost: f64,
    pub take_profit_cushion: f64,
    pub take_profit_fallback: f64,
    /// Peak profit that lets a position outlive `max_ticks_hold` in the hold check.
    pub hold_profit_floor: f64,
    pub recent_price_window: usize,
}

impl Default for RiskConfig {
    fn default() -> Self {
        Self {
            cooldown_seconds: 30,
            hard_stoploss: 40.0,
            hard_time_seconds: 180,
            max_ticks_hold: 90,
            max_consecutive_losses: 6,
            suspension_minutes: 30,
            just_entered_seconds: 3,
            dynamic_stop_min_ticks: 3,
            dynamic_stop_multiplier: 2.0,
            dynamic_stop_fallback: 20.0,
            take_profit_multiplier: 2.0,
            take_profit_cost: 21.0,
            take_profit_cushion: 6.0,
            take_profit_fallback: 40.0,
            hold_profit_floor: 15.0,
            recent_price_window: 30,
        }
    }
}

impl RiskConfig {
    pub fn cooldown_ms(&self) -> u64 {
        self.cooldown_seconds.saturating_mul(1_000)
    }

    pub fn hard_time_ms(&self) -> u64 {
        self.hard_time_seconds.saturating_mul(1_000)
    }

    pub fn suspension_ms(&self) -> u64 {
        self.suspension_minutes.saturating_mul(60_000)
    }

    pub fn just_entered_ms(&self) -> u64 {
        self.just_entered_seconds.saturating_mul(1_000)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// `auto`, or a fixed `bullish` / `bearish` / `neutral` bias.
    pub market_bias: BiasMode,
}

/// Presence flags for the optional position capabilities.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ExtensionFlags {
    pub lock_profit: bool,
    pub add_to_position: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub trade_log_path: PathBuf,
    pub tick_db_path: PathBuf,
    pub params_path: Option<PathBuf>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            trade_log_path: PathBuf::from("data/trade_log.csv"),
            tick_db_path: PathBuf::from("data/tick_record.sqlite"),
            params_path: None,
        }
    }
}

impl Config {
    /// Load from `$TICK_ENGINE_CONFIG`, falling back to `config/default.toml`.
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();
        let path = std::env::var(CONFIG_PATH_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH));
        Self::load_from_path(&path)
    }

    pub fn load_from_path(path: &Path) -> Result<Self> {
        let config_str = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let config: Config = toml::from_str(&config_str)
            .with_context(|| format!("failed to parse {}", path.display()))?;
        config
            .validate()
            .with_context(|| format!("invalid configuration in {}", path.display()))?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), AppError> {
        let risk = &self.risk;
        if risk.hard_stoploss <= 0.0 {
            return Err(AppError::Config("risk.hard_stoploss must be > 0".to_string()));
        }
        if risk.max_ticks_hold == 0 {
            return Err(AppError::Config("risk.max_ticks_hold must be > 0".to_string()));
        }
        if risk.max_consecutive_losses == 0 {
            return Err(AppError::Config(
                "risk.max_consecutive_losses must be > 0".to_string(),
            ));
        }
        if risk.recent_price_window == 0 {
            return Err(AppError::Config(
                "risk.recent_price_window must be > 0".to_string(),
            ));
        }
        if risk.dynamic_stop_multiplier <= 0.0 || risk.take_profit_multiplier <= 0.0 {
            return Err(AppError::Config(
                "risk stop/target multipliers must be > 0".to_string(),
            ));
        }
        if self.decision.momentum_abs_min < 0.0 {
            return Err(AppError::Config(
                "decision.momentum_abs_min must be >= 0".to_string(),
            ));
        }
        Ok(())
    }
}
