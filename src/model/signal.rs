use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

/// Classified market regime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Bias {
    #[default]
    Neutral,
    Bullish,
    Bearish,
}

impl Bias {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Neutral => "neutral",
            Self::Bullish => "bullish",
            Self::Bearish => "bearish",
        }
    }
}

impl fmt::Display for Bias {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Bias {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "neutral" => Ok(Self::Neutral),
            "bullish" => Ok(Self::Bullish),
            "bearish" => Ok(Self::Bearish),
            other => Err(format!("unknown bias '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Long,
    Short,
}

impl Direction {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Long => "long",
            Self::Short => "short",
        }
    }

    /// Signed P/L of holding this direction from `entry` to `price`.
    pub fn pnl(self, entry: f64, price: f64) -> f64 {
        match self {
            Self::Long => price - entry,
            Self::Short => entry - price,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Actions reported to the trade logger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TradeAction {
    Enter,
    StopLoss,
    TakeProfit,
    LockProfit,
    TimeExit,
    Exit,
    Add,
}

impl TradeAction {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Enter => "ENTER",
            Self::StopLoss => "STOPLOSS",
            Self::TakeProfit => "TAKEPROFIT",
            Self::LockProfit => "LOCK_PROFIT",
            Self::TimeExit => "TIME_EXIT",
            Self::Exit => "EXIT",
            Self::Add => "ADD",
        }
    }
}

impl fmt::Display for TradeAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
