use std::fmt;

use super::round_to;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BandSignal {
    #[default]
    Neutral,
    BreakUp,
    BreakDown,
}

impl BandSignal {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Neutral => "Neutral",
            Self::BreakUp => "BreakUp",
            Self::BreakDown => "BreakDown",
        }
    }
}

impl fmt::Display for BandSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Bollinger {
    pub upper: f64,
    pub middle: f64,
    pub lower: f64,
    pub signal: BandSignal,
}

/// Mean +/- `std_factor` population standard deviations over the last `period` closes.
pub fn bollinger(closes: &[f64], period: usize, std_factor: f64) -> Bollinger {
    if period == 0 || closes.len() < period {
        return Bollinger::default();
    }
    let recent = &closes[closes.len() - period..];
    let mean = recent.iter().sum::<f64>() / period as f64;
    let variance = recent.iter().map(|c| (c - mean).powi(2)).sum::<f64>() / period as f64;
    let std = variance.sqrt();
    let upper = mean + std_factor * std;
    let lower = mean - std_factor * std;
    let close = recent[period - 1];
    let signal = if close > upper {
        BandSignal::BreakUp
    } else if close < lower {
        BandSignal::BreakDown
    } else {
        BandSignal::Neutral
    };
    Bollinger {
        upper: round_to(upper, 2),
        middle: round_to(mean, 2),
        lower: round_to(lower, 2),
        signal,
    }
}
