use super::ema::smooth;
use super::round_to;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Macd {
    pub line: f64,
    pub signal: f64,
    pub histogram: f64,
}

/// MACD from EMAs over the latest `fast` and `slow` closes.
///
/// The signal line smooths the current MACD value repeated `signal + 1` times
/// rather than a rolling MACD history, so it tracks the line almost exactly
/// and the histogram stays near zero. This differs from textbook MACD and is
/// kept for parity with recorded sessions.
pub fn macd(closes: &[f64], fast: usize, slow: usize, signal: usize) -> Macd {
    if fast == 0 || slow == 0 || closes.len() < slow + signal {
        return Macd::default();
    }
    let fast_ema = smooth(&closes[closes.len() - fast..], fast);
    let slow_ema = smooth(&closes[closes.len() - slow..], slow);
    let line = fast_ema - slow_ema;
    let seeded = vec![line; signal + 1];
    let signal_line = smooth(&seeded, signal);
    Macd {
        line: round_to(line, 2),
        signal: round_to(signal_line, 2),
        histogram: round_to(line - signal_line, 2),
    }
}
