use super::round_to;

pub(crate) fn true_range(high: f64, low: f64, prev_close: f64) -> f64 {
    (high - low)
        .max((high - prev_close).abs())
        .max((low - prev_close).abs())
}

/// Mean true range over the last `period` bars. Needs `period + 1` samples.
pub fn atr(highs: &[f64], lows: &[f64], closes: &[f64], period: usize) -> f64 {
    let needed = period + 1;
    if period == 0 || highs.len() < needed || lows.len() < needed || closes.len() < needed {
        return 0.0;
    }
    let (h, l, c) = (highs.len(), lows.len(), closes.len());
    let total: f64 = (1..=period)
        .map(|i| true_range(highs[h - i], lows[l - i], closes[c - i - 1]))
        .sum();
    round_to(total / period as f64, 2)
}
