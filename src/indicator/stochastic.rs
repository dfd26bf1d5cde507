use super::{round_to, KD_NEUTRAL};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stochastic {
    pub k: f64,
    pub d: f64,
}

/// Stochastic K/D with 2/3-1/3 smoothing against the previous K and D.
///
/// The caller carries `prev_k`/`prev_d` across ticks; [`KD_NEUTRAL`] is the
/// seed when nothing has been carried yet.
pub fn kd(
    closes: &[f64],
    highs: &[f64],
    lows: &[f64],
    period: usize,
    prev_k: f64,
    prev_d: f64,
) -> Stochastic {
    if period == 0 || closes.len() < period || highs.len() < period || lows.len() < period {
        return Stochastic {
            k: KD_NEUTRAL,
            d: KD_NEUTRAL,
        };
    }
    let low_min = lows[lows.len() - period..]
        .iter()
        .fold(f64::MAX, |acc, v| acc.min(*v));
    let high_max = highs[highs.len() - period..]
        .iter()
        .fold(f64::MIN, |acc, v| acc.max(*v));
    let close = closes[closes.len() - 1];
    let rsv = if high_max != low_min {
        (close - low_min) / (high_max - low_min) * 100.0
    } else {
        50.0
    };
    let k = (2.0 / 3.0) * prev_k + (1.0 / 3.0) * rsv;
    let d = (2.0 / 3.0) * prev_d + (1.0 / 3.0) * k;
    Stochastic {
        k: round_to(k, 1),
        d: round_to(d, 1),
    }
}
