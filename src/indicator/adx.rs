use super::atr::true_range;
use super::round_to;

/// Directional index over the last `period` bars.
///
/// This is a single-period DX from summed +DM/-DM against summed true range.
/// It is not Wilder-smoothed into a true ADX.
pub fn adx(highs: &[f64], lows: &[f64], closes: &[f64], period: usize) -> f64 {
    let needed = period + 1;
    if period == 0 || highs.len() < needed || lows.len() < needed || closes.len() < needed {
        return 0.0;
    }
    let (h, l, c) = (highs.len(), lows.len(), closes.len());
    let mut plus_dm = 0.0;
    let mut minus_dm = 0.0;
    let mut tr_sum = 0.0;
    for i in 1..=period {
        let up_move = highs[h - i] - highs[h - i - 1];
        let down_move = lows[l - i - 1] - lows[l - i];
        if up_move > down_move && up_move > 0.0 {
            plus_dm += up_move;
        }
        if down_move > up_move && down_move > 0.0 {
            minus_dm += down_move;
        }
        tr_sum += true_range(highs[h - i], lows[l - i], closes[c - i - 1]);
    }
    if tr_sum == 0.0 {
        return 0.0;
    }
    let plus_di = 100.0 * plus_dm / tr_sum;
    let minus_di = 100.0 * minus_dm / tr_sum;
    let di_sum = plus_di + minus_di;
    if di_sum == 0.0 {
        return 0.0;
    }
    round_to((plus_di - minus_di).abs() / di_sum * 100.0, 2)
}
