use super::round_to;

/// Relative strength over the last `period` deltas.
///
/// Needs `period + 1` closes, otherwise 50. A window with no losses reads 100.
pub fn rsi(closes: &[f64], period: usize) -> f64 {
    if period == 0 || closes.len() < period + 1 {
        return 50.0;
    }
    let window = &closes[closes.len() - (period + 1)..];
    let (gains, losses) = window.windows(2).fold((0.0, 0.0), |(g, l), pair| {
        let delta = pair[1] - pair[0];
        if delta > 0.0 {
            (g + delta, l)
        } else {
            (g, l - delta)
        }
    });
    let avg_gain = gains / period as f64;
    let avg_loss = losses / period as f64;
    if avg_loss == 0.0 {
        return 100.0;
    }
    let rs = avg_gain / avg_loss;
    round_to(100.0 - 100.0 / (1.0 + rs), 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insufficient_history_is_neutral() {
        let closes: Vec<f64> = (0..14).map(|i| i as f64).collect();
        assert!((rsi(&closes, 14) - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn balanced_moves_read_fifty() {
        assert!((rsi(&[1.0, 2.0, 1.0], 2) - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn gain_twice_loss_reads_two_thirds() {
        assert!((rsi(&[1.0, 3.0, 2.0], 2) - 66.7).abs() < 1e-9);
    }

    #[test]
    fn no_losses_reads_hundred() {
        let closes: Vec<f64> = (0..20).map(|i| 100.0 + i as f64).collect();
        assert!((rsi(&closes, 14) - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn only_latest_window_counts() {
        // an early crash falls outside the window
        let mut closes = vec![200.0, 100.0];
        closes.extend([1.0, 3.0, 2.0]);
        assert!((rsi(&closes, 2) - 66.7).abs() < 1e-9);
    }
}
