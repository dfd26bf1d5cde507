use super::round_to;

/// Exponential smoothing over the whole slice, seeded by its oldest value.
///
/// Returns the latest price while fewer than `period` values exist and 0 for
/// an empty slice.
pub fn ema(prices: &[f64], period: usize) -> f64 {
    let Some(&last) = prices.last() else {
        return 0.0;
    };
    if prices.len() < period {
        return last;
    }
    round_to(smooth(prices, period), 2)
}

/// Unrounded smoothing helper shared with MACD. `prices` must not be empty.
pub(crate) fn smooth(prices: &[f64], period: usize) -> f64 {
    let alpha = 2.0 / (period as f64 + 1.0);
    prices[1..]
        .iter()
        .fold(prices[0], |acc, p| alpha * p + (1.0 - alpha) * acc)
}

/// Streaming EMA seeded by its first sample, used over bar series.
#[derive(Debug, Clone)]
pub struct EmaTracker {
    period: usize,
    alpha: f64,
    value: Option<f64>,
    samples: usize,
}

impl EmaTracker {
    pub fn new(period: usize) -> Self {
        assert!(period > 0, "EMA period must be > 0");
        Self {
            period,
            alpha: 2.0 / (period as f64 + 1.0),
            value: None,
            samples: 0,
        }
    }

    /// Push a new value and return the updated average.
    pub fn push(&mut self, value: f64) -> f64 {
        let next = match self.value {
            Some(prev) => self.alpha * value + (1.0 - self.alpha) * prev,
            None => value,
        };
        self.value = Some(next);
        self.samples += 1;
        next
    }

    pub fn value(&self) -> Option<f64> {
        self.value
    }

    /// True once at least `period` samples have been pushed.
    pub fn is_ready(&self) -> bool {
        self.samples >= self.period
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_slice_reads_zero() {
        assert_eq!(ema(&[], 5), 0.0);
    }

    #[test]
    fn short_slice_returns_last_price() {
        assert!((ema(&[3.0, 7.5], 5) - 7.5).abs() < f64::EPSILON);
    }

    #[test]
    fn smoothing_seeds_from_oldest_value() {
        // alpha = 0.5: 1 -> 1.5 -> 2.25
        assert!((ema(&[1.0, 2.0, 3.0], 3) - 2.25).abs() < 1e-12);
    }

    #[test]
    fn tracker_matches_windowed_smoothing() {
        let prices = [10.0, 11.0, 9.5, 12.0, 12.5, 13.0];
        let mut tracker = EmaTracker::new(3);
        let mut last = 0.0;
        for p in prices {
            last = tracker.push(p);
        }
        assert!(tracker.is_ready());
        assert!((last - smooth(&prices, 3)).abs() < 1e-12);
    }

    #[test]
    fn tracker_is_not_ready_before_period() {
        let mut tracker = EmaTracker::new(4);
        assert_eq!(tracker.value(), None);
        tracker.push(1.0);
        tracker.push(2.0);
        assert!(!tracker.is_ready());
        assert!(tracker.value().is_some());
    }

    #[test]
    #[should_panic(expected = "EMA period must be > 0")]
    fn zero_period_panics() {
        EmaTracker::new(0);
    }
}
