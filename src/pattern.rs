use std::collections::VecDeque;

use crate::model::snapshot::PatternSignals;

pub const PATTERN_HISTORY_CAP: usize = 50;
/// Minimum drop between the two prior prices to count as a sharp drop.
pub const SHARP_DROP_MIN: f64 = 10.0;

/// Short-window price pattern detector over the latest ticks.
#[derive(Debug, Clone, Default)]
pub struct TickPatternTracker {
    prices: VecDeque<f64>,
}

impl TickPatternTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(&mut self, price: f64) {
        self.prices.push_back(price);
        while self.prices.len() > PATTERN_HISTORY_CAP {
            let _ = self.prices.pop_front();
        }
    }

    pub fn len(&self) -> usize {
        self.prices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }

    /// `n`-th price from the end, 1-based.
    fn back(&self, n: usize) -> Option<f64> {
        self.prices
            .len()
            .checked_sub(n)
            .and_then(|idx| self.prices.get(idx).copied())
    }

    pub fn momentum(&self) -> f64 {
        match (self.back(1), self.back(2)) {
            (Some(last), Some(prev)) => last - prev,
            _ => 0.0,
        }
    }

    pub fn direction_score(&self) -> i32 {
        match (self.back(1), self.back(3)) {
            (Some(last), Some(third)) if last > third => 1,
            (Some(_), Some(_)) => -1,
            _ => 0,
        }
    }

    pub fn is_three_up(&self) -> bool {
        match (self.back(3), self.back(2), self.back(1)) {
            (Some(a), Some(b), Some(c)) => a < b && b < c,
            _ => false,
        }
    }

    pub fn is_sharp_drop_rebound(&self) -> bool {
        match (self.back(3), self.back(2), self.back(1)) {
            (Some(a), Some(b), Some(c)) => a - b > SHARP_DROP_MIN && c > b,
            _ => false,
        }
    }

    pub fn signals(&self) -> PatternSignals {
        PatternSignals {
            momentum: self.momentum(),
            direction_score: self.direction_score(),
            three_up: self.is_three_up(),
            sharp_drop_rebound: self.is_sharp_drop_rebound(),
        }
    }
}
