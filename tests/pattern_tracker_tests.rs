use tick_engine::pattern::{TickPatternTracker, PATTERN_HISTORY_CAP};

fn tracker_with(prices: &[f64]) -> TickPatternTracker {
    let mut tracker = TickPatternTracker::new();
    for p in prices {
        tracker.update(*p);
    }
    tracker
}

#[test]
fn empty_tracker_reports_neutral_signals() {
    let tracker = TickPatternTracker::new();
    assert_eq!(tracker.momentum(), 0.0);
    assert_eq!(tracker.direction_score(), 0);
    assert!(!tracker.is_three_up());
    assert!(!tracker.is_sharp_drop_rebound());
}

#[test]
fn momentum_is_last_minus_previous() {
    let tracker = tracker_with(&[100.0, 104.0, 101.0]);
    assert!((tracker.momentum() + 3.0).abs() < f64::EPSILON);
}

#[test]
/// Verifies direction scoring needs three samples and compares against the
/// third-to-last price only.
fn direction_score_compares_with_third_to_last() {
    assert_eq!(tracker_with(&[100.0, 101.0]).direction_score(), 0);
    assert_eq!(tracker_with(&[100.0, 90.0, 101.0]).direction_score(), 1);
    assert_eq!(tracker_with(&[100.0, 110.0, 100.0]).direction_score(), -1);
    assert_eq!(tracker_with(&[100.0, 120.0, 99.0]).direction_score(), -1);
}

#[test]
fn three_up_requires_strict_increase() {
    assert!(tracker_with(&[1.0, 2.0, 3.0]).is_three_up());
    assert!(!tracker_with(&[1.0, 2.0, 2.0]).is_three_up());
    assert!(!tracker_with(&[3.0, 2.0, 4.0]).is_three_up());
}

#[test]
fn sharp_drop_rebound_needs_drop_over_ten_and_bounce() {
    assert!(tracker_with(&[120.0, 105.0, 106.0]).is_sharp_drop_rebound());
    // drop of exactly ten is not sharp
    assert!(!tracker_with(&[115.0, 105.0, 106.0]).is_sharp_drop_rebound());
    // no rebound
    assert!(!tracker_with(&[120.0, 105.0, 104.0]).is_sharp_drop_rebound());
}

#[test]
fn history_is_capped_with_fifo_eviction() {
    let prices: Vec<f64> = (0..80).map(|i| i as f64).collect();
    let tracker = tracker_with(&prices);
    assert_eq!(tracker.len(), PATTERN_HISTORY_CAP);
    assert!((tracker.momentum() - 1.0).abs() < f64::EPSILON);
    assert!(tracker.is_three_up());
}

#[test]
fn signals_bundle_matches_accessors() {
    let tracker = tracker_with(&[120.0, 105.0, 110.0]);
    let signals = tracker.signals();
    assert!((signals.momentum - 5.0).abs() < f64::EPSILON);
    assert_eq!(signals.direction_score, -1);
    assert!(!signals.three_up);
    assert!(signals.sharp_drop_rebound);
}
