use proptest::prelude::*;
use tick_engine::indicator::{
    compute_all, compute_all_with_prev_kd, BandSignal, IndicatorSnapshot, KD_NEUTRAL,
};

fn series(prices: &[f64]) -> (Vec<f64>, Vec<f64>, Vec<f64>, Vec<f64>) {
    (prices.to_vec(), prices.to_vec(), prices.to_vec(), vec![5.0; prices.len()])
}

#[test]
fn empty_history_is_fully_neutral() {
    let snap = compute_all(&[], &[], &[], &[]);
    assert_eq!(snap, IndicatorSnapshot::default());
    assert_eq!(snap.rsi, 50.0);
    assert_eq!(snap.kd_k, KD_NEUTRAL);
    assert_eq!(snap.bband_signal, BandSignal::Neutral);
}

#[test]
fn steady_climb_reads_as_strong_trend() {
    let prices: Vec<f64> = (0..40).map(|i| 100.0 + i as f64).collect();
    let (c, h, l, v) = series(&prices);
    let snap = compute_all(&c, &h, &l, &v);
    assert_eq!(snap.rsi, 100.0);
    assert_eq!(snap.adx, 100.0);
    assert_eq!(snap.atr, 1.0);
    assert!(snap.ema5 > snap.ema20);
    assert!(snap.macd > 0.0);
    assert!(snap.macd_hist.abs() < 0.011);
    assert_eq!(snap.vwap, 119.5);
    assert_eq!(snap.close, 139.0);
}

#[test]
fn flat_tape_has_zero_volatility() {
    let (c, h, l, v) = series(&[250.0; 40]);
    let snap = compute_all(&c, &h, &l, &v);
    assert_eq!(snap.atr, 0.0);
    assert_eq!(snap.adx, 0.0);
    assert_eq!(snap.macd, 0.0);
    assert_eq!(snap.bband_upper, snap.bband_lower);
    assert_eq!(snap.bband_signal, BandSignal::Neutral);
}

#[test]
fn previous_kd_seeds_smoothing() {
    let prices: Vec<f64> = (0..12).map(|i| 100.0 + (i % 3) as f64).collect();
    let (c, h, l, v) = series(&prices);
    let neutral = compute_all(&c, &h, &l, &v);
    let seeded = compute_all_with_prev_kd(&c, &h, &l, &v, 90.0, 90.0);
    assert!(seeded.kd_k > neutral.kd_k);
    assert!(seeded.kd_d > neutral.kd_d);
}

proptest! {
    #[test]
    fn short_histories_return_neutral_defaults(
        prices in proptest::collection::vec(1.0f64..1_000.0, 0..9)
    ) {
        let (c, h, l, v) = series(&prices);
        let snap = compute_all(&c, &h, &l, &v);
        prop_assert_eq!(snap.rsi, 50.0);
        prop_assert_eq!(snap.macd, 0.0);
        prop_assert_eq!(snap.macd_signal, 0.0);
        prop_assert_eq!(snap.kd_k, KD_NEUTRAL);
        prop_assert_eq!(snap.kd_d, KD_NEUTRAL);
        prop_assert_eq!(snap.atr, 0.0);
        prop_assert_eq!(snap.adx, 0.0);
        prop_assert_eq!(snap.bband_signal, BandSignal::Neutral);
    }

    #[test]
    fn rsi_and_kd_stay_in_range(
        prices in proptest::collection::vec(1.0f64..1_000.0, 0..80)
    ) {
        let (c, h, l, v) = series(&prices);
        let snap = compute_all(&c, &h, &l, &v);
        prop_assert!((0.0..=100.0).contains(&snap.rsi));
        prop_assert!((0.0..=100.0).contains(&snap.kd_k));
        prop_assert!((0.0..=100.0).contains(&snap.kd_d));
        prop_assert!(snap.atr >= 0.0);
        prop_assert!(snap.adx >= 0.0 && snap.adx <= 100.0);
    }
}
