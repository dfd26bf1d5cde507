use super::round_to;

/// Volume-weighted average of every provided close. Not bounded to a session.
pub fn vwap(closes: &[f64], volumes: &[f64]) -> f64 {
    if closes.is_empty() || closes.len() != volumes.len() {
        return 0.0;
    }
    let total_volume: f64 = volumes.iter().sum();
    if total_volume <= 0.0 {
        return 0.0;
    }
    let pv: f64 = closes.iter().zip(volumes).map(|(p, v)| p * v).sum();
    round_to(pv / total_volume, 2)
}
