use serde::Deserialize;

/// One market event as delivered by the tick source.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct Tick {
    pub timestamp_ms: u64,
    pub price: f64,
    #[serde(default)]
    pub volume: f64,
}

impl Tick {
    pub fn new(timestamp_ms: u64, price: f64, volume: f64) -> Self {
        Self {
            timestamp_ms,
            price,
            volume,
        }
    }
}
