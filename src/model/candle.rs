use serde::Deserialize;

/// Historical bar used to prime the session bias before the tick stream starts.
#[derive(Debug, Clone, Deserialize)]
pub struct Candle {
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    #[serde(default)]
    pub volume: f64,
    pub open_time: u64,
}

impl Candle {
    pub fn is_bullish(&self) -> bool {
        self.close >= self.open
    }
}
