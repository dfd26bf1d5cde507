use crate::lifecycle::state::StrategyState;
use crate::model::snapshot::EnrichedTick;

/// Optional position capabilities consulted by the exit orchestrator.
///
/// Each method is only called when its `[extensions]` flag is set, so an
/// implementation may override just the capability it provides.
pub trait PositionExtension {
    /// Close the position early to protect open profit.
    fn should_lock_profit(&mut self, _state: &StrategyState, _tick: &EnrichedTick, _price: f64) -> bool {
        false
    }

    /// Grow the open position by one unit.
    fn should_add(&mut self, _state: &StrategyState, _tick: &EnrichedTick, _price: f64) -> bool {
        false
    }
}

/// Provides no capabilities.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoExtension;

impl PositionExtension for NoExtension {}
