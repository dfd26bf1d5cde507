use std::collections::VecDeque;

use crate::config::RiskConfig;
use crate::model::signal::Direction;

/// Why an entry request was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryBlock {
    AlreadyInPosition,
    Suspended,
    Cooldown,
}

impl EntryBlock {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::AlreadyInPosition => "entry.already_in_position",
            Self::Suspended => "entry.loss_streak_suspended",
            Self::Cooldown => "entry.cooldown",
        }
    }
}

#[derive(Debug, Clone)]
struct OpenPosition {
    direction: Direction,
    entry_price: f64,
    entry_time_ms: u64,
    max_profit: f64,
    max_loss: f64,
    recent_prices: VecDeque<f64>,
    tick_since_entry: u32,
    size: u32,
}

impl OpenPosition {
    fn new(direction: Direction, entry_price: f64, entry_time_ms: u64) -> Self {
        Self {
            direction,
            entry_price,
            entry_time_ms,
            max_profit: 0.0,
            max_loss: 0.0,
            recent_prices: VecDeque::new(),
            tick_since_entry: 0,
            size: 1,
        }
    }

    fn pnl(&self, price: f64) -> f64 {
        self.direction.pnl(self.entry_price, price)
    }
}

/// Point-in-time view of the position handed to the trade logger.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PositionStatus {
    pub in_position: bool,
    pub direction: Option<Direction>,
    pub entry_price: Option<f64>,
    pub entry_time_ms: Option<u64>,
    pub max_profit: f64,
    pub max_loss: f64,
    pub current_position_size: u32,
    pub tick_since_entry: u32,
}

/// Single-position lifecycle: FLAT <-> IN_POSITION, gated by cooldown and
/// loss-streak suspension.
///
/// Entry fields live inside the open position, so an entry price exists
/// exactly when a position is open. Every time-dependent method takes the
/// caller's `now_ms`.
#[derive(Debug, Clone)]
pub struct StrategyState {
    risk: RiskConfig,
    position: Option<OpenPosition>,
    last_entry_time_ms: Option<u64>,
    consecutive_losses: u32,
    disable_until_ms: Option<u64>,
}

impl StrategyState {
    pub fn new(risk: RiskConfig) -> Self {
        Self {
            risk,
            position: None,
            last_entry_time_ms: None,
            consecutive_losses: 0,
            disable_until_ms: None,
        }
    }

    pub fn risk(&self) -> &RiskConfig {
        &self.risk
    }

    pub fn in_position(&self) -> bool {
        self.position.is_some()
    }

    pub fn direction(&self) -> Option<Direction> {
        self.position.as_ref().map(|p| p.direction)
    }

    pub fn entry_price(&self) -> Option<f64> {
        self.position.as_ref().map(|p| p.entry_price)
    }

    pub fn entry_time_ms(&self) -> Option<u64> {
        self.position.as_ref().map(|p| p.entry_time_ms)
    }

    /// Survives `exit` so the cooldown also spaces out consecutive trades.
    pub fn last_entry_time_ms(&self) -> Option<u64> {
        self.last_entry_time_ms
    }

    pub fn max_profit(&self) -> f64 {
        self.position.as_ref().map_or(0.0, |p| p.max_profit)
    }

    pub fn max_loss(&self) -> f64 {
        self.position.as_ref().map_or(0.0, |p| p.max_loss)
    }

    pub fn tick_since_entry(&self) -> u32 {
        self.position.as_ref().map_or(0, |p| p.tick_since_entry)
    }

    pub fn current_position_size(&self) -> u32 {
        self.position.as_ref().map_or(0, |p| p.size)
    }

    pub fn recent_prices(&self) -> Vec<f64> {
        self.position
            .as_ref()
            .map(|p| p.recent_prices.iter().copied().collect())
            .unwrap_or_default()
    }

    pub fn recent_high(&self) -> f64 {
        self.position
            .as_ref()
            .and_then(|p| p.recent_prices.iter().copied().reduce(f64::max))
            .unwrap_or(0.0)
    }

    pub fn consecutive_losses(&self) -> u32 {
        self.consecutive_losses
    }

    pub fn disable_until_ms(&self) -> Option<u64> {
        self.disable_until_ms
    }

    pub fn is_suspended(&self, now_ms: u64) -> bool {
        self.disable_until_ms.is_some_and(|until| now_ms < until)
    }

    pub fn in_cooldown(&self, now_ms: u64) -> bool {
        self.last_entry_time_ms
            .is_some_and(|last| now_ms.saturating_sub(last) < self.risk.cooldown_ms())
    }

    /// First gate that blocks a new entry at `now_ms`, if any.
    pub fn entry_block(&self, now_ms: u64) -> Option<EntryBlock> {
        if self.in_position() {
            Some(EntryBlock::AlreadyInPosition)
        } else if self.is_suspended(now_ms) {
            Some(EntryBlock::Suspended)
        } else if self.in_cooldown(now_ms) {
            Some(EntryBlock::Cooldown)
        } else {
            None
        }
    }

    pub fn can_enter(&self, now_ms: u64) -> bool {
        self.entry_block(now_ms).is_none()
    }

    /// Open a position of size 1. Refused requests leave the state untouched.
    pub fn enter(&mut self, direction: Direction, price: f64, now_ms: u64) -> Result<(), EntryBlock> {
        if let Some(block) = self.entry_block(now_ms) {
            tracing::debug!(reason = block.as_str(), price, "Entry refused");
            return Err(block);
        }
        self.position = Some(OpenPosition::new(direction, price, now_ms));
        self.last_entry_time_ms = Some(now_ms);
        Ok(())
    }

    /// Track unrealized extrema and the recent-price window. No-op while flat.
    pub fn update_profit_loss(&mut self, price: f64) {
        let window = self.risk.recent_price_window;
        let Some(pos) = self.position.as_mut() else {
            return;
        };
        let profit = pos.pnl(price);
        pos.max_profit = pos.max_profit.max(profit);
        pos.max_loss = pos.max_loss.min(profit);
        pos.recent_prices.push_back(price);
        while pos.recent_prices.len() > window {
            let _ = pos.recent_prices.pop_front();
        }
        pos.tick_since_entry += 1;
    }

    pub fn unrealized_profit(&self, price: f64) -> f64 {
        self.position.as_ref().map_or(0.0, |p| p.pnl(price))
    }

    /// Negative loss threshold sized from ATR, else recent tick moves.
    pub fn dynamic_stoploss(&self, atr: f64) -> f64 {
        let risk = &self.risk;
        if atr > 0.0 {
            return -atr * risk.dynamic_stop_multiplier;
        }
        let Some(pos) = self.position.as_ref() else {
            return -risk.dynamic_stop_fallback;
        };
        if pos.recent_prices.len() < 5 {
            return -risk.dynamic_stop_fallback;
        }
        let moves: Vec<f64> = pos
            .recent_prices
            .iter()
            .zip(pos.recent_prices.iter().skip(1))
            .map(|(a, b)| (b - a).abs())
            .collect();
        let avg_move = moves.iter().sum::<f64>() / moves.len() as f64;
        if avg_move > 0.0 {
            -avg_move * risk.dynamic_stop_multiplier
        } else {
            -risk.dynamic_stop_fallback
        }
    }

    pub fn is_hard_stop(&self, price: f64) -> bool {
        self.in_position() && self.unrealized_profit(price) <= -self.risk.hard_stoploss
    }

    pub fn is_dynamic_stop(&self, atr: f64) -> bool {
        self.in_position()
            && self.tick_since_entry() >= self.risk.dynamic_stop_min_ticks
            && self.max_loss() <= self.dynamic_stoploss(atr)
    }

    pub fn should_stoploss(&self, price: f64, atr: f64) -> bool {
        self.is_hard_stop(price) || self.is_dynamic_stop(atr)
    }

    pub fn take_profit_target(&self, atr: f64) -> f64 {
        let risk = &self.risk;
        if atr > 0.0 {
            (atr * risk.take_profit_multiplier).max(risk.take_profit_cost + risk.take_profit_cushion)
        } else {
            risk.take_profit_fallback
        }
    }

    pub fn should_takeprofit(&self, atr: f64) -> bool {
        self.in_position() && self.max_profit() >= self.take_profit_target(atr)
    }

    pub fn should_exit_by_tick(&self) -> bool {
        self.in_position() && self.tick_since_entry() >= self.risk.max_ticks_hold
    }

    pub fn should_hold(&self, now_ms: u64) -> bool {
        let Some(pos) = self.position.as_ref() else {
            return false;
        };
        let held_ms = now_ms.saturating_sub(pos.entry_time_ms);
        if held_ms >= self.risk.hard_time_ms() {
            return false;
        }
        pos.max_profit > self.risk.hold_profit_floor || pos.tick_since_entry < self.risk.max_ticks_hold
    }

    pub fn just_entered(&self, now_ms: u64) -> bool {
        self.position
            .as_ref()
            .is_some_and(|p| now_ms.saturating_sub(p.entry_time_ms) < self.risk.just_entered_ms())
    }

    /// Grow the open position by one unit. Returns the new size.
    pub fn add_to_position(&mut self) -> Option<u32> {
        let pos = self.position.as_mut()?;
        pos.size += 1;
        Some(pos.size)
    }

    /// Close the position and book its realized P/L. `None` while flat.
    pub fn exit(&mut self, price: f64, now_ms: u64) -> Option<f64> {
        let Some(pos) = self.position.take() else {
            tracing::debug!(price, "Exit requested while flat");
            return None;
        };
        let realized = pos.pnl(price);
        tracing::info!(
            direction = %pos.direction,
            entry_price = pos.entry_price,
            exit_price = price,
            max_profit = pos.max_profit,
            max_loss = pos.max_loss,
            realized,
            "Position closed"
        );
        self.mark_trade_result(realized, now_ms);
        Some(realized)
    }

    /// Update the loss streak. Returns `true` when this result starts a suspension.
    pub fn mark_trade_result(&mut self, realized: f64, now_ms: u64) -> bool {
        if realized > 0.0 {
            self.consecutive_losses = 0;
            return false;
        }
        self.consecutive_losses += 1;
        if self.consecutive_losses < self.risk.max_consecutive_losses {
            return false;
        }
        let until = now_ms.saturating_add(self.risk.suspension_ms());
        self.disable_until_ms = Some(until);
        tracing::warn!(
            consecutive_losses = self.consecutive_losses,
            disable_until_ms = until,
            "Loss streak limit reached, suspending entries"
        );
        true
    }

    pub fn status(&self) -> PositionStatus {
        PositionStatus {
            in_position: self.in_position(),
            direction: self.direction(),
            entry_price: self.entry_price(),
            entry_time_ms: self.entry_time_ms(),
            max_profit: self.max_profit(),
            max_loss: self.max_loss(),
            current_position_size: self.current_position_size(),
            tick_since_entry: self.tick_since_entry(),
        }
    }
}
