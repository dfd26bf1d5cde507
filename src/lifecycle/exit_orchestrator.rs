use crate::config::ExtensionFlags;
use crate::lifecycle::extension::PositionExtension;
use crate::lifecycle::state::StrategyState;
use crate::model::signal::TradeAction;
use crate::model::snapshot::EnrichedTick;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitTrigger {
    HardStopLoss,
    DynamicStopLoss,
    TakeProfit,
    LockProfit,
    TickLimit,
    HoldRefused,
}

impl ExitTrigger {
    pub fn action(self) -> TradeAction {
        match self {
            Self::HardStopLoss | Self::DynamicStopLoss => TradeAction::StopLoss,
            Self::TakeProfit => TradeAction::TakeProfit,
            Self::LockProfit => TradeAction::LockProfit,
            Self::TickLimit => TradeAction::TimeExit,
            Self::HoldRefused => TradeAction::Exit,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PositionDecision {
    Hold,
    Exit(ExitTrigger),
    Add,
}

/// Per-tick inputs to exit evaluation.
#[derive(Debug, Clone, Copy)]
pub struct ExitContext<'a> {
    pub price: f64,
    pub atr: f64,
    pub now_ms: u64,
    pub tick: &'a EnrichedTick,
    pub extensions: ExtensionFlags,
}

pub struct ExitOrchestrator;

impl ExitOrchestrator {
    /// Evaluate the exit chain in priority order; the first match wins.
    ///
    /// Flat states and positions younger than the just-entered window hold.
    pub fn evaluate(
        state: &StrategyState,
        extension: &mut dyn PositionExtension,
        ctx: &ExitContext<'_>,
    ) -> PositionDecision {
        if !state.in_position() || state.just_entered(ctx.now_ms) {
            return PositionDecision::Hold;
        }
        if state.is_hard_stop(ctx.price) {
            return PositionDecision::Exit(ExitTrigger::HardStopLoss);
        }
        if state.is_dynamic_stop(ctx.atr) {
            return PositionDecision::Exit(ExitTrigger::DynamicStopLoss);
        }
        if state.should_takeprofit(ctx.atr) {
            return PositionDecision::Exit(ExitTrigger::TakeProfit);
        }
        if ctx.extensions.lock_profit && extension.should_lock_profit(state, ctx.tick, ctx.price) {
            return PositionDecision::Exit(ExitTrigger::LockProfit);
        }
        if state.should_exit_by_tick() {
            return PositionDecision::Exit(ExitTrigger::TickLimit);
        }
        if !state.should_hold(ctx.now_ms) {
            return PositionDecision::Exit(ExitTrigger::HoldRefused);
        }
        if ctx.extensions.add_to_position && extension.should_add(state, ctx.tick, ctx.price) {
            return PositionDecision::Add;
        }
        PositionDecision::Hold
    }

    pub fn reason_code(trigger: ExitTrigger) -> &'static str {
        match trigger {
            ExitTrigger::HardStopLoss => "exit.hard_stop_loss",
            ExitTrigger::DynamicStopLoss => "exit.dynamic_stop_loss",
            ExitTrigger::TakeProfit => "exit.take_profit",
            ExitTrigger::LockProfit => "exit.lock_profit",
            ExitTrigger::TickLimit => "exit.max_holding_ticks",
            ExitTrigger::HoldRefused => "exit.hold_refused",
        }
    }
}
