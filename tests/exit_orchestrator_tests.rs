use tick_engine::config::{ExtensionFlags, RiskConfig};
use tick_engine::indicator::IndicatorSnapshot;
use tick_engine::lifecycle::{
    ExitContext, ExitOrchestrator, ExitTrigger, NoExtension, PositionDecision, PositionExtension,
    StrategyState,
};
use tick_engine::model::signal::{Bias, Direction, TradeAction};
use tick_engine::model::snapshot::{EnrichedTick, PatternSignals, PositionMetrics, TimeframeSnapshot};
use tick_engine::model::tick::Tick;

const T0: u64 = 1_700_000_000_000;
const SETTLED: u64 = T0 + 5_000;

struct Scripted {
    lock: bool,
    add: bool,
    lock_calls: u32,
}

impl Scripted {
    fn new(lock: bool, add: bool) -> Self {
        Self {
            lock,
            add,
            lock_calls: 0,
        }
    }
}

impl PositionExtension for Scripted {
    fn should_lock_profit(&mut self, _state: &StrategyState, _tick: &EnrichedTick, _price: f64) -> bool {
        self.lock_calls += 1;
        self.lock
    }

    fn should_add(&mut self, _state: &StrategyState, _tick: &EnrichedTick, _price: f64) -> bool {
        self.add
    }
}

fn enriched(price: f64) -> EnrichedTick {
    EnrichedTick {
        tick: Tick::new(SETTLED, price, 0.0),
        indicators: IndicatorSnapshot::default(),
        timeframes: TimeframeSnapshot::default(),
        patterns: PatternSignals::default(),
        position: PositionMetrics::default(),
        bias: Bias::Neutral,
        entry_score: 0,
    }
}

fn open_long(prices: &[f64]) -> StrategyState {
    let mut state = StrategyState::new(RiskConfig::default());
    state.enter(Direction::Long, 100.0, T0).unwrap();
    for p in prices {
        state.update_profit_loss(*p);
    }
    state
}

fn decide(
    state: &StrategyState,
    ext: &mut dyn PositionExtension,
    price: f64,
    atr: f64,
    now_ms: u64,
    extensions: ExtensionFlags,
) -> PositionDecision {
    let tick = enriched(price);
    let ctx = ExitContext {
        price,
        atr,
        now_ms,
        tick: &tick,
        extensions,
    };
    ExitOrchestrator::evaluate(state, ext, &ctx)
}

fn plain(state: &StrategyState, price: f64, atr: f64, now_ms: u64) -> PositionDecision {
    decide(state, &mut NoExtension, price, atr, now_ms, ExtensionFlags::default())
}

#[test]
fn flat_state_always_holds() {
    let state = StrategyState::new(RiskConfig::default());
    assert_eq!(plain(&state, 0.0, 0.0, SETTLED), PositionDecision::Hold);
}

#[test]
fn just_entered_position_ignores_every_trigger() {
    let state = open_long(&[50.0]);
    assert_eq!(plain(&state, 50.0, 0.0, T0 + 2_000), PositionDecision::Hold);
    assert_eq!(
        plain(&state, 50.0, 0.0, T0 + 3_000),
        PositionDecision::Exit(ExitTrigger::HardStopLoss)
    );
}

#[test]
fn hard_stop_outranks_take_profit() {
    let state = open_long(&[200.0, 55.0]);
    assert!(state.should_takeprofit(0.0));
    assert_eq!(
        plain(&state, 55.0, 0.0, SETTLED),
        PositionDecision::Exit(ExitTrigger::HardStopLoss)
    );
}

#[test]
fn dynamic_stop_outranks_take_profit() {
    let state = open_long(&[130.0, 95.0, 79.0]);
    assert!(state.should_takeprofit(10.0));
    assert_eq!(
        plain(&state, 90.0, 10.0, SETTLED),
        PositionDecision::Exit(ExitTrigger::DynamicStopLoss)
    );
}

#[test]
fn take_profit_fires_on_peak_profit() {
    let state = open_long(&[110.0, 120.0, 130.0]);
    let decision = plain(&state, 130.0, 10.0, SETTLED);
    assert_eq!(decision, PositionDecision::Exit(ExitTrigger::TakeProfit));
}

#[test]
fn lock_profit_only_consulted_when_flagged() {
    let state = open_long(&[105.0]);
    let mut ext = Scripted::new(true, false);

    let off = decide(&state, &mut ext, 105.0, 0.0, SETTLED, ExtensionFlags::default());
    assert_eq!(off, PositionDecision::Hold);
    assert_eq!(ext.lock_calls, 0);

    let flags = ExtensionFlags {
        lock_profit: true,
        add_to_position: false,
    };
    let on = decide(&state, &mut ext, 105.0, 0.0, SETTLED, flags);
    assert_eq!(on, PositionDecision::Exit(ExitTrigger::LockProfit));
    assert_eq!(ext.lock_calls, 1);
}

#[test]
fn lock_profit_is_checked_after_take_profit() {
    let state = open_long(&[140.0]);
    let mut ext = Scripted::new(true, false);
    let flags = ExtensionFlags {
        lock_profit: true,
        add_to_position: false,
    };
    let decision = decide(&state, &mut ext, 140.0, 0.0, SETTLED, flags);
    assert_eq!(decision, PositionDecision::Exit(ExitTrigger::TakeProfit));
    assert_eq!(ext.lock_calls, 0);
}

#[test]
fn tick_limit_exits_stale_position() {
    let state = open_long(&vec![100.0; 90]);
    assert_eq!(
        plain(&state, 100.0, 0.0, SETTLED),
        PositionDecision::Exit(ExitTrigger::TickLimit)
    );
}

#[test]
fn hold_refused_after_hard_time() {
    let state = open_long(&[101.0, 102.0]);
    assert_eq!(plain(&state, 102.0, 0.0, SETTLED), PositionDecision::Hold);
    assert_eq!(
        plain(&state, 102.0, 0.0, T0 + 180_000),
        PositionDecision::Exit(ExitTrigger::HoldRefused)
    );
}

#[test]
fn add_requires_flag_and_extension() {
    let state = open_long(&[103.0]);
    let flags = ExtensionFlags {
        lock_profit: false,
        add_to_position: true,
    };

    let mut never = Scripted::new(false, false);
    assert_eq!(decide(&state, &mut never, 103.0, 0.0, SETTLED, flags), PositionDecision::Hold);

    let mut eager = Scripted::new(false, true);
    assert_eq!(decide(&state, &mut eager, 103.0, 0.0, SETTLED, flags), PositionDecision::Add);
    assert_eq!(
        decide(&state, &mut eager, 103.0, 0.0, SETTLED, ExtensionFlags::default()),
        PositionDecision::Hold
    );
}

#[test]
fn triggers_map_to_actions_and_reason_codes() {
    assert_eq!(ExitTrigger::HardStopLoss.action(), TradeAction::StopLoss);
    assert_eq!(ExitTrigger::DynamicStopLoss.action(), TradeAction::StopLoss);
    assert_eq!(ExitTrigger::TakeProfit.action(), TradeAction::TakeProfit);
    assert_eq!(ExitTrigger::LockProfit.action(), TradeAction::LockProfit);
    assert_eq!(ExitTrigger::TickLimit.action(), TradeAction::TimeExit);
    assert_eq!(ExitTrigger::HoldRefused.action(), TradeAction::Exit);

    assert_eq!(
        ExitOrchestrator::reason_code(ExitTrigger::HardStopLoss),
        "exit.hard_stop_loss"
    );
    assert_eq!(
        ExitOrchestrator::reason_code(ExitTrigger::TickLimit),
        "exit.max_holding_ticks"
    );
    assert_eq!(
        ExitOrchestrator::reason_code(ExitTrigger::HoldRefused),
        "exit.hold_refused"
    );
}
