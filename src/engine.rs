//! Tick orchestrator.
//!
//! Per tick, in order: append to the rolling series, compute indicators and
//! aggregate-timeframe values, update the pattern tracker, update open-position
//! P/L, score the tick, then either try to enter (flat) or run the exit chain
//! (in position). Sink failures are logged and never interrupt processing.

use std::collections::VecDeque;

use crate::clock::Clock;
use crate::config::{Config, ExtensionFlags};
use crate::decision::{DecisionEngine, EntryDecision};
use crate::indicator::{
    self, ema::ema, rsi::rsi, IndicatorSnapshot, KD_NEUTRAL, RSI_PERIOD,
};
use crate::lifecycle::{
    ExitContext, ExitOrchestrator, ExitTrigger, NoExtension, PositionDecision, PositionExtension,
    StrategyState,
};
use crate::model::signal::{Bias, Direction, TradeAction};
use crate::model::snapshot::{
    EnrichedTick, MarketView, PatternSignals, PositionMetrics, TimeframeSnapshot,
};
use crate::model::tick::Tick;
use crate::params_store::ParamsStore;
use crate::pattern::TickPatternTracker;
use crate::sink::{NullSink, TickRecorder, TradeLogger};

/// Full-resolution ticks needed before entries are considered.
pub const READY_TICKS: usize = 30;
pub const TIMEFRAME_CAP: usize = 120;
/// Aggregate samples needed before a timeframe counts as ready.
pub const TIMEFRAME_READY: usize = 20;
pub const FAST_TIMEFRAME_TICKS: usize = 5;
pub const SLOW_TIMEFRAME_TICKS: usize = 15;
pub const FAST_TIMEFRAME_EMA: usize = 5;
pub const SLOW_TIMEFRAME_EMA: usize = 15;

/// Rolling price/volume history owned by one engine.
#[derive(Debug, Clone)]
pub struct RollingSeries {
    closes: Vec<f64>,
    highs: Vec<f64>,
    lows: Vec<f64>,
    volumes: Vec<f64>,
    close_5m: VecDeque<f64>,
    close_15m: VecDeque<f64>,
    prev_k: f64,
    prev_d: f64,
}

impl Default for RollingSeries {
    fn default() -> Self {
        Self {
            closes: Vec::new(),
            highs: Vec::new(),
            lows: Vec::new(),
            volumes: Vec::new(),
            close_5m: VecDeque::new(),
            close_15m: VecDeque::new(),
            prev_k: KD_NEUTRAL,
            prev_d: KD_NEUTRAL,
        }
    }
}

fn push_capped(series: &mut VecDeque<f64>, value: f64) {
    series.push_back(value);
    while series.len() > TIMEFRAME_CAP {
        let _ = series.pop_front();
    }
}

impl RollingSeries {
    /// Append one tick. A tick's price stands in for its high, low, and close.
    pub fn push(&mut self, tick: &Tick) {
        self.closes.push(tick.price);
        self.highs.push(tick.price);
        self.lows.push(tick.price);
        self.volumes.push(tick.volume);
        let n = self.closes.len();
        if n % FAST_TIMEFRAME_TICKS == 0 {
            push_capped(&mut self.close_5m, tick.price);
        }
        if n % SLOW_TIMEFRAME_TICKS == 0 {
            push_capped(&mut self.close_15m, tick.price);
        }
    }

    pub fn len(&self) -> usize {
        self.closes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.closes.is_empty()
    }

    pub fn timeframe_lens(&self) -> (usize, usize) {
        (self.close_5m.len(), self.close_15m.len())
    }

    /// Recompute the indicator set and carry K/D forward to the next tick.
    pub fn indicators(&mut self) -> IndicatorSnapshot {
        let snap = indicator::compute_all_with_prev_kd(
            &self.closes,
            &self.highs,
            &self.lows,
            &self.volumes,
            self.prev_k,
            self.prev_d,
        );
        self.prev_k = snap.kd_k;
        self.prev_d = snap.kd_d;
        snap
    }

    pub fn timeframes(&mut self) -> TimeframeSnapshot {
        let fast = self.close_5m.make_contiguous();
        let (rsi_5m, ema_5m, fast_len) =
            (rsi(fast, RSI_PERIOD), ema(fast, FAST_TIMEFRAME_EMA), fast.len());
        let slow = self.close_15m.make_contiguous();
        let (rsi_15m, ema_15m, slow_len) =
            (rsi(slow, RSI_PERIOD), ema(slow, SLOW_TIMEFRAME_EMA), slow.len());
        TimeframeSnapshot {
            rsi_5m,
            rsi_15m,
            ema_5m,
            ema_15m,
            is_ready_5m: fast_len >= TIMEFRAME_READY,
            is_ready_15m: slow_len >= TIMEFRAME_READY,
            is_ready: self.closes.len() >= READY_TICKS,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SessionStats {
    pub ticks: u64,
    pub entries: u32,
    pub adds: u32,
    pub trades: u32,
    pub wins: u32,
    pub losses: u32,
    pub realized_pnl: f64,
    pub suspensions: u32,
}

impl SessionStats {
    pub fn win_rate_percent(&self) -> f64 {
        if self.trades == 0 {
            0.0
        } else {
            (self.wins as f64 / self.trades as f64) * 100.0
        }
    }
}

/// What happened on one tick.
#[derive(Debug, Clone, PartialEq)]
pub struct TickOutcome {
    pub enriched: EnrichedTick,
    pub action: Option<TradeAction>,
    pub trigger: Option<ExitTrigger>,
    pub realized: Option<f64>,
    pub trade_id: Option<String>,
}

impl TickOutcome {
    fn idle(enriched: EnrichedTick) -> Self {
        Self {
            enriched,
            action: None,
            trigger: None,
            realized: None,
            trade_id: None,
        }
    }
}

pub struct TickEngine {
    state: StrategyState,
    decision: DecisionEngine,
    tracker: TickPatternTracker,
    series: RollingSeries,
    clock: Box<dyn Clock>,
    logger: Box<dyn TradeLogger>,
    recorder: Box<dyn TickRecorder>,
    extension: Box<dyn PositionExtension>,
    extensions: ExtensionFlags,
    trade_id: Option<String>,
    stats: SessionStats,
}

impl TickEngine {
    /// Engine with no-op sinks and no position extension.
    pub fn new(config: &Config, clock: Box<dyn Clock>) -> Self {
        Self {
            state: StrategyState::new(config.risk.clone()),
            decision: DecisionEngine::new(config.decision.clone(), config.engine.market_bias),
            tracker: TickPatternTracker::new(),
            series: RollingSeries::default(),
            clock,
            logger: Box::new(NullSink),
            recorder: Box::new(NullSink),
            extension: Box::new(NoExtension),
            extensions: config.extensions,
            trade_id: None,
            stats: SessionStats::default(),
        }
    }

    pub fn with_trade_logger(mut self, logger: Box<dyn TradeLogger>) -> Self {
        self.logger = logger;
        self
    }

    pub fn with_tick_recorder(mut self, recorder: Box<dyn TickRecorder>) -> Self {
        self.recorder = recorder;
        self
    }

    pub fn with_extension(mut self, extension: Box<dyn PositionExtension>) -> Self {
        self.extension = extension;
        self
    }

    pub fn with_params(mut self, store: &dyn ParamsStore) -> Self {
        self.decision.apply_params(store);
        self
    }

    pub fn state(&self) -> &StrategyState {
        &self.state
    }

    pub fn decision(&self) -> &DecisionEngine {
        &self.decision
    }

    pub fn series(&self) -> &RollingSeries {
        &self.series
    }

    pub fn stats(&self) -> &SessionStats {
        &self.stats
    }

    pub fn active_trade_id(&self) -> Option<&str> {
        self.trade_id.as_deref()
    }

    pub fn on_tick(&mut self, tick: Tick) -> TickOutcome {
        let now_ms = self.clock.now_ms();
        let price = tick.price;
        self.stats.ticks += 1;

        self.series.push(&tick);
        let indicators = self.series.indicators();
        let timeframes = self.series.timeframes();
        self.tracker.update(price);
        let patterns = self.tracker.signals();
        self.state.update_profit_loss(price);

        let view = MarketView {
            tick,
            indicators,
            timeframes,
            patterns: Some(patterns),
        };
        let decision = self.decision.evaluate(&view);
        let enriched = self.enrich(&view, patterns, decision, price);

        tracing::debug!(
            timestamp_ms = tick.timestamp_ms,
            price,
            rsi = indicators.rsi,
            macd = indicators.macd,
            macd_signal = indicators.macd_signal,
            adx = indicators.adx,
            vwap = indicators.vwap,
            bias = %decision.bias,
            score = decision.score,
            "Tick processed"
        );

        if !self.state.in_position() {
            if decision.enter {
                return self.try_enter(enriched, patterns, decision.bias, now_ms);
            }
            return TickOutcome::idle(enriched);
        }

        self.record(&enriched);
        let ctx = ExitContext {
            price,
            atr: indicators.atr,
            now_ms,
            tick: &enriched,
            extensions: self.extensions,
        };
        match ExitOrchestrator::evaluate(&self.state, self.extension.as_mut(), &ctx) {
            PositionDecision::Hold => TickOutcome::idle(enriched),
            PositionDecision::Exit(trigger) => self.close(trigger, enriched, now_ms),
            PositionDecision::Add => self.add(enriched),
        }
    }

    fn enrich(
        &self,
        view: &MarketView,
        patterns: PatternSignals,
        decision: EntryDecision,
        price: f64,
    ) -> EnrichedTick {
        EnrichedTick {
            tick: view.tick,
            indicators: view.indicators,
            timeframes: view.timeframes,
            patterns,
            position: PositionMetrics {
                max_profit: self.state.max_profit(),
                max_loss: self.state.max_loss(),
                tick_since_entry: self.state.tick_since_entry(),
                unrealized_profit: self.state.unrealized_profit(price),
                recent_high: self.state.recent_high(),
            },
            bias: decision.bias,
            entry_score: decision.score,
        }
    }

    fn try_enter(
        &mut self,
        enriched: EnrichedTick,
        patterns: PatternSignals,
        bias: Bias,
        now_ms: u64,
    ) -> TickOutcome {
        let price = enriched.tick.price;
        let direction = choose_direction(&patterns, bias);
        if let Err(block) = self.state.enter(direction, price, now_ms) {
            tracing::warn!(reason = block.as_str(), price, "Entry signal rejected");
            return TickOutcome::idle(enriched);
        }

        let trade_id = format!("trd-{}", &uuid::Uuid::new_v4().simple().to_string()[..8]);
        self.stats.entries += 1;
        tracing::info!(
            trade_id = %trade_id,
            direction = %direction,
            price,
            score = enriched.entry_score,
            bias = %bias,
            "Position opened"
        );
        self.notify_logger(TradeAction::Enter, price, &enriched);
        if let Err(e) = self.recorder.start_trade(&trade_id) {
            tracing::warn!(error = %e, trade_id = %trade_id, "Tick recorder failed to start trade");
        }
        self.record(&enriched);
        self.trade_id = Some(trade_id.clone());

        TickOutcome {
            enriched,
            action: Some(TradeAction::Enter),
            trigger: None,
            realized: None,
            trade_id: Some(trade_id),
        }
    }

    fn close(&mut self, trigger: ExitTrigger, enriched: EnrichedTick, now_ms: u64) -> TickOutcome {
        let price = enriched.tick.price;
        let action = trigger.action();
        tracing::info!(
            reason = ExitOrchestrator::reason_code(trigger),
            action = %action,
            price,
            "Exit triggered"
        );
        self.notify_logger(action, price, &enriched);

        let suspended_before = self.state.disable_until_ms();
        let realized = self.state.exit(price, now_ms);
        if let Err(e) = self.recorder.force_flush() {
            tracing::warn!(error = %e, "Tick recorder failed to flush trade");
        }

        if let Some(pnl) = realized {
            self.stats.trades += 1;
            self.stats.realized_pnl += pnl;
            if pnl > 0.0 {
                self.stats.wins += 1;
            } else {
                self.stats.losses += 1;
            }
        }
        if self.state.disable_until_ms() != suspended_before {
            self.stats.suspensions += 1;
        }

        TickOutcome {
            enriched,
            action: Some(action),
            trigger: Some(trigger),
            realized,
            trade_id: self.trade_id.take(),
        }
    }

    fn add(&mut self, enriched: EnrichedTick) -> TickOutcome {
        let price = enriched.tick.price;
        let size = self.state.add_to_position();
        self.stats.adds += 1;
        tracing::info!(price, size, "Added to position");
        self.notify_logger(TradeAction::Add, price, &enriched);
        TickOutcome {
            enriched,
            action: Some(TradeAction::Add),
            trigger: None,
            realized: None,
            trade_id: self.trade_id.clone(),
        }
    }

    fn notify_logger(&mut self, action: TradeAction, price: f64, tick: &EnrichedTick) {
        let status = self.state.status();
        if let Err(e) = self.logger.log(action, &status, price, tick) {
            tracing::warn!(error = %e, action = %action, "Trade logger failed, continuing");
        }
    }

    fn record(&mut self, tick: &EnrichedTick) {
        if let Err(e) = self.recorder.record_tick(tick) {
            tracing::warn!(error = %e, "Tick recorder failed to record tick");
        }
    }
}

/// Follow the direction score when it agrees with the bias, else momentum.
pub fn choose_direction(patterns: &PatternSignals, bias: Bias) -> Direction {
    match bias {
        Bias::Bullish if patterns.direction_score > 0 => Direction::Long,
        Bias::Bearish if patterns.direction_score < 0 => Direction::Short,
        _ if patterns.momentum > 0.0 => Direction::Long,
        _ => Direction::Short,
    }
}
