use std::path::Path;

use anyhow::{Context, Result};

use crate::clock::ManualClock;
use crate::engine::{SessionStats, TickEngine};
use crate::model::tick::Tick;

/// Read `timestamp_ms,price,volume` rows. A missing volume column reads as 0.
pub fn read_ticks_csv(path: &Path) -> Result<Vec<Tick>> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("failed to open {}", path.display()))?;
    let mut ticks = Vec::new();
    for (idx, row) in reader.deserialize().enumerate() {
        let tick: Tick = row.with_context(|| {
            format!("invalid tick row {} in {}", idx + 1, path.display())
        })?;
        ticks.push(tick);
    }
    Ok(ticks)
}

/// Feed `ticks` through `engine`, moving `clock` to each tick's timestamp first.
///
/// `clock` must be the same clock the engine was built with.
pub fn run_replay(engine: &mut TickEngine, ticks: &[Tick], clock: &ManualClock) -> SessionStats {
    for tick in ticks {
        clock.set(tick.timestamp_ms);
        let _ = engine.on_tick(*tick);
    }

    let stats = *engine.stats();
    if engine.state().in_position() {
        tracing::warn!(
            trade_id = engine.active_trade_id().unwrap_or_default(),
            "Replay finished with an open position"
        );
    }
    tracing::info!(
        ticks = stats.ticks,
        entries = stats.entries,
        trades = stats.trades,
        wins = stats.wins,
        losses = stats.losses,
        realized_pnl = stats.realized_pnl,
        suspensions = stats.suspensions,
        "Replay finished"
    );
    stats
}
