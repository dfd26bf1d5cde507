use std::path::Path;

use rusqlite::{params, Connection};

use crate::error::AppError;
use crate::model::snapshot::EnrichedTick;
use crate::sink::TickRecorder;

#[derive(Debug, Clone, PartialEq)]
pub struct RecordedTick {
    pub tick_index: u32,
    pub timestamp_ms: u64,
    pub price: f64,
    pub volume: f64,
    pub momentum: f64,
    pub direction_score: i32,
    pub bias: String,
    pub entry_score: i32,
    pub unrealized_profit: f64,
}

/// Buffers the enriched ticks of the open trade and writes them to sqlite in
/// one transaction when the trade closes. A closed trade whose write fails is
/// kept in `pending` and retried on the next flush.
pub struct SqliteTickRecorder {
    conn: Connection,
    trade_id: Option<String>,
    buffer: Vec<EnrichedTick>,
    pending: Vec<(String, Vec<EnrichedTick>)>,
}

impl SqliteTickRecorder {
    pub fn open(path: &Path) -> Result<Self, AppError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        Self::with_connection(Connection::open(path)?)
    }

    pub fn open_in_memory() -> Result<Self, AppError> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self, AppError> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS trade_ticks (
                trade_id TEXT NOT NULL,
                tick_index INTEGER NOT NULL,
                timestamp_ms INTEGER NOT NULL,
                price REAL NOT NULL,
                volume REAL NOT NULL,
                rsi REAL NOT NULL,
                macd REAL NOT NULL,
                macd_signal REAL NOT NULL,
                atr REAL NOT NULL,
                adx REAL NOT NULL,
                vwap REAL NOT NULL,
                ema5 REAL NOT NULL,
                ema20 REAL NOT NULL,
                momentum REAL NOT NULL,
                direction_score INTEGER NOT NULL,
                bias TEXT NOT NULL,
                entry_score INTEGER NOT NULL,
                unrealized_profit REAL NOT NULL,
                PRIMARY KEY(trade_id, tick_index)
            );
            "#,
        )?;
        Ok(Self {
            conn,
            trade_id: None,
            buffer: Vec::new(),
            pending: Vec::new(),
        })
    }

    pub fn active_trade(&self) -> Option<&str> {
        self.trade_id.as_deref()
    }

    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    /// Closed trades still waiting for a successful write.
    pub fn pending_trades(&self) -> usize {
        self.pending.len()
    }

    pub fn load_trade_ticks(&self, trade_id: &str) -> Result<Vec<RecordedTick>, AppError> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT tick_index, timestamp_ms, price, volume, momentum,
                   direction_score, bias, entry_score, unrealized_profit
            FROM trade_ticks
            WHERE trade_id = ?1
            ORDER BY tick_index ASC
            "#,
        )?;
        let rows = stmt.query_map([trade_id], |row| {
            Ok(RecordedTick {
                tick_index: row.get::<_, i64>(0)? as u32,
                timestamp_ms: row.get::<_, i64>(1)? as u64,
                price: row.get(2)?,
                volume: row.get(3)?,
                momentum: row.get(4)?,
                direction_score: row.get(5)?,
                bias: row.get(6)?,
                entry_score: row.get(7)?,
                unrealized_profit: row.get(8)?,
            })
        })?;

        let mut ticks = Vec::new();
        for row in rows {
            ticks.push(row?);
        }
        Ok(ticks)
    }

    fn stage_current(&mut self) {
        let Some(trade_id) = self.trade_id.take() else {
            return;
        };
        let ticks = std::mem::take(&mut self.buffer);
        if !ticks.is_empty() {
            self.pending.push((trade_id, ticks));
        }
    }

    /// Oldest first; stops at the first failure and leaves it queued.
    fn write_pending(&mut self) -> Result<(), AppError> {
        while let Some((trade_id, ticks)) = self.pending.first() {
            write_trade(&mut self.conn, trade_id, ticks)?;
            self.pending.remove(0);
        }
        Ok(())
    }
}

fn write_trade(conn: &mut Connection, trade_id: &str, ticks: &[EnrichedTick]) -> Result<(), AppError> {
    let tx = conn.transaction()?;
    for (idx, t) in ticks.iter().enumerate() {
        let ind = &t.indicators;
        tx.execute(
            r#"
            INSERT OR REPLACE INTO trade_ticks (
                trade_id, tick_index, timestamp_ms, price, volume, rsi, macd,
                macd_signal, atr, adx, vwap, ema5, ema20, momentum,
                direction_score, bias, entry_score, unrealized_profit
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18)
            "#,
            params![
                trade_id,
                idx as i64,
                t.tick.timestamp_ms as i64,
                t.tick.price,
                t.tick.volume,
                ind.rsi,
                ind.macd,
                ind.macd_signal,
                ind.atr,
                ind.adx,
                ind.vwap,
                ind.ema5,
                ind.ema20,
                t.patterns.momentum,
                t.patterns.direction_score,
                t.bias.as_str(),
                t.entry_score,
                t.position.unrealized_profit,
            ],
        )?;
    }
    tx.commit()?;
    Ok(())
}

impl TickRecorder for SqliteTickRecorder {
    fn start_trade(&mut self, trade_id: &str) -> Result<(), AppError> {
        self.stage_current();
        self.trade_id = Some(trade_id.to_string());
        self.write_pending()
    }

    /// Ticks arriving outside a trade are ignored.
    fn record_tick(&mut self, tick: &EnrichedTick) -> Result<(), AppError> {
        if self.trade_id.is_some() {
            self.buffer.push(*tick);
        }
        Ok(())
    }

    fn force_flush(&mut self) -> Result<(), AppError> {
        self.stage_current();
        self.write_pending()
    }
}
