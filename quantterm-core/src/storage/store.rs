//! SQLite persistence for bars, fundamentals, features, and model metadata.
//!
//! The store is an explicitly constructed object passed to each component —
//! there is no module-level connection handle. Schema is created lazily on
//! open, so no separate migration step is needed for the minimal tables.
//!
//! Error posture is asymmetric on purpose: writes propagate (a silently lost
//! write corrupts downstream training), reads degrade to empty results so
//! callers can treat "nothing stored yet" and "storage briefly unhappy" the
//! same cheap way.

use crate::domain::{Bar, FeatureRow, Fundamental, Source};
use chrono::NaiveDate;
use rusqlite::{params, Connection};
use std::path::Path;
use thiserror::Error;
use tracing::warn;

/// Structured storage errors.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

const SCHEMA_SQL: &str = "
CREATE TABLE IF NOT EXISTS raw_ohlc (
    symbol    TEXT NOT NULL,
    timestamp TEXT NOT NULL,
    open      REAL,
    high      REAL,
    low       REAL,
    close     REAL NOT NULL,
    volume    INTEGER NOT NULL DEFAULT 0,
    source    TEXT NOT NULL,
    PRIMARY KEY (symbol, timestamp)
);

CREATE TABLE IF NOT EXISTS fundamentals (
    date   TEXT NOT NULL,
    metric TEXT NOT NULL,
    value  REAL NOT NULL,
    PRIMARY KEY (date, metric)
);

CREATE TABLE IF NOT EXISTS features (
    symbol      TEXT NOT NULL,
    date        TEXT NOT NULL,
    returns     REAL,
    volatility  REAL,
    momentum_5d REAL,
    corr_dxy    REAL,
    macro_rate  REAL,
    PRIMARY KEY (symbol, date)
);

CREATE TABLE IF NOT EXISTS model_metadata (
    id         INTEGER PRIMARY KEY AUTOINCREMENT,
    model_name TEXT NOT NULL,
    version    TEXT NOT NULL,
    created_at TEXT NOT NULL,
    params     TEXT,
    metrics    TEXT
);
";

/// SQLite-backed store for bars, fundamentals, features, and model metadata.
pub struct BarStore {
    conn: Connection,
}

impl BarStore {
    /// Open (or create) the database at `path`, initializing the schema.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StorageError> {
        if let Some(parent) = path.as_ref().parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let conn = Connection::open(path)?;
        conn.execute_batch(SCHEMA_SQL)?;
        Ok(Self { conn })
    }

    /// In-memory store for tests.
    pub fn open_in_memory() -> Result<Self, StorageError> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SCHEMA_SQL)?;
        Ok(Self { conn })
    }

    /// Idempotent bulk upsert keyed on (symbol, timestamp).
    ///
    /// One transaction per call — a partial failure rolls back the whole
    /// batch. Returns the number of rows written; `Ok(0)` on empty input
    /// without touching the database.
    pub fn upsert_bars(&mut self, bars: &[Bar]) -> Result<usize, StorageError> {
        if bars.is_empty() {
            return Ok(0);
        }
        let tx = self.conn.transaction()?;
        {
            let mut stmt = tx.prepare_cached(
                "INSERT OR REPLACE INTO raw_ohlc
                 (symbol, timestamp, open, high, low, close, volume, source)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            )?;
            for bar in bars {
                stmt.execute(params![
                    bar.symbol,
                    bar.date,
                    bar.open,
                    bar.high,
                    bar.low,
                    bar.close,
                    bar.volume as i64,
                    bar.source.as_str(),
                ])?;
            }
        }
        tx.commit()?;
        Ok(bars.len())
    }

    /// Bars for a symbol with timestamp >= `start_date`, ascending.
    ///
    /// Never raises: any storage error degrades to an empty result, logged
    /// at warn. Callers treat empty as a legitimate, cheap-to-retry state.
    pub fn load_bars(&self, symbol: &str, start_date: NaiveDate) -> Vec<Bar> {
        match self.try_load_bars(symbol, start_date) {
            Ok(bars) => bars,
            Err(err) => {
                warn!(symbol, error = %err, "bar load failed, returning empty");
                Vec::new()
            }
        }
    }

    fn try_load_bars(
        &self,
        symbol: &str,
        start_date: NaiveDate,
    ) -> Result<Vec<Bar>, StorageError> {
        let mut stmt = self.conn.prepare_cached(
            "SELECT symbol, timestamp, open, high, low, close, volume, source
             FROM raw_ohlc
             WHERE symbol = ?1 AND timestamp >= ?2
             ORDER BY timestamp ASC",
        )?;
        let rows = stmt.query_map(params![symbol, start_date], |row| {
            let source_str: String = row.get(7)?;
            Ok(Bar {
                symbol: row.get(0)?,
                date: row.get(1)?,
                open: row.get(2)?,
                high: row.get(3)?,
                low: row.get(4)?,
                close: row.get(5)?,
                volume: row.get::<_, i64>(6)?.max(0) as u64,
                source: source_str.parse::<Source>().unwrap_or(Source::Yahoo),
            })
        })?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    /// Idempotent bulk upsert of fundamentals keyed on (date, metric).
    pub fn upsert_fundamentals(&mut self, rows: &[Fundamental]) -> Result<usize, StorageError> {
        if rows.is_empty() {
            return Ok(0);
        }
        let tx = self.conn.transaction()?;
        {
            let mut stmt = tx.prepare_cached(
                "INSERT OR REPLACE INTO fundamentals (date, metric, value)
                 VALUES (?1, ?2, ?3)",
            )?;
            for row in rows {
                stmt.execute(params![row.date, row.metric, row.value])?;
            }
        }
        tx.commit()?;
        Ok(rows.len())
    }

    /// All observations of a metric, ascending by date; empty on error.
    pub fn load_fundamentals(&self, metric: &str) -> Vec<Fundamental> {
        let result = (|| -> Result<Vec<Fundamental>, StorageError> {
            let mut stmt = self.conn.prepare_cached(
                "SELECT date, metric, value FROM fundamentals
                 WHERE metric = ?1 ORDER BY date ASC",
            )?;
            let rows = stmt.query_map(params![metric], |row| {
                Ok(Fundamental {
                    date: row.get(0)?,
                    metric: row.get(1)?,
                    value: row.get(2)?,
                })
            })?;
            Ok(rows.collect::<Result<Vec<_>, _>>()?)
        })();
        match result {
            Ok(rows) => rows,
            Err(err) => {
                warn!(metric, error = %err, "fundamentals load failed, returning empty");
                Vec::new()
            }
        }
    }

    /// Archive engineered rows for audit/history.
    ///
    /// Optional telemetry — callers must not let a failure here block the
    /// feature values they already computed.
    pub fn archive_features(&mut self, rows: &[FeatureRow]) -> Result<usize, StorageError> {
        if rows.is_empty() {
            return Ok(0);
        }
        let tx = self.conn.transaction()?;
        {
            let mut stmt = tx.prepare_cached(
                "INSERT OR REPLACE INTO features
                 (symbol, date, returns, volatility, momentum_5d, corr_dxy, macro_rate)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            )?;
            for row in rows {
                stmt.execute(params![
                    row.symbol,
                    row.date,
                    row.returns,
                    row.volatility,
                    row.momentum_5d,
                    row.corr_dxy,
                    row.macro_rate,
                ])?;
            }
        }
        tx.commit()?;
        Ok(rows.len())
    }

    /// Append a model-metadata row (free-form params/metrics JSON).
    pub fn record_model_metadata(
        &mut self,
        model_name: &str,
        version: &str,
        params_json: &str,
        metrics_json: &str,
    ) -> Result<(), StorageError> {
        self.conn.execute(
            "INSERT INTO model_metadata (model_name, version, created_at, params, metrics)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                model_name,
                version,
                chrono::Utc::now().naive_utc().to_string(),
                params_json,
                metrics_json,
            ],
        )?;
        Ok(())
    }

    /// Total bar rows for a symbol.
    pub fn bar_count(&self, symbol: &str) -> usize {
        self.count("SELECT COUNT(*) FROM raw_ohlc WHERE symbol = ?1", symbol)
    }

    /// Total archived feature rows for a symbol.
    pub fn feature_count(&self, symbol: &str) -> usize {
        self.count("SELECT COUNT(*) FROM features WHERE symbol = ?1", symbol)
    }

    fn count(&self, sql: &str, symbol: &str) -> usize {
        self.conn
            .query_row(sql, params![symbol], |row| row.get::<_, i64>(0))
            .map(|n| n.max(0) as usize)
            .unwrap_or(0)
    }

    /// Distinct symbols with at least one stored bar, sorted.
    pub fn symbols_with_bars(&self) -> Vec<String> {
        let result = (|| -> Result<Vec<String>, StorageError> {
            let mut stmt = self
                .conn
                .prepare_cached("SELECT DISTINCT symbol FROM raw_ohlc ORDER BY symbol")?;
            let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;
            Ok(rows.collect::<Result<Vec<_>, _>>()?)
        })();
        result.unwrap_or_default()
    }
}
