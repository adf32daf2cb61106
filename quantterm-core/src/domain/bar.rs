//! Bar — the fundamental market data unit.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Which provider a bar came from.
///
/// Stored alongside the bar so a re-fetch from a higher-priority provider
/// visibly overwrites lower-quality data (last write wins on symbol+date).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Source {
    AlphaVantage,
    Polygon,
    Yahoo,
}

impl Source {
    pub fn as_str(&self) -> &'static str {
        match self {
            Source::AlphaVantage => "alpha_vantage",
            Source::Polygon => "polygon",
            Source::Yahoo => "yahoo",
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Source {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "alpha_vantage" => Ok(Source::AlphaVantage),
            "polygon" => Ok(Source::Polygon),
            "yahoo" => Ok(Source::Yahoo),
            other => Err(format!("unknown bar source: {other}")),
        }
    }
}

/// OHLCV bar for a single symbol on a single day.
///
/// `close` is the required field — a bar with a NaN close is useless for
/// feature computation and fails `is_sane`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bar {
    pub symbol: String,
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
    pub source: Source,
}

impl Bar {
    /// Returns true if any OHLC field is NaN (void bar).
    pub fn is_void(&self) -> bool {
        self.open.is_nan() || self.high.is_nan() || self.low.is_nan() || self.close.is_nan()
    }

    /// Basic OHLCV sanity check: high >= low, positive prices, finite close.
    pub fn is_sane(&self) -> bool {
        if self.is_void() {
            return false;
        }
        self.high >= self.low
            && self.high >= self.open
            && self.high >= self.close
            && self.low <= self.open
            && self.low <= self.close
            && self.open > 0.0
            && self.close > 0.0
    }
}
