//! Data provider trait and structured error types.
//!
//! The DataProvider trait abstracts over market-data sources (Alpha Vantage,
//! Polygon, Yahoo Finance) so the fallback chain can iterate them in priority
//! order and tests can substitute mocks.

use crate::domain::Bar;
use chrono::NaiveDate;
use thiserror::Error;

/// Structured error types for the fetch path.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("network error: {0}")]
    Network(String),

    #[error("rate limited by provider: {0}")]
    RateLimited(String),

    #[error("HTTP {status} from provider")]
    Http { status: u16 },

    #[error("authentication rejected: {0}")]
    Auth(String),

    #[error("response parse error: {0}")]
    Parse(String),

    #[error("provider returned no data for '{symbol}'")]
    NoData { symbol: String },

    #[error("no data for '{symbol}' from any source")]
    NoDataAnywhere { symbol: String },
}

impl FetchError {
    /// Whether a retry could plausibly succeed.
    ///
    /// A clean "no data returned" is not an error condition worth retrying —
    /// the provider answered, it just has nothing. The fallback chain moves
    /// on to the next source instead.
    pub fn is_transient(&self) -> bool {
        match self {
            FetchError::Network(_) | FetchError::RateLimited(_) => true,
            FetchError::Http { status } => *status >= 500,
            FetchError::Auth(_)
            | FetchError::Parse(_)
            | FetchError::NoData { .. }
            | FetchError::NoDataAnywhere { .. } => false,
        }
    }
}

/// Trait for market-data providers.
///
/// Implementations normalize provider-specific payloads into canonical `Bar`s
/// before returning — field names and types from the wire format never escape
/// the adapter. Retry is NOT an adapter concern: the fallback chain applies a
/// uniform `RetryPolicy` around each call.
pub trait DataProvider: Send + Sync {
    /// Human-readable name of this provider.
    fn name(&self) -> &str;

    /// Fetch daily OHLCV bars for a canonical symbol over a date range.
    ///
    /// An empty successful response must be reported as `FetchError::NoData`,
    /// never as `Ok(vec![])`.
    fn fetch(&self, symbol: &str, start: NaiveDate, end: NaiveDate)
        -> Result<Vec<Bar>, FetchError>;

    /// Whether the provider can be called at all.
    ///
    /// False when the provider requires an API key that is not configured;
    /// the fallback chain skips it without counting an attempt.
    fn is_available(&self) -> bool {
        true
    }
}
