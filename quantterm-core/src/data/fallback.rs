//! Fallback chain — priority-ordered source selection.
//!
//! Providers differ in coverage, rate limits, and authentication; precedence
//! reflects data quality, with the unauthenticated Yahoo adapter guaranteeing
//! availability in any deployment. "Empty" and "error" are treated the same:
//! try the next source. Only when the last source also comes back empty does
//! the chain fail, and that failure is definitive.

use super::alpha_vantage::AlphaVantageProvider;
use super::polygon::PolygonProvider;
use super::provider::{DataProvider, FetchError};
use super::retry::RetryPolicy;
use super::symbols::SymbolTable;
use super::yahoo::YahooProvider;
use crate::domain::Bar;
use chrono::{Duration, NaiveDate};
use tracing::{info, warn};

/// Calendar padding factor applied to the requested bar count, so weekends
/// and holidays don't shrink the window below `requested_days` bars.
const CALENDAR_PADDING: i64 = 2;

/// Priority-ordered chain of source adapters with a uniform retry policy.
pub struct FallbackChain {
    providers: Vec<Box<dyn DataProvider>>,
    retry: RetryPolicy,
}

impl FallbackChain {
    /// Build a chain from an explicit provider list (highest priority first).
    pub fn new(providers: Vec<Box<dyn DataProvider>>, retry: RetryPolicy) -> Self {
        Self { providers, retry }
    }

    /// The standard three-source chain: Alpha Vantage, Polygon, Yahoo.
    ///
    /// Key-less providers report themselves unavailable and are skipped, so a
    /// deployment with no keys at all degrades to Yahoo-only.
    pub fn standard(
        symbols: SymbolTable,
        alpha_vantage_key: Option<String>,
        polygon_key: Option<String>,
        retry: RetryPolicy,
    ) -> Self {
        let providers: Vec<Box<dyn DataProvider>> = vec![
            Box::new(AlphaVantageProvider::new(symbols.clone(), alpha_vantage_key)),
            Box::new(PolygonProvider::new(symbols.clone(), polygon_key)),
            Box::new(YahooProvider::new(symbols)),
        ];
        Self { providers, retry }
    }

    /// Fetch up to `requested_days` of daily bars for a symbol.
    ///
    /// Tries each provider in priority order; any error or empty result moves
    /// on to the next source. On success the bars are sorted ascending by
    /// date and truncated to the most recent `requested_days`.
    pub fn fetch_ohlc(
        &self,
        symbol: &str,
        requested_days: usize,
    ) -> Result<Vec<Bar>, FetchError> {
        let end = chrono::Local::now().date_naive();
        let start = end - Duration::days(requested_days as i64 * CALENDAR_PADDING);
        self.fetch_ohlc_range(symbol, start, end, requested_days)
    }

    /// Range variant used by `fetch_ohlc` and by tests that pin the window.
    pub fn fetch_ohlc_range(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
        requested_days: usize,
    ) -> Result<Vec<Bar>, FetchError> {
        for provider in &self.providers {
            if !provider.is_available() {
                info!(provider = provider.name(), symbol, "skipping (no credentials)");
                continue;
            }

            let attempt = self
                .retry
                .run(provider.name(), || provider.fetch(symbol, start, end));

            match attempt {
                Ok(mut bars) if !bars.is_empty() => {
                    bars.sort_by(|a, b| a.date.cmp(&b.date));
                    if bars.len() > requested_days {
                        bars.drain(..bars.len() - requested_days);
                    }
                    info!(
                        provider = provider.name(),
                        symbol,
                        bars = bars.len(),
                        "fetched"
                    );
                    return Ok(bars);
                }
                Ok(_) => {
                    warn!(provider = provider.name(), symbol, "empty result, falling back");
                }
                Err(err) => {
                    warn!(
                        provider = provider.name(),
                        symbol,
                        error = %err,
                        "fetch failed, falling back"
                    );
                }
            }
        }

        Err(FetchError::NoDataAnywhere {
            symbol: symbol.to_string(),
        })
    }
}
