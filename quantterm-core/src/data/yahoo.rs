//! Yahoo Finance source adapter (tertiary, no API key).
//!
//! Fetches daily OHLCV bars from the v8 chart API. The guaranteed-available
//! last resort of the fallback chain: every deployment can reach it without
//! credentials. Yahoo has no official API and is subject to unannounced
//! format changes, so parse failures are reported as typed errors rather
//! than panics.

use super::provider::{DataProvider, FetchError};
use super::symbols::SymbolTable;
use crate::domain::{Bar, Source};
use chrono::NaiveDate;
use serde::Deserialize;
use std::time::Duration;

/// Yahoo Finance v8 chart API response.
#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: ChartResult,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    result: Option<Vec<ChartData>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartData {
    timestamp: Option<Vec<i64>>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    quote: Vec<QuoteData>,
}

#[derive(Debug, Deserialize)]
struct QuoteData {
    open: Vec<Option<f64>>,
    high: Vec<Option<f64>>,
    low: Vec<Option<f64>>,
    close: Vec<Option<f64>>,
    volume: Vec<Option<u64>>,
}

/// Yahoo Finance data provider.
pub struct YahooProvider {
    client: reqwest::blocking::Client,
    symbols: SymbolTable,
}

impl YahooProvider {
    pub fn new(symbols: SymbolTable) -> Self {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent("Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36")
            .build()
            .expect("failed to build HTTP client");
        Self { client, symbols }
    }

    /// Build the chart API URL for a ticker and date range.
    fn chart_url(ticker: &str, start: NaiveDate, end: NaiveDate) -> String {
        let start_ts = start.and_hms_opt(0, 0, 0).unwrap().and_utc().timestamp();
        let end_ts = end.and_hms_opt(23, 59, 59).unwrap().and_utc().timestamp();
        format!(
            "https://query2.finance.yahoo.com/v8/finance/chart/{ticker}\
             ?period1={start_ts}&period2={end_ts}&interval=1d"
        )
    }

    /// Parse the chart API response into canonical bars.
    fn parse_response(symbol: &str, resp: ChartResponse) -> Result<Vec<Bar>, FetchError> {
        let result = resp.chart.result.ok_or_else(|| {
            if let Some(err) = resp.chart.error {
                if err.code == "Not Found" {
                    FetchError::NoData {
                        symbol: symbol.to_string(),
                    }
                } else {
                    FetchError::Parse(format!("{}: {}", err.code, err.description))
                }
            } else {
                FetchError::Parse("empty result with no error".into())
            }
        })?;

        let data = result
            .into_iter()
            .next()
            .ok_or_else(|| FetchError::Parse("result array is empty".into()))?;

        let timestamps = data
            .timestamp
            .ok_or_else(|| FetchError::Parse("no timestamps".into()))?;

        let quote = data
            .indicators
            .quote
            .into_iter()
            .next()
            .ok_or_else(|| FetchError::Parse("no quote data".into()))?;

        let mut bars = Vec::with_capacity(timestamps.len());
        for (i, &ts) in timestamps.iter().enumerate() {
            let date = chrono::DateTime::from_timestamp(ts, 0)
                .map(|dt| dt.naive_utc().date())
                .ok_or_else(|| FetchError::Parse(format!("invalid timestamp: {ts}")))?;

            let open = quote.open.get(i).copied().flatten();
            let high = quote.high.get(i).copied().flatten();
            let low = quote.low.get(i).copied().flatten();
            let close = quote.close.get(i).copied().flatten();
            let volume = quote.volume.get(i).copied().flatten();

            // Holidays/non-trading days come back as all-None rows
            let Some(close) = close else { continue };

            bars.push(Bar {
                symbol: symbol.to_string(),
                date,
                open: open.unwrap_or(close),
                high: high.unwrap_or(close),
                low: low.unwrap_or(close),
                close,
                volume: volume.unwrap_or(0),
                source: Source::Yahoo,
            });
        }

        if bars.is_empty() {
            return Err(FetchError::NoData {
                symbol: symbol.to_string(),
            });
        }
        Ok(bars)
    }
}

impl DataProvider for YahooProvider {
    fn name(&self) -> &str {
        "yahoo"
    }

    fn fetch(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<Bar>, FetchError> {
        let ticker = self.symbols.ticker(symbol);
        let url = Self::chart_url(ticker, start, end);

        let resp = self
            .client
            .get(&url)
            .send()
            .map_err(|e| FetchError::Network(e.to_string()))?;

        let status = resp.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(FetchError::RateLimited(format!("HTTP 429 for {ticker}")));
        }
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            return Err(FetchError::Auth(format!("HTTP {status} for {ticker}")));
        }
        if !status.is_success() {
            return Err(FetchError::Http {
                status: status.as_u16(),
            });
        }

        let chart: ChartResponse = resp
            .json()
            .map_err(|e| FetchError::Parse(format!("chart response for {ticker}: {e}")))?;

        Self::parse_response(symbol, chart)
    }
}
