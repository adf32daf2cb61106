//! Polygon source adapter (secondary, API key required).
//!
//! Uses the v2 aggregates endpoint with the chart-style ticker from the
//! shared symbol table. Skipped by the chain when no key is configured.

use super::provider::{DataProvider, FetchError};
use super::symbols::SymbolTable;
use crate::domain::{Bar, Source};
use chrono::NaiveDate;
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Deserialize)]
struct AggsResponse {
    results: Option<Vec<Agg>>,
}

#[derive(Debug, Deserialize)]
struct Agg {
    /// Window start, Unix milliseconds.
    t: i64,
    o: f64,
    h: f64,
    l: f64,
    c: f64,
    /// Polygon reports volume as a float.
    v: f64,
}

/// Polygon.io data provider.
pub struct PolygonProvider {
    client: reqwest::blocking::Client,
    symbols: SymbolTable,
    api_key: Option<String>,
}

impl PolygonProvider {
    pub fn new(symbols: SymbolTable, api_key: Option<String>) -> Self {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("failed to build HTTP client");
        Self {
            client,
            symbols,
            api_key,
        }
    }

    fn aggs_url(ticker: &str, start: NaiveDate, end: NaiveDate, api_key: &str) -> String {
        format!(
            "https://api.polygon.io/v2/aggs/ticker/{ticker}/range/1/day/{start}/{end}\
             ?adjusted=true&sort=asc&limit=50000&apiKey={api_key}"
        )
    }

    fn parse_response(symbol: &str, resp: AggsResponse) -> Result<Vec<Bar>, FetchError> {
        let results = resp.results.unwrap_or_default();
        if results.is_empty() {
            return Err(FetchError::NoData {
                symbol: symbol.to_string(),
            });
        }

        let mut bars = Vec::with_capacity(results.len());
        for agg in results {
            let date = chrono::DateTime::from_timestamp_millis(agg.t)
                .map(|dt| dt.naive_utc().date())
                .ok_or_else(|| FetchError::Parse(format!("invalid epoch ms: {}", agg.t)))?;
            bars.push(Bar {
                symbol: symbol.to_string(),
                date,
                open: agg.o,
                high: agg.h,
                low: agg.l,
                close: agg.c,
                volume: agg.v.max(0.0) as u64,
                source: Source::Polygon,
            });
        }
        Ok(bars)
    }
}

impl DataProvider for PolygonProvider {
    fn name(&self) -> &str {
        "polygon"
    }

    fn fetch(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<Bar>, FetchError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| FetchError::Auth("no Polygon API key configured".into()))?;

        let ticker = self.symbols.ticker(symbol);
        let url = Self::aggs_url(ticker, start, end, api_key);

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

        let body: AggsResponse = resp
            .json()
            .map_err(|e| FetchError::Parse(format!("aggs response for {ticker}: {e}")))?;

        Self::parse_response(symbol, body)
    }

    fn is_available(&self) -> bool {
        self.api_key.is_some()
    }
}
