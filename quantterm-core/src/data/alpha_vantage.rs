//! Alpha Vantage source adapter (primary, API key required).
//!
//! Uses the FX_DAILY endpoint for currency-style pairs (EURUSD, XAUUSD).
//! Index and futures identifiers are not served here — they yield a typed
//! NoData so the chain falls through to the next source. Without a
//! configured key the provider reports itself unavailable and is skipped
//! entirely.

use super::provider::{DataProvider, FetchError};
use super::symbols::SymbolTable;
use crate::domain::{Bar, Source};
use chrono::NaiveDate;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::time::Duration;

#[derive(Debug, Deserialize)]
struct FxDailyResponse {
    #[serde(rename = "Time Series FX (Daily)")]
    series: Option<BTreeMap<String, FxQuote>>,
    // Rate-limit responses come back as HTTP 200 with one of these bodies.
    #[serde(rename = "Note")]
    note: Option<String>,
    #[serde(rename = "Information")]
    information: Option<String>,
    #[serde(rename = "Error Message")]
    error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FxQuote {
    #[serde(rename = "1. open")]
    open: String,
    #[serde(rename = "2. high")]
    high: String,
    #[serde(rename = "3. low")]
    low: String,
    #[serde(rename = "4. close")]
    close: String,
}

/// Alpha Vantage data provider.
pub struct AlphaVantageProvider {
    client: reqwest::blocking::Client,
    symbols: SymbolTable,
    api_key: Option<String>,
}

impl AlphaVantageProvider {
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

    fn fx_url(from: &str, to: &str, api_key: &str) -> String {
        format!(
            "https://www.alphavantage.co/query?function=FX_DAILY\
             &from_symbol={from}&to_symbol={to}&outputsize=full&apikey={api_key}"
        )
    }

    fn parse_response(
        symbol: &str,
        resp: FxDailyResponse,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<Bar>, FetchError> {
        if let Some(note) = resp.note.or(resp.information) {
            return Err(FetchError::RateLimited(note));
        }
        if let Some(msg) = resp.error_message {
            // Invalid-key messages should not read as "symbol has no data"
            if msg.to_lowercase().contains("apikey") {
                return Err(FetchError::Auth(msg));
            }
            return Err(FetchError::NoData {
                symbol: symbol.to_string(),
            });
        }

        let series = resp.series.ok_or_else(|| FetchError::NoData {
            symbol: symbol.to_string(),
        })?;

        let parse_px = |field: &str, value: &str| -> Result<f64, FetchError> {
            value
                .parse::<f64>()
                .map_err(|_| FetchError::Parse(format!("bad {field} value: {value}")))
        };

        // BTreeMap keys are date strings, so iteration is already ascending.
        let mut bars = Vec::with_capacity(series.len());
        for (date_str, quote) in &series {
            let date = NaiveDate::parse_from_str(date_str, "%Y-%m-%d")
                .map_err(|_| FetchError::Parse(format!("bad date key: {date_str}")))?;
            if date < start || date > end {
                continue;
            }
            bars.push(Bar {
                symbol: symbol.to_string(),
                date,
                open: parse_px("open", &quote.open)?,
                high: parse_px("high", &quote.high)?,
                low: parse_px("low", &quote.low)?,
                close: parse_px("close", &quote.close)?,
                volume: 0, // FX_DAILY reports no volume
                source: Source::AlphaVantage,
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

impl DataProvider for AlphaVantageProvider {
    fn name(&self) -> &str {
        "alpha_vantage"
    }

    fn fetch(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<Bar>, FetchError> {
        let api_key = self.api_key.as_deref().ok_or_else(|| FetchError::Auth(
            "no Alpha Vantage API key configured".into(),
        ))?;

        // Only currency-style pairs are served by FX_DAILY.
        let Some((from, to)) = self.symbols.fx_pair(symbol) else {
            return Err(FetchError::NoData {
                symbol: symbol.to_string(),
            });
        };

        let url = Self::fx_url(from, to, api_key);
        let resp = self
            .client
            .get(&url)
            .send()
            .map_err(|e| FetchError::Network(e.to_string()))?;

        let status = resp.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(FetchError::RateLimited(format!("HTTP 429 for {symbol}")));
        }
        if !status.is_success() {
            return Err(FetchError::Http {
                status: status.as_u16(),
            });
        }

        let body: FxDailyResponse = resp
            .json()
            .map_err(|e| FetchError::Parse(format!("FX_DAILY response for {symbol}: {e}")))?;

        Self::parse_response(symbol, body, start, end)
    }

    fn is_available(&self) -> bool {
        self.api_key.is_some()
    }
}
