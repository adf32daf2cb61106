//! Canonical symbol to provider ticker mapping.
//!
//! One shared table injected into every adapter, replacing per-adapter copies
//! of the same lookup. Unmapped symbols pass through unchanged.

use std::collections::HashMap;

/// Maps canonical asset identifiers to chart-style provider tickers.
#[derive(Debug, Clone)]
pub struct SymbolTable {
    tickers: HashMap<String, String>,
}

impl Default for SymbolTable {
    fn default() -> Self {
        let tickers = [
            ("DXY", "DX-Y.NYB"),
            ("XAUUSD", "GC=F"),
            ("ES", "ES=F"),
            ("NQ", "NQ=F"),
            ("EURUSD", "EURUSD=X"),
            ("GBPUSD", "GBPUSD=X"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
        Self { tickers }
    }
}

impl SymbolTable {
    pub fn new(tickers: HashMap<String, String>) -> Self {
        Self { tickers }
    }

    /// Provider ticker for a canonical symbol; the symbol itself if unmapped.
    pub fn ticker<'a>(&'a self, symbol: &'a str) -> &'a str {
        self.tickers.get(symbol).map(String::as_str).unwrap_or(symbol)
    }

    /// Interpret a canonical symbol as a currency pair (base, quote).
    ///
    /// Six uppercase letters split 3/3 — EURUSD -> (EUR, USD), XAUUSD ->
    /// (XAU, USD). Index and futures identifiers (DXY, ES, NQ) are not pairs.
    pub fn fx_pair<'a>(&self, symbol: &'a str) -> Option<(&'a str, &'a str)> {
        if symbol.len() == 6 && symbol.chars().all(|c| c.is_ascii_uppercase()) {
            Some((&symbol[..3], &symbol[3..]))
        } else {
            None
        }
    }
}
