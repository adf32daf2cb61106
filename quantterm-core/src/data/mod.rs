//! Data acquisition: source adapters, symbol mapping, retry, fallback chain.

pub mod alpha_vantage;
pub mod fallback;
pub mod polygon;
pub mod provider;
pub mod retry;
pub mod symbols;
pub mod yahoo;

pub use alpha_vantage::AlphaVantageProvider;
pub use fallback::FallbackChain;
pub use polygon::PolygonProvider;
pub use provider::{DataProvider, FetchError};
pub use retry::{RetryConfig, RetryPolicy};
pub use symbols::SymbolTable;
pub use yahoo::YahooProvider;
