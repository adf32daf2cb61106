//! QuantTerm Core — multi-source market data acquisition and signal inference.
//!
//! This crate contains the engine behind the dashboard:
//! - Domain types (bars, feature rows, signals, fundamentals)
//! - Source adapters with a priority-ordered fallback chain and retry policy
//! - SQLite persistence with idempotent upserts
//! - Feature pipeline (returns, volatility, momentum, correlation, macro)
//! - Per-symbol direction classifier with train/infer and artifact files
//! - Signal fallback chain that always produces a bounded, explained answer

pub mod config;
pub mod data;
pub mod domain;
pub mod features;
pub mod model;
pub mod signal;
pub mod storage;
