//! Toy signal backtest: cumulative sum of signed next-period returns.
//!
//! Deliberately naive — no fills, no slippage, no position sizing. It exists
//! so the CLI can sanity-check a signal's direction against history, nothing
//! more.

use crate::domain::FeatureRow;

/// Cumulative P&L of holding sign(score) through each next-period return.
///
/// A zero score sits flat and returns 0.0, as does a history shorter than
/// two rows.
pub fn quick_backtest(rows: &[FeatureRow], score: f64) -> f64 {
    if rows.len() < 2 || score == 0.0 {
        return 0.0;
    }
    let direction = if score > 0.0 { 1.0 } else { -1.0 };
    rows[1..].iter().map(|row| direction * row.returns).sum()
}
