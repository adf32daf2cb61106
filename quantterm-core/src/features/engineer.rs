//! Feature pipeline: load bars, derive features, degrade gracefully.
//!
//! Pure computation — persistence of engineered rows is an explicit,
//! optional `BarStore::archive_features` call made by the caller, never a
//! hidden side effect of computing them.

use super::rolling::{rolling_corr, rolling_std};
use crate::domain::{Bar, FeatureRow};
use crate::storage::BarStore;
use chrono::NaiveDate;
use serde::Deserialize;
use std::collections::HashMap;
use tracing::debug;

/// Feature computation settings, including the NaN fill policy.
///
/// One policy, applied uniformly: window-warmup gaps in volatility,
/// momentum, and correlation are filled with `neutral_fill`; macro gaps are
/// forward-filled and fall back to `default_macro_rate`; only the first row
/// (undefined returns) is dropped.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FeatureConfig {
    pub window: usize,
    pub momentum_period: usize,
    pub annualization_factor: f64,
    pub neutral_fill: f64,
    pub default_macro_rate: f64,
}

impl Default for FeatureConfig {
    fn default() -> Self {
        Self {
            window: 20,
            momentum_period: 5,
            annualization_factor: 252.0,
            neutral_fill: 0.0,
            default_macro_rate: 5.33,
        }
    }
}

/// Derives feature rows from persisted bars for one symbol.
pub struct FeaturePipeline {
    reference_symbol: String,
    macro_metric: String,
    config: FeatureConfig,
}

impl FeaturePipeline {
    pub fn new(reference_symbol: impl Into<String>, macro_metric: impl Into<String>, config: FeatureConfig) -> Self {
        Self {
            reference_symbol: reference_symbol.into(),
            macro_metric: macro_metric.into(),
            config,
        }
    }

    pub fn config(&self) -> &FeatureConfig {
        &self.config
    }

    /// Engineer features for a symbol from its full persisted bar history.
    ///
    /// Zero persisted bars yield an empty vector, never an error — callers
    /// must treat that as a legitimate state.
    pub fn engineer(&self, store: &BarStore, symbol: &str) -> Vec<FeatureRow> {
        let epoch = NaiveDate::from_ymd_opt(1970, 1, 1).unwrap();
        let bars = store.load_bars(symbol, epoch);
        if bars.is_empty() {
            debug!(symbol, "no persisted bars, empty feature set");
            return Vec::new();
        }

        let n = bars.len();
        let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();

        // returns[0] is undefined; that row is the only one dropped.
        let mut returns = vec![f64::NAN; n];
        for i in 1..n {
            if closes[i - 1] != 0.0 {
                returns[i] = closes[i] / closes[i - 1] - 1.0;
            }
        }

        let volatility: Vec<f64> = rolling_std(&returns, self.config.window)
            .into_iter()
            .map(|v| v * self.config.annualization_factor.sqrt())
            .collect();

        let mut momentum = vec![f64::NAN; n];
        for i in self.config.momentum_period..n {
            let prev = closes[i - self.config.momentum_period];
            if prev != 0.0 {
                momentum[i] = closes[i] / prev - 1.0;
            }
        }

        let reference = self.aligned_reference_returns(store, &bars);
        let correlation = rolling_corr(&returns, &reference, self.config.window);

        let macro_rates = self.forward_filled_macro(store, &bars);

        let fill = |v: f64| if v.is_finite() { v } else { self.config.neutral_fill };

        let mut rows = Vec::with_capacity(n.saturating_sub(1));
        for i in 1..n {
            if !returns[i].is_finite() {
                continue;
            }
            rows.push(FeatureRow {
                symbol: symbol.to_string(),
                date: bars[i].date,
                returns: returns[i],
                volatility: fill(volatility[i]),
                momentum_5d: fill(momentum[i]),
                corr_dxy: fill(correlation[i]),
                macro_rate: macro_rates[i],
            });
        }
        debug!(symbol, rows = rows.len(), "engineered features");
        rows
    }

    /// Reference-asset returns reindexed to the symbol's calendar.
    ///
    /// Dates the reference never traded (or where its return is undefined)
    /// contribute 0.0, matching the zero-fill alignment policy.
    fn aligned_reference_returns(&self, store: &BarStore, bars: &[Bar]) -> Vec<f64> {
        let epoch = NaiveDate::from_ymd_opt(1970, 1, 1).unwrap();
        let ref_bars = store.load_bars(&self.reference_symbol, epoch);

        let mut by_date: HashMap<NaiveDate, f64> = HashMap::with_capacity(ref_bars.len());
        for i in 1..ref_bars.len() {
            let prev = ref_bars[i - 1].close;
            if prev != 0.0 {
                by_date.insert(ref_bars[i].date, ref_bars[i].close / prev - 1.0);
            }
        }

        bars.iter()
            .map(|bar| {
                by_date
                    .get(&bar.date)
                    .copied()
                    .filter(|v| v.is_finite())
                    .unwrap_or(0.0)
            })
            .collect()
    }

    /// Macro metric forward-filled onto the bar calendar.
    fn forward_filled_macro(&self, store: &BarStore, bars: &[Bar]) -> Vec<f64> {
        let observations = store.load_fundamentals(&self.macro_metric);
        let mut result = Vec::with_capacity(bars.len());
        let mut cursor = 0usize;
        let mut current = self.config.default_macro_rate;

        for bar in bars {
            while cursor < observations.len() && observations[cursor].date <= bar.date {
                current = observations[cursor].value;
                cursor += 1;
            }
            result.push(current);
        }
        result
    }
}
