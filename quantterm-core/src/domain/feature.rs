//! FeatureRow — one engineered observation derived from a window of bars.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// The feature columns fed to the classifier, in canonical order.
///
/// `returns` is deliberately absent: it defines the training target and
/// would leak the label into the feature matrix.
pub const MODEL_FEATURES: [&str; 4] = ["volatility", "momentum_5d", "corr_dxy", "macro_rate"];

/// One engineered observation for a symbol on a date.
///
/// Rows are recomputed from persisted bars on every request — there is no
/// incremental maintenance. Window-warmup gaps are filled with the neutral
/// value from `FeatureConfig`; only the first bar (undefined `returns`) is
/// dropped.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureRow {
    pub symbol: String,
    pub date: NaiveDate,
    pub returns: f64,
    pub volatility: f64,
    pub momentum_5d: f64,
    pub corr_dxy: f64,
    pub macro_rate: f64,
}

impl FeatureRow {
    /// Model feature values in the canonical `MODEL_FEATURES` order.
    pub fn model_values(&self) -> [f64; 4] {
        [
            self.volatility,
            self.momentum_5d,
            self.corr_dxy,
            self.macro_rate,
        ]
    }

    /// Look up a model feature by column name.
    ///
    /// Used at inference time to project a row onto the column order recorded
    /// in a model artifact, which may differ from `MODEL_FEATURES` if the
    /// artifact predates a column reordering.
    pub fn value_by_name(&self, name: &str) -> Option<f64> {
        match name {
            "volatility" => Some(self.volatility),
            "momentum_5d" => Some(self.momentum_5d),
            "corr_dxy" => Some(self.corr_dxy),
            "macro_rate" => Some(self.macro_rate),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_row() -> FeatureRow {
        FeatureRow {
            symbol: "XAUUSD".into(),
            date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            returns: 0.004,
            volatility: 0.12,
            momentum_5d: 0.021,
            corr_dxy: -0.35,
            macro_rate: 5.33,
        }
    }

    #[test]
    fn model_values_follow_canonical_order() {
        let row = sample_row();
        let values = row.model_values();
        for (i, name) in MODEL_FEATURES.iter().enumerate() {
            assert_eq!(values[i], row.value_by_name(name).unwrap());
        }
    }

    #[test]
    fn unknown_column_yields_none() {
        assert!(sample_row().value_by_name("returns").is_none());
        assert!(sample_row().value_by_name("rsi_14").is_none());
    }
}
