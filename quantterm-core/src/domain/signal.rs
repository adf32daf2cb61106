//! Signal — the inference output.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Why a signal was produced by a degraded path instead of the trained model.
///
/// Carried inside the signal payload so a renderer can label the result
/// instead of silently presenting a proxy as a model prediction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FallbackReason {
    /// No feature rows at all for the symbol.
    NoData,
    /// Fewer feature rows than the configured minimum.
    InsufficientData,
    /// Training was attempted and failed.
    TrainingFailed,
    /// A model artifact exists but could not be loaded or applied.
    ModelUnusable,
}

impl fmt::Display for FallbackReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FallbackReason::NoData => "no data",
            FallbackReason::InsufficientData => "insufficient data",
            FallbackReason::TrainingFailed => "training failed",
            FallbackReason::ModelUnusable => "model unusable",
        };
        f.write_str(s)
    }
}

/// A bounded trading signal plus its explanation.
///
/// `score` is always in [-1, +1]. `explanation` maps feature names to
/// non-negative contribution weights, sorted descending. Computed fresh per
/// call and never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Signal {
    pub score: f64,
    pub explanation: Vec<(String, f64)>,
    pub fallback: Option<FallbackReason>,
}

impl Signal {
    /// True when this signal came from the trained-model path.
    pub fn is_model_backed(&self) -> bool {
        self.fallback.is_none()
    }

    /// The highest-weighted feature name, if any.
    pub fn top_feature(&self) -> Option<&str> {
        self.explanation.first().map(|(name, _)| name.as_str())
    }
}
