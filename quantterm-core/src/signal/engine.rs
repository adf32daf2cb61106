//! Signal fallback chain.
//!
//! Three states, evaluated in order per symbol:
//!   Insufficient-Data -> momentum proxy, no model I/O
//!   Model-Missing     -> train synchronously, then predict (or degrade)
//!   Model-Ready       -> scale latest row, predict, explain
//!
//! `infer` is total: every path ends in a bounded (score, explanation) pair,
//! and degraded results carry their reason in the payload. No error from
//! training, artifact loading, or prediction ever reaches the caller.

use crate::domain::{FallbackReason, FeatureRow, Signal, MODEL_FEATURES};
use crate::features::FeaturePipeline;
use crate::model::{load_pair, pair_exists, train_model, ArtifactError};
use crate::storage::BarStore;
use serde::Deserialize;
use std::path::PathBuf;
use tracing::{info, warn};

/// Signal thresholds (config file section).
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SignalConfig {
    /// Minimum engineered rows before the trained-model path is considered.
    pub min_feature_rows: usize,
    /// Multiplier applied to the latest momentum in the proxy path.
    pub momentum_amplification: f64,
}

impl Default for SignalConfig {
    fn default() -> Self {
        Self {
            min_feature_rows: 50,
            momentum_amplification: 5.0,
        }
    }
}

/// Produces a bounded signal and explanation for a symbol.
pub struct SignalEngine {
    pipeline: FeaturePipeline,
    model_dir: PathBuf,
    config: SignalConfig,
}

impl SignalEngine {
    pub fn new(pipeline: FeaturePipeline, model_dir: impl Into<PathBuf>, config: SignalConfig) -> Self {
        Self {
            pipeline,
            model_dir: model_dir.into(),
            config,
        }
    }

    /// Infer a signal for a symbol. Never fails, never panics.
    pub fn infer(&self, store: &mut BarStore, symbol: &str) -> Signal {
        let rows = self.pipeline.engineer(store, symbol);

        if rows.is_empty() {
            warn!(symbol, "no feature rows, neutral signal");
            return Signal {
                score: 0.0,
                explanation: momentum_only_explanation(),
                fallback: Some(FallbackReason::NoData),
            };
        }

        if rows.len() < self.config.min_feature_rows {
            info!(
                symbol,
                rows = rows.len(),
                required = self.config.min_feature_rows,
                "below feature threshold, momentum proxy"
            );
            return self.momentum_proxy(&rows, FallbackReason::InsufficientData);
        }

        if !pair_exists(&self.model_dir, symbol) {
            match train_model(
                store,
                &self.pipeline,
                &self.model_dir,
                symbol,
                self.config.min_feature_rows,
            ) {
                Ok(report) => {
                    info!(symbol, cv_accuracy = report.cv_accuracy, "trained on demand");
                }
                Err(err) => {
                    warn!(symbol, error = %err, "training failed, momentum proxy");
                    return self.momentum_proxy(&rows, FallbackReason::TrainingFailed);
                }
            }
        }

        let latest = &rows[rows.len() - 1];
        match self.predict_with_model(symbol, latest) {
            Ok(signal) => signal,
            Err(err) => {
                warn!(symbol, error = %err, "model path failed, momentum proxy");
                self.momentum_proxy(&rows, FallbackReason::ModelUnusable)
            }
        }
    }

    /// Model-Ready action: project the latest row onto the artifact's column
    /// order, scale, predict, explain.
    fn predict_with_model(
        &self,
        symbol: &str,
        latest: &FeatureRow,
    ) -> Result<Signal, ArtifactError> {
        let (model, scaler) = load_pair(&self.model_dir, symbol)?;

        let values: Vec<f64> = scaler
            .scaler
            .columns
            .iter()
            .map(|name| {
                latest.value_by_name(name).ok_or(ArtifactError::ColumnMismatch)
            })
            .collect::<Result<_, _>>()?;

        let scaled = scaler.scaler.transform(&values);
        let prob_up = model.classifier.predict_proba(&scaled);

        Ok(Signal {
            score: ((prob_up - 0.5) * 2.0).clamp(-1.0, 1.0),
            explanation: model.classifier.importances(),
            fallback: None,
        })
    }

    /// Insufficient-Data action: clip(last momentum x amplification).
    ///
    /// Cheap and infallible given at least one row — no file I/O, no model.
    fn momentum_proxy(&self, rows: &[FeatureRow], reason: FallbackReason) -> Signal {
        let last_momentum = rows.last().map(|r| r.momentum_5d).unwrap_or(0.0);
        let raw = last_momentum * self.config.momentum_amplification;
        Signal {
            score: if raw.is_finite() { raw.clamp(-1.0, 1.0) } else { 0.0 },
            explanation: momentum_only_explanation(),
            fallback: Some(reason),
        }
    }
}

/// Proxy explanation: all weight on momentum, zero on every other feature.
fn momentum_only_explanation() -> Vec<(String, f64)> {
    let mut explanation: Vec<(String, f64)> = vec![("momentum_5d".into(), 1.0)];
    explanation.extend(
        MODEL_FEATURES
            .iter()
            .filter(|&&name| name != "momentum_5d")
            .map(|&name| (name.to_string(), 0.0)),
    );
    explanation
}
