//! Training routine: features → target → time-ordered CV → artifacts.

use super::artifact::{
    save_pair, ArtifactError, ModelArtifact, ScalerArtifact, ARTIFACT_FORMAT_VERSION,
};
use super::classifier::DirectionClassifier;
use super::scaler::StandardScaler;
use crate::domain::MODEL_FEATURES;
use crate::features::FeaturePipeline;
use crate::storage::{BarStore, StorageError};
use std::path::Path;
use thiserror::Error;
use tracing::info;

/// Cross-validation folds (time-ordered, expanding window, never shuffled).
const CV_SPLITS: usize = 5;

/// Training metrics returned to the caller and logged to model_metadata.
#[derive(Debug, Clone)]
pub struct TrainReport {
    pub cv_accuracy: f64,
    pub n_features: usize,
    pub n_samples: usize,
}

#[derive(Debug, Error)]
pub enum TrainError {
    #[error("insufficient training data for '{symbol}': {rows} rows, need {required}")]
    InsufficientData {
        symbol: String,
        rows: usize,
        required: usize,
    },

    #[error(transparent)]
    Artifact(#[from] ArtifactError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Train a direction classifier for one symbol and persist the artifact pair.
///
/// The target is next-row direction: target[i] = returns[i+1] > 0, so the
/// last feature row has no label and is dropped. Sample count below
/// `min_rows` is an explicit error the signal chain catches and degrades on.
pub fn train_model(
    store: &mut BarStore,
    pipeline: &FeaturePipeline,
    model_dir: &Path,
    symbol: &str,
    min_rows: usize,
) -> Result<TrainReport, TrainError> {
    let rows = pipeline.engineer(store, symbol);

    // Last row has no next-period return to label it with.
    let usable = rows.len().saturating_sub(1);
    if usable < min_rows {
        return Err(TrainError::InsufficientData {
            symbol: symbol.to_string(),
            rows: usable,
            required: min_rows,
        });
    }

    let samples: Vec<Vec<f64>> = rows[..usable]
        .iter()
        .map(|r| r.model_values().to_vec())
        .collect();
    let targets: Vec<bool> = (0..usable).map(|i| rows[i + 1].returns > 0.0).collect();

    let scaler = StandardScaler::fit(&MODEL_FEATURES, &samples);
    let scaled = scaler.transform_all(&samples);

    let cv_accuracy = time_series_cv(&scaled, &targets);

    let classifier = DirectionClassifier::fit(&MODEL_FEATURES, &scaled, &targets);

    let model = ModelArtifact {
        format_version: ARTIFACT_FORMAT_VERSION,
        symbol: symbol.to_string(),
        classifier,
        cv_accuracy,
        n_samples: usable,
        trained_at: chrono::Utc::now().naive_utc(),
    };
    let scaler_artifact = ScalerArtifact {
        format_version: ARTIFACT_FORMAT_VERSION,
        symbol: symbol.to_string(),
        scaler,
    };
    save_pair(model_dir, &model, &scaler_artifact)?;

    let report = TrainReport {
        cv_accuracy,
        n_features: MODEL_FEATURES.len(),
        n_samples: usable,
    };
    store.record_model_metadata(
        &format!("logit_{symbol}"),
        &ARTIFACT_FORMAT_VERSION.to_string(),
        &format!(r#"{{"cv_splits":{CV_SPLITS},"min_rows":{min_rows}}}"#),
        &format!(
            r#"{{"cv_accuracy":{:.4},"n_features":{},"n_samples":{}}}"#,
            report.cv_accuracy, report.n_features, report.n_samples
        ),
    )?;

    info!(
        symbol,
        cv_accuracy = report.cv_accuracy,
        n_samples = report.n_samples,
        "trained model"
    );
    Ok(report)
}

/// Expanding-window cross validation: fold k trains on everything before its
/// validation block and never sees the future.
fn time_series_cv(scaled: &[Vec<f64>], targets: &[bool]) -> f64 {
    let n = scaled.len();
    let fold = n / (CV_SPLITS + 1);
    if fold == 0 {
        return 0.0;
    }

    let mut accuracies = Vec::with_capacity(CV_SPLITS);
    for k in 1..=CV_SPLITS {
        let train_end = fold * k;
        let val_end = if k == CV_SPLITS { n } else { fold * (k + 1) };

        let model = DirectionClassifier::fit(
            &MODEL_FEATURES,
            &scaled[..train_end],
            &targets[..train_end],
        );

        let val = &scaled[train_end..val_end];
        let correct = val
            .iter()
            .zip(&targets[train_end..val_end])
            .filter(|(row, &target)| model.predict(row) == target)
            .count();
        accuracies.push(correct as f64 / val.len().max(1) as f64);
    }
    accuracies.iter().sum::<f64>() / accuracies.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cv_fold_boundaries_never_leak_future() {
        // Alternating pattern the model can track; mostly a shape check:
        // accuracy must be a valid proportion for every fold layout.
        let scaled: Vec<Vec<f64>> = (0..30)
            .map(|i| vec![if i % 2 == 0 { 1.0 } else { -1.0 }])
            .collect();
        let targets: Vec<bool> = (0..30).map(|i| i % 2 == 0).collect();
        let acc = time_series_cv(&scaled, &targets);
        assert!((0.0..=1.0).contains(&acc));
    }

    #[test]
    fn cv_with_tiny_sample_is_zero_not_panic() {
        let acc = time_series_cv(&[vec![1.0]], &[true]);
        assert_eq!(acc, 0.0);
    }
}
