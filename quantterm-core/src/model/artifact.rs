//! Model artifact files: one classifier + one scaler JSON per symbol.
//!
//! The two files are written and loaded as a pair. Every mismatch a stale or
//! hand-edited artifact could introduce (format version, symbol, column
//! order) is a typed error — the signal engine turns those into a momentum
//! proxy instead of a wrong prediction.

use super::classifier::DirectionClassifier;
use super::scaler::StandardScaler;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Bumped when the on-disk layout changes; old artifacts then fail closed
/// through the normal degradation path.
pub const ARTIFACT_FORMAT_VERSION: u32 = 1;

#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("artifact file missing: {path}")]
    Missing { path: PathBuf },

    #[error("artifact I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("artifact malformed at {path}: {reason}")]
    Malformed { path: PathBuf, reason: String },

    #[error("artifact format version {found} (expected {expected})")]
    VersionMismatch { found: u32, expected: u32 },

    #[error("artifact symbol '{found}' does not match requested '{expected}'")]
    SymbolMismatch { found: String, expected: String },

    #[error("classifier and scaler disagree on feature columns")]
    ColumnMismatch,
}

/// Persisted classifier with training provenance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelArtifact {
    pub format_version: u32,
    pub symbol: String,
    pub classifier: DirectionClassifier,
    pub cv_accuracy: f64,
    pub n_samples: usize,
    pub trained_at: NaiveDateTime,
}

/// Persisted scaler, kept separate so either half going missing or corrupt
/// is detectable on its own.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScalerArtifact {
    pub format_version: u32,
    pub symbol: String,
    pub scaler: StandardScaler,
}

pub fn model_path(model_dir: &Path, symbol: &str) -> PathBuf {
    model_dir.join(format!("model_{symbol}.json"))
}

pub fn scaler_path(model_dir: &Path, symbol: &str) -> PathBuf {
    model_dir.join(format!("scaler_{symbol}.json"))
}

/// True when both halves of the pair exist on disk.
pub fn pair_exists(model_dir: &Path, symbol: &str) -> bool {
    model_path(model_dir, symbol).exists() && scaler_path(model_dir, symbol).exists()
}

/// Write both artifact files atomically (tmp file + rename).
pub fn save_pair(
    model_dir: &Path,
    model: &ModelArtifact,
    scaler: &ScalerArtifact,
) -> Result<(), ArtifactError> {
    fs::create_dir_all(model_dir).map_err(|e| ArtifactError::Io {
        path: model_dir.to_path_buf(),
        source: e,
    })?;
    write_json(&model_path(model_dir, &model.symbol), model)?;
    write_json(&scaler_path(model_dir, &scaler.symbol), scaler)?;
    Ok(())
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), ArtifactError> {
    let json = serde_json::to_string_pretty(value).map_err(|e| ArtifactError::Malformed {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, json).map_err(|e| ArtifactError::Io {
        path: tmp.clone(),
        source: e,
    })?;
    fs::rename(&tmp, path).map_err(|e| ArtifactError::Io {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Load and validate the classifier+scaler pair for a symbol.
pub fn load_pair(
    model_dir: &Path,
    symbol: &str,
) -> Result<(ModelArtifact, ScalerArtifact), ArtifactError> {
    let model: ModelArtifact = read_json(&model_path(model_dir, symbol))?;
    let scaler: ScalerArtifact = read_json(&scaler_path(model_dir, symbol))?;

    for (found, expected) in [
        (model.format_version, ARTIFACT_FORMAT_VERSION),
        (scaler.format_version, ARTIFACT_FORMAT_VERSION),
    ] {
        if found != expected {
            return Err(ArtifactError::VersionMismatch { found, expected });
        }
    }
    for found in [&model.symbol, &scaler.symbol] {
        if found != symbol {
            return Err(ArtifactError::SymbolMismatch {
                found: found.clone(),
                expected: symbol.to_string(),
            });
        }
    }
    if model.classifier.columns != scaler.scaler.columns {
        return Err(ArtifactError::ColumnMismatch);
    }
    Ok((model, scaler))
}

fn read_json<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<T, ArtifactError> {
    if !path.exists() {
        return Err(ArtifactError::Missing {
            path: path.to_path_buf(),
        });
    }
    let content = fs::read_to_string(path).map_err(|e| ArtifactError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    serde_json::from_str(&content).map_err(|e| ArtifactError::Malformed {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}
