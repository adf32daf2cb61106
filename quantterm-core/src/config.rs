//! Application configuration: TOML file with env-var overlay for secrets.
//!
//! Every field has a default, so a missing file is a valid zero-config
//! deployment (Yahoo-only fetching into ./data). Provider keys may live in
//! the file but are usually supplied via `ALPHA_VANTAGE_KEY` / `POLYGON_KEY`;
//! a missing key disables that provider, it never errors.

use crate::data::RetryConfig;
use crate::features::FeatureConfig;
use crate::signal::SignalConfig;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Canonical symbols the deployment tracks.
    pub assets: Vec<String>,
    /// SQLite database path.
    pub db_path: PathBuf,
    /// Directory holding the per-symbol model/scaler artifact pairs.
    pub model_dir: PathBuf,
    /// Reference asset for the rolling correlation feature.
    pub reference_symbol: String,
    /// Fundamentals metric joined as the macro feature.
    pub macro_metric: String,
    /// Bars requested per fetch.
    pub requested_days: usize,
    pub feature: FeatureConfig,
    pub signal: SignalConfig,
    pub retry: RetryConfig,
    pub alpha_vantage_key: Option<String>,
    pub polygon_key: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            assets: ["DXY", "XAUUSD", "ES", "NQ", "EURUSD", "GBPUSD"]
                .into_iter()
                .map(String::from)
                .collect(),
            db_path: PathBuf::from("data/quantterm.db"),
            model_dir: PathBuf::from("models"),
            reference_symbol: "DXY".into(),
            macro_metric: "FEDFUNDS".into(),
            requested_days: 1000,
            feature: FeatureConfig::default(),
            signal: SignalConfig::default(),
            retry: RetryConfig::default(),
            alpha_vantage_key: None,
            polygon_key: None,
        }
    }
}

impl AppConfig {
    /// Load from a TOML file, then overlay provider keys from the
    /// environment. A nonexistent path yields the defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let mut config = if path.exists() {
            let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
                path: path.to_path_buf(),
                source: e,
            })?;
            toml::from_str(&content).map_err(|e| ConfigError::Parse {
                path: path.to_path_buf(),
                source: e,
            })?
        } else {
            Self::default()
        };
        config.overlay_env();
        Ok(config)
    }

    fn overlay_env(&mut self) {
        if self.alpha_vantage_key.is_none() {
            self.alpha_vantage_key = non_empty_env("ALPHA_VANTAGE_KEY");
        }
        if self.polygon_key.is_none() {
            self.polygon_key = non_empty_env("POLYGON_KEY");
        }
    }
}

fn non_empty_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}
