//! Integration tests for the signal fallback chain.

use chrono::NaiveDate;
use quantterm_core::domain::{Bar, FallbackReason, Source};
use quantterm_core::features::{FeatureConfig, FeaturePipeline};
use quantterm_core::model::{pair_exists, train_model};
use quantterm_core::signal::{SignalConfig, SignalEngine};
use quantterm_core::storage::BarStore;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};

static TEST_COUNTER: AtomicU64 = AtomicU64::new(0);

fn scratch_model_dir() -> PathBuf {
    let id = TEST_COUNTER.fetch_add(1, Ordering::SeqCst);
    let dir = std::env::temp_dir().join(format!(
        "quantterm_signal_test_{}_{id}",
        std::process::id()
    ));
    let _ = std::fs::remove_dir_all(&dir);
    dir
}

fn seed_bars(store: &mut BarStore, symbol: &str, closes: &[f64]) {
    let base = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
    let bars: Vec<Bar> = closes
        .iter()
        .enumerate()
        .map(|(i, &close)| Bar {
            symbol: symbol.into(),
            date: base + chrono::Duration::days(i as i64),
            open: close,
            high: close + 1.0,
            low: close - 1.0,
            close,
            volume: 1000,
            source: Source::Yahoo,
        })
        .collect();
    store.upsert_bars(&bars).unwrap();
}

fn engine(model_dir: &PathBuf) -> SignalEngine {
    SignalEngine::new(
        FeaturePipeline::new("DXY", "FEDFUNDS", FeatureConfig::default()),
        model_dir.clone(),
        SignalConfig::default(),
    )
}

/// Linear ramp: close[i] = 100 + 0.5 * i.
fn ramp(n: usize) -> Vec<f64> {
    (0..n).map(|i| 100.0 + 0.5 * i as f64).collect()
}

#[test]
fn forty_bars_takes_momentum_proxy_without_touching_models() {
    let mut store = BarStore::open_in_memory().unwrap();
    let closes = ramp(40);
    seed_bars(&mut store, "TEST", &closes);

    let model_dir = scratch_model_dir();
    let signal = engine(&model_dir).infer(&mut store, "TEST");

    // 39 feature rows < 50 threshold: clip(last momentum_5d * 5, -1, 1).
    let expected_momentum = closes[39] / closes[34] - 1.0;
    let expected = (expected_momentum * 5.0).clamp(-1.0, 1.0);
    assert!((signal.score - expected).abs() < 1e-9);
    assert_eq!(signal.fallback, Some(FallbackReason::InsufficientData));

    assert_eq!(signal.explanation[0], ("momentum_5d".to_string(), 1.0));
    assert!(signal.explanation[1..].iter().all(|(_, w)| *w == 0.0));

    // The proxy path must not create or read model artifacts.
    assert!(!model_dir.exists());
}

#[test]
fn zero_bars_yields_neutral_labeled_signal() {
    let mut store = BarStore::open_in_memory().unwrap();
    let model_dir = scratch_model_dir();

    let signal = engine(&model_dir).infer(&mut store, "GHOST");
    assert_eq!(signal.score, 0.0);
    assert_eq!(signal.fallback, Some(FallbackReason::NoData));
    assert!(!model_dir.exists());
}

#[test]
fn sufficient_data_trains_on_demand_and_predicts() {
    let mut store = BarStore::open_in_memory().unwrap();
    seed_bars(&mut store, "XAUUSD", &ramp(70));

    let model_dir = scratch_model_dir();
    let signal = engine(&model_dir).infer(&mut store, "XAUUSD");

    assert!(signal.fallback.is_none(), "expected the trained-model path");
    assert!((-1.0..=1.0).contains(&signal.score));
    assert!(pair_exists(&model_dir, "XAUUSD"));

    // Explanation is a proper distribution over the model features.
    let sum: f64 = signal.explanation.iter().map(|(_, w)| w).sum();
    assert!((sum - 1.0).abs() < 1e-9);
    assert!(signal
        .explanation
        .windows(2)
        .all(|w| w[0].1 >= w[1].1), "explanation must be sorted descending");

    let _ = std::fs::remove_dir_all(&model_dir);
}

#[test]
fn corrupt_scaler_degrades_to_momentum_proxy() {
    let mut store = BarStore::open_in_memory().unwrap();
    let closes = ramp(70);
    seed_bars(&mut store, "XAUUSD", &closes);

    let model_dir = scratch_model_dir();
    let pipeline = FeaturePipeline::new("DXY", "FEDFUNDS", FeatureConfig::default());
    train_model(&mut store, &pipeline, &model_dir, "XAUUSD", 50).unwrap();

    // Valid classifier, garbage scaler.
    std::fs::write(model_dir.join("scaler_XAUUSD.json"), "{definitely not json").unwrap();

    let signal = engine(&model_dir).infer(&mut store, "XAUUSD");
    assert_eq!(signal.fallback, Some(FallbackReason::ModelUnusable));

    let expected_momentum = closes[69] / closes[64] - 1.0;
    let expected = (expected_momentum * 5.0).clamp(-1.0, 1.0);
    assert!((signal.score - expected).abs() < 1e-9);

    let _ = std::fs::remove_dir_all(&model_dir);
}

#[test]
fn missing_scaler_beside_valid_model_degrades() {
    let mut store = BarStore::open_in_memory().unwrap();
    seed_bars(&mut store, "ES", &ramp(70));

    let model_dir = scratch_model_dir();
    let pipeline = FeaturePipeline::new("DXY", "FEDFUNDS", FeatureConfig::default());
    train_model(&mut store, &pipeline, &model_dir, "ES", 50).unwrap();
    std::fs::remove_file(model_dir.join("scaler_ES.json")).unwrap();

    // Half a pair counts as Model-Missing: retrain rewrites the scaler and
    // the model path comes back instead of an error.
    let signal = engine(&model_dir).infer(&mut store, "ES");
    assert!((-1.0..=1.0).contains(&signal.score));
    assert!(pair_exists(&model_dir, "ES"));

    let _ = std::fs::remove_dir_all(&model_dir);
}

#[test]
fn training_failure_never_escapes() {
    let mut store = BarStore::open_in_memory().unwrap();
    // 55 bars -> 54 feature rows. With the threshold raised to 54, inference
    // proceeds but training (which drops the unlabeled last row, leaving 53)
    // fails its own minimum check.
    seed_bars(&mut store, "NQ", &ramp(55));

    let model_dir = scratch_model_dir();
    let config = SignalConfig {
        min_feature_rows: 54,
        momentum_amplification: 5.0,
    };
    let engine = SignalEngine::new(
        FeaturePipeline::new("DXY", "FEDFUNDS", FeatureConfig::default()),
        model_dir.clone(),
        config,
    );

    // 54 rows meet the threshold, but training has only 53 labeled samples.
    let signal = engine.infer(&mut store, "NQ");
    assert_eq!(signal.fallback, Some(FallbackReason::TrainingFailed));
    assert!((-1.0..=1.0).contains(&signal.score));
}
