//! Property tests for engine invariants.
//!
//! Uses proptest to verify:
//! 1. Signal scores stay inside [-1, +1] on the momentum-proxy path
//! 2. Upsert idempotence — re-storing a batch never changes row counts
//! 3. Scaler output is finite for finite input
//! 4. Classifier probabilities are valid probabilities

use chrono::NaiveDate;
use proptest::prelude::*;
use quantterm_core::domain::{Bar, Source};
use quantterm_core::features::{FeatureConfig, FeaturePipeline};
use quantterm_core::model::{DirectionClassifier, StandardScaler};
use quantterm_core::signal::{SignalConfig, SignalEngine};
use quantterm_core::storage::BarStore;

// ── Strategies (proptest) ────────────────────────────────────────────

fn arb_close() -> impl Strategy<Value = f64> {
    (1.0..10_000.0_f64).prop_map(|p| (p * 100.0).round() / 100.0)
}

fn arb_closes(len: std::ops::Range<usize>) -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(arb_close(), len)
}

fn seed(store: &mut BarStore, symbol: &str, closes: &[f64]) {
    let base = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
    let bars: Vec<Bar> = closes
        .iter()
        .enumerate()
        .map(|(i, &close)| Bar {
            symbol: symbol.into(),
            date: base + chrono::Duration::days(i as i64),
            open: close,
            high: close + 1.0,
            low: (close - 1.0).max(0.01),
            close,
            volume: 1000,
            source: Source::Yahoo,
        })
        .collect();
    store.upsert_bars(&bars).unwrap();
}

proptest! {
    /// Momentum-proxy scores are bounded for any price history below the
    /// model threshold, however violent the moves.
    #[test]
    fn proxy_score_is_always_bounded(closes in arb_closes(2..45)) {
        let mut store = BarStore::open_in_memory().unwrap();
        seed(&mut store, "PROP", &closes);

        let engine = SignalEngine::new(
            FeaturePipeline::new("DXY", "FEDFUNDS", FeatureConfig::default()),
            std::env::temp_dir().join("quantterm_prop_never_created"),
            SignalConfig::default(),
        );
        let signal = engine.infer(&mut store, "PROP");

        prop_assert!((-1.0..=1.0).contains(&signal.score));
        prop_assert!(signal.fallback.is_some());
        prop_assert!(signal.explanation.iter().all(|(_, w)| *w >= 0.0));
    }

    /// Storing the same batch twice leaves exactly one row per key.
    #[test]
    fn upsert_is_idempotent(closes in arb_closes(1..30)) {
        let mut store = BarStore::open_in_memory().unwrap();
        seed(&mut store, "PROP", &closes);
        let after_first = store.bar_count("PROP");
        seed(&mut store, "PROP", &closes);

        prop_assert_eq!(after_first, closes.len());
        prop_assert_eq!(store.bar_count("PROP"), closes.len());
    }

    /// Scaling finite samples produces finite output.
    #[test]
    fn scaler_output_is_finite(
        rows in prop::collection::vec(
            prop::collection::vec(-1e6..1e6_f64, 3..=3),
            2..50,
        ),
        probe in prop::collection::vec(-1e6..1e6_f64, 3..=3),
    ) {
        let scaler = StandardScaler::fit(&["a", "b", "c"], &rows);
        let scaled = scaler.transform(&probe);
        prop_assert!(scaled.iter().all(|v| v.is_finite()));
    }

    /// predict_proba is a probability regardless of input magnitude.
    #[test]
    fn classifier_outputs_valid_probability(
        samples in prop::collection::vec(
            prop::collection::vec(-10.0..10.0_f64, 2..=2),
            4..40,
        ),
        probe in prop::collection::vec(-100.0..100.0_f64, 2..=2),
    ) {
        let targets: Vec<bool> = samples.iter().map(|row| row[0] > 0.0).collect();
        let model = DirectionClassifier::fit(&["x", "y"], &samples, &targets);
        let p = model.predict_proba(&probe);
        prop_assert!((0.0..=1.0).contains(&p));
    }
}
