//! Binary direction classifier: logistic regression over scaled features.
//!
//! Trained with deterministic batch gradient descent (zero-initialized
//! weights, fixed schedule) so retraining on identical data reproduces the
//! identical artifact. Feature importances are normalized absolute weights,
//! which keeps the explanation vector non-negative and cheap.

use serde::{Deserialize, Serialize};

const EPOCHS: usize = 300;
const LEARNING_RATE: f64 = 0.1;
const L2_PENALTY: f64 = 1e-4;

fn sigmoid(z: f64) -> f64 {
    1.0 / (1.0 + (-z).exp())
}

/// Logistic-regression classifier for next-period direction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirectionClassifier {
    pub columns: Vec<String>,
    weights: Vec<f64>,
    bias: f64,
}

impl DirectionClassifier {
    /// Fit on scaled samples with binary targets (1 = next period up).
    pub fn fit(columns: &[&str], samples: &[Vec<f64>], targets: &[bool]) -> Self {
        assert_eq!(samples.len(), targets.len(), "samples/targets must align");
        let dim = columns.len();
        let n = samples.len().max(1) as f64;

        let mut weights = vec![0.0; dim];
        let mut bias = 0.0;

        for _ in 0..EPOCHS {
            let mut grad_w = vec![0.0; dim];
            let mut grad_b = 0.0;

            for (row, &target) in samples.iter().zip(targets) {
                let z = bias
                    + row
                        .iter()
                        .zip(weights.iter())
                        .map(|(x, w)| x * w)
                        .sum::<f64>();
                let err = sigmoid(z) - if target { 1.0 } else { 0.0 };
                for (g, x) in grad_w.iter_mut().zip(row.iter()) {
                    *g += err * x;
                }
                grad_b += err;
            }

            for (w, g) in weights.iter_mut().zip(grad_w.iter()) {
                *w -= LEARNING_RATE * (g / n + L2_PENALTY * *w);
            }
            bias -= LEARNING_RATE * grad_b / n;
        }

        Self {
            columns: columns.iter().map(|c| c.to_string()).collect(),
            weights,
            bias,
        }
    }

    /// Probability that the next period closes up.
    pub fn predict_proba(&self, row: &[f64]) -> f64 {
        debug_assert_eq!(row.len(), self.weights.len());
        let z = self.bias
            + row
                .iter()
                .zip(self.weights.iter())
                .map(|(x, w)| x * w)
                .sum::<f64>();
        sigmoid(z)
    }

    /// Hard class prediction at the 0.5 threshold.
    pub fn predict(&self, row: &[f64]) -> bool {
        self.predict_proba(row) > 0.5
    }

    /// Non-negative feature importances, sorted descending, summing to 1.
    ///
    /// An untrained/degenerate model (all-zero weights) reports uniform
    /// importance rather than an all-zero explanation.
    pub fn importances(&self) -> Vec<(String, f64)> {
        let total: f64 = self.weights.iter().map(|w| w.abs()).sum();
        let dim = self.columns.len().max(1);

        let mut pairs: Vec<(String, f64)> = self
            .columns
            .iter()
            .zip(self.weights.iter())
            .map(|(name, w)| {
                let weight = if total > f64::EPSILON {
                    w.abs() / total
                } else {
                    1.0 / dim as f64
                };
                (name.clone(), weight)
            })
            .collect();
        pairs.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        pairs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Linearly separable on the first feature: x0 > 0 means up.
    fn separable_data() -> (Vec<Vec<f64>>, Vec<bool>) {
        let mut samples = Vec::new();
        let mut targets = Vec::new();
        for i in 0..40 {
            let sign = if i % 2 == 0 { 1.0 } else { -1.0 };
            let magnitude = 0.5 + (i % 7) as f64 * 0.2;
            samples.push(vec![sign * magnitude, ((i % 5) as f64 - 2.0) * 0.1]);
            targets.push(sign > 0.0);
        }
        (samples, targets)
    }

    #[test]
    fn learns_separable_pattern() {
        let (samples, targets) = separable_data();
        let model = DirectionClassifier::fit(&["signal", "noise"], &samples, &targets);

        assert!(model.predict_proba(&[1.0, 0.0]) > 0.7);
        assert!(model.predict_proba(&[-1.0, 0.0]) < 0.3);
        assert!(model.predict(&[2.0, 0.1]));
        assert!(!model.predict(&[-2.0, 0.1]));
    }

    #[test]
    fn importances_rank_informative_feature_first() {
        let (samples, targets) = separable_data();
        let model = DirectionClassifier::fit(&["signal", "noise"], &samples, &targets);
        let importances = model.importances();

        assert_eq!(importances[0].0, "signal");
        let sum: f64 = importances.iter().map(|(_, w)| w).sum();
        assert!((sum - 1.0).abs() < 1e-9);
        assert!(importances.iter().all(|(_, w)| *w >= 0.0));
    }

    #[test]
    fn untrained_model_reports_uniform_importance() {
        let model = DirectionClassifier::fit(&["a", "b"], &[], &[]);
        let importances = model.importances();
        assert!((importances[0].1 - 0.5).abs() < 1e-12);
        assert!((importances[1].1 - 0.5).abs() < 1e-12);
    }

    #[test]
    fn fit_is_deterministic() {
        let (samples, targets) = separable_data();
        let a = DirectionClassifier::fit(&["x", "y"], &samples, &targets);
        let b = DirectionClassifier::fit(&["x", "y"], &samples, &targets);
        assert_eq!(
            serde_json::to_string(&a).unwrap(),
            serde_json::to_string(&b).unwrap()
        );
    }
}
