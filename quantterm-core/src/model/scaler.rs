//! Per-column standardization fitted at training time.

use serde::{Deserialize, Serialize};

/// Standard scaler: (x - mean) / std per column.
///
/// Records the column order it was fitted with; the artifact loader checks
/// that order against the paired classifier so a stale scaler can never be
/// applied to reordered features.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StandardScaler {
    pub columns: Vec<String>,
    means: Vec<f64>,
    stds: Vec<f64>,
}

impl StandardScaler {
    /// Fit means and stds over the sample rows (columns = row layout).
    pub fn fit(columns: &[&str], samples: &[Vec<f64>]) -> Self {
        let dim = columns.len();
        let n = samples.len().max(1) as f64;

        let mut means = vec![0.0; dim];
        for row in samples {
            for (j, v) in row.iter().enumerate() {
                means[j] += v;
            }
        }
        for m in &mut means {
            *m /= n;
        }

        let mut stds = vec![0.0; dim];
        for row in samples {
            for (j, v) in row.iter().enumerate() {
                stds[j] += (v - means[j]).powi(2);
            }
        }
        for s in &mut stds {
            *s = (*s / n).sqrt();
            // A constant column scales to zero, not to infinity.
            if *s <= f64::EPSILON {
                *s = 1.0;
            }
        }

        Self {
            columns: columns.iter().map(|c| c.to_string()).collect(),
            means,
            stds,
        }
    }

    /// Scale one row (must match the fitted column layout).
    pub fn transform(&self, row: &[f64]) -> Vec<f64> {
        debug_assert_eq!(row.len(), self.means.len());
        row.iter()
            .zip(self.means.iter().zip(self.stds.iter()))
            .map(|(v, (mean, std))| (v - mean) / std)
            .collect()
    }

    /// Scale a batch of rows.
    pub fn transform_all(&self, rows: &[Vec<f64>]) -> Vec<Vec<f64>> {
        rows.iter().map(|r| self.transform(r)).collect()
    }
}
