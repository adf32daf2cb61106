//! Rolling-window statistics over f64 series.
//!
//! All functions return a vector the same length as the input, with NaN
//! where the window is not yet full or contains NaN. The caller decides the
//! fill policy; these helpers only propagate.

/// Rolling sample standard deviation (ddof = 1).
pub fn rolling_std(values: &[f64], window: usize) -> Vec<f64> {
    assert!(window >= 2, "std window must be >= 2");
    let n = values.len();
    let mut result = vec![f64::NAN; n];

    for i in (window - 1)..n {
        let slice = &values[i + 1 - window..=i];
        if slice.iter().any(|v| v.is_nan()) {
            continue;
        }
        let mean = slice.iter().sum::<f64>() / window as f64;
        let var = slice.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (window - 1) as f64;
        result[i] = var.sqrt();
    }
    result
}

/// Rolling Pearson correlation between two equal-length series.
///
/// Windows where either side has zero variance yield NaN (correlation is
/// undefined there, not zero — the caller's neutral fill makes that call).
pub fn rolling_corr(a: &[f64], b: &[f64], window: usize) -> Vec<f64> {
    assert_eq!(a.len(), b.len(), "correlation inputs must align");
    assert!(window >= 2, "correlation window must be >= 2");
    let n = a.len();
    let mut result = vec![f64::NAN; n];

    for i in (window - 1)..n {
        let wa = &a[i + 1 - window..=i];
        let wb = &b[i + 1 - window..=i];
        if wa.iter().chain(wb.iter()).any(|v| v.is_nan()) {
            continue;
        }
        let mean_a = wa.iter().sum::<f64>() / window as f64;
        let mean_b = wb.iter().sum::<f64>() / window as f64;

        let mut cov = 0.0;
        let mut var_a = 0.0;
        let mut var_b = 0.0;
        for k in 0..window {
            let da = wa[k] - mean_a;
            let db = wb[k] - mean_b;
            cov += da * db;
            var_a += da * da;
            var_b += db * db;
        }
        if var_a <= f64::EPSILON || var_b <= f64::EPSILON {
            continue;
        }
        result[i] = cov / (var_a.sqrt() * var_b.sqrt());
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_approx(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-10,
            "assert_approx failed: actual={actual}, expected={expected}"
        );
    }

    #[test]
    fn std_warmup_is_nan() {
        let result = rolling_std(&[1.0, 2.0, 3.0, 4.0], 3);
        assert!(result[0].is_nan());
        assert!(result[1].is_nan());
        assert!(!result[2].is_nan());
    }

    #[test]
    fn std_of_constant_series_is_zero() {
        let result = rolling_std(&[5.0; 6], 3);
        assert_approx(result[5], 0.0);
    }

    #[test]
    fn std_known_value() {
        // sample std of [1, 2, 3] = 1
        let result = rolling_std(&[1.0, 2.0, 3.0], 3);
        assert_approx(result[2], 1.0);
    }

    #[test]
    fn std_nan_in_window_propagates() {
        let result = rolling_std(&[1.0, f64::NAN, 3.0, 4.0, 5.0], 3);
        assert!(result[2].is_nan());
        assert!(result[3].is_nan());
        assert!(!result[4].is_nan());
    }

    #[test]
    fn corr_of_identical_series_is_one() {
        let xs = [1.0, 3.0, 2.0, 5.0, 4.0];
        let result = rolling_corr(&xs, &xs, 3);
        assert_approx(result[4], 1.0);
    }

    #[test]
    fn corr_of_negated_series_is_minus_one() {
        let xs = [1.0, 3.0, 2.0, 5.0, 4.0];
        let ys: Vec<f64> = xs.iter().map(|v| -v).collect();
        let result = rolling_corr(&xs, &ys, 3);
        assert_approx(result[4], -1.0);
    }

    #[test]
    fn corr_zero_variance_is_nan() {
        let xs = [1.0, 1.0, 1.0, 1.0];
        let ys = [1.0, 2.0, 3.0, 4.0];
        let result = rolling_corr(&xs, &ys, 3);
        assert!(result[3].is_nan());
    }
}
