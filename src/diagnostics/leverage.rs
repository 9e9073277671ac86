//! Leverage (hat matrix diagonal) calculations.

use crate::core::Result;
use crate::utils::{PivotedQr, SINGULAR_TOLERANCE};
use faer::{Col, Mat};

/// Compute leverage values (diagonal of hat matrix H = X(X'X)^(-1)X').
///
/// `design` is the full design matrix, including the intercept column when the
/// model has one. The hat values are the squared row norms of Q from a pivoted
/// QR of the design.
///
/// # Properties
/// - h_ii ∈ [0, 1]
/// - Σ h_ii = p (number of design columns)
///
/// Fails with `DegenerateModel` when the design is rank deficient.
pub fn compute_leverage(design: &Mat<f64>) -> Result<Col<f64>> {
    Ok(PivotedQr::new(design, SINGULAR_TOLERANCE)?.leverage())
}

/// Identify high leverage points.
///
/// Returns indices of observations with leverage > threshold.
/// Default threshold is 2p/n where p is number of parameters.
pub fn high_leverage_points(
    leverage: &Col<f64>,
    n_params: usize,
    threshold: Option<f64>,
) -> Vec<usize> {
    let n = leverage.nrows();
    let cutoff = threshold.unwrap_or(2.0 * n_params as f64 / n as f64);

    leverage
        .iter()
        .enumerate()
        .filter(|(_, &h)| h > cutoff)
        .map(|(i, _)| i)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::DiagnosticsError;

    fn with_intercept(x: &Mat<f64>) -> Mat<f64> {
        Mat::from_fn(x.nrows(), x.ncols() + 1, |i, j| {
            if j == 0 {
                1.0
            } else {
                x[(i, j - 1)]
            }
        })
    }

    #[test]
    fn test_leverage_bounds() {
        let x = Mat::from_fn(20, 1, |i, _| (i as f64) * 0.1);
        let leverage = compute_leverage(&with_intercept(&x)).unwrap();

        for i in 0..leverage.nrows() {
            assert!(
                leverage[i] >= 0.0 && leverage[i] <= 1.0,
                "Leverage[{}] = {} should be in [0, 1]",
                i,
                leverage[i]
            );
        }
    }

    #[test]
    fn test_leverage_sum() {
        let x = Mat::from_fn(
            30,
            2,
            |i, j| {
                if j == 0 {
                    i as f64
                } else {
                    (i as f64).sin()
                }
            },
        );
        let leverage = compute_leverage(&with_intercept(&x)).unwrap();

        let sum: f64 = leverage.iter().sum();
        assert!(
            (sum - 3.0).abs() < 1e-8,
            "Sum of leverage {} should equal the number of parameters",
            sum
        );
    }

    #[test]
    fn test_simple_regression_leverage_formula() {
        // h_ii = 1/n + (x_i - x̄)² / Σ(x_j - x̄)²
        let x = Mat::from_fn(5, 1, |i, _| i as f64);
        let leverage = compute_leverage(&with_intercept(&x)).unwrap();

        let sxx = 10.0;
        for i in 0..5 {
            let expected = 0.2 + (i as f64 - 2.0).powi(2) / sxx;
            assert!((leverage[i] - expected).abs() < 1e-10);
        }
    }

    #[test]
    fn test_high_leverage_detection() {
        let mut x = Mat::from_fn(20, 1, |i, _| i as f64);
        x[(19, 0)] = 100.0;

        let leverage = compute_leverage(&with_intercept(&x)).unwrap();
        let high = high_leverage_points(&leverage, 2, None);

        assert!(
            high.contains(&19),
            "Point 19 should be flagged as high leverage"
        );
    }

    #[test]
    fn test_leverage_sum_with_large_offset_covariate() {
        let x = Mat::from_fn(20, 1, |i, _| 1e6 + i as f64);
        let leverage = compute_leverage(&with_intercept(&x)).unwrap();

        let sum: f64 = leverage.iter().sum();
        assert!((sum - 2.0).abs() < 1e-8, "sum of leverage = {}", sum);
        // Endpoints of an evenly spaced covariate: 1/n + (9.5)² / Σ(x - x̄)²
        let expected = 0.05 + 9.5_f64.powi(2) / 665.0;
        assert!((leverage[0] - expected).abs() < 1e-8);
    }

    #[test]
    fn test_singular_design_is_degenerate() {
        let x = Mat::from_fn(10, 2, |i, j| (i as f64) * (j + 1) as f64);
        assert!(matches!(
            compute_leverage(&x),
            Err(DiagnosticsError::DegenerateModel(_))
        ));
    }
}
