//! Matrix utility functions.

use crate::core::{DiagnosticsError, Result};
use faer::{Col, Mat};

/// Relative tolerance on the pivoted R diagonal below which X is treated as singular.
pub const SINGULAR_TOLERANCE: f64 = 1e-10;

/// Center a vector by subtracting the mean.
pub fn center_vector(y: &Col<f64>) -> (Col<f64>, f64) {
    let n = y.nrows();
    let mean: f64 = y.iter().sum::<f64>() / n as f64;

    let centered = Col::from_fn(n, |i| y[i] - mean);

    (centered, mean)
}

/// Compute X·b.
pub fn mat_vec(design: &Mat<f64>, b: &Col<f64>) -> Col<f64> {
    Col::from_fn(design.nrows(), |i| {
        (0..design.ncols()).map(|j| design[(i, j)] * b[j]).sum()
    })
}

/// Column-pivoted QR factorisation `X P = Q₁ R` of a full-rank design.
///
/// Works on X directly rather than on X'X, so poorly scaled columns (a covariate
/// far from zero next to the intercept) keep their precision.
#[derive(Debug, Clone)]
pub struct PivotedQr {
    /// n × p orthonormal factor.
    q: Mat<f64>,
    /// p × p upper triangular factor.
    r: Mat<f64>,
    /// `pivots[k]` is the original column factored at position k.
    pivots: Vec<usize>,
}

impl PivotedQr {
    /// Factor `design`, rejecting it when it has no columns, fewer rows than
    /// columns, or a pivot below `tolerance` relative to the largest one.
    pub fn new(design: &Mat<f64>, tolerance: f64) -> Result<Self> {
        let (n, p) = (design.nrows(), design.ncols());
        if p == 0 {
            return Err(DiagnosticsError::degenerate("design matrix has no columns"));
        }
        if n < p {
            return Err(DiagnosticsError::degenerate(format!(
                "need at least as many observations as parameters (n = {}, p = {})",
                n, p
            )));
        }

        let qr = design.col_piv_qr();
        let q = qr.compute_thin_Q();
        let r = qr.thin_R().to_owned();
        let pivots = qr.P().arrays().0.to_vec();

        // Pivoting orders |r_kk| non-increasingly, so r_00 is the largest
        let largest = r[(0, 0)].abs();
        let rank = (0..p)
            .take_while(|&k| r[(k, k)].abs() > tolerance * largest)
            .count();
        if largest == 0.0 || rank < p {
            return Err(DiagnosticsError::degenerate(format!(
                "design matrix is rank deficient (rank {} < {} columns)",
                rank, p
            )));
        }

        Ok(Self { q, r, pivots })
    }

    pub fn ncols(&self) -> usize {
        self.r.ncols()
    }

    /// Least-squares coefficients for `y`, in the original column order.
    pub fn solve(&self, y: &Col<f64>) -> Col<f64> {
        let p = self.ncols();
        let qty = self.q.transpose() * y;

        let mut permuted = Col::<f64>::zeros(p);
        for i in (0..p).rev() {
            let mut sum = qty[i];
            for j in (i + 1)..p {
                sum -= self.r[(i, j)] * permuted[j];
            }
            permuted[i] = sum / self.r[(i, i)];
        }

        let mut beta = Col::zeros(p);
        for (k, &column) in self.pivots.iter().enumerate() {
            beta[column] = permuted[k];
        }
        beta
    }

    /// Hat values `h_ii = ‖Q₁[i, ·]‖²`.
    pub fn leverage(&self) -> Col<f64> {
        Col::from_fn(self.q.nrows(), |i| {
            let h: f64 = (0..self.ncols()).map(|k| self.q[(i, k)].powi(2)).sum();
            h.min(1.0)
        })
    }

    /// (X'X)⁻¹ = P R⁻¹ R⁻ᵀ Pᵀ, in the original column order.
    pub fn xtx_inverse(&self) -> Mat<f64> {
        let p = self.ncols();

        // Back-substitute R · r_inv[:, col] = e_col
        let mut r_inv = Mat::<f64>::zeros(p, p);
        for col in 0..p {
            for i in (0..=col).rev() {
                let mut sum = if i == col { 1.0 } else { 0.0 };
                for j in (i + 1)..=col {
                    sum -= self.r[(i, j)] * r_inv[(j, col)];
                }
                r_inv[(i, col)] = sum / self.r[(i, i)];
            }
        }

        let mut inv = Mat::zeros(p, p);
        for a in 0..p {
            for b in 0..p {
                let value: f64 = (a.max(b)..p)
                    .map(|k| r_inv[(a, k)] * r_inv[(b, k)])
                    .sum();
                inv[(self.pivots[a], self.pivots[b])] = value;
            }
        }
        inv
    }
}

/// Compute (X'X)⁻¹ through a pivoted QR of X.
///
/// Fails with `DegenerateModel` when X has no columns or is rank deficient.
pub fn xtx_inverse(design: &Mat<f64>, tolerance: f64) -> Result<Mat<f64>> {
    Ok(PivotedQr::new(design, tolerance)?.xtx_inverse())
}
