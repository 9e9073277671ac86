//! Hypothesis tests on the residuals of a fitted linear model.
//!
//! - Shapiro–Wilk for normality (Royston's approximation, 3 ≤ n ≤ 5000)
//! - Breusch–Pagan for heteroscedasticity (Koenker's studentized form)
//! - Durbin–Watson for first-order autocorrelation
//! - Bonferroni-corrected outlier test on externally studentized residuals

use super::residuals::externally_studentized_residuals;
use crate::core::{DiagnosticOptions, DiagnosticsError, FittedLinearModel, Result};
use crate::utils::{mat_vec, PivotedQr, SINGULAR_TOLERANCE};
use faer::Col;
use statrs::distribution::{ChiSquared, ContinuousCDF, Normal, StudentsT};

const SHAPIRO_MIN_N: usize = 3;
const SHAPIRO_MAX_N: usize = 5000;

/// Shapiro–Wilk W and its p-value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShapiroWilk {
    pub statistic: f64,
    pub p_value: f64,
}

/// Breusch–Pagan Lagrange multiplier statistic.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BreuschPagan {
    pub statistic: f64,
    pub df: usize,
    pub p_value: f64,
}

/// One observation of the Bonferroni outlier test.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OutlierTestRow {
    /// Zero-based observation index.
    pub index: usize,
    pub studentized: f64,
    pub unadjusted_p: f64,
    pub bonferroni_p: f64,
}

/// Results of [`test_residuals`].
#[derive(Debug, Clone)]
pub struct ResidualTests {
    pub shapiro_wilk: ShapiroWilk,
    pub breusch_pagan: BreuschPagan,
    pub durbin_watson: f64,
    /// All observations, sorted by |studentized| descending.
    pub outliers: Vec<OutlierTestRow>,
}

impl ResidualTests {
    /// Outlier rows whose Bonferroni p-value is below `alpha`.
    pub fn significant_outliers(&self, alpha: f64) -> Vec<&OutlierTestRow> {
        self.outliers
            .iter()
            .filter(|row| row.bonferroni_p < alpha)
            .collect()
    }
}

/// Run every residual test on `model` and log a summary.
pub fn test_residuals(
    model: &FittedLinearModel,
    options: &DiagnosticOptions,
) -> Result<ResidualTests> {
    options.validate()?;

    let residuals: Vec<f64> = model.residuals().iter().copied().collect();
    let tests = ResidualTests {
        shapiro_wilk: shapiro_wilk(&residuals)?,
        breusch_pagan: breusch_pagan(model)?,
        durbin_watson: durbin_watson(model.residuals())?,
        outliers: bonferroni_outlier_test(model)?,
    };

    let alpha = options.outlier_alpha;
    tracing::info!(
        shapiro_w = tests.shapiro_wilk.statistic,
        shapiro_p = tests.shapiro_wilk.p_value,
        breusch_pagan_lm = tests.breusch_pagan.statistic,
        breusch_pagan_p = tests.breusch_pagan.p_value,
        durbin_watson = tests.durbin_watson,
        outliers = tests.significant_outliers(alpha).len(),
        alpha,
        "residual tests"
    );

    Ok(tests)
}

/// Shapiro–Wilk normality test.
///
/// Coefficients and p-value use Royston's (1995) polynomial approximations.
///
/// # Errors
/// `InvalidInput` when n is outside [3, 5000] or a value is non-finite;
/// `DegenerateModel` when all values are identical.
pub fn shapiro_wilk(values: &[f64]) -> Result<ShapiroWilk> {
    let n = values.len();
    if !(SHAPIRO_MIN_N..=SHAPIRO_MAX_N).contains(&n) {
        return Err(DiagnosticsError::invalid(format!(
            "Shapiro-Wilk needs between {} and {} observations, got {}",
            SHAPIRO_MIN_N, SHAPIRO_MAX_N, n
        )));
    }
    if values.iter().any(|v| !v.is_finite()) {
        return Err(DiagnosticsError::invalid(
            "Shapiro-Wilk input contains non-finite values",
        ));
    }

    let mut x = values.to_vec();
    x.sort_by(f64::total_cmp);
    if x[n - 1] - x[0] <= 0.0 {
        return Err(DiagnosticsError::degenerate(
            "Shapiro-Wilk input is constant",
        ));
    }

    let a = shapiro_coefficients(n)?;
    let mean = x.iter().sum::<f64>() / n as f64;
    let ss: f64 = x.iter().map(|v| (v - mean).powi(2)).sum();
    let numerator: f64 = a
        .iter()
        .enumerate()
        .map(|(i, ai)| ai * (x[n - 1 - i] - x[i]))
        .sum();
    let mut w = (numerator * numerator / ss).min(1.0);

    let p_value = if n == 3 {
        // Exact distribution for n = 3
        w = w.max(0.75);
        let pi6 = 6.0 / std::f64::consts::PI;
        let stqr = std::f64::consts::FRAC_PI_3;
        (pi6 * (w.sqrt().asin() - stqr)).clamp(0.0, 1.0)
    } else {
        shapiro_p_value(w, n)?
    };

    Ok(ShapiroWilk {
        statistic: w,
        p_value,
    })
}

/// Half-length vector of positive coefficients, largest first.
fn shapiro_coefficients(n: usize) -> Result<Vec<f64>> {
    const C1: [f64; 6] = [0.0, 0.221157, -0.147981, -2.071190, 4.434685, -2.706056];
    const C2: [f64; 6] = [0.0, 0.042981, -0.293762, -1.752461, 5.682633, -3.582633];

    let half = n / 2;
    if n == 3 {
        return Ok(vec![std::f64::consts::FRAC_1_SQRT_2]);
    }

    let normal = standard_normal()?;
    let n_f = n as f64;
    // Expected normal order statistics, lower half (negative)
    let m: Vec<f64> = (1..=half)
        .map(|i| normal.inverse_cdf((i as f64 - 0.375) / (n_f + 0.25)))
        .collect();
    let summ2 = 2.0 * m.iter().map(|v| v * v).sum::<f64>();
    let ssumm2 = summ2.sqrt();
    let rsn = 1.0 / n_f.sqrt();

    let a1 = poly(&C1, rsn) - m[0] / ssumm2;
    let mut a = vec![0.0; half];
    a[0] = a1;

    let (first_scaled, fac) = if n > 5 {
        let a2 = -m[1] / ssumm2 + poly(&C2, rsn);
        let fac = ((summ2 - 2.0 * m[0].powi(2) - 2.0 * m[1].powi(2))
            / (1.0 - 2.0 * a1.powi(2) - 2.0 * a2.powi(2)))
        .sqrt();
        a[1] = a2;
        (2, fac)
    } else {
        let fac = ((summ2 - 2.0 * m[0].powi(2)) / (1.0 - 2.0 * a1.powi(2))).sqrt();
        (1, fac)
    };
    for i in first_scaled..half {
        a[i] = -m[i] / fac;
    }
    Ok(a)
}

fn shapiro_p_value(w: f64, n: usize) -> Result<f64> {
    const G: [f64; 2] = [-2.273, 0.459];
    const C3: [f64; 4] = [0.544, -0.39978, 0.025054, -6.714e-4];
    const C4: [f64; 4] = [1.3822, -0.77857, 0.062767, -0.0020322];
    const C5: [f64; 4] = [-1.5861, -0.31082, -0.083751, 0.0038915];
    const C6: [f64; 3] = [-0.4803, -0.082676, 0.0030302];

    let n_f = n as f64;
    let mut w1 = (1.0 - w).ln();

    let (mean, sd) = if n <= 11 {
        let gamma = poly(&G, n_f);
        if w1 >= gamma {
            return Ok(1e-99);
        }
        w1 = -(gamma - w1).ln();
        (poly(&C3, n_f), poly(&C4, n_f).exp())
    } else {
        let ln_n = n_f.ln();
        (poly(&C5, ln_n), poly(&C6, ln_n).exp())
    };

    let dist = Normal::new(mean, sd)
        .map_err(|e| DiagnosticsError::degenerate(format!("normal distribution: {}", e)))?;
    Ok(dist.sf(w1))
}

/// Evaluate `c[0] + c[1] x + c[2] x² + ...`.
fn poly(coefficients: &[f64], x: f64) -> f64 {
    coefficients.iter().rev().fold(0.0, |acc, c| acc * x + c)
}

fn standard_normal() -> Result<Normal> {
    Normal::new(0.0, 1.0)
        .map_err(|e| DiagnosticsError::degenerate(format!("normal distribution: {}", e)))
}

/// Breusch–Pagan test, Koenker's studentized version.
///
/// Regresses the squared residuals on the model's design matrix; the statistic is
/// `n · R²` of that auxiliary fit, χ² with `p - 1` degrees of freedom.
pub fn breusch_pagan(model: &FittedLinearModel) -> Result<BreuschPagan> {
    let n = model.n_observations();
    let p = model.n_parameters();
    if p < 2 {
        return Err(DiagnosticsError::degenerate(
            "Breusch-Pagan needs at least one regressor besides the constant",
        ));
    }
    if n <= p {
        return Err(DiagnosticsError::degenerate(format!(
            "Breusch-Pagan needs more observations than parameters (n = {}, p = {})",
            n, p
        )));
    }

    let design = model.design();
    let residuals = model.residuals();
    let u = Col::from_fn(n, |i| residuals[i] * residuals[i]);

    let gamma = PivotedQr::new(design, SINGULAR_TOLERANCE)?.solve(&u);
    let fitted = mat_vec(design, &gamma);

    let u_mean = u.iter().sum::<f64>() / n as f64;
    let tss: f64 = u.iter().map(|v| (v - u_mean).powi(2)).sum();
    let rss: f64 = (0..n).map(|i| (u[i] - fitted[i]).powi(2)).sum();
    let r2 = if tss > 0.0 { (1.0 - rss / tss).max(0.0) } else { 0.0 };

    let df = p - 1;
    let statistic = n as f64 * r2;
    let dist = ChiSquared::new(df as f64)
        .map_err(|e| DiagnosticsError::degenerate(format!("chi-squared distribution: {}", e)))?;

    Ok(BreuschPagan {
        statistic,
        df,
        p_value: dist.sf(statistic),
    })
}

/// Durbin–Watson statistic `Σ(e_t - e_{t-1})² / Σe_t²`.
///
/// Values near 2 indicate no first-order autocorrelation.
pub fn durbin_watson(residuals: &Col<f64>) -> Result<f64> {
    let ss: f64 = residuals.iter().map(|e| e * e).sum();
    if ss <= 0.0 {
        return Err(DiagnosticsError::degenerate(
            "Durbin-Watson is undefined for zero residuals",
        ));
    }
    let diff: f64 = (1..residuals.nrows())
        .map(|t| (residuals[t] - residuals[t - 1]).powi(2))
        .sum();
    Ok(diff / ss)
}

/// Bonferroni outlier test.
///
/// Each externally studentized residual is compared with `t(df_resid - 1)`
/// (two-sided); the Bonferroni p-value is `min(1, n · p)`. Rows are sorted by
/// |studentized| descending.
pub fn bonferroni_outlier_test(model: &FittedLinearModel) -> Result<Vec<OutlierTestRow>> {
    let t = externally_studentized_residuals(model)?;
    let n = t.nrows();
    let df = (model.df_resid() - 1) as f64;
    let dist = StudentsT::new(0.0, 1.0, df)
        .map_err(|e| DiagnosticsError::degenerate(format!("t distribution: {}", e)))?;

    let mut rows: Vec<OutlierTestRow> = (0..n)
        .map(|i| {
            let unadjusted_p = 2.0 * dist.sf(t[i].abs());
            OutlierTestRow {
                index: i,
                studentized: t[i],
                unadjusted_p,
                bonferroni_p: (n as f64 * unadjusted_p).min(1.0),
            }
        })
        .collect();
    rows.sort_by(|a, b| b.studentized.abs().total_cmp(&a.studentized.abs()));
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use faer::Mat;

    fn fitted_line(y: &[f64]) -> FittedLinearModel {
        let n = y.len();
        let design = Mat::from_fn(n, 2, |i, j| if j == 0 { 1.0 } else { i as f64 });
        crate::solvers::fit_design(&design, &Col::from_fn(n, |i| y[i]), true).unwrap()
    }

    #[test]
    fn test_shapiro_three_equally_spaced() {
        let result = shapiro_wilk(&[1.0, 2.0, 3.0]).unwrap();
        assert!((result.statistic - 1.0).abs() < 1e-10);
        assert!((result.p_value - 1.0).abs() < 1e-10);
    }

    #[test]
    fn test_shapiro_normal_scores_look_normal() {
        let normal = standard_normal().unwrap();
        let n = 50;
        let x: Vec<f64> = (1..=n)
            .map(|i| normal.inverse_cdf((i as f64 - 0.5) / n as f64))
            .collect();

        let result = shapiro_wilk(&x).unwrap();
        assert!(result.statistic > 0.97);
        assert!(result.p_value > 0.2);
    }

    #[test]
    fn test_shapiro_rejects_skewed_data() {
        let x: Vec<f64> = (1..=30).map(|i| (i as f64 / 3.0).exp()).collect();
        let result = shapiro_wilk(&x).unwrap();
        assert!(result.statistic < 0.9);
        assert!(result.p_value < 0.01);
    }

    #[test]
    fn test_shapiro_small_sample_branch() {
        let result = shapiro_wilk(&[2.1, 3.4, 1.9, 5.6, 2.8, 3.0, 4.1]).unwrap();
        assert!(result.statistic > 0.0 && result.statistic <= 1.0);
        assert!(result.p_value > 0.0 && result.p_value <= 1.0);
    }

    #[test]
    fn test_shapiro_sample_size_limits() {
        assert!(matches!(
            shapiro_wilk(&[1.0, 2.0]),
            Err(DiagnosticsError::InvalidInput(_))
        ));
        assert!(matches!(
            shapiro_wilk(&vec![0.5; 5001]),
            Err(DiagnosticsError::InvalidInput(_))
        ));
        assert!(matches!(
            shapiro_wilk(&[1.0, 1.0, 1.0, 1.0]),
            Err(DiagnosticsError::DegenerateModel(_))
        ));
    }

    #[test]
    fn test_durbin_watson_alternating() {
        let e = Col::from_fn(4, |i| if i % 2 == 0 { 1.0 } else { -1.0 });
        // 3 differences of 2² over Σe² = 4
        assert!((durbin_watson(&e).unwrap() - 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_breusch_pagan_detects_fanning_variance() {
        let y: Vec<f64> = (0..40)
            .map(|i| {
                let sign = if i % 2 == 0 { 1.0 } else { -1.0 };
                1.0 + 0.5 * i as f64 + sign * 0.05 * (i * i) as f64
            })
            .collect();
        let model = fitted_line(&y);
        let bp = breusch_pagan(&model).unwrap();

        assert_eq!(bp.df, 1);
        assert!(bp.statistic > 0.0);
        assert!(bp.p_value < 0.05, "p = {}", bp.p_value);
    }

    #[test]
    fn test_bonferroni_sorted_and_capped() {
        let mut y: Vec<f64> = (0..15)
            .map(|i| 3.0 + 0.2 * i as f64 + 0.1 * ((i * 5) % 3) as f64)
            .collect();
        y[7] += 5.0;
        let model = fitted_line(&y);
        let rows = bonferroni_outlier_test(&model).unwrap();

        assert_eq!(rows.len(), 15);
        assert_eq!(rows[0].index, 7);
        assert!(rows
            .windows(2)
            .all(|w| w[0].studentized.abs() >= w[1].studentized.abs()));
        for row in &rows {
            assert!(row.bonferroni_p <= 1.0);
            assert!(row.bonferroni_p >= row.unadjusted_p);
        }
        assert!(rows[0].bonferroni_p < 0.05);
    }

    #[test]
    fn test_full_suite() {
        let y: Vec<f64> = (0..25)
            .map(|i| 1.0 + 2.0 * i as f64 + 0.3 * (((i * 7) % 11) as f64 - 5.0))
            .collect();
        let model = fitted_line(&y);
        let tests = test_residuals(&model, &DiagnosticOptions::default()).unwrap();

        assert!(tests.durbin_watson >= 0.0 && tests.durbin_watson <= 4.0);
        assert_eq!(tests.outliers.len(), 25);
        assert!(tests.shapiro_wilk.p_value >= 0.0 && tests.shapiro_wilk.p_value <= 1.0);
    }
}
