//! The fitted linear model contract consumed by every diagnostic.
//!
//! Diagnostics never fit models. They read a [`FittedLinearModel`], which any
//! least-squares routine can populate through [`FittedLinearModelBuilder`]: the
//! builder checks that lengths agree, that values are finite, that residuals equal
//! response minus fitted values, and computes leverage from the design matrix when
//! the caller does not supply it.

use super::error::{DiagnosticsError, Result};
use crate::diagnostics::compute_leverage;
use crate::utils::mat_vec;
use faer::{Col, Mat};

/// Relative tolerance for `residuals = response - fitted_values`.
const CONSISTENCY_TOLERANCE: f64 = 1e-8;

/// A fitted linear model, read-only once built.
///
/// Invariants: `response`, `residuals`, `fitted_values` and `leverage` have length
/// n; `design` is n × p and `coefficients` has length p; leverage lies in [0, 1].
#[derive(Debug, Clone)]
pub struct FittedLinearModel {
    response: Col<f64>,
    design: Mat<f64>,
    column_names: Vec<String>,
    coefficients: Col<f64>,
    residuals: Col<f64>,
    fitted_values: Col<f64>,
    leverage: Col<f64>,
    df_resid: usize,
    has_intercept: bool,
    r_squared: Option<f64>,
    adj_r_squared: Option<f64>,
}

impl FittedLinearModel {
    /// Start assembling a model from its design, response and coefficients.
    pub fn builder(
        design: Mat<f64>,
        response: Col<f64>,
        coefficients: Col<f64>,
    ) -> FittedLinearModelBuilder {
        FittedLinearModelBuilder {
            design,
            response,
            coefficients,
            column_names: None,
            residuals: None,
            fitted_values: None,
            leverage: None,
            df_resid: None,
            has_intercept: false,
            r_squared: None,
            adj_r_squared: None,
        }
    }

    /// Observed response y.
    pub fn response(&self) -> &Col<f64> {
        &self.response
    }

    /// Design matrix X (n × p), intercept column first when present.
    pub fn design(&self) -> &Mat<f64> {
        &self.design
    }

    /// Labels for the design columns.
    pub fn column_names(&self) -> &[String] {
        &self.column_names
    }

    /// Estimated coefficients (length p).
    pub fn coefficients(&self) -> &Col<f64> {
        &self.coefficients
    }

    /// Residuals y - ŷ.
    pub fn residuals(&self) -> &Col<f64> {
        &self.residuals
    }

    /// Fitted values ŷ.
    pub fn fitted_values(&self) -> &Col<f64> {
        &self.fitted_values
    }

    /// Hat-matrix diagonal.
    pub fn leverage(&self) -> &Col<f64> {
        &self.leverage
    }

    /// Residual degrees of freedom.
    pub fn df_resid(&self) -> usize {
        self.df_resid
    }

    /// Whether the first design column is an intercept.
    pub fn has_intercept(&self) -> bool {
        self.has_intercept
    }

    /// Number of observations n.
    pub fn n_observations(&self) -> usize {
        self.response.nrows()
    }

    /// Number of design columns p.
    pub fn n_parameters(&self) -> usize {
        self.design.ncols()
    }

    /// R² as reported by the fitting routine, if it supplied one.
    pub fn reported_r_squared(&self) -> Option<f64> {
        self.r_squared
    }

    /// Adjusted R² as reported by the fitting routine, if it supplied one.
    pub fn reported_adj_r_squared(&self) -> Option<f64> {
        self.adj_r_squared
    }

    /// Residual sum of squares Σ r_i².
    pub fn rss(&self) -> f64 {
        self.residuals.iter().map(|r| r * r).sum()
    }

    /// Residual mean square RSS / df_resid (NaN when df_resid is 0).
    pub fn mse(&self) -> f64 {
        if self.df_resid == 0 {
            f64::NAN
        } else {
            self.rss() / self.df_resid as f64
        }
    }
}

/// Builder for [`FittedLinearModel`].
#[derive(Debug, Clone)]
pub struct FittedLinearModelBuilder {
    design: Mat<f64>,
    response: Col<f64>,
    coefficients: Col<f64>,
    column_names: Option<Vec<String>>,
    residuals: Option<Col<f64>>,
    fitted_values: Option<Col<f64>>,
    leverage: Option<Col<f64>>,
    df_resid: Option<usize>,
    has_intercept: bool,
    r_squared: Option<f64>,
    adj_r_squared: Option<f64>,
}

impl FittedLinearModelBuilder {
    /// Declare that the first design column is an intercept (must be all ones).
    pub fn has_intercept(mut self, has_intercept: bool) -> Self {
        self.has_intercept = has_intercept;
        self
    }

    /// Labels for the design columns.
    pub fn column_names(mut self, names: Vec<String>) -> Self {
        self.column_names = Some(names);
        self
    }

    /// Residuals reported by the fitting routine.
    pub fn residuals(mut self, residuals: Col<f64>) -> Self {
        self.residuals = Some(residuals);
        self
    }

    /// Fitted values reported by the fitting routine (include any offset).
    pub fn fitted_values(mut self, fitted: Col<f64>) -> Self {
        self.fitted_values = Some(fitted);
        self
    }

    /// Hat values reported by the fitting routine.
    pub fn leverage(mut self, leverage: Col<f64>) -> Self {
        self.leverage = Some(leverage);
        self
    }

    /// Residual degrees of freedom (defaults to n - p).
    pub fn df_resid(mut self, df: usize) -> Self {
        self.df_resid = Some(df);
        self
    }

    /// R² and adjusted R² reported by the fitting routine.
    pub fn reported_r_squared(mut self, r_squared: f64, adj_r_squared: f64) -> Self {
        self.r_squared = Some(r_squared);
        self.adj_r_squared = Some(adj_r_squared);
        self
    }

    /// Validate the parts and assemble the model.
    pub fn build(self) -> Result<FittedLinearModel> {
        let n = self.response.nrows();
        let p = self.design.ncols();

        if n == 0 {
            return Err(DiagnosticsError::invalid("model has no observations"));
        }
        if p == 0 {
            return Err(DiagnosticsError::invalid("design matrix has no columns"));
        }
        if self.design.nrows() != n {
            return Err(DiagnosticsError::DimensionMismatch {
                context: "design matrix rows must equal response length",
                expected: n,
                actual: self.design.nrows(),
            });
        }
        if self.coefficients.nrows() != p {
            return Err(DiagnosticsError::DimensionMismatch {
                context: "coefficients length must equal design matrix width",
                expected: p,
                actual: self.coefficients.nrows(),
            });
        }
        ensure_finite("response", self.response.iter())?;
        ensure_finite("coefficients", self.coefficients.iter())?;
        if (0..n).any(|i| (0..p).any(|j| !self.design[(i, j)].is_finite())) {
            return Err(DiagnosticsError::invalid(
                "design matrix contains non-finite values",
            ));
        }

        if self.has_intercept && (0..n).any(|i| self.design[(i, 0)] != 1.0) {
            return Err(DiagnosticsError::invalid(
                "model declares an intercept but the first design column is not all ones",
            ));
        }

        let column_names = match self.column_names {
            Some(names) if names.len() != p => {
                return Err(DiagnosticsError::DimensionMismatch {
                    context: "column names must match design matrix width",
                    expected: p,
                    actual: names.len(),
                })
            }
            Some(names) => names,
            None => default_names(p, self.has_intercept),
        };

        let (fitted_values, residuals) = match (self.fitted_values, self.residuals) {
            (Some(fitted), Some(residuals)) => {
                check_length("fitted values length must equal n", &fitted, n)?;
                check_length("residuals length must equal n", &residuals, n)?;
                (fitted, residuals)
            }
            (Some(fitted), None) => {
                check_length("fitted values length must equal n", &fitted, n)?;
                let residuals = Col::from_fn(n, |i| self.response[i] - fitted[i]);
                (fitted, residuals)
            }
            (None, Some(residuals)) => {
                check_length("residuals length must equal n", &residuals, n)?;
                let fitted = Col::from_fn(n, |i| self.response[i] - residuals[i]);
                (fitted, residuals)
            }
            (None, None) => {
                let fitted = mat_vec(&self.design, &self.coefficients);
                let residuals = Col::from_fn(n, |i| self.response[i] - fitted[i]);
                (fitted, residuals)
            }
        };
        ensure_finite("fitted values", fitted_values.iter())?;
        ensure_finite("residuals", residuals.iter())?;

        let scale = self
            .response
            .iter()
            .fold(1.0_f64, |acc, y| acc.max(y.abs()));
        for i in 0..n {
            let expected = self.response[i] - fitted_values[i];
            if (residuals[i] - expected).abs() > CONSISTENCY_TOLERANCE * scale {
                return Err(DiagnosticsError::invalid(format!(
                    "residual {} does not equal response minus fitted value",
                    i
                )));
            }
        }

        let leverage = match self.leverage {
            Some(leverage) => {
                check_length("leverage length must equal n", &leverage, n)?;
                if leverage
                    .iter()
                    .any(|h| !h.is_finite() || *h < 0.0 || *h > 1.0 + CONSISTENCY_TOLERANCE)
                {
                    return Err(DiagnosticsError::invalid("leverage values must lie in [0, 1]"));
                }
                leverage
            }
            None => compute_leverage(&self.design)?,
        };

        let df_resid = self.df_resid.unwrap_or_else(|| n.saturating_sub(p));
        if df_resid > n {
            return Err(DiagnosticsError::invalid(format!(
                "residual degrees of freedom {} exceed the number of observations {}",
                df_resid, n
            )));
        }

        for (name, value) in [("r_squared", self.r_squared), ("adj_r_squared", self.adj_r_squared)] {
            if let Some(v) = value {
                if !v.is_finite() {
                    return Err(DiagnosticsError::invalid(format!("{} must be finite", name)));
                }
            }
        }

        Ok(FittedLinearModel {
            response: self.response,
            design: self.design,
            column_names,
            coefficients: self.coefficients,
            residuals,
            fitted_values,
            leverage,
            df_resid,
            has_intercept: self.has_intercept,
            r_squared: self.r_squared,
            adj_r_squared: self.adj_r_squared,
        })
    }
}

fn ensure_finite<'a>(what: &str, mut values: impl Iterator<Item = &'a f64>) -> Result<()> {
    if values.any(|v| !v.is_finite()) {
        return Err(DiagnosticsError::invalid(format!(
            "{} contains non-finite values",
            what
        )));
    }
    Ok(())
}

fn check_length(context: &'static str, col: &Col<f64>, n: usize) -> Result<()> {
    if col.nrows() != n {
        return Err(DiagnosticsError::DimensionMismatch {
            context,
            expected: n,
            actual: col.nrows(),
        });
    }
    Ok(())
}

/// `Intercept` for a leading intercept column, then `x1`, `x2`, ... for the rest.
pub(crate) fn default_names(p: usize, has_intercept: bool) -> Vec<String> {
    let first = usize::from(has_intercept);
    (0..p)
        .map(|j| {
            if j < first {
                "Intercept".to_string()
            } else {
                format!("x{}", j + 1 - first)
            }
        })
        .collect()
}
