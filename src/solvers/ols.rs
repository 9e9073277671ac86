//! Ordinary Least Squares regression solver.

use crate::core::{
    default_names, DataFrame, DiagnosticsError, FittedLinearModel, RegressionOptions,
    RegressionOptionsBuilder, Result,
};
use crate::formula::Formula;
use crate::solvers::traits::Regressor;
use crate::utils::{center_vector, mat_vec, PivotedQr, SINGULAR_TOLERANCE};
use faer::{Col, Mat};

/// Ordinary Least Squares regression estimator.
///
/// Solves the least-squares problem with a column-pivoted QR factorisation of the
/// design and rejects rank-deficient designs with `DegenerateModel`. The fit is returned as a
/// [`FittedLinearModel`] ready for the diagnostics.
///
/// # Example
///
/// ```rust,ignore
/// use reglin::solvers::{OlsRegressor, Regressor};
/// use faer::{Mat, Col};
///
/// let x = Mat::from_fn(100, 2, |i, j| (i + j * i * i) as f64);
/// let y = Col::from_fn(100, |i| 1.0 + 2.0 * i as f64);
///
/// let model = OlsRegressor::builder()
///     .with_intercept(true)
///     .build()
///     .fit(&x, &y)?;
///
/// println!("coefficients: {:?}", model.coefficients());
/// ```
#[derive(Debug, Clone)]
pub struct OlsRegressor {
    options: RegressionOptions,
}

impl OlsRegressor {
    /// Create a new OLS regressor with the given options.
    pub fn new(options: RegressionOptions) -> Self {
        Self { options }
    }

    /// Create a builder for configuring the regressor.
    pub fn builder() -> OlsRegressorBuilder {
        OlsRegressorBuilder::default()
    }

    pub fn options(&self) -> &RegressionOptions {
        &self.options
    }

    /// Fit `formula` against `data`.
    ///
    /// The response comes from the left-hand side. Offsets are subtracted from the
    /// response before solving and added back to the fitted values. The formula,
    /// not `with_intercept`, decides whether an intercept is present.
    pub fn fit_formula(&self, formula: &str, data: &DataFrame) -> Result<FittedLinearModel> {
        self.options.validate()?;
        let formula = Formula::parse(formula)?;
        let design = formula.design_matrix(data)?;
        let y = formula.response_vector(data)?;

        let n = y.nrows();
        let adjusted = Col::from_fn(n, |i| y[i] - design.offset[i]);
        let (beta, leverage) = solve(&design.matrix, &adjusted, self.options.rank_tolerance)?;

        let linear = mat_vec(&design.matrix, &beta);
        let fitted = Col::from_fn(n, |i| linear[i] + design.offset[i]);

        assemble(
            design.matrix,
            design.column_names,
            y,
            beta,
            fitted,
            leverage,
            design.has_intercept,
        )
    }
}

impl Regressor for OlsRegressor {
    fn fit(&self, x: &Mat<f64>, y: &Col<f64>) -> Result<FittedLinearModel> {
        self.options.validate()?;
        if x.nrows() != y.nrows() {
            return Err(DiagnosticsError::DimensionMismatch {
                context: "X rows must equal y length",
                expected: y.nrows(),
                actual: x.nrows(),
            });
        }

        let design = if self.options.with_intercept {
            Mat::from_fn(x.nrows(), x.ncols() + 1, |i, j| {
                if j == 0 {
                    1.0
                } else {
                    x[(i, j - 1)]
                }
            })
        } else {
            x.to_owned()
        };
        let names = default_names(design.ncols(), self.options.with_intercept);

        let (beta, leverage) = solve(&design, y, self.options.rank_tolerance)?;
        let fitted = mat_vec(&design, &beta);
        assemble(
            design,
            names,
            y.clone(),
            beta,
            fitted,
            leverage,
            self.options.with_intercept,
        )
    }
}

/// Fit a ready-made design matrix by least squares.
///
/// `has_intercept` declares that the first column is the intercept. An exactly
/// determined system (n = p) is accepted and yields zero residual degrees of
/// freedom.
pub fn fit_design(
    design: &Mat<f64>,
    y: &Col<f64>,
    has_intercept: bool,
) -> Result<FittedLinearModel> {
    if design.nrows() != y.nrows() {
        return Err(DiagnosticsError::DimensionMismatch {
            context: "design matrix rows must equal response length",
            expected: y.nrows(),
            actual: design.nrows(),
        });
    }
    let (beta, leverage) = solve(design, y, SINGULAR_TOLERANCE)?;
    let fitted = mat_vec(design, &beta);
    let names = default_names(design.ncols(), has_intercept);
    assemble(
        design.to_owned(),
        names,
        y.clone(),
        beta,
        fitted,
        leverage,
        has_intercept,
    )
}

/// β from a pivoted QR of the design, returned with the hat values.
fn solve(design: &Mat<f64>, y: &Col<f64>, tolerance: f64) -> Result<(Col<f64>, Col<f64>)> {
    if design.nrows() == 0 {
        return Err(DiagnosticsError::invalid("cannot fit a model to zero observations"));
    }
    if y.iter().any(|v| !v.is_finite()) {
        return Err(DiagnosticsError::invalid("response contains non-finite values"));
    }

    let qr = PivotedQr::new(design, tolerance)?;
    Ok((qr.solve(y), qr.leverage()))
}

fn assemble(
    design: Mat<f64>,
    column_names: Vec<String>,
    y: Col<f64>,
    beta: Col<f64>,
    fitted: Col<f64>,
    leverage: Col<f64>,
    has_intercept: bool,
) -> Result<FittedLinearModel> {
    let n = y.nrows();
    let p = design.ncols();
    let df_resid = n - p;

    let residuals = Col::from_fn(n, |i| y[i] - fitted[i]);

    let rss: f64 = residuals.iter().map(|e| e * e).sum();
    let tss: f64 = if has_intercept {
        let (centered, _) = center_vector(&y);
        centered.iter().map(|v| v * v).sum()
    } else {
        y.iter().map(|v| v * v).sum()
    };

    tracing::debug!(
        observations = n,
        parameters = p,
        df_resid,
        rss,
        "fitted ordinary least squares"
    );

    let mut builder = FittedLinearModel::builder(design, y, beta)
        .has_intercept(has_intercept)
        .column_names(column_names)
        .fitted_values(fitted)
        .residuals(residuals)
        .leverage(leverage)
        .df_resid(df_resid);

    if tss > 0.0 && df_resid > 0 {
        let r2 = 1.0 - rss / tss;
        let k = usize::from(has_intercept);
        let adj = 1.0 - (1.0 - r2) * (n - k) as f64 / df_resid as f64;
        builder = builder.reported_r_squared(r2, adj);
    }

    builder.build()
}

/// Builder for `OlsRegressor`.
#[derive(Debug, Clone, Default)]
pub struct OlsRegressorBuilder {
    builder: RegressionOptionsBuilder,
}

impl OlsRegressorBuilder {
    /// Create a new builder with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set whether to include an intercept term.
    pub fn with_intercept(mut self, include: bool) -> Self {
        self.builder = self.builder.with_intercept(include);
        self
    }

    /// Set the relative rank tolerance of the QR factorisation.
    pub fn rank_tolerance(mut self, tol: f64) -> Self {
        self.builder = self.builder.rank_tolerance(tol);
        self
    }

    /// Build the OLS regressor. Options are validated when fitting.
    pub fn build(self) -> OlsRegressor {
        OlsRegressor::new(self.builder.build_unchecked())
    }
}
