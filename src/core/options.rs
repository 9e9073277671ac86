//! Fitting and diagnostic configuration.

use thiserror::Error;

/// Configuration for the bundled least-squares fitter.
#[derive(Debug, Clone)]
pub struct RegressionOptions {
    /// Whether to prepend an intercept column (default: true).
    pub with_intercept: bool,
    /// Relative tolerance on the QR diagonal below which the design is rank deficient.
    pub rank_tolerance: f64,
}

impl Default for RegressionOptions {
    fn default() -> Self {
        Self {
            with_intercept: true,
            rank_tolerance: 1e-10,
        }
    }
}

/// Thresholds used by influence and residual diagnostics.
///
/// Defaults follow the conventions of the usual diagnostic plots: leverage is
/// flagged above `3p/n`, DFFITS above `3√(p/n)`, `|1 - COVRATIO|` above `3p/(n-p)`,
/// Cook's distance above the median of `F(p, n-p)` and DFBETAS above 1.
#[derive(Debug, Clone)]
pub struct DiagnosticOptions {
    /// Significance level for residual tests and the outlier test (default: 0.05).
    pub outlier_alpha: f64,
    /// Multiplier applied to the leverage, DFFITS and COVRATIO cutoffs (default: 3.0).
    pub cutoff_scale: f64,
    /// F-distribution quantile used as the Cook's distance cutoff (default: 0.5).
    pub cooks_quantile: f64,
    /// Absolute DFBETAS cutoff (default: 1.0).
    pub dfbetas_cutoff: f64,
    /// A leverage with `1 - h <= leverage_tolerance` counts as fully leveraged.
    pub leverage_tolerance: f64,
}

impl Default for DiagnosticOptions {
    fn default() -> Self {
        Self {
            outlier_alpha: 0.05,
            cutoff_scale: 3.0,
            cooks_quantile: 0.5,
            dfbetas_cutoff: 1.0,
            leverage_tolerance: 1e-10,
        }
    }
}

/// Errors that can occur when validating options.
#[derive(Debug, Error)]
pub enum OptionsError {
    #[error("outlier_alpha must be in (0, 1), got {0}")]
    InvalidAlpha(f64),
    #[error("cutoff_scale must be positive, got {0}")]
    InvalidCutoffScale(f64),
    #[error("cooks_quantile must be in (0, 1), got {0}")]
    InvalidQuantile(f64),
    #[error("dfbetas_cutoff must be positive, got {0}")]
    InvalidDfbetasCutoff(f64),
    #[error("tolerance must be non-negative and finite, got {0}")]
    InvalidTolerance(f64),
}

impl RegressionOptions {
    /// Create a new builder for regression options.
    pub fn builder() -> RegressionOptionsBuilder {
        RegressionOptionsBuilder::default()
    }

    /// Validate the options and return an error if invalid.
    pub fn validate(&self) -> Result<(), OptionsError> {
        if !(self.rank_tolerance >= 0.0 && self.rank_tolerance.is_finite()) {
            return Err(OptionsError::InvalidTolerance(self.rank_tolerance));
        }
        Ok(())
    }
}

impl DiagnosticOptions {
    /// Create a new builder for diagnostic options.
    pub fn builder() -> DiagnosticOptionsBuilder {
        DiagnosticOptionsBuilder::default()
    }

    /// Validate the options and return an error if invalid.
    pub fn validate(&self) -> Result<(), OptionsError> {
        if !(self.outlier_alpha > 0.0 && self.outlier_alpha < 1.0) {
            return Err(OptionsError::InvalidAlpha(self.outlier_alpha));
        }
        if !(self.cutoff_scale > 0.0 && self.cutoff_scale.is_finite()) {
            return Err(OptionsError::InvalidCutoffScale(self.cutoff_scale));
        }
        if !(self.cooks_quantile > 0.0 && self.cooks_quantile < 1.0) {
            return Err(OptionsError::InvalidQuantile(self.cooks_quantile));
        }
        if !(self.dfbetas_cutoff > 0.0 && self.dfbetas_cutoff.is_finite()) {
            return Err(OptionsError::InvalidDfbetasCutoff(self.dfbetas_cutoff));
        }
        if !(self.leverage_tolerance >= 0.0 && self.leverage_tolerance.is_finite()) {
            return Err(OptionsError::InvalidTolerance(self.leverage_tolerance));
        }
        Ok(())
    }
}

/// Builder for `RegressionOptions`.
#[derive(Debug, Clone, Default)]
pub struct RegressionOptionsBuilder {
    options: RegressionOptions,
}

impl RegressionOptionsBuilder {
    /// Create a new builder with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set whether to include an intercept term.
    pub fn with_intercept(mut self, include: bool) -> Self {
        self.options.with_intercept = include;
        self
    }

    /// Set the rank tolerance for QR decomposition.
    pub fn rank_tolerance(mut self, tol: f64) -> Self {
        self.options.rank_tolerance = tol;
        self
    }

    /// Build and validate the options.
    pub fn build(self) -> Result<RegressionOptions, OptionsError> {
        self.options.validate()?;
        Ok(self.options)
    }

    /// Build the options without validation.
    pub fn build_unchecked(self) -> RegressionOptions {
        self.options
    }
}

/// Builder for `DiagnosticOptions`.
#[derive(Debug, Clone, Default)]
pub struct DiagnosticOptionsBuilder {
    options: DiagnosticOptions,
}

impl DiagnosticOptionsBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn outlier_alpha(mut self, alpha: f64) -> Self {
        self.options.outlier_alpha = alpha;
        self
    }

    pub fn cutoff_scale(mut self, scale: f64) -> Self {
        self.options.cutoff_scale = scale;
        self
    }

    pub fn cooks_quantile(mut self, quantile: f64) -> Self {
        self.options.cooks_quantile = quantile;
        self
    }

    pub fn dfbetas_cutoff(mut self, cutoff: f64) -> Self {
        self.options.dfbetas_cutoff = cutoff;
        self
    }

    pub fn leverage_tolerance(mut self, tol: f64) -> Self {
        self.options.leverage_tolerance = tol;
        self
    }

    /// Build and validate the options.
    pub fn build(self) -> Result<DiagnosticOptions, OptionsError> {
        self.options.validate()?;
        Ok(self.options)
    }

    /// Build the options without validation.
    pub fn build_unchecked(self) -> DiagnosticOptions {
        self.options
    }
}
