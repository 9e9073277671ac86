//! Core trait for regression estimators.

use crate::core::{FittedLinearModel, Result};
use faer::{Col, Mat};

/// A regression estimator that can be fit to data.
///
/// Fitting returns the shared [`FittedLinearModel`] so that every estimator feeds
/// the same diagnostics.
pub trait Regressor {
    /// Fit the model to the data.
    ///
    /// # Arguments
    /// * `x` - Design matrix of shape (n_samples, n_features)
    /// * `y` - Target vector of length n_samples
    fn fit(&self, x: &Mat<f64>, y: &Col<f64>) -> Result<FittedLinearModel>;
}
