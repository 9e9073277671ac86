//! Standardized and studentized residuals.

use crate::core::{DiagnosticsError, FittedLinearModel, Result};
use faer::Col;

/// Compute standardized residuals: e_i / s
///
/// Where s is the residual standard error (sqrt of MSE).
pub fn standardized_residuals(model: &FittedLinearModel) -> Result<Col<f64>> {
    let s = residual_scale(model)?;
    let residuals = model.residuals();
    Ok(Col::from_fn(residuals.nrows(), |i| residuals[i] / s))
}

/// Compute internally studentized residuals: e_i / (s * sqrt(1 - h_ii))
///
/// These account for the varying variance of residuals due to leverage. Fully
/// leveraged observations get NaN.
pub fn studentized_residuals(model: &FittedLinearModel) -> Result<Col<f64>> {
    let s = residual_scale(model)?;
    let residuals = model.residuals();
    let leverage = model.leverage();

    Ok(Col::from_fn(residuals.nrows(), |i| {
        let one_minus_h = 1.0 - leverage[i];
        if one_minus_h <= 0.0 {
            f64::NAN
        } else {
            residuals[i] / (s * one_minus_h.sqrt())
        }
    }))
}

/// Compute externally studentized residuals (deleted residuals).
///
/// Uses leave-one-out MSE: e_i / (s_{(i)} * sqrt(1 - h_ii))
/// where s_{(i)} is the standard error computed without observation i.
///
/// These follow a t-distribution with n-p-1 degrees of freedom under null.
pub fn externally_studentized_residuals(model: &FittedLinearModel) -> Result<Col<f64>> {
    let df_resid = model.df_resid();
    if df_resid <= 1 {
        return Err(DiagnosticsError::degenerate(
            "externally studentized residuals need at least 2 residual degrees of freedom",
        ));
    }
    residual_scale(model)?;

    let rss = model.rss();
    let residuals = model.residuals();
    let leverage = model.leverage();
    let df_loo = (df_resid - 1) as f64;

    Ok(Col::from_fn(residuals.nrows(), |i| {
        let e_i = residuals[i];
        let one_minus_h = 1.0 - leverage[i];
        if one_minus_h <= 0.0 {
            return f64::NAN;
        }

        // Leave-one-out RSS: RSS_{(i)} = RSS - e_i² / (1 - h_ii)
        let mse_loo = (rss - e_i * e_i / one_minus_h) / df_loo;
        if mse_loo <= 0.0 {
            return f64::NAN;
        }

        e_i / (mse_loo.sqrt() * one_minus_h.sqrt())
    }))
}

/// Identify outliers based on studentized residuals.
///
/// Returns indices of observations with |r_i| > threshold.
/// Common threshold is 2 or 3.
pub fn residual_outliers(studentized: &Col<f64>, threshold: f64) -> Vec<usize> {
    studentized
        .iter()
        .enumerate()
        .filter(|(_, &r)| r.abs() > threshold)
        .map(|(i, _)| i)
        .collect()
}

/// Residual standard error `s`, failing when it is zero or undefined.
fn residual_scale(model: &FittedLinearModel) -> Result<f64> {
    let mse = model.mse();
    if !mse.is_finite() || mse <= 0.0 {
        return Err(DiagnosticsError::degenerate(
            "residual variance is zero or undefined",
        ));
    }
    Ok(mse.sqrt())
}
