//! Coefficient of determination.

use super::anova::total_sum_of_squares;
use crate::core::{DiagnosticsError, FittedLinearModel, Result};

/// R² of the model.
///
/// Returns the value reported by the fitting routine when present; otherwise
/// `1 - RSS/TSS` with TSS centered for models with an intercept and uncentered
/// without. A perfect fit gives 1.
///
/// # Errors
/// `DegenerateModel` when TSS is zero but the residuals are not.
pub fn r_squared(model: &FittedLinearModel) -> Result<f64> {
    if let Some(r2) = model.reported_r_squared() {
        return Ok(r2);
    }
    recomputed_r_squared(model)
}

/// Adjusted R²: `1 - (1 - R²)(n - k)/df_resid`, with `k = 1` for an intercept
/// model and `0` otherwise.
///
/// # Errors
/// `DegenerateModel` when the residual degrees of freedom are zero.
pub fn adjusted_r_squared(model: &FittedLinearModel) -> Result<f64> {
    if let Some(adj) = model.reported_adj_r_squared() {
        return Ok(adj);
    }

    let df_resid = model.df_resid();
    if df_resid == 0 {
        return Err(DiagnosticsError::degenerate(
            "adjusted R² needs positive residual degrees of freedom",
        ));
    }
    let r2 = recomputed_r_squared(model)?;
    let k = usize::from(model.has_intercept());
    let n = model.n_observations();

    Ok(1.0 - (1.0 - r2) * (n - k) as f64 / df_resid as f64)
}

fn recomputed_r_squared(model: &FittedLinearModel) -> Result<f64> {
    let tss = total_sum_of_squares(model);
    let rss = model.rss();

    if rss == 0.0 {
        return Ok(1.0);
    }
    if tss == 0.0 {
        return Err(DiagnosticsError::degenerate(
            "total sum of squares is zero; R² is undefined",
        ));
    }
    Ok(1.0 - rss / tss)
}
