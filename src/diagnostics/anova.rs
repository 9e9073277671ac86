//! Overall-regression ANOVA decomposition.

use crate::core::{AnovaRow, AnovaTable, DiagnosticsError, FittedLinearModel, Result};
use crate::utils::center_vector;
use statrs::distribution::{ContinuousCDF, FisherSnedecor};

/// Total sum of squares: centered about ȳ with an intercept, uncentered without.
pub(crate) fn total_sum_of_squares(model: &FittedLinearModel) -> f64 {
    let y = model.response();
    if model.has_intercept() {
        let (centered, _) = center_vector(y);
        centered.iter().map(|v| v * v).sum()
    } else {
        y.iter().map(|yi| yi * yi).sum()
    }
}

/// Decompose the response variation into Model, Error and Total rows.
///
/// With an intercept the total is `Σ(y - ȳ)²` on `n - 1` degrees of freedom;
/// without one it is the uncentered `Σy²` on `n`.
///
/// A perfect fit (zero residual sum of squares) yields `F = +∞` and `p = 0`; when
/// the model sum of squares is zero as well, `F` and `p` are NaN.
///
/// # Errors
/// `DegenerateModel` when the residual or model degrees of freedom are not positive.
pub fn compute_anova(model: &FittedLinearModel) -> Result<AnovaTable> {
    let n = model.n_observations();
    let df_resid = model.df_resid();
    let df_total = if model.has_intercept() { n - 1 } else { n };

    if df_resid == 0 {
        return Err(DiagnosticsError::degenerate(
            "residual degrees of freedom must be positive",
        ));
    }
    if df_total <= df_resid {
        return Err(DiagnosticsError::degenerate(format!(
            "model degrees of freedom must be positive (total {}, residual {})",
            df_total, df_resid
        )));
    }
    let df_model = df_total - df_resid;

    let ss_total = total_sum_of_squares(model);
    let ss_resid = model.rss();
    let ss_model = ss_total - ss_resid;

    let ms_model = ss_model / df_model as f64;
    let ms_resid = ss_resid / df_resid as f64;

    let (f_statistic, p_value) = if ms_resid > 0.0 {
        let f = ms_model / ms_resid;
        let dist = FisherSnedecor::new(df_model as f64, df_resid as f64)
            .map_err(|e| DiagnosticsError::degenerate(format!("F distribution: {}", e)))?;
        (f, dist.sf(f.max(0.0)))
    } else if ms_model > 0.0 {
        (f64::INFINITY, 0.0)
    } else {
        (f64::NAN, f64::NAN)
    };

    tracing::debug!(
        df_model,
        df_resid,
        df_total,
        f_statistic,
        p_value,
        "computed ANOVA table"
    );

    Ok(AnovaTable {
        model: AnovaRow {
            df: df_model,
            sum_sq: ss_model,
            mean_sq: Some(ms_model),
            f_statistic: Some(f_statistic),
            p_value: Some(p_value),
        },
        error: AnovaRow {
            df: df_resid,
            sum_sq: ss_resid,
            mean_sq: Some(ms_resid),
            f_statistic: None,
            p_value: None,
        },
        total: AnovaRow {
            df: df_total,
            sum_sq: ss_total,
            mean_sq: None,
            f_statistic: None,
            p_value: None,
        },
    })
}
