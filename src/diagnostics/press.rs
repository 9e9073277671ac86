//! PRESS (predicted residual sum of squares).

use crate::core::{
    DiagnosticOptions, DiagnosticsError, FittedLinearModel, PressRow, PressTable, Result,
};

/// PRESS statistic: `Σ (e_i / (1 - h_ii))²`.
///
/// The leave-one-out prediction error is obtained from the hat values without
/// refitting. Lower is better.
///
/// # Errors
/// `DegenerateModel` if any observation is fully leveraged (`h_ii = 1`).
pub fn press(model: &FittedLinearModel) -> Result<f64> {
    press_with_options(model, &DiagnosticOptions::default())
}

/// [`press`] with an explicit tolerance for what counts as `h_ii = 1`.
pub fn press_with_options(model: &FittedLinearModel, options: &DiagnosticOptions) -> Result<f64> {
    options.validate()?;

    let residuals = model.residuals();
    let leverage = model.leverage();

    let mut total = 0.0;
    for i in 0..residuals.nrows() {
        let one_minus_h = 1.0 - leverage[i];
        if one_minus_h <= options.leverage_tolerance {
            return Err(DiagnosticsError::degenerate(format!(
                "observation {} is fully leveraged (h = {})",
                i, leverage[i]
            )));
        }
        total += (residuals[i] / one_minus_h).powi(2);
    }
    Ok(total)
}

/// PRESS for several models, labelled `Model 1`, `Model 2`, ... in input order and
/// sorted ascending by PRESS.
pub fn press_table(models: &[&FittedLinearModel]) -> Result<PressTable> {
    let labelled: Vec<(String, &FittedLinearModel)> = models
        .iter()
        .enumerate()
        .map(|(i, model)| (format!("Model {}", i + 1), *model))
        .collect();
    press_table_labelled(&labelled)
}

/// PRESS for several caller-labelled models, sorted ascending by PRESS.
///
/// Ties keep their input order.
pub fn press_table_labelled<S: AsRef<str>>(
    models: &[(S, &FittedLinearModel)],
) -> Result<PressTable> {
    if models.is_empty() {
        return Err(DiagnosticsError::invalid(
            "at least one model is required",
        ));
    }

    let mut rows = models
        .iter()
        .map(|(label, model)| {
            Ok(PressRow {
                label: label.as_ref().to_string(),
                press: press(model)?,
            })
        })
        .collect::<Result<Vec<_>>>()?;
    rows.sort_by(|a, b| a.press.total_cmp(&b.press));

    Ok(PressTable { rows })
}
