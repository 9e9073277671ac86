//! Influence measures: Cook's distance, DFFITS, DFBETAS, COVRATIO.

use super::residuals::{externally_studentized_residuals, studentized_residuals};
use crate::core::{DiagnosticOptions, DiagnosticsError, FittedLinearModel, Result};
use crate::utils::{xtx_inverse, SINGULAR_TOLERANCE};
use faer::{Col, Mat};
use statrs::distribution::{ContinuousCDF, FisherSnedecor};
use std::fmt;
use std::str::FromStr;

/// Per-observation influence statistics of a fitted linear model.
#[derive(Debug, Clone)]
pub struct InfluenceMeasures {
    /// Hat values h_ii.
    pub leverage: Col<f64>,
    /// Internally studentized residuals r_i.
    pub studentized: Col<f64>,
    /// Externally studentized residuals t_i.
    pub externally_studentized: Col<f64>,
    /// D_i = r_i² h_ii / (p (1 - h_ii))
    pub cooks_distance: Col<f64>,
    /// DFFITS_i = t_i sqrt(h_ii / (1 - h_ii))
    pub dffits: Col<f64>,
    /// n × p scaled coefficient changes when observation i is deleted.
    pub dfbetas: Mat<f64>,
    /// Ratio of coefficient covariance determinants with and without observation i.
    pub covratio: Col<f64>,
}

impl InfluenceMeasures {
    pub fn n_observations(&self) -> usize {
        self.leverage.nrows()
    }

    pub fn n_parameters(&self) -> usize {
        self.dfbetas.ncols()
    }

    /// Indices of observations whose `measure` exceeds its cutoff.
    ///
    /// DFFITS and DFBETAS are compared in absolute value (an observation is
    /// flagged when any of its DFBETAS exceeds the cutoff), COVRATIO through
    /// `|1 - COVRATIO|`. NaN entries are never flagged.
    pub fn flagged(
        &self,
        measure: InfluenceMeasure,
        options: &DiagnosticOptions,
    ) -> Result<Vec<usize>> {
        let cutoff = measure.cutoff(self.n_observations(), self.n_parameters(), options)?;
        let exceeds = |value: f64| value.is_finite() && value > cutoff;

        let flagged = (0..self.n_observations())
            .filter(|&i| match measure {
                InfluenceMeasure::Leverage => exceeds(self.leverage[i]),
                InfluenceMeasure::CooksDistance => exceeds(self.cooks_distance[i]),
                InfluenceMeasure::Dffits => exceeds(self.dffits[i].abs()),
                InfluenceMeasure::Covratio => exceeds((1.0 - self.covratio[i]).abs()),
                InfluenceMeasure::Dfbetas => {
                    (0..self.n_parameters()).any(|j| exceeds(self.dfbetas[(i, j)].abs()))
                }
            })
            .collect();
        Ok(flagged)
    }
}

/// The influence statistics that have a conventional plotting cutoff.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InfluenceMeasure {
    Leverage,
    CooksDistance,
    Dffits,
    Covratio,
    Dfbetas,
}

impl InfluenceMeasure {
    pub const ALL: [InfluenceMeasure; 5] = [
        InfluenceMeasure::Leverage,
        InfluenceMeasure::CooksDistance,
        InfluenceMeasure::Dffits,
        InfluenceMeasure::Covratio,
        InfluenceMeasure::Dfbetas,
    ];

    pub fn name(self) -> &'static str {
        match self {
            InfluenceMeasure::Leverage => "leverage",
            InfluenceMeasure::CooksDistance => "cooksd",
            InfluenceMeasure::Dffits => "dffits",
            InfluenceMeasure::Covratio => "covratio",
            InfluenceMeasure::Dfbetas => "dfbetas",
        }
    }

    /// Cutoff above which an observation is flagged for this measure.
    ///
    /// - leverage: `scale · p / n`
    /// - Cook's distance: the `cooks_quantile` quantile of `F(p, n - p)`
    /// - DFFITS: `scale · sqrt(p / n)` (compared with |DFFITS|)
    /// - COVRATIO: `scale · p / (n - p)` (compared with |1 - COVRATIO|)
    /// - DFBETAS: `dfbetas_cutoff`
    pub fn cutoff(self, n: usize, p: usize, options: &DiagnosticOptions) -> Result<f64> {
        options.validate()?;
        if n <= p || p == 0 {
            return Err(DiagnosticsError::degenerate(format!(
                "cutoffs need n > p > 0 (n = {}, p = {})",
                n, p
            )));
        }
        let (n_f, p_f) = (n as f64, p as f64);
        let scale = options.cutoff_scale;

        let cutoff = match self {
            InfluenceMeasure::Leverage => scale * p_f / n_f,
            InfluenceMeasure::CooksDistance => {
                let dist = FisherSnedecor::new(p_f, n_f - p_f)
                    .map_err(|e| DiagnosticsError::degenerate(format!("F distribution: {}", e)))?;
                dist.inverse_cdf(options.cooks_quantile)
            }
            InfluenceMeasure::Dffits => scale * (p_f / n_f).sqrt(),
            InfluenceMeasure::Covratio => scale * p_f / (n_f - p_f),
            InfluenceMeasure::Dfbetas => options.dfbetas_cutoff,
        };
        Ok(cutoff)
    }
}

impl fmt::Display for InfluenceMeasure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for InfluenceMeasure {
    type Err = DiagnosticsError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "leverage" | "hat" => Ok(InfluenceMeasure::Leverage),
            "cooksd" | "cooks" | "cooks_distance" | "cook" => Ok(InfluenceMeasure::CooksDistance),
            "dffits" => Ok(InfluenceMeasure::Dffits),
            "covratio" => Ok(InfluenceMeasure::Covratio),
            "dfbetas" | "dfbeta" => Ok(InfluenceMeasure::Dfbetas),
            other => Err(DiagnosticsError::invalid(format!(
                "unknown influence measure '{}' (expected one of leverage, cooksd, dffits, covratio, dfbetas)",
                other
            ))),
        }
    }
}

/// Compute every influence measure for `model`.
///
/// Fully leveraged observations (`h_ii = 1`) get NaN entries; a warning is logged
/// when that happens.
///
/// # Errors
/// `DegenerateModel` when the residual variance is zero, fewer than two residual
/// degrees of freedom remain, or the design is singular.
pub fn influence_measures(model: &FittedLinearModel) -> Result<InfluenceMeasures> {
    let n = model.n_observations();
    let p = model.n_parameters();
    let df_resid = model.df_resid();

    let studentized = studentized_residuals(model)?;
    let externally_studentized = externally_studentized_residuals(model)?;
    let xtx_inv = xtx_inverse(model.design(), SINGULAR_TOLERANCE)?;

    let design = model.design();
    let residuals = model.residuals();
    let leverage = model.leverage().clone();
    let p_f = p as f64;
    let df = df_resid as f64;

    let cooks_distance = Col::from_fn(n, |i| {
        let h = leverage[i];
        studentized[i].powi(2) * h / (p_f * (1.0 - h))
    });

    let dffits = Col::from_fn(n, |i| {
        let h = leverage[i];
        externally_studentized[i] * (h / (1.0 - h)).sqrt()
    });

    // s_(i)² / s² = (df - r_i²) / (df - 1)
    let covratio = Col::from_fn(n, |i| {
        let variance_ratio = (df - studentized[i].powi(2)) / (df - 1.0);
        variance_ratio.powi(p as i32) / (1.0 - leverage[i])
    });

    // DFBETA_ij = [(X'X)⁻¹ x_i]_j e_i / (1 - h_ii), scaled by s_(i) sqrt((X'X)⁻¹_jj)
    let rss = model.rss();
    let mut dfbetas = Mat::zeros(n, p);
    for i in 0..n {
        let one_minus_h = 1.0 - leverage[i];
        let rss_loo = rss - residuals[i].powi(2) / one_minus_h;
        let s_loo = if one_minus_h > 0.0 && rss_loo > 0.0 {
            (rss_loo / (df - 1.0)).sqrt()
        } else {
            f64::NAN
        };
        for j in 0..p {
            let c_ij: f64 = (0..p).map(|k| xtx_inv[(j, k)] * design[(i, k)]).sum();
            dfbetas[(i, j)] = c_ij * residuals[i] / one_minus_h / (s_loo * xtx_inv[(j, j)].sqrt());
        }
    }

    let nan_count = (0..n)
        .filter(|&i| !cooks_distance[i].is_finite() || !dffits[i].is_finite())
        .count();
    if nan_count > 0 {
        tracing::warn!(
            observations = nan_count,
            "influence statistics undefined for fully leveraged observations"
        );
    }

    Ok(InfluenceMeasures {
        leverage,
        studentized,
        externally_studentized,
        cooks_distance,
        dffits,
        dfbetas,
        covratio,
    })
}
