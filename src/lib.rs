//! Diagnostics for ordinary least-squares linear regression.
//!
//! The crate reads a [`FittedLinearModel`] and computes the usual post-fit checks:
//! ANOVA decomposition, PRESS, R², influence measures and residual tests. It also
//! simulates responses with a known linear structure from a small formula language,
//! which is handy for exercising regression code.
//!
//! # Example
//!
//! ```rust,ignore
//! use reglin::prelude::*;
//! use rand::{rngs::StdRng, SeedableRng};
//!
//! let data = DataFrame::builder()
//!     .numeric("x", (0..100).map(|i| i as f64).collect())
//!     .categorical("group", &(0..100).map(|i| if i % 2 == 0 { "A" } else { "B" }).collect::<Vec<_>>())
//!     .build()?;
//!
//! let mut rng = StdRng::seed_from_u64(42);
//! let y = generate("x + group", &[1.0, 2.0, 3.0], &Sigma::Scalar(1.0), Some(&data), &mut rng)?;
//!
//! let x = Mat::from_fn(100, 1, |i, _| i as f64);
//! let model = OlsRegressor::builder().build().fit(&x, &y)?;
//!
//! println!("{}", compute_anova(&model)?);
//! println!("PRESS = {}", press(&model)?);
//! ```

pub mod core;
pub mod diagnostics;
pub mod formula;
pub mod simulate;
pub mod solvers;
pub mod utils;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::core::{
        AnovaRow, AnovaTable, Column, DataFrame, DiagnosticOptions, DiagnosticsError,
        FittedLinearModel, PressRow, PressTable, RegressionOptions, Result,
    };
    pub use crate::diagnostics::{
        adjusted_r_squared, compute_anova, compute_leverage, externally_studentized_residuals,
        influence_measures, press, press_table, press_table_labelled, r_squared,
        standardized_residuals, studentized_residuals, test_residuals, InfluenceMeasure,
        InfluenceMeasures, ResidualTests,
    };
    pub use crate::formula::{DesignMatrix, Formula};
    pub use crate::simulate::{generate, Sigma, SimulationSpec};
    pub use crate::solvers::{fit_design, OlsRegressor, Regressor};
    pub use faer::{Col, Mat};
}

pub use crate::core::{
    DataFrame, DiagnosticOptions, DiagnosticsError, FittedLinearModel, Result,
};
pub use crate::diagnostics::{adjusted_r_squared, compute_anova, press, r_squared};
pub use crate::simulate::{generate, Sigma, SimulationSpec};
