//! Regression diagnostics computed from a fitted linear model.
//!
//! - **ANOVA**: Model / Error / Total decomposition with the overall F-test
//! - **PRESS**: leave-one-out prediction error from the hat values
//! - **R²**: plain and adjusted coefficient of determination
//! - **Leverage**: hat matrix diagonal
//! - **Residuals**: standardized and studentized residuals
//! - **Influence**: Cook's distance, DFFITS, DFBETAS and COVRATIO with plot cutoffs
//! - **Residual tests**: Shapiro–Wilk, Breusch–Pagan, Durbin–Watson, Bonferroni outliers
//!
//! # Example
//!
//! ```rust,ignore
//! use reglin::diagnostics::{compute_anova, influence_measures, press, InfluenceMeasure};
//!
//! let table = compute_anova(&model)?;
//! println!("{}", table);
//!
//! let measures = influence_measures(&model)?;
//! let flagged = measures.flagged(InfluenceMeasure::CooksDistance, &options)?;
//! ```

mod anova;
mod influence;
mod leverage;
mod press;
mod r2;
mod residual_tests;
mod residuals;

pub use anova::compute_anova;
pub use influence::{influence_measures, InfluenceMeasure, InfluenceMeasures};
pub use leverage::{compute_leverage, high_leverage_points};
pub use press::{press, press_table, press_table_labelled, press_with_options};
pub use r2::{adjusted_r_squared, r_squared};
pub use residual_tests::{
    bonferroni_outlier_test, breusch_pagan, durbin_watson, shapiro_wilk, test_residuals,
    BreuschPagan, OutlierTestRow, ResidualTests, ShapiroWilk,
};
pub use residuals::{
    externally_studentized_residuals, residual_outliers, standardized_residuals,
    studentized_residuals,
};
