//! Core types: errors, configuration, covariate tables, the fitted-model contract
//! and diagnostic tables.

mod data;
mod error;
mod model;
mod options;
mod table;

pub use data::{Column, DataFrame, DataFrameBuilder};
pub use error::{DiagnosticsError, Result};
pub(crate) use model::default_names;
pub use model::{FittedLinearModel, FittedLinearModelBuilder};
pub use options::{
    DiagnosticOptions, DiagnosticOptionsBuilder, OptionsError, RegressionOptions,
    RegressionOptionsBuilder,
};
pub use table::{AnovaRow, AnovaTable, PressRow, PressTable};
