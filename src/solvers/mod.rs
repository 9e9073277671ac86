//! Least-squares fitting that produces [`FittedLinearModel`](crate::core::FittedLinearModel)s.

mod ols;
mod traits;

pub use ols::{fit_design, OlsRegressor, OlsRegressorBuilder};
pub use traits::Regressor;
