//! Crate-wide error type.

use thiserror::Error;

/// Errors raised by diagnostics, simulation and model construction.
///
/// Every failure is reported at the point of detection; no partial results are
/// returned alongside an error.
#[derive(Debug, Error)]
pub enum DiagnosticsError {
    /// A required argument is missing, malformed or non-finite.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A vector or matrix does not have the length/width another input requires.
    #[error("dimension mismatch: {context} (expected {expected}, got {actual})")]
    DimensionMismatch {
        context: &'static str,
        expected: usize,
        actual: usize,
    },

    /// The model cannot support the requested statistic (zero degrees of freedom,
    /// a fully leveraged observation, a singular design).
    #[error("degenerate model: {0}")]
    DegenerateModel(String),
}

impl DiagnosticsError {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    pub(crate) fn degenerate(message: impl Into<String>) -> Self {
        Self::DegenerateModel(message.into())
    }
}

impl From<crate::formula::FormulaError> for DiagnosticsError {
    fn from(err: crate::formula::FormulaError) -> Self {
        Self::InvalidInput(err.to_string())
    }
}

impl From<crate::core::OptionsError> for DiagnosticsError {
    fn from(err: crate::core::OptionsError) -> Self {
        Self::InvalidInput(err.to_string())
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, DiagnosticsError>;
