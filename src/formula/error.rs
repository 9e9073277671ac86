//! Formula parsing and evaluation errors.

use thiserror::Error;

/// Errors that can occur while parsing a formula or evaluating it against a table.
#[derive(Debug, Error)]
pub enum FormulaError {
    /// Malformed formula text.
    #[error("syntax error at position {position}: {message}")]
    Syntax { position: usize, message: String },

    /// A referenced column does not exist.
    #[error("variable '{variable}' not found; available columns: {available:?}")]
    VariableNotFound {
        variable: String,
        available: Vec<String>,
    },

    /// A column has the wrong type for where it is used.
    #[error("variable '{variable}' is {actual}, but {expected} was expected")]
    TypeMismatch {
        variable: String,
        expected: &'static str,
        actual: &'static str,
    },

    /// Only `offset(...)` is understood as a function call.
    #[error("unsupported function '{0}' (only offset(<column>) is recognised)")]
    UnsupportedFunction(String),

    /// A numeric column feeding the design contains NaN or infinity.
    #[error("variable '{0}' contains non-finite values")]
    NonFinite(String),

    /// The formula has no left-hand side but a response was requested.
    #[error("formula has no response variable")]
    MissingResponse,
}

impl FormulaError {
    pub(crate) fn syntax(position: usize, message: impl Into<String>) -> Self {
        Self::Syntax {
            position,
            message: message.into(),
        }
    }
}

pub type FormulaResult<T> = std::result::Result<T, FormulaError>;
