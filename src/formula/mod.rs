//! Formula mini-language for linear predictors.
//!
//! Supported syntax:
//!
//! - optional response: `y ~ x + group` or just `x + group`
//! - intercept control: `0 + x`, `x - 1`, `1 + x`
//! - categorical expansion with treatment contrasts (first level is the reference)
//! - interactions: `x:z`, `x:group`
//! - fixed offsets: `offset(exposure)`
//! - term removal: `x + z - z`

mod design;
mod error;
mod parser;

use std::fmt;
use std::str::FromStr;

pub use design::DesignMatrix;
pub use error::{FormulaError, FormulaResult};
pub use parser::FormulaParser;

/// A model term: one column name, or several joined by `:` for an interaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Term {
    pub factors: Vec<String>,
}

impl Term {
    pub fn new<S: Into<String>>(factors: impl IntoIterator<Item = S>) -> Self {
        Self {
            factors: factors.into_iter().map(Into::into).collect(),
        }
    }

    /// Whether two terms name the same set of factors, ignoring order.
    pub fn same_factors(&self, other: &Term) -> bool {
        if self.factors.len() != other.factors.len() {
            return false;
        }
        let mut a: Vec<&str> = self.factors.iter().map(String::as_str).collect();
        let mut b: Vec<&str> = other.factors.iter().map(String::as_str).collect();
        a.sort_unstable();
        b.sort_unstable();
        a == b
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.factors.join(":"))
    }
}

/// A parsed linear-predictor formula.
#[derive(Debug, Clone, PartialEq)]
pub struct Formula {
    /// Response variable (left-hand side), if any.
    pub response: Option<String>,
    /// Coefficient-multiplied terms in the order they appear.
    pub terms: Vec<Term>,
    /// Columns added to the linear predictor with a fixed coefficient of 1.
    pub offsets: Vec<String>,
    /// Whether an intercept column is included.
    pub has_intercept: bool,
    /// Formula text as given.
    pub original: String,
}

impl Formula {
    /// Parse a formula from text.
    pub fn parse(formula: &str) -> FormulaResult<Self> {
        FormulaParser::parse(formula)
    }
}

impl FromStr for Formula {
    type Err = FormulaError;

    fn from_str(s: &str) -> FormulaResult<Self> {
        Formula::parse(s)
    }
}

impl fmt::Display for Formula {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(response) = &self.response {
            write!(f, "{} ~ ", response)?;
        } else {
            write!(f, "~ ")?;
        }

        let mut parts: Vec<String> = vec![if self.has_intercept { "1" } else { "0" }.to_string()];
        parts.extend(self.terms.iter().map(Term::to_string));
        parts.extend(self.offsets.iter().map(|o| format!("offset({})", o)));
        write!(f, "{}", parts.join(" + "))
    }
}
