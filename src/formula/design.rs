//! Evaluation of a formula against a covariate table.

use super::error::{FormulaError, FormulaResult};
use super::{Formula, Term};
use crate::core::{Column, DataFrame};
use faer::{Col, Mat};
use std::collections::BTreeSet;

/// Numeric design produced by evaluating a [`Formula`] against a [`DataFrame`].
#[derive(Debug, Clone)]
pub struct DesignMatrix {
    /// n × p matrix of coefficient-multiplied columns (intercept first when present).
    pub matrix: Mat<f64>,
    /// One label per matrix column.
    pub column_names: Vec<String>,
    /// Sum of all `offset(...)` columns; zeros when the formula has none.
    pub offset: Col<f64>,
    /// Whether the first column is the intercept.
    pub has_intercept: bool,
}

impl DesignMatrix {
    /// Number of rows.
    pub fn nrows(&self) -> usize {
        self.matrix.nrows()
    }

    /// Number of coefficient-multiplied columns.
    pub fn ncols(&self) -> usize {
        self.matrix.ncols()
    }
}

/// Columns contributed by a single factor or a whole term.
type Block = Vec<(String, Vec<f64>)>;

impl Formula {
    /// Build the design matrix and offset vector for `data`.
    ///
    /// Categorical columns expand to treatment-coded indicators for every level but
    /// the first, unless nothing earlier spans the term's constant part (no
    /// intercept, or `x:group` without a bare `x`). Then the first categorical
    /// factor gets one indicator per level so the design stays full rank.
    /// Interactions multiply the column blocks of their factors.
    pub fn design_matrix(&self, data: &DataFrame) -> FormulaResult<DesignMatrix> {
        let n = data.nrows();
        let mut columns: Block = Vec::new();
        // Numeric-factor sets whose constant part is already in the design
        let mut spanned: BTreeSet<Vec<&str>> = BTreeSet::new();

        if self.has_intercept {
            columns.push(("Intercept".to_string(), vec![1.0; n]));
            spanned.insert(Vec::new());
        }
        for term in &self.terms {
            columns.extend(term_block(term, data, &mut spanned)?);
        }

        let mut offset = Col::zeros(n);
        for name in &self.offsets {
            let values = numeric_column(name, data, "numeric offset")?;
            for i in 0..n {
                offset[i] += values[i];
            }
        }

        let matrix = Mat::from_fn(n, columns.len(), |i, j| columns[j].1[i]);
        let column_names: Vec<String> = columns.into_iter().map(|(name, _)| name).collect();

        tracing::debug!(
            formula = %self.original,
            rows = n,
            columns = column_names.len(),
            offsets = self.offsets.len(),
            "built design matrix"
        );

        Ok(DesignMatrix {
            matrix,
            column_names,
            offset,
            has_intercept: self.has_intercept,
        })
    }

    /// Extract the left-hand-side variable as a response vector.
    pub fn response_vector(&self, data: &DataFrame) -> FormulaResult<Col<f64>> {
        let name = self.response.as_ref().ok_or(FormulaError::MissingResponse)?;
        let values = numeric_column(name, data, "numeric response")?;
        Ok(Col::from_fn(values.len(), |i| values[i]))
    }
}

fn lookup<'a>(name: &str, data: &'a DataFrame) -> FormulaResult<&'a Column> {
    data.column(name)
        .ok_or_else(|| FormulaError::VariableNotFound {
            variable: name.to_string(),
            available: data.column_names().iter().map(|s| s.to_string()).collect(),
        })
}

fn numeric_column<'a>(
    name: &str,
    data: &'a DataFrame,
    expected: &'static str,
) -> FormulaResult<&'a [f64]> {
    let column = lookup(name, data)?;
    let values = column.as_numeric().ok_or(FormulaError::TypeMismatch {
        variable: name.to_string(),
        expected,
        actual: column.dtype(),
    })?;
    if values.iter().any(|v| !v.is_finite()) {
        return Err(FormulaError::NonFinite(name.to_string()));
    }
    Ok(values)
}

fn factor_block(name: &str, data: &DataFrame, full_rank: bool) -> FormulaResult<Block> {
    match lookup(name, data)? {
        Column::Numeric(_) => {
            let values = numeric_column(name, data, "numeric")?;
            Ok(vec![(name.to_string(), values.to_vec())])
        }
        Column::Categorical { codes, levels } => Ok(levels
            .iter()
            .enumerate()
            .skip(if full_rank { 0 } else { 1 })
            .map(|(level_idx, level)| {
                let indicator = codes
                    .iter()
                    .map(|&code| if code as usize == level_idx { 1.0 } else { 0.0 })
                    .collect();
                let label = if full_rank {
                    format!("{}[{}]", name, level)
                } else {
                    format!("{}[T.{}]", name, level)
                };
                (label, indicator)
            })
            .collect()),
    }
}

fn term_block<'t>(
    term: &'t Term,
    data: &DataFrame,
    spanned: &mut BTreeSet<Vec<&'t str>>,
) -> FormulaResult<Block> {
    let mut numeric = Vec::new();
    for factor in &term.factors {
        if matches!(lookup(factor, data)?, Column::Numeric(_)) {
            numeric.push(factor.as_str());
        }
    }
    numeric.sort_unstable();
    let mut full_rank_available = !spanned.contains(&numeric);
    spanned.insert(numeric);

    let mut block: Block = vec![(String::new(), vec![1.0; data.nrows()])];
    for factor in &term.factors {
        let categorical = matches!(lookup(factor, data)?, Column::Categorical { .. });
        let full_rank = categorical && full_rank_available;
        if full_rank {
            full_rank_available = false;
        }

        let factor_cols = factor_block(factor, data, full_rank)?;
        let mut next = Vec::with_capacity(block.len() * factor_cols.len());
        for (left_name, left) in &block {
            for (right_name, right) in &factor_cols {
                let name = if left_name.is_empty() {
                    right_name.clone()
                } else {
                    format!("{}:{}", left_name, right_name)
                };
                let values = left.iter().zip(right).map(|(a, b)| a * b).collect();
                next.push((name, values));
            }
        }
        block = next;
    }

    Ok(block)
}
