//! Covariate tables.
//!
//! A [`DataFrame`] is an ordered set of equally long named columns. Columns are
//! either numeric or categorical; categorical columns keep their levels sorted so
//! that indicator coding is stable regardless of row order.

use super::error::{DiagnosticsError, Result};
use indexmap::IndexMap;

/// A single column of a [`DataFrame`].
#[derive(Debug, Clone, PartialEq)]
pub enum Column {
    /// Floating point values.
    Numeric(Vec<f64>),
    /// Level codes into a sorted list of distinct levels.
    Categorical { codes: Vec<u32>, levels: Vec<String> },
}

impl Column {
    /// Build a categorical column, collecting and sorting its distinct levels.
    pub fn categorical<T: AsRef<str>>(values: &[T]) -> Self {
        let mut levels: Vec<String> = values.iter().map(|v| v.as_ref().to_string()).collect();
        levels.sort();
        levels.dedup();

        let codes = values
            .iter()
            .map(|v| {
                levels
                    .binary_search_by(|level| level.as_str().cmp(v.as_ref()))
                    .unwrap_or_else(|pos| pos) as u32
            })
            .collect();

        Column::Categorical { codes, levels }
    }

    /// Number of rows in the column.
    pub fn len(&self) -> usize {
        match self {
            Column::Numeric(values) => values.len(),
            Column::Categorical { codes, .. } => codes.len(),
        }
    }

    /// Whether the column holds no rows.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Short type label used in error messages.
    pub fn dtype(&self) -> &'static str {
        match self {
            Column::Numeric(_) => "numeric",
            Column::Categorical { .. } => "categorical",
        }
    }

    /// Numeric values, if the column is numeric.
    pub fn as_numeric(&self) -> Option<&[f64]> {
        match self {
            Column::Numeric(values) => Some(values),
            Column::Categorical { .. } => None,
        }
    }
}

impl From<Vec<f64>> for Column {
    fn from(values: Vec<f64>) -> Self {
        Column::Numeric(values)
    }
}

/// Ordered table of named covariate columns with a common row count.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DataFrame {
    columns: IndexMap<String, Column>,
    nrows: usize,
}

impl DataFrame {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Start building a table column by column.
    pub fn builder() -> DataFrameBuilder {
        DataFrameBuilder::default()
    }

    /// Create a table from `(name, column)` pairs.
    pub fn from_columns<I, S>(columns: I) -> Result<Self>
    where
        I: IntoIterator<Item = (S, Column)>,
        S: Into<String>,
    {
        let mut frame = Self::new();
        for (name, column) in columns {
            frame.insert(name, column)?;
        }
        Ok(frame)
    }

    /// Append a column, checking its name is new and its length matches.
    pub fn insert(&mut self, name: impl Into<String>, column: Column) -> Result<()> {
        let name = name.into();
        if self.columns.contains_key(&name) {
            return Err(DiagnosticsError::invalid(format!(
                "duplicate column name '{name}'"
            )));
        }
        if self.columns.is_empty() {
            self.nrows = column.len();
        } else if column.len() != self.nrows {
            return Err(DiagnosticsError::DimensionMismatch {
                context: "column length must match the table's row count",
                expected: self.nrows,
                actual: column.len(),
            });
        }
        self.columns.insert(name, column);
        Ok(())
    }

    /// Number of rows.
    pub fn nrows(&self) -> usize {
        self.nrows
    }

    /// Number of columns.
    pub fn ncols(&self) -> usize {
        self.columns.len()
    }

    /// Column names in insertion order.
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.keys().map(String::as_str).collect()
    }

    /// Look up a column by name.
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.get(name)
    }
}

/// Fluent builder for [`DataFrame`]; the first error encountered is reported by `build`.
#[derive(Debug, Default)]
pub struct DataFrameBuilder {
    frame: DataFrame,
    error: Option<DiagnosticsError>,
}

impl DataFrameBuilder {
    /// Add a numeric column.
    pub fn numeric(self, name: impl Into<String>, values: Vec<f64>) -> Self {
        self.column(name, Column::Numeric(values))
    }

    /// Add a categorical column.
    pub fn categorical<T: AsRef<str>>(self, name: impl Into<String>, values: &[T]) -> Self {
        self.column(name, Column::categorical(values))
    }

    /// Add an already constructed column.
    pub fn column(mut self, name: impl Into<String>, column: Column) -> Self {
        if self.error.is_none() {
            if let Err(err) = self.frame.insert(name, column) {
                self.error = Some(err);
            }
        }
        self
    }

    pub fn build(self) -> Result<DataFrame> {
        match self.error {
            Some(err) => Err(err),
            None => Ok(self.frame),
        }
    }
}
