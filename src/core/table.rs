//! Tabular diagnostic results.

use std::fmt;

/// One row of an ANOVA table.
#[derive(Debug, Clone, PartialEq)]
pub struct AnovaRow {
    /// Degrees of freedom.
    pub df: usize,
    /// Sum of squares.
    pub sum_sq: f64,
    /// Mean square (Model and Error rows only).
    pub mean_sq: Option<f64>,
    /// F statistic (Model row only).
    pub f_statistic: Option<f64>,
    /// Upper-tail F probability (Model row only).
    pub p_value: Option<f64>,
}

/// Model / Error / Total sum-of-squares decomposition.
///
/// `model.df + error.df == total.df` and `model.sum_sq + error.sum_sq == total.sum_sq`.
#[derive(Debug, Clone, PartialEq)]
pub struct AnovaTable {
    pub model: AnovaRow,
    pub error: AnovaRow,
    pub total: AnovaRow,
}

impl AnovaTable {
    /// Rows labelled in display order.
    pub fn rows(&self) -> [(&'static str, &AnovaRow); 3] {
        [
            ("Model", &self.model),
            ("Error", &self.error),
            ("Total", &self.total),
        ]
    }
}

fn cell(value: Option<f64>) -> String {
    value.map_or_else(String::new, |v| format!("{:.6}", v))
}

impl fmt::Display for AnovaTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Analysis of Variance Table")?;
        writeln!(
            f,
            "{:<6} {:>6} {:>16} {:>16} {:>12} {:>12}",
            "", "Df", "Sum Sq", "Mean Sq", "F value", "Pr(>F)"
        )?;
        for (label, row) in self.rows() {
            writeln!(
                f,
                "{:<6} {:>6} {:>16.6} {:>16} {:>12} {:>12}",
                label,
                row.df,
                row.sum_sq,
                cell(row.mean_sq),
                cell(row.f_statistic),
                cell(row.p_value)
            )?;
        }
        Ok(())
    }
}

/// PRESS statistic for one labelled model.
#[derive(Debug, Clone, PartialEq)]
pub struct PressRow {
    pub label: String,
    pub press: f64,
}

/// PRESS statistics for several models, ascending (best first).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PressTable {
    pub rows: Vec<PressRow>,
}

impl PressTable {
    /// The model with the lowest PRESS, if any.
    pub fn best(&self) -> Option<&PressRow> {
        self.rows.first()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl fmt::Display for PressTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{:<12} {:>16}", "Model", "PRESS")?;
        for row in &self.rows {
            writeln!(f, "{:<12} {:>16.6}", row.label, row.press)?;
        }
        Ok(())
    }
}
