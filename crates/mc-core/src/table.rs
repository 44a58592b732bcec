//! In-memory observation table.
//!
//! A `Table` is an ordered sequence of records stored column-major: every
//! column is a named `Vec<f64>` and all columns share one length. Tables are
//! loaded once per run and treated as read-only by the estimators; derived
//! columns are added by cloning.

use crate::{Error, Result};

/// Ordered, column-major table of named numeric columns.
#[derive(Debug, Clone, Default)]
pub struct Table {
    names: Vec<String>,
    columns: Vec<Vec<f64>>,
}

impl Table {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of records. Zero for a table with no columns.
    pub fn n_rows(&self) -> usize {
        self.columns.first().map(|c| c.len()).unwrap_or(0)
    }

    /// Number of columns.
    pub fn n_cols(&self) -> usize {
        self.columns.len()
    }

    /// Column names, in insertion order.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Append a column.
    ///
    /// Fails with [`Error::Validation`] if the name is already present or the
    /// column length disagrees with the existing columns.
    pub fn add_column(&mut self, name: &str, values: Vec<f64>) -> Result<()> {
        if self.names.iter().any(|n| n == name) {
            return Err(Error::Validation(format!("duplicate column '{name}'")));
        }
        if !self.columns.is_empty() && values.len() != self.n_rows() {
            return Err(Error::Validation(format!(
                "column '{}' has {} values, expected {}",
                name,
                values.len(),
                self.n_rows()
            )));
        }
        self.names.push(name.to_string());
        self.columns.push(values);
        Ok(())
    }

    /// Look up a column by name.
    pub fn column(&self, name: &str) -> Option<&[f64]> {
        self.names.iter().position(|n| n == name).map(|i| self.columns[i].as_slice())
    }

    /// Look up a column that must exist and must be fully numeric.
    ///
    /// Fails with [`Error::Schema`] if the column is absent or contains a
    /// non-finite value (a NaN from a failed parse counts as missing).
    pub fn numeric_column(&self, name: &str) -> Result<&[f64]> {
        let col = self
            .column(name)
            .ok_or_else(|| Error::Schema(format!("required variable '{name}' is missing")))?;
        if let Some(i) = col.iter().position(|v| !v.is_finite()) {
            return Err(Error::Schema(format!(
                "variable '{name}' has a non-numeric value at record {i}"
            )));
        }
        Ok(col)
    }

    /// Extract a row-major design matrix for the named columns.
    ///
    /// Returns `(data, n, p)` with `data.len() == n * p` and
    /// `p == names.len()`. `p == 0` yields an empty matrix with `n` rows,
    /// the legal intercept-only design.
    pub fn design_matrix(&self, names: &[&str]) -> Result<(Vec<f64>, usize, usize)> {
        let n = self.n_rows();
        let p = names.len();
        let cols: Vec<&[f64]> =
            names.iter().map(|name| self.numeric_column(name)).collect::<Result<_>>()?;
        let mut data = Vec::with_capacity(n * p);
        for i in 0..n {
            for col in &cols {
                data.push(col[i]);
            }
        }
        Ok((data, n, p))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_table() -> Table {
        let mut t = Table::new();
        t.add_column("x", vec![1.0, 2.0, 3.0]).unwrap();
        t.add_column("y", vec![4.0, 5.0, 6.0]).unwrap();
        t
    }

    #[test]
    fn test_add_and_lookup() {
        let t = small_table();
        assert_eq!(t.n_rows(), 3);
        assert_eq!(t.n_cols(), 2);
        assert_eq!(t.column("x"), Some(&[1.0, 2.0, 3.0][..]));
        assert_eq!(t.column("missing"), None);
    }

    #[test]
    fn test_ragged_column_rejected() {
        let mut t = small_table();
        let err = t.add_column("z", vec![1.0]).unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[test]
    fn test_duplicate_column_rejected() {
        let mut t = small_table();
        let err = t.add_column("x", vec![0.0, 0.0, 0.0]).unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[test]
    fn test_numeric_column_missing_is_schema_error() {
        let t = small_table();
        let err = t.numeric_column("z").unwrap_err();
        assert!(matches!(err, Error::Schema(_)));
    }

    #[test]
    fn test_numeric_column_rejects_non_finite() {
        let mut t = Table::new();
        t.add_column("x", vec![1.0, f64::NAN, 3.0]).unwrap();
        let err = t.numeric_column("x").unwrap_err();
        assert!(matches!(err, Error::Schema(_)));
    }

    #[test]
    fn test_design_matrix_row_major() {
        let t = small_table();
        let (data, n, p) = t.design_matrix(&["x", "y"]).unwrap();
        assert_eq!((n, p), (3, 2));
        assert_eq!(data, vec![1.0, 4.0, 2.0, 5.0, 3.0, 6.0]);
    }

    #[test]
    fn test_design_matrix_empty_is_intercept_only() {
        let t = small_table();
        let (data, n, p) = t.design_matrix(&[]).unwrap();
        assert!(data.is_empty());
        assert_eq!((n, p), (3, 0));
    }
}
