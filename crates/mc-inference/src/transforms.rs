//! Compositional transforms for relative-abundance columns.
//!
//! Raw abundance changes are easy to misread in compositional data; an
//! additive log-ratio makes the exposure "numerator relative to
//! denominator" and is the standard treatment column for the estimator.

use mc_core::{Error, Result, Table};

/// Pseudocount added to numerator and denominator before taking the ratio,
/// so zero abundances stay finite.
pub const PSEUDOCOUNT: f64 = 1e-6;

/// Element-wise `ln((num + pseudocount) / (den + pseudocount))`.
pub fn log_ratio(numerator: &[f64], denominator: &[f64], pseudocount: f64) -> Result<Vec<f64>> {
    if numerator.len() != denominator.len() {
        return Err(Error::Validation(format!(
            "numerator has {} values, denominator {}",
            numerator.len(),
            denominator.len()
        )));
    }
    if !(pseudocount.is_finite() && pseudocount > 0.0) {
        return Err(Error::Validation(format!("pseudocount must be positive, got {pseudocount}")));
    }
    for (i, (&a, &b)) in numerator.iter().zip(denominator).enumerate() {
        if !(a.is_finite() && b.is_finite() && a >= 0.0 && b >= 0.0) {
            return Err(Error::Validation(format!(
                "abundances must be finite and non-negative (record {i}: {a}, {b})"
            )));
        }
    }
    Ok(numerator
        .iter()
        .zip(denominator)
        .map(|(&a, &b)| ((a + pseudocount) / (b + pseudocount)).ln())
        .collect())
}

/// Return a copy of `table` with a derived column
/// `log_{numerator}_over_{denominator}`, plus the new column's name.
pub fn with_log_ratio(table: &Table, numerator: &str, denominator: &str) -> Result<(Table, String)> {
    let num = table.numeric_column(numerator)?;
    let den = table.numeric_column(denominator)?;
    let col = log_ratio(num, den, PSEUDOCOUNT)?;
    let name = format!("log_{numerator}_over_{denominator}");
    let mut out = table.clone();
    out.add_column(&name, col)?;
    Ok((out, name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_ratio_values() {
        let r = log_ratio(&[1.0, 2.0], &[1.0, 1.0], 1e-6).unwrap();
        assert!(r[0].abs() < 1e-6);
        assert!((r[1] - 2.0_f64.ln()).abs() < 1e-6);
    }

    #[test]
    fn test_log_ratio_zero_abundance_stays_finite() {
        let r = log_ratio(&[0.0], &[0.5], 1e-6).unwrap();
        assert!(r[0].is_finite());
        assert!(r[0] < 0.0);
    }

    #[test]
    fn test_log_ratio_negative_abundance_rejected() {
        let err = log_ratio(&[-0.1], &[0.5], 1e-6).unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[test]
    fn test_with_log_ratio_appends_named_column() {
        let mut t = Table::new();
        t.add_column("BugA", vec![0.10, 0.40]).unwrap();
        t.add_column("BugD", vec![0.15, 0.15]).unwrap();
        let (t2, name) = with_log_ratio(&t, "BugA", "BugD").unwrap();
        assert_eq!(name, "log_BugA_over_BugD");
        let col = t2.column(&name).unwrap();
        assert_eq!(col.len(), 2);
        assert!(col[0] < 0.0 && col[1] > 0.0);
        // Original table is untouched.
        assert!(t.column(&name).is_none());
    }

    #[test]
    fn test_with_log_ratio_missing_column_is_schema_error() {
        let mut t = Table::new();
        t.add_column("BugA", vec![0.1]).unwrap();
        let err = with_log_ratio(&t, "BugA", "BugD").unwrap_err();
        assert!(matches!(err, Error::Schema(_)));
    }
}
