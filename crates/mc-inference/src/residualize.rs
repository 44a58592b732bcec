//! Out-of-fold and in-sample residualization.
//!
//! For each fold, a predictor is fitted on the fold's complement only and
//! used to predict the in-fold records; `residual = actual - predicted` is
//! written at the record's original index. Every record is used exactly
//! once, by a model that never saw it during training.

use mc_core::{Error, Regressor, Result, Table};

use crate::folds::FoldAssignment;

fn gather_rows(x: &[f64], p: usize, rows: &[usize]) -> Vec<f64> {
    let mut out = Vec::with_capacity(rows.len() * p);
    for &i in rows {
        out.extend_from_slice(&x[i * p..(i + 1) * p]);
    }
    out
}

/// Out-of-fold residual vector for `target`, one entry per record.
///
/// Residuals are merged by original record index, so the output order is
/// stable regardless of the fold layout.
pub fn residualize(
    table: &Table,
    target: &str,
    covariates: &[&str],
    regressor: &dyn Regressor,
    folds: &FoldAssignment,
) -> Result<Vec<f64>> {
    let y = table.numeric_column(target)?;
    let (x, n, p) = table.design_matrix(covariates)?;
    if folds.n_records() != n {
        return Err(Error::Validation(format!(
            "fold assignment covers {} records, table has {n}",
            folds.n_records()
        )));
    }

    let mut residuals = vec![f64::NAN; n];
    for f in 0..folds.n_folds() {
        let train = folds.complement(f);
        let x_train = gather_rows(&x, p, &train);
        let y_train: Vec<f64> = train.iter().map(|&i| y[i]).collect();
        let fitted = regressor.fit(&x_train, train.len(), p, &y_train)?;

        let test = folds.fold(f);
        let x_test = gather_rows(&x, p, test);
        let preds = fitted.predict(&x_test, test.len(), p)?;
        for (j, &i) in test.iter().enumerate() {
            residuals[i] = y[i] - preds[j];
        }
    }
    Ok(residuals)
}

/// In-sample residual vector for `target`: one fit on all records,
/// predictions for the same records.
///
/// No out-of-fold guarantee holds here; in-sample residuals carry
/// overfitting bias and are only appropriate when cross-fitting is
/// explicitly disabled (`n_folds == 1`). This is also the mode that
/// reproduces group-mean adjustment walkthroughs, where each record is
/// predicted by its own group's full-sample mean.
pub fn residualize_in_sample(
    table: &Table,
    target: &str,
    covariates: &[&str],
    regressor: &dyn Regressor,
) -> Result<Vec<f64>> {
    let y = table.numeric_column(target)?;
    let (x, n, p) = table.design_matrix(covariates)?;
    let fitted = regressor.fit(&x, n, p, y)?;
    let preds = fitted.predict(&x, n, p)?;
    Ok(y.iter().zip(&preds).map(|(&yi, &pi)| yi - pi).collect())
}
