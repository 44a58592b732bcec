//! Core traits for microcause
//!
//! This module defines the capability interface that makes prediction
//! methods injectable: the residualizer depends on `Regressor`, not on any
//! concrete regression implementation, so the group-mean walkthrough and a
//! real OLS (or any future ML model) run through one code path.

use crate::Result;

/// Regression capability - abstraction over prediction methods
///
/// Design matrices are row-major slices with explicit dimensions: `n` rows
/// and `p` columns, `x.len() == n * p`. A `p == 0` design is legal and
/// means "intercept only" - the fitted model predicts a constant.
pub trait Regressor: Send + Sync {
    /// Fit on a training design matrix and target vector, returning a
    /// fitted model.
    fn fit(&self, x: &[f64], n: usize, p: usize, y: &[f64]) -> Result<Box<dyn FittedRegressor>>;

    /// Method name (e.g. "mean", "ols")
    fn name(&self) -> &str;
}

/// A fitted regression model.
pub trait FittedRegressor: std::fmt::Debug + Send + Sync {
    /// Predict targets for a row-major design matrix with the same column
    /// count the model was fitted on.
    fn predict(&self, x: &[f64], n: usize, p: usize) -> Result<Vec<f64>>;
}
