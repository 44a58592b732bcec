//! Reference implementations of the fit/predict capability.
//!
//! Two methods cover both prediction modes with one abstraction:
//! [`MeanRegressor`] is literally OLS with only an intercept (group-mean
//! style adjustment), and [`OlsRegressor`] is ordinary least squares via
//! the normal equations. Any other regression method can be substituted by
//! implementing [`Regressor`].

use mc_core::{Error, FittedRegressor, Regressor, Result};
use nalgebra::{DMatrix, DVector};

fn validate_xy(x: &[f64], n: usize, p: usize, y: &[f64]) -> Result<()> {
    if n == 0 {
        return Err(Error::InsufficientData("cannot fit on an empty training set".to_string()));
    }
    if x.len() != n * p {
        return Err(Error::Validation(format!(
            "design matrix has wrong length: expected n*p={}, got {}",
            n * p,
            x.len()
        )));
    }
    if y.len() != n {
        return Err(Error::Validation(format!(
            "target has wrong length: expected n={}, got {}",
            n,
            y.len()
        )));
    }
    if x.iter().any(|v| !v.is_finite()) || y.iter().any(|v| !v.is_finite()) {
        return Err(Error::Validation("training data must contain only finite values".to_string()));
    }
    Ok(())
}

/// Intercept-only predictor: always predicts the training-target mean.
///
/// Ignores covariates entirely, so with an empty covariate set the
/// residualizer's "prediction" degenerates to the sample mean of the
/// training complement.
#[derive(Debug, Clone, Copy, Default)]
pub struct MeanRegressor;

#[derive(Debug, Clone, Copy)]
struct FittedMean {
    mean: f64,
}

impl Regressor for MeanRegressor {
    fn fit(&self, x: &[f64], n: usize, p: usize, y: &[f64]) -> Result<Box<dyn FittedRegressor>> {
        validate_xy(x, n, p, y)?;
        let mean = y.iter().sum::<f64>() / n as f64;
        Ok(Box::new(FittedMean { mean }))
    }

    fn name(&self) -> &str {
        "mean"
    }
}

impl FittedRegressor for FittedMean {
    fn predict(&self, _x: &[f64], n: usize, _p: usize) -> Result<Vec<f64>> {
        Ok(vec![self.mean; n])
    }
}

/// Ordinary least squares via the normal equations.
///
/// Solves `(X'X) beta = X'y` with an LU decomposition. With `p == 0` and an
/// intercept this degenerates to [`MeanRegressor`].
#[derive(Debug, Clone, Copy)]
pub struct OlsRegressor {
    /// Prepend an intercept column to the design.
    pub include_intercept: bool,
}

impl Default for OlsRegressor {
    fn default() -> Self {
        Self { include_intercept: true }
    }
}

#[derive(Debug, Clone)]
struct FittedOls {
    /// `[intercept?, beta_1, .., beta_p]`
    beta: Vec<f64>,
    include_intercept: bool,
    p: usize,
}

impl Regressor for OlsRegressor {
    fn fit(&self, x: &[f64], n: usize, p: usize, y: &[f64]) -> Result<Box<dyn FittedRegressor>> {
        validate_xy(x, n, p, y)?;
        let d = p + usize::from(self.include_intercept);
        if d == 0 {
            return Err(Error::Validation(
                "design has no columns; enable the intercept or provide covariates".to_string(),
            ));
        }
        if n < d {
            return Err(Error::InsufficientData(format!(
                "need at least {d} training records for {d} parameters, got {n}"
            )));
        }

        // Accumulate X'X and X'y over rows.
        let mut xtx = vec![0.0; d * d];
        let mut xty = vec![0.0; d];
        let mut row_buf = vec![0.0; d];
        for i in 0..n {
            if self.include_intercept {
                row_buf[0] = 1.0;
                row_buf[1..].copy_from_slice(&x[i * p..(i + 1) * p]);
            } else {
                row_buf.copy_from_slice(&x[i * p..(i + 1) * p]);
            }
            for a in 0..d {
                xty[a] += row_buf[a] * y[i];
                for b in 0..d {
                    xtx[a * d + b] += row_buf[a] * row_buf[b];
                }
            }
        }

        let a = DMatrix::from_row_slice(d, d, &xtx);
        let b = DVector::from_vec(xty);
        let sol = a.lu().solve(&b).ok_or_else(|| {
            Error::DegenerateFit("singular normal equations (collinear covariates)".to_string())
        })?;

        Ok(Box::new(FittedOls {
            beta: sol.iter().copied().collect(),
            include_intercept: self.include_intercept,
            p,
        }))
    }

    fn name(&self) -> &str {
        "ols"
    }
}

impl FittedRegressor for FittedOls {
    fn predict(&self, x: &[f64], n: usize, p: usize) -> Result<Vec<f64>> {
        if p != self.p {
            return Err(Error::Validation(format!(
                "model was fitted on {} columns, got {p}",
                self.p
            )));
        }
        if x.len() != n * p {
            return Err(Error::Validation(format!(
                "design matrix has wrong length: expected n*p={}, got {}",
                n * p,
                x.len()
            )));
        }
        let (b0, coefs) = if self.include_intercept {
            (self.beta[0], &self.beta[1..])
        } else {
            (0.0, &self.beta[..])
        };
        let preds = (0..n)
            .map(|i| {
                let row = &x[i * p..(i + 1) * p];
                b0 + row.iter().zip(coefs).map(|(&xv, &bv)| xv * bv).sum::<f64>()
            })
            .collect();
        Ok(preds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_mean_regressor_predicts_training_mean() {
        let fitted = MeanRegressor.fit(&[], 4, 0, &[1.0, 2.0, 3.0, 6.0]).unwrap();
        let preds = fitted.predict(&[], 2, 0).unwrap();
        assert_abs_diff_eq!(preds[0], 3.0, epsilon = 1e-12);
        assert_abs_diff_eq!(preds[1], 3.0, epsilon = 1e-12);
    }

    #[test]
    fn test_mean_regressor_rejects_empty_training_set() {
        let err = MeanRegressor.fit(&[], 0, 0, &[]).unwrap_err();
        assert!(matches!(err, Error::InsufficientData(_)));
    }

    #[test]
    fn test_ols_recovers_exact_line() {
        // y = 2 + 3x, no noise.
        let x = vec![0.0, 1.0, 2.0, 3.0];
        let y: Vec<f64> = x.iter().map(|&v| 2.0 + 3.0 * v).collect();
        let fitted = OlsRegressor::default().fit(&x, 4, 1, &y).unwrap();
        let preds = fitted.predict(&[4.0, 5.0], 2, 1).unwrap();
        assert_abs_diff_eq!(preds[0], 14.0, epsilon = 1e-9);
        assert_abs_diff_eq!(preds[1], 17.0, epsilon = 1e-9);
    }

    #[test]
    fn test_ols_on_binary_covariate_gives_group_means() {
        // OLS with an intercept on a 0/1 indicator reproduces group means.
        let x = vec![0.0, 0.0, 1.0, 1.0];
        let y = vec![0.10, 0.15, 0.40, 0.45];
        let fitted = OlsRegressor::default().fit(&x, 4, 1, &y).unwrap();
        let preds = fitted.predict(&x, 4, 1).unwrap();
        assert_abs_diff_eq!(preds[0], 0.125, epsilon = 1e-12);
        assert_abs_diff_eq!(preds[1], 0.125, epsilon = 1e-12);
        assert_abs_diff_eq!(preds[2], 0.425, epsilon = 1e-12);
        assert_abs_diff_eq!(preds[3], 0.425, epsilon = 1e-12);
    }

    #[test]
    fn test_ols_intercept_only_equals_mean() {
        let y = vec![1.0, 2.0, 3.0, 6.0];
        let fitted = OlsRegressor::default().fit(&[], 4, 0, &y).unwrap();
        let preds = fitted.predict(&[], 1, 0).unwrap();
        assert_abs_diff_eq!(preds[0], 3.0, epsilon = 1e-12);
    }

    #[test]
    fn test_ols_no_intercept_empty_design_rejected() {
        let r = OlsRegressor { include_intercept: false };
        let err = r.fit(&[], 3, 0, &[1.0, 2.0, 3.0]).unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[test]
    fn test_ols_collinear_design_is_degenerate() {
        // Two identical columns.
        let x = vec![1.0, 1.0, 2.0, 2.0, 3.0, 3.0, 4.0, 4.0];
        let y = vec![1.0, 2.0, 3.0, 4.0];
        let err = OlsRegressor::default().fit(&x, 4, 2, &y).unwrap_err();
        assert!(matches!(err, Error::DegenerateFit(_)));
    }

    #[test]
    fn test_fitted_ols_rejects_column_mismatch() {
        let fitted = OlsRegressor::default().fit(&[0.0, 1.0], 2, 1, &[0.0, 1.0]).unwrap();
        let err = fitted.predict(&[1.0, 2.0], 1, 2).unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }
}
