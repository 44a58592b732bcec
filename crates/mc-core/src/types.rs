//! Common data types for microcause

use serde::{Deserialize, Serialize};

/// Result of a residualizing effect estimation.
///
/// Immutable once computed: one point estimate per estimation call, plus
/// the full out-of-fold residual vectors for inspection or plotting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EffectEstimate {
    /// Slope of outcome-residual on exposure-residual (the effect estimate).
    pub theta: f64,

    /// Standard error of the slope, from the final regression's residual
    /// variance. `NaN` when degrees of freedom are exhausted.
    pub se: f64,

    /// t-statistic (`theta / se`).
    pub t_stat: f64,

    /// Two-sided p-value against the standard normal.
    pub p_value: f64,

    /// Number of observations.
    pub n_obs: usize,

    /// Number of folds used for cross-fitting (1 = in-sample residuals).
    pub n_folds: usize,

    /// Exposure residuals, one per record, indexed by original record order.
    pub exposure_residuals: Vec<f64>,

    /// Outcome residuals, one per record, indexed by original record order.
    pub outcome_residuals: Vec<f64>,

    /// Name of the nuisance regression method.
    pub regressor: String,
}

impl EffectEstimate {
    /// 95% confidence interval for the slope.
    pub fn confidence_interval95(&self) -> (f64, f64) {
        (self.theta - 1.96 * self.se, self.theta + 1.96 * self.se)
    }
}
