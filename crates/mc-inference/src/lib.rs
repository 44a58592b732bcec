//! # mc-inference
//!
//! Causal-effect estimation for microbiome/metabolomics observation tables.
//!
//! The centerpiece is [`plr::estimate_effect`]: predict the exposure and the
//! outcome from adjustment covariates with out-of-fold (cross-fitted)
//! models, then regress outcome-residuals on exposure-residuals. The fitted
//! slope is the effect estimate (partially linear regression / double
//! machine learning).
//!
//! ## Architecture
//!
//! Estimation depends on the `Regressor` trait from mc-core, NOT on
//! concrete regression implementations; `MeanRegressor` and `OlsRegressor`
//! here are the reference implementations.

#![warn(missing_docs)]
#![warn(clippy::all)]

/// Fold assignment for cross-fitting.
pub mod folds;
/// Cross-fitted partially linear regression (the effect estimator).
pub mod plr;
/// Reference implementations of the fit/predict capability.
pub mod regressors;
/// Out-of-fold and in-sample residualization.
pub mod residualize;
/// Synthetic microbiome/metabolomics datasets.
pub mod simulate;
/// Compositional transforms for relative-abundance columns.
pub mod transforms;

pub use folds::{FoldAssignment, FoldStrategy};
pub use plr::{estimate_effect, PlrConfig};
pub use regressors::{MeanRegressor, OlsRegressor};
pub use residualize::{residualize, residualize_in_sample};
pub use simulate::{simulate_table, toy_table, SimulationConfig};
pub use transforms::{log_ratio, with_log_ratio, PSEUDOCOUNT};
