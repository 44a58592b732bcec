//! Synthetic microbiome/metabolomics datasets.
//!
//! Two generators: the fixed 4-patient toy table used throughout the
//! worked examples, and a seeded simulator for arbitrarily large tables
//! with the same causal story (diet shifts the community composition; the
//! BugA/BugD balance drives a metabolite, which drives the tumor outcome).
//!
//! Sampling is deterministic: the same [`SimulationConfig::seed`] always
//! produces the same table.

use mc_core::{Error, Result, Table};
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Gamma, Normal};

use crate::transforms::{log_ratio, PSEUDOCOUNT};

/// Baseline Gamma shapes for BugA..BugD relative abundances.
const ALPHA_BASE: [f64; 4] = [2.0, 4.0, 3.0, 2.0];
/// Multiplicative shape shift under the high-fiber diet: BugA blooms,
/// BugB recedes.
const DIET_SHIFT: [f64; 4] = [3.0, 0.7, 1.0, 1.0];

/// Configuration for [`simulate_table`].
///
/// The data-generating process is
/// `Metabolite = 1.5 + 0.8 * log(BugA/BugD) + 0.3 * Diet + eps` and
/// `Tumor = 80 - 12 * Metabolite - 3 * log(BugA/BugD) - 6 * Diet + eps`,
/// so the partial effect of the log-ratio on Tumor given Diet is
/// `-12 * 0.8 - 3 = -12.6`.
#[derive(Debug, Clone, Copy)]
pub struct SimulationConfig {
    /// Number of records.
    pub n: usize,
    /// RNG seed.
    pub seed: u64,
    /// Noise standard deviation on the metabolite.
    pub metabolite_noise_sd: f64,
    /// Noise standard deviation on the tumor outcome.
    pub tumor_noise_sd: f64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self { n: 400, seed: 1, metabolite_noise_sd: 0.15, tumor_noise_sd: 3.0 }
    }
}

/// The 4-patient worked-example table.
///
/// Diet-group means are 0.125 / 0.425 for BugA and 60 / 50 for Tumor, so
/// group-mean adjustment leaves BugA residuals of ±0.025 and Tumor
/// residuals of ±1.0 (low-fiber group) and ±2.5 (high-fiber group).
pub fn toy_table() -> Table {
    let mut t = Table::new();
    t.add_column("Diet", vec![0.0, 0.0, 1.0, 1.0]).expect("toy columns are consistent");
    t.add_column("BugA", vec![0.10, 0.15, 0.40, 0.45]).expect("toy columns are consistent");
    t.add_column("BugB", vec![0.50, 0.45, 0.25, 0.20]).expect("toy columns are consistent");
    t.add_column("BugC", vec![0.25, 0.22, 0.20, 0.18]).expect("toy columns are consistent");
    t.add_column("BugD", vec![0.15, 0.18, 0.15, 0.17]).expect("toy columns are consistent");
    t.add_column("Metabolite", vec![1.18, 1.33, 2.08, 2.28]).expect("toy columns are consistent");
    t.add_column("Tumor", vec![61.0, 59.0, 52.5, 47.5]).expect("toy columns are consistent");
    t
}

/// Generate a seeded synthetic table with columns
/// `Diet, BugA..BugD, Metabolite, Tumor`.
pub fn simulate_table(config: &SimulationConfig) -> Result<Table> {
    if config.n == 0 {
        return Err(Error::Validation("n must be at least 1".to_string()));
    }
    for (name, sd) in
        [("metabolite_noise_sd", config.metabolite_noise_sd), ("tumor_noise_sd", config.tumor_noise_sd)]
    {
        if !(sd.is_finite() && sd >= 0.0) {
            return Err(Error::Validation(format!("{name} must be non-negative, got {sd}")));
        }
    }

    let n = config.n;
    let mut rng = rand::rngs::StdRng::seed_from_u64(config.seed);

    let diet: Vec<f64> = (0..n).map(|_| rng.gen_range(0..2u32) as f64).collect();

    // Dirichlet-style composition: independent Gammas closed to sum 1.
    let mut bugs = vec![[0.0_f64; 4]; n];
    for (i, row) in bugs.iter_mut().enumerate() {
        for (j, cell) in row.iter_mut().enumerate() {
            let shape =
                ALPHA_BASE[j] * if diet[i] == 1.0 { DIET_SHIFT[j] } else { 1.0 };
            let gamma = Gamma::new(shape, 1.0).expect("gamma shape is positive");
            *cell = gamma.sample(&mut rng);
        }
        let total: f64 = row.iter().sum();
        for cell in row.iter_mut() {
            *cell /= total;
        }
    }
    let bug_a: Vec<f64> = bugs.iter().map(|r| r[0]).collect();
    let bug_b: Vec<f64> = bugs.iter().map(|r| r[1]).collect();
    let bug_c: Vec<f64> = bugs.iter().map(|r| r[2]).collect();
    let bug_d: Vec<f64> = bugs.iter().map(|r| r[3]).collect();

    let lr = log_ratio(&bug_a, &bug_d, PSEUDOCOUNT)?;

    let eps_m = Normal::new(0.0, config.metabolite_noise_sd).expect("noise sd is non-negative");
    let metabolite: Vec<f64> = (0..n)
        .map(|i| 1.5 + 0.8 * lr[i] + 0.3 * diet[i] + eps_m.sample(&mut rng))
        .collect();

    let eps_t = Normal::new(0.0, config.tumor_noise_sd).expect("noise sd is non-negative");
    let tumor: Vec<f64> = (0..n)
        .map(|i| 80.0 - 12.0 * metabolite[i] - 3.0 * lr[i] - 6.0 * diet[i] + eps_t.sample(&mut rng))
        .collect();

    let mut t = Table::new();
    t.add_column("Diet", diet)?;
    t.add_column("BugA", bug_a)?;
    t.add_column("BugB", bug_b)?;
    t.add_column("BugC", bug_c)?;
    t.add_column("BugD", bug_d)?;
    t.add_column("Metabolite", metabolite)?;
    t.add_column("Tumor", tumor)?;
    Ok(t)
}
