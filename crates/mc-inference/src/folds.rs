//! Fold assignment for cross-fitting.
//!
//! A [`FoldAssignment`] partitions record indices `0..n` into `k` disjoint,
//! non-empty folds whose sizes differ by at most one, covering every index
//! exactly once. Both strategies are reproducible: round-robin is
//! deterministic with no seed, and shuffling is a seeded permutation.

use mc_core::{Error, Result};
use rand::seq::SliceRandom;
use rand::SeedableRng;

/// Strategy for assigning records to folds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FoldStrategy {
    /// Deterministic round-robin: record `i` goes to fold `i % k`.
    RoundRobin,
    /// Seeded Fisher-Yates permutation of the indices, dealt round-robin.
    /// The same seed always produces the same assignment.
    Shuffled {
        /// RNG seed.
        seed: u64,
    },
}

/// A partition of record indices `0..n` into `k` disjoint, non-empty folds.
#[derive(Debug, Clone)]
pub struct FoldAssignment {
    folds: Vec<Vec<usize>>,
    n: usize,
}

impl FoldAssignment {
    /// Build an assignment for `n` records under the given strategy.
    pub fn new(n: usize, k: usize, strategy: FoldStrategy) -> Result<Self> {
        match strategy {
            FoldStrategy::RoundRobin => Self::round_robin(n, k),
            FoldStrategy::Shuffled { seed } => Self::shuffled(n, k, seed),
        }
    }

    /// Deterministic round-robin assignment: index `i` goes to fold `i % k`.
    pub fn round_robin(n: usize, k: usize) -> Result<Self> {
        Self::validate(n, k)?;
        Ok(Self { folds: Self::deal((0..n).collect(), k), n })
    }

    /// Seeded random assignment: shuffle `0..n`, then deal round-robin.
    pub fn shuffled(n: usize, k: usize, seed: u64) -> Result<Self> {
        Self::validate(n, k)?;
        let mut indices: Vec<usize> = (0..n).collect();
        let mut rng = rand::rngs::StdRng::seed_from_u64(seed);
        indices.shuffle(&mut rng);
        Ok(Self { folds: Self::deal(indices, k), n })
    }

    fn validate(n: usize, k: usize) -> Result<()> {
        if k < 2 {
            return Err(Error::Validation(format!("need at least 2 folds, got {k}")));
        }
        if k > n {
            return Err(Error::InsufficientData(format!(
                "{k} folds requested for only {n} records"
            )));
        }
        Ok(())
    }

    fn deal(order: Vec<usize>, k: usize) -> Vec<Vec<usize>> {
        let mut folds: Vec<Vec<usize>> = (0..k).map(|_| Vec::new()).collect();
        for (i, idx) in order.into_iter().enumerate() {
            folds[i % k].push(idx);
        }
        folds
    }

    /// Number of folds.
    pub fn n_folds(&self) -> usize {
        self.folds.len()
    }

    /// Number of records covered.
    pub fn n_records(&self) -> usize {
        self.n
    }

    /// Record indices of fold `f`.
    pub fn fold(&self, f: usize) -> &[usize] {
        &self.folds[f]
    }

    /// Record indices outside fold `f`, in ascending order.
    pub fn complement(&self, f: usize) -> Vec<usize> {
        let mut in_fold = vec![false; self.n];
        for &i in &self.folds[f] {
            in_fold[i] = true;
        }
        (0..self.n).filter(|&i| !in_fold[i]).collect()
    }

    /// Size of the smallest fold.
    pub fn min_fold_size(&self) -> usize {
        self.folds.iter().map(|f| f.len()).min().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_exact_cover(fa: &FoldAssignment, n: usize) {
        let mut seen = vec![0usize; n];
        for f in 0..fa.n_folds() {
            for &i in fa.fold(f) {
                seen[i] += 1;
            }
        }
        assert!(seen.iter().all(|&c| c == 1), "each index must appear exactly once: {seen:?}");
    }

    #[test]
    fn test_round_robin_covers_exactly_once() {
        for (n, k) in [(4, 2), (10, 3), (11, 5), (7, 7)] {
            let fa = FoldAssignment::round_robin(n, k).unwrap();
            assert_eq!(fa.n_folds(), k);
            assert_exact_cover(&fa, n);
        }
    }

    #[test]
    fn test_fold_sizes_differ_by_at_most_one() {
        let fa = FoldAssignment::round_robin(11, 3).unwrap();
        let sizes: Vec<usize> = (0..3).map(|f| fa.fold(f).len()).collect();
        let max = *sizes.iter().max().unwrap();
        let min = *sizes.iter().min().unwrap();
        assert!(max - min <= 1, "sizes {sizes:?}");

        let fa = FoldAssignment::shuffled(11, 3, 9).unwrap();
        let sizes: Vec<usize> = (0..3).map(|f| fa.fold(f).len()).collect();
        assert!(sizes.iter().max().unwrap() - sizes.iter().min().unwrap() <= 1);
    }

    #[test]
    fn test_shuffled_covers_exactly_once_and_is_reproducible() {
        let a = FoldAssignment::shuffled(20, 4, 42).unwrap();
        let b = FoldAssignment::shuffled(20, 4, 42).unwrap();
        assert_exact_cover(&a, 20);
        for f in 0..4 {
            assert_eq!(a.fold(f), b.fold(f), "same seed must give the same folds");
        }

        let c = FoldAssignment::shuffled(20, 4, 43).unwrap();
        let same = (0..4).all(|f| a.fold(f) == c.fold(f));
        assert!(!same, "different seeds should permute differently");
    }

    #[test]
    fn test_complement_is_disjoint_from_fold() {
        let fa = FoldAssignment::shuffled(13, 3, 7).unwrap();
        for f in 0..3 {
            let comp = fa.complement(f);
            assert_eq!(comp.len(), 13 - fa.fold(f).len());
            for &i in fa.fold(f) {
                assert!(!comp.contains(&i), "complement of fold {f} contains in-fold index {i}");
            }
            assert!(comp.windows(2).all(|w| w[0] < w[1]), "complement must be ascending");
        }
    }

    #[test]
    fn test_more_folds_than_records_fails() {
        let err = FoldAssignment::round_robin(3, 5).unwrap_err();
        assert!(matches!(err, Error::InsufficientData(_)));
    }

    #[test]
    fn test_fewer_than_two_folds_fails() {
        assert!(matches!(FoldAssignment::round_robin(5, 0), Err(Error::Validation(_))));
        assert!(matches!(FoldAssignment::round_robin(5, 1), Err(Error::Validation(_))));
    }
}
