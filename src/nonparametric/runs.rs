//! Distribution of the total number of runs in a two-symbol sequence.
//!
//! For a sequence holding `n1` symbols of one kind and `n2` of the other,
//! every arrangement equally likely:
//!
//! - P(R = 2s)     = 2·C(n1−1, s−1)·C(n2−1, s−1) / C(n, n1)
//! - P(R = 2s + 1) = [C(n1−1, s−1)·C(n2−1, s) + C(n1−1, s)·C(n2−1, s−1)] / C(n, n1)
//!
//! Asymptotically R is normal with μ = 2n1n2/n + 1 and
//! σ² = 2n1n2(2n1n2 − n) / (n²(n − 1)).

use tracing::debug;

use super::{normal_tails, TailProbabilities};
use crate::special::{ln_choose, KahanSum};
use crate::tables::Incomplete3KeyTable;

/// Exact and asymptotic tails of the total number of runs.
///
/// Exact tails are tabulated for group sizes up to the configured limit,
/// keyed by `(n1, n2, r)`.
///
/// # Examples
/// ```
/// use u_nonparametric::nonparametric::TotalNumberOfRunsDistribution;
/// let runs = TotalNumberOfRunsDistribution::new(10, true);
/// let tails = runs.tails(5, 5, 2);
/// assert!((tails.left - 2.0 / 252.0).abs() < 1e-12);
/// assert!(!tails.is_approximate());
/// ```
#[derive(Debug, Clone)]
pub struct TotalNumberOfRunsDistribution {
    limit: usize,
    continuity_correction: bool,
    left: Incomplete3KeyTable,
    right: Incomplete3KeyTable,
}

impl TotalNumberOfRunsDistribution {
    /// Tabulates the exact tails for `1 ≤ n1, n2 ≤ limit`.
    pub fn new(limit: usize, continuity_correction: bool) -> Self {
        let mut left = Incomplete3KeyTable::new(limit + 1, limit + 1, 2 * limit + 1);
        let mut right = Incomplete3KeyTable::new(limit + 1, limit + 1, 2 * limit + 1);

        for n1 in 1..=limit {
            for n2 in 1..=limit {
                let pmf = exact_pmf(n1 as u64, n2 as u64);
                let max = max_runs(n1, n2);

                let mut acc = KahanSum::new();
                for r in 2..=max {
                    acc.add(pmf[r]);
                    left.set(n1, n2, r, acc.total().min(1.0));
                }
                let mut acc = KahanSum::new();
                for r in (2..=max).rev() {
                    acc.add(pmf[r]);
                    right.set(n1, n2, r, acc.total().min(1.0));
                }
            }
        }

        debug!(limit, cells = left.len(), "built total number of runs tables");
        Self {
            limit,
            continuity_correction,
            left,
            right,
        }
    }

    /// Largest group size with exact tails.
    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Exact tails, or `None` when `(n1, n2)` is outside the table.
    ///
    /// A run count that cannot occur for the given groups yields
    /// [`ALL`](crate::tables::ALL) for every tail.
    pub fn exact_tails(&self, n1: usize, n2: usize, r: usize) -> Option<TailProbabilities> {
        if n1 > self.limit || n2 > self.limit {
            return None;
        }
        if n1 == 0 || n2 == 0 || r < 2 || r > max_runs(n1, n2) {
            return Some(TailProbabilities::all(false));
        }
        let left = self.left.get(n1, n2, r)?;
        let right = self.right.get(n1, n2, r)?;
        Some(TailProbabilities::new(left, right, false))
    }

    /// Normal approximation, continuity corrected when configured.
    pub fn asymptotic_tails(&self, n1: usize, n2: usize, r: usize) -> TailProbabilities {
        if n1 == 0 || n2 == 0 || r < 2 || r > max_runs(n1, n2) {
            return TailProbabilities::all(true);
        }
        let (a, b) = (n1 as f64, n2 as f64);
        let n = a + b;
        let product = 2.0 * a * b;
        let mean = product / n + 1.0;
        let variance = product * (product - n) / (n * n * (n - 1.0));
        normal_tails(r as f64, mean, variance, self.continuity_correction)
    }

    /// Exact tails where tabulated, asymptotic otherwise.
    pub fn tails(&self, n1: usize, n2: usize, r: usize) -> TailProbabilities {
        match self.exact_tails(n1, n2, r) {
            Some(tails) => tails,
            None => {
                debug!(n1, n2, r, "runs: groups beyond exact limit, normal approximation");
                self.asymptotic_tails(n1, n2, r)
            }
        }
    }
}

/// Largest attainable number of runs.
fn max_runs(n1: usize, n2: usize) -> usize {
    let small = n1.min(n2);
    if n1 == n2 {
        2 * small
    } else {
        2 * small + 1
    }
}

/// P(R = r) for r in `0..=n1+n2`; entries below 2 are zero.
fn exact_pmf(n1: u64, n2: u64) -> Vec<f64> {
    let total = ln_choose(n1 + n2, n1);
    let term = |a: (u64, u64), b: (u64, u64)| -> f64 {
        if a.1 > a.0 || b.1 > b.0 {
            return 0.0;
        }
        (ln_choose(a.0, a.1) + ln_choose(b.0, b.1) - total).exp()
    };

    let mut pmf = vec![0.0; (n1 + n2 + 1) as usize];
    for (r, p) in pmf.iter_mut().enumerate().skip(2) {
        let s = (r / 2) as u64;
        *p = if r % 2 == 0 {
            2.0 * term((n1 - 1, s - 1), (n2 - 1, s - 1))
        } else {
            term((n1 - 1, s - 1), (n2 - 1, s)) + term((n1 - 1, s), (n2 - 1, s - 1))
        };
    }
    pmf
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        #[test]
        fn tails_overlap_at_observed_value(n1 in 1_usize..=12, n2 in 1_usize..=12, r in 2_usize..=25) {
            let d = TotalNumberOfRunsDistribution::new(12, true);
            let t = d.exact_tails(n1, n2, r).unwrap();
            prop_assert!((0.0..=1.0).contains(&t.left));
            prop_assert!((0.0..=1.0).contains(&t.right));
            // P(R ≤ r) + P(R ≥ r) ≥ 1, with equality iff P(R = r) = 0.
            prop_assert!(t.left + t.right >= 1.0 - 1e-12);
        }
    }
}
