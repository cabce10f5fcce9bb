//! Distribution of the number of runs up and down.
//!
//! A permutation of `n` distinct values has `n − 1` successive differences;
//! a run is a maximal stretch of differences with the same sign. Under
//! randomness the number of runs R satisfies
//!
//! p(n, r) = [r·p(n−1, r) + 2·p(n−1, r−1) + (n−r)·p(n−1, r−2)] / n,
//! p(2, 1) = 1,
//!
//! and is asymptotically normal with μ = (2n − 1)/3, σ² = (16n − 29)/90.

use tracing::debug;

use super::{normal_tails, TailProbabilities};
use crate::special::KahanSum;
use crate::tables::Incomplete2KeyTable;

/// Exact and asymptotic tails of the runs-up-and-down count.
#[derive(Debug, Clone)]
pub struct RunsUpDownDistribution {
    limit: usize,
    continuity_correction: bool,
    left: Incomplete2KeyTable,
    right: Incomplete2KeyTable,
}

impl RunsUpDownDistribution {
    /// Tabulates the exact tails for sequences of length `3..=limit`.
    pub fn new(limit: usize, continuity_correction: bool) -> Self {
        let mut left = Incomplete2KeyTable::new(limit + 1, limit.max(1));
        let mut right = Incomplete2KeyTable::new(limit + 1, limit.max(1));

        // probabilities[r] = p(n, r) for the current n.
        let mut probabilities = vec![0.0, 1.0];
        for n in 3..=limit {
            let mut next = vec![0.0; n];
            for (r, p) in next.iter_mut().enumerate().skip(1) {
                let at = |i: usize| probabilities.get(i).copied().unwrap_or(0.0);
                let same = r as f64 * at(r);
                let one_less = 2.0 * at(r - 1);
                let two_less = if r >= 2 { (n - r) as f64 * at(r - 2) } else { 0.0 };
                *p = (same + one_less + two_less) / n as f64;
            }
            probabilities = next;

            let mut acc = KahanSum::new();
            for r in 1..n {
                acc.add(probabilities[r]);
                left.set(n, r, acc.total().min(1.0));
            }
            let mut acc = KahanSum::new();
            for r in (1..n).rev() {
                acc.add(probabilities[r]);
                right.set(n, r, acc.total().min(1.0));
            }
        }

        debug!(limit, cells = left.len(), "built runs up and down tables");
        Self {
            limit,
            continuity_correction,
            left,
            right,
        }
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Exact tails, or `None` for sequences longer than the table.
    ///
    /// Sequences shorter than three, or a run count outside `1..=n−1`,
    /// yield [`ALL`](crate::tables::ALL) for every tail.
    pub fn exact_tails(&self, n: usize, r: usize) -> Option<TailProbabilities> {
        if n > self.limit {
            return None;
        }
        if !is_feasible(n, r) {
            return Some(TailProbabilities::all(false));
        }
        let left = self.left.get(n, r)?;
        let right = self.right.get(n, r)?;
        Some(TailProbabilities::new(left, right, false))
    }

    pub fn asymptotic_tails(&self, n: usize, r: usize) -> TailProbabilities {
        if !is_feasible(n, r) {
            return TailProbabilities::all(true);
        }
        let n = n as f64;
        let mean = (2.0 * n - 1.0) / 3.0;
        let variance = (16.0 * n - 29.0) / 90.0;
        normal_tails(r as f64, mean, variance, self.continuity_correction)
    }

    /// Exact tails where tabulated, asymptotic otherwise.
    pub fn tails(&self, n: usize, r: usize) -> TailProbabilities {
        match self.exact_tails(n, r) {
            Some(tails) => tails,
            None => {
                debug!(n, r, "runs up and down: sequence beyond exact limit, normal approximation");
                self.asymptotic_tails(n, r)
            }
        }
    }
}

fn is_feasible(n: usize, r: usize) -> bool {
    n >= 3 && (1..n).contains(&r)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_four_values() {
        let d = RunsUpDownDistribution::new(10, true);
        let t = d.exact_tails(4, 1).unwrap();
        assert!((t.left - 2.0 / 24.0).abs() < 1e-12);
        let t = d.exact_tails(4, 3).unwrap();
        assert!((t.right - 10.0 / 24.0).abs() < 1e-12);
        assert!((t.left - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_three_values() {
        let d = RunsUpDownDistribution::new(5, true);
        let t = d.exact_tails(3, 1).unwrap();
        assert!((t.left - 1.0 / 3.0).abs() < 1e-12);
        assert!((t.right - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_infeasible_is_all() {
        let d = RunsUpDownDistribution::new(10, true);
        let all = TailProbabilities::all(false);
        assert_eq!(d.exact_tails(2, 1).unwrap(), all);
        assert_eq!(d.exact_tails(6, 0).unwrap(), all);
        assert_eq!(d.exact_tails(6, 6).unwrap(), all);
        assert_eq!(d.asymptotic_tails(50, 50), TailProbabilities::all(true));
    }

    #[test]
    fn test_beyond_limit_uses_normal() {
        let d = RunsUpDownDistribution::new(10, true);
        assert!(d.exact_tails(11, 5).is_none());
        let t = d.tails(40, 26);
        assert!(t.is_approximate());
        assert_eq!(t, d.asymptotic_tails(40, 26));
    }

    #[test]
    fn test_asymptotic_close_to_exact() {
        let d = RunsUpDownDistribution::new(25, true);
        for r in [12, 14, 16, 19] {
            let exact = d.exact_tails(25, r).unwrap();
            let approx = d.asymptotic_tails(25, r);
            assert!((exact.left - approx.left).abs() < 0.01, "r={r}");
            assert!((exact.right - approx.right).abs() < 0.01, "r={r}");
        }
    }

    #[test]
    fn test_exact_mean() {
        let d = RunsUpDownDistribution::new(10, true);
        // E[R] = Σ P(R ≥ r) over r ≥ 1.
        let mean: f64 = (1..10).map(|r| d.exact_tails(10, r).unwrap().right).sum();
        assert!((mean - 19.0 / 3.0).abs() < 1e-10);
    }

    #[test]
    fn test_monte_carlo_agreement() {
        use rand::rngs::StdRng;
        use rand::seq::SliceRandom;
        use rand::SeedableRng;

        let mut rng = StdRng::seed_from_u64(0x5eed_0002);
        let mut values: Vec<u32> = (0..7).collect();
        let trials = 40_000;
        let mut hits = 0;
        for _ in 0..trials {
            values.shuffle(&mut rng);
            let ups: Vec<bool> = values.windows(2).map(|w| w[1] > w[0]).collect();
            let runs = 1 + ups.windows(2).filter(|w| w[0] != w[1]).count();
            if runs <= 3 {
                hits += 1;
            }
        }
        let freq = hits as f64 / trials as f64;

        let d = RunsUpDownDistribution::new(7, true);
        let exact = d.exact_tails(7, 3).unwrap().left;
        assert!((exact - 0.19087301587301587).abs() < 1e-12);
        assert!((freq - exact).abs() < 0.01, "freq={freq}, exact={exact}");
    }
}
