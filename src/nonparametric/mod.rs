//! Distributions of nonparametric test statistics.
//!
//! Each distribution answers from exact reference data where it exists and
//! falls back to a normal approximation elsewhere. Which path produced a
//! value is part of the result: see [`PValue::is_approximate`] and
//! [`TailProbabilities::is_approximate`].
//!
//! | Distribution | Statistic | Exact source |
//! |---|---|---|
//! | [`LillieforsDistribution`] | D (KS with estimated parameters) | Lilliefors critical values |
//! | [`PageDistribution`] | Page's L | Page critical values |
//! | [`TotalNumberOfRunsDistribution`] | runs in a two-symbol sequence | combinatorial pmf |
//! | [`RunsUpDownDistribution`] | runs up and down | recurrence |
//! | [`CdDistribution`] | Chakraborti–Desu W | exceedance pmf |

mod chakraborti_desu;
mod lilliefors;
mod page;
mod runs;
mod runs_up_down;

pub use chakraborti_desu::CdDistribution;
pub use lilliefors::{LillieforsDistribution, LillieforsFamily};
pub use page::PageDistribution;
pub use runs::TotalNumberOfRunsDistribution;
pub use runs_up_down::RunsUpDownDistribution;

use crate::distributions::Normal;
use crate::tables::ALL;

/// A p-value and whether it came from an asymptotic approximation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PValue {
    value: f64,
    approximate: bool,
}

impl PValue {
    pub fn exact(value: f64) -> Self {
        Self {
            value,
            approximate: false,
        }
    }

    pub fn asymptotic(value: f64) -> Self {
        Self {
            value,
            approximate: true,
        }
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    /// `true` when the value was not read from exact reference data.
    pub fn is_approximate(&self) -> bool {
        self.approximate
    }
}

/// Left, right and two-sided tail probabilities of a discrete statistic.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TailProbabilities {
    /// P(R ≤ r)
    pub left: f64,
    /// P(R ≥ r)
    pub right: f64,
    /// min(1, 2 · min(left, right))
    pub double: f64,
    approximate: bool,
}

impl TailProbabilities {
    pub(crate) fn new(left: f64, right: f64, approximate: bool) -> Self {
        let left = left.clamp(0.0, 1.0);
        let right = right.clamp(0.0, 1.0);
        Self {
            left,
            right,
            double: (2.0 * left.min(right)).min(1.0),
            approximate,
        }
    }

    /// Every tail reported as [`ALL`]: the statistic cannot occur, or the
    /// approximation is undefined.
    pub(crate) fn all(approximate: bool) -> Self {
        Self {
            left: ALL,
            right: ALL,
            double: ALL,
            approximate,
        }
    }

    pub fn is_approximate(&self) -> bool {
        self.approximate
    }
}

/// Normal-approximation tails of a discrete statistic with mean `mean` and
/// variance `variance`, optionally continuity corrected.
pub(crate) fn normal_tails(r: f64, mean: f64, variance: f64, correction: bool) -> TailProbabilities {
    if !(variance.is_finite() && variance > 0.0) {
        return TailProbabilities::all(true);
    }
    let sd = variance.sqrt();
    let half = if correction { 0.5 } else { 0.0 };
    let z = Normal::standard();
    let left = z.tipified_probability((r + half - mean) / sd, true);
    let right = z.tipified_probability((r - half - mean) / sd, false);
    TailProbabilities::new(left, right, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distributions::Distribution;

    #[test]
    fn test_pvalue_flags() {
        assert!(!PValue::exact(0.05).is_approximate());
        assert!(PValue::asymptotic(0.05).is_approximate());
        assert_eq!(PValue::exact(0.05).value(), 0.05);
    }

    #[test]
    fn test_double_tail() {
        let t = TailProbabilities::new(0.02, 0.99, false);
        assert!((t.double - 0.04).abs() < 1e-15);
        let t = TailProbabilities::new(0.7, 0.6, false);
        assert_eq!(t.double, 1.0);
    }

    #[test]
    fn test_normal_tails_degenerate_variance() {
        let t = normal_tails(3.0, 3.0, 0.0, true);
        assert_eq!(t, TailProbabilities::all(true));
    }

    #[test]
    fn test_normal_tails_symmetric_at_mean() {
        let t = normal_tails(10.0, 10.0, 4.0, false);
        assert!((t.left - 0.5).abs() < 1e-15);
        assert!((t.right - 0.5).abs() < 1e-15);
        let c = normal_tails(10.0, 10.0, 4.0, true);
        assert!(c.left > 0.5 && c.right > 0.5);
    }

    #[test]
    fn test_normal_tails_follow_normal_distribution() {
        let n = Normal::new(12.0, 3.0).unwrap();
        let t = normal_tails(15.0, 12.0, 9.0, true);
        assert!((t.left - n.tipified_probability(15.5, true)).abs() < 1e-12);
        assert!((t.right - n.tipified_probability(14.5, false)).abs() < 1e-12);
        let t = normal_tails(15.0, 12.0, 9.0, false);
        assert!((t.left - n.cumulative_probability(15.0)).abs() < 1e-12);
        assert!((t.right - n.upper_tail(15.0)).abs() < 1e-12);
    }
}
