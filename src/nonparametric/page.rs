//! Distribution of Page's L statistic for ordered alternatives.
//!
//! Reference: Page (1963), "Ordered hypotheses for multiple treatments: a
//! significance test for linear ranks", *JASA* 58(301), pp. 216–230.

use tracing::debug;

use super::PValue;
use crate::distributions::Normal;
use crate::error::StatsError;
use crate::tables::{Critical2KeyTable, ALL};

/// Significance levels of the reference table, ascending.
const LEVELS: [f64; 3] = [0.001, 0.01, 0.05];

const MIN_TREATMENTS: usize = 3;
const MAX_TREATMENTS: usize = 8;
const MIN_BLOCKS: usize = 2;
const MAX_BLOCKS: usize = 12;

/// Critical L by treatments k and blocks n = 2..=12; `None` where the
/// level cannot be reached.
#[rustfmt::skip]
const CRITICAL: [(usize, [[Option<f64>; 3]; 11]); 6] = [
    (3, [
        [None, None, Some(28.0)],
        [None, Some(42.0), Some(41.0)],
        c(56.0, 55.0, 54.0), c(70.0, 68.0, 66.0), c(83.0, 81.0, 79.0),
        c(97.0, 94.0, 91.0), c(111.0, 107.0, 104.0), c(125.0, 120.0, 116.0),
        c(138.0, 133.0, 128.0), c(152.0, 146.0, 141.0), c(166.0, 159.0, 153.0),
    ]),
    (4, [
        [None, Some(60.0), Some(58.0)],
        c(89.0, 87.0, 84.0), c(117.0, 114.0, 111.0), c(145.0, 141.0, 137.0),
        c(172.0, 167.0, 163.0), c(198.0, 193.0, 189.0), c(225.0, 220.0, 214.0),
        c(252.0, 246.0, 240.0), c(278.0, 272.0, 266.0), c(305.0, 298.0, 292.0),
        c(331.0, 324.0, 317.0),
    ]),
    (5, [
        c(109.0, 106.0, 103.0), c(160.0, 155.0, 150.0), c(210.0, 204.0, 197.0),
        c(259.0, 251.0, 244.0), c(307.0, 299.0, 291.0), c(355.0, 346.0, 338.0),
        c(403.0, 393.0, 384.0), c(451.0, 441.0, 431.0), c(499.0, 487.0, 477.0),
        c(546.0, 534.0, 523.0), c(593.0, 581.0, 570.0),
    ]),
    (6, [
        c(178.0, 173.0, 166.0), c(260.0, 252.0, 244.0), c(341.0, 331.0, 321.0),
        c(420.0, 409.0, 397.0), c(499.0, 486.0, 474.0), c(577.0, 563.0, 550.0),
        c(655.0, 640.0, 625.0), c(733.0, 717.0, 701.0), c(811.0, 793.0, 777.0),
        c(888.0, 869.0, 852.0), c(965.0, 946.0, 928.0),
    ]),
    (7, [
        c(269.0, 261.0, 252.0), c(394.0, 382.0, 370.0), c(516.0, 501.0, 487.0),
        c(637.0, 620.0, 603.0), c(757.0, 737.0, 719.0), c(876.0, 855.0, 835.0),
        c(994.0, 972.0, 950.0), c(1113.0, 1088.0, 1065.0), c(1230.0, 1205.0, 1180.0),
        c(1348.0, 1321.0, 1295.0), c(1465.0, 1437.0, 1410.0),
    ]),
    (8, [
        c(388.0, 376.0, 362.0), c(567.0, 549.0, 532.0), c(743.0, 722.0, 701.0),
        c(917.0, 893.0, 869.0), c(1090.0, 1063.0, 1037.0), c(1262.0, 1232.0, 1204.0),
        c(1433.0, 1401.0, 1371.0), c(1603.0, 1569.0, 1537.0), c(1773.0, 1736.0, 1703.0),
        c(1943.0, 1905.0, 1868.0), c(2112.0, 2072.0, 2035.0),
    ]),
];

const fn c(l001: f64, l01: f64, l05: f64) -> [Option<f64>; 3] {
    [Some(l001), Some(l01), Some(l05)]
}

/// Upper-tail distribution of Page's L for `k` treatments ranked within
/// `n` blocks.
///
/// # Examples
/// ```
/// use u_nonparametric::nonparametric::PageDistribution;
/// let page = PageDistribution::new().unwrap();
/// let p = page.compute_exact_probability(4, 5, 142.0);
/// assert_eq!(p.value(), 0.01);
/// assert!(!p.is_approximate());
/// ```
#[derive(Debug, Clone)]
pub struct PageDistribution {
    table: Critical2KeyTable,
}

impl PageDistribution {
    pub fn new() -> Result<Self, StatsError> {
        let mut table = Critical2KeyTable::new(MAX_TREATMENTS + 1, MAX_BLOCKS + 1, &LEVELS)?;
        for (k, rows) in &CRITICAL {
            for (offset, row) in rows.iter().enumerate() {
                table.add_partial_row(*k, MIN_BLOCKS + offset, row)?;
            }
        }
        debug!(
            treatments = MAX_TREATMENTS - MIN_TREATMENTS + 1,
            blocks = MAX_BLOCKS - MIN_BLOCKS + 1,
            "built Page table"
        );
        Ok(Self { table })
    }

    pub fn is_tabulated(&self, k: usize, n: usize) -> bool {
        (MIN_TREATMENTS..=MAX_TREATMENTS).contains(&k) && (MIN_BLOCKS..=MAX_BLOCKS).contains(&n)
    }

    /// Smallest charted level reached by `l`, or [`ALL`].
    ///
    /// Shapes outside the table answer with
    /// [`compute_asymptotic_probability`](Self::compute_asymptotic_probability),
    /// flagged approximate.
    pub fn compute_exact_probability(&self, k: usize, n: usize, l: f64) -> PValue {
        if self.is_tabulated(k, n) {
            return PValue::exact(self.table.estimate(k, n, l));
        }
        debug!(k, n, "Page: shape outside table, normal approximation");
        PValue::asymptotic(self.compute_asymptotic_probability(k, n, l))
    }

    /// Normal approximation of P(L ≥ l).
    ///
    /// E[L] = nk(k+1)²/4, Var[L] = n k²(k+1)(k²−1)/144. Degenerate shapes
    /// (fewer than two treatments, no blocks) give [`ALL`].
    pub fn compute_asymptotic_probability(&self, k: usize, n: usize, l: f64) -> f64 {
        if k < 2 || n == 0 || l.is_nan() {
            return ALL;
        }
        let (k, n) = (k as f64, n as f64);
        let mean = n * k * (k + 1.0) * (k + 1.0) / 4.0;
        let variance = n * k * k * (k + 1.0) * (k * k - 1.0) / 144.0;
        Normal::standard().tipified_probability((l - mean) / variance.sqrt(), false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dist() -> PageDistribution {
        PageDistribution::new().unwrap()
    }

    #[test]
    fn test_exact_levels() {
        let p = dist();
        assert_eq!(p.compute_exact_probability(3, 4, 56.0).value(), 0.001);
        assert_eq!(p.compute_exact_probability(3, 4, 55.0).value(), 0.01);
        assert_eq!(p.compute_exact_probability(3, 4, 54.0).value(), 0.05);
        assert_eq!(p.compute_exact_probability(3, 4, 53.0).value(), ALL);
        assert_eq!(p.compute_exact_probability(8, 12, 2200.0).value(), 0.001);
    }

    #[test]
    fn test_uncharted_levels_skipped() {
        let p = dist();
        // k = 3, n = 2: only the 0.05 level is attainable; L = 28 is the maximum.
        let v = p.compute_exact_probability(3, 2, 28.0);
        assert_eq!(v.value(), 0.05);
        assert!(!v.is_approximate());
        assert_eq!(p.compute_exact_probability(3, 3, 42.0).value(), 0.01);
    }

    #[test]
    fn test_outside_table_is_asymptotic() {
        let p = dist();
        let v = p.compute_exact_probability(3, 20, 260.0);
        assert!(v.is_approximate());
        assert_eq!(v.value(), p.compute_asymptotic_probability(3, 20, 260.0));
        assert!(p.compute_exact_probability(9, 5, 400.0).is_approximate());
    }

    #[test]
    fn test_asymptotic_moments() {
        let p = dist();
        // k = 3, n = 20: E[L] = 240, Var[L] = 20·9·4·8/144 = 40.
        assert!((p.compute_asymptotic_probability(3, 20, 240.0) - 0.5).abs() < 1e-12);
        let expected = Normal::new(240.0, 40.0_f64.sqrt()).unwrap().upper_tail(260.0);
        assert!((p.compute_asymptotic_probability(3, 20, 260.0) - expected).abs() < 1e-12);
    }

    #[test]
    fn test_asymptotic_degenerate() {
        let p = dist();
        assert_eq!(p.compute_asymptotic_probability(1, 10, 5.0), ALL);
        assert_eq!(p.compute_asymptotic_probability(4, 0, 5.0), ALL);
    }

    #[test]
    fn test_asymptotic_agrees_with_table_at_edge() {
        // At the largest shapes the tabulated 0.05 critical value sits close
        // to the normal 0.05 point.
        let p = dist();
        for k in 3..=8 {
            let c = p.table.get(k, 12, 2).unwrap();
            let tail = p.compute_asymptotic_probability(k, 12, c);
            assert!((0.03..=0.06).contains(&tail), "k={k}: {tail}");
        }
    }
}
