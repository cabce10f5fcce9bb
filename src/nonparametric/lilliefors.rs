//! Distribution of the Lilliefors statistic.
//!
//! Critical values of the Kolmogorov–Smirnov distance when the reference
//! distribution's parameters are estimated from the sample.
//!
//! References:
//! - Lilliefors (1967), "On the Kolmogorov-Smirnov test for normality with
//!   mean and variance unknown", *JASA* 62(318), pp. 399–402.
//! - Lilliefors (1969), "On the Kolmogorov-Smirnov test for the exponential
//!   distribution with mean unknown", *JASA* 64(325), pp. 387–389.

use tracing::debug;

use super::PValue;
use crate::error::StatsError;
use crate::tables::{Approximate1KeyTable, Critical1KeyTable};

/// Significance levels of the reference tables, ascending.
const LEVELS: [f64; 5] = [0.01, 0.05, 0.10, 0.15, 0.20];

/// Largest tabulated sample size.
const MAX_TABULATED: usize = 30;

type Row = (usize, [f64; 5]);

const NORMAL: [Row; 19] = [
    (4, [0.417, 0.381, 0.352, 0.319, 0.300]),
    (5, [0.405, 0.337, 0.315, 0.299, 0.285]),
    (6, [0.364, 0.319, 0.294, 0.277, 0.265]),
    (7, [0.348, 0.300, 0.276, 0.258, 0.247]),
    (8, [0.331, 0.285, 0.261, 0.244, 0.233]),
    (9, [0.311, 0.271, 0.249, 0.233, 0.223]),
    (10, [0.294, 0.258, 0.239, 0.224, 0.215]),
    (11, [0.284, 0.249, 0.230, 0.217, 0.206]),
    (12, [0.275, 0.242, 0.223, 0.212, 0.199]),
    (13, [0.268, 0.234, 0.214, 0.202, 0.190]),
    (14, [0.261, 0.227, 0.207, 0.194, 0.183]),
    (15, [0.257, 0.220, 0.201, 0.187, 0.177]),
    (16, [0.250, 0.213, 0.195, 0.182, 0.173]),
    (17, [0.245, 0.206, 0.189, 0.177, 0.169]),
    (18, [0.239, 0.200, 0.184, 0.173, 0.166]),
    (19, [0.235, 0.195, 0.179, 0.169, 0.163]),
    (20, [0.231, 0.190, 0.174, 0.166, 0.160]),
    (25, [0.200, 0.173, 0.158, 0.147, 0.142]),
    (30, [0.187, 0.161, 0.144, 0.136, 0.131]),
];

const NORMAL_ASYMPTOTIC: [f64; 5] = [1.031, 0.886, 0.805, 0.768, 0.736];

const EXPONENTIAL: [Row; 16] = [
    (3, [0.600, 0.551, 0.511, 0.479, 0.451]),
    (4, [0.548, 0.487, 0.449, 0.422, 0.396]),
    (5, [0.504, 0.442, 0.406, 0.382, 0.359]),
    (6, [0.470, 0.408, 0.375, 0.351, 0.331]),
    (7, [0.442, 0.382, 0.350, 0.327, 0.309]),
    (8, [0.419, 0.360, 0.329, 0.308, 0.291]),
    (9, [0.399, 0.341, 0.311, 0.291, 0.277]),
    (10, [0.380, 0.325, 0.295, 0.277, 0.263]),
    (11, [0.365, 0.311, 0.283, 0.264, 0.251]),
    (12, [0.351, 0.298, 0.271, 0.254, 0.241]),
    (14, [0.329, 0.278, 0.252, 0.236, 0.224]),
    (16, [0.310, 0.261, 0.236, 0.221, 0.211]),
    (18, [0.294, 0.246, 0.224, 0.209, 0.200]),
    (20, [0.279, 0.234, 0.212, 0.199, 0.190]),
    (25, [0.252, 0.210, 0.190, 0.178, 0.170]),
    (30, [0.231, 0.192, 0.174, 0.163, 0.156]),
];

const EXPONENTIAL_ASYMPTOTIC: [f64; 5] = [1.25, 1.06, 0.96, 0.91, 0.86];

/// Hypothesized family whose parameters were estimated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LillieforsFamily {
    Normal,
    Exponential,
}

impl LillieforsFamily {
    fn asymptotic(self) -> &'static [f64; 5] {
        match self {
            LillieforsFamily::Normal => &NORMAL_ASYMPTOTIC,
            LillieforsFamily::Exponential => &EXPONENTIAL_ASYMPTOTIC,
        }
    }
}

#[derive(Debug, Clone)]
struct FamilyTables {
    critical: Critical1KeyTable,
    /// Reverse lookup: critical value → level, tabulated rows only.
    levels: Approximate1KeyTable,
}

impl FamilyTables {
    fn build(rows: &[Row]) -> Result<Self, StatsError> {
        let mut critical = Critical1KeyTable::new(MAX_TABULATED + 1, &LEVELS)?;
        let mut levels = Approximate1KeyTable::new(MAX_TABULATED + 1, LEVELS.len());
        for (n, values) in rows {
            critical.add_row(*n, values)?;
            let pairs: Vec<(f64, f64)> = values.iter().copied().zip(LEVELS).collect();
            levels.add_row(*n, &pairs)?;
        }
        Ok(Self { critical, levels })
    }
}

/// Upper-tail distribution of the Lilliefors D statistic.
///
/// Sizes inside the tabulated range are answered from the tables, with
/// untabulated sizes interpolated between their neighbours; sizes above it
/// use the asymptotic critical values `c/√n` and are flagged approximate.
///
/// # Examples
/// ```
/// use u_nonparametric::nonparametric::LillieforsDistribution;
/// let lilliefors = LillieforsDistribution::new().unwrap();
///
/// let p = lilliefors.compute_probability_normal(10, 0.27);
/// assert_eq!(p.value(), 0.05);
/// assert!(!p.is_approximate());
///
/// let p = lilliefors.compute_probability_normal(100, 0.11);
/// assert_eq!(p.value(), 0.01);
/// assert!(p.is_approximate());
/// ```
#[derive(Debug, Clone)]
pub struct LillieforsDistribution {
    normal: FamilyTables,
    exponential: FamilyTables,
}

impl LillieforsDistribution {
    pub fn new() -> Result<Self, StatsError> {
        let normal = FamilyTables::build(&NORMAL)?;
        let exponential = FamilyTables::build(&EXPONENTIAL)?;
        debug!(
            normal_rows = NORMAL.len(),
            exponential_rows = EXPONENTIAL.len(),
            "built Lilliefors tables"
        );
        Ok(Self {
            normal,
            exponential,
        })
    }

    fn tables(&self, family: LillieforsFamily) -> &FamilyTables {
        match family {
            LillieforsFamily::Normal => &self.normal,
            LillieforsFamily::Exponential => &self.exponential,
        }
    }

    /// Significance levels charted by the tables.
    pub fn levels(&self) -> &'static [f64] {
        &LEVELS
    }

    /// Smallest charted level at which `d` rejects the hypothesized family
    /// for a sample of size `n`, or [`ALL`](crate::tables::ALL).
    pub fn compute_probability(&self, family: LillieforsFamily, n: usize, d: f64) -> PValue {
        let tables = self.tables(family);
        if n > MAX_TABULATED {
            debug!(?family, n, "Lilliefors: asymptotic critical values");
            let criticals = asymptotic_row(family, n);
            return PValue::asymptotic(tables.critical.estimate_in(&criticals, d));
        }
        PValue::exact(tables.critical.estimate_interpolated(n, d))
    }

    pub fn compute_probability_normal(&self, n: usize, d: f64) -> PValue {
        self.compute_probability(LillieforsFamily::Normal, n, d)
    }

    pub fn compute_probability_exponential(&self, n: usize, d: f64) -> PValue {
        self.compute_probability(LillieforsFamily::Exponential, n, d)
    }

    /// Critical D at level `alpha` (one of [`levels`](Self::levels)).
    ///
    /// `None` when `alpha` is not charted or `n` is below the table.
    pub fn critical_value(&self, family: LillieforsFamily, n: usize, alpha: f64) -> Option<f64> {
        let slot = LEVELS.iter().position(|&l| (l - alpha).abs() < 1e-9)?;
        if n > MAX_TABULATED {
            return Some(family.asymptotic()[slot] / (n as f64).sqrt());
        }
        self.tables(family).critical.interpolate_row(n)?[slot]
    }

    /// Level whose tabulated critical value equals `d` within the table
    /// tolerance, for a sample size that has its own row.
    pub fn tabulated_level(&self, family: LillieforsFamily, n: usize, d: f64) -> Option<f64> {
        self.tables(family).levels.get(n, d)
    }
}

fn asymptotic_row(family: LillieforsFamily, n: usize) -> Vec<Option<f64>> {
    let root = (n as f64).sqrt();
    family.asymptotic().iter().map(|c| Some(c / root)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tables::ALL;

    fn dist() -> LillieforsDistribution {
        LillieforsDistribution::new().unwrap()
    }

    #[test]
    fn test_tabulated_size_is_exact() {
        let l = dist();
        let p = l.compute_probability_normal(20, 0.20);
        assert_eq!(p.value(), 0.05);
        assert!(!p.is_approximate());

        let p = l.compute_probability_exponential(10, 0.40);
        assert_eq!(p.value(), 0.01);
        assert!(!p.is_approximate());
    }

    #[test]
    fn test_large_size_is_approximate() {
        let l = dist();
        let n = 64;
        // Normal 0.05 critical value at n = 64 is 0.886 / 8 = 0.11075.
        let p = l.compute_probability_normal(n, 0.111);
        assert!(p.is_approximate());
        assert_eq!(p.value(), 0.05);

        let p = l.compute_probability_normal(n, 0.05);
        assert!(p.is_approximate());
        assert_eq!(p.value(), ALL);
    }

    #[test]
    fn test_statistic_below_every_critical_value() {
        let l = dist();
        assert_eq!(l.compute_probability_normal(10, 0.10).value(), ALL);
    }

    #[test]
    fn test_size_below_table() {
        let l = dist();
        assert_eq!(l.compute_probability_normal(3, 0.9).value(), ALL);
        assert_eq!(l.compute_probability_exponential(2, 0.9).value(), ALL);
        assert_eq!(l.critical_value(LillieforsFamily::Normal, 3, 0.05), None);
    }

    #[test]
    fn test_untabulated_size_interpolates() {
        let l = dist();
        // n = 22 sits 2/5 of the way from 20 to 25.
        let c = l.critical_value(LillieforsFamily::Normal, 22, 0.05).unwrap();
        assert!((c - (0.190 + 0.4 * (0.173 - 0.190))).abs() < 1e-12);
        let p = l.compute_probability_normal(22, c + 1e-6);
        assert_eq!(p.value(), 0.05);
        assert!(!p.is_approximate());

        // n = 13 is between 12 and 14 in the exponential table.
        let c = l.critical_value(LillieforsFamily::Exponential, 13, 0.01).unwrap();
        assert!((c - 0.340).abs() < 1e-12);
    }

    #[test]
    fn test_critical_value_asymptotic() {
        let l = dist();
        let c = l.critical_value(LillieforsFamily::Exponential, 100, 0.10).unwrap();
        assert!((c - 0.096).abs() < 1e-12);
        assert_eq!(l.critical_value(LillieforsFamily::Normal, 10, 0.02), None);
    }

    #[test]
    fn test_tabulated_level_reverse_lookup() {
        let l = dist();
        assert_eq!(l.tabulated_level(LillieforsFamily::Normal, 4, 0.381), Some(0.05));
        assert_eq!(l.tabulated_level(LillieforsFamily::Normal, 4, 0.3825), Some(0.05));
        assert_eq!(l.tabulated_level(LillieforsFamily::Normal, 4, 0.370), None);
        assert_eq!(l.tabulated_level(LillieforsFamily::Exponential, 13, 0.340), None);
    }

    #[test]
    fn test_tables_continue_asymptotically() {
        // The 0.20 row at n = 30 and the asymptotic value at n = 31 agree to
        // within the table's rounding.
        let l = dist();
        for family in [LillieforsFamily::Normal, LillieforsFamily::Exponential] {
            let at_30 = l.critical_value(family, 30, 0.20).unwrap();
            let at_31 = l.critical_value(family, 31, 0.20).unwrap();
            assert!((at_30 - at_31).abs() < 0.01, "{family:?}: {at_30} vs {at_31}");
        }
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        #[test]
        fn larger_statistic_never_raises_p(n in 3_usize..80, d1 in 0.0_f64..0.8, d2 in 0.0_f64..0.8) {
            let l = LillieforsDistribution::new().unwrap();
            let (lo, hi) = if d1 <= d2 { (d1, d2) } else { (d2, d1) };
            for family in [LillieforsFamily::Normal, LillieforsFamily::Exponential] {
                let p_lo = l.compute_probability(family, n, lo);
                let p_hi = l.compute_probability(family, n, hi);
                prop_assert!(p_hi.value() <= p_lo.value());
                prop_assert_eq!(p_lo.is_approximate(), n > 30);
            }
        }
    }
}
