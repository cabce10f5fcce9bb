//! Distribution of the Chakraborti–Desu exceedance statistic.
//!
//! `k` treatment samples of `block` observations each are compared with a
//! control sample of `m = N − k·block` observations. W counts the treatment
//! observations exceeding the control median X₍r₎, r = ⌈m/2⌉. With
//! M = k·block and V = M − W,
//!
//! P(V = v) = C(r−1+v, v)·C(m−r+M−v, M−v) / C(m+M, M).
//!
//! Reference: Chakraborti & Desu (1988), "Generalizations of Mathisen's
//! median test for comparing several treatments with a control",
//! *Communications in Statistics – Simulation and Computation* 17(3).

use tracing::debug;

use crate::distributions::Normal;
use crate::error::{Result, StatsError};
use crate::special::{ln_choose, KahanSum};
use crate::tables::ALL;

/// Sample layout of one Chakraborti–Desu comparison.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Layout {
    /// Control size m.
    control: u64,
    /// Treatment observations M.
    treatment: u64,
    /// Order statistic of the control median.
    r: u64,
}

impl Layout {
    fn new(total: u64, samples: u64, block: u64) -> Result<Self> {
        if samples == 0 {
            return Err(StatsError::invalid("samples", 0.0, "need at least one treatment sample"));
        }
        if block == 0 {
            return Err(StatsError::invalid("block", 0.0, "blocks must hold observations"));
        }
        let treatment = samples
            .checked_mul(block)
            .filter(|&t| t < total)
            .ok_or_else(|| {
                StatsError::invalid(
                    "total",
                    total as f64,
                    "must exceed samples × block by at least one control observation",
                )
            })?;
        let control = total - treatment;
        Ok(Self {
            control,
            treatment,
            r: control.div_ceil(2),
        })
    }

    fn ln_mass(&self, v: u64) -> f64 {
        let (m, big_m, r) = (self.control, self.treatment, self.r);
        ln_choose(r - 1 + v, v) + ln_choose(m - r + big_m - v, big_m - v)
            - ln_choose(m + big_m, big_m)
    }

    fn mean(&self) -> f64 {
        let (m, big_m, r) = (self.control as f64, self.treatment as f64, self.r as f64);
        big_m * (m - r + 1.0) / (m + 1.0)
    }

    fn variance(&self) -> f64 {
        let (m, big_m, r) = (self.control as f64, self.treatment as f64, self.r as f64);
        big_m * r * (m - r + 1.0) * (big_m + m + 1.0) / ((m + 1.0) * (m + 1.0) * (m + 2.0))
    }
}

/// Right-tail distribution of the Chakraborti–Desu W statistic.
///
/// Computed directly from the exceedance pmf; no table is kept.
///
/// # Examples
/// ```
/// use u_nonparametric::nonparametric::CdDistribution;
/// let cd = CdDistribution::new(true);
/// // 3 controls, 2 single-observation treatments: P(W ≥ 2) = 3/10.
/// let p = cd.compute_exact_probability(5, 2, 1, 2).unwrap();
/// assert!((p - 0.3).abs() < 1e-12);
/// ```
#[derive(Debug, Clone)]
pub struct CdDistribution {
    continuity_correction: bool,
}

impl CdDistribution {
    pub fn new(continuity_correction: bool) -> Self {
        Self {
            continuity_correction,
        }
    }

    /// Exact P(W ≥ w) for `total` observations split into `samples`
    /// treatment blocks of `block` observations and the control.
    ///
    /// # Errors
    /// `InvalidParameter` when the layout leaves no control observation or
    /// has an empty treatment.
    pub fn compute_exact_probability(
        &self,
        total: u64,
        samples: u64,
        block: u64,
        w: u64,
    ) -> Result<f64> {
        let layout = Layout::new(total, samples, block)?;
        if w == 0 {
            return Ok(ALL);
        }
        if w > layout.treatment {
            return Ok(0.0);
        }
        let mut acc = KahanSum::new();
        for v in 0..=layout.treatment - w {
            acc.add(layout.ln_mass(v).exp());
        }
        Ok(acc.total().clamp(0.0, 1.0))
    }

    /// Normal approximation of P(W ≥ w).
    ///
    /// E[W] = M(m−r+1)/(m+1), Var[W] = M·r·(m−r+1)(M+m+1)/((m+1)²(m+2)),
    /// continuity corrected when configured.
    pub fn compute_asymptotic_probability(
        &self,
        total: u64,
        samples: u64,
        block: u64,
        w: u64,
    ) -> Result<f64> {
        let layout = Layout::new(total, samples, block)?;
        let variance = layout.variance();
        if variance <= 0.0 {
            return Ok(ALL);
        }
        let half = if self.continuity_correction { 0.5 } else { 0.0 };
        let z = (w as f64 - half - layout.mean()) / variance.sqrt();
        debug!(total, samples, block, z, "Chakraborti-Desu normal approximation");
        Ok(Normal::standard().tipified_probability(z, false))
    }

    /// (E[W], Var[W]) for a layout.
    pub fn moments(&self, total: u64, samples: u64, block: u64) -> Result<(f64, f64)> {
        let layout = Layout::new(total, samples, block)?;
        Ok((layout.mean(), layout.variance()))
    }
}
