//! Discrete distributions on the integers.

use super::{ensure, Distribution};
use crate::error::StatsError;
use crate::special::{self, KahanSum};

/// Integer value of `x`, or `None` if `x` is NaN, infinite or fractional.
fn lattice_point(x: f64) -> Option<i64> {
    (x.is_finite() && x.fract() == 0.0).then_some(x as i64)
}

/// Argument of a discrete CDF after flooring.
enum Floor {
    Nan,
    Below,
    Above,
    At(i64),
}

fn floor_arg(x: f64) -> Floor {
    if x.is_nan() {
        Floor::Nan
    } else if x == f64::NEG_INFINITY {
        Floor::Below
    } else if x == f64::INFINITY {
        Floor::Above
    } else {
        Floor::At(x.floor() as i64)
    }
}

// ============================================================================
// Discrete Uniform Distribution
// ============================================================================

/// Discrete uniform distribution on the integers `min..=max`.
#[derive(Debug, Clone, PartialEq)]
pub struct DiscreteUniform {
    min: i64,
    max: i64,
}

impl DiscreteUniform {
    /// # Errors
    /// Returns `Err` if `min > max`.
    pub fn new(min: i64, max: i64) -> Result<Self, StatsError> {
        ensure(min <= max, "max", max as f64, "must be at least min")?;
        Ok(Self { min, max })
    }

    pub fn min(&self) -> i64 {
        self.min
    }

    pub fn max(&self) -> i64 {
        self.max
    }

    fn count(&self) -> f64 {
        (i128::from(self.max) - i128::from(self.min) + 1) as f64
    }
}

impl Distribution for DiscreteUniform {
    fn probability(&self, x: f64) -> f64 {
        match lattice_point(x) {
            None => f64::NAN,
            Some(k) if k < self.min || k > self.max => 0.0,
            Some(_) => 1.0 / self.count(),
        }
    }

    fn cumulative_probability(&self, x: f64) -> f64 {
        match floor_arg(x) {
            Floor::Nan => f64::NAN,
            Floor::Below => 0.0,
            Floor::Above => 1.0,
            Floor::At(k) if k < self.min => 0.0,
            Floor::At(k) if k >= self.max => 1.0,
            Floor::At(k) => (i128::from(k) - i128::from(self.min) + 1) as f64 / self.count(),
        }
    }

    fn mean(&self) -> f64 {
        (self.min as f64 + self.max as f64) / 2.0
    }

    fn variance(&self) -> f64 {
        let n = self.count();
        (n * n - 1.0) / 12.0
    }
}

// ============================================================================
// Binomial Distribution
// ============================================================================

/// Binomial distribution: successes in `n` independent trials with success
/// probability `p`.
///
/// Masses are evaluated in log space, so large `n` does not overflow the
/// binomial coefficient.
///
/// # Examples
/// ```
/// use u_nonparametric::distributions::{Binomial, Distribution};
/// let b = Binomial::new(10, 0.5).unwrap();
/// assert!((b.cumulative_probability(5.0) - 0.623046875).abs() < 1e-12);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Binomial {
    n: u64,
    p: f64,
}

impl Binomial {
    /// # Errors
    /// Returns `Err` if `p` is not in `[0, 1]`.
    pub fn new(n: u64, p: f64) -> Result<Self, StatsError> {
        ensure((0.0..=1.0).contains(&p), "p", p, "probability must be in [0, 1]")?;
        Ok(Self { n, p })
    }

    pub fn n(&self) -> u64 {
        self.n
    }

    pub fn p(&self) -> f64 {
        self.p
    }

    /// P(X = k).
    pub fn mass(&self, k: u64) -> f64 {
        if k > self.n {
            return 0.0;
        }
        if self.p == 0.0 {
            return if k == 0 { 1.0 } else { 0.0 };
        }
        if self.p == 1.0 {
            return if k == self.n { 1.0 } else { 0.0 };
        }
        let k_f = k as f64;
        let n_f = self.n as f64;
        (special::ln_choose(self.n, k) + k_f * self.p.ln() + (n_f - k_f) * (-self.p).ln_1p())
            .exp()
    }

    /// Cumulative probabilities P(X ≤ 0), P(X ≤ 1), …, P(X ≤ n).
    ///
    /// The last entry is pinned to 1 so the upper search always terminates.
    fn cumulative(&self) -> impl Iterator<Item = (u64, f64)> + '_ {
        let mut acc = KahanSum::new();
        (0..=self.n).map(move |k| {
            acc.add(self.mass(k));
            let c = if k == self.n { 1.0 } else { acc.total().min(1.0) };
            (k, c)
        })
    }

    /// Largest `k` with P(X ≤ k) ≤ `alpha`, searching upward from 0.
    ///
    /// `None` when even P(X ≤ 0) exceeds `alpha` (the lower bound is not
    /// reachable with `n` trials) or `alpha` is NaN.
    ///
    /// # Examples
    /// ```
    /// use u_nonparametric::distributions::Binomial;
    /// let b = Binomial::new(20, 0.5).unwrap();
    /// assert_eq!(b.lesser_cumulative_probability(0.025), Some(5));
    /// assert_eq!(b.lesser_cumulative_probability(1e-9), None);
    /// ```
    pub fn lesser_cumulative_probability(&self, alpha: f64) -> Option<u64> {
        if alpha.is_nan() {
            return None;
        }
        self.cumulative()
            .take_while(|&(_, c)| c <= alpha)
            .last()
            .map(|(k, _)| k)
    }

    /// Smallest `k` with P(X ≤ k) ≥ `alpha`, searching upward from 0.
    ///
    /// `None` when `alpha` exceeds 1 or is NaN.
    pub fn upper_cumulative_probability(&self, alpha: f64) -> Option<u64> {
        if alpha.is_nan() {
            return None;
        }
        self.cumulative().find(|&(_, c)| c >= alpha).map(|(k, _)| k)
    }
}

impl Distribution for Binomial {
    fn probability(&self, x: f64) -> f64 {
        match lattice_point(x) {
            None => f64::NAN,
            Some(k) if k < 0 => 0.0,
            Some(k) => self.mass(k as u64),
        }
    }

    fn cumulative_probability(&self, x: f64) -> f64 {
        match floor_arg(x) {
            Floor::Nan => f64::NAN,
            Floor::Below => 0.0,
            Floor::Above => 1.0,
            Floor::At(k) if k < 0 => 0.0,
            Floor::At(k) if k as u64 >= self.n => 1.0,
            Floor::At(k) => {
                let mut acc = KahanSum::new();
                for i in 0..=k as u64 {
                    acc.add(self.mass(i));
                }
                acc.total().min(1.0)
            }
        }
    }

    fn mean(&self) -> f64 {
        self.n as f64 * self.p
    }

    fn variance(&self) -> f64 {
        self.n as f64 * self.p * (1.0 - self.p)
    }
}

// ============================================================================
// Poisson Distribution
// ============================================================================

/// Poisson distribution with rate `λ`.
#[derive(Debug, Clone, PartialEq)]
pub struct Poisson {
    lambda: f64,
}

impl Poisson {
    /// # Errors
    /// Returns `Err` unless `λ` is finite and positive.
    pub fn new(lambda: f64) -> Result<Self, StatsError> {
        ensure(
            lambda.is_finite() && lambda > 0.0,
            "lambda",
            lambda,
            "rate must be finite and positive",
        )?;
        Ok(Self { lambda })
    }

    pub fn lambda(&self) -> f64 {
        self.lambda
    }
}

impl Distribution for Poisson {
    fn probability(&self, x: f64) -> f64 {
        match lattice_point(x) {
            None => f64::NAN,
            Some(k) if k < 0 => 0.0,
            Some(k) => {
                let k_f = k as f64;
                (k_f * self.lambda.ln() - self.lambda - special::ln_gamma(k_f + 1.0)).exp()
            }
        }
    }

    /// P(X ≤ k) = Q(k + 1, λ), the regularized upper incomplete gamma.
    fn cumulative_probability(&self, x: f64) -> f64 {
        match floor_arg(x) {
            Floor::Nan => f64::NAN,
            Floor::Below => 0.0,
            Floor::Above => 1.0,
            Floor::At(k) if k < 0 => 0.0,
            Floor::At(k) => special::regularized_upper_gamma(k as f64 + 1.0, self.lambda),
        }
    }

    fn mean(&self) -> f64 {
        self.lambda
    }

    fn variance(&self) -> f64 {
        self.lambda
    }
}

// ============================================================================
// Geometric Distribution
// ============================================================================

/// Geometric distribution: failures before the first success, support
/// `0, 1, 2, …`.
#[derive(Debug, Clone, PartialEq)]
pub struct Geometric {
    p: f64,
}

impl Geometric {
    /// # Errors
    /// Returns `Err` unless `0 < p ≤ 1`.
    pub fn new(p: f64) -> Result<Self, StatsError> {
        ensure(p > 0.0 && p <= 1.0, "p", p, "probability must be in (0, 1]")?;
        Ok(Self { p })
    }

    pub fn p(&self) -> f64 {
        self.p
    }
}

impl Distribution for Geometric {
    fn probability(&self, x: f64) -> f64 {
        match lattice_point(x) {
            None => f64::NAN,
            Some(k) if k < 0 => 0.0,
            Some(k) if self.p == 1.0 => {
                if k == 0 {
                    1.0
                } else {
                    0.0
                }
            }
            Some(k) => self.p * (k as f64 * (-self.p).ln_1p()).exp(),
        }
    }

    /// 1 − (1 − p)^(k+1), via `expm1` to keep small tails exact.
    fn cumulative_probability(&self, x: f64) -> f64 {
        match floor_arg(x) {
            Floor::Nan => f64::NAN,
            Floor::Below => 0.0,
            Floor::Above => 1.0,
            Floor::At(k) if k < 0 => 0.0,
            Floor::At(_) if self.p == 1.0 => 1.0,
            Floor::At(k) => -((k as f64 + 1.0) * (-self.p).ln_1p()).exp_m1(),
        }
    }

    fn mean(&self) -> f64 {
        (1.0 - self.p) / self.p
    }

    fn variance(&self) -> f64 {
        (1.0 - self.p) / (self.p * self.p)
    }
}
