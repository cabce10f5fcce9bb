//! Continuous distributions.

use super::{ensure, Distribution};
use crate::error::StatsError;
use crate::special;

fn ensure_finite(name: &'static str, value: f64) -> Result<(), StatsError> {
    ensure(value.is_finite(), name, value, "must be finite")
}

fn ensure_positive(name: &'static str, value: f64) -> Result<(), StatsError> {
    ensure(
        value.is_finite() && value > 0.0,
        name,
        value,
        "must be finite and positive",
    )
}

fn is_probability(p: f64) -> bool {
    (0.0..=1.0).contains(&p)
}

// ============================================================================
// Normal Distribution
// ============================================================================

/// Normal (Gaussian) distribution N(μ, σ²).
///
/// # Mathematical Definition
/// - PDF: f(x) = (1/(σ√(2π))) exp(−(x−μ)²/(2σ²))
/// - CDF: Φ((x−μ)/σ), evaluated through erfc
/// - Mean: μ, Variance: σ²
///
/// # Examples
/// ```
/// use u_nonparametric::distributions::{Distribution, Normal};
/// let n = Normal::new(10.0, 2.0).unwrap();
/// assert!((n.cumulative_probability(10.0) - 0.5).abs() < 1e-12);
/// let z = Normal::inverse_normal_distribution(0.975).unwrap();
/// assert!((z - 1.959964).abs() < 1e-6);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Normal {
    mean: f64,
    std_dev: f64,
}

impl Normal {
    /// # Errors
    /// Returns `Err` if `std_dev ≤ 0` or either parameter is not finite.
    pub fn new(mean: f64, std_dev: f64) -> Result<Self, StatsError> {
        ensure_finite("mean", mean)?;
        ensure_positive("std_dev", std_dev)?;
        Ok(Self { mean, std_dev })
    }

    /// N(0, 1).
    pub fn standard() -> Self {
        Self {
            mean: 0.0,
            std_dev: 1.0,
        }
    }

    /// Standardized score (x − μ)/σ.
    pub fn z_score(&self, x: f64) -> f64 {
        (x - self.mean) / self.std_dev
    }

    /// Area under the standard normal curve to the left (`lower_tail`) or
    /// right of the standardized `x`.
    pub fn tipified_probability(&self, x: f64, lower_tail: bool) -> f64 {
        let z = self.z_score(x);
        if lower_tail {
            special::standard_normal_cdf(z)
        } else {
            special::standard_normal_upper(z)
        }
    }

    /// P(X > x), without the cancellation of `1 − cdf`.
    pub fn upper_tail(&self, x: f64) -> f64 {
        self.tipified_probability(x, false)
    }

    /// Standard normal quantile Φ⁻¹(p).
    ///
    /// # Errors
    /// `InvalidProbability` if `p` is outside `[0, 1]` or NaN.
    pub fn inverse_normal_distribution(p: f64) -> Result<f64, StatsError> {
        if !is_probability(p) {
            return Err(StatsError::InvalidProbability(p));
        }
        Ok(special::inverse_normal_cdf(p))
    }

    /// Quantile of this distribution, μ + σ Φ⁻¹(p).
    pub fn quantile(&self, p: f64) -> Option<f64> {
        is_probability(p).then(|| self.mean + self.std_dev * special::inverse_normal_cdf(p))
    }
}

impl Distribution for Normal {
    fn probability(&self, x: f64) -> f64 {
        special::standard_normal_pdf(self.z_score(x)) / self.std_dev
    }

    fn cumulative_probability(&self, x: f64) -> f64 {
        self.tipified_probability(x, true)
    }

    fn mean(&self) -> f64 {
        self.mean
    }

    fn variance(&self) -> f64 {
        self.std_dev * self.std_dev
    }

    fn std_dev(&self) -> f64 {
        self.std_dev
    }
}

// ============================================================================
// Continuous Uniform Distribution
// ============================================================================

/// Continuous uniform distribution on `[min, max]`.
#[derive(Debug, Clone, PartialEq)]
pub struct ContinuousUniform {
    min: f64,
    max: f64,
}

impl ContinuousUniform {
    /// # Errors
    /// Returns `Err` if `min >= max` or either parameter is not finite.
    pub fn new(min: f64, max: f64) -> Result<Self, StatsError> {
        ensure_finite("min", min)?;
        ensure_finite("max", max)?;
        ensure(min < max, "max", max, "must exceed min")?;
        Ok(Self { min, max })
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }

    /// min + p·(max − min).
    pub fn quantile(&self, p: f64) -> Option<f64> {
        is_probability(p).then(|| self.min + p * (self.max - self.min))
    }
}

impl Distribution for ContinuousUniform {
    fn probability(&self, x: f64) -> f64 {
        if x.is_nan() {
            f64::NAN
        } else if x >= self.min && x <= self.max {
            1.0 / (self.max - self.min)
        } else {
            0.0
        }
    }

    fn cumulative_probability(&self, x: f64) -> f64 {
        if x.is_nan() {
            f64::NAN
        } else if x <= self.min {
            0.0
        } else if x >= self.max {
            1.0
        } else {
            (x - self.min) / (self.max - self.min)
        }
    }

    fn mean(&self) -> f64 {
        (self.min + self.max) / 2.0
    }

    fn variance(&self) -> f64 {
        let range = self.max - self.min;
        range * range / 12.0
    }
}

// ============================================================================
// Gamma Family
// ============================================================================

/// Gamma distribution with shape `k` and scale `θ`.
///
/// # Mathematical Definition
/// - PDF: f(x) = x^(k−1) e^(−x/θ) / (Γ(k) θ^k), x ≥ 0
/// - CDF: P(k, x/θ), the regularized lower incomplete gamma
/// - Mean: kθ, Variance: kθ²
#[derive(Debug, Clone, PartialEq)]
pub struct Gamma {
    shape: f64,
    scale: f64,
}

impl Gamma {
    /// # Errors
    /// Returns `Err` unless both parameters are finite and positive.
    pub fn new(shape: f64, scale: f64) -> Result<Self, StatsError> {
        ensure_positive("shape", shape)?;
        ensure_positive("scale", scale)?;
        Ok(Self { shape, scale })
    }

    pub fn shape(&self) -> f64 {
        self.shape
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }
}

impl Distribution for Gamma {
    fn probability(&self, x: f64) -> f64 {
        if x.is_nan() {
            return f64::NAN;
        }
        if x < 0.0 || x == f64::INFINITY {
            return 0.0;
        }
        if x == 0.0 {
            // Density at the origin depends only on the shape.
            return if self.shape < 1.0 {
                f64::INFINITY
            } else if self.shape == 1.0 {
                1.0 / self.scale
            } else {
                0.0
            };
        }
        let ln_pdf = (self.shape - 1.0) * x.ln()
            - x / self.scale
            - special::ln_gamma(self.shape)
            - self.shape * self.scale.ln();
        ln_pdf.exp()
    }

    fn cumulative_probability(&self, x: f64) -> f64 {
        special::regularized_lower_gamma(self.shape, x / self.scale)
    }

    fn mean(&self) -> f64 {
        self.shape * self.scale
    }

    fn variance(&self) -> f64 {
        self.shape * self.scale * self.scale
    }
}

/// Chi-square distribution with `k` degrees of freedom, Gamma(k/2, 2).
///
/// # Examples
/// ```
/// use u_nonparametric::distributions::{ChiSquare, Distribution};
/// let chi = ChiSquare::new(2.0).unwrap();
/// assert!((chi.cumulative_probability(5.991) - 0.95).abs() < 1e-3);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ChiSquare {
    degrees_of_freedom: f64,
    gamma: Gamma,
}

impl ChiSquare {
    /// # Errors
    /// Returns `Err` unless `k` is finite and positive; zero degrees of
    /// freedom is rejected.
    pub fn new(degrees_of_freedom: f64) -> Result<Self, StatsError> {
        ensure_positive("degrees_of_freedom", degrees_of_freedom)?;
        Ok(Self {
            degrees_of_freedom,
            gamma: Gamma::new(degrees_of_freedom / 2.0, 2.0)?,
        })
    }

    pub fn degrees_of_freedom(&self) -> f64 {
        self.degrees_of_freedom
    }

    /// P(X > x) = Q(k/2, x/2), kept precise deep in the tail.
    pub fn upper_tail(&self, x: f64) -> f64 {
        special::regularized_upper_gamma(self.degrees_of_freedom / 2.0, x / 2.0)
    }
}

impl Distribution for ChiSquare {
    fn probability(&self, x: f64) -> f64 {
        self.gamma.probability(x)
    }

    fn cumulative_probability(&self, x: f64) -> f64 {
        self.gamma.cumulative_probability(x)
    }

    fn mean(&self) -> f64 {
        self.degrees_of_freedom
    }

    fn variance(&self) -> f64 {
        2.0 * self.degrees_of_freedom
    }
}

// ============================================================================
// Exponential Distribution
// ============================================================================

/// Exponential distribution parameterized by its mean.
///
/// - CDF: F(x) = 1 − exp(−x/mean), x ≥ 0
#[derive(Debug, Clone, PartialEq)]
pub struct Exponential {
    mean: f64,
}

impl Exponential {
    /// # Errors
    /// Returns `Err` unless `mean` is finite and positive.
    pub fn new(mean: f64) -> Result<Self, StatsError> {
        ensure_positive("mean", mean)?;
        Ok(Self { mean })
    }

    pub fn rate(&self) -> f64 {
        1.0 / self.mean
    }

    /// −mean · ln(1 − p).
    pub fn quantile(&self, p: f64) -> Option<f64> {
        is_probability(p).then(|| -self.mean * (-p).ln_1p())
    }
}

impl Distribution for Exponential {
    fn probability(&self, x: f64) -> f64 {
        if x.is_nan() {
            f64::NAN
        } else if x < 0.0 {
            0.0
        } else {
            (-x / self.mean).exp() / self.mean
        }
    }

    fn cumulative_probability(&self, x: f64) -> f64 {
        if x.is_nan() {
            f64::NAN
        } else if x <= 0.0 {
            0.0
        } else {
            -(-x / self.mean).exp_m1()
        }
    }

    fn mean(&self) -> f64 {
        self.mean
    }

    fn variance(&self) -> f64 {
        self.mean * self.mean
    }
}

// ============================================================================
// Laplace Distribution
// ============================================================================

/// Laplace (double exponential) distribution with location μ and scale b.
#[derive(Debug, Clone, PartialEq)]
pub struct Laplace {
    location: f64,
    scale: f64,
}

impl Laplace {
    /// # Errors
    /// Returns `Err` if `scale ≤ 0` or either parameter is not finite.
    pub fn new(location: f64, scale: f64) -> Result<Self, StatsError> {
        ensure_finite("location", location)?;
        ensure_positive("scale", scale)?;
        Ok(Self { location, scale })
    }

    pub fn quantile(&self, p: f64) -> Option<f64> {
        if !is_probability(p) {
            return None;
        }
        let x = if p < 0.5 {
            self.location + self.scale * (2.0 * p).ln()
        } else {
            self.location - self.scale * (2.0 - 2.0 * p).ln()
        };
        Some(x)
    }
}

impl Distribution for Laplace {
    fn probability(&self, x: f64) -> f64 {
        (-(x - self.location).abs() / self.scale).exp() / (2.0 * self.scale)
    }

    fn cumulative_probability(&self, x: f64) -> f64 {
        let z = (x - self.location) / self.scale;
        if z.is_nan() {
            f64::NAN
        } else if z < 0.0 {
            0.5 * z.exp()
        } else {
            1.0 - 0.5 * (-z).exp()
        }
    }

    fn mean(&self) -> f64 {
        self.location
    }

    fn variance(&self) -> f64 {
        2.0 * self.scale * self.scale
    }
}

// ============================================================================
// Logistic Distribution
// ============================================================================

/// Logistic distribution with location μ and scale s.
#[derive(Debug, Clone, PartialEq)]
pub struct Logistic {
    location: f64,
    scale: f64,
}

impl Logistic {
    /// # Errors
    /// Returns `Err` if `scale ≤ 0` or either parameter is not finite.
    pub fn new(location: f64, scale: f64) -> Result<Self, StatsError> {
        ensure_finite("location", location)?;
        ensure_positive("scale", scale)?;
        Ok(Self { location, scale })
    }

    /// μ + s · ln(p / (1 − p)).
    pub fn quantile(&self, p: f64) -> Option<f64> {
        is_probability(p).then(|| self.location + self.scale * (p / (1.0 - p)).ln())
    }
}

impl Distribution for Logistic {
    fn probability(&self, x: f64) -> f64 {
        let e = (-((x - self.location) / self.scale).abs()).exp();
        e / (self.scale * (1.0 + e) * (1.0 + e))
    }

    fn cumulative_probability(&self, x: f64) -> f64 {
        let z = (x - self.location) / self.scale;
        if z.is_nan() {
            f64::NAN
        } else if z >= 0.0 {
            1.0 / (1.0 + (-z).exp())
        } else {
            let e = z.exp();
            e / (1.0 + e)
        }
    }

    fn mean(&self) -> f64 {
        self.location
    }

    fn variance(&self) -> f64 {
        let s = self.scale * std::f64::consts::PI;
        s * s / 3.0
    }
}

// ============================================================================
// Weibull Distribution
// ============================================================================

/// Weibull distribution with shape k and scale λ.
///
/// - CDF: F(x) = 1 − exp(−(x/λ)^k), x ≥ 0
/// - Mean: λ Γ(1 + 1/k)
#[derive(Debug, Clone, PartialEq)]
pub struct Weibull {
    shape: f64,
    scale: f64,
}

impl Weibull {
    /// # Errors
    /// Returns `Err` unless both parameters are finite and positive.
    pub fn new(shape: f64, scale: f64) -> Result<Self, StatsError> {
        ensure_positive("shape", shape)?;
        ensure_positive("scale", scale)?;
        Ok(Self { shape, scale })
    }

    /// λ · (−ln(1 − p))^(1/k).
    pub fn quantile(&self, p: f64) -> Option<f64> {
        is_probability(p).then(|| self.scale * (-(-p).ln_1p()).powf(1.0 / self.shape))
    }
}

impl Distribution for Weibull {
    fn probability(&self, x: f64) -> f64 {
        if x.is_nan() {
            return f64::NAN;
        }
        if x < 0.0 {
            return 0.0;
        }
        let t = x / self.scale;
        (self.shape / self.scale) * t.powf(self.shape - 1.0) * (-t.powf(self.shape)).exp()
    }

    fn cumulative_probability(&self, x: f64) -> f64 {
        if x.is_nan() {
            f64::NAN
        } else if x <= 0.0 {
            0.0
        } else {
            -(-(x / self.scale).powf(self.shape)).exp_m1()
        }
    }

    fn mean(&self) -> f64 {
        self.scale * special::ln_gamma(1.0 + 1.0 / self.shape).exp()
    }

    fn variance(&self) -> f64 {
        let g1 = special::ln_gamma(1.0 + 1.0 / self.shape).exp();
        let g2 = special::ln_gamma(1.0 + 2.0 / self.shape).exp();
        self.scale * self.scale * (g2 - g1 * g1)
    }
}
