//! Probability distributions.
//!
//! Domain-agnostic discrete and continuous distributions exposing the two
//! queries every caller needs: point mass / density and cumulative
//! probability, plus analytical moments.
//!
//! # Supported Distributions
//!
//! | Distribution | Parameters | Support |
//! |---|---|---|
//! | [`DiscreteUniform`] | min, max | {min, …, max} |
//! | [`Binomial`] | n, p | {0, …, n} |
//! | [`Poisson`] | λ | {0, 1, …} |
//! | [`Geometric`] | p | {0, 1, …} (failures before first success) |
//! | [`Normal`] | μ, σ | ℝ |
//! | [`ContinuousUniform`] | min, max | [min, max] |
//! | [`ChiSquare`] | k | [0, ∞) |
//! | [`Exponential`] | mean | [0, ∞) |
//! | [`Gamma`] | shape, scale | [0, ∞) |
//! | [`Laplace`] | μ, b | ℝ |
//! | [`Logistic`] | μ, s | ℝ |
//! | [`Weibull`] | shape, scale | [0, ∞) |
//!
//! # Parameter policy
//!
//! Constructors validate their parameters and return
//! [`StatsError::InvalidParameter`]; a distribution value is therefore always
//! usable and its queries never fail. A NaN argument yields NaN.
//!
//! Discrete distributions are defined on integers only: `probability` of a
//! fractional or non-finite argument is NaN, of an integer outside the
//! support `0.0`. `cumulative_probability` floors its argument.

mod continuous;
mod discrete;

pub use continuous::{
    ChiSquare, ContinuousUniform, Exponential, Gamma, Laplace, Logistic, Normal, Weibull,
};
pub use discrete::{Binomial, DiscreteUniform, Geometric, Poisson};

use crate::error::StatsError;

/// Common query surface of every distribution family.
pub trait Distribution {
    /// Point mass (discrete) or density (continuous) at `x`.
    fn probability(&self, x: f64) -> f64;

    /// P(X ≤ x).
    fn cumulative_probability(&self, x: f64) -> f64;

    fn mean(&self) -> f64;

    fn variance(&self) -> f64;

    fn std_dev(&self) -> f64 {
        self.variance().sqrt()
    }
}

/// Fails with `InvalidParameter` unless `ok`.
pub(crate) fn ensure(
    ok: bool,
    name: &'static str,
    value: f64,
    reason: &'static str,
) -> Result<(), StatsError> {
    if ok {
        Ok(())
    } else {
        Err(StatsError::invalid(name, value, reason))
    }
}
