//! Error types.

use thiserror::Error;

use crate::tables::TableError;

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, StatsError>;

/// Errors raised when building distributions, tables or a context.
///
/// Probability queries themselves never fail: once a distribution exists its
/// parameters are known to be valid.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StatsError {
    /// A distribution or test parameter violates its domain.
    #[error("invalid parameter `{name}` = {value}: {reason}")]
    InvalidParameter {
        name: &'static str,
        value: f64,
        reason: &'static str,
    },

    /// A probability argument lies outside `[0, 1]`.
    #[error("probability {0} outside [0, 1]")]
    InvalidProbability(f64),

    /// Reference table could not be built.
    #[error(transparent)]
    Table(#[from] TableError),

    /// Context configuration was rejected.
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl StatsError {
    pub(crate) fn invalid(name: &'static str, value: f64, reason: &'static str) -> Self {
        StatsError::InvalidParameter {
            name,
            value,
            reason,
        }
    }
}
