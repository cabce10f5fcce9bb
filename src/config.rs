//! Context configuration.
//!
//! Parsed from TOML text; the crate itself never touches the filesystem.
//!
//! ```toml
//! preload = false
//! continuity_correction = true
//!
//! [runs]
//! exact_limit = 20
//!
//! [runs_up_down]
//! exact_limit = 25
//! ```

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{Result, StatsError};

/// Settings of a [`DistributionContext`](crate::context::DistributionContext).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContextConfig {
    /// Build every table when the context is created.
    pub preload: bool,

    /// Apply the ±0.5 continuity correction in the normal approximations of
    /// the discrete run and exceedance statistics.
    pub continuity_correction: bool,

    /// Total number of runs.
    pub runs: RunsConfig,

    /// Runs up and down.
    pub runs_up_down: RunsUpDownConfig,
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            preload: false,
            continuity_correction: true,
            runs: RunsConfig::default(),
            runs_up_down: RunsUpDownConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunsConfig {
    /// Largest group size with tabulated exact tails.
    pub exact_limit: usize,
}

impl RunsConfig {
    pub const MAX_EXACT_LIMIT: usize = 50;
}

impl Default for RunsConfig {
    fn default() -> Self {
        Self { exact_limit: 20 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunsUpDownConfig {
    /// Longest sequence with tabulated exact tails.
    pub exact_limit: usize,
}

impl RunsUpDownConfig {
    pub const MIN_EXACT_LIMIT: usize = 3;
    pub const MAX_EXACT_LIMIT: usize = 200;
}

impl Default for RunsUpDownConfig {
    fn default() -> Self {
        Self { exact_limit: 25 }
    }
}

impl ContextConfig {
    /// Parses and validates a TOML document. Missing keys take their
    /// defaults.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: ContextConfig =
            toml::from_str(text).map_err(|e| StatsError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| StatsError::Config(e.to_string()))
    }

    /// Checks that the exact limits lie in their supported ranges.
    pub fn validate(&self) -> Result<()> {
        let runs = self.runs.exact_limit;
        if !(1..=RunsConfig::MAX_EXACT_LIMIT).contains(&runs) {
            warn!(exact_limit = runs, "runs exact limit out of range");
            return Err(StatsError::Config(format!(
                "runs.exact_limit must be in 1..={}, got {runs}",
                RunsConfig::MAX_EXACT_LIMIT
            )));
        }

        let up_down = self.runs_up_down.exact_limit;
        if !(RunsUpDownConfig::MIN_EXACT_LIMIT..=RunsUpDownConfig::MAX_EXACT_LIMIT)
            .contains(&up_down)
        {
            warn!(exact_limit = up_down, "runs up and down exact limit out of range");
            return Err(StatsError::Config(format!(
                "runs_up_down.exact_limit must be in {}..={}, got {up_down}",
                RunsUpDownConfig::MIN_EXACT_LIMIT,
                RunsUpDownConfig::MAX_EXACT_LIMIT
            )));
        }
        Ok(())
    }
}
