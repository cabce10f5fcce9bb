//! Owner of the test-specific distributions.
//!
//! A [`DistributionContext`] is built once, typically at startup, and passed
//! by reference to whatever runs the hypothesis tests. Each distribution's
//! tables are built on first access and never mutated afterwards, so a
//! context can be shared freely across threads.
//!
//! # Examples
//! ```
//! use u_nonparametric::config::ContextConfig;
//! use u_nonparametric::context::DistributionContext;
//!
//! let context = DistributionContext::new(ContextConfig::default()).unwrap();
//! let tails = context.total_number_of_runs().unwrap().tails(5, 5, 2);
//! assert!(tails.left < 0.01);
//! ```

use once_cell::sync::OnceCell;
use tracing::debug;

use crate::config::ContextConfig;
use crate::error::Result;
use crate::nonparametric::{
    CdDistribution, LillieforsDistribution, PageDistribution, RunsUpDownDistribution,
    TotalNumberOfRunsDistribution,
};

#[derive(Debug, Default)]
pub struct DistributionContext {
    config: ContextConfig,
    lilliefors: OnceCell<LillieforsDistribution>,
    page: OnceCell<PageDistribution>,
    total_number_of_runs: OnceCell<TotalNumberOfRunsDistribution>,
    runs_up_down: OnceCell<RunsUpDownDistribution>,
    chakraborti_desu: OnceCell<CdDistribution>,
}

impl DistributionContext {
    /// Validates `config` and, when it asks for preloading, builds every
    /// table up front.
    pub fn new(config: ContextConfig) -> Result<Self> {
        config.validate()?;
        let context = Self {
            config,
            ..Self::default()
        };
        if context.config.preload {
            context.preload()?;
        }
        Ok(context)
    }

    pub fn config(&self) -> &ContextConfig {
        &self.config
    }

    /// Builds every distribution not built yet.
    pub fn preload(&self) -> Result<()> {
        self.lilliefors()?;
        self.page()?;
        self.total_number_of_runs()?;
        self.runs_up_down()?;
        self.chakraborti_desu()?;
        debug!("distribution context preloaded");
        Ok(())
    }

    pub fn lilliefors(&self) -> Result<&LillieforsDistribution> {
        self.lilliefors.get_or_try_init(LillieforsDistribution::new)
    }

    pub fn page(&self) -> Result<&PageDistribution> {
        self.page.get_or_try_init(PageDistribution::new)
    }

    pub fn total_number_of_runs(&self) -> Result<&TotalNumberOfRunsDistribution> {
        self.total_number_of_runs.get_or_try_init(|| {
            Ok(TotalNumberOfRunsDistribution::new(
                self.config.runs.exact_limit,
                self.config.continuity_correction,
            ))
        })
    }

    pub fn runs_up_down(&self) -> Result<&RunsUpDownDistribution> {
        self.runs_up_down.get_or_try_init(|| {
            Ok(RunsUpDownDistribution::new(
                self.config.runs_up_down.exact_limit,
                self.config.continuity_correction,
            ))
        })
    }

    pub fn chakraborti_desu(&self) -> Result<&CdDistribution> {
        self.chakraborti_desu
            .get_or_try_init(|| Ok(CdDistribution::new(self.config.continuity_correction)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StatsError;

    #[test]
    fn test_lazy_build() {
        let ctx = DistributionContext::default();
        assert!(ctx.lilliefors.get().is_none());
        ctx.lilliefors().unwrap();
        assert!(ctx.lilliefors.get().is_some());
        assert!(ctx.page.get().is_none());
    }

    #[test]
    fn test_preload() {
        let config = ContextConfig {
            preload: true,
            ..ContextConfig::default()
        };
        let ctx = DistributionContext::new(config).unwrap();
        assert!(ctx.page.get().is_some());
        assert!(ctx.runs_up_down.get().is_some());
        assert!(ctx.chakraborti_desu.get().is_some());
    }

    #[test]
    fn test_same_instance_on_repeat_access() {
        let ctx = DistributionContext::default();
        let a = ctx.page().unwrap();
        let b = ctx.page().unwrap();
        assert!(std::ptr::eq(a, b));
    }

    #[test]
    fn test_concurrent_first_access_converges() {
        let ctx = DistributionContext::default();
        let addresses: Vec<usize> = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..8)
                .map(|_| {
                    scope.spawn(|| {
                        ctx.total_number_of_runs().unwrap() as *const TotalNumberOfRunsDistribution
                            as usize
                    })
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });
        assert!(addresses.windows(2).all(|w| w[0] == w[1]));
    }

    #[test]
    fn test_config_flows_into_distributions() {
        let config = ContextConfig::from_toml_str(
            "continuity_correction = false\n[runs]\nexact_limit = 5\n",
        )
        .unwrap();
        let ctx = DistributionContext::new(config).unwrap();
        let runs = ctx.total_number_of_runs().unwrap();
        assert_eq!(runs.limit(), 5);
        assert!(runs.exact_tails(6, 6, 4).is_none());
        assert!(runs.tails(6, 6, 4).is_approximate());
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = ContextConfig::default();
        config.runs_up_down.exact_limit = 1;
        let err = DistributionContext::new(config).unwrap_err();
        assert!(matches!(err, StatsError::Config(_)));
    }
}
