//! Waiting time to the first success of a repeated Bernoulli trial.

use statrs::distribution::{DiscreteCDF, NegativeBinomial};
use statrs::StatsError;

/// Negative binomial with one required success. `cdf(k)` counts `k` failures
/// before the first success, i.e. `1 - (1 - p)^(k + 1)`.
#[derive(Debug, Clone)]
pub struct FirstSuccess {
    inner: NegativeBinomial,
}

impl FirstSuccess {
    pub fn new(p: f64) -> Result<Self, StatsError> {
        Ok(Self {
            inner: NegativeBinomial::new(1.0, p)?,
        })
    }

    pub fn cdf(&self, k: u32) -> f64 {
        self.inner.cdf(u64::from(k))
    }

    /// Cumulative probability as a percentage.
    pub fn cdf_pct(&self, k: u32) -> f64 {
        self.cdf(k) * 100.0
    }
}
