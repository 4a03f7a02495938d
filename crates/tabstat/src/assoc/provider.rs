//! Statistical provider trait and result types.

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Outcome of a single hypothesis test.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TestOutcome {
    pub statistic: f64,
    pub p_value: f64,
}

/// One pairwise post-hoc comparison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PairwiseComparison {
    pub group_a: String,
    pub group_b: String,
    pub p_value: f64,
    pub significant: bool,
}

/// Multiple-comparison correction applied to post-hoc p-values.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostHocAdjust {
    #[default]
    Bonferroni,
    Holm,
    None,
}

/// Trait for distributional and test primitives the association engine
/// does not implement itself.
///
/// Implementations must be thread-safe (Send + Sync) so one provider
/// can be shared across engines. Every method may fail; the engine
/// catches failures and degrades to an "unavailable" result instead of
/// propagating.
pub trait StatsProvider: Send + Sync {
    /// Pearson chi-square test of independence over an observed count
    /// matrix. `correct` applies the Yates continuity correction.
    fn chi2_test(&self, observed: &[Vec<f64>], correct: bool) -> Result<TestOutcome>;

    /// One-sample Kolmogorov-Smirnov test against Normal(mean, sd).
    fn ks_test_normal(&self, values: &[f64], mean: f64, sd: f64) -> Result<TestOutcome>;

    /// Bartlett's test for homogeneity of variances.
    fn bartlett_test(&self, groups: &[Vec<f64>]) -> Result<TestOutcome>;

    /// Kruskal-Wallis rank test across groups (tie-corrected).
    fn kruskal_test(&self, groups: &[Vec<f64>]) -> Result<TestOutcome>;

    /// Two-sample t-test, pooled or Welch depending on `equal_variance`.
    fn t_test2(&self, a: &[f64], b: &[f64], equal_variance: bool) -> Result<TestOutcome>;

    /// Tukey HSD pairwise comparisons; returns `((i, j), p_value)` for
    /// each group index pair.
    #[allow(clippy::type_complexity)]
    fn tukey_hsd(&self, groups: &[Vec<f64>]) -> Result<Vec<((usize, usize), f64)>>;

    /// Cumulative distribution function of Normal(mean, sd) at `x`.
    fn normal_cdf(&self, x: f64, mean: f64, sd: f64) -> f64;
}
