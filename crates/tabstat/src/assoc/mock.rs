//! Mock stats provider for testing.

use crate::error::{Result, TabstatError};

use super::provider::{StatsProvider, TestOutcome};

/// Provider returning a fixed p-value for every test, or failing every
/// call. Lets tests drive the engine's dispatch and degradation paths
/// deterministically.
#[derive(Debug, Clone, Copy)]
pub struct MockProvider {
    p_value: f64,
    fail: bool,
}

impl MockProvider {
    /// Provider answering every test with the given p-value.
    pub fn with_p_value(p_value: f64) -> Self {
        Self {
            p_value,
            fail: false,
        }
    }

    /// Provider failing every call.
    pub fn failing() -> Self {
        Self {
            p_value: f64::NAN,
            fail: true,
        }
    }

    fn outcome(&self) -> Result<TestOutcome> {
        if self.fail {
            return Err(TabstatError::Provider("mock provider failure".to_string()));
        }
        Ok(TestOutcome {
            statistic: 0.0,
            p_value: self.p_value,
        })
    }
}

impl StatsProvider for MockProvider {
    fn chi2_test(&self, _observed: &[Vec<f64>], _correct: bool) -> Result<TestOutcome> {
        self.outcome()
    }

    fn ks_test_normal(&self, _values: &[f64], _mean: f64, _sd: f64) -> Result<TestOutcome> {
        self.outcome()
    }

    fn bartlett_test(&self, _groups: &[Vec<f64>]) -> Result<TestOutcome> {
        self.outcome()
    }

    fn kruskal_test(&self, _groups: &[Vec<f64>]) -> Result<TestOutcome> {
        self.outcome()
    }

    fn t_test2(&self, _a: &[f64], _b: &[f64], _equal_variance: bool) -> Result<TestOutcome> {
        self.outcome()
    }

    fn tukey_hsd(&self, groups: &[Vec<f64>]) -> Result<Vec<((usize, usize), f64)>> {
        if self.fail {
            return Err(TabstatError::Provider("mock provider failure".to_string()));
        }
        let mut pairs = Vec::new();
        for i in 0..groups.len().saturating_sub(1) {
            for j in i + 1..groups.len() {
                pairs.push(((i, j), self.p_value));
            }
        }
        Ok(pairs)
    }

    fn normal_cdf(&self, _x: f64, _mean: f64, _sd: f64) -> f64 {
        if self.fail { f64::NAN } else { 0.5 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assoc::{AssociationEngine, CrosstabOptions};
    use std::sync::Arc;

    fn strs(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_failing_provider_yields_unavailable() {
        let engine = AssociationEngine::new(Arc::new(MockProvider::failing()));
        let pred = strs(&["a", "a", "b", "b", "c", "c"]);
        let resp = strs(&["x", "y", "x", "y", "x", "y"]);
        let result = engine.summarize_q_q(&pred, &resp, &CrosstabOptions::default(), None);
        assert_eq!(result.test_used, "Calculation unavailable");
        assert_eq!(result.p_value, None);
    }

    #[test]
    fn test_fixed_p_value_drives_significance() {
        let engine = AssociationEngine::new(Arc::new(MockProvider::with_p_value(0.7)));
        let pred = strs(&["a", "a", "b", "b", "c", "c"]);
        let resp = strs(&["x", "y", "x", "y", "x", "y"]);
        let result = engine.summarize_q_q(&pred, &resp, &CrosstabOptions::default(), None);
        assert_eq!(result.test_used, "Chi-square");
        assert_eq!(result.p_value, Some(0.7));
        assert!(result.residuals.is_none());
    }
}
