//! Default stats provider backed by statrs distributions.

use statrs::distribution::{ChiSquared, Continuous, ContinuousCDF, Normal, StudentsT};
use statrs::function::gamma::ln_gamma;

use crate::error::{Result, TabstatError};

use super::provider::{StatsProvider, TestOutcome};

/// [`StatsProvider`] computing every test locally from statrs
/// distributions. Stateless.
#[derive(Debug, Clone, Copy, Default)]
pub struct StatrsProvider;

impl StatrsProvider {
    pub fn new() -> Self {
        Self
    }
}

fn provider_err(msg: impl Into<String>) -> TabstatError {
    TabstatError::Provider(msg.into())
}

fn chi_squared_sf(statistic: f64, df: f64) -> Result<f64> {
    let dist = ChiSquared::new(df).map_err(|e| provider_err(e.to_string()))?;
    Ok(1.0 - dist.cdf(statistic))
}

fn sample_variance(values: &[f64]) -> f64 {
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0)
}

/// Midranks over a combined sample; ties share the average rank.
pub(crate) fn midranks(values: &[f64]) -> Vec<f64> {
    let mut order: Vec<usize> = (0..values.len()).collect();
    order.sort_by(|&a, &b| {
        values[a]
            .partial_cmp(&values[b])
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    let mut ranks = vec![0.0; values.len()];
    let mut i = 0;
    while i < order.len() {
        let mut j = i;
        while j + 1 < order.len() && values[order[j + 1]] == values[order[i]] {
            j += 1;
        }
        let avg = (i + j + 2) as f64 / 2.0;
        for &idx in &order[i..=j] {
            ranks[idx] = avg;
        }
        i = j + 1;
    }
    ranks
}

impl StatsProvider for StatrsProvider {
    fn chi2_test(&self, observed: &[Vec<f64>], correct: bool) -> Result<TestOutcome> {
        let rows = observed.len();
        let cols = observed.first().map_or(0, Vec::len);
        if rows < 2 || cols < 2 || observed.iter().any(|r| r.len() != cols) {
            return Err(provider_err("chi-square needs a rectangular table of at least 2x2"));
        }
        let row_sums: Vec<f64> = observed.iter().map(|r| r.iter().sum()).collect();
        let col_sums: Vec<f64> = (0..cols)
            .map(|j| observed.iter().map(|r| r[j]).sum())
            .collect();
        let total: f64 = row_sums.iter().sum();
        if total <= 0.0 {
            return Err(provider_err("chi-square table has no observations"));
        }
        let yates = correct && rows == 2 && cols == 2;
        let mut statistic = 0.0;
        for i in 0..rows {
            for j in 0..cols {
                let expected = row_sums[i] * col_sums[j] / total;
                if expected <= 0.0 {
                    return Err(provider_err("chi-square table has an empty margin"));
                }
                let mut diff = (observed[i][j] - expected).abs();
                if yates {
                    diff = (diff - 0.5).max(0.0);
                }
                statistic += diff * diff / expected;
            }
        }
        let df = (rows - 1) as f64 * (cols - 1) as f64;
        Ok(TestOutcome {
            statistic,
            p_value: chi_squared_sf(statistic, df)?,
        })
    }

    fn ks_test_normal(&self, values: &[f64], mean: f64, sd: f64) -> Result<TestOutcome> {
        if values.is_empty() {
            return Err(provider_err("KS test needs at least one observation"));
        }
        let normal = Normal::new(mean, sd).map_err(|e| provider_err(e.to_string()))?;
        let mut sorted = values.to_vec();
        sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
        let n = sorted.len() as f64;
        let mut statistic: f64 = 0.0;
        for (i, value) in sorted.iter().enumerate() {
            let cdf = normal.cdf(*value);
            let above = (i + 1) as f64 / n - cdf;
            let below = cdf - i as f64 / n;
            statistic = statistic.max(above.max(below));
        }
        // Asymptotic Kolmogorov distribution with the small-sample
        // correction to the effective sample size.
        let lambda = (n.sqrt() + 0.12 + 0.11 / n.sqrt()) * statistic;
        let mut p = 0.0;
        for k in 1..=100 {
            let term = (-2.0 * (k as f64).powi(2) * lambda * lambda).exp();
            p += if k % 2 == 1 { term } else { -term };
        }
        Ok(TestOutcome {
            statistic,
            p_value: (2.0 * p).clamp(0.0, 1.0),
        })
    }

    fn bartlett_test(&self, groups: &[Vec<f64>]) -> Result<TestOutcome> {
        let k = groups.len();
        if k < 2 || groups.iter().any(|g| g.len() < 2) {
            return Err(provider_err(
                "Bartlett test needs at least two groups of two observations",
            ));
        }
        let n_total: f64 = groups.iter().map(|g| g.len() as f64).sum();
        let variances: Vec<f64> = groups.iter().map(|g| sample_variance(g)).collect();
        if variances.iter().any(|v| *v <= 0.0) {
            return Err(provider_err("Bartlett test needs positive variances"));
        }
        let df_total = n_total - k as f64;
        let pooled: f64 = groups
            .iter()
            .zip(&variances)
            .map(|(g, v)| (g.len() as f64 - 1.0) * v)
            .sum::<f64>()
            / df_total;
        let numerator = df_total * pooled.ln()
            - groups
                .iter()
                .zip(&variances)
                .map(|(g, v)| (g.len() as f64 - 1.0) * v.ln())
                .sum::<f64>();
        let correction = 1.0
            + (groups
                .iter()
                .map(|g| 1.0 / (g.len() as f64 - 1.0))
                .sum::<f64>()
                - 1.0 / df_total)
                / (3.0 * (k as f64 - 1.0));
        let statistic = numerator / correction;
        Ok(TestOutcome {
            statistic,
            p_value: chi_squared_sf(statistic, k as f64 - 1.0)?,
        })
    }

    fn kruskal_test(&self, groups: &[Vec<f64>]) -> Result<TestOutcome> {
        let k = groups.len();
        if k < 2 || groups.iter().any(|g| g.is_empty()) {
            return Err(provider_err("Kruskal-Wallis needs at least two non-empty groups"));
        }
        let all: Vec<f64> = groups.iter().flatten().copied().collect();
        let n = all.len() as f64;
        let ranks = midranks(&all);
        let mut statistic = 0.0;
        let mut offset = 0;
        for group in groups {
            let rank_sum: f64 = ranks[offset..offset + group.len()].iter().sum();
            statistic += rank_sum * rank_sum / group.len() as f64;
            offset += group.len();
        }
        statistic = 12.0 / (n * (n + 1.0)) * statistic - 3.0 * (n + 1.0);
        // Tie correction
        let mut sorted = all;
        sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
        let mut tie_term = 0.0;
        let mut i = 0;
        while i < sorted.len() {
            let mut j = i;
            while j + 1 < sorted.len() && sorted[j + 1] == sorted[i] {
                j += 1;
            }
            let t = (j - i + 1) as f64;
            tie_term += t * t * t - t;
            i = j + 1;
        }
        let correction = 1.0 - tie_term / (n * n * n - n);
        if correction > 0.0 {
            statistic /= correction;
        }
        Ok(TestOutcome {
            statistic,
            p_value: chi_squared_sf(statistic, k as f64 - 1.0)?,
        })
    }

    fn t_test2(&self, a: &[f64], b: &[f64], equal_variance: bool) -> Result<TestOutcome> {
        if a.len() < 2 || b.len() < 2 {
            return Err(provider_err("t-test needs at least two observations per group"));
        }
        let (na, nb) = (a.len() as f64, b.len() as f64);
        let (mean_a, mean_b) = (
            a.iter().sum::<f64>() / na,
            b.iter().sum::<f64>() / nb,
        );
        let (var_a, var_b) = (sample_variance(a), sample_variance(b));
        let (statistic, df) = if equal_variance {
            let pooled = ((na - 1.0) * var_a + (nb - 1.0) * var_b) / (na + nb - 2.0);
            let se = (pooled * (1.0 / na + 1.0 / nb)).sqrt();
            ((mean_a - mean_b) / se, na + nb - 2.0)
        } else {
            let se = (var_a / na + var_b / nb).sqrt();
            let df = (var_a / na + var_b / nb).powi(2)
                / ((var_a / na).powi(2) / (na - 1.0) + (var_b / nb).powi(2) / (nb - 1.0));
            ((mean_a - mean_b) / se, df)
        };
        let dist = StudentsT::new(0.0, 1.0, df).map_err(|e| provider_err(e.to_string()))?;
        Ok(TestOutcome {
            statistic,
            p_value: 2.0 * (1.0 - dist.cdf(statistic.abs())),
        })
    }

    fn tukey_hsd(&self, groups: &[Vec<f64>]) -> Result<Vec<((usize, usize), f64)>> {
        let k = groups.len();
        if k < 2 || groups.iter().any(|g| g.len() < 2) {
            return Err(provider_err(
                "Tukey HSD needs at least two groups of two observations",
            ));
        }
        let n_total: f64 = groups.iter().map(|g| g.len() as f64).sum();
        let df = n_total - k as f64;
        let means: Vec<f64> = groups
            .iter()
            .map(|g| g.iter().sum::<f64>() / g.len() as f64)
            .collect();
        let mse: f64 = groups
            .iter()
            .zip(&means)
            .map(|(g, m)| g.iter().map(|v| (v - m).powi(2)).sum::<f64>())
            .sum::<f64>()
            / df;
        if mse <= 0.0 {
            return Err(provider_err("Tukey HSD needs within-group variance"));
        }
        let mut comparisons = Vec::new();
        for i in 0..k - 1 {
            for j in i + 1..k {
                let se = (mse / 2.0 * (1.0 / groups[i].len() as f64 + 1.0 / groups[j].len() as f64))
                    .sqrt();
                let q = (means[i] - means[j]).abs() / se;
                let p = (1.0 - ptukey_cdf(q, k as f64, df)?).clamp(0.0, 1.0);
                comparisons.push(((i, j), p));
            }
        }
        Ok(comparisons)
    }

    fn normal_cdf(&self, x: f64, mean: f64, sd: f64) -> f64 {
        match Normal::new(mean, sd) {
            Ok(dist) => dist.cdf(x),
            Err(_) => f64::NAN,
        }
    }
}

/// CDF of the studentized range distribution, evaluated by numerical
/// integration: the inner integral is the conditional probability given
/// a scale factor s, the outer integral averages over the chi-derived
/// density of s for `df` error degrees of freedom.
fn ptukey_cdf(q: f64, k: f64, df: f64) -> Result<f64> {
    if q <= 0.0 {
        return Ok(0.0);
    }
    let normal = Normal::new(0.0, 1.0).map_err(|e| provider_err(e.to_string()))?;
    let inner = |range: f64| -> f64 {
        let lo = -8.0;
        let hi = 8.0 + range;
        let f = |z: f64| normal.pdf(z) * (normal.cdf(z) - normal.cdf(z - range)).powf(k - 1.0);
        k * simpson(f, lo, hi, 512)
    };
    if df > 200.0 {
        return Ok(inner(q).clamp(0.0, 1.0));
    }
    // Density of s where df * s^2 ~ chi-squared(df).
    let ln_norm =
        (df / 2.0) * df.ln() - ln_gamma(df / 2.0) - (df / 2.0 - 1.0) * std::f64::consts::LN_2;
    let density = |s: f64| (ln_norm + (df - 1.0) * s.ln() - df * s * s / 2.0).exp();
    let f = |s: f64| density(s) * inner(q * s);
    Ok(simpson(f, 1e-4, 4.0, 128).clamp(0.0, 1.0))
}

fn simpson(f: impl Fn(f64) -> f64, lo: f64, hi: f64, steps: usize) -> f64 {
    let h = (hi - lo) / steps as f64;
    let mut sum = f(lo) + f(hi);
    for i in 1..steps {
        let weight = if i % 2 == 1 { 4.0 } else { 2.0 };
        sum += weight * f(lo + i as f64 * h);
    }
    sum * h / 3.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chi2_known_table() {
        // 2x2 with strong association
        let observed = vec![vec![30.0, 10.0], vec![10.0, 30.0]];
        let result = StatrsProvider.chi2_test(&observed, false).unwrap();
        assert!((result.statistic - 20.0).abs() < 1e-9);
        assert!(result.p_value < 0.001);
    }

    #[test]
    fn test_chi2_rejects_degenerate() {
        assert!(StatrsProvider.chi2_test(&[vec![1.0, 2.0]], false).is_err());
    }

    #[test]
    fn test_t_test_identical_groups() {
        let a = vec![1.0, 2.0, 3.0, 4.0, 5.0];
        let result = StatrsProvider.t_test2(&a, &a, true).unwrap();
        assert!(result.statistic.abs() < 1e-12);
        assert!((result.p_value - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_t_test_separated_groups() {
        let a = vec![1.0, 2.0, 3.0, 2.0, 1.5];
        let b = vec![10.0, 11.0, 12.0, 11.5, 10.5];
        let pooled = StatrsProvider.t_test2(&a, &b, true).unwrap();
        assert!(pooled.p_value < 0.001);
        let welch = StatrsProvider.t_test2(&a, &b, false).unwrap();
        assert!(welch.p_value < 0.001);
    }

    #[test]
    fn test_kruskal_separated_groups() {
        let groups = vec![
            vec![1.0, 2.0, 3.0, 4.0],
            vec![10.0, 11.0, 12.0, 13.0],
            vec![20.0, 21.0, 22.0, 23.0],
        ];
        let result = StatrsProvider.kruskal_test(&groups).unwrap();
        assert!(result.p_value < 0.01);
    }

    #[test]
    fn test_kruskal_similar_groups() {
        let groups = vec![
            vec![1.0, 5.0, 3.0, 4.0, 2.0],
            vec![2.0, 4.0, 3.0, 5.0, 1.0],
        ];
        let result = StatrsProvider.kruskal_test(&groups).unwrap();
        assert!(result.p_value > 0.5);
    }

    #[test]
    fn test_bartlett_equal_variances() {
        let groups = vec![
            vec![1.0, 2.0, 3.0, 4.0, 5.0],
            vec![11.0, 12.0, 13.0, 14.0, 15.0],
        ];
        let result = StatrsProvider.bartlett_test(&groups).unwrap();
        assert!(result.statistic.abs() < 1e-9);
        assert!(result.p_value > 0.99);
    }

    #[test]
    fn test_ks_accepts_plausible_normal_sample() {
        let values: Vec<f64> = vec![-1.2, -0.8, -0.3, -0.1, 0.0, 0.2, 0.4, 0.7, 1.1, 1.3];
        let result = StatrsProvider.ks_test_normal(&values, 0.0, 1.0).unwrap();
        assert!(result.p_value > 0.05);
    }

    #[test]
    fn test_midranks_ties() {
        let ranks = midranks(&[1.0, 2.0, 2.0, 3.0]);
        assert_eq!(ranks, vec![1.0, 2.5, 2.5, 4.0]);
    }

    #[test]
    fn test_normal_cdf() {
        let p = StatrsProvider.normal_cdf(0.0, 0.0, 1.0);
        assert!((p - 0.5).abs() < 1e-12);
        assert!(StatrsProvider.normal_cdf(1.0, 0.0, 0.0).is_nan());
    }

    #[test]
    fn test_tukey_separated_groups() {
        let groups = vec![
            vec![1.0, 2.0, 1.5, 2.5],
            vec![1.2, 2.2, 1.7, 2.7],
            vec![20.0, 21.0, 20.5, 21.5],
        ];
        let comparisons = StatrsProvider.tukey_hsd(&groups).unwrap();
        assert_eq!(comparisons.len(), 3);
        let far = comparisons.iter().find(|((i, j), _)| *i == 0 && *j == 2).unwrap();
        assert!(far.1 < 0.01);
        let near = comparisons.iter().find(|((i, j), _)| *i == 0 && *j == 1).unwrap();
        assert!(near.1 > 0.5);
    }
}
