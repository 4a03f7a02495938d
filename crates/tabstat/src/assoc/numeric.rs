//! Numeric descriptive summaries and the rank-based helpers used by the
//! numeric-by-group comparison.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::format::format_number;
use crate::locale::{Language, MessageKey};

use super::provider::{PairwiseComparison, PostHocAdjust, StatsProvider};
use super::statrs_provider::midranks;

/// Cell text used when a statistic cannot be computed.
pub(crate) const MISSING_CELL: &str = "–";

/// Descriptive statistics requested for a numeric summary row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatOption {
    Min,
    Max,
    Range,
    MeanSd,
    MedianIqr,
    Mode,
    N,
}

impl StatOption {
    pub(crate) fn label_key(&self) -> MessageKey {
        match self {
            StatOption::Min => MessageKey::StatMin,
            StatOption::Max => MessageKey::StatMax,
            StatOption::Range => MessageKey::StatRange,
            StatOption::MeanSd => MessageKey::StatMeanSd,
            StatOption::MedianIqr => MessageKey::StatMedianIqr,
            StatOption::Mode => MessageKey::StatMode,
            StatOption::N => MessageKey::StatN,
        }
    }
}

/// Descriptive statistics of one numeric sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NumericStats {
    pub n: usize,
    pub mean: f64,
    /// Population standard deviation; NaN for a single observation.
    pub sd: f64,
    pub median: f64,
    pub q1: f64,
    pub q3: f64,
    pub iqr: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<f64>,
    pub min: f64,
    pub max: f64,
}

/// Compute descriptive statistics; `None` for an empty sample.
pub fn numeric_stats(values: &[f64]) -> Option<NumericStats> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let n = sorted.len();
    let mean = sorted.iter().sum::<f64>() / n as f64;
    let sd = if n > 1 {
        (sorted.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n as f64).sqrt()
    } else {
        f64::NAN
    };
    let q1 = quantile_sorted(&sorted, 0.25);
    let q3 = quantile_sorted(&sorted, 0.75);
    Some(NumericStats {
        n,
        mean,
        sd,
        median: quantile_sorted(&sorted, 0.5),
        q1,
        q3,
        iqr: q3 - q1,
        mode: mode_sorted(&sorted),
        min: sorted[0],
        max: sorted[n - 1],
    })
}

/// Quantile of a sorted sample: the midpoint of the two neighbouring
/// order statistics when `n * p` lands on an integer, the element at
/// the floored index otherwise.
fn quantile_sorted(sorted: &[f64], p: f64) -> f64 {
    let idx = sorted.len() as f64 * p;
    if idx.fract() == 0.0 && idx >= 1.0 && (idx as usize) < sorted.len() {
        (sorted[idx as usize - 1] + sorted[idx as usize]) / 2.0
    } else {
        sorted[(idx.floor() as usize).min(sorted.len() - 1)]
    }
}

/// Most frequent value of a sorted sample; first mode wins ties.
fn mode_sorted(sorted: &[f64]) -> Option<f64> {
    let mut best: Option<(f64, usize)> = None;
    let mut i = 0;
    while i < sorted.len() {
        let mut j = i;
        while j + 1 < sorted.len() && sorted[j + 1] == sorted[i] {
            j += 1;
        }
        let run = j - i + 1;
        if best.is_none_or(|(_, count)| run > count) {
            best = Some((sorted[i], run));
        }
        i = j + 1;
    }
    best.map(|(value, _)| value)
}

/// Render one descriptive statistic as display text.
pub(crate) fn format_stat(stat: StatOption, stats: &NumericStats, lang: Language) -> String {
    let fmt = |v: f64| format_number(v, 1, lang);
    match stat {
        StatOption::Min => fmt(stats.min),
        StatOption::Max => fmt(stats.max),
        StatOption::Range => fmt(stats.max - stats.min),
        StatOption::MeanSd => {
            if stats.mean.is_nan() || stats.sd.is_nan() {
                MISSING_CELL.to_string()
            } else {
                format!("{} ({})", fmt(stats.mean), fmt(stats.sd))
            }
        }
        StatOption::MedianIqr => {
            if stats.median.is_nan() || stats.iqr.is_nan() {
                MISSING_CELL.to_string()
            } else {
                format!("{} ({})", fmt(stats.median), fmt(stats.iqr))
            }
        }
        StatOption::Mode => stats
            .mode
            .map_or_else(|| MISSING_CELL.to_string(), |m| m.to_string()),
        StatOption::N => stats.n.to_string(),
    }
}

/// Flatten grouped values into aligned `(value, group)` vectors.
pub fn stack_groups(groups: &IndexMap<String, Vec<f64>>) -> (Vec<f64>, Vec<String>) {
    let mut x = Vec::new();
    let mut y = Vec::new();
    for (group, values) in groups {
        for value in values {
            x.push(*value);
            y.push(group.clone());
        }
    }
    (x, y)
}

/// Result of a rank-sum test; `p_value` is `None` when the test could
/// not run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankTest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub p_value: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub statistic: Option<f64>,
}

/// Two-sided Mann-Whitney U via the normal approximation with midranks
/// for ties and an optional continuity correction.
pub fn mann_whitney(
    provider: &dyn StatsProvider,
    x: &[f64],
    y: &[f64],
    correct: bool,
) -> RankTest {
    if x.is_empty() || y.is_empty() {
        return RankTest {
            p_value: None,
            statistic: None,
        };
    }
    let nx = x.len() as f64;
    let ny = y.len() as f64;
    let combined: Vec<f64> = x.iter().chain(y).copied().collect();
    let ranks = midranks(&combined);
    let rank_sum_x: f64 = ranks[..x.len()].iter().sum();
    let u = rank_sum_x - nx * (nx + 1.0) / 2.0;
    let mu = nx * ny / 2.0;
    let sigma = (nx * ny * (nx + ny + 1.0) / 12.0).sqrt();
    if sigma == 0.0 {
        return RankTest {
            p_value: None,
            statistic: Some(u),
        };
    }
    let z = if correct {
        ((u - mu).abs() - 0.5) / sigma
    } else {
        (u - mu) / sigma
    };
    let p = 2.0 * (1.0 - provider.normal_cdf(z.abs(), 0.0, 1.0));
    RankTest {
        p_value: Some(p.clamp(0.0, 1.0)),
        statistic: Some(u),
    }
}

/// Dunn's post-hoc comparisons after a significant Kruskal-Wallis test.
///
/// All values are ranked jointly (midranks for ties); per-pair z uses
/// the mean-rank difference over `sqrt(N(N+1)/12 * (1/n_i + 1/n_j))`.
/// P-values are adjusted across all pairs by the requested method; the
/// Holm step-down enforces monotonicity from smallest to largest raw p.
pub fn dunn_test(
    provider: &dyn StatsProvider,
    groups: &IndexMap<String, Vec<f64>>,
    alpha: f64,
    adjust: PostHocAdjust,
) -> Vec<PairwiseComparison> {
    let names: Vec<&String> = groups.keys().collect();
    let k = names.len();
    if k < 2 {
        return Vec::new();
    }
    let all: Vec<f64> = groups.values().flatten().copied().collect();
    let n_total = all.len() as f64;
    let ranks = midranks(&all);

    let mut mean_ranks: Vec<(f64, f64)> = Vec::with_capacity(k);
    let mut offset = 0;
    for values in groups.values() {
        let n = values.len();
        let sum: f64 = ranks[offset..offset + n].iter().sum();
        mean_ranks.push((sum / n as f64, n as f64));
        offset += n;
    }

    let mut raw: Vec<(usize, usize, f64)> = Vec::new();
    for i in 0..k - 1 {
        for j in i + 1..k {
            let (mean_i, ni) = mean_ranks[i];
            let (mean_j, nj) = mean_ranks[j];
            let se = ((n_total * (n_total + 1.0) / 12.0) * (1.0 / ni + 1.0 / nj)).sqrt();
            let z = (mean_i - mean_j) / se;
            let p = 2.0 * (1.0 - provider.normal_cdf(z.abs(), 0.0, 1.0));
            raw.push((i, j, p.clamp(0.0, 1.0)));
        }
    }

    let m = raw.len() as f64;
    let comparison = |i: usize, j: usize, p: f64, significant: bool| PairwiseComparison {
        group_a: names[i].clone(),
        group_b: names[j].clone(),
        p_value: (p * 10_000.0).round() / 10_000.0,
        significant,
    };
    match adjust {
        PostHocAdjust::Bonferroni => raw
            .into_iter()
            .map(|(i, j, p)| comparison(i, j, (p * m).min(1.0), p * m < alpha))
            .collect(),
        PostHocAdjust::Holm => {
            let mut sorted = raw;
            sorted.sort_by(|a, b| a.2.partial_cmp(&b.2).unwrap_or(std::cmp::Ordering::Equal));
            let adjusted: Vec<f64> = sorted
                .iter()
                .enumerate()
                .map(|(rank, (_, _, p))| ((m - rank as f64) * p).min(1.0))
                .collect();
            // Step-down: the running maximum enforces monotonicity from
            // the smallest raw p to the largest
            let mut running = 0.0f64;
            sorted
                .into_iter()
                .zip(adjusted)
                .map(|((i, j, _), adj)| {
                    running = running.max(adj);
                    comparison(i, j, running, running < alpha)
                })
                .collect()
        }
        PostHocAdjust::None => raw
            .into_iter()
            .map(|(i, j, p)| comparison(i, j, p, p < alpha))
            .collect(),
    }
}

/// Tukey HSD pairwise comparisons, delegated to the provider. Returns
/// an empty list when the provider cannot run it.
pub fn tukey_hsd(
    provider: &dyn StatsProvider,
    groups: &IndexMap<String, Vec<f64>>,
    alpha: f64,
) -> Vec<PairwiseComparison> {
    let names: Vec<&String> = groups.keys().collect();
    let arrays: Vec<Vec<f64>> = groups.values().cloned().collect();
    match provider.tukey_hsd(&arrays) {
        Ok(pairs) => pairs
            .into_iter()
            .filter(|((i, j), _)| *i < names.len() && *j < names.len())
            .map(|((i, j), p)| PairwiseComparison {
                group_a: names[i].clone(),
                group_b: names[j].clone(),
                p_value: (p * 10_000.0).round() / 10_000.0,
                significant: p < alpha,
            })
            .collect(),
        Err(_) => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assoc::StatrsProvider;

    fn group_map(pairs: &[(&str, &[f64])]) -> IndexMap<String, Vec<f64>> {
        pairs
            .iter()
            .map(|(name, values)| (name.to_string(), values.to_vec()))
            .collect()
    }

    #[test]
    fn test_numeric_stats_basic() {
        let stats = numeric_stats(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]).unwrap();
        assert_eq!(stats.n, 8);
        assert!((stats.mean - 5.0).abs() < 1e-12);
        assert!((stats.sd - 2.0).abs() < 1e-12);
        assert!((stats.median - 4.5).abs() < 1e-12);
        assert_eq!(stats.mode, Some(4.0));
        assert_eq!(stats.min, 2.0);
        assert_eq!(stats.max, 9.0);
    }

    #[test]
    fn test_numeric_stats_empty_and_single() {
        assert!(numeric_stats(&[]).is_none());
        let single = numeric_stats(&[3.0]).unwrap();
        assert_eq!(single.n, 1);
        assert!(single.sd.is_nan());
        assert_eq!(single.median, 3.0);
    }

    #[test]
    fn test_mann_whitney_midranks() {
        // x = [1, 2, 2], y = [2, 3]: ranks 1, 3, 3, 3, 5
        // R_x = 7, U = 7 - 6 = 1
        let provider = StatrsProvider;
        let result = mann_whitney(&provider, &[1.0, 2.0, 2.0], &[2.0, 3.0], false);
        assert_eq!(result.statistic, Some(1.0));
        assert!(result.p_value.unwrap() > 0.05);
    }

    #[test]
    fn test_mann_whitney_empty_group() {
        let provider = StatrsProvider;
        let result = mann_whitney(&provider, &[], &[1.0], false);
        assert_eq!(result.p_value, None);
    }

    #[test]
    fn test_dunn_bonferroni_caps_at_one() {
        let provider = StatrsProvider;
        let groups = group_map(&[
            ("a", &[1.0, 2.0, 3.0][..]),
            ("b", &[2.0, 3.0, 4.0][..]),
            ("c", &[1.5, 2.5, 3.5][..]),
        ]);
        let comparisons = dunn_test(&provider, &groups, 0.05, PostHocAdjust::Bonferroni);
        assert_eq!(comparisons.len(), 3);
        for comp in &comparisons {
            assert!(comp.p_value <= 1.0);
            assert!(!comp.significant);
        }
    }

    #[test]
    fn test_dunn_holm_monotone_and_above_raw() {
        let provider = StatrsProvider;
        let groups = group_map(&[
            ("low", &[1.0, 2.0, 3.0, 2.5, 1.5][..]),
            ("mid", &[4.0, 5.0, 6.0, 5.5, 4.5][..]),
            ("high", &[20.0, 21.0, 22.0, 21.5, 20.5][..]),
        ]);
        let holm = dunn_test(&provider, &groups, 0.05, PostHocAdjust::Holm);
        let raw = dunn_test(&provider, &groups, 0.05, PostHocAdjust::None);
        // Holm output is ordered by raw p; adjusted values never decrease
        for window in holm.windows(2) {
            assert!(window[0].p_value <= window[1].p_value);
        }
        for comp in &holm {
            let unadjusted = raw
                .iter()
                .find(|r| r.group_a == comp.group_a && r.group_b == comp.group_b)
                .unwrap();
            assert!(comp.p_value >= unadjusted.p_value);
        }
    }

    #[test]
    fn test_stack_groups_alignment() {
        let groups = group_map(&[("a", &[1.0, 2.0][..]), ("b", &[3.0][..])]);
        let (x, y) = stack_groups(&groups);
        assert_eq!(x, vec![1.0, 2.0, 3.0]);
        assert_eq!(y, vec!["a", "a", "b"]);
    }

    #[test]
    fn test_tukey_passthrough() {
        let provider = StatrsProvider;
        let groups = group_map(&[
            ("a", &[1.0, 2.0, 1.5, 2.5][..]),
            ("b", &[20.0, 21.0, 20.5, 21.5][..]),
        ]);
        let comparisons = tukey_hsd(&provider, &groups, 0.05);
        assert_eq!(comparisons.len(), 1);
        assert_eq!(comparisons[0].group_a, "a");
        assert!(comparisons[0].significant);
    }
}
