//! Qualitative-by-qualitative association: cross-tabulation, test
//! selection and adjusted-residual annotation.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use statrs::function::gamma::ln_gamma;

use crate::format::format_number;
use crate::locale::Language;

/// Residual threshold for the ~5% two-sided standard normal tail.
pub(crate) const RESIDUAL_CUTOFF: f64 = 1.96;

/// Which margin percentages are computed against.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PercentBy {
    #[default]
    Row,
    Col,
}

/// Options for [`crate::assoc::AssociationEngine::summarize_q_q`].
#[derive(Debug, Clone)]
pub struct CrosstabOptions {
    /// Annotate cells with residual symbols on a significant omnibus test.
    pub with_residuals: bool,
    /// Marker appended to cells observed above expectation.
    pub greater_symbol: String,
    /// Marker appended to cells observed below expectation.
    pub lower_symbol: String,
    pub alpha: f64,
    pub percent_by: PercentBy,
    pub lang: Language,
    /// Explicit row levels; sorted observed levels otherwise.
    pub row_labels: Option<Vec<String>>,
    /// Explicit column levels; sorted observed levels otherwise.
    pub col_labels: Option<Vec<String>>,
}

impl Default for CrosstabOptions {
    fn default() -> Self {
        Self {
            with_residuals: true,
            greater_symbol: "†".to_string(),
            lower_symbol: "*".to_string(),
            alpha: 0.05,
            percent_by: PercentBy::Row,
            lang: Language::default(),
            row_labels: None,
            col_labels: None,
        }
    }
}

/// Inputs handed to a custom cell formatter.
#[derive(Debug, Clone, Copy)]
pub struct CellContext {
    pub count: usize,
    pub percent: f64,
    pub row_total: usize,
    pub col_total: usize,
}

/// Callback rendering one contingency cell.
pub type CellFormatter<'a> = &'a dyn Fn(&CellContext) -> String;

/// One rendered row of a cross-tabulation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrosstabRow {
    pub group: String,
    /// Formatted cells aligned with the column levels.
    pub cells: Vec<String>,
}

/// Cross-tabulation of two qualitative variables.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Crosstab {
    /// Header: group label, one entry per column level, p-value label.
    pub columns: Vec<String>,
    pub rows: Vec<CrosstabRow>,
    /// Translated name of the test that ran.
    pub test_used: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub p_value: Option<f64>,
    /// Adjusted standardized residuals, present only when computed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub residuals: Option<Vec<Vec<f64>>>,
    pub used_resid_greater: bool,
    pub used_resid_lower: bool,
    pub percent_by: PercentBy,
}

/// Counts accumulated from two aligned vectors; rows missing on either
/// side are skipped.
pub(crate) struct CountTable {
    pub cells: IndexMap<String, IndexMap<String, usize>>,
    pub row_totals: IndexMap<String, usize>,
    pub col_totals: IndexMap<String, usize>,
}

pub(crate) fn tabulate(predictor: &[String], response: &[String]) -> CountTable {
    let mut cells: IndexMap<String, IndexMap<String, usize>> = IndexMap::new();
    let mut row_totals: IndexMap<String, usize> = IndexMap::new();
    let mut col_totals: IndexMap<String, usize> = IndexMap::new();
    for (pred, resp) in predictor.iter().zip(response) {
        let row = pred.trim();
        let col = resp.trim();
        if row.is_empty() || col.is_empty() {
            continue;
        }
        *cells
            .entry(row.to_string())
            .or_default()
            .entry(col.to_string())
            .or_default() += 1;
        *row_totals.entry(row.to_string()).or_default() += 1;
        *col_totals.entry(col.to_string()).or_default() += 1;
    }
    CountTable {
        cells,
        row_totals,
        col_totals,
    }
}

pub(crate) fn sorted_levels(values: &[String]) -> Vec<String> {
    let mut levels: Vec<String> = Vec::new();
    for value in values {
        let trimmed = value.trim();
        if !trimmed.is_empty() && !levels.iter().any(|l| l == trimmed) {
            levels.push(trimmed.to_string());
        }
    }
    levels.sort();
    levels
}

/// Default cell text: `count (percent%)`.
pub(crate) fn default_cell(ctx: &CellContext, lang: Language) -> String {
    format!("{} ({}%)", ctx.count, format_number(ctx.percent, 1, lang))
}

/// Two-sided Fisher's exact test for a 2x2 table, by probability
/// ordering: sum the hypergeometric probabilities of every table with
/// the same margins that is no more likely than the observed one.
pub fn fisher_exact_2x2(a: usize, b: usize, c: usize, d: usize) -> f64 {
    let ln_hypergeom = |a: usize, b: usize, c: usize, d: usize| -> f64 {
        let lf = |n: usize| ln_gamma(n as f64 + 1.0);
        lf(a + b) + lf(c + d) + lf(a + c) + lf(b + d)
            - lf(a)
            - lf(b)
            - lf(c)
            - lf(d)
            - lf(a + b + c + d)
    };
    let observed = ln_hypergeom(a, b, c, d).exp();
    let mut p = 0.0;
    for i in 0..=(a + b).min(a + c) {
        let j = a + b - i;
        let Some(k) = (a + c).checked_sub(i) else { continue };
        let Some(l) = (d + b).checked_sub(j) else { continue };
        let prob = ln_hypergeom(i, j, k, l).exp();
        if prob <= observed * (1.0 + 1e-7) {
            p += prob;
        }
    }
    p.min(1.0)
}

/// Adjusted standardized residuals, rounded to four decimals:
/// `(o - e) / sqrt(e * (1 - rowTotal/total) * (1 - colTotal/total))`.
pub fn adjusted_residuals(
    observed: &[Vec<f64>],
    expected: &[Vec<f64>],
    row_sums: &[f64],
    col_sums: &[f64],
    total: f64,
) -> Vec<Vec<f64>> {
    observed
        .iter()
        .enumerate()
        .map(|(i, row)| {
            row.iter()
                .enumerate()
                .map(|(j, o)| {
                    let e = expected[i][j];
                    let denom =
                        (e * (1.0 - row_sums[i] / total) * (1.0 - col_sums[j] / total)).sqrt();
                    let res = if denom > 0.0 { (o - e) / denom } else { 0.0 };
                    (res * 10_000.0).round() / 10_000.0
                })
                .collect()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fisher_exact_reference_table() {
        // Matches direct hypergeometric enumeration for a=8 b=2 c=1 d=5
        let p = fisher_exact_2x2(8, 2, 1, 5);
        assert!((p - 0.03496503496503497).abs() < 1e-9);
    }

    #[test]
    fn test_fisher_exact_no_association() {
        let p = fisher_exact_2x2(5, 5, 5, 5);
        assert!((p - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_adjusted_residuals_symmetric_2x2() {
        let observed = vec![vec![30.0, 10.0], vec![10.0, 30.0]];
        let row_sums = vec![40.0, 40.0];
        let col_sums = vec![40.0, 40.0];
        let total = 80.0;
        let expected = vec![vec![20.0, 20.0], vec![20.0, 20.0]];
        let residuals = adjusted_residuals(&observed, &expected, &row_sums, &col_sums, total);
        assert!(residuals[0][0] > RESIDUAL_CUTOFF);
        assert!(residuals[0][1] < -RESIDUAL_CUTOFF);
        assert_eq!(residuals[0][0], -residuals[0][1]);
    }

    #[test]
    fn test_tabulate_skips_missing() {
        let pred = vec!["a".to_string(), "".to_string(), "b".to_string()];
        let resp = vec!["x".to_string(), "y".to_string(), "".to_string()];
        let table = tabulate(&pred, &resp);
        assert_eq!(table.row_totals.get("a"), Some(&1));
        assert_eq!(table.row_totals.get("b"), None);
        assert_eq!(table.col_totals.get("y"), None);
    }

    #[test]
    fn test_sorted_levels() {
        let values = vec![
            "c".to_string(),
            "a".to_string(),
            " a ".to_string(),
            "".to_string(),
            "b".to_string(),
        ];
        assert_eq!(sorted_levels(&values), vec!["a", "b", "c"]);
    }
}
