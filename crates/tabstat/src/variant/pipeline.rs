//! The variant creation pipeline.
//!
//! [`VariantPipeline::create_variant`] decodes a source column, runs the
//! configured stages in a fixed order (fill, search/replace, merge,
//! subset, numeric coercion, transform, cut, sort-by-frequency) and
//! re-encodes the result as an independent [`Variant`] carrying full
//! provenance: the actions that ran, bounded data-quality warnings, and
//! interval bounds for cut stages.
//!
//! Configuration mistakes (non-positive log base, non-positive cut
//! width, missing source variant) fail fast with an error. Row-level
//! data problems never abort the pipeline; they become warnings.

use std::sync::Arc;

use crate::error::{Result, TabstatError};
use crate::factor::{decode_col_values, encode_col_values};
use crate::locale::{MessageKey, Messages, Translator};
use crate::schema::{Codes, ColType, ColValues, Column, Variant, VariantAction, VariantMeta};

use super::config::{CutConfig, MergeRule, ReplaceRule, TransformConfig, TransformFn, VariantConfig};
use super::warnings::WarningCollector;

/// Derives column variants through the fixed-order transformation
/// pipeline. Holds the translator used to render warnings; cheap to
/// clone and safe to share across threads.
#[derive(Clone)]
pub struct VariantPipeline {
    translator: Arc<dyn Translator>,
}

impl Default for VariantPipeline {
    fn default() -> Self {
        Self::new()
    }
}

impl VariantPipeline {
    /// Pipeline using the built-in message catalog.
    pub fn new() -> Self {
        Self {
            translator: Arc::new(Messages::new()),
        }
    }

    /// Pipeline with a caller-supplied translator.
    pub fn with_translator(translator: Arc<dyn Translator>) -> Self {
        Self { translator }
    }

    /// Run the configured stages against a column (or one of its
    /// variants) and return the derived variant.
    ///
    /// The source data is decoded once and never mutated; the result
    /// owns its own encoded payload.
    pub fn create_variant(&self, base: &Column, config: &VariantConfig) -> Result<Variant> {
        let source = match config.source_var_index {
            Some(index) => Some(
                base.variant(index)
                    .ok_or(TabstatError::VariantNotFound(index))?,
            ),
            None => None,
        };
        let source_type = source.map_or(base.col_type, |v| v.col_type);
        let source_sep = source
            .map_or(base.effective_sep(), |v| v.effective_sep())
            .to_string();

        let source_values = source.map_or(&base.col_values, |v| &v.col_values);
        let mut values: Vec<String> = decode_col_values(source_values, source_type, &source_sep)
            .into_iter()
            .map(Option::unwrap_or_default)
            .collect();

        let mut current_type = source_type;
        let mut current_sep = source_sep.clone();
        let mut meta = VariantMeta {
            kind: config.kind.clone().unwrap_or_else(|| "custom".to_string()),
            source_var_index: config.source_var_index,
            source_type,
            actions: Vec::new(),
            warnings: Vec::new(),
            lang: config.lang,
            breaks: None,
            labels: None,
            note: config.note.clone(),
        };

        if let Some(fill) = &config.fill_empty {
            apply_fill(&mut values, fill, &mut meta);
        }
        if !config.replacements.is_empty() {
            let ctx = self.list_context(current_type, &current_sep, &source_sep);
            self.apply_search_replace(&mut values, &config.replacements, ctx, &mut meta);
        }
        if !config.merges.is_empty() {
            let ctx = self.list_context(current_type, &current_sep, &source_sep);
            apply_merge(&mut values, &config.merges, ctx, &mut meta);
        }
        if !config.subset_levels.is_empty() {
            let ctx = self.list_context(current_type, &current_sep, &source_sep);
            apply_subset(&mut values, &config.subset_levels, ctx, &mut meta);
        }
        if config.force_numeric {
            self.coerce_to_numeric(&mut values, &mut meta);
            current_type = ColType::Numeric;
            current_sep.clear();
        }
        if let Some(transform) = &config.transform {
            self.transform_numeric(&mut values, transform, &mut meta)?;
            current_type = ColType::Numeric;
            current_sep.clear();
        }
        let mut cut_info = None;
        if let Some(cut) = &config.cut {
            let info = self.cut_numeric(&mut values, cut, &mut meta)?;
            cut_info = Some(info);
            current_type = ColType::Qualitative;
            current_sep.clear();
        }

        if let Some(col_type) = config.col_type {
            current_type = col_type;
        }
        if let Some(col_sep) = &config.col_sep {
            current_sep = col_sep.clone();
        }
        if current_type.is_list() && current_sep.is_empty() {
            current_sep = if source_sep.is_empty() {
                crate::schema::DEFAULT_LIST_SEP.to_string()
            } else {
                source_sep.clone()
            };
        }
        if !current_type.is_list() {
            current_sep.clear();
        }

        let mut encoded = encode_col_values(&values, current_type, &current_sep);
        if config.sort_by_frequency {
            encoded = sort_by_frequency(encoded, &values, current_type, &current_sep, &mut meta);
        }

        if let Some((breaks, labels)) = cut_info {
            meta.breaks = Some(breaks);
            meta.labels = Some(labels);
        }

        let var_label = config.var_label.clone().unwrap_or_else(|| match &config.kind {
            Some(kind) => format!("{kind} variant"),
            None => "Variant".to_string(),
        });

        Ok(Variant {
            var_label,
            col_type: current_type,
            col_sep: current_sep,
            col_values: encoded,
            meta,
        })
    }

    fn list_context<'a>(
        &self,
        current_type: ColType,
        current_sep: &'a str,
        source_sep: &'a str,
    ) -> ListContext<'a> {
        let sep = if !current_sep.is_empty() {
            current_sep
        } else if !source_sep.is_empty() {
            source_sep
        } else {
            crate::schema::DEFAULT_LIST_SEP
        };
        ListContext {
            is_list: current_type.is_list(),
            sep,
        }
    }

    fn apply_search_replace(
        &self,
        values: &mut [String],
        replacements: &[ReplaceRule],
        ctx: ListContext<'_>,
        meta: &mut VariantMeta,
    ) {
        let rules: Vec<(&str, &str)> = replacements
            .iter()
            .filter_map(|rule| {
                let search = rule.search.trim();
                (!search.is_empty()).then_some((search, rule.replace.as_str()))
            })
            .collect();
        if rules.is_empty() {
            return;
        }
        meta.actions.push(VariantAction::SearchReplace {
            count: rules.len(),
        });
        let lookup = |item: &str| rules.iter().find(|(s, _)| *s == item).map(|(_, r)| *r);
        let mut log = WarningCollector::new();
        for value in values.iter_mut() {
            if value.is_empty() {
                continue;
            }
            if ctx.is_list {
                let items: Vec<&str> = value
                    .split(ctx.sep)
                    .map(str::trim)
                    .filter(|item| !item.is_empty())
                    .collect();
                let replaced: Vec<&str> = items
                    .iter()
                    .map(|item| match lookup(item) {
                        Some(replacement) => {
                            if *item != replacement {
                                log.record(|| {
                                    format!(
                                        "{item}->{}",
                                        if replacement.is_empty() { "[empty]" } else { replacement }
                                    )
                                });
                            }
                            replacement
                        }
                        None => item,
                    })
                    .filter(|item| !item.is_empty())
                    .collect();
                *value = replaced.join(ctx.sep);
            } else {
                let trimmed = value.trim();
                if let Some(replacement) = lookup(trimmed) {
                    if trimmed != replacement {
                        log.record(|| {
                            format!(
                                "{trimmed}->{}",
                                if replacement.is_empty() { "[empty]" } else { replacement }
                            )
                        });
                    }
                    *value = replacement.to_string();
                }
            }
        }
        log.emit_joined(
            &mut meta.warnings,
            self.translator.as_ref(),
            meta.lang,
            MessageKey::WarnSearchReplace,
        );
    }

    fn coerce_to_numeric(&self, values: &mut [String], meta: &mut VariantMeta) {
        let mut replaced = WarningCollector::new();
        let mut dropped = WarningCollector::new();
        for (index, value) in values.iter_mut().enumerate() {
            let original = value.trim().to_string();
            if original.is_empty() {
                value.clear();
                continue;
            }
            let normalized = sanitize_numeric_string(&original);
            match normalized.parse::<f64>() {
                Ok(parsed) if parsed.is_finite() => {
                    let rendered = parsed.to_string();
                    if normalized != original {
                        replaced.record(|| format!("\"{original}\"->{rendered}"));
                    }
                    *value = rendered;
                }
                _ => {
                    dropped.record(|| (index + 1).to_string());
                    value.clear();
                }
            }
        }
        meta.actions.push(VariantAction::CoerceNumeric);
        replaced.emit_lines(
            &mut meta.warnings,
            self.translator.as_ref(),
            meta.lang,
            MessageKey::WarnCoercionReplaced,
            &[],
        );
        dropped.emit_lines(
            &mut meta.warnings,
            self.translator.as_ref(),
            meta.lang,
            MessageKey::WarnCoercionDroppedRow,
            &[],
        );
    }

    fn transform_numeric(
        &self,
        values: &mut [String],
        config: &TransformConfig,
        meta: &mut VariantMeta,
    ) -> Result<()> {
        let base = config.base.unwrap_or(std::f64::consts::E);
        if config.func == TransformFn::Log && (base <= 0.0 || base == 1.0) {
            return Err(TabstatError::Config(
                "log base must be greater than 0 and not equal to 1".to_string(),
            ));
        }
        let mut skipped = WarningCollector::new();
        for (index, value) in values.iter_mut().enumerate() {
            let Ok(numeric) = value.trim().parse::<f64>() else {
                value.clear();
                continue;
            };
            if !numeric.is_finite() {
                value.clear();
                continue;
            }
            let result = match config.func {
                TransformFn::Log | TransformFn::Log10 | TransformFn::Log2 if numeric <= 0.0 => {
                    skipped.record(|| (index + 1).to_string());
                    value.clear();
                    continue;
                }
                TransformFn::Sqrt if numeric < 0.0 => {
                    skipped.record(|| (index + 1).to_string());
                    value.clear();
                    continue;
                }
                TransformFn::Log => numeric.ln() / base.ln(),
                TransformFn::Log10 => numeric.log10(),
                TransformFn::Log2 => numeric.log2(),
                TransformFn::Sqrt => numeric.sqrt(),
                TransformFn::Square => numeric * numeric,
            };
            *value = if result.is_finite() {
                result.to_string()
            } else {
                String::new()
            };
        }
        meta.actions.push(VariantAction::Transform {
            func: config.func.name().to_string(),
        });
        skipped.emit_lines(
            &mut meta.warnings,
            self.translator.as_ref(),
            meta.lang,
            MessageKey::WarnTransformSkippedRow,
            &[("fn", config.func.name().to_string())],
        );
        Ok(())
    }

    /// Bin numeric values into labelled intervals. Returns the interval
    /// bounds and labels for the provenance record.
    fn cut_numeric(
        &self,
        values: &mut [String],
        config: &CutConfig,
        meta: &mut VariantMeta,
    ) -> Result<(Vec<(f64, f64)>, Vec<String>)> {
        let numeric: Vec<Option<f64>> = values
            .iter()
            .map(|v| v.trim().parse::<f64>().ok().filter(|n| n.is_finite()))
            .collect();
        let observed: Vec<f64> = numeric.iter().filter_map(|n| *n).collect();
        if observed.is_empty() {
            self.warn(meta, MessageKey::WarnCutNoNumeric, &[]);
            values.iter_mut().for_each(String::clear);
            return Ok((Vec::new(), Vec::new()));
        }

        let mut breaks: Vec<f64> = config
            .breaks
            .iter()
            .copied()
            .filter(|n| n.is_finite())
            .collect();
        sort_dedup(&mut breaks);
        if breaks.is_empty() {
            if let Some(width) = config.width {
                if width <= 0.0 {
                    return Err(TabstatError::Config(
                        "cut width must be positive".to_string(),
                    ));
                }
                let min = observed.iter().copied().fold(f64::INFINITY, f64::min);
                let max = observed.iter().copied().fold(f64::NEG_INFINITY, f64::max);
                breaks = build_breaks_from_width(min, max, width, config.origin);
            }
        }
        if breaks.len() < 2 {
            let min = observed.iter().copied().fold(f64::INFINITY, f64::min);
            let max = observed.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            breaks = vec![min, max];
        }
        sort_dedup(&mut breaks);
        if breaks.len() < 2 {
            breaks.push(breaks[0]);
        }

        let interval_count = breaks.len() - 1;
        let mut intervals: Vec<(f64, f64, String)> = Vec::new();
        for i in 0..interval_count {
            let (lower, upper) = (breaks[i], breaks[i + 1]);
            if upper <= lower {
                continue;
            }
            let label = config.labels.get(i).cloned().unwrap_or_else(|| {
                format_interval(lower, upper, config.right, config.include_lowest, i, interval_count)
            });
            intervals.push((lower, upper, label));
        }
        if intervals.is_empty() {
            self.warn(meta, MessageKey::WarnCutInvalidIntervals, &[]);
            values.iter_mut().for_each(String::clear);
            return Ok((breaks.windows(2).map(|w| (w[0], w[1])).collect(), Vec::new()));
        }

        let total = intervals.len();
        let mut outside = 0usize;
        for (value, num) in values.iter_mut().zip(&numeric) {
            let Some(num) = num else {
                value.clear();
                continue;
            };
            let hit = intervals.iter().enumerate().find(|(idx, (lower, upper, _))| {
                in_interval(*num, *lower, *upper, *idx, total, config.right, config.include_lowest)
            });
            match hit {
                Some((_, (_, _, label))) => *value = label.clone(),
                None => {
                    outside += 1;
                    value.clear();
                }
            }
        }
        if outside > 0 {
            self.warn(
                meta,
                MessageKey::WarnCutOutside,
                &[("count", outside.to_string())],
            );
        }
        let bounds: Vec<(f64, f64)> = intervals.iter().map(|(l, u, _)| (*l, *u)).collect();
        meta.actions.push(VariantAction::Cut {
            breaks: bounds.clone(),
        });
        let labels = intervals.into_iter().map(|(_, _, label)| label).collect();
        Ok((bounds, labels))
    }

    fn warn(&self, meta: &mut VariantMeta, key: MessageKey, vars: &[(&str, String)]) {
        meta.warnings
            .push(self.translator.translate(key, meta.lang, vars));
    }
}

struct ListContext<'a> {
    is_list: bool,
    sep: &'a str,
}

fn apply_fill(values: &mut [String], fill: &str, meta: &mut VariantMeta) {
    meta.actions.push(VariantAction::FillMissing {
        value: fill.to_string(),
    });
    for value in values.iter_mut() {
        if value.trim().is_empty() {
            *value = fill.to_string();
        }
    }
}

fn apply_merge(
    values: &mut [String],
    merges: &[MergeRule],
    ctx: ListContext<'_>,
    meta: &mut VariantMeta,
) {
    let mut map: Vec<(String, &str)> = Vec::new();
    for group in merges {
        let target = group.label.trim();
        if target.is_empty() {
            continue;
        }
        for level in &group.levels {
            let key = level.trim();
            if !key.is_empty() {
                map.push((key.to_string(), target));
            }
        }
    }
    if map.is_empty() {
        return;
    }
    meta.actions.push(VariantAction::MergeLevels {
        groups: map.len(),
    });
    let lookup = |item: &str| map.iter().find(|(k, _)| k == item).map(|(_, t)| *t);
    for value in values.iter_mut() {
        if value.is_empty() {
            continue;
        }
        if ctx.is_list {
            let mut merged: Vec<&str> = Vec::new();
            for item in value.split(ctx.sep).map(str::trim).filter(|i| !i.is_empty()) {
                let target = lookup(item).unwrap_or(item);
                if !target.is_empty() && !merged.contains(&target) {
                    merged.push(target);
                }
            }
            *value = merged.join(ctx.sep);
        } else if let Some(target) = lookup(value.trim()) {
            *value = target.to_string();
        }
    }
}

fn apply_subset(
    values: &mut [String],
    subset: &[String],
    ctx: ListContext<'_>,
    meta: &mut VariantMeta,
) {
    let allowed: Vec<&str> = subset
        .iter()
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .collect();
    if allowed.is_empty() {
        return;
    }
    meta.actions.push(VariantAction::SubsetLevels {
        count: allowed.len(),
    });
    for value in values.iter_mut() {
        if value.is_empty() {
            continue;
        }
        if ctx.is_list {
            let kept: Vec<&str> = value
                .split(ctx.sep)
                .map(str::trim)
                .filter(|item| allowed.contains(item))
                .collect();
            *value = kept.join(ctx.sep);
        } else if !allowed.contains(&value.trim()) {
            value.clear();
        }
    }
}

/// Normalize numeric-like text so it parses as a float: resolves
/// comma/point separator ambiguity, strips stray symbols and keeps a
/// single leading sign and decimal point.
pub fn sanitize_numeric_string(value: &str) -> String {
    let mut normalized = value.trim().to_string();
    if normalized.is_empty() {
        return normalized;
    }
    let comma_count = normalized.matches(',').count();
    let dot_count = normalized.matches('.').count();
    if comma_count == 1 && dot_count >= 1 && normalized.rfind(',') > normalized.rfind('.') {
        // "1.234,5" style: dots are thousands separators.
        normalized = normalized.replace('.', "").replacen(',', ".", 1);
    } else if comma_count > 1 && dot_count == 0 {
        // "1,234,567" style: commas are thousands separators.
        normalized = normalized.replace(',', "");
    } else {
        normalized = normalized.replace(',', ".");
    }
    normalized.retain(|c| c.is_ascii_digit() || c == '.' || c == '+' || c == '-');
    let sign = normalized
        .chars()
        .next()
        .filter(|c| *c == '+' || *c == '-');
    normalized.retain(|c| c != '+' && c != '-');
    if let Some(sign) = sign {
        normalized.insert(0, sign);
    }
    if normalized.matches('.').count() > 1 {
        if let Some(first) = normalized.find('.') {
            let tail: String = normalized[first + 1..].chars().filter(|c| *c != '.').collect();
            normalized.truncate(first + 1);
            normalized.push_str(&tail);
        }
    }
    normalized
}

fn sort_dedup(breaks: &mut Vec<f64>) {
    breaks.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    breaks.dedup();
}

/// Equal-width cut points covering the observed range, anchored at
/// `origin` when given.
fn build_breaks_from_width(min: f64, max: f64, width: f64, origin: Option<f64>) -> Vec<f64> {
    let mut start = origin.filter(|o| o.is_finite()).unwrap_or(min);
    while start > min {
        start -= width;
    }
    while start + width <= min {
        start += width;
    }
    let mut breaks = Vec::new();
    let mut val = start;
    while val <= max {
        breaks.push(val);
        val += width;
    }
    if breaks.first().is_some_and(|&b| b > min) {
        breaks.insert(0, min);
    }
    match breaks.last() {
        Some(&last) if last < max => breaks.push(last + width),
        None => breaks.push(min),
        _ => {}
    }
    sort_dedup(&mut breaks);
    breaks
}

/// Compact bound text: fixed six decimals with trailing zeros trimmed.
fn format_bound(num: f64) -> String {
    if !num.is_finite() {
        return num.to_string();
    }
    let mut text = format!("{num:.6}");
    while text.ends_with('0') {
        text.pop();
    }
    if text.ends_with('.') {
        text.pop();
    }
    text
}

fn format_interval(
    lower: f64,
    upper: f64,
    right: bool,
    include_lowest: bool,
    idx: usize,
    total: usize,
) -> String {
    let left = if right {
        if idx == 0 && include_lowest { '[' } else { '(' }
    } else {
        '['
    };
    let close = if right {
        ']'
    } else if idx == total - 1 && include_lowest {
        ']'
    } else {
        ')'
    };
    format!("{left}{}, {}{close}", format_bound(lower), format_bound(upper))
}

fn in_interval(
    value: f64,
    lower: f64,
    upper: f64,
    idx: usize,
    total: usize,
    right: bool,
    include_lowest: bool,
) -> bool {
    if right {
        let lower_ok = if idx == 0 && include_lowest {
            value >= lower
        } else {
            value > lower
        };
        lower_ok && value <= upper
    } else {
        let upper_ok = if idx == total - 1 && include_lowest {
            value <= upper
        } else {
            value < upper
        };
        value >= lower && upper_ok
    }
}

/// Reorder compact labels by descending observed frequency (ties by
/// label), remapping codes to match. Leaves raw payloads and numeric
/// columns untouched.
fn sort_by_frequency(
    encoded: ColValues,
    values: &[String],
    col_type: ColType,
    col_sep: &str,
    meta: &mut VariantMeta,
) -> ColValues {
    if !encoded.col_compact || col_type == ColType::Numeric {
        return encoded;
    }
    let Some(old_labels) = encoded.labels.clone() else {
        return encoded;
    };
    let sep = col_type.effective_sep(col_sep);

    let mut counts: Vec<(String, usize)> = Vec::new();
    let mut bump = |item: &str| {
        match counts.iter_mut().find(|(label, _)| label == item) {
            Some((_, count)) => *count += 1,
            None => counts.push((item.to_string(), 1)),
        }
    };
    for value in values {
        if value.is_empty() {
            continue;
        }
        if col_type.is_list() {
            for item in value.split(sep).map(str::trim).filter(|i| !i.is_empty()) {
                bump(item);
            }
        } else {
            bump(value.trim());
        }
    }
    let count_of = |label: &str| {
        counts
            .iter()
            .find(|(l, _)| l == label)
            .map_or(0, |(_, c)| *c)
    };

    let mut sorted_labels = old_labels.clone();
    sorted_labels.sort_by(|a, b| count_of(b).cmp(&count_of(a)).then_with(|| a.cmp(b)));
    if sorted_labels == old_labels {
        return encoded;
    }
    meta.actions.push(VariantAction::SortByFrequency);

    let new_index = |old_code: usize| -> Option<usize> {
        let label = old_labels.get(old_code.checked_sub(1)?)?;
        sorted_labels.iter().position(|l| l == label).map(|i| i + 1)
    };
    let codes = encoded.codes.map(|codes| match codes {
        Codes::Plain(rows) => Codes::Plain(
            rows.into_iter()
                .map(|code| {
                    if code == 0 {
                        0
                    } else {
                        new_index(code as usize).unwrap_or(0) as u32
                    }
                })
                .collect(),
        ),
        Codes::Joined(rows) => Codes::Joined(
            rows.into_iter()
                .map(|row| {
                    row.split(sep)
                        .filter_map(|token| token.trim().parse::<usize>().ok())
                        .filter_map(new_index)
                        .map(|i| i.to_string())
                        .collect::<Vec<_>>()
                        .join(sep)
                })
                .collect(),
        ),
    });
    ColValues {
        col_compact: true,
        labels: Some(sorted_labels),
        codes,
        raw_values: encoded.raw_values,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::factor::{decode_to_strings, make_column, ColumnOptions};
    use crate::locale::Language;

    fn column(values: &[&str]) -> Column {
        let values: Vec<String> = values.iter().map(|s| s.to_string()).collect();
        make_column(&values, ColumnOptions::default())
    }

    fn decoded(variant: &Variant) -> Vec<String> {
        decode_to_strings(&variant.col_values, variant.col_type, variant.effective_sep())
    }

    #[test]
    fn test_sanitize_numeric_string() {
        assert_eq!(sanitize_numeric_string("1.234,5"), "1234.5");
        assert_eq!(sanitize_numeric_string("1,234,567"), "1234567");
        assert_eq!(sanitize_numeric_string("3,5"), "3.5");
        assert_eq!(sanitize_numeric_string("-12.5 kg"), "-12.5");
        assert_eq!(sanitize_numeric_string("1.2.3"), "1.23");
        assert_eq!(sanitize_numeric_string("  "), "");
    }

    #[test]
    fn test_force_numeric_drops_unparsable_rows() {
        let base = column(&["1", "2", "3", "abc"]);
        let config = VariantConfig {
            force_numeric: true,
            ..Default::default()
        };
        let variant = VariantPipeline::new().create_variant(&base, &config).unwrap();
        assert_eq!(variant.col_type, ColType::Numeric);
        assert_eq!(decoded(&variant), vec!["1", "2", "3", ""]);
        assert!(variant.meta.actions.contains(&VariantAction::CoerceNumeric));
        assert_eq!(variant.meta.warnings.len(), 1);
        assert!(variant.meta.warnings[0].contains('4'));
    }

    #[test]
    fn test_force_numeric_reports_comma_replacement() {
        let base = column(&["1,5", "2", "2", "2"]);
        let config = VariantConfig {
            force_numeric: true,
            ..Default::default()
        };
        let variant = VariantPipeline::new().create_variant(&base, &config).unwrap();
        assert_eq!(decoded(&variant), vec!["1.5", "2", "2", "2"]);
        assert!(variant.meta.warnings[0].contains("\"1,5\"->1.5"));
    }

    #[test]
    fn test_fill_then_merge() {
        let base = column(&["cd", "uc", "", "ibd-u", "cd"]);
        let config = VariantConfig {
            fill_empty: Some("unknown".to_string()),
            merges: vec![MergeRule {
                label: "ibd".to_string(),
                levels: vec!["cd".to_string(), "uc".to_string(), "ibd-u".to_string()],
            }],
            ..Default::default()
        };
        let variant = VariantPipeline::new().create_variant(&base, &config).unwrap();
        assert_eq!(decoded(&variant), vec!["ibd", "ibd", "unknown", "ibd", "ibd"]);
        assert_eq!(variant.meta.actions.len(), 2);
    }

    #[test]
    fn test_search_replace_records_single_warning_line() {
        let base = column(&["m", "f", "m", "x"]);
        let config = VariantConfig {
            replacements: vec![
                ReplaceRule::new("m", "male"),
                ReplaceRule::new("f", "female"),
            ],
            ..Default::default()
        };
        let variant = VariantPipeline::new().create_variant(&base, &config).unwrap();
        assert_eq!(decoded(&variant), vec!["male", "female", "male", "x"]);
        assert_eq!(variant.meta.warnings.len(), 1);
        assert!(variant.meta.warnings[0].starts_with("Search & replace:"));
        assert!(variant.meta.warnings[0].contains("m->male"));
    }

    #[test]
    fn test_list_merge_dedupes_items() {
        let values: Vec<String> = ["fever;chills", "chills;rash", "fever", "rash;fever"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let base = make_column(&values, ColumnOptions::default());
        assert_eq!(base.col_type, ColType::List);
        let config = VariantConfig {
            merges: vec![MergeRule {
                label: "systemic".to_string(),
                levels: vec!["fever".to_string(), "chills".to_string()],
            }],
            ..Default::default()
        };
        let variant = VariantPipeline::new().create_variant(&base, &config).unwrap();
        assert_eq!(
            decoded(&variant),
            vec!["systemic", "systemic;rash", "systemic", "rash;systemic"]
        );
    }

    #[test]
    fn test_subset_clears_other_levels() {
        let base = column(&["a", "b", "c", "a"]);
        let config = VariantConfig {
            subset_levels: vec!["a".to_string()],
            ..Default::default()
        };
        let variant = VariantPipeline::new().create_variant(&base, &config).unwrap();
        assert_eq!(decoded(&variant), vec!["a", "", "", "a"]);
    }

    #[test]
    fn test_transform_rejects_bad_log_base() {
        let base = column(&["1", "2", "4", "8"]);
        let config = VariantConfig {
            transform: Some(TransformConfig {
                func: TransformFn::Log,
                base: Some(1.0),
            }),
            ..Default::default()
        };
        let err = VariantPipeline::new().create_variant(&base, &config).unwrap_err();
        assert!(matches!(err, TabstatError::Config(_)));
    }

    #[test]
    fn test_transform_skips_domain_violations() {
        let base = column(&["10", "0", "100", "-5"]);
        let config = VariantConfig {
            force_numeric: true,
            transform: Some(TransformConfig {
                func: TransformFn::Log10,
                base: None,
            }),
            ..Default::default()
        };
        let variant = VariantPipeline::new().create_variant(&base, &config).unwrap();
        assert_eq!(decoded(&variant), vec!["1", "", "2", ""]);
        assert!(variant
            .meta
            .warnings
            .iter()
            .any(|w| w.contains("log10") && w.contains('2')));
        assert!(variant
            .meta
            .warnings
            .iter()
            .any(|w| w.contains("log10") && w.contains('4')));
    }

    #[test]
    fn test_cut_with_explicit_breaks() {
        let base = column(&["0", "3", "5", "7", "10", "12"]);
        let config = VariantConfig {
            cut: Some(CutConfig {
                breaks: vec![0.0, 5.0, 10.0],
                ..Default::default()
            }),
            ..Default::default()
        };
        let variant = VariantPipeline::new().create_variant(&base, &config).unwrap();
        assert_eq!(variant.col_type, ColType::Qualitative);
        assert_eq!(
            decoded(&variant),
            vec!["[0, 5]", "[0, 5]", "[0, 5]", "(5, 10]", "(5, 10]", ""]
        );
        assert_eq!(
            variant.meta.breaks.as_deref().unwrap(),
            &[(0.0, 5.0), (5.0, 10.0)]
        );
        assert_eq!(
            variant.meta.labels.as_deref().unwrap(),
            &["[0, 5]".to_string(), "(5, 10]".to_string()]
        );
        // 12 falls outside the defined breaks
        assert!(variant.meta.warnings.iter().any(|w| w.contains("outside")));
    }

    #[test]
    fn test_cut_by_width_covers_range() {
        let base = column(&["1", "4", "9", "14"]);
        let config = VariantConfig {
            cut: Some(CutConfig {
                width: Some(5.0),
                origin: Some(0.0),
                ..Default::default()
            }),
            ..Default::default()
        };
        let variant = VariantPipeline::new().create_variant(&base, &config).unwrap();
        let labels = variant.meta.labels.unwrap();
        assert_eq!(labels, vec!["[0, 5]", "(5, 10]", "(10, 15]"]);
        assert!(variant.meta.warnings.is_empty());
    }

    #[test]
    fn test_cut_rejects_non_positive_width() {
        let base = column(&["1", "2", "3"]);
        let config = VariantConfig {
            cut: Some(CutConfig {
                width: Some(0.0),
                ..Default::default()
            }),
            ..Default::default()
        };
        let err = VariantPipeline::new().create_variant(&base, &config).unwrap_err();
        assert!(matches!(err, TabstatError::Config(_)));
    }

    #[test]
    fn test_cut_custom_labels() {
        let base = column(&["2", "8", "2", "8"]);
        let config = VariantConfig {
            cut: Some(CutConfig {
                breaks: vec![0.0, 5.0, 10.0],
                labels: vec!["low".to_string(), "high".to_string()],
                ..Default::default()
            }),
            ..Default::default()
        };
        let variant = VariantPipeline::new().create_variant(&base, &config).unwrap();
        assert_eq!(decoded(&variant), vec!["low", "high", "low", "high"]);
    }

    #[test]
    fn test_sort_by_frequency_remaps_codes() {
        let base = column(&["b", "a", "a", "a", "b", "c"]);
        let config = VariantConfig {
            sort_by_frequency: true,
            ..Default::default()
        };
        let variant = VariantPipeline::new().create_variant(&base, &config).unwrap();
        assert_eq!(
            variant.col_values.labels.as_deref().unwrap(),
            &["a".to_string(), "b".to_string(), "c".to_string()]
        );
        // Decoded values are unchanged by the reordering
        assert_eq!(decoded(&variant), vec!["b", "a", "a", "a", "b", "c"]);
        assert!(variant.meta.actions.contains(&VariantAction::SortByFrequency));
    }

    #[test]
    fn test_sort_by_frequency_noop_when_already_sorted() {
        let base = column(&["a", "a", "a", "b", "b", "c"]);
        let config = VariantConfig {
            sort_by_frequency: true,
            ..Default::default()
        };
        let variant = VariantPipeline::new().create_variant(&base, &config).unwrap();
        assert!(!variant.meta.actions.contains(&VariantAction::SortByFrequency));
    }

    #[test]
    fn test_source_variant_index_out_of_range() {
        let base = column(&["a", "b"]);
        let config = VariantConfig {
            source_var_index: Some(7),
            ..Default::default()
        };
        let err = VariantPipeline::new().create_variant(&base, &config).unwrap_err();
        assert!(matches!(err, TabstatError::VariantNotFound(7)));
    }

    #[test]
    fn test_chained_from_existing_variant() {
        let mut base = column(&["1,5", "2", "bad", "2"]);
        let numeric = VariantPipeline::new()
            .create_variant(
                &base,
                &VariantConfig {
                    kind: Some("numeric".to_string()),
                    force_numeric: true,
                    ..Default::default()
                },
            )
            .unwrap();
        base.col_vars.push(numeric);
        let squared = VariantPipeline::new()
            .create_variant(
                &base,
                &VariantConfig {
                    source_var_index: Some(1),
                    transform: Some(TransformConfig {
                        func: TransformFn::Square,
                        base: None,
                    }),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(squared.meta.source_var_index, Some(1));
        assert_eq!(decoded(&squared), vec!["2.25", "4", "", "4"]);
    }

    #[test]
    fn test_default_labels_and_kind() {
        let base = column(&["a", "b"]);
        let variant = VariantPipeline::new()
            .create_variant(&base, &VariantConfig::default())
            .unwrap();
        assert_eq!(variant.var_label, "Variant");
        assert_eq!(variant.meta.kind, "custom");

        let named = VariantPipeline::new()
            .create_variant(
                &base,
                &VariantConfig {
                    kind: Some("numeric".to_string()),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(named.var_label, "numeric variant");
    }

    #[test]
    fn test_localized_warnings() {
        let base = column(&["1", "2", "x", "2"]);
        let config = VariantConfig {
            force_numeric: true,
            lang: Language::PtBr,
            ..Default::default()
        };
        let variant = VariantPipeline::new().create_variant(&base, &config).unwrap();
        assert_eq!(variant.meta.lang, Language::PtBr);
        assert!(variant.meta.warnings[0].starts_with("Conversão numérica"));
    }
}
