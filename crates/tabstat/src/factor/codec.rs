//! Encoding and decoding between raw string values and factor form.

use indexmap::IndexSet;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::schema::{Codes, ColType, ColValues, Column, Variant, VariantMeta};

/// Numeric literal: optional sign, digits, optional decimal part.
static NUMERIC_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^-?\d+(\.\d+)?$").unwrap());

/// Separators probed when guessing a list column, in priority order.
const LIST_SEPS: [&str; 2] = [";", ","];

/// How many leading rows are sampled for type inference.
const INFER_SAMPLE: usize = 10;

/// Infer column type and list separator from raw values.
///
/// Scans the first rows: any sample containing `;` (then `,`) makes the
/// column a list with that separator; else if every sample parses as a
/// plain number (`,` accepted as decimal point) the column is numeric;
/// otherwise qualitative.
pub fn infer_col_type(values: &[String]) -> (ColType, String) {
    let sample: Vec<&str> = values
        .iter()
        .take(INFER_SAMPLE)
        .map(|v| v.as_str())
        .filter(|v| !v.is_empty())
        .collect();
    for sep in LIST_SEPS {
        if sample.iter().any(|v| v.contains(sep)) {
            return (ColType::List, sep.to_string());
        }
    }
    let numeric = sample
        .iter()
        .all(|v| NUMERIC_RE.is_match(&v.replacen(',', ".", 1)));
    if numeric {
        (ColType::Numeric, String::new())
    } else {
        (ColType::Qualitative, String::new())
    }
}

/// Decide whether a column benefits from factor compaction.
///
/// Qualitative columns always compact. Numeric and list columns compact
/// only when there is meaningful redundancy: more than one distinct
/// non-empty item, and fewer distinct items than `count / 1.5`.
pub fn should_compact(values: &[String], col_type: ColType, col_sep: &str) -> bool {
    if col_type == ColType::Qualitative {
        return true;
    }
    let sep = col_type.effective_sep(col_sep);
    let (total, distinct) = if col_type.is_list() {
        let mut unique: IndexSet<&str> = IndexSet::new();
        let mut total = 0usize;
        for value in values {
            for item in value.split(sep) {
                total += 1;
                let trimmed = item.trim();
                if !trimmed.is_empty() {
                    unique.insert(trimmed);
                }
            }
        }
        (total, unique.len())
    } else {
        let unique: IndexSet<&str> = values
            .iter()
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
            .collect();
        (values.len(), unique.len())
    };
    distinct > 1 && (distinct as f64) < total as f64 / 1.5
}

/// Factor-encode values into labels + codes, including list columns.
///
/// Labels are the distinct trimmed non-empty values (or list items) in
/// first-seen order; codes reference them 1-indexed, with `0` marking a
/// missing scalar value.
pub fn encode_as_factor(values: &[String], col_type: ColType, col_sep: &str) -> ColValues {
    if col_type.is_list() {
        let sep = col_type.effective_sep(col_sep);
        let mut labels: IndexSet<String> = IndexSet::new();
        for value in values {
            for item in value.split(sep) {
                let trimmed = item.trim();
                if !trimmed.is_empty() {
                    labels.insert(trimmed.to_string());
                }
            }
        }
        let codes: Vec<String> = values
            .iter()
            .map(|value| {
                value
                    .split(sep)
                    .map(str::trim)
                    .filter(|item| !item.is_empty())
                    .map(|item| {
                        let idx = labels.get_index_of(item).expect("item was registered");
                        (idx + 1).to_string()
                    })
                    .collect::<Vec<_>>()
                    .join(sep)
            })
            .collect();
        return ColValues::compact(labels.into_iter().collect(), Codes::Joined(codes));
    }

    let mut labels: IndexSet<String> = IndexSet::new();
    for value in values {
        let trimmed = value.trim();
        if !trimmed.is_empty() {
            labels.insert(trimmed.to_string());
        }
    }
    let codes: Vec<u32> = values
        .iter()
        .map(|value| match labels.get_index_of(value.trim()) {
            Some(idx) => (idx + 1) as u32,
            None => 0,
        })
        .collect();
    ColValues::compact(labels.into_iter().collect(), Codes::Plain(codes))
}

/// Decode factor-encoded values back to raw strings.
///
/// Compact payloads resolve codes through `labels` (list rows re-join
/// resolved items with the separator, dropping unresolved references;
/// scalar code `0` decodes to `None`). Raw payloads pass through verbatim.
pub fn decode_col_values(
    col_values: &ColValues,
    col_type: ColType,
    col_sep: &str,
) -> Vec<Option<String>> {
    if !col_values.col_compact {
        return col_values.raw_values.clone().unwrap_or_default();
    }
    let labels = col_values.labels.as_deref().unwrap_or(&[]);
    let Some(codes) = col_values.codes.as_ref() else {
        return Vec::new();
    };
    match codes {
        Codes::Joined(rows) => {
            let sep = col_type.effective_sep(col_sep);
            rows.iter()
                .map(|row| {
                    let resolved: Vec<&str> = row
                        .split(sep)
                        .filter_map(|token| token.trim().parse::<usize>().ok())
                        .filter_map(|code| code.checked_sub(1).and_then(|i| labels.get(i)))
                        .map(String::as_str)
                        .collect();
                    Some(resolved.join(sep))
                })
                .collect()
        }
        Codes::Plain(rows) => rows
            .iter()
            .map(|&code| {
                if code == 0 {
                    None
                } else {
                    labels.get(code as usize - 1).cloned()
                }
            })
            .collect(),
    }
}

/// Decode a column or variant into raw string values.
pub fn decode_column(column: &Column) -> Vec<Option<String>> {
    decode_col_values(&column.col_values, column.col_type, column.effective_sep())
}

/// Flatten decoded values into plain strings, empty for missing.
pub fn decode_to_strings(col_values: &ColValues, col_type: ColType, col_sep: &str) -> Vec<String> {
    decode_col_values(col_values, col_type, col_sep)
        .into_iter()
        .map(Option::unwrap_or_default)
        .collect()
}

/// Encode values compactly when worthwhile, otherwise keep them raw.
pub fn encode_col_values(values: &[String], col_type: ColType, col_sep: &str) -> ColValues {
    if should_compact(values, col_type, col_sep) {
        encode_as_factor(values, col_type, col_sep)
    } else {
        ColValues::raw(values.iter().cloned().map(Some).collect())
    }
}

/// Options for [`make_column`].
#[derive(Debug, Clone)]
pub struct ColumnOptions {
    /// Explicit column type; inferred when absent.
    pub col_type: Option<ColType>,
    /// Explicit separator; inferred when absent.
    pub col_sep: Option<String>,
    /// Label for the base variant snapshot.
    pub var_label: String,
    /// Append the base variant snapshot at index 0.
    pub include_base_variant: bool,
    /// Encode values instead of keeping them raw.
    pub encode: bool,
    pub col_name: Option<String>,
    pub col_label: Option<String>,
    pub col_hash: Option<String>,
    pub col_index: Option<usize>,
}

impl Default for ColumnOptions {
    fn default() -> Self {
        Self {
            col_type: None,
            col_sep: None,
            var_label: "Original".to_string(),
            include_base_variant: true,
            encode: true,
            col_name: None,
            col_label: None,
            col_hash: None,
            col_index: None,
        }
    }
}

/// Build a column from raw values, inferring type and separator when not
/// supplied and optionally snapshotting a base "Original" variant.
pub fn make_column(values: &[String], options: ColumnOptions) -> Column {
    let inferred = if options.col_type.is_none() || options.col_sep.is_none() {
        Some(infer_col_type(values))
    } else {
        None
    };
    let col_type = options
        .col_type
        .or(inferred.as_ref().map(|(t, _)| *t))
        .unwrap_or_default();
    let mut col_sep = options
        .col_sep
        .or(inferred.map(|(_, s)| s))
        .unwrap_or_default();
    if col_type.is_list() && col_sep.is_empty() {
        col_sep = crate::schema::DEFAULT_LIST_SEP.to_string();
    }
    if !col_type.is_list() {
        col_sep.clear();
    }

    let col_values = if options.encode {
        encode_col_values(values, col_type, &col_sep)
    } else {
        ColValues::raw(values.iter().cloned().map(Some).collect())
    };

    let col_vars = if options.include_base_variant {
        let mut meta = VariantMeta::original();
        meta.source_type = col_type;
        vec![Variant {
            var_label: options.var_label,
            col_type,
            col_sep: col_sep.clone(),
            col_values: col_values.clone(),
            meta,
        }]
    } else {
        Vec::new()
    };

    Column {
        col_type,
        col_sep,
        col_values,
        col_vars,
        col_name: options.col_name,
        col_label: options.col_label,
        col_hash: options.col_hash,
        col_index: options.col_index,
        col_del: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strs(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_infer_list_with_semicolon_priority() {
        let values = strs(&["a;b", "c,d", "e"]);
        assert_eq!(infer_col_type(&values), (ColType::List, ";".to_string()));
    }

    #[test]
    fn test_infer_numeric_with_comma_decimal() {
        let values = strs(&["1", "2.5", "-3", "4,7"]);
        assert_eq!(infer_col_type(&values), (ColType::Numeric, String::new()));
    }

    #[test]
    fn test_infer_qualitative() {
        let values = strs(&["yes", "no", "12x"]);
        assert_eq!(
            infer_col_type(&values),
            (ColType::Qualitative, String::new())
        );
    }

    #[test]
    fn test_should_compact_qualitative_always() {
        let values = strs(&["a", "b", "c"]);
        assert!(should_compact(&values, ColType::Qualitative, ""));
    }

    #[test]
    fn test_should_compact_requires_redundancy() {
        // 6 values, 2 distinct: 2 < 6/1.5 so compact
        let redundant = strs(&["1", "1", "2", "2", "1", "1"]);
        assert!(should_compact(&redundant, ColType::Numeric, ""));
        // 3 values all distinct: no redundancy
        let distinct = strs(&["1", "2", "3"]);
        assert!(!should_compact(&distinct, ColType::Numeric, ""));
        // single repeated value: distinct == 1
        let constant = strs(&["5", "5", "5"]);
        assert!(!should_compact(&constant, ColType::Numeric, ""));
    }

    #[test]
    fn test_encode_scalar_first_seen_order() {
        let values = strs(&["b", "a", "b", "", "c"]);
        let encoded = encode_as_factor(&values, ColType::Qualitative, "");
        assert_eq!(
            encoded.labels.as_deref().unwrap(),
            &["b".to_string(), "a".to_string(), "c".to_string()]
        );
        assert_eq!(
            encoded.codes,
            Some(Codes::Plain(vec![1, 2, 1, 0, 3]))
        );
    }

    #[test]
    fn test_encode_decode_list_preserves_item_order() {
        let values = strs(&["fever;chills", "chills; fever", "", "headache"]);
        let encoded = encode_as_factor(&values, ColType::List, ";");
        let decoded = decode_to_strings(&encoded, ColType::List, ";");
        assert_eq!(
            decoded,
            vec!["fever;chills", "chills;fever", "", "headache"]
        );
    }

    #[test]
    fn test_decode_code_zero_is_missing() {
        let payload = ColValues::compact(
            vec!["x".into(), "y".into()],
            Codes::Plain(vec![1, 0, 2]),
        );
        let decoded = decode_col_values(&payload, ColType::Qualitative, "");
        assert_eq!(decoded, vec![Some("x".into()), None, Some("y".into())]);
    }

    #[test]
    fn test_decode_drops_unresolved_list_items() {
        let payload = ColValues::compact(
            vec!["a".into()],
            Codes::Joined(vec!["1;9".into()]),
        );
        let decoded = decode_to_strings(&payload, ColType::List, ";");
        assert_eq!(decoded, vec!["a"]);
    }

    #[test]
    fn test_roundtrip_qualitative() {
        let values = strs(&["cd", "uc", "cd", "", "uc"]);
        let encoded = encode_col_values(&values, ColType::Qualitative, "");
        assert_eq!(decode_to_strings(&encoded, ColType::Qualitative, ""), values);
    }

    #[test]
    fn test_raw_passthrough_when_not_compacted() {
        let values = strs(&["1", "2", "3"]);
        let encoded = encode_col_values(&values, ColType::Numeric, "");
        assert!(!encoded.col_compact);
        assert_eq!(decode_to_strings(&encoded, ColType::Numeric, ""), values);
    }

    #[test]
    fn test_make_column_appends_base_variant() {
        let values = strs(&["a", "b", "a", "a"]);
        let column = make_column(&values, ColumnOptions::default());
        assert_eq!(column.col_type, ColType::Qualitative);
        assert_eq!(column.col_vars.len(), 1);
        let base = &column.col_vars[0];
        assert_eq!(base.var_label, "Original");
        assert_eq!(base.meta.kind, "original");
        assert_eq!(base.col_values, column.col_values);
    }

    #[test]
    fn test_make_column_infers_list() {
        let values = strs(&["fever,rash", "rash", "fever"]);
        let column = make_column(&values, ColumnOptions::default());
        assert_eq!(column.col_type, ColType::List);
        assert_eq!(column.col_sep, ",");
    }
}
